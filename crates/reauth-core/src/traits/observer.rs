//! Best-effort notifications for the presentation layer.

use tracing::{info, warn};

use crate::error::RequestError;

/// Receives failure and session-end notifications.
///
/// Notifications are a side channel: they never change what the caller of
/// a dispatch receives. Implementations must not block.
pub trait SessionObserver: Send + Sync {
    /// Called once for every dispatch that fails, before the error is returned.
    fn request_failed(&self, _error: &RequestError) {}

    /// Called when an active session ends.
    fn session_ended(&self) {}
}

/// Observer that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn request_failed(&self, error: &RequestError) {
        warn!(error = %error, "Request failed");
    }

    fn session_ended(&self) {
        info!("Session ended, re-authentication required");
    }
}
