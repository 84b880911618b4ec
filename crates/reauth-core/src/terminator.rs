//! Session termination.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::traits::{CredentialStore, SessionObserver};

/// Whether the user currently holds a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Ended,
}

/// Ends a session: clears the credential store and signals the end.
///
/// The signal is a [`watch`] channel of [`SessionStatus`]; the presentation
/// layer subscribes and routes to its login entry point on `Ended`.
/// Termination never touches refresh state, so it is safe to call from the
/// refresh coordinator.
pub struct SessionTerminator {
    store: Arc<dyn CredentialStore>,
    observer: Arc<dyn SessionObserver>,
    status: watch::Sender<SessionStatus>,
}

impl SessionTerminator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        observer: Arc<dyn SessionObserver>,
        initial: SessionStatus,
    ) -> Self {
        let (status, _) = watch::channel(initial);
        Self {
            store,
            observer,
            status,
        }
    }

    /// Clear the stored credentials and mark the session ended.
    ///
    /// Idempotent: returns `true` only for the call that ended an active
    /// session, and later calls neither error nor signal again. A failing
    /// store is logged and does not prevent the session from ending.
    pub fn terminate(&self) -> bool {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential store");
        }

        let ended = self.status.send_if_modified(|status| {
            if *status == SessionStatus::Ended {
                false
            } else {
                *status = SessionStatus::Ended;
                true
            }
        });

        if ended {
            info!("Session terminated");
            self.observer.session_ended();
        }
        ended
    }

    /// Mark the session active after a login.
    pub(crate) fn activate(&self) {
        self.status.send_if_modified(|status| {
            if *status == SessionStatus::Active {
                false
            } else {
                *status = SessionStatus::Active;
                true
            }
        });
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Subscribe to session status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("status", &self.status())
            .finish()
    }
}
