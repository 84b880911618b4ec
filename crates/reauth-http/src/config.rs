//! Client configuration.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use reauth_core::{
    ApiUrl, CredentialStore, DEFAULT_REFRESH_TIMEOUT, InvalidInputError, Session, SessionBuilder,
    TransportError,
};

use crate::client::HttpTransport;

/// Base URL used when `REAUTH_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const API_URL_VAR: &str = "REAUTH_API_URL";
const REQUEST_TIMEOUT_VAR: &str = "REAUTH_REQUEST_TIMEOUT_SECS";
const REFRESH_TIMEOUT_VAR: &str = "REAUTH_REFRESH_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidInputError),

    #[error("{var} must be a positive whole number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] TransportError),
}

/// Settings for an [`HttpTransport`] and the session built on it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Every request path is resolved against this URL.
    pub base_url: ApiUrl,
    /// Default limit for a whole request; per-request timeouts override it.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Limit on the refresh call made when a credential expires.
    pub refresh_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            request_timeout: Some(Duration::from_secs(30)),
            connect_timeout: Duration::from_secs(10),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            user_agent: concat!("reauth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Read the configuration from `REAUTH_API_URL`,
    /// `REAUTH_REQUEST_TIMEOUT_SECS` and `REAUTH_REFRESH_TIMEOUT_SECS`.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(ApiUrl::new(&base_url)?);

        if let Some(secs) = seconds(&lookup, REQUEST_TIMEOUT_VAR)? {
            config.request_timeout = Some(secs);
        }
        if let Some(secs) = seconds(&lookup, REFRESH_TIMEOUT_VAR)? {
            config.refresh_timeout = secs;
        }
        Ok(config)
    }

    /// Build the transport and a [`SessionBuilder`] over `store`, with the
    /// refresh timeout applied.
    pub fn session_builder(
        &self,
        store: Arc<dyn CredentialStore>,
    ) -> Result<SessionBuilder, ConfigError> {
        let transport = HttpTransport::new(self)?;
        Ok(Session::builder(Arc::new(transport), store).refresh_timeout(self.refresh_timeout))
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    // Zero would time out every call, and for refresh end every session.
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(ConfigError::InvalidTimeout { var, value }),
    }
}
