//! Identity claims carried inside an access token.
//!
//! The payload is decoded without verifying the signature. It is only used
//! to show who is logged in; the server remains the authority on validity.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::tokens::AccessToken;

/// Claims decoded from a JWT access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Expiry as a unix timestamp in seconds.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Decode the payload segment of a JWT access token.
    ///
    /// Returns `None` if the token is not a three-part JWT or the payload is
    /// not valid base64url JSON with a `sub` claim.
    pub fn from_access_token(token: &AccessToken) -> Option<Self> {
        let mut parts = token.as_str().split('.');
        let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Returns the name to show for this user: the username, else the email.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }

    /// Returns when the token expires, if it carries an `exp` claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Returns true if the token had expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}
