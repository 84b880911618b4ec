//! Authentication endpoint paths and wire types.

use serde::{Deserialize, Serialize};

use crate::tokens::{CredentialPair, RefreshToken};

/// Paths of the authentication endpoints, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub logout: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            register: "/auth/register".to_string(),
            refresh: "/auth/refresh".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}

/// Body of the refresh and logout calls.
pub(crate) fn refresh_body(token: &RefreshToken) -> serde_json::Value {
    serde_json::json!({ "refresh_token": token.as_str() })
}

/// Token pair returned by login, registration and refresh.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenResponse> for CredentialPair {
    fn from(response: TokenResponse) -> Self {
        CredentialPair::new(response.access_token, response.refresh_token)
    }
}
