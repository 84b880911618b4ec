//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::InvalidInputError;

/// A validated API base URL.
///
/// Must use HTTPS, or plain HTTP for localhost. Request paths are joined
/// onto the base with [`ApiUrl::endpoint`].
///
/// # Example
///
/// ```
/// use reauth_core::ApiUrl;
///
/// let api = ApiUrl::new("https://tasks.example.com/api/").unwrap();
/// assert_eq!(api.endpoint("/auth/refresh"), "https://tasks.example.com/api/auth/refresh");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidInputError> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the absolute URL for a request path.
    ///
    /// The path may or may not start with `/`, and may carry a query string.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), InvalidInputError> {
        let invalid = |reason: &str| InvalidInputError::ApiUrl {
            value: original.to_string(),
            reason: reason.to_string(),
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://tasks.example.com/api").unwrap();
        assert_eq!(api.host(), Some("tasks.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:3000/api").unwrap();
        assert_eq!(api.endpoint("/tasks"), "http://localhost:3000/api/tasks");
    }

    #[test]
    fn endpoint_handles_slashes_on_both_sides() {
        let api = ApiUrl::new("https://tasks.example.com/api/").unwrap();
        assert_eq!(api.endpoint("tasks/1"), "https://tasks.example.com/api/tasks/1");
        assert_eq!(api.endpoint("/tasks/1"), "https://tasks.example.com/api/tasks/1");

        let root = ApiUrl::new("https://tasks.example.com").unwrap();
        assert_eq!(root.endpoint("/tasks?status=Pending"), "https://tasks.example.com/tasks?status=Pending");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://tasks.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/tasks").is_err());
    }

    #[test]
    fn rejects_query_in_base() {
        assert!(ApiUrl::new("https://tasks.example.com/api?x=1").is_err());
    }
}
