//! Outbound request descriptors.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::InvalidInputError;
use crate::tokens::AccessToken;

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InvalidInputError::Method {
                value: s.to_string(),
            }),
        }
    }
}

/// Description of a single outbound call.
///
/// Descriptors are built once and not mutated afterwards; the dispatcher
/// derives a copy carrying the `Authorization` header for each attempt.
/// Requests require authentication unless marked [`public`](Self::public).
///
/// # Example
///
/// ```
/// use reauth_core::{Method, RequestDescriptor};
///
/// let request = RequestDescriptor::patch("/tasks/42/status")
///     .body(serde_json::json!({"status": "Completed"}));
/// assert_eq!(request.method(), Method::Patch);
/// assert!(request.requires_auth());
/// ```
#[derive(Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    requires_auth: bool,
    timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            requires_auth: true,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Set the JSON request body.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header. Header names are compared case-insensitively.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Mark the request as not requiring authentication.
    ///
    /// Public requests never carry a credential and a `401` on them is an
    /// ordinary failure rather than a trigger for refresh.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Bound how long a single transport attempt may take.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the value of the first header with this name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns a copy carrying `token` as its bearer credential, replacing
    /// any `Authorization` header already present.
    pub(crate) fn authorized(&self, token: &AccessToken) -> Self {
        let mut request = self.clone();
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION));
        request
            .headers
            .push((AUTHORIZATION.to_string(), token.bearer()));
        request
    }
}

// Header values and bodies may hold credentials or passwords.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &header_names)
            .field("has_body", &self.body.is_some())
            .field("requires_auth", &self.requires_auth)
            .field("timeout", &self.timeout)
            .finish()
    }
}
