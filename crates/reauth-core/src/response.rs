//! Raw transport responses and interpreted replies.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::RequestError;

/// A response exactly as the transport received it.
#[derive(Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Build a response with a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Extract a human-readable message from an error body.
    ///
    /// Looks for `message`, then `error`. Returns `None` if the body is
    /// empty, not JSON, or carries neither field.
    pub(crate) fn error_message(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            error: Option<String>,
        }

        let body: ErrorBody = serde_json::from_slice(&self.body).ok()?;
        body.message
            .or(body.error)
            .filter(|message| !message.trim().is_empty())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// A successful dispatch result.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A `2xx` response other than `204`.
    Content(HttpResponse),
    /// A `204 No Content` response; there is no body to parse.
    NoContent,
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Content(response) => response.status,
            Reply::NoContent => 204,
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Reply::NoContent)
    }

    /// Returns the raw body; empty for `NoContent`.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Reply::Content(response) => &response.body,
            Reply::NoContent => &[],
        }
    }

    /// Decode the body as JSON.
    ///
    /// `NoContent` decodes as JSON `null`, so `()` and `Option<T>` targets
    /// succeed without a body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        let bytes: &[u8] = match self {
            Reply::Content(response) => &response.body,
            Reply::NoContent => b"null",
        };
        serde_json::from_slice(bytes).map_err(|e| RequestError::InvalidResponse {
            message: e.to_string(),
        })
    }
}
