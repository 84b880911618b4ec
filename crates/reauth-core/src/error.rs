//! Error types for reauth.
//!
//! [`RequestError`] is what callers of the dispatcher see. The narrower
//! enums describe a single layer: the wire ([`TransportError`]), the refresh
//! protocol ([`SessionError`]), durable storage ([`StoreError`]) and input
//! validation ([`InvalidInputError`]).

use thiserror::Error;

/// The failure returned by an authenticated dispatch.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The transport could not complete the call (DNS, TLS, reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server answered `403`.
    #[error("you don't have permission to perform this action")]
    PermissionDenied,

    /// The server answered `404`.
    #[error("resource not found")]
    NotFound,

    /// The server answered with a `5xx` status.
    #[error("server error (HTTP {status}), please try again later")]
    Server { status: u16 },

    /// Any other non-success status, with the server's message if it sent one.
    #[error(
        "request failed (HTTP {status}): {}",
        .message.as_deref().unwrap_or("an error occurred")
    )]
    RequestFailed {
        status: u16,
        message: Option<String>,
    },

    /// The session could not be refreshed; the user must log in again.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The request was rejected with `401` again right after a successful refresh.
    #[error("request unauthorized after refreshing the session")]
    Unauthorized,

    /// The refresh this request was waiting on died before it settled.
    #[error("session refresh was abandoned before it completed")]
    RefreshAborted,

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// A successful response body did not match the expected shape.
    #[error("invalid response body: {message}")]
    InvalidResponse { message: String },

    /// The credential store failed.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

impl RequestError {
    /// Returns true if this failure means the user has to re-authenticate.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, RequestError::SessionExpired)
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::PermissionDenied => Some(403),
            RequestError::NotFound => Some(404),
            RequestError::Unauthorized => Some(401),
            RequestError::Server { status } | RequestError::RequestFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<SessionError> for RequestError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => RequestError::SessionExpired,
            SessionError::Aborted => RequestError::RefreshAborted,
        }
    }
}

/// Outcome of a failed refresh, shared by the leader and every waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The refresh call failed or no refresh credential was available.
    #[error("session expired")]
    Expired,

    /// The refresh task stopped before the refresh settled.
    #[error("refresh aborted")]
    Aborted,
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be decoded.
    #[error("corrupt credential data: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Unknown HTTP method.
    #[error("invalid HTTP method '{value}'")]
    Method { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_falls_back_to_generic_message() {
        let err = RequestError::RequestFailed {
            status: 422,
            message: None,
        };
        assert_eq!(err.to_string(), "request failed (HTTP 422): an error occurred");

        let err = RequestError::RequestFailed {
            status: 422,
            message: Some("title is required".into()),
        };
        assert_eq!(err.to_string(), "request failed (HTTP 422): title is required");
    }

    #[test]
    fn session_errors_map_onto_request_errors() {
        assert!(RequestError::from(SessionError::Expired).is_session_expired());
        assert!(matches!(
            RequestError::from(SessionError::Aborted),
            RequestError::RefreshAborted
        ));
    }

    #[test]
    fn status_is_reported_for_http_failures() {
        assert_eq!(RequestError::NotFound.status(), Some(404));
        assert_eq!(RequestError::Server { status: 503 }.status(), Some(503));
        assert_eq!(RequestError::SessionExpired.status(), None);
    }
}
