//! reauth-core - Authenticated request dispatch with single-flight refresh.
//!
//! All authenticated calls flow through a [`Session`], which attaches the
//! current bearer credential, and on a `401` hands over to the
//! [`RefreshCoordinator`] so that any number of concurrently expiring
//! requests share exactly one refresh call.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reauth_core::{Credentials, MemoryStore, RequestDescriptor, Session, Transport};
//!
//! # async fn example(transport: Arc<dyn Transport>) -> Result<(), reauth_core::RequestError> {
//! let session = Session::builder(transport, Arc::new(MemoryStore::new())).build()?;
//! session.login(&Credentials::new("alice@example.com", "secret")).await?;
//!
//! let reply = session.dispatch(&RequestDescriptor::get("/tasks")).await?;
//! let tasks: Vec<serde_json::Value> = reply.json()?;
//! println!("{} tasks", tasks.len());
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod coordinator;
pub mod credentials;
pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod store;
pub mod terminator;
pub mod tokens;
pub mod traits;
pub mod types;

pub use claims::Claims;
pub use coordinator::RefreshCoordinator;
pub use credentials::{Credentials, Signup};
pub use dispatcher::Dispatcher;
pub use endpoints::AuthEndpoints;
pub use error::{InvalidInputError, RequestError, SessionError, StoreError, TransportError};
pub use request::{Method, RequestDescriptor};
pub use response::{HttpResponse, Reply};
pub use session::{DEFAULT_REFRESH_TIMEOUT, Session, SessionBuilder, SessionConfig};
pub use store::MemoryStore;
pub use terminator::{SessionStatus, SessionTerminator};
pub use tokens::{AccessToken, CredentialPair, RefreshToken};
pub use traits::{CredentialStore, SessionObserver, TracingObserver, Transport};
pub use types::ApiUrl;

pub use tokio_util::sync::CancellationToken;

/// Result type alias using the crate's request error type.
pub type Result<T> = std::result::Result<T, RequestError>;
