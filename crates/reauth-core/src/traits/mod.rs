//! Seams between the dispatcher and its collaborators.

mod observer;
mod store;
mod transport;

pub use observer::{SessionObserver, TracingObserver};
pub use store::CredentialStore;
pub use transport::Transport;
