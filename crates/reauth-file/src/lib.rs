//! reauth-file - Credential store persisted to a JSON file.

mod store;

pub use store::FileStore;
