//! In-memory credential store.

use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;
use crate::tokens::CredentialPair;
use crate::traits::CredentialStore;

/// A [`CredentialStore`] that lives only as long as the process.
///
/// Useful for tests and for running several independent sessions side by
/// side. Use a durable store (such as `reauth_file::FileStore`) to survive
/// restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `pair`.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        Ok(self.pair.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
