//! Credential store trait.

use crate::error::StoreError;
use crate::tokens::CredentialPair;

/// Durable holder of the current [`CredentialPair`].
///
/// All three operations must be atomic with respect to each other: `get`
/// never observes half of an old pair and half of a new one.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, if any.
    fn get(&self) -> Result<Option<CredentialPair>, StoreError>;

    /// Replace the stored pair.
    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError>;

    /// Remove the stored pair. Succeeds when nothing is stored.
    fn clear(&self) -> Result<(), StoreError>;
}
