//! KeyListing trait - access to the keys linked to the account

use crate::domain::public_key_record::KeyListingEntry;

#[derive(Debug, thiserror::Error)]
pub enum KeyListingError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid key entry: {0}")]
    InvalidEntry(String),
}

/// Ordered storage of the keys linked to an account.
pub trait KeyListing {
    /// All linked keys in insertion order.
    fn list(&self) -> Result<Vec<KeyListingEntry>, KeyListingError>;

    /// Appends a key. Returns `false` without changes if it is already linked.
    fn append(&self, entry: &KeyListingEntry) -> Result<bool, KeyListingError>;

    /// Removes a key. Returns `false` if it was not linked.
    fn remove(&self, raw_key: &str) -> Result<bool, KeyListingError>;
}
