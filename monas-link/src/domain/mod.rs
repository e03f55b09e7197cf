//! Domain layer - fingerprints, key records, the key inventory and handshake states.

pub mod fingerprint;
pub mod key_inventory;
pub mod link;
pub mod public_key_record;

pub use fingerprint::{compute_fingerprint, DecodeError, Fingerprint};
pub use key_inventory::{InventoryError, KeyEntryState, KeyInventory};
pub use link::{ApprovalRequest, LinkOutcome, LinkState, LinkToken, LinkTokenError};
pub use public_key_record::{KeyListingEntry, PublicKeyRecord};
