use chrono::{DateTime, Utc};

use crate::domain::fingerprint::compute_fingerprint;
use crate::domain::key_inventory::{InventoryError, KeyInventory};
use crate::domain::link::LinkOutcome;
use crate::domain::public_key_record::{KeyListingEntry, PublicKeyRecord};
use crate::port::key_listing::{KeyListing, KeyListingError};

#[derive(Debug, thiserror::Error)]
pub enum KeyServiceError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Listing(#[from] KeyListingError),
    #[error("public key could not be decoded")]
    UndecodableKey,
}

pub struct KeyService;

impl KeyService {
    pub fn load_inventory(listing: &impl KeyListing) -> Result<KeyInventory, KeyServiceError> {
        let records = listing
            .list()?
            .into_iter()
            .map(PublicKeyRecord::from)
            .collect();
        Ok(KeyInventory::new(records))
    }

    /// Confirms the pending deletion and removes the key from the listing.
    ///
    /// The listing is updated first; if that fails the inventory still holds
    /// the pending entry.
    pub fn revoke_pending(
        inventory: &mut KeyInventory,
        listing: &impl KeyListing,
    ) -> Result<PublicKeyRecord, KeyServiceError> {
        let index = inventory
            .pending_deletion()
            .ok_or(InventoryError::NothingPending)?;
        let raw_key = inventory.records()[index].raw_key().to_string();

        if !listing.remove(&raw_key)? {
            tracing::warn!("Revoked key was not present in the key listing");
        }
        Ok(inventory.confirm_delete()?)
    }

    /// Finishes the two-phase delete: revokes the pending key when `confirmed`,
    /// otherwise cancels and leaves the listing untouched.
    pub fn resolve_pending(
        inventory: &mut KeyInventory,
        listing: &impl KeyListing,
        confirmed: bool,
    ) -> Result<Option<PublicKeyRecord>, KeyServiceError> {
        if confirmed {
            return Self::revoke_pending(inventory, listing).map(Some);
        }
        let index = inventory.cancel_delete()?;
        tracing::info!("Kept linked key {} after declined revocation", index);
        Ok(None)
    }

    /// Records the remote key after a handshake. Only an `Approved` outcome
    /// adds a key; every other outcome leaves the listing unchanged.
    pub fn record_link(
        listing: &impl KeyListing,
        outcome: LinkOutcome,
        remote_public_key: &str,
        created_at: DateTime<Utc>,
    ) -> Result<bool, KeyServiceError> {
        if outcome != LinkOutcome::Approved {
            return Ok(false);
        }
        let raw_key =
            normalize_public_key(remote_public_key).ok_or(KeyServiceError::UndecodableKey)?;
        let appended = listing.append(&KeyListingEntry {
            raw_key,
            created_at,
        })?;
        if !appended {
            tracing::info!("Linked key was already present in the key listing");
        }
        Ok(appended)
    }
}

/// Returns the base64 key material of either a bare key or an
/// `authorized_keys` style line.
fn normalize_public_key(public_key: &str) -> Option<String> {
    let trimmed = public_key.trim();
    if compute_fingerprint(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }
    let field = trimmed.split_whitespace().nth(1)?;
    compute_fingerprint(field).ok()?;
    Some(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::key_listing::InMemoryKeyListing;
    use chrono::TimeZone;

    fn entry(raw_key: &str) -> KeyListingEntry {
        KeyListingEntry {
            raw_key: raw_key.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap(),
        }
    }

    fn listing_with(keys: &[&str]) -> InMemoryKeyListing {
        let listing = InMemoryKeyListing::default();
        for key in keys {
            listing.append(&entry(key)).unwrap();
        }
        listing
    }

    #[test]
    fn load_inventory_keeps_listing_order() {
        let listing = listing_with(&["QQ==", "Qg==", "Qw=="]);
        let inventory = KeyService::load_inventory(&listing).unwrap();

        let keys: Vec<_> = inventory.records().iter().map(|r| r.raw_key()).collect();
        assert_eq!(keys, vec!["QQ==", "Qg==", "Qw=="]);
        assert_eq!(inventory.selected(), Some(0));
    }

    #[test]
    fn revoke_pending_removes_from_listing_and_inventory() {
        let listing = listing_with(&["QQ==", "Qg==", "Qw=="]);
        let mut inventory = KeyService::load_inventory(&listing).unwrap();
        inventory.move_selection(1);
        inventory.request_delete().unwrap();

        let removed = KeyService::revoke_pending(&mut inventory, &listing).unwrap();
        assert_eq!(removed.raw_key(), "Qg==");
        assert_eq!(inventory.len(), 2);

        let remaining: Vec<_> = listing.list().unwrap().into_iter().map(|e| e.raw_key).collect();
        assert_eq!(remaining, vec!["QQ==", "Qw=="]);
    }

    #[test]
    fn revoke_without_pending_changes_nothing() {
        let listing = listing_with(&["QQ=="]);
        let mut inventory = KeyService::load_inventory(&listing).unwrap();

        let result = KeyService::revoke_pending(&mut inventory, &listing);
        assert!(matches!(
            result,
            Err(KeyServiceError::Inventory(InventoryError::NothingPending))
        ));
        assert_eq!(listing.list().unwrap().len(), 1);
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn declined_revocation_cancels_and_keeps_listing() {
        let listing = listing_with(&["QQ==", "Qg=="]);
        let mut inventory = KeyService::load_inventory(&listing).unwrap();
        inventory.move_selection(1);
        inventory.request_delete().unwrap();

        let removed = KeyService::resolve_pending(&mut inventory, &listing, false).unwrap();
        assert!(removed.is_none());
        assert_eq!(inventory.pending_deletion(), None);
        assert_eq!(inventory.selected(), Some(1));
        assert_eq!(inventory.len(), 2);
        assert_eq!(listing.list().unwrap().len(), 2);
    }

    #[test]
    fn confirmed_revocation_removes_key() {
        let listing = listing_with(&["QQ==", "Qg=="]);
        let mut inventory = KeyService::load_inventory(&listing).unwrap();
        inventory.request_delete().unwrap();

        let removed = KeyService::resolve_pending(&mut inventory, &listing, true).unwrap();
        assert_eq!(removed.unwrap().raw_key(), "QQ==");
        let remaining: Vec<_> = listing.list().unwrap().into_iter().map(|e| e.raw_key).collect();
        assert_eq!(remaining, vec!["Qg=="]);
    }

    #[test]
    fn only_approved_outcome_records_a_key() {
        let listing = InMemoryKeyListing::default();
        let now = Utc::now();

        for outcome in [
            LinkOutcome::SameAccount,
            LinkOutcome::Denied,
            LinkOutcome::InvalidToken,
            LinkOutcome::Timeout,
            LinkOutcome::Error,
        ] {
            assert!(!KeyService::record_link(&listing, outcome, "QQ==", now).unwrap());
        }
        assert!(listing.list().unwrap().is_empty());

        assert!(KeyService::record_link(&listing, LinkOutcome::Approved, "QQ==", now).unwrap());
        assert!(!KeyService::record_link(&listing, LinkOutcome::Approved, "QQ==", now).unwrap());
        assert_eq!(listing.list().unwrap().len(), 1);
    }

    #[test]
    fn record_link_stores_key_field_of_authorized_key_line() {
        let listing = InMemoryKeyListing::default();
        KeyService::record_link(
            &listing,
            LinkOutcome::Approved,
            "ssh-ed25519 aGVsbG8= carol@phone",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(listing.list().unwrap()[0].raw_key, "aGVsbG8=");
    }

    #[test]
    fn record_link_rejects_undecodable_key() {
        let listing = InMemoryKeyListing::default();
        let result = KeyService::record_link(&listing, LinkOutcome::Approved, "%%%", Utc::now());
        assert!(matches!(result, Err(KeyServiceError::UndecodableKey)));
    }
}
