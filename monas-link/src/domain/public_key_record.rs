use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::{compute_fingerprint, DecodeError, Fingerprint};

/// A public key linked to the account.
///
/// The fingerprint is derived once from `raw_key` when the record is built. A
/// key that does not decode keeps its `DecodeError` so that a single bad entry
/// never prevents the rest of the inventory from being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyRecord {
    fingerprint: Result<Fingerprint, DecodeError>,
    raw_key: String,
    created_at: DateTime<Utc>,
}

/// A key as reported by the key listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyListingEntry {
    pub raw_key: String,
    pub created_at: DateTime<Utc>,
}

impl PublicKeyRecord {
    pub fn new(raw_key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let raw_key = raw_key.into();
        Self {
            fingerprint: compute_fingerprint(&raw_key),
            raw_key,
            created_at,
        }
    }

    pub fn fingerprint(&self) -> Result<&Fingerprint, &DecodeError> {
        self.fingerprint.as_ref()
    }

    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn to_listing_entry(&self) -> KeyListingEntry {
        KeyListingEntry {
            raw_key: self.raw_key.clone(),
            created_at: self.created_at,
        }
    }
}

impl From<KeyListingEntry> for PublicKeyRecord {
    fn from(entry: KeyListingEntry) -> Self {
        PublicKeyRecord::new(entry.raw_key, entry.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_derives_fingerprint_from_raw_key() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = PublicKeyRecord::new("aGVsbG8=", created_at);

        assert_eq!(
            record.fingerprint().unwrap(),
            &compute_fingerprint("aGVsbG8=").unwrap()
        );
        assert_eq!(record.raw_key(), "aGVsbG8=");
        assert_eq!(record.created_at(), created_at);
    }

    #[test]
    fn malformed_key_keeps_decode_error() {
        let record = PublicKeyRecord::new("%%%", Utc::now());
        assert!(record.fingerprint().is_err());
    }

    #[test]
    fn listing_entry_round_trips_through_record() {
        let entry = KeyListingEntry {
            raw_key: "AAAA".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 7, 9, 8, 30, 0).unwrap(),
        };
        let record = PublicKeyRecord::from(entry.clone());
        assert_eq!(record.to_listing_entry(), entry);
    }
}
