use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::domain::public_key_record::KeyListingEntry;
use crate::port::key_listing::{KeyListing, KeyListingError};

const LINKED_KEYS_TREE: &str = "linked_keys";

/// In-process key listing.
///
/// Nothing is persisted; intended for tests and local development.
#[derive(Clone, Default)]
pub struct InMemoryKeyListing {
    inner: Arc<Mutex<Vec<KeyListingEntry>>>,
}

impl KeyListing for InMemoryKeyListing {
    fn list(&self) -> Result<Vec<KeyListingEntry>, KeyListingError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;
        Ok(guard.clone())
    }

    fn append(&self, entry: &KeyListingEntry) -> Result<bool, KeyListingError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;

        if guard.iter().any(|existing| existing.raw_key == entry.raw_key) {
            return Ok(false);
        }
        guard.push(entry.clone());
        Ok(true)
    }

    fn remove(&self, raw_key: &str) -> Result<bool, KeyListingError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;

        let before = guard.len();
        guard.retain(|entry| entry.raw_key != raw_key);
        Ok(guard.len() != before)
    }
}

/// Key listing stored in sled.
///
/// - key: big-endian `u64` id from `Db::generate_id`, so iteration follows insertion order
/// - value: the entry as JSON
pub struct SledKeyListing {
    db: sled::Db,
}

impl SledKeyListing {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KeyListingError> {
        let db = sled::open(path).map_err(|e| KeyListingError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    fn tree(&self) -> Result<sled::Tree, KeyListingError> {
        self.db
            .open_tree(LINKED_KEYS_TREE)
            .map_err(|e| KeyListingError::Storage(e.to_string()))
    }

    fn entries(&self) -> Result<Vec<(sled::IVec, KeyListingEntry)>, KeyListingError> {
        let mut entries = Vec::new();
        for item in self.tree()?.iter() {
            let (key, value) = item.map_err(|e| KeyListingError::Storage(e.to_string()))?;
            let entry: KeyListingEntry = serde_json::from_slice(&value)
                .map_err(|e| KeyListingError::InvalidEntry(e.to_string()))?;
            entries.push((key, entry));
        }
        Ok(entries)
    }

    fn flush(&self) -> Result<(), KeyListingError> {
        self.db
            .flush()
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl KeyListing for SledKeyListing {
    fn list(&self) -> Result<Vec<KeyListingEntry>, KeyListingError> {
        Ok(self.entries()?.into_iter().map(|(_, entry)| entry).collect())
    }

    fn append(&self, entry: &KeyListingEntry) -> Result<bool, KeyListingError> {
        if self
            .entries()?
            .iter()
            .any(|(_, existing)| existing.raw_key == entry.raw_key)
        {
            return Ok(false);
        }

        let id = self
            .db
            .generate_id()
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;
        let value =
            serde_json::to_vec(entry).map_err(|e| KeyListingError::InvalidEntry(e.to_string()))?;
        self.tree()?
            .insert(id.to_be_bytes(), value)
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;
        self.flush()?;
        Ok(true)
    }

    fn remove(&self, raw_key: &str) -> Result<bool, KeyListingError> {
        let Some((key, _)) = self
            .entries()?
            .into_iter()
            .find(|(_, entry)| entry.raw_key == raw_key)
        else {
            return Ok(false);
        };

        self.tree()?
            .remove(key)
            .map_err(|e| KeyListingError::Storage(e.to_string()))?;
        self.flush()?;
        Ok(true)
    }
}
