//! Ordered inventory of linked keys with a two-phase (select, then confirm) delete.

use super::public_key_record::PublicKeyRecord;

/// Display state of a single inventory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEntryState {
    Normal,
    Selected,
    PendingDeletion,
}

/// Rejected inventory operations. The inventory is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("no key is selected")]
    NothingSelected,
    #[error("key {index} is already pending deletion")]
    DeletionAlreadyPending { index: usize },
    #[error("no key is pending deletion")]
    NothingPending,
}

/// Linked keys in display order plus the transient selection state.
///
/// At most one entry is pending deletion at a time, and the record sequence
/// only changes through [`KeyInventory::load`] and [`KeyInventory::confirm_delete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInventory {
    records: Vec<PublicKeyRecord>,
    selected: Option<usize>,
    pending_deletion: Option<usize>,
}

impl KeyInventory {
    pub fn new(records: Vec<PublicKeyRecord>) -> Self {
        let mut inventory = Self::default();
        inventory.load(records);
        inventory
    }

    /// Replaces all records, selects the first one and clears any pending deletion.
    pub fn load(&mut self, records: Vec<PublicKeyRecord>) {
        self.selected = if records.is_empty() { None } else { Some(0) };
        self.pending_deletion = None;
        self.records = records;
        tracing::debug!("Loaded {} linked keys", self.records.len());
        self.check_invariants();
    }

    pub fn move_selection(&mut self, delta: isize) {
        let Some(current) = self.selected else {
            return;
        };
        let last = self.records.len() - 1;
        let target = current.saturating_add_signed(delta).min(last);
        self.selected = Some(target);
        self.check_invariants();
    }

    /// Marks the selected key for deletion. Never replaces an existing pending entry.
    pub fn request_delete(&mut self) -> Result<usize, InventoryError> {
        if let Some(index) = self.pending_deletion {
            tracing::debug!("Ignoring delete request, key {} is already pending", index);
            return Err(InventoryError::DeletionAlreadyPending { index });
        }
        let index = self.selected.ok_or(InventoryError::NothingSelected)?;
        self.pending_deletion = Some(index);
        self.check_invariants();
        Ok(index)
    }

    pub fn cancel_delete(&mut self) -> Result<usize, InventoryError> {
        let index = self
            .pending_deletion
            .take()
            .ok_or(InventoryError::NothingPending)?;
        self.selected = Some(index);
        self.check_invariants();
        Ok(index)
    }

    /// Removes the pending key and returns it. This is the only irreversible operation.
    pub fn confirm_delete(&mut self) -> Result<PublicKeyRecord, InventoryError> {
        let index = self
            .pending_deletion
            .take()
            .ok_or(InventoryError::NothingPending)?;
        let removed = self.records.remove(index);

        // Selection may have moved away from the pending entry in the meantime.
        self.selected = match (self.records.len(), self.selected) {
            (0, _) => None,
            (_, Some(selected)) if selected > index => Some(selected - 1),
            (_, Some(selected)) if selected < index => Some(selected),
            (len, _) => Some(index.min(len - 1)),
        };
        tracing::info!(
            "Removed linked key {} from inventory",
            removed
                .fingerprint()
                .map(|fp| fp.as_str())
                .unwrap_or("<undecodable>")
        );
        self.check_invariants();
        Ok(removed)
    }

    pub fn records(&self) -> &[PublicKeyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&PublicKeyRecord> {
        self.selected.and_then(|index| self.records.get(index))
    }

    pub fn pending_deletion(&self) -> Option<usize> {
        self.pending_deletion
    }

    pub fn state_of(&self, index: usize) -> KeyEntryState {
        if self.pending_deletion == Some(index) {
            KeyEntryState::PendingDeletion
        } else if self.selected == Some(index) {
            KeyEntryState::Selected
        } else {
            KeyEntryState::Normal
        }
    }

    fn invariants_hold(&self) -> bool {
        let len = self.records.len();
        let selection_valid = match self.selected {
            None => len == 0,
            Some(index) => index < len,
        };
        let pending_valid = self.pending_deletion.map_or(true, |index| index < len);
        selection_valid && pending_valid
    }

    fn check_invariants(&self) {
        if !self.invariants_hold() {
            tracing::error!(
                "Key inventory invariant broken: len={}, selected={:?}, pending={:?}",
                self.records.len(),
                self.selected,
                self.pending_deletion
            );
        }
        debug_assert!(self.invariants_hold());
    }
}
