//! Ownership Table (OT) - tracks which transaction owns each state key

use crate::state_key::{StateKey, TxId};
use dashmap::DashMap;

/// Ownership Table for tracking state key ownership
///
/// In Seamless Scheduling, each state key can be "owned" by at most one
/// transaction at a time. This prevents write-write conflicts.
pub struct OwnershipTable {
    /// Map from state key to owning transaction
    owners: DashMap<StateKey, TxId>,
}

impl OwnershipTable {
    /// Create a new empty ownership table
    pub fn new() -> Self {
        Self {
            owners: DashMap::new(),
        }
    }

    /// Try to acquire ownership of a state key
    ///
    /// Returns `Ok(())` if ownership was acquired or already owned by this tx.
    /// Returns `Err(owner_tx_id)` if another transaction owns this key.
    pub fn try_acquire(&self, key: &StateKey, tx_id: TxId) -> Result<(), TxId> {
        match self.owners.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let owner = *entry.get();
                if owner == tx_id {
                    Ok(())
                } else {
                    Err(owner)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(tx_id);
                Ok(())
            }
        }
    }

    /// Release ownership of a state key
    ///
    /// Uses atomic remove_if to avoid TOCTOU race condition.
    pub fn release(&self, key: &StateKey, tx_id: TxId) -> bool {
        self.owners
            .remove_if(key, |_, owner| *owner == tx_id)
            .is_some()
    }

    /// Release all state keys owned by a transaction
    pub fn release_all(&self, tx_id: TxId) {
        self.owners.retain(|_, &mut owner| owner != tx_id);
    }

    /// Get the owner of a state key
    pub fn get_owner(&self, key: &StateKey) -> Option<TxId> {
        self.owners.get(key).map(|entry| *entry)
    }

    /// Check if a transaction owns a state key
    pub fn is_owner(&self, key: &StateKey, tx_id: TxId) -> bool {
        self.owners.get(key).map(|entry| *entry == tx_id).unwrap_or(false)
    }

    /// Get all keys owned by a transaction
    pub fn get_owned_keys(&self, tx_id: TxId) -> Vec<StateKey> {
        self.owners
            .iter()
            .filter(|entry| *entry.value() == tx_id)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Get the total number of owned keys
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Clear all ownership
    pub fn clear(&self) {
        self.owners.clear();
    }
}

impl Default for OwnershipTable {
    fn default() -> Self {
        Self::new()
    }
}
