//! Read/Write set tracking for transactions

use crate::state_key::StateKey;
use std::collections::HashSet;

/// Read/Write set for a transaction
///
/// Tracks which state keys a transaction reads and writes.
/// Used for conflict detection and dependency analysis.
#[derive(Clone, Debug, Default)]
pub struct RWSet {
    /// State keys that were read
    pub reads: HashSet<StateKey>,
    /// State keys that were written
    pub writes: HashSet<StateKey>,
}

impl RWSet {
    /// Create a new empty RW set
    pub fn new() -> Self {
        Self {
            reads: HashSet::new(),
            writes: HashSet::new(),
        }
    }

    /// Record a read access
    pub fn record_read(&mut self, key: StateKey) {
        self.reads.insert(key);
    }

    /// Record a write access
    pub fn record_write(&mut self, key: StateKey) {
        self.writes.insert(key);
    }

    /// Check if this transaction reads a key
    pub fn reads_key(&self, key: &StateKey) -> bool {
        self.reads.contains(key)
    }

    /// Check if this transaction writes a key
    pub fn writes_key(&self, key: &StateKey) -> bool {
        self.writes.contains(key)
    }

    /// Check for read-write conflict with another transaction
    ///
    /// Returns true if `self` reads a key that `other` writes,
    /// indicating `self` depends on `other` (read-after-write).
    pub fn has_raw_dependency(&self, other: &RWSet) -> bool {
        self.reads.iter().any(|key| other.writes.contains(key))
    }

    /// Check for write-write conflict with another transaction
    ///
    /// Returns true if both transactions write to the same key.
    pub fn has_waw_conflict(&self, other: &RWSet) -> bool {
        self.writes.iter().any(|key| other.writes.contains(key))
    }

    /// Check for write-read conflict (anti-dependency)
    ///
    /// Returns true if `self` writes a key that `other` reads.
    pub fn has_war_conflict(&self, other: &RWSet) -> bool {
        self.writes.iter().any(|key| other.reads.contains(key))
    }

    /// Get all conflicting keys with another RW set
    pub fn get_conflicts(&self, other: &RWSet) -> ConflictSet {
        let raw: HashSet<_> = self.reads.intersection(&other.writes).cloned().collect();
        let waw: HashSet<_> = self.writes.intersection(&other.writes).cloned().collect();
        let war: HashSet<_> = self.writes.intersection(&other.reads).cloned().collect();

        ConflictSet { raw, waw, war }
    }

    /// Get number of read keys
    pub fn read_count(&self) -> usize {
        self.reads.len()
    }

    /// Get number of write keys
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Check if the RW set is empty
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    /// Merge another RW set into this one
    pub fn merge(&mut self, other: &RWSet) {
        self.reads.extend(other.reads.iter().cloned());
        self.writes.extend(other.writes.iter().cloned());
    }

    /// Clear the RW set
    pub fn clear(&mut self) {
        self.reads.clear();
        self.writes.clear();
    }
}

/// Set of conflicting keys between two transactions
#[derive(Clone, Debug, Default)]
pub struct ConflictSet {
    /// Read-after-write conflicts
    pub raw: HashSet<StateKey>,
    /// Write-after-write conflicts
    pub waw: HashSet<StateKey>,
    /// Write-after-read conflicts (anti-dependency)
    pub war: HashSet<StateKey>,
}

impl ConflictSet {
    /// Check if there are any conflicts
    pub fn has_conflicts(&self) -> bool {
        !self.raw.is_empty() || !self.waw.is_empty() || !self.war.is_empty()
    }

    /// Get total number of conflicting keys
    pub fn total_conflicts(&self) -> usize {
        self.raw.len() + self.waw.len() + self.war.len()
    }
}
