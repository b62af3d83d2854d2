//! State key types for ownership tracking

use bach_primitives::{Address, H256};

/// A unique identifier for a piece of state (storage slot)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Contract address
    pub address: Address,
    /// Storage slot
    pub slot: H256,
}

impl StateKey {
    /// Create a new state key
    pub fn new(address: Address, slot: H256) -> Self {
        Self { address, slot }
    }

    /// Create state key for account balance
    pub fn balance(address: Address) -> Self {
        Self {
            address,
            slot: H256::ZERO,
        }
    }

    /// Create state key for account nonce
    pub fn nonce(address: Address) -> Self {
        Self {
            address,
            slot: H256::from_bytes([0x01; 32]),
        }
    }

    /// Create state key for contract code
    pub fn code(address: Address) -> Self {
        Self {
            address,
            slot: H256::from_bytes([0x02; 32]),
        }
    }
}

/// Transaction identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(pub u32);

impl TxId {
    /// Create a new transaction ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for TxId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<usize> for TxId {
    fn from(id: usize) -> Self {
        Self(id as u32)
    }
}
