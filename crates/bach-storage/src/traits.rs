//! Storage traits for state access

use crate::error::StorageResult;
use bach_primitives::{Address, H256};

/// Account data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: u128,
    /// Code hash (keccak256 of code, or EMPTY_CODE_HASH if no code)
    pub code_hash: H256,
    /// Storage root (merkle root of storage trie)
    pub storage_root: H256,
}

/// Empty code hash (keccak256 of empty bytes)
pub const EMPTY_CODE_HASH: H256 = H256::from_bytes([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Empty storage root (keccak256 of RLP encoded empty list)
pub const EMPTY_STORAGE_ROOT: H256 = H256::from_bytes([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6,
    0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0,
    0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

impl Account {
    /// Create a new empty account
    pub fn new() -> Self {
        Self {
            nonce: 0,
            balance: 0,
            code_hash: EMPTY_CODE_HASH,
            storage_root: EMPTY_STORAGE_ROOT,
        }
    }

    /// Check if account is empty (EIP-161)
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance == 0 && self.code_hash == EMPTY_CODE_HASH
    }

    /// Check if account has code
    pub fn has_code(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }

    /// Serialize account to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 16 + 32 + 32);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(&self.balance.to_le_bytes());
        bytes.extend_from_slice(self.code_hash.as_bytes());
        bytes.extend_from_slice(self.storage_root.as_bytes());
        bytes
    }

    /// Deserialize account from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 8 + 16 + 32 + 32 {
            return None;
        }
        let nonce = u64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let balance = u128::from_le_bytes(bytes[8..24].try_into().ok()?);
        let code_hash = H256::from_slice(&bytes[24..56]).ok()?;
        let storage_root = H256::from_slice(&bytes[56..88]).ok()?;
        Some(Self {
            nonce,
            balance,
            code_hash,
            storage_root,
        })
    }
}

/// Read access to state
pub trait StateReader {
    /// Get account by address
    fn get_account(&self, address: &Address) -> StorageResult<Option<Account>>;

    /// Get storage value
    fn get_storage(&self, address: &Address, key: &H256) -> StorageResult<H256>;

    /// Get contract code by hash
    fn get_code(&self, code_hash: &H256) -> StorageResult<Option<Vec<u8>>>;

    /// Check if account exists
    fn account_exists(&self, address: &Address) -> StorageResult<bool> {
        Ok(self.get_account(address)?.is_some())
    }

    /// Get account nonce
    fn get_nonce(&self, address: &Address) -> StorageResult<u64> {
        Ok(self.get_account(address)?.map(|a| a.nonce).unwrap_or(0))
    }

    /// Get account balance
    fn get_balance(&self, address: &Address) -> StorageResult<u128> {
        Ok(self.get_account(address)?.map(|a| a.balance).unwrap_or(0))
    }

    /// Get account code hash
    fn get_code_hash(&self, address: &Address) -> StorageResult<H256> {
        Ok(self.get_account(address)?.map(|a| a.code_hash).unwrap_or(EMPTY_CODE_HASH))
    }
}

/// Write access to state
pub trait StateWriter {
    /// Set account
    fn set_account(&mut self, address: Address, account: Account) -> StorageResult<()>;

    /// Delete account
    fn delete_account(&mut self, address: &Address) -> StorageResult<()>;

    /// Set storage value
    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageResult<()>;

    /// Set contract code
    fn set_code(&mut self, code_hash: H256, code: Vec<u8>) -> StorageResult<()>;

    /// Increment nonce
    fn increment_nonce(&mut self, address: &Address) -> StorageResult<u64>
    where
        Self: StateReader,
    {
        let mut account = self.get_account(address)?.unwrap_or_default();
        account.nonce = account.nonce
            .checked_add(1)
            .ok_or_else(|| crate::error::StorageError::InvalidFormat("nonce overflow".into()))?;
        let new_nonce = account.nonce;
        self.set_account(*address, account)?;
        Ok(new_nonce)
    }

    /// Add to balance
    fn add_balance(&mut self, address: &Address, amount: u128) -> StorageResult<()>
    where
        Self: StateReader,
    {
        let mut account = self.get_account(address)?.unwrap_or_default();
        account.balance = account.balance.saturating_add(amount);
        self.set_account(*address, account)
    }

    /// Subtract from balance (returns false if insufficient)
    fn sub_balance(&mut self, address: &Address, amount: u128) -> StorageResult<bool>
    where
        Self: StateReader,
    {
        let mut account = self.get_account(address)?.unwrap_or_default();
        if account.balance < amount {
            return Ok(false);
        }
        account.balance -= amount;
        self.set_account(*address, account)?;
        Ok(true)
    }
}

/// Combined read/write state access
pub trait State: StateReader + StateWriter {}

impl<T: StateReader + StateWriter> State for T {}
