//! State database implementation

use crate::db::{cf, Database};
use crate::error::{StorageError, StorageResult};
use crate::traits::{Account, StateReader, StateWriter};
use bach_primitives::{Address, H256};
use std::collections::HashMap;

/// Storage key combining address and slot
fn storage_key(address: &Address, slot: &H256) -> Vec<u8> {
    let mut key = Vec::with_capacity(20 + 32);
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(slot.as_bytes());
    key
}

/// State database backed by RocksDB
pub struct StateDb {
    db: Database,
}

impl StateDb {
    /// Create a new state database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Commit changes from a cache
    pub fn commit(&self, cache: &StateCache) -> StorageResult<()> {
        let mut batch = self.db.batch();

        // Commit accounts
        for (address, account) in &cache.accounts {
            if let Some(account) = account {
                batch.put(cf::ACCOUNTS, address.as_bytes(), &account.to_bytes());
            } else {
                batch.delete(cf::ACCOUNTS, address.as_bytes());
            }
        }

        // Commit storage
        for ((address, slot), value) in &cache.storage {
            let key = storage_key(address, slot);
            if *value == H256::ZERO {
                batch.delete(cf::STORAGE, &key);
            } else {
                batch.put(cf::STORAGE, &key, value.as_bytes());
            }
        }

        // Commit code
        for (code_hash, code) in &cache.code {
            batch.put(cf::CODE, code_hash.as_bytes(), code);
        }

        self.db.write_batch(batch)
    }
}

impl StateReader for StateDb {
    fn get_account(&self, address: &Address) -> StorageResult<Option<Account>> {
        let bytes = self.db.get(cf::ACCOUNTS, address.as_bytes())?;
        Ok(bytes.and_then(|b| Account::from_bytes(&b)))
    }

    fn get_storage(&self, address: &Address, key: &H256) -> StorageResult<H256> {
        let storage_key = storage_key(address, key);
        let bytes = self.db.get(cf::STORAGE, &storage_key)?;
        match bytes {
            Some(b) => H256::from_slice(&b)
                .map_err(|e| StorageError::Deserialization(e.to_string())),
            None => Ok(H256::ZERO),
        }
    }

    fn get_code(&self, code_hash: &H256) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(cf::CODE, code_hash.as_bytes())
    }
}

impl StateWriter for StateDb {
    fn set_account(&mut self, address: Address, account: Account) -> StorageResult<()> {
        self.db.put(cf::ACCOUNTS, address.as_bytes(), &account.to_bytes())
    }

    fn delete_account(&mut self, address: &Address) -> StorageResult<()> {
        self.db.delete(cf::ACCOUNTS, address.as_bytes())
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageResult<()> {
        let storage_key = storage_key(&address, &key);
        if value == H256::ZERO {
            self.db.delete(cf::STORAGE, &storage_key)
        } else {
            self.db.put(cf::STORAGE, &storage_key, value.as_bytes())
        }
    }

    fn set_code(&mut self, code_hash: H256, code: Vec<u8>) -> StorageResult<()> {
        self.db.put(cf::CODE, code_hash.as_bytes(), &code)
    }
}

/// In-memory state cache for batching changes
#[derive(Default)]
pub struct StateCache {
    /// Cached accounts (None = deleted)
    accounts: HashMap<Address, Option<Account>>,
    /// Cached storage
    storage: HashMap<(Address, H256), H256>,
    /// Cached code
    code: HashMap<H256, Vec<u8>>,
}

impl StateCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all cached changes
    pub fn clear(&mut self) {
        self.accounts.clear();
        self.storage.clear();
        self.code.clear();
    }

    /// Get number of cached account changes
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Get number of cached storage changes
    pub fn storage_count(&self) -> usize {
        self.storage.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.storage.is_empty() && self.code.is_empty()
    }
}

impl StateReader for StateCache {
    fn get_account(&self, address: &Address) -> StorageResult<Option<Account>> {
        Ok(self.accounts.get(address).cloned().flatten())
    }

    fn get_storage(&self, address: &Address, key: &H256) -> StorageResult<H256> {
        Ok(self.storage.get(&(*address, *key)).cloned().unwrap_or(H256::ZERO))
    }

    fn get_code(&self, code_hash: &H256) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.code.get(code_hash).cloned())
    }
}

impl StateWriter for StateCache {
    fn set_account(&mut self, address: Address, account: Account) -> StorageResult<()> {
        self.accounts.insert(address, Some(account));
        Ok(())
    }

    fn delete_account(&mut self, address: &Address) -> StorageResult<()> {
        self.accounts.insert(*address, None);
        Ok(())
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageResult<()> {
        self.storage.insert((address, key), value);
        Ok(())
    }

    fn set_code(&mut self, code_hash: H256, code: Vec<u8>) -> StorageResult<()> {
        self.code.insert(code_hash, code);
        Ok(())
    }
}

/// Layered state with fallback to underlying storage
pub struct CachedState<'a> {
    cache: StateCache,
    underlying: &'a dyn StateReader,
}

impl<'a> CachedState<'a> {
    /// Create a new cached state layer
    pub fn new(underlying: &'a dyn StateReader) -> Self {
        Self {
            cache: StateCache::new(),
            underlying,
        }
    }

    /// Get the cache
    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Take ownership of the cache
    pub fn into_cache(self) -> StateCache {
        self.cache
    }
}

impl StateReader for CachedState<'_> {
    fn get_account(&self, address: &Address) -> StorageResult<Option<Account>> {
        // Check cache first
        if let Some(cached) = self.cache.accounts.get(address) {
            return Ok(cached.clone());
        }
        // Fall back to underlying
        self.underlying.get_account(address)
    }

    fn get_storage(&self, address: &Address, key: &H256) -> StorageResult<H256> {
        // Check cache first
        if let Some(cached) = self.cache.storage.get(&(*address, *key)) {
            return Ok(*cached);
        }
        // Fall back to underlying
        self.underlying.get_storage(address, key)
    }

    fn get_code(&self, code_hash: &H256) -> StorageResult<Option<Vec<u8>>> {
        // Check cache first
        if let Some(cached) = self.cache.code.get(code_hash) {
            return Ok(Some(cached.clone()));
        }
        // Fall back to underlying
        self.underlying.get_code(code_hash)
    }
}

impl StateWriter for CachedState<'_> {
    fn set_account(&mut self, address: Address, account: Account) -> StorageResult<()> {
        self.cache.set_account(address, account)
    }

    fn delete_account(&mut self, address: &Address) -> StorageResult<()> {
        self.cache.delete_account(address)
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageResult<()> {
        self.cache.set_storage(address, key, value)
    }

    fn set_code(&mut self, code_hash: H256, code: Vec<u8>) -> StorageResult<()> {
        self.cache.set_code(code_hash, code)
    }
}
