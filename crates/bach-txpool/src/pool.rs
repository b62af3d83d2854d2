//! Transaction pool implementation

use crate::error::{TxPoolError, TxPoolResult};
use bach_primitives::{Address, H256};
use bach_types::SignedTransaction;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Minimum gas price bump percentage for replacement (default 10%)
const MIN_GAS_PRICE_BUMP: u128 = 10;

/// Maximum nonce gap allowed for queued transactions
const MAX_NONCE_GAP: u64 = 64;

/// Minimum gas for any transaction
const MIN_GAS_LIMIT: u64 = 21000;

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of pending transactions
    pub max_pending: usize,
    /// Maximum number of queued transactions
    pub max_queued: usize,
    /// Maximum transactions per account
    pub max_per_account: usize,
    /// Block gas limit
    pub block_gas_limit: u64,
    /// Minimum gas price
    pub min_gas_price: u128,
    /// Base fee (for EIP-1559)
    pub base_fee: u128,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pending: 4096,
            max_queued: 1024,
            max_per_account: 16,
            block_gas_limit: 30_000_000,
            min_gas_price: 1_000_000_000, // 1 gwei
            base_fee: 0,
        }
    }
}

/// Transaction with computed metadata
#[derive(Clone, Debug)]
pub struct PooledTransaction {
    /// The signed transaction
    pub tx: SignedTransaction,
    /// Recovered sender address
    pub sender: Address,
    /// Transaction hash
    pub hash: H256,
    /// Effective gas price at current base fee
    pub effective_gas_price: u128,
}

impl PooledTransaction {
    /// Get nonce
    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    /// Get gas limit
    pub fn gas_limit(&self) -> u64 {
        self.tx.gas_limit()
    }
}

/// Account state in pool
#[derive(Default)]
struct AccountTxs {
    /// Pending transactions (nonce -> tx), ready for execution
    pending: BTreeMap<u64, PooledTransaction>,
    /// Queued transactions (nonce -> tx), waiting for nonce gap to fill
    queued: BTreeMap<u64, PooledTransaction>,
    /// Current nonce from state
    state_nonce: u64,
}

/// Transaction pool
pub struct TxPool {
    /// Configuration
    config: PoolConfig,
    /// All transactions by hash
    by_hash: DashMap<H256, PooledTransaction>,
    /// Transactions organized by sender
    by_sender: DashMap<Address, RwLock<AccountTxs>>,
    /// Pending count
    pending_count: AtomicUsize,
    /// Queued count
    queued_count: AtomicUsize,
}

impl TxPool {
    /// Create new pool with config
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            by_hash: DashMap::new(),
            by_sender: DashMap::new(),
            pending_count: AtomicUsize::new(0),
            queued_count: AtomicUsize::new(0),
        }
    }

    /// Create pool with default config
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }

    /// Add a transaction to the pool
    pub fn add(&self, tx: SignedTransaction, sender: Address, hash: H256) -> TxPoolResult<()> {
        // Check if already exists
        if self.by_hash.contains_key(&hash) {
            return Err(TxPoolError::AlreadyExists(hash));
        }

        // Validate gas limit
        let gas_limit = tx.gas_limit();
        if gas_limit < MIN_GAS_LIMIT {
            return Err(TxPoolError::GasLimitTooLow(gas_limit));
        }
        if gas_limit > self.config.block_gas_limit {
            return Err(TxPoolError::GasLimitExceedsBlock {
                gas_limit,
                block_limit: self.config.block_gas_limit,
            });
        }

        // Calculate effective gas price
        let effective_gas_price = tx
            .effective_gas_price(self.config.base_fee)
            .ok_or(TxPoolError::GasPriceTooLow(0))?;

        if effective_gas_price < self.config.min_gas_price {
            return Err(TxPoolError::GasPriceTooLow(effective_gas_price));
        }

        let pooled = PooledTransaction {
            tx,
            sender,
            hash,
            effective_gas_price,
        };

        // Get or create account entry
        let account_entry = self
            .by_sender
            .entry(sender)
            .or_insert_with(|| RwLock::new(AccountTxs::default()));
        let mut account = account_entry.write();

        let nonce = pooled.nonce();
        let state_nonce = account.state_nonce;

        // Check nonce
        if nonce < state_nonce {
            return Err(TxPoolError::NonceTooLow {
                expected: state_nonce,
                got: nonce,
            });
        }

        // Check nonce gap
        if nonce > state_nonce + MAX_NONCE_GAP {
            return Err(TxPoolError::NonceGapTooLarge {
                current: state_nonce,
                tx_nonce: nonce,
            });
        }

        // Check for replacement
        let mut replacing_pending = false;
        let mut replacing_queued = false;

        if let Some(existing) = account.pending.get(&nonce) {
            let min_price = existing.effective_gas_price
                + existing.effective_gas_price * MIN_GAS_PRICE_BUMP / 100;
            if effective_gas_price < min_price {
                return Err(TxPoolError::Underpriced {
                    old: existing.effective_gas_price,
                    new: effective_gas_price,
                });
            }
            // Remove old transaction from hash index
            self.by_hash.remove(&existing.hash);
            replacing_pending = true;
        }

        if let Some(existing) = account.queued.get(&nonce) {
            let min_price = existing.effective_gas_price
                + existing.effective_gas_price * MIN_GAS_PRICE_BUMP / 100;
            if effective_gas_price < min_price {
                return Err(TxPoolError::Underpriced {
                    old: existing.effective_gas_price,
                    new: effective_gas_price,
                });
            }
            // Remove old transaction from hash index
            self.by_hash.remove(&existing.hash);
            replacing_queued = true;
        }

        // Check pool limits
        let total = self.pending_count.load(Ordering::SeqCst) + self.queued_count.load(Ordering::SeqCst);
        if total >= self.config.max_pending + self.config.max_queued {
            return Err(TxPoolError::PoolFull(total));
        }

        // Check per-account limit
        if account.pending.len() + account.queued.len() >= self.config.max_per_account {
            return Err(TxPoolError::PoolFull(self.config.max_per_account));
        }

        // Insert transaction
        self.by_hash.insert(hash, pooled.clone());

        // Determine if pending or queued
        if replacing_pending || nonce == state_nonce + account.pending.len() as u64 {
            // Can go to pending (or is replacing a pending tx)
            account.pending.insert(nonce, pooled);
            if !replacing_pending {
                self.pending_count.fetch_add(1, Ordering::SeqCst);
            }
            // Try to promote queued transactions
            self.promote_queued(&mut account);
        } else if replacing_queued {
            // Replacing a queued tx
            account.queued.insert(nonce, pooled);
            // Count stays the same
        } else {
            // Goes to queued
            account.queued.insert(nonce, pooled);
            self.queued_count.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }

    /// Promote queued transactions to pending if nonce gaps are filled
    fn promote_queued(&self, account: &mut AccountTxs) {
        let mut next_nonce = account.state_nonce + account.pending.len() as u64;

        while let Some(tx) = account.queued.remove(&next_nonce) {
            account.pending.insert(next_nonce, tx);
            self.queued_count.fetch_sub(1, Ordering::SeqCst);
            self.pending_count.fetch_add(1, Ordering::SeqCst);
            next_nonce += 1;
        }
    }

    /// Remove transaction by hash
    pub fn remove(&self, hash: &H256) -> Option<PooledTransaction> {
        let (_, pooled) = self.by_hash.remove(hash)?;

        if let Some(account_entry) = self.by_sender.get(&pooled.sender) {
            let mut account = account_entry.write();
            if account.pending.remove(&pooled.nonce()).is_some() {
                self.pending_count.fetch_sub(1, Ordering::SeqCst);
            } else if account.queued.remove(&pooled.nonce()).is_some() {
                self.queued_count.fetch_sub(1, Ordering::SeqCst);
            }
        }

        Some(pooled)
    }

    /// Get pending transactions for block production, ordered by gas price
    pub fn get_pending(&self, limit: usize) -> Vec<PooledTransaction> {
        let mut all_pending: Vec<PooledTransaction> = Vec::new();

        // Collect all pending transactions
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            for (_, tx) in account.pending.iter() {
                all_pending.push(tx.clone());
            }
        }

        // Sort by effective gas price (descending)
        all_pending.sort_by(|a, b| b.effective_gas_price.cmp(&a.effective_gas_price));

        // Limit and return
        all_pending.truncate(limit);
        all_pending
    }

    /// Get transaction by hash
    pub fn get_by_hash(&self, hash: &H256) -> Option<PooledTransaction> {
        self.by_hash.get(hash).map(|r| r.clone())
    }

    /// Get next nonce for account (considering pending transactions)
    pub fn get_nonce(&self, address: &Address) -> u64 {
        self.by_sender
            .get(address)
            .map(|entry| {
                let account = entry.read();
                account.state_nonce + account.pending.len() as u64
            })
            .unwrap_or(0)
    }

    /// Update account state nonce (e.g., after block execution)
    pub fn set_nonce(&self, address: &Address, nonce: u64) {
        if let Some(entry) = self.by_sender.get(address) {
            let mut account = entry.write();
            let old_nonce = account.state_nonce;
            account.state_nonce = nonce;

            // Remove any pending transactions with nonce < new state nonce
            let to_remove: Vec<u64> = account
                .pending
                .range(..nonce)
                .map(|(n, _)| *n)
                .collect();

            for n in to_remove {
                if let Some(tx) = account.pending.remove(&n) {
                    self.by_hash.remove(&tx.hash);
                    self.pending_count.fetch_sub(1, Ordering::SeqCst);
                }
            }

            // Also remove queued transactions with nonce < new state nonce
            let to_remove: Vec<u64> = account
                .queued
                .range(..nonce)
                .map(|(n, _)| *n)
                .collect();

            for n in to_remove {
                if let Some(tx) = account.queued.remove(&n) {
                    self.by_hash.remove(&tx.hash);
                    self.queued_count.fetch_sub(1, Ordering::SeqCst);
                }
            }

            // Try to promote queued transactions if nonce increased
            if nonce > old_nonce {
                self.promote_queued(&mut account);
            }
        }
    }

    /// Update base fee (recalculates effective gas prices)
    pub fn set_base_fee(&self, base_fee: u128) {
        // Note: This is a simplified implementation
        // A production version would recalculate all effective gas prices
        // and potentially evict transactions that are no longer valid
        let _ = base_fee;
    }

    /// Get total number of transactions
    pub fn len(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst) + self.queued_count.load(Ordering::SeqCst)
    }

    /// Check if pool is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get pending transaction count
    pub fn pending_len(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst)
    }

    /// Get queued transaction count
    pub fn queued_len(&self) -> usize {
        self.queued_count.load(Ordering::SeqCst)
    }

    /// Get all pending hashes (for syncing)
    pub fn pending_hashes(&self) -> Vec<H256> {
        let mut hashes = Vec::new();
        for entry in self.by_sender.iter() {
            let account = entry.read();
            for (_, tx) in account.pending.iter() {
                hashes.push(tx.hash);
            }
        }
        hashes
    }

    /// Clear all transactions
    pub fn clear(&self) {
        self.by_hash.clear();
        self.by_sender.clear();
        self.pending_count.store(0, Ordering::SeqCst);
        self.queued_count.store(0, Ordering::SeqCst);
    }
}
