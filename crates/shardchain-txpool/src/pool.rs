//! Transaction pool implementation.
//!
//! Five resources, each behind its own lock, taken in this fixed order
//! whenever more than one is needed in the same operation: `created`,
//! `addr_nonce`, `processed`, `received`, `submitted`.

use crate::error::{TxPoolError, TxPoolResult};
use parking_lot::Mutex;
use shardchain_primitives::H256;
use shardchain_types::{
    AddrNonceTxnMap, CreatedTransactions, ProcessedTransactions, Receipt, Transaction,
    TransactionWithReceipt,
};
use std::collections::HashSet;

/// Minimum gas price bump percentage required to replace a queued transaction.
const MIN_GAS_PRICE_BUMP_PERCENT: u64 = 10;

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of transactions held in `createdTransactions`.
    pub max_created: usize,
    /// Maximum number of transactions staged in `addrNonceTxnMap`.
    pub max_staged: usize,
    /// Per-transaction gas floor.
    pub min_gas_limit: u64,
    /// Gas limit for one microblock; no single transaction may exceed it.
    pub microblock_gas_limit: u64,
    /// Minimum accepted gas price.
    pub min_gas_price: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_created: 8192,
            max_staged: 2048,
            min_gas_limit: 1,
            microblock_gas_limit: 2_000_000,
            min_gas_price: 1,
        }
    }
}

/// A bound on how the next nonce for an account is determined. The pool has
/// no account-state of its own; the caller supplies the expected next nonce
/// (typically read from the last committed `TxBlock`'s state).
pub trait NonceSource {
    /// Next nonce this sender is expected to use.
    fn expected_nonce(&self, sender_addr: &shardchain_primitives::Address) -> u64;
}

/// Always expects nonce 0 next; useful for tests and a freshly bootstrapped chain.
pub struct ZeroNonceSource;

impl NonceSource for ZeroNonceSource {
    fn expected_nonce(&self, _sender_addr: &shardchain_primitives::Address) -> u64 {
        0
    }
}

/// Per-shard transaction pool.
pub struct TxPool {
    config: PoolConfig,
    created: Mutex<CreatedTransactions>,
    addr_nonce: Mutex<AddrNonceTxnMap>,
    processed: Mutex<ProcessedTransactions>,
    received: Mutex<HashSet<H256>>,
    submitted: Mutex<HashSet<H256>>,
}

impl TxPool {
    /// Create a new pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            created: Mutex::new(CreatedTransactions::new()),
            addr_nonce: Mutex::new(AddrNonceTxnMap::new()),
            processed: Mutex::new(ProcessedTransactions::new()),
            received: Mutex::new(HashSet::new()),
            submitted: Mutex::new(HashSet::new()),
        }
    }

    /// Create a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }

    /// Submit a newly created or forwarded transaction.
    ///
    /// Verifies the signature and gas bounds, then either inserts it
    /// directly into `createdTransactions` (nonce matches what `nonces`
    /// expects next) or stages it in `addrNonceTxnMap` for a future nonce.
    /// Draining `addrNonceTxnMap` into `createdTransactions` as the account
    /// nonce catches up is the caller's responsibility via
    /// [`TxPool::promote_staged`], mirroring the pool being fed by both
    /// direct submission and out-of-order forwarding.
    pub fn submit(&self, tx: Transaction, nonces: &dyn NonceSource) -> TxPoolResult<H256> {
        if tx.gas_limit < self.config.min_gas_limit {
            return Err(TxPoolError::GasLimitTooLow(tx.gas_limit));
        }
        if tx.gas_limit > self.config.microblock_gas_limit {
            return Err(TxPoolError::GasLimitExceedsBlock {
                gas_limit: tx.gas_limit,
                microblock_limit: self.config.microblock_gas_limit,
            });
        }
        let gas_price = tx.gas_price.low_u64();
        if gas_price < self.config.min_gas_price {
            return Err(TxPoolError::GasPriceTooLow(gas_price));
        }
        if !shardchain_crypto::verify(&tx.signing_bytes(), &tx.signature, &tx.sender_pub_key)
            .unwrap_or(false)
        {
            return Err(TxPoolError::InvalidSignature);
        }

        let id = tx.id();
        let sender_addr = tx.sender_addr();
        let expected = nonces.expected_nonce(&sender_addr);
        let offered = tx.nonce.low_u64();

        if offered < expected {
            return Err(TxPoolError::NonceTooLow { expected, got: offered });
        }

        let mut created = self.created.lock();

        if offered == expected {
            if created.len() >= self.config.max_created {
                return Err(TxPoolError::PoolFull(self.config.max_created));
            }
            if let Some(existing) = created.get(&id) {
                return Err(TxPoolError::AlreadyExists(existing.id()));
            }
            self.check_replacement(&created, &tx)?;
            created.insert(tx);
            return Ok(id);
        }

        drop(created);
        let mut addr_nonce = self.addr_nonce.lock();
        if addr_nonce.len() >= self.config.max_staged {
            return Err(TxPoolError::PoolFull(self.config.max_staged));
        }
        addr_nonce.stage(tx);
        Ok(id)
    }

    fn check_replacement(
        &self,
        created: &CreatedTransactions,
        incoming: &Transaction,
    ) -> TxPoolResult<()> {
        let existing = created
            .by_selection_order()
            .into_iter()
            .find(|tx| tx.sender_pub_key == incoming.sender_pub_key && tx.nonce == incoming.nonce);
        let Some(existing) = existing else {
            return Ok(());
        };
        let old_price = existing.gas_price.low_u64();
        let new_price = incoming.gas_price.low_u64();
        let min_price = old_price + old_price * MIN_GAS_PRICE_BUMP_PERCENT / 100;
        if new_price < min_price {
            return Err(TxPoolError::Underpriced { old: old_price, new: new_price });
        }
        Ok(())
    }

    /// Move every contiguous staged transaction for `sender_addr` starting at
    /// `from_nonce` into `createdTransactions`.
    pub fn promote_staged(
        &self,
        sender_addr: &shardchain_primitives::Address,
        from_nonce: u64,
    ) -> usize {
        let drained = {
            let mut addr_nonce = self.addr_nonce.lock();
            addr_nonce.drain_contiguous(sender_addr, shardchain_primitives::U256::from(from_nonce))
        };
        let n = drained.len();
        let mut created = self.created.lock();
        for tx in drained {
            created.insert(tx);
        }
        n
    }

    /// Select transactions for the next microblock in deterministic
    /// selection order, moving each one from `createdTransactions` into
    /// `processedTransactions[block_num]` as it is taken, without exceeding
    /// the microblock gas limit.
    pub fn dispatch_for_microblock(&self, block_num: u64) -> Vec<Transaction> {
        let mut created = self.created.lock();
        let ids: Vec<H256> = created.by_selection_order().into_iter().map(|tx| tx.id()).collect();

        let mut selected = Vec::new();
        let mut cum_gas: u64 = 0;
        for id in ids {
            let Some(tx) = created.get(&id) else { continue };
            let next_gas = cum_gas.saturating_add(tx.gas_limit);
            if next_gas > self.config.microblock_gas_limit {
                break;
            }
            cum_gas = next_gas;
            let tx = created.remove(&id).expect("id just observed in the pool");
            selected.push(tx);
        }
        drop(created);

        let mut processed = self.processed.lock();
        for tx in &selected {
            processed.insert(
                block_num,
                TransactionWithReceipt {
                    transaction: tx.clone(),
                    receipt: Receipt { cum_gas: 0, logs: Vec::new(), status: true },
                },
            );
        }
        selected
    }

    /// Attach an execution receipt to a transaction already recorded in
    /// `processedTransactions[block_num]`, replacing its placeholder receipt.
    pub fn record_receipt(&self, block_num: u64, id: &H256, receipt: Receipt) {
        let mut processed = self.processed.lock();
        if let Some(existing) = processed.get(block_num, id) {
            let transaction = existing.transaction.clone();
            processed.insert(block_num, TransactionWithReceipt { transaction, receipt });
        }
    }

    /// All processed transactions for `block_num`.
    pub fn processed_for_block(&self, block_num: u64) -> Vec<TransactionWithReceipt> {
        self.processed.lock().for_block(block_num).into_iter().cloned().collect()
    }

    /// Drop bookkeeping for `block_num` once its `TxBlock` has been
    /// finalized and its transactions are permanent.
    pub fn finalize_block(&self, block_num: u64) {
        self.processed.lock().clear_block(block_num);
    }

    /// Record that a transaction body was received via the sharing overlay,
    /// so it is not requested again. Returns whether this is the first time
    /// it was seen.
    pub fn mark_received(&self, id: H256) -> bool {
        self.received.lock().insert(id)
    }

    /// Record that a transaction id was submitted upward (to the DS
    /// committee, or to a peer shard for forwarding).
    pub fn mark_submitted(&self, id: H256) -> bool {
        self.submitted.lock().insert(id)
    }

    /// Whether `id` has already been submitted.
    pub fn is_submitted(&self, id: &H256) -> bool {
        self.submitted.lock().contains(id)
    }

    /// Number of transactions ready for proposal.
    pub fn created_len(&self) -> usize {
        self.created.lock().len()
    }

    /// Number of out-of-order transactions awaiting a nonce gap to close.
    pub fn staged_len(&self) -> usize {
        self.addr_nonce.lock().len()
    }

    /// Whether the pool has no ready or staged transactions.
    pub fn is_empty(&self) -> bool {
        self.created.lock().is_empty() && self.addr_nonce.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use shardchain_crypto::sign;
    use shardchain_primitives::{Address, KeyPair, U256};

    fn make_tx(keypair: &KeyPair, nonce: u64, gas_price: u64, gas_limit: u64) -> Transaction {
        let mut tx = Transaction {
            version: 1,
            nonce: U256::from(nonce),
            to_addr: Address::ZERO,
            sender_pub_key: keypair.public,
            amount: U256::from(1u64),
            gas_price: U256::from(gas_price),
            gas_limit,
            code: Bytes::new(),
            data: Bytes::new(),
            signature: sign(b"placeholder", keypair).unwrap(),
        };
        tx.signature = sign(&tx.signing_bytes(), keypair).unwrap();
        tx
    }

    #[test]
    fn submit_accepts_expected_nonce_into_created() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();
        let tx = make_tx(&keypair, 0, 10, 21_000);

        pool.submit(tx, &ZeroNonceSource).unwrap();

        assert_eq!(pool.created_len(), 1);
        assert_eq!(pool.staged_len(), 0);
    }

    #[test]
    fn submit_stages_future_nonce() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();
        let tx = make_tx(&keypair, 3, 10, 21_000);

        pool.submit(tx, &ZeroNonceSource).unwrap();

        assert_eq!(pool.created_len(), 0);
        assert_eq!(pool.staged_len(), 1);
    }

    #[test]
    fn submit_rejects_nonce_already_spent() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();

        struct AheadSource;
        impl NonceSource for AheadSource {
            fn expected_nonce(&self, _addr: &Address) -> u64 {
                5
            }
        }

        let tx = make_tx(&keypair, 2, 10, 21_000);
        let result = pool.submit(tx, &AheadSource);
        assert!(matches!(result, Err(TxPoolError::NonceTooLow { expected: 5, got: 2 })));
    }

    #[test]
    fn submit_rejects_tampered_signature() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();
        let mut tx = make_tx(&keypair, 0, 10, 21_000);
        tx.amount = U256::from(999_999u64);

        let result = pool.submit(tx, &ZeroNonceSource);
        assert!(matches!(result, Err(TxPoolError::InvalidSignature)));
    }

    #[test]
    fn replacement_below_bump_threshold_is_rejected() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();

        pool.submit(make_tx(&keypair, 0, 100, 21_000), &ZeroNonceSource).unwrap();
        let result = pool.submit(make_tx(&keypair, 0, 105, 21_000), &ZeroNonceSource);

        assert!(matches!(result, Err(TxPoolError::Underpriced { .. })));
    }

    #[test]
    fn replacement_above_bump_threshold_displaces_old_entry() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();

        pool.submit(make_tx(&keypair, 0, 100, 21_000), &ZeroNonceSource).unwrap();
        pool.submit(make_tx(&keypair, 0, 200, 21_000), &ZeroNonceSource).unwrap();

        assert_eq!(pool.created_len(), 1);
    }

    #[test]
    fn promote_staged_moves_contiguous_nonces_into_created() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();
        let addr = make_tx(&keypair, 0, 10, 21_000).sender_addr();

        pool.submit(make_tx(&keypair, 1, 10, 21_000), &ZeroNonceSource).unwrap();
        pool.submit(make_tx(&keypair, 2, 10, 21_000), &ZeroNonceSource).unwrap();
        assert_eq!(pool.staged_len(), 1);

        let promoted = pool.promote_staged(&addr, 1);
        assert_eq!(promoted, 2);
        assert_eq!(pool.created_len(), 2);
        assert_eq!(pool.staged_len(), 0);
    }

    #[test]
    fn dispatch_for_microblock_respects_gas_limit_and_selection_order() {
        let config = PoolConfig { microblock_gas_limit: 50_000, ..Default::default() };
        let pool = TxPool::new(config);

        let key_a = shardchain_crypto::generate_keypair();
        let key_b = shardchain_crypto::generate_keypair();
        pool.submit(make_tx(&key_a, 0, 5, 30_000), &ZeroNonceSource).unwrap();
        pool.submit(make_tx(&key_b, 0, 50, 30_000), &ZeroNonceSource).unwrap();

        let selected = pool.dispatch_for_microblock(7);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].gas_price.low_u64(), 50);
        assert_eq!(pool.created_len(), 1);
        assert_eq!(pool.processed_for_block(7).len(), 1);
    }

    #[test]
    fn finalize_block_clears_processed_bookkeeping() {
        let pool = TxPool::with_defaults();
        let keypair = shardchain_crypto::generate_keypair();
        pool.submit(make_tx(&keypair, 0, 10, 21_000), &ZeroNonceSource).unwrap();
        pool.dispatch_for_microblock(1);

        assert_eq!(pool.processed_for_block(1).len(), 1);
        pool.finalize_block(1);
        assert_eq!(pool.processed_for_block(1).len(), 0);
    }

    #[test]
    fn received_and_submitted_sets_track_first_sighting() {
        let pool = TxPool::with_defaults();
        let id = H256::ZERO;
        assert!(pool.mark_received(id));
        assert!(!pool.mark_received(id));
        assert!(pool.mark_submitted(id));
        assert!(pool.is_submitted(&id));
    }

    #[test]
    fn gas_limit_below_minimum_is_rejected() {
        let config = PoolConfig { min_gas_limit: 21_000, ..Default::default() };
        let pool = TxPool::new(config);
        let keypair = shardchain_crypto::generate_keypair();
        let tx = make_tx(&keypair, 0, 10, 100);

        let result = pool.submit(tx, &ZeroNonceSource);
        assert!(matches!(result, Err(TxPoolError::GasLimitTooLow(100))));
    }
}
