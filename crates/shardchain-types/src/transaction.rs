//! Transactions, receipts, and the in-memory pool shapes used to stage them
//! between creation and finalization.

use std::collections::BTreeMap;

use bytes::Bytes;
use rlp::RlpStream;
use shardchain_crypto::{sha256, MultiSignature};
use shardchain_primitives::{Address, PublicKey, H256, U256};

use crate::committee::ShardId;

/// A single transaction.
///
/// `senderAddr` is derived, not stored: `last 20 bytes of SHA256(senderPubKey)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Wire format version
    pub version: u32,
    /// Sender account nonce
    pub nonce: U256,
    /// Recipient address (zero address for contract creation)
    pub to_addr: Address,
    /// Sender's public key
    pub sender_pub_key: PublicKey,
    /// Value transferred
    pub amount: U256,
    /// Gas price offered
    pub gas_price: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Contract code (creation only)
    pub code: Bytes,
    /// Call data
    pub data: Bytes,
    /// Signature over the canonical encoding of every field above
    pub signature: MultiSignature,
}

impl Transaction {
    /// The exact byte sequence `tranId` and the signature are computed over:
    /// every field except the signature itself.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        s.append(&self.version);
        s.append(&self.nonce.low_u64());
        s.append(&self.to_addr);
        s.append(&self.sender_pub_key.as_bytes().to_vec());
        s.append(&self.amount.low_u64());
        s.append(&self.gas_price.low_u64());
        s.append(&self.gas_limit);
        s.append(&self.code.to_vec());
        s.append(&self.data.to_vec());
        s.out().to_vec()
    }

    /// `tranId = SHA256(canonical encoding)`.
    pub fn id(&self) -> H256 {
        sha256(&self.signing_bytes())
    }

    /// `senderAddr = last 20 bytes of SHA256(senderPubKey)`.
    pub fn sender_addr(&self) -> Address {
        let digest = sha256(self.sender_pub_key.as_bytes());
        Address::from_slice(&digest.as_bytes()[12..]).expect("sha256 digest has at least 20 bytes")
    }

    /// `shardIndex(addr, n) = f(addr) mod n` for the fixed address-to-shard
    /// function `f`, taken here as the address's low 32 bits. `n` must be
    /// nonzero (the sharding structure always has at least one shard once
    /// bootstrap completes).
    pub fn shard_index(&self, num_shards: u32) -> ShardId {
        let addr = self.sender_addr();
        let bytes = addr.as_bytes();
        let low32 = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        low32 % num_shards
    }
}

/// Execution outcome attached to a transaction once it has been processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Cumulative gas used in the microblock up to and including this transaction
    pub cum_gas: u64,
    /// Emitted log entries, opaque to this layer
    pub logs: Vec<Bytes>,
    /// Whether execution succeeded
    pub status: bool,
}

/// A transaction together with its execution receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionWithReceipt {
    /// The transaction
    pub transaction: Transaction,
    /// Its execution outcome
    pub receipt: Receipt,
}

/// Per-shard pool of transactions awaiting inclusion in a microblock.
///
/// Indexed by `(senderPubKey, nonce)` for uniqueness, by `tranId` for direct
/// lookup, and iterated in `(gasPrice desc, tranId)` order for proposal
/// selection.
#[derive(Clone, Debug, Default)]
pub struct CreatedTransactions {
    by_sender_nonce: BTreeMap<(PublicKey, U256), H256>,
    by_id: BTreeMap<H256, Transaction>,
}

impl CreatedTransactions {
    /// An empty pool.
    pub fn new() -> Self {
        Self { by_sender_nonce: BTreeMap::new(), by_id: BTreeMap::new() }
    }

    /// Insert a transaction. Returns the transaction it displaced, if the
    /// sender already had one queued at the same nonce.
    pub fn insert(&mut self, tx: Transaction) -> Option<Transaction> {
        let id = tx.id();
        let sender_nonce = (tx.sender_pub_key, tx.nonce);
        let displaced_id = self.by_sender_nonce.insert(sender_nonce, id);
        self.by_id.insert(id, tx);
        displaced_id.and_then(|old_id| {
            if old_id == id {
                None
            } else {
                self.by_id.remove(&old_id)
            }
        })
    }

    /// Remove a transaction by id.
    pub fn remove(&mut self, id: &H256) -> Option<Transaction> {
        let tx = self.by_id.remove(id)?;
        self.by_sender_nonce.remove(&(tx.sender_pub_key, tx.nonce));
        Some(tx)
    }

    /// Look up a transaction by id.
    pub fn get(&self, id: &H256) -> Option<&Transaction> {
        self.by_id.get(id)
    }

    /// Number of queued transactions.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Transactions in proposal-selection order: descending gas price, then
    /// ascending `tranId` to break ties deterministically.
    pub fn by_selection_order(&self) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self.by_id.values().collect();
        txs.sort_by(|a, b| b.gas_price.cmp(&a.gas_price).then_with(|| a.id().cmp(&b.id())));
        txs
    }
}

/// `senderAddr -> (nonce -> Transaction)`: out-of-order future transactions
/// staged until the account nonce catches up.
#[derive(Clone, Debug, Default)]
pub struct AddrNonceTxnMap {
    staged: BTreeMap<Address, BTreeMap<U256, Transaction>>,
}

impl AddrNonceTxnMap {
    /// An empty map.
    pub fn new() -> Self {
        Self { staged: BTreeMap::new() }
    }

    /// Stage a future transaction.
    pub fn stage(&mut self, tx: Transaction) {
        let addr = tx.sender_addr();
        self.staged.entry(addr).or_default().insert(tx.nonce, tx);
    }

    /// Drain every transaction for `addr` whose nonce is `>= from_nonce`, in
    /// ascending nonce order, stopping at the first gap.
    pub fn drain_contiguous(&mut self, addr: &Address, from_nonce: U256) -> Vec<Transaction> {
        let Some(entries) = self.staged.get_mut(addr) else {
            return Vec::new();
        };
        let mut drained = Vec::new();
        let mut expect = from_nonce;
        while let Some(tx) = entries.remove(&expect) {
            drained.push(tx);
            expect += U256::one();
        }
        if entries.is_empty() {
            self.staged.remove(addr);
        }
        drained
    }

    /// Number of addresses with staged transactions.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Whether there is no staged transaction for any address.
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

/// `processedTransactions[blockNum] = (txnId -> TransactionWithReceipt)`:
/// transactions finalized for the tx-epoch currently being committed.
#[derive(Clone, Debug, Default)]
pub struct ProcessedTransactions {
    by_block: BTreeMap<u64, BTreeMap<H256, TransactionWithReceipt>>,
}

impl ProcessedTransactions {
    /// An empty table.
    pub fn new() -> Self {
        Self { by_block: BTreeMap::new() }
    }

    /// Record a processed transaction for `block_num`.
    pub fn insert(&mut self, block_num: u64, item: TransactionWithReceipt) {
        let id = item.transaction.id();
        self.by_block.entry(block_num).or_default().insert(id, item);
    }

    /// Look up a processed transaction by block number and id.
    pub fn get(&self, block_num: u64, id: &H256) -> Option<&TransactionWithReceipt> {
        self.by_block.get(&block_num)?.get(id)
    }

    /// All transactions processed for `block_num`.
    pub fn for_block(&self, block_num: u64) -> Vec<&TransactionWithReceipt> {
        self.by_block.get(&block_num).map(|m| m.values().collect()).unwrap_or_default()
    }

    /// Drop bookkeeping for a finalized epoch once its `TxBlock` has been
    /// committed and transactions are permanent.
    pub fn clear_block(&mut self, block_num: u64) {
        self.by_block.remove(&block_num);
    }
}

/// Identifies a set of microblock transaction hashes awaiting availability.
pub type MicroBlockHashSet = Vec<H256>;

/// `unavailableMicroBlocks[txBlockNum] = set of (MicroBlockHashSet, shardId)`:
/// microblocks whose bodies are still required for full availability.
#[derive(Clone, Debug, Default)]
pub struct UnavailableMicroBlocks {
    by_tx_block: BTreeMap<u64, Vec<(MicroBlockHashSet, ShardId)>>,
}

impl UnavailableMicroBlocks {
    /// An empty table.
    pub fn new() -> Self {
        Self { by_tx_block: BTreeMap::new() }
    }

    /// Record that `tx_block_num` still requires the body for the microblock
    /// identified by `hashes` from `shard_id`.
    pub fn mark_pending(&mut self, tx_block_num: u64, hashes: MicroBlockHashSet, shard_id: ShardId) {
        self.by_tx_block.entry(tx_block_num).or_default().push((hashes, shard_id));
    }

    /// Remove the pending entry for `shard_id` once its body has arrived.
    /// Returns whether `tx_block_num` has no pending microblocks left.
    pub fn resolve(&mut self, tx_block_num: u64, shard_id: ShardId) -> bool {
        let Some(entries) = self.by_tx_block.get_mut(&tx_block_num) else {
            return true;
        };
        entries.retain(|(_, sid)| *sid != shard_id);
        let empty = entries.is_empty();
        if empty {
            self.by_tx_block.remove(&tx_block_num);
        }
        empty
    }

    /// Whether `tx_block_num` has no pending microblocks.
    pub fn is_resolved(&self, tx_block_num: u64) -> bool {
        !self.by_tx_block.contains_key(&tx_block_num)
    }
}
