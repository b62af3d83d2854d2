//! The node-facing persistence contract: DS blocks, tx blocks, a rolling
//! per-epoch queue of transaction bodies, and free-form metadata.
//!
//! The tx-body queue mirrors a producer that calls `pushBackTxBodyDb` once a
//! tx-epoch's bodies are all written and a consumer that calls
//! `popFrontTxBodyDb` to evict the oldest tx-epoch once it has been
//! persisted into a `TxBlock`. Bodies live in a single `TX_BODIES` column
//! family keyed by `generation (8B BE) || tranId (32B)`; the set of
//! still-queued generations is tracked under a reserved metadata key so a
//! restart can resume the queue without rescanning the whole column family.

use crate::db::{cf, Database};
use crate::error::{StorageError, StorageResult};
use std::collections::VecDeque;

const QUEUE_META_KEY: &[u8] = b"__tx_body_queue_generations";

fn be_u64(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

fn tx_body_key(generation: u64, tran_id: &[u8; 32]) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(&be_u64(generation));
    key.extend_from_slice(tran_id);
    key
}

fn encode_generations(gens: &VecDeque<u64>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(gens.len() * 8);
    for g in gens {
        buf.extend_from_slice(&be_u64(*g));
    }
    buf
}

fn decode_generations(bytes: &[u8]) -> StorageResult<VecDeque<u64>> {
    if bytes.len() % 8 != 0 {
        return Err(StorageError::Deserialization(
            "tx body queue metadata length not a multiple of 8".to_string(),
        ));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| u64::from_be_bytes(chunk.try_into().unwrap()))
        .collect())
}

/// Persistence API over a `Database`, implementing the node's KV contract.
pub struct Store {
    db: Database,
}

impl Store {
    /// Wrap an already-constructed `Database` (opened or not).
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the underlying database.
    pub fn open(&self) -> StorageResult<()> {
        self.db.open()
    }

    /// Persist a DS block's canonical bytes under its block number.
    pub fn put_ds_block(&self, block_num: u64, bytes: &[u8]) -> StorageResult<()> {
        self.db.put(cf::DS_BLOCKS, &be_u64(block_num), bytes)
    }

    /// Fetch a previously-persisted DS block's bytes.
    pub fn get_ds_block(&self, block_num: u64) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(cf::DS_BLOCKS, &be_u64(block_num))
    }

    /// Persist a tx block (finalblock)'s canonical bytes under its block number.
    pub fn put_tx_block(&self, block_num: u64, bytes: &[u8]) -> StorageResult<()> {
        self.db.put(cf::TX_BLOCKS, &be_u64(block_num), bytes)
    }

    /// Fetch a previously-persisted tx block's bytes.
    pub fn get_tx_block(&self, block_num: u64) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(cf::TX_BLOCKS, &be_u64(block_num))
    }

    /// Write a transaction body into the currently-open (newest) generation
    /// of the tx-body queue. Call `push_back_tx_body_db` first to open a
    /// generation if none is open yet.
    pub fn put_tx_body(&self, tran_id: &[u8; 32], bytes: &[u8]) -> StorageResult<()> {
        let generations = self.load_generations()?;
        let generation = *generations.back().ok_or_else(|| {
            StorageError::Deserialization("no open tx body generation; call push_back_tx_body_db first".to_string())
        })?;
        self.db.put(cf::TX_BODIES, &tx_body_key(generation, tran_id), bytes)
    }

    /// Fetch a transaction body by scanning queued generations newest-first.
    pub fn get_tx_body(&self, tran_id: &[u8; 32]) -> StorageResult<Option<Vec<u8>>> {
        let generations = self.load_generations()?;
        for generation in generations.iter().rev() {
            let key = tx_body_key(*generation, tran_id);
            if let Some(bytes) = self.db.get(cf::TX_BODIES, &key)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }

    /// Open a new generation of the tx-body queue, numbered one past the
    /// highest generation opened so far (0 if the queue is empty).
    pub fn push_back_tx_body_db(&self) -> StorageResult<u64> {
        let mut generations = self.load_generations()?;
        let next = generations.back().map(|g| g + 1).unwrap_or(0);
        generations.push_back(next);
        self.store_generations(&generations)?;
        Ok(next)
    }

    /// Evict the oldest generation of the tx-body queue, deleting every body
    /// stored under it. No-op if the queue is empty.
    pub fn pop_front_tx_body_db(&self) -> StorageResult<Option<u64>> {
        let mut generations = self.load_generations()?;
        let Some(oldest) = generations.pop_front() else {
            return Ok(None);
        };
        self.db.delete_prefix(cf::TX_BODIES, &be_u64(oldest))?;
        self.store_generations(&generations)?;
        Ok(Some(oldest))
    }

    /// Number of generations currently queued.
    pub fn tx_body_queue_len(&self) -> StorageResult<usize> {
        Ok(self.load_generations()?.len())
    }

    /// Store a free-form metadata value under `tag`.
    pub fn put_metadata(&self, tag: &str, bytes: &[u8]) -> StorageResult<()> {
        self.db.put(cf::META, tag.as_bytes(), bytes)
    }

    /// Fetch a metadata value by `tag`.
    pub fn get_metadata(&self, tag: &str) -> StorageResult<Option<Vec<u8>>> {
        self.db.get(cf::META, tag.as_bytes())
    }

    /// Wipe a named column family back to empty. `name` must be one of the
    /// constants in [`crate::db::cf`].
    pub fn reset_db(&self, name: &str) -> StorageResult<()> {
        self.db.reset_cf(name)?;
        if name == cf::TX_BODIES {
            self.store_generations(&VecDeque::new())?;
        }
        Ok(())
    }

    fn load_generations(&self) -> StorageResult<VecDeque<u64>> {
        match self.db.get(cf::META, QUEUE_META_KEY)? {
            Some(bytes) => decode_generations(&bytes),
            None => Ok(VecDeque::new()),
        }
    }

    fn store_generations(&self, gens: &VecDeque<u64>) -> StorageResult<()> {
        self.db.put(cf::META, QUEUE_META_KEY, &encode_generations(gens))
    }
}
