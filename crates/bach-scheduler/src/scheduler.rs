//! Main scheduler implementation
//!
//! Orchestrates parallel transaction execution using the Seamless Scheduling algorithm.

use crate::dependency::DependencyGraph;
use crate::error::{SchedulerError, SchedulerResult};
use crate::ownership::OwnershipTable;
use crate::rw_set::RWSet;
use crate::state_key::TxId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A batch of transactions that can execute in parallel
#[derive(Clone, Debug)]
pub struct ExecutionBatch {
    /// Batch index (0 = first batch)
    pub batch_index: usize,
    /// Transactions in this batch
    pub transactions: Vec<TxId>,
}

impl ExecutionBatch {
    /// Create a new execution batch
    pub fn new(batch_index: usize, transactions: Vec<TxId>) -> Self {
        Self {
            batch_index,
            transactions,
        }
    }

    /// Get number of transactions in batch
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if batch is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Result of scheduling analysis
#[derive(Clone, Debug)]
pub struct ScheduleResult {
    /// Execution batches in order
    pub batches: Vec<ExecutionBatch>,
    /// Total number of transactions
    pub total_transactions: usize,
    /// Maximum parallelism achieved (max batch size)
    pub max_parallelism: usize,
    /// Number of dependency edges
    pub dependency_count: usize,
}

impl ScheduleResult {
    /// Calculate parallelism ratio (higher = more parallel)
    ///
    /// Returns the ratio of total transactions to number of batches.
    /// A ratio of 1.0 means fully serial, higher means more parallel.
    pub fn parallelism_ratio(&self) -> f64 {
        if self.batches.is_empty() {
            return 0.0;
        }
        self.total_transactions as f64 / self.batches.len() as f64
    }

    /// Calculate speedup estimate assuming perfect parallel execution
    pub fn estimated_speedup(&self) -> f64 {
        if self.batches.is_empty() {
            return 1.0;
        }
        self.total_transactions as f64 / self.batches.len() as f64
    }
}

/// Transaction info for scheduling
#[derive(Clone, Debug)]
pub struct TxInfo {
    /// Transaction ID
    pub tx_id: TxId,
    /// Read/write set (predicted or actual)
    pub rw_set: RWSet,
    /// Number of retries
    pub retry_count: u32,
}

impl TxInfo {
    /// Create new transaction info
    pub fn new(tx_id: TxId, rw_set: RWSet) -> Self {
        Self {
            tx_id,
            rw_set,
            retry_count: 0,
        }
    }
}

/// Seamless Scheduler
///
/// Implements the core scheduling algorithm that analyzes transactions
/// and generates parallel execution batches.
pub struct Scheduler {
    /// Ownership table for tracking state ownership
    ownership: Arc<OwnershipTable>,
    /// Transaction information
    transactions: RwLock<HashMap<TxId, TxInfo>>,
    /// Maximum retry count before aborting
    max_retries: u32,
}

impl Scheduler {
    /// Create a new scheduler with default settings
    pub fn new() -> Self {
        Self {
            ownership: Arc::new(OwnershipTable::new()),
            transactions: RwLock::new(HashMap::new()),
            max_retries: 3,
        }
    }

    /// Create scheduler with custom max retries
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            ownership: Arc::new(OwnershipTable::new()),
            transactions: RwLock::new(HashMap::new()),
            max_retries,
        }
    }

    /// Get reference to ownership table
    pub fn ownership_table(&self) -> Arc<OwnershipTable> {
        Arc::clone(&self.ownership)
    }

    /// Register a transaction with its predicted RW set
    pub fn register_transaction(&self, tx_id: TxId, rw_set: RWSet) {
        let info = TxInfo::new(tx_id, rw_set);
        self.transactions.write().insert(tx_id, info);
    }

    /// Register multiple transactions
    pub fn register_transactions(&self, txs: impl IntoIterator<Item = (TxId, RWSet)>) {
        let mut transactions = self.transactions.write();
        for (tx_id, rw_set) in txs {
            transactions.insert(tx_id, TxInfo::new(tx_id, rw_set));
        }
    }

    /// Update RW set for a transaction (e.g., after execution reveals actual accesses)
    pub fn update_rw_set(&self, tx_id: TxId, rw_set: RWSet) -> SchedulerResult<()> {
        let mut transactions = self.transactions.write();
        if let Some(info) = transactions.get_mut(&tx_id) {
            info.rw_set = rw_set;
            Ok(())
        } else {
            Err(SchedulerError::TxNotFound(tx_id))
        }
    }

    /// Increment retry count for a transaction
    pub fn increment_retry(&self, tx_id: TxId) -> SchedulerResult<u32> {
        let mut transactions = self.transactions.write();
        if let Some(info) = transactions.get_mut(&tx_id) {
            info.retry_count += 1;
            if info.retry_count > self.max_retries {
                return Err(SchedulerError::MaxRetriesExceeded(tx_id));
            }
            Ok(info.retry_count)
        } else {
            Err(SchedulerError::TxNotFound(tx_id))
        }
    }

    /// Analyze transactions and generate schedule
    ///
    /// This is the main entry point for the scheduling algorithm.
    pub fn schedule(&self) -> SchedulerResult<ScheduleResult> {
        let transactions = self.transactions.read();
        let mut rw_sets: Vec<(TxId, RWSet)> = transactions
            .values()
            .map(|info| (info.tx_id, info.rw_set.clone()))
            .collect();
        drop(transactions);

        // Sort by TxId to ensure deterministic dependency analysis
        rw_sets.sort_by_key(|(tx_id, _)| *tx_id);

        self.schedule_from_rw_sets(&rw_sets)
    }

    /// Generate schedule from RW sets directly
    pub fn schedule_from_rw_sets(&self, rw_sets: &[(TxId, RWSet)]) -> SchedulerResult<ScheduleResult> {
        if rw_sets.is_empty() {
            return Ok(ScheduleResult {
                batches: Vec::new(),
                total_transactions: 0,
                max_parallelism: 0,
                dependency_count: 0,
            });
        }

        // Build dependency graph
        let graph = DependencyGraph::build(rw_sets);

        // Generate parallel batches
        let batch_txs = graph.generate_batches()?;

        let batches: Vec<ExecutionBatch> = batch_txs
            .into_iter()
            .enumerate()
            .map(|(idx, txs)| ExecutionBatch::new(idx, txs))
            .collect();

        let max_parallelism = batches.iter().map(|b| b.len()).max().unwrap_or(0);

        Ok(ScheduleResult {
            batches,
            total_transactions: rw_sets.len(),
            max_parallelism,
            dependency_count: graph.edge_count(),
        })
    }

    /// Try to acquire ownership for a transaction's write set
    pub fn acquire_ownership(&self, tx_id: TxId) -> SchedulerResult<()> {
        let transactions = self.transactions.read();
        let info = transactions
            .get(&tx_id)
            .ok_or(SchedulerError::TxNotFound(tx_id))?;

        for key in &info.rw_set.writes {
            if let Err(owner) = self.ownership.try_acquire(key, tx_id) {
                return Err(SchedulerError::OwnershipConflict {
                    owner,
                    requester: tx_id,
                });
            }
        }

        Ok(())
    }

    /// Release ownership for a transaction
    pub fn release_ownership(&self, tx_id: TxId) {
        self.ownership.release_all(tx_id);
    }

    /// Clear all state (for new block)
    pub fn clear(&self) {
        self.transactions.write().clear();
        self.ownership.clear();
    }

    /// Get number of registered transactions
    pub fn transaction_count(&self) -> usize {
        self.transactions.read().len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
