//! Transaction receipt types for BachLedger

use bach_primitives::{Address, H256};
use bytes::Bytes;

use crate::block::Bloom;

/// Transaction execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Transaction failed
    Failure = 0,
    /// Transaction succeeded
    Success = 1,
}

impl From<bool> for TxStatus {
    fn from(success: bool) -> Self {
        if success {
            TxStatus::Success
        } else {
            TxStatus::Failure
        }
    }
}

impl From<TxStatus> for bool {
    fn from(status: TxStatus) -> Self {
        match status {
            TxStatus::Success => true,
            TxStatus::Failure => false,
        }
    }
}

/// Log entry emitted during transaction execution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (indexed parameters)
    pub topics: Vec<H256>,
    /// Log data (non-indexed parameters)
    pub data: Bytes,
}

impl Log {
    /// Create a new log entry
    pub fn new(address: Address, topics: Vec<H256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// Get the first topic (usually the event signature)
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }

    /// Create bloom filter for this log
    pub fn bloom(&self) -> Bloom {
        let mut bloom = Bloom::default();
        bloom.accrue(self.address.as_bytes());
        for topic in &self.topics {
            bloom.accrue(topic.as_bytes());
        }
        bloom
    }
}

/// Transaction receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction status (success/failure)
    pub status: TxStatus,
    /// Cumulative gas used in the block up to this transaction
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction
    pub gas_used: u64,
    /// Logs emitted by this transaction
    pub logs: Vec<Log>,
    /// Bloom filter for the logs
    pub logs_bloom: Bloom,
    /// Contract address created (if contract creation tx)
    pub contract_address: Option<Address>,
}

impl Receipt {
    /// Create a new receipt
    pub fn new(
        status: TxStatus,
        cumulative_gas_used: u64,
        gas_used: u64,
        logs: Vec<Log>,
    ) -> Self {
        let mut logs_bloom = Bloom::default();
        for log in &logs {
            logs_bloom.accrue_bloom(&log.bloom());
        }

        Self {
            status,
            cumulative_gas_used,
            gas_used,
            logs,
            logs_bloom,
            contract_address: None,
        }
    }

    /// Create a receipt with contract address
    pub fn with_contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }

    /// Check if transaction succeeded
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Get number of logs
    pub fn log_count(&self) -> usize {
        self.logs.len()
    }
}
