//! Transaction pool error types

use shardchain_primitives::H256;
use thiserror::Error;

/// Transaction pool errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxPoolError {
    /// Signature did not verify against the claimed sender
    #[error("invalid signature")]
    InvalidSignature,

    /// Nonce already used by a processed transaction
    #[error("nonce too low: expected {expected}, got {got}")]
    NonceTooLow {
        /// Expected next nonce
        expected: u64,
        /// Offered nonce
        got: u64,
    },

    /// Nonce too far ahead of the account's expected next nonce
    #[error("nonce gap too large: expected {expected}, got {got}")]
    NonceGapTooLarge {
        /// Expected next nonce
        expected: u64,
        /// Offered nonce
        got: u64,
    },

    /// Gas limit below the minimum accepted by this node
    #[error("gas limit too low: {0}")]
    GasLimitTooLow(u64),

    /// Gas limit exceeds the microblock gas limit on its own
    #[error("gas limit exceeds microblock limit: {gas_limit} > {microblock_limit}")]
    GasLimitExceedsBlock {
        /// Transaction gas limit
        gas_limit: u64,
        /// Configured microblock gas limit
        microblock_limit: u64,
    },

    /// Gas price below the node's configured floor
    #[error("gas price too low: {0}")]
    GasPriceTooLow(u64),

    /// Transaction with this id already queued
    #[error("transaction already exists: {0:?}")]
    AlreadyExists(H256),

    /// Pool has reached its configured capacity
    #[error("pool is full (max size: {0})")]
    PoolFull(usize),

    /// Replacement transaction did not bump the gas price enough
    #[error("replacement transaction underpriced: old {old}, new {new}")]
    Underpriced {
        /// Gas price of the transaction being replaced
        old: u64,
        /// Gas price of the replacement
        new: u64,
    },
}

/// Result type for transaction pool operations
pub type TxPoolResult<T> = Result<T, TxPoolError>;
