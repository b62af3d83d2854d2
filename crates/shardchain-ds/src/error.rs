//! DS coordinator error types.

use thiserror::Error;

/// Errors surfaced by the DS coordinator.
#[derive(Debug, Error)]
pub enum DsError {
    /// A committee/sharding invariant was violated
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A types-layer error propagated up (co-signature verification, etc.)
    #[error("types error: {0}")]
    Types(#[from] shardchain_types::TypesError),

    /// A consensus-layer error propagated up
    #[error("consensus error: {0}")]
    Consensus(#[from] shardchain_consensus::ConsensusError),
}

/// Result type for DS coordinator operations.
pub type DsResult<T> = Result<T, DsError>;
