//! PoW engine error types

use thiserror::Error;

/// Errors from the proof-of-work engine
#[derive(Debug, Error)]
pub enum PowError {
    /// Mining was asked to stop before finding a solution
    #[error("mining stopped before a solution was found")]
    Stopped,

    /// Signing a submission failed
    #[error("crypto error: {0}")]
    Crypto(#[from] shardchain_crypto::CryptoError),
}

/// Result type for PoW operations
pub type PowResult<T> = Result<T, PowError>;
