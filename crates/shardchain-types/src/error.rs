//! Data model error types

use thiserror::Error;

/// Errors raised while constructing or validating data model types
#[derive(Debug, Error)]
pub enum TypesError {
    /// A co-signature bitmap did not reach the `floor(2N/3)+1` threshold
    #[error("co-signature has {signers} of {committee_size} signers, need at least {required}")]
    InsufficientSigners {
        /// Signers actually marked in the bitmap
        signers: usize,
        /// Committee size the bitmap is measured against
        committee_size: usize,
        /// Minimum required signer count
        required: usize,
    },
    /// A bitmap's length did not match the committee it claims to cover
    #[error("co-signature bitmap has {got} bits, expected {expected}")]
    BitmapLengthMismatch {
        /// Expected bitmap length
        expected: usize,
        /// Actual bitmap length
        got: usize,
    },
    /// A public key does not appear in the committee or shard it was looked up against
    #[error("public key not found in committee")]
    UnknownSigner,
    /// Underlying cryptographic operation failed
    #[error(transparent)]
    Crypto(#[from] shardchain_crypto::CryptoError),
}

/// Result alias for data model operations
pub type TypesResult<T> = Result<T, TypesError>;
