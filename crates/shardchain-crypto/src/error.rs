//! Crypto error types

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),
    /// Signature verification failed structurally (bad encoding, not just a mismatch)
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    /// Invalid public key encoding
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// Invalid private key encoding
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// Aggregation was attempted over an empty signer set
    #[error("cannot aggregate an empty signer set")]
    EmptySignerSet,
}

/// Result alias for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
