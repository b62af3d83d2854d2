//! Network error types

use thiserror::Error;

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Peer not found
    #[error("peer not found: {0}")]
    PeerNotFound(String),

    /// Already connected
    #[error("already connected to peer: {0}")]
    AlreadyConnected(String),

    /// Envelope was too short or carried an unrecognized class/instruction byte
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Not running
    #[error("network service not running")]
    NotRunning,

    /// Already running
    #[error("network service already running")]
    AlreadyRunning,

    /// Channel closed
    #[error("channel closed")]
    ChannelClosed,
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
