//! Network error types

use thiserror::Error;

/// Network errors
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

    /// Invalid message
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timeout
    #[error("timeout: {0}")]
    Timeout(String),

    /// Not running
    #[error("network service not running")]
    NotRunning,

    /// Already running
    #[error("network service already running")]
    AlreadyRunning,

    /// Send error
    #[error("send error: {0}")]
    Send(String),

    /// Channel closed
    #[error("channel closed")]
    ChannelClosed,
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;
