//! Storage error types

use thiserror::Error;

/// Storage errors. Per the error handling design, any of these is treated as
/// fatal for the current epoch (logged, block stays in memory, resync on
/// next startup) rather than retried in place.
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Invalid column family
    #[error("invalid column family: {0}")]
    InvalidColumnFamily(String),

    /// Database not open
    #[error("database not open")]
    NotOpen,

    /// Database already open
    #[error("database already open")]
    AlreadyOpen,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
