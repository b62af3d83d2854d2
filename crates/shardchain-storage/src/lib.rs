//! # shardchain-storage
//!
//! RocksDB-backed persistence for DS blocks, tx blocks, the per-epoch
//! transaction-body queue, and free-form node metadata. Account/world-state
//! storage is out of scope here; this crate only persists what the
//! consensus and sync paths need to survive a restart.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod db;
pub mod error;
pub mod persistence;

pub use db::{cf, DbConfig, Database, WriteBatchWrapper};
pub use error::{StorageError, StorageResult};
pub use persistence::Store;
