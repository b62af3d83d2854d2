//! RocksDB wrapper

use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column family names
pub mod cf {
    /// DS blocks, keyed by block number
    pub const DS_BLOCKS: &str = "ds_blocks";
    /// Tx blocks (finalblocks), keyed by block number
    pub const TX_BLOCKS: &str = "tx_blocks";
    /// Transaction bodies, keyed by `generation(8B BE) || tranId(32B)`
    pub const TX_BODIES: &str = "tx_bodies";
    /// Free-form metadata, keyed by tag
    pub const META: &str = "meta";
}

/// All column family names
pub const ALL_CFS: &[&str] = &[cf::DS_BLOCKS, cf::TX_BLOCKS, cf::TX_BODIES, cf::META];

type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 512,
            write_buffer_size: 64 * 1024 * 1024,
            max_write_buffer_number: 3,
        }
    }
}

/// RocksDB wrapper with column family support
pub struct Database {
    db: Arc<RwLock<Option<RocksDB>>>,
    path: String,
}

impl Database {
    /// Create a new database instance (not yet opened)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            db: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Open the database with default config
    pub fn open(&self) -> StorageResult<()> {
        self.open_with_config(DbConfig::default())
    }

    /// Open the database with custom config
    pub fn open_with_config(&self, config: DbConfig) -> StorageResult<()> {
        let mut db_guard = self.db.write();
        if db_guard.is_some() {
            return Err(StorageError::AlreadyOpen);
        }

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = RocksDB::open_cf_descriptors(&opts, &self.path, cf_descriptors)?;
        *db_guard = Some(db);
        Ok(())
    }

    /// Close the database
    pub fn close(&self) {
        let mut db_guard = self.db.write();
        *db_guard = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.db.read().is_some()
    }

    /// Get a value from a column family
    pub fn get(&self, cf_name: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        Ok(db.get_cf(&cf, key)?)
    }

    /// Put a value to a column family
    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Delete a value from a column family
    pub fn delete(&self, cf_name: &str, key: &[u8]) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        db.delete_cf(&cf, key)?;
        Ok(())
    }

    /// Delete every key in `cf_name` starting with `prefix`.
    pub fn delete_prefix(&self, cf_name: &str, prefix: &[u8]) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        let mut batch = WriteBatch::default();
        let iter = db.prefix_iterator_cf(&cf, prefix);
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            batch.delete_cf(&cf, &key);
        }
        db.write(batch)?;
        Ok(())
    }

    /// Drop and recreate a column family, discarding all its contents.
    pub fn reset_cf(&self, cf_name: &str) -> StorageResult<()> {
        let mut db_guard = self.db.write();
        let db = db_guard.as_mut().ok_or(StorageError::NotOpen)?;
        db.drop_cf(cf_name)?;
        db.create_cf(cf_name, &Options::default())?;
        Ok(())
    }

    /// Create a write batch
    pub fn batch(&self) -> WriteBatchWrapper {
        WriteBatchWrapper::new()
    }

    /// Execute a write batch
    pub fn write_batch(&self, batch: WriteBatchWrapper) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;

        let mut rocks_batch = WriteBatch::default();
        for op in batch.operations {
            match op {
                BatchOp::Put { cf_name, key, value } => {
                    let cf = self.get_cf(db, &cf_name)?;
                    rocks_batch.put_cf(&cf, &key, &value);
                }
                BatchOp::Delete { cf_name, key } => {
                    let cf = self.get_cf(db, &cf_name)?;
                    rocks_batch.delete_cf(&cf, &key);
                }
            }
        }

        db.write(rocks_batch)?;
        Ok(())
    }

    /// Get column family handle
    fn get_cf<'a>(&self, db: &'a RocksDB, name: &str) -> StorageResult<Arc<BoundColumnFamily<'a>>> {
        db.cf_handle(name)
            .ok_or_else(|| StorageError::InvalidColumnFamily(name.to_string()))
    }

    /// Get database path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            path: self.path.clone(),
        }
    }
}

/// Batch operation
enum BatchOp {
    Put { cf_name: String, key: Vec<u8>, value: Vec<u8> },
    Delete { cf_name: String, key: Vec<u8> },
}

/// Write batch wrapper
pub struct WriteBatchWrapper {
    operations: Vec<BatchOp>,
}

impl WriteBatchWrapper {
    /// Create a new write batch
    pub fn new() -> Self {
        Self { operations: Vec::new() }
    }

    /// Add a put operation
    pub fn put(&mut self, cf_name: &str, key: &[u8], value: &[u8]) {
        self.operations.push(BatchOp::Put {
            cf_name: cf_name.to_string(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Add a delete operation
    pub fn delete(&mut self, cf_name: &str, key: &[u8]) {
        self.operations.push(BatchOp::Delete {
            cf_name: cf_name.to_string(),
            key: key.to_vec(),
        });
    }

    /// Get number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if batch is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for WriteBatchWrapper {
    fn default() -> Self {
        Self::new()
    }
}
