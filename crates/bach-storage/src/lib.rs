//! # bach-storage
//!
//! Storage layer for BachLedger using RocksDB.
//!
//! This crate provides:
//! - Key-value storage abstraction
//! - RocksDB backend
//! - Batch write support
//! - Column family management

#![warn(missing_docs)]
#![warn(clippy::all)]

// TODO: Implement storage traits and RocksDB backend
