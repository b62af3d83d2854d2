//! # bach-txpool
//!
//! Transaction pool for BachLedger.
//!
//! This crate provides:
//! - Transaction validation
//! - Transaction ordering
//! - Mempool management
//! - Transaction prioritization

#![warn(missing_docs)]
#![warn(clippy::all)]

// TODO: Implement transaction pool
