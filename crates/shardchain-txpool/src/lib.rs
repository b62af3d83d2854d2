//! # shardchain-txpool
//!
//! The per-shard transaction pool: staging out-of-order transactions until
//! their nonce gap closes, ordering ready transactions for microblock
//! proposal, and tracking which transactions have been processed, received
//! from the sharing overlay, or submitted onward.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pool;

pub use error::{TxPoolError, TxPoolResult};
pub use pool::{NonceSource, PoolConfig, TxPool, ZeroNonceSource};
