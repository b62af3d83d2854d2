//! # shardchain-primitives
//!
//! Primitive types shared across the shardchain node: hashes, addresses, and
//! the node identity types (keypairs, peer addresses) used by the committee
//! and shard data model.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod identity;

pub use address::Address;
pub use error::PrimitiveError;
pub use hash::{Hash, H160, H256};
pub use identity::{IdentityError, KeyPair, Peer, PrivateKey, PublicKey};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Block height type
pub type BlockHeight = u64;

/// Transaction nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;
