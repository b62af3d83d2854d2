//! # shardchain-consensus
//!
//! The generic four-phase BFT engine every block kind (`DsBlock`,
//! `Sharding`, `Microblock`, `FinalBlock`, `ViewChange`) runs through:
//! Announce, Challenge/CS1, Finalize/CS2, Done. [`ConsensusLeader`] and
//! [`ConsensusBackup`] drive the two sides; [`OrderBuffer`] enforces the
//! per-`consensusId` ordering rule described in the protocol: stale ids are
//! dropped, future ids are buffered until the local instance catches up.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backup;
pub mod error;
pub mod leader;
pub mod message;
pub mod order;
mod payload;

pub use backup::{ConsensusBackup, Validator};
pub use error::{BackupFault, ConsensusError, ConsensusResult};
pub use leader::ConsensusLeader;
pub use message::{ConsensusMessage, Phase};
pub use order::OrderBuffer;
