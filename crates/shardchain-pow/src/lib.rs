//! # shardchain-pow
//!
//! The proof-of-work engine nodes run to compete for DS-committee or shard
//! membership: difficulty-to-target mapping, a stoppable miner, a verifier,
//! and the signed submission format sent to the DS committee.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod difficulty;
pub mod engine;
pub mod error;
pub mod submission;

pub use difficulty::{meets_target, target_for_difficulty};
pub use engine::{header_hash, MiningResult, PowEngine};
pub use error::{PowError, PowResult};
pub use submission::PowSubmission;
