//! # shardchain-ds
//!
//! The Directory Service coordinator: sharding structure computation,
//! PoW submission collection, DS committee rotation, difficulty
//! adjustment, post-finalblock epoch sequencing, and view-change candidate
//! derivation. The four-phase consensus itself (DS-block, sharding,
//! microblock, finalblock, view-change) is driven through
//! `shardchain-consensus`'s `ConsensusLeader`/`ConsensusBackup`, multiplexed
//! one instance at a time per spec §4.2's strict sequencing; this crate
//! supplies the DS-specific bookkeeping each phase needs before and after
//! that engine runs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod active_consensus;
pub mod admission;
pub mod coordinator;
pub mod difficulty;
pub mod epoch;
pub mod error;
pub mod message;
pub mod pow_pool;
pub mod rotation;
pub mod sharding;
pub mod state;
pub mod view_change;

pub use active_consensus::{ActiveConsensus, ConsensusMultiplexer};
pub use admission::{check_ds_state, check_node_state, Admission, NodeAction};
pub use coordinator::DirectoryService;
pub use difficulty::{adjust_difficulty, EXPECTED_SUBMISSIONS, MAX_DIFFICULTY, MIN_DIFFICULTY};
pub use epoch::{post_final_block_action, EpochConfig, PostFinalBlockAction};
pub use error::{DsError, DsResult};
pub use message::{
    DsBlockFinalized, DsBlockInstruction, FallbackBlock, FallbackBlockHeader, FallbackInstruction,
    FinalBlockFinalized, FinalBlockInstruction, ForwardTransactionBatch, Instruction, MicroblockInstruction,
    ShardingFinalized, ShardingInstruction, VcBlockInstruction,
};
pub use pow_pool::{result_meets_difficulty, PowPool};
pub use rotation::{rotate, RotationOutcome};
pub use sharding::{compute_sharding, num_committees, Pow2Submission, COMM_SIZE};
pub use state::{DsMode, DsNodeState, MembershipRole, NodeState};
pub use view_change::{build_payload, next_candidate_leader_index};
