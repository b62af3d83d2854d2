//! `checkState`: whether an incoming instruction is admissible in a node's
//! current epoch state, should be buffered and retried once the state
//! changes, or is stale/out-of-place and should be rejected outright (spec
//! §4.1).
//!
//! Two tables exist because a DS-committee member's state machine
//! (`DsNodeState`) and a shard member's (`NodeState`) diverge in which
//! instructions make sense in which state; a node running as `DsNode`
//! (spec §9/§11.4's `MembershipRole`) is checked against `check_ds_state`,
//! everyone else against `check_node_state`.

use crate::state::{DsNodeState, NodeState};

/// The action an instruction represents, for admissibility purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeAction {
    /// `processDsBlock`
    DsBlock,
    /// `processSharding`
    Sharding,
    /// `processSubmitTransaction`
    SubmitTransaction,
    /// `processMicroblockConsensus`
    MicroblockConsensus,
    /// `processFinalBlock`
    FinalBlock,
    /// `processForwardTransaction`
    ForwardTransaction,
    /// `processCreateTransactionFromLookup`
    CreateTransactionFromLookup,
    /// `processTxnPacketFromLookup`
    TxnPacketFromLookup,
    /// `processVcBlock`
    VcBlock,
    /// `processFallbackBlock`
    FallbackBlock,
}

/// The admissibility verdict `checkState` reaches for one (action, state) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Process the instruction now.
    Admissible,
    /// Hold the instruction and retry once the state changes, up to a bounded
    /// timeout; drop and log a warning if the timeout elapses first.
    Buffer,
    /// Stale or out-of-place; drop and log a warning immediately.
    Reject,
}

/// `checkState` for a shard node.
pub fn check_node_state(action: NodeAction, state: NodeState) -> Admission {
    use Admission::*;
    use NodeAction::*;
    use NodeState::*;

    match (action, state) {
        (DsBlock, WaitingDsBlock) => Admissible,
        (DsBlock, PoWSubmission) => Buffer,
        (DsBlock, _) => Reject,

        (Sharding, WaitingDsBlock) => Admissible,
        (Sharding, PoWSubmission) => Buffer,
        (Sharding, _) => Reject,

        (SubmitTransaction, Sync) => Reject,
        (SubmitTransaction, _) => Admissible,

        (MicroblockConsensus, MicroblockConsensusPrep) => Admissible,
        (MicroblockConsensus, MicroblockConsensus) => Admissible,
        (MicroblockConsensus, WaitingDsBlock) => Buffer,
        (MicroblockConsensus, _) => Reject,

        (FinalBlock, WaitingFinalBlock) => Admissible,
        (FinalBlock, MicroblockConsensus) => Buffer,
        (FinalBlock, _) => Reject,

        (ForwardTransaction, Sync) => Reject,
        (ForwardTransaction, _) => Admissible,

        (CreateTransactionFromLookup, Sync) => Reject,
        (CreateTransactionFromLookup, _) => Admissible,

        (TxnPacketFromLookup, Sync) => Reject,
        (TxnPacketFromLookup, _) => Admissible,

        // A finalized VcBlock is a notification of a new DS leader, welcome
        // in almost any state; while actively catching up it's ignored in
        // favor of a full resync.
        (VcBlock, Sync) => Reject,
        (VcBlock, _) => Admissible,

        (FallbackBlock, FallbackConsensusPrep) => Admissible,
        (FallbackBlock, FallbackConsensus) => Admissible,
        (FallbackBlock, WaitingFallbackBlock) => Admissible,
        (FallbackBlock, WaitingFinalBlock) => Buffer,
        (FallbackBlock, _) => Reject,
    }
}

/// `checkState` for a DS-committee node.
pub fn check_ds_state(action: NodeAction, state: DsNodeState) -> Admission {
    use Admission::*;
    use DsNodeState::*;
    use NodeAction::*;

    match (action, state) {
        (DsBlock, DsBlockConsensusPrep) => Admissible,
        (DsBlock, DsBlockConsensus) => Admissible,
        (DsBlock, PoWSubmission) => Buffer,
        (DsBlock, _) => Reject,

        (Sharding, ShardingConsensusPrep) => Admissible,
        (Sharding, ShardingConsensus) => Admissible,
        (Sharding, DsBlockConsensus) => Buffer,
        (Sharding, _) => Reject,

        // DS-committee nodes don't hold a shard's transaction pool.
        (SubmitTransaction, _) => Reject,

        (MicroblockConsensus, MicroblockSubmission) => Admissible,
        (MicroblockConsensus, ShardingConsensus) => Buffer,
        (MicroblockConsensus, _) => Reject,

        (FinalBlock, FinalBlockConsensusPrep) => Admissible,
        (FinalBlock, FinalBlockConsensus) => Admissible,
        (FinalBlock, MicroblockSubmission) => Buffer,
        (FinalBlock, _) => Reject,

        (ForwardTransaction, PoWSubmission) => Reject,
        (ForwardTransaction, _) => Admissible,

        // Client-originated transactions never target the DS committee directly.
        (CreateTransactionFromLookup, _) => Reject,
        (TxnPacketFromLookup, _) => Reject,

        (VcBlock, ViewChangeConsensusPrep) => Admissible,
        (VcBlock, ViewChangeConsensus) => Admissible,
        (VcBlock, DsBlockConsensus) => Buffer,
        (VcBlock, ShardingConsensus) => Buffer,
        (VcBlock, FinalBlockConsensus) => Buffer,
        (VcBlock, _) => Reject,

        // Fallback is a shard-only recovery path; the DS committee never runs it.
        (FallbackBlock, _) => Reject,
    }
}
