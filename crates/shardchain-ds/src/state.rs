//! Epoch state machines: the shard-node state list and the DS-committee
//! node state list, per spec §4.1, plus the DS committee-mode tag.

/// Epoch states for a shard node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Mining a PoW-2 solution for shard membership
    PoWSubmission,
    /// Waiting for the DS block announcing this shard's assignment
    WaitingDsBlock,
    /// Preparing to run microblock consensus as a shard member
    MicroblockConsensusPrep,
    /// Running microblock consensus
    MicroblockConsensus,
    /// Waiting for the DS committee's finalblock
    WaitingFinalBlock,
    /// Preparing fallback consensus after a stalled DS committee
    FallbackConsensusPrep,
    /// Running fallback consensus
    FallbackConsensus,
    /// Waiting for the fallback block to commit
    WaitingFallbackBlock,
    /// Catching up via the Lookup service
    Sync,
}

/// Epoch states for a DS-committee node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DsNodeState {
    /// Mining a PoW-1 solution for DS membership
    PoWSubmission,
    /// Preparing DS-block consensus
    DsBlockConsensusPrep,
    /// Running DS-block consensus
    DsBlockConsensus,
    /// Preparing sharding-structure consensus
    ShardingConsensusPrep,
    /// Running sharding-structure consensus
    ShardingConsensus,
    /// Passively accepting one microblock per shard
    MicroblockSubmission,
    /// Preparing finalblock consensus
    FinalBlockConsensusPrep,
    /// Running finalblock consensus
    FinalBlockConsensus,
    /// Preparing view-change consensus
    ViewChangeConsensusPrep,
    /// Running view-change consensus
    ViewChangeConsensus,
}

/// A DS node's standing relative to the committee: leading it, following it,
/// or outside it entirely (a plain shard node).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DsMode {
    /// This node is the current DS committee leader
    Primary,
    /// This node is a DS committee backup
    Backup,
    /// This node is not on the DS committee; it is a shard node
    Idle,
}

/// A node's standing in the overall network, independent of its momentary
/// `DsMode`/`NodeState`. Distinct from `shardchain_network::NodeRole`, which
/// classifies a node's part in the transaction-sharing overlay, not its
/// membership kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipRole {
    /// An ordinary member of a shard committee
    ShardNode,
    /// A member of the DS committee (leader or backup)
    DsNode,
    /// A trusted Lookup node: full history, no consensus vote
    LookupNode,
    /// A read-only observer with no consensus vote and no forwarding duties
    Archival,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ds_mode_variants_are_distinguishable() {
        assert_ne!(DsMode::Primary, DsMode::Backup);
        assert_ne!(DsMode::Backup, DsMode::Idle);
    }

    #[test]
    fn node_state_equality_is_structural() {
        assert_eq!(NodeState::PoWSubmission, NodeState::PoWSubmission);
        assert_ne!(NodeState::PoWSubmission, NodeState::Sync);
    }
}
