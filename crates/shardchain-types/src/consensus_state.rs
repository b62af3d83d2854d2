//! Consensus runtime state: the bookkeeping kept per concurrently-running
//! consensus instance, independent of which block kind it is finalizing.

use shardchain_primitives::{Peer, PublicKey, H256};

/// Which block kind a consensus instance is finalizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsensusKind {
    /// DS-block consensus
    DsBlock,
    /// Sharding-structure consensus
    Sharding,
    /// Microblock consensus (within a shard)
    Microblock,
    /// Finalblock consensus
    FinalBlock,
    /// View-change consensus
    ViewChange,
}

/// Phase of the generic 4-phase BFT engine a consensus instance is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsensusState {
    /// Not yet started
    Initial,
    /// Leader has broadcast, or backup has received, the announcement
    AnnouncementSentOrReceived,
    /// Backup has sent, or leader has received, a CS1 commit
    CommitSentOrReceived,
    /// Leader has issued the CS1 challenge
    Challenged,
    /// Backup has sent, or leader has received, a CS2 response
    ResponseSentOrReceived,
    /// CS1 aggregation complete
    Collective1,
    /// CS2 aggregation complete
    Collective2,
    /// Consensus concluded successfully
    Done,
    /// Consensus concluded with a (non-fatal) error
    Error,
}

/// Per-instance identity and progress of one running consensus round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusInstance {
    /// Monotonic id distinguishing concurrent/sequential instances of the same kind
    pub consensus_id: u32,
    /// Hash of the block payload being finalized
    pub block_hash: H256,
    /// This node's committee position
    pub my_id: u16,
    /// The current leader's committee position
    pub leader_id: u16,
    /// Committee member set this instance runs over
    pub committee_view: Vec<(PublicKey, Peer)>,
    /// Which block kind this instance finalizes
    pub kind: ConsensusKind,
    /// Current phase
    pub state: ConsensusState,
}

impl ConsensusInstance {
    /// Start a fresh instance in `Initial` state.
    pub fn new(
        consensus_id: u32,
        block_hash: H256,
        my_id: u16,
        leader_id: u16,
        committee_view: Vec<(PublicKey, Peer)>,
        kind: ConsensusKind,
    ) -> Self {
        Self {
            consensus_id,
            block_hash,
            my_id,
            leader_id,
            committee_view,
            kind,
            state: ConsensusState::Initial,
        }
    }

    /// Whether this node is the leader for this instance.
    pub fn is_leader(&self) -> bool {
        self.my_id == self.leader_id
    }

    /// Whether the instance has concluded, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ConsensusState::Done | ConsensusState::Error)
    }
}
