//! The transaction-sharing overlay.
//!
//! At each DS epoch the DS leader computes, from the DS committee and the
//! sharding structure, who forwards microblock transaction bodies to whom:
//! DS receivers (the first `TxSharingClusterSize` DS-committee members),
//! per-shard receivers (ingest bodies for their shard and re-gossip within
//! it) and per-shard senders (egress to peer shards and the DS committee).
//! Every node derives its own [`NodeRole`] from membership in those sets.

use shardchain_primitives::{Peer, PublicKey};
use shardchain_types::{DsCommittee, Shard, ShardingStructure};

/// The behavior a node drives for one DS epoch's transaction-sharing
/// overlay, from its `(is_sender, is_forwarder)` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Neither a sender nor a receiver: just holds its own transactions.
    Idle,
    /// A shard sender: forwards bodies to peer shards and DS receivers, but
    /// does not re-gossip within its own shard.
    SendOnly,
    /// A shard receiver: ingests bodies and re-gossips within the shard,
    /// the shard's intranet.
    ForwardOnly,
    /// Both a shard receiver and sender (small shards where the sender and
    /// receiver ranges overlap after clamping).
    SendAndForward,
}

impl NodeRole {
    /// Classify from the two overlay-membership flags.
    pub fn from_flags(is_sender: bool, is_forwarder: bool) -> Self {
        match (is_sender, is_forwarder) {
            (false, false) => NodeRole::Idle,
            (true, false) => NodeRole::SendOnly,
            (false, true) => NodeRole::ForwardOnly,
            (true, true) => NodeRole::SendAndForward,
        }
    }
}

/// One shard's tx-sharing membership for the current DS epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardTxSharing {
    /// First `clusterSize` shard members (by sort order): ingest + intra-shard gossip.
    pub receivers: Vec<PublicKey>,
    /// Members at `[clusterSize, 2*clusterSize)`, clamped to shard size: egress.
    pub senders: Vec<PublicKey>,
}

impl ShardTxSharing {
    /// This node's role within the shard, given its public key.
    pub fn role_of(&self, key: &PublicKey) -> NodeRole {
        let is_forwarder = self.receivers.contains(key);
        let is_sender = self.senders.contains(key);
        NodeRole::from_flags(is_sender, is_forwarder)
    }
}

/// The complete tx-sharing assignment for one DS epoch: DS receivers plus
/// each shard's receiver/sender sets, indexed the same way as the sharding
/// structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxSharingAssignments {
    /// First `clusterSize` DS-committee members, including the new leader.
    pub ds_receivers: Vec<PublicKey>,
    /// Per-shard membership, in shard order.
    pub shards: Vec<ShardTxSharing>,
}

/// Compute the DS receiver set: the first `cluster_size` DS-committee
/// members in committee order (leader first).
pub fn compute_ds_receivers(committee: &DsCommittee, cluster_size: usize) -> Vec<PublicKey> {
    committee.iter().take(cluster_size).map(|(pk, _)| *pk).collect()
}

/// Compute one shard's receiver/sender sets. The sender range is clamped to
/// the shard's actual size, so small shards degenerate to overlapping
/// receiver/sender sets rather than an empty sender set.
pub fn compute_shard_tx_sharing(shard: &Shard, cluster_size: usize) -> ShardTxSharing {
    let members: Vec<PublicKey> = shard.iter().map(|(pk, _)| *pk).collect();
    let receivers = members.iter().take(cluster_size).copied().collect();
    let sender_end = (2 * cluster_size).min(members.len());
    let senders = if cluster_size < sender_end {
        members[cluster_size..sender_end].to_vec()
    } else {
        Vec::new()
    };
    ShardTxSharing { receivers, senders }
}

/// Compute the full tx-sharing assignment for a DS epoch.
pub fn compute_tx_sharing_assignments(
    committee: &DsCommittee,
    structure: &ShardingStructure,
    cluster_size: usize,
) -> TxSharingAssignments {
    TxSharingAssignments {
        ds_receivers: compute_ds_receivers(committee, cluster_size),
        shards: structure.iter().map(|shard| compute_shard_tx_sharing(shard, cluster_size)).collect(),
    }
}

/// The shard peers a sender/forwarder gossips a body to directly: every
/// shard member except itself and anyone already acting as a receiver or
/// sender (those peers get the body through their own role, not plain
/// intranet gossip).
pub fn downstream_peers(shard: &Shard, sharing: &ShardTxSharing, self_key: &PublicKey) -> Vec<(PublicKey, Peer)> {
    shard
        .iter()
        .filter(|(pk, _)| *pk != self_key && !sharing.receivers.contains(pk) && !sharing.senders.contains(pk))
        .map(|(pk, peer)| (*pk, *peer))
        .collect()
}
