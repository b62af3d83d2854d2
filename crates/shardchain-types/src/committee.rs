//! Committee and shard membership.
//!
//! `DsCommittee` models rotation with insertion-at-head / eject-at-tail: the
//! PoW-1 winner is pushed to the front and becomes the new leader, the oldest
//! member is popped from the back. `Shard` and `PublicKeyToShardId` are plain
//! ordered maps; ordering over `PublicKey` (see `shardchain-primitives`) gives
//! deterministic member indexing without a separate sort step.

use std::collections::{BTreeMap, VecDeque};

use shardchain_primitives::{Peer, PublicKey};

/// Shard identifier. Shards are numbered `0..numCommittees` within a DS epoch.
pub type ShardId = u32;

/// The DS committee: current leader at the front, newest joiners pushed to
/// the front, oldest members ejected from the back on rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DsCommittee {
    members: VecDeque<(PublicKey, Peer)>,
}

impl DsCommittee {
    /// An empty committee.
    pub fn new() -> Self {
        Self { members: VecDeque::new() }
    }

    /// Build from bootstrap membership, given in leader-first order.
    pub fn from_bootstrap(members: Vec<(PublicKey, Peer)>) -> Self {
        Self { members: members.into() }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the committee is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The current leader: the committee's head, `leaderId = 0`.
    pub fn leader(&self) -> Option<&(PublicKey, Peer)> {
        self.members.front()
    }

    /// Rotate the committee: the PoW-1 winner becomes the new head, the
    /// oldest member (tail) is ejected. Committee size is invariant across
    /// bootstrap, so this always pops exactly one member back out.
    pub fn rotate(&mut self, winner: (PublicKey, Peer)) {
        self.members.push_front(winner);
        self.members.pop_back();
    }

    /// Iterate members in committee order (leader first).
    pub fn iter(&self) -> impl Iterator<Item = &(PublicKey, Peer)> {
        self.members.iter()
    }

    /// Member at a given committee index, if any.
    pub fn get(&self, index: usize) -> Option<&(PublicKey, Peer)> {
        self.members.get(index)
    }

    /// Index of a public key within the committee, if it is a member.
    pub fn index_of(&self, key: &PublicKey) -> Option<usize> {
        self.members.iter().position(|(pk, _)| pk == key)
    }

    /// All committee public keys, in committee order.
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.members.iter().map(|(pk, _)| *pk).collect()
    }
}

/// A single shard: ordered `PublicKey -> Peer` membership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shard {
    members: BTreeMap<PublicKey, Peer>,
}

impl Shard {
    /// An empty shard.
    pub fn new() -> Self {
        Self { members: BTreeMap::new() }
    }

    /// Build a shard from an already-deduplicated membership list.
    pub fn from_members(members: Vec<(PublicKey, Peer)>) -> Self {
        Self { members: members.into_iter().collect() }
    }

    /// Insert or replace a member. Returns the previous peer, if any.
    pub fn insert(&mut self, key: PublicKey, peer: Peer) -> Option<Peer> {
        self.members.insert(key, peer)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the shard has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Look up a member's peer address.
    pub fn peer_of(&self, key: &PublicKey) -> Option<&Peer> {
        self.members.get(key)
    }

    /// Iterate members in deterministic (public key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, &Peer)> {
        self.members.iter()
    }

    /// The deterministic shard leader: the first member in key order.
    ///
    /// This mirrors the committee convention (index 0 is the leader) applied
    /// to a shard's own ordering; which physical member that is changes
    /// every time the sharding structure is recomputed.
    pub fn leader(&self) -> Option<(&PublicKey, &Peer)> {
        self.members.iter().next()
    }
}

/// The ordered sequence of shards for one DS epoch.
pub type ShardingStructure = Vec<Shard>;

/// Inverse lookup of sharding structure: which shard a given public key
/// belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublicKeyToShardId {
    index: BTreeMap<PublicKey, ShardId>,
}

impl PublicKeyToShardId {
    /// An empty lookup table.
    pub fn new() -> Self {
        Self { index: BTreeMap::new() }
    }

    /// Build the inverse index from a sharding structure.
    pub fn from_sharding_structure(structure: &ShardingStructure) -> Self {
        let mut index = BTreeMap::new();
        for (shard_id, shard) in structure.iter().enumerate() {
            for (key, _) in shard.iter() {
                index.insert(*key, shard_id as ShardId);
            }
        }
        Self { index }
    }

    /// Look up the shard a public key belongs to.
    pub fn shard_of(&self, key: &PublicKey) -> Option<ShardId> {
        self.index.get(key).copied()
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
