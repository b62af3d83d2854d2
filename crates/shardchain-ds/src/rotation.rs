//! DS committee rotation on DS-block commit (spec §4.2's 5-rule sequence).

use shardchain_primitives::{Peer, PublicKey};
use shardchain_types::DsCommittee;

use crate::state::DsMode;

/// Outcome of rotating the DS committee with a new PoW-1 winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationOutcome {
    /// This node's standing in the post-rotation committee
    pub mode: DsMode,
    /// This node's index in the post-rotation committee (`consensusMyId`),
    /// `None` if it is now `Idle`
    pub my_id: Option<u16>,
}

/// Rotate `committee`: push `winner` to the front, eject the tail member.
/// Returns the rotated committee's effect on `self_key`'s standing.
///
/// - If `self_key` was the ejected tail member, it becomes `Idle` and must
///   restart PoW-2 as a shard node.
/// - If `self_key` is the newly-inserted head, it becomes `Primary`.
/// - Otherwise it remains (or becomes) `Backup`, at its new committee index.
pub fn rotate(committee: &mut DsCommittee, winner: (PublicKey, Peer), self_key: &PublicKey) -> RotationOutcome {
    let ejected = committee.get(committee.len().saturating_sub(1)).map(|(pk, _)| *pk);
    committee.rotate(winner);

    if ejected == Some(*self_key) && winner.0 != *self_key {
        return RotationOutcome { mode: DsMode::Idle, my_id: None };
    }

    match committee.index_of(self_key) {
        Some(0) => RotationOutcome { mode: DsMode::Primary, my_id: Some(0) },
        Some(idx) => RotationOutcome { mode: DsMode::Backup, my_id: Some(idx as u16) },
        None => RotationOutcome { mode: DsMode::Idle, my_id: None },
    }
}
