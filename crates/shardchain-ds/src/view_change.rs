//! View-change candidate selection and payload encoding (spec §4.7).
//!
//! View change itself runs as an ordinary `ConsensusKind::ViewChange`
//! instance through `shardchain-consensus`'s `ConsensusLeader`/
//! `ConsensusBackup`; this module only derives the candidate and builds the
//! payload those drive over, since that derivation is DS-coordinator
//! bookkeeping, not generic consensus-engine logic.

use rlp::RlpStream;
use shardchain_primitives::{Peer, PublicKey};
use shardchain_types::ViewChangeState;

/// `(currentLeaderIndex + 1) mod committeeSize`. Left as a plain successor
/// rule per spec's own note that a VRF-selected candidate could replace it
/// in a future revision; nothing here forecloses that.
pub fn next_candidate_leader_index(current_leader_index: u32, committee_size: u32) -> u32 {
    (current_leader_index + 1) % committee_size
}

/// Build the view-change announcement payload:
/// `[candidateIndex | candidatePeer | candidatePubKey | currentDsState]`.
pub fn build_payload(
    candidate_index: u32,
    candidate_peer: Peer,
    candidate_pub_key: PublicKey,
    current_ds_state: ViewChangeState,
) -> Vec<u8> {
    let mut s = RlpStream::new_list(5);
    s.append(&candidate_index);
    s.append(&candidate_peer.ip_u32_be());
    s.append(&candidate_peer.port);
    s.append(&candidate_pub_key.as_bytes().to_vec());
    s.append(&(current_ds_state as u8));
    s.out().to_vec()
}
