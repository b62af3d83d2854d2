//! The wire messages exchanged during one consensus instance.
//!
//! The protocol runs the same commit/challenge/response shape twice: once to
//! produce `cosig1` over the announced payload, once more to produce
//! `cosig2` over the `cosig1`-endorsed payload. [`Phase`] distinguishes the
//! two passes; every message names both the `consensus_id` it belongs to and
//! its phase so a receiver can buffer or discard stale/future traffic
//! per-id independently of which phase it's currently in.

use shardchain_crypto::{CommitPoint, MultiSignature, Response};
use shardchain_primitives::{PublicKey, H256};
use shardchain_types::Bitmap;

use crate::error::BackupFault;

/// Which of the two commit/challenge/response passes a message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Produces `cosig1`, over the announced payload.
    One,
    /// Produces `cosig2`, over the `cosig1`-endorsed payload.
    Two,
}

/// One message in the consensus protocol.
#[derive(Clone, Debug)]
pub enum ConsensusMessage {
    /// Leader -> committee. Starts phase one.
    Announce {
        /// Instance identifier
        consensus_id: u32,
        /// Hash of the block payload under consensus
        block_hash: H256,
        /// Leader's committee position
        leader_id: u16,
        /// Opaque payload the validator function checks
        announcement: Vec<u8>,
    },
    /// Backup -> leader (phase one), or backup -> leader (phase two, sent
    /// after verifying `Collective1`).
    Commit {
        /// Instance identifier
        consensus_id: u32,
        /// Which pass this commit belongs to
        phase: Phase,
        /// Sender's committee position
        sender_id: u16,
        /// Sender's public per-round commitment point
        commitment: CommitPoint,
    },
    /// Leader -> committee, once threshold commits are collected.
    Challenge {
        /// Instance identifier
        consensus_id: u32,
        /// Which pass this challenge belongs to
        phase: Phase,
        /// `H(aggCommit, aggPubKeyOfBitmap, payload)`
        challenge: H256,
        /// Aggregate of the selected committers' commitment points
        aggregate_commitment: CommitPoint,
        /// Aggregate of the selected committers' public keys
        aggregate_pubkey: PublicKey,
        /// Which committee positions were selected into the aggregate
        bitmap: Bitmap,
    },
    /// Backup -> leader, replying to a `Challenge`.
    Response {
        /// Instance identifier
        consensus_id: u32,
        /// Which pass this response belongs to
        phase: Phase,
        /// Sender's committee position
        sender_id: u16,
        /// Sender's response scalar
        response: Response,
    },
    /// Leader -> committee: the finalized signature for one pass. A
    /// `Collective` for `Phase::One` carries `cosig1` and invites backups to
    /// begin phase two; a `Collective` for `Phase::Two` carries `cosig2` and
    /// concludes the instance.
    Collective {
        /// Instance identifier
        consensus_id: u32,
        /// Which pass this signature concludes
        phase: Phase,
        /// The aggregated signature for this pass
        signature: MultiSignature,
        /// The participation bitmap the signature was aggregated over
        bitmap: Bitmap,
    },
    /// Backup -> leader: a validator fault in place of a commit or response.
    Error {
        /// Instance identifier
        consensus_id: u32,
        /// Sender's committee position
        sender_id: u16,
        /// The reported fault
        fault: BackupFault,
    },
}

impl ConsensusMessage {
    /// The `consensus_id` every message variant carries.
    pub fn consensus_id(&self) -> u32 {
        match self {
            ConsensusMessage::Announce { consensus_id, .. }
            | ConsensusMessage::Commit { consensus_id, .. }
            | ConsensusMessage::Challenge { consensus_id, .. }
            | ConsensusMessage::Response { consensus_id, .. }
            | ConsensusMessage::Collective { consensus_id, .. }
            | ConsensusMessage::Error { consensus_id, .. } => *consensus_id,
        }
    }
}
