//! The leader side of one consensus instance.
//!
//! Drives both commit/challenge/response passes: collects phase-one commits
//! into `cosig1`, then collects the phase-two commits backups send after
//! verifying `cosig1`, into `cosig2`. Mirrors the committee's own view of the
//! instance via [`shardchain_types::ConsensusInstance`] rather than keeping a
//! second parallel state enum, per the "replace dynamic_cast with a shared
//! capability set" guidance: `ConsensusLeader` and `ConsensusBackup` are two
//! concrete types, not a base/derived pair.

use std::collections::BTreeMap;

use shardchain_crypto::{
    aggregate_commitments, aggregate_public_keys, aggregate_responses, challenge as schnorr_challenge,
    commit, respond, CommitPoint, CommitSecret, MultiSignature, Response,
};
use shardchain_primitives::{KeyPair, PublicKey};
use shardchain_types::{threshold, Bitmap, CoSignatures, ConsensusInstance, ConsensusState};

use crate::error::{BackupFault, ConsensusError, ConsensusResult};
use crate::message::{ConsensusMessage, Phase};

#[derive(Default)]
struct PassCollector {
    commits: BTreeMap<u16, CommitPoint>,
    responses: BTreeMap<u16, Response>,
    aggregate_commitment: Option<CommitPoint>,
}

/// Drives the leader half of a single consensus instance to completion.
pub struct ConsensusLeader {
    instance: ConsensusInstance,
    keypair: KeyPair,
    committee: Vec<PublicKey>,
    threshold: usize,
    announcement: Vec<u8>,
    pass1: PassCollector,
    pass2: PassCollector,
    cosig1: Option<(MultiSignature, Bitmap)>,
    own_secret: Option<CommitSecret>,
    outbox: Vec<ConsensusMessage>,
}

impl ConsensusLeader {
    /// Start driving `instance`, which must already identify this node as
    /// the leader (`instance.is_leader()`).
    pub fn new(instance: ConsensusInstance, keypair: KeyPair, committee: Vec<PublicKey>) -> Self {
        let threshold = threshold(committee.len());
        Self {
            instance,
            keypair,
            committee,
            threshold,
            announcement: Vec::new(),
            pass1: PassCollector::default(),
            pass2: PassCollector::default(),
            cosig1: None,
            own_secret: None,
            outbox: Vec::new(),
        }
    }

    /// This instance's identity and progress.
    pub fn instance(&self) -> &ConsensusInstance {
        &self.instance
    }

    /// Drain messages queued for broadcast since the last call.
    pub fn take_outbox(&mut self) -> Vec<ConsensusMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// The finalized co-signature, once the instance has reached `Done`.
    pub fn finalized(&self) -> Option<CoSignatures> {
        let (cs1, b1) = self.cosig1.clone()?;
        let cs2 = self.pass2_signature()?;
        Some(CoSignatures { cs1, b1, cs2: cs2.0, b2: cs2.1 })
    }

    fn pass2_signature(&self) -> Option<(MultiSignature, Bitmap)> {
        if self.instance.state != ConsensusState::Done {
            return None;
        }
        let aggregate_commitment = self.pass2.aggregate_commitment?;
        let aggregate_response = aggregate_responses(
            &self.pass2.responses.values().copied().collect::<Vec<_>>(),
        )
        .ok()?;
        let bitmap = Self::bitmap_for(&self.committee, self.pass2.commits.keys().copied());
        Some((
            MultiSignature { commitment: aggregate_commitment, response: aggregate_response },
            bitmap,
        ))
    }

    fn bitmap_for(committee: &[PublicKey], ids: impl Iterator<Item = u16>) -> Bitmap {
        let mut bitmap = Bitmap::zeroed(committee.len());
        for id in ids {
            bitmap.set(id as usize);
        }
        bitmap
    }

    /// Broadcast the announcement and begin phase one. `announcement` is the
    /// opaque payload backups run their validator function against (block
    /// header bytes, typically).
    pub fn start(&mut self, announcement: Vec<u8>) -> ConsensusResult<()> {
        if self.instance.state != ConsensusState::Initial {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }
        self.announcement = announcement.clone();
        self.instance.state = ConsensusState::AnnouncementSentOrReceived;
        self.outbox.push(ConsensusMessage::Announce {
            consensus_id: self.instance.consensus_id,
            block_hash: self.instance.block_hash,
            leader_id: self.instance.leader_id,
            announcement,
        });

        // The leader is itself a committee member and counts toward the
        // signing threshold like any backup.
        let (secret, point) = commit();
        self.pass1.commits.insert(self.instance.my_id, point);
        self.own_secret = Some(secret);
        self.maybe_issue_challenge(Phase::One)?;
        Ok(())
    }

    fn maybe_issue_challenge(&mut self, phase: Phase) -> ConsensusResult<()> {
        if self.pass_ref(phase).commits.len() == self.threshold {
            self.issue_challenge(phase)?;
        }
        Ok(())
    }

    /// Accept a commit from `sender_id` for the named `phase`.
    pub fn on_commit(&mut self, phase: Phase, sender_id: u16, commitment: CommitPoint) -> ConsensusResult<()> {
        self.require_state_for_commit(phase)?;
        let pass = self.pass_mut(phase);
        if pass.commits.contains_key(&sender_id) {
            return Err(ConsensusError::DuplicateSubmission(sender_id));
        }
        pass.commits.insert(sender_id, commitment);
        self.maybe_issue_challenge(phase)?;
        Ok(())
    }

    /// Accept a response from `sender_id` for the named `phase`.
    pub fn on_response(&mut self, phase: Phase, sender_id: u16, response: Response) -> ConsensusResult<()> {
        let expected_state = match phase {
            Phase::One => ConsensusState::Challenged,
            Phase::Two => ConsensusState::ResponseSentOrReceived,
        };
        if self.instance.state != expected_state {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }
        if !self.pass_ref(phase).commits.contains_key(&sender_id) {
            return Err(ConsensusError::UncommittedResponder(sender_id));
        }
        let pass = self.pass_mut(phase);
        if pass.responses.contains_key(&sender_id) {
            return Err(ConsensusError::DuplicateSubmission(sender_id));
        }
        pass.responses.insert(sender_id, response);
        self.maybe_finalize_pass(phase)?;
        Ok(())
    }

    /// Record a fault reported by a backup. Non-recoverable faults and
    /// missing-txn reports are both surfaced to the caller; the caller
    /// decides whether to retry (missing-txn) or let the instance time out
    /// into view change (validation failure / wrong order).
    pub fn on_fault(&mut self, sender_id: u16, fault: BackupFault) -> ConsensusResult<()> {
        Err(ConsensusError::BackupReported(sender_id, fault))
    }

    fn require_state_for_commit(&self, phase: Phase) -> ConsensusResult<()> {
        let expected = match phase {
            Phase::One => ConsensusState::AnnouncementSentOrReceived,
            Phase::Two => ConsensusState::Collective1,
        };
        if self.instance.state != expected {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }
        Ok(())
    }

    fn pass_mut(&mut self, phase: Phase) -> &mut PassCollector {
        match phase {
            Phase::One => &mut self.pass1,
            Phase::Two => &mut self.pass2,
        }
    }

    fn pass_ref(&self, phase: Phase) -> &PassCollector {
        match phase {
            Phase::One => &self.pass1,
            Phase::Two => &self.pass2,
        }
    }

    fn payload_for(&self, phase: Phase) -> Vec<u8> {
        match phase {
            Phase::One => self.announcement.clone(),
            Phase::Two => {
                let (sig, bitmap) = self.cosig1.as_ref().expect("cosig1 set before phase two starts");
                crate::payload::phase_two_payload(sig, bitmap)
            }
        }
    }

    fn issue_challenge(&mut self, phase: Phase) -> ConsensusResult<()> {
        let pass = self.pass_ref(phase);
        let points: Vec<CommitPoint> = pass.commits.values().copied().collect();
        let aggregate_commitment = aggregate_commitments(&points)?;
        let keys: Vec<PublicKey> = pass.commits.keys().map(|&i| self.committee[i as usize]).collect();
        let aggregate_pubkey = aggregate_public_keys(&keys)?;
        let payload = self.payload_for(phase);
        let challenge = schnorr_challenge(&aggregate_commitment, &aggregate_pubkey, &payload);

        let pass = self.pass_mut(phase);
        pass.aggregate_commitment = Some(aggregate_commitment);

        self.instance.state = match phase {
            Phase::One => ConsensusState::Challenged,
            Phase::Two => ConsensusState::ResponseSentOrReceived,
        };

        let bitmap = Self::bitmap_for(&self.committee, self.pass_ref(phase).commits.keys().copied());
        self.outbox.push(ConsensusMessage::Challenge {
            consensus_id: self.instance.consensus_id,
            phase,
            challenge,
            aggregate_commitment,
            aggregate_pubkey,
            bitmap,
        });

        // The leader answers its own challenge the same way a backup would.
        if let Some(secret) = self.own_secret.take() {
            let response = respond(&secret, &self.keypair.private, &challenge)?;
            self.pass_mut(phase).responses.insert(self.instance.my_id, response);
            self.maybe_finalize_pass(phase)?;
        }
        Ok(())
    }

    fn maybe_finalize_pass(&mut self, phase: Phase) -> ConsensusResult<()> {
        let pass = self.pass_ref(phase);
        if pass.responses.len() == pass.commits.len() {
            self.finalize_pass(phase)?;
        }
        Ok(())
    }

    fn finalize_pass(&mut self, phase: Phase) -> ConsensusResult<()> {
        let pass = self.pass_ref(phase);
        let aggregate_commitment = pass.aggregate_commitment.expect("challenge issued before responses close");
        let aggregate_response = aggregate_responses(&pass.responses.values().copied().collect::<Vec<_>>())?;
        let bitmap = Self::bitmap_for(&self.committee, pass.commits.keys().copied());
        let signature = MultiSignature { commitment: aggregate_commitment, response: aggregate_response };

        match phase {
            Phase::One => {
                self.cosig1 = Some((signature, bitmap.clone()));
                self.instance.state = ConsensusState::Collective1;
                self.outbox.push(ConsensusMessage::Collective {
                    consensus_id: self.instance.consensus_id,
                    phase,
                    signature,
                    bitmap,
                });
                // Leader re-enters as a phase-two committer, same as backups
                // do once they verify cosig1.
                let (secret, point) = commit();
                self.pass2.commits.insert(self.instance.my_id, point);
                self.own_secret = Some(secret);
                self.maybe_issue_challenge(Phase::Two)?;
            }
            Phase::Two => {
                self.instance.state = ConsensusState::Done;
                self.outbox.push(ConsensusMessage::Collective {
                    consensus_id: self.instance.consensus_id,
                    phase,
                    signature,
                    bitmap,
                });
            }
        }
        Ok(())
    }
}
