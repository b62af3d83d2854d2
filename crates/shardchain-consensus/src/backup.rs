//! The backup side of one consensus instance.

use shardchain_crypto::{
    aggregate_public_keys, challenge as schnorr_challenge, commit, respond, verify_multisig,
    CommitPoint, CommitSecret, MultiSignature, Response,
};
use shardchain_primitives::{KeyPair, PublicKey, H256};
use shardchain_types::{Bitmap, CoSignatures, ConsensusInstance, ConsensusState};

use crate::error::{BackupFault, ConsensusError, ConsensusResult};
use crate::message::{ConsensusMessage, Phase};
use crate::payload::phase_two_payload;

/// Checks an announced payload (or, for view-change instances, an
/// equivalent proposal) before this backup commits to it. Returns the fault
/// to report on rejection.
pub trait Validator: Send {
    /// Validate `payload`, the bytes the leader announced.
    fn validate(&mut self, payload: &[u8]) -> Result<(), BackupFault>;
}

impl<F: FnMut(&[u8]) -> Result<(), BackupFault> + Send> Validator for F {
    fn validate(&mut self, payload: &[u8]) -> Result<(), BackupFault> {
        self(payload)
    }
}

/// Drives the backup half of a single consensus instance to completion.
pub struct ConsensusBackup {
    instance: ConsensusInstance,
    keypair: KeyPair,
    committee: Vec<PublicKey>,
    validator: Box<dyn Validator>,
    announcement: Vec<u8>,
    secret: Option<CommitSecret>,
    cosig1: Option<(MultiSignature, Bitmap)>,
    cosig2: Option<(MultiSignature, Bitmap)>,
    outbox: Vec<ConsensusMessage>,
}

impl ConsensusBackup {
    /// Start tracking `instance`, which must identify some other committee
    /// position as leader.
    pub fn new(
        instance: ConsensusInstance,
        keypair: KeyPair,
        committee: Vec<PublicKey>,
        validator: impl Validator + 'static,
    ) -> Self {
        Self {
            instance,
            keypair,
            committee,
            validator: Box::new(validator),
            announcement: Vec::new(),
            secret: None,
            cosig1: None,
            cosig2: None,
            outbox: Vec::new(),
        }
    }

    /// This instance's identity and progress.
    pub fn instance(&self) -> &ConsensusInstance {
        &self.instance
    }

    /// Drain messages queued for sending to the leader since the last call.
    pub fn take_outbox(&mut self) -> Vec<ConsensusMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// The finalized co-signature, once the instance has reached `Done`.
    pub fn finalized(&self) -> Option<CoSignatures> {
        let (cs1, b1) = self.cosig1.clone()?;
        let (cs2, b2) = self.cosig2.clone()?;
        Some(CoSignatures { cs1, b1, cs2, b2 })
    }

    /// Reset to `Initial` after recovering from a missing-txn fault once the
    /// leader has supplied the missing bodies and re-announced.
    pub fn reset(&mut self) {
        self.instance.state = ConsensusState::Initial;
        self.announcement.clear();
        self.secret = None;
        self.cosig1 = None;
        self.cosig2 = None;
    }

    /// Handle an `Announce` from the leader.
    pub fn on_announce(&mut self, leader_id: u16, announcement: Vec<u8>) -> ConsensusResult<()> {
        if self.instance.state != ConsensusState::Initial {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }
        if leader_id != self.instance.leader_id {
            return self.fail(BackupFault::WrongOrder);
        }

        if let Err(fault) = self.validator.validate(&announcement) {
            return self.fail(fault);
        }

        self.announcement = announcement;
        let (secret, point) = commit();
        self.secret = Some(secret);
        self.instance.state = ConsensusState::AnnouncementSentOrReceived;
        self.outbox.push(ConsensusMessage::Commit {
            consensus_id: self.instance.consensus_id,
            phase: Phase::One,
            sender_id: self.instance.my_id,
            commitment: point,
        });
        Ok(())
    }

    /// Handle a `Challenge` from the leader.
    pub fn on_challenge(
        &mut self,
        phase: Phase,
        challenge: H256,
        aggregate_commitment: CommitPoint,
        aggregate_pubkey: PublicKey,
        bitmap: Bitmap,
    ) -> ConsensusResult<()> {
        let expected_state = match phase {
            Phase::One => ConsensusState::AnnouncementSentOrReceived,
            Phase::Two => ConsensusState::Collective1,
        };
        if self.instance.state != expected_state {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }
        if !bitmap.is_set(self.instance.my_id as usize) {
            // Our commit wasn't included in this round's quorum; nothing to
            // respond with.
            return Ok(());
        }

        let payload = self.payload_for(phase);
        let recomputed = schnorr_challenge(&aggregate_commitment, &aggregate_pubkey, &payload);
        if recomputed != challenge {
            return Err(ConsensusError::MalformedMessage(
                "challenge digest does not match recomputed aggregate".into(),
            ));
        }

        let secret = self.secret.take().ok_or_else(|| {
            ConsensusError::MalformedMessage("challenge received with no outstanding commit".into())
        })?;
        let response = respond(&secret, &self.keypair.private, &challenge)?;

        self.instance.state = match phase {
            Phase::One => ConsensusState::Challenged,
            Phase::Two => ConsensusState::ResponseSentOrReceived,
        };
        self.outbox.push(ConsensusMessage::Response {
            consensus_id: self.instance.consensus_id,
            phase,
            sender_id: self.instance.my_id,
            response,
        });
        Ok(())
    }

    /// Handle a `Collective` (the leader's finalized signature for one
    /// pass) from the leader.
    pub fn on_collective(
        &mut self,
        phase: Phase,
        signature: MultiSignature,
        bitmap: Bitmap,
    ) -> ConsensusResult<()> {
        let expected_state = match phase {
            Phase::One => ConsensusState::Challenged,
            Phase::Two => ConsensusState::ResponseSentOrReceived,
        };
        if self.instance.state != expected_state {
            return Err(ConsensusError::StateMismatch { got: self.instance.state });
        }

        let signer_keys: Vec<PublicKey> =
            bitmap.set_indices().map(|i| self.committee[i]).collect();
        let aggregate_pubkey = aggregate_public_keys(&signer_keys)?;
        let payload = self.payload_for(phase);
        let ok = verify_multisig(&signature, &aggregate_pubkey, &payload)?;
        if !ok {
            return self.fail(BackupFault::ValidationFailure(format!(
                "{phase:?} collective signature failed to verify"
            )));
        }

        match phase {
            Phase::One => {
                self.cosig1 = Some((signature, bitmap));
                let (secret, point) = commit();
                self.secret = Some(secret);
                self.instance.state = ConsensusState::Collective1;
                self.outbox.push(ConsensusMessage::Commit {
                    consensus_id: self.instance.consensus_id,
                    phase: Phase::Two,
                    sender_id: self.instance.my_id,
                    commitment: point,
                });
            }
            Phase::Two => {
                self.cosig2 = Some((signature, bitmap));
                self.instance.state = ConsensusState::Done;
            }
        }
        Ok(())
    }

    fn payload_for(&self, phase: Phase) -> Vec<u8> {
        match phase {
            Phase::One => self.announcement.clone(),
            Phase::Two => {
                let (sig, bitmap) = self.cosig1.as_ref().expect("cosig1 set before phase two starts");
                phase_two_payload(sig, bitmap)
            }
        }
    }

    fn fail(&mut self, fault: BackupFault) -> ConsensusResult<()> {
        self.instance.state = ConsensusState::Error;
        self.outbox.push(ConsensusMessage::Error {
            consensus_id: self.instance.consensus_id,
            sender_id: self.instance.my_id,
            fault: fault.clone(),
        });
        Err(ConsensusError::BackupReported(self.instance.my_id, fault))
    }
}
