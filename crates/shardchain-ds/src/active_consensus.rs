//! The single consensus instance the coordinator drives at any one time.
//!
//! Spec §4.2 runs DS-block, sharding, microblock, and finalblock consensus
//! in strict sequence, never concurrently; `ActiveConsensus` wraps whichever
//! `ConsensusLeader`/`ConsensusBackup` is currently live, and `OrderBuffer`
//! (already supplied by `shardchain-consensus`) holds protocol messages that
//! outrun it until it catches up.

use shardchain_consensus::{ConsensusBackup, ConsensusError, ConsensusLeader, ConsensusMessage, OrderBuffer, Phase};
use shardchain_types::{ConsensusKind, CoSignatures};

use crate::error::{DsError, DsResult};

/// Either side of the generic 4-phase engine, for whichever `ConsensusKind`
/// is currently running.
pub enum ActiveConsensus {
    /// This node is the leader for the running instance
    Leader(ConsensusLeader),
    /// This node is a backup for the running instance
    Backup(ConsensusBackup),
}

impl ActiveConsensus {
    /// Which block kind the running instance is finalizing.
    pub fn kind(&self) -> ConsensusKind {
        match self {
            ActiveConsensus::Leader(l) => l.instance().kind,
            ActiveConsensus::Backup(b) => b.instance().kind,
        }
    }

    /// The running instance's `consensusId`.
    pub fn consensus_id(&self) -> u32 {
        match self {
            ActiveConsensus::Leader(l) => l.instance().consensus_id,
            ActiveConsensus::Backup(b) => b.instance().consensus_id,
        }
    }

    /// Whether the instance has concluded, successfully or not.
    pub fn is_terminal(&self) -> bool {
        match self {
            ActiveConsensus::Leader(l) => l.instance().is_terminal(),
            ActiveConsensus::Backup(b) => b.instance().is_terminal(),
        }
    }

    /// The finalized co-signature, once the instance has reached `Done`.
    pub fn finalized(&self) -> Option<CoSignatures> {
        match self {
            ActiveConsensus::Leader(l) => l.finalized(),
            ActiveConsensus::Backup(b) => b.finalized(),
        }
    }

    /// Drain messages queued for broadcast/reply since the last call.
    pub fn take_outbox(&mut self) -> Vec<ConsensusMessage> {
        match self {
            ActiveConsensus::Leader(l) => l.take_outbox(),
            ActiveConsensus::Backup(b) => b.take_outbox(),
        }
    }

    /// Feed one phase-ordered protocol message to whichever side this
    /// instance is driving.
    pub fn on_message(&mut self, msg: ConsensusMessage) -> Result<(), ConsensusError> {
        match (self, msg) {
            (ActiveConsensus::Leader(l), ConsensusMessage::Commit { sender_id, commitment, phase, .. }) => {
                l.on_commit(phase, sender_id, commitment)
            }
            (ActiveConsensus::Leader(l), ConsensusMessage::Response { sender_id, response, phase, .. }) => {
                l.on_response(phase, sender_id, response)
            }
            (ActiveConsensus::Leader(l), ConsensusMessage::Error { sender_id, fault, .. }) => {
                l.on_fault(sender_id, fault)
            }
            (ActiveConsensus::Backup(b), ConsensusMessage::Announce { leader_id, announcement, .. }) => {
                b.on_announce(leader_id, announcement)
            }
            (
                ActiveConsensus::Backup(b),
                ConsensusMessage::Challenge { phase, challenge, aggregate_commitment, aggregate_pubkey, bitmap, .. },
            ) => b.on_challenge(phase, challenge, aggregate_commitment, aggregate_pubkey, bitmap),
            (ActiveConsensus::Backup(b), ConsensusMessage::Collective { phase, signature, bitmap, .. }) => {
                b.on_collective(phase, signature, bitmap)
            }
            _ => Err(ConsensusError::MalformedMessage(
                "message direction does not match this node's role in the instance".into(),
            )),
        }
    }

    /// Unused by `phase` directly but kept to mirror the engine's own phase
    /// split when logging which pass a message belonged to.
    pub fn phase_label(msg: &ConsensusMessage) -> Option<Phase> {
        match msg {
            ConsensusMessage::Commit { phase, .. }
            | ConsensusMessage::Challenge { phase, .. }
            | ConsensusMessage::Response { phase, .. }
            | ConsensusMessage::Collective { phase, .. } => Some(*phase),
            ConsensusMessage::Announce { .. } | ConsensusMessage::Error { .. } => None,
        }
    }
}

/// Multiplexes the one currently-running consensus instance behind a
/// per-`consensusId` ordering buffer.
#[derive(Default)]
pub struct ConsensusMultiplexer {
    /// The currently-running instance, if any
    pub active: Option<ActiveConsensus>,
    order: OrderBuffer,
}

impl ConsensusMultiplexer {
    /// An empty multiplexer with no running instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start driving `leader` as the active instance, replacing any prior
    /// (necessarily terminal) one.
    pub fn set_leader(&mut self, leader: ConsensusLeader) {
        self.active = Some(ActiveConsensus::Leader(leader));
    }

    /// Start driving `backup` as the active instance, replacing any prior
    /// (necessarily terminal) one.
    pub fn set_backup(&mut self, backup: ConsensusBackup) {
        self.active = Some(ActiveConsensus::Backup(backup));
    }

    /// Order-check `msg` against `current_consensus_id` and, if it belongs
    /// to the running instance, deliver it immediately; a message naming a
    /// future id is buffered, a message naming a past one is rejected.
    pub fn deliver(&mut self, current_consensus_id: u32, msg: ConsensusMessage) -> DsResult<()> {
        if let Some(msg) = self.order.admit(current_consensus_id, msg)? {
            let active = self
                .active
                .as_mut()
                .ok_or_else(|| DsError::InvariantViolation("no active consensus instance".into()))?;
            active.on_message(msg)?;
        }
        Ok(())
    }

    /// Pop every message buffered for the instance now starting under
    /// `new_current_id`.
    pub fn drain_buffered(&mut self, new_current_id: u32) -> Vec<ConsensusMessage> {
        self.order.drain(new_current_id)
    }

    /// Drop buffered traffic for ids that have fallen behind, e.g. after a
    /// view change skips straight past them.
    pub fn evict_stale(&mut self, current_id: u32) {
        self.order.evict_stale(current_id);
    }
}
