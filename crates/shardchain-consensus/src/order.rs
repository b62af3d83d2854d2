//! Per-`consensusId` message ordering.
//!
//! Messages for the same `consensusId` must be processed in phase order.
//! Messages naming an older `consensusId` are discarded outright; messages
//! naming a newer one are held in a bounded per-id queue and redelivered
//! once the local instance actually advances to that id.

use std::collections::BTreeMap;

use crate::error::ConsensusError;
use crate::message::ConsensusMessage;

/// Buffers messages that arrived ahead of the local `consensusId`.
#[derive(Default)]
pub struct OrderBuffer {
    pending: BTreeMap<u32, Vec<ConsensusMessage>>,
}

impl OrderBuffer {
    /// A fresh, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `msg` against `current_id`: messages for `current_id` are
    /// handed back to the caller to process immediately; older messages are
    /// rejected; newer messages are queued and `None` is returned.
    pub fn admit(
        &mut self,
        current_id: u32,
        msg: ConsensusMessage,
    ) -> Result<Option<ConsensusMessage>, ConsensusError> {
        let id = msg.consensus_id();
        if id < current_id {
            return Err(ConsensusError::StaleConsensusId { current: current_id, got: id });
        }
        if id > current_id {
            self.pending.entry(id).or_default().push(msg);
            return Ok(None);
        }
        Ok(Some(msg))
    }

    /// Pop every message buffered for `new_current_id`, in arrival order.
    /// Call after the local instance advances its `consensusId`.
    pub fn drain(&mut self, new_current_id: u32) -> Vec<ConsensusMessage> {
        self.pending.remove(&new_current_id).unwrap_or_default()
    }

    /// Drop every buffered message for ids that have fallen behind
    /// `current_id`, freeing memory for instances that will never be
    /// reached (e.g. a view change skipped straight past them).
    pub fn evict_stale(&mut self, current_id: u32) {
        self.pending.retain(|&id, _| id >= current_id);
    }
}
