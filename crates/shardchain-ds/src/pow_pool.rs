//! PoW submission collection for one DS epoch: verified submissions plus the
//! "connection entries" map that outlives any individual submission window
//! (spec §4.6: late arrivals during DS-block consensus preparation are
//! accepted as connection entries -- the `PubKey → Peer` mapping is kept
//! even when the solution itself is too late to influence block
//! composition).

use std::collections::BTreeMap;

use shardchain_pow::PowSubmission;
use shardchain_primitives::{Peer, PublicKey, H256};

/// Verified PoW submissions collected during one window (PoW-1 or PoW-2),
/// plus the `allPoWConns` address book.
#[derive(Default)]
pub struct PowPool {
    submissions: BTreeMap<PublicKey, PowSubmission>,
    connections: BTreeMap<PublicKey, Peer>,
}

impl PowPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection entry independent of whether its submission made
    /// the window: the peer mapping is retained regardless.
    pub fn record_connection(&mut self, pub_key: PublicKey, peer: Peer) {
        self.connections.insert(pub_key, peer);
    }

    /// Admit a verified submission (caller has already checked
    /// `submission.verify_signature()` and the PoW digest itself). Also
    /// records the connection entry for `listening_port`'s peer if `ip` is
    /// supplied by the caller at the network layer; `record_connection` is a
    /// separate call since the submission payload carries no IP.
    pub fn admit(&mut self, submission: PowSubmission) {
        self.submissions.insert(submission.pub_key, submission);
    }

    /// Number of distinct submitters admitted so far.
    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    /// Whether no submissions have been admitted.
    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// Connection entry for a public key, whether or not its submission was
    /// admitted in time.
    pub fn connection_of(&self, pub_key: &PublicKey) -> Option<Peer> {
        self.connections.get(pub_key).copied()
    }

    /// Submissions sorted ascending by solution hash: the head is the
    /// PoW-1 winner and prospective new DS leader.
    pub fn sorted_by_solution_hash(&self) -> Vec<&PowSubmission> {
        let mut items: Vec<&PowSubmission> = self.submissions.values().collect();
        items.sort_by_key(|s| *s.result.as_bytes());
        items
    }

    /// The PoW-1 winner: the submission with the lowest solution hash.
    pub fn winner(&self) -> Option<&PowSubmission> {
        self.sorted_by_solution_hash().into_iter().next()
    }

    /// All admitted submissions, for feeding `compute_sharding`.
    pub fn submissions(&self) -> impl Iterator<Item = &PowSubmission> {
        self.submissions.values()
    }
}

/// Checks a submission's claimed result meets `difficulty`'s target, without
/// re-deriving the header (the header depends on `rand1`/`rand2`, which the
/// caller already has in scope).
pub fn result_meets_difficulty(result: H256, difficulty: u8) -> bool {
    shardchain_pow::meets_target(&result, &shardchain_pow::target_for_difficulty(difficulty))
}
