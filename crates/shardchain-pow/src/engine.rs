//! The PoW engine itself.
//!
//! Unlike the teacher's ethash-backed original, this computes the
//! proof-of-work puzzle as a single SHA-256 pass over the header and nonce:
//! `result = SHA256(headerHash || blockNum || nonce)`, with `mixHash =
//! SHA256(result)` standing in for ethash's DAG-derived mix digest. The
//! engine is otherwise shaped exactly like the original: a mutex-guarded
//! light-client configuration step, a stoppable `mine`, and a `verify` that
//! recomputes the same digest.

use crate::difficulty::{meets_target, target_for_difficulty};
use parking_lot::Mutex;
use shardchain_primitives::{Peer, PublicKey, H256};
use shardchain_crypto::sha256;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a successful mining attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningResult {
    /// The winning digest, which meets the target.
    pub result: H256,
    /// The derived mix digest, checked independently on verification.
    pub mix_hash: H256,
    /// The nonce that produced `result`.
    pub nonce: u64,
    /// Always true for a value actually returned by `mine`; kept for parity
    /// with the original engine's result struct, which callers check before
    /// reading the other fields.
    pub success: bool,
}

/// The canonical PoW header: `SHA256(rand1 || rand2 || ipAddrLE || pubKey)`.
pub fn header_hash(rand1: H256, rand2: H256, ip_addr: &Peer, pub_key: &PublicKey) -> H256 {
    let mut buf = Vec::with_capacity(32 + 32 + 4 + 33);
    buf.extend_from_slice(rand1.as_bytes());
    buf.extend_from_slice(rand2.as_bytes());
    buf.extend_from_slice(&ip_addr.ip_u32_be().to_le_bytes());
    buf.extend_from_slice(pub_key.as_bytes());
    sha256(&buf)
}

fn digest_for_nonce(header: &H256, block_num: u64, nonce: u64) -> (H256, H256) {
    let mut buf = Vec::with_capacity(32 + 8 + 8);
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(&block_num.to_be_bytes());
    buf.extend_from_slice(&nonce.to_be_bytes());
    let result = sha256(&buf);
    let mix_hash = sha256(result.as_bytes());
    (result, mix_hash)
}

/// A single engine instance. Not a process-wide singleton: each caller
/// (shard node, DS node) owns one and threads it through explicitly.
pub struct PowEngine {
    configured_block_num: Mutex<Option<u64>>,
    stop_flag: Arc<AtomicBool>,
}

impl Default for PowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PowEngine {
    /// A fresh, unconfigured engine.
    pub fn new() -> Self {
        Self { configured_block_num: Mutex::new(None), stop_flag: Arc::new(AtomicBool::new(false)) }
    }

    /// Idempotent (re)initialization for `block_num`. No-op if already
    /// configured for this block number.
    pub fn configure_light(&self, block_num: u64) {
        let mut configured = self.configured_block_num.lock();
        if *configured == Some(block_num) {
            return;
        }
        *configured = Some(block_num);
    }

    /// Signal any in-progress `mine` call to stop at the next nonce boundary.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Clear a previously raised stop signal so the engine can mine again.
    pub fn reset_stop(&self) {
        self.stop_flag.store(false, Ordering::SeqCst);
    }

    /// Mine for a solution meeting `difficulty`, starting from nonce 0 and
    /// incrementing until a solution is found or [`PowEngine::stop`] is
    /// called. `full_dataset` is accepted for interface parity with the
    /// original engine's light/full dataset switch; this engine has no
    /// dataset and ignores it.
    pub fn mine(
        &self,
        block_num: u64,
        difficulty: u8,
        rand1: H256,
        rand2: H256,
        ip_addr: &Peer,
        pub_key: &PublicKey,
        _full_dataset: bool,
    ) -> Option<MiningResult> {
        let header = header_hash(rand1, rand2, ip_addr, pub_key);
        let target = target_for_difficulty(difficulty);

        let mut nonce: u64 = 0;
        loop {
            if self.stop_flag.load(Ordering::SeqCst) {
                return None;
            }
            let (result, mix_hash) = digest_for_nonce(&header, block_num, nonce);
            if meets_target(&result, &target) {
                return Some(MiningResult { result, mix_hash, nonce, success: true });
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    /// Recompute the digest for `nonce` and check it against `difficulty`
    /// and the claimed `result`/`mix_hash`.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        block_num: u64,
        difficulty: u8,
        rand1: H256,
        rand2: H256,
        ip_addr: &Peer,
        pub_key: &PublicKey,
        _full_dataset: bool,
        nonce: u64,
        claimed_result: H256,
        claimed_mix_hash: H256,
    ) -> bool {
        let header = header_hash(rand1, rand2, ip_addr, pub_key);
        let target = target_for_difficulty(difficulty);
        let (result, mix_hash) = digest_for_nonce(&header, block_num, nonce);
        result == claimed_result && mix_hash == claimed_mix_hash && meets_target(&result, &target)
    }
}
