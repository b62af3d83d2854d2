//! Deterministic sharding structure computation (spec §4.3).
//!
//! Mirrors `DirectoryService::ComputeSharding()`: every verified PoW-2
//! submission is sorted by `SHA256(nonce || pubkey)`, then assigned
//! round-robin (`i mod numCommittees`) into that many shards. Shard `0`'s
//! first member by sort order becomes its leader, by the same convention
//! `Shard::leader` already applies by key order -- but committee
//! construction here preserves *sort* order via `Shard::from_members` so
//! leader election matches the PoW-derived assignment, not an incidental
//! pubkey-order coincidence.

use shardchain_crypto::sha256;
use shardchain_primitives::{Peer, PublicKey};
use shardchain_types::{PublicKeyToShardId, Shard, ShardingStructure};

/// One verified PoW-2 submission feeding sharding computation.
#[derive(Clone, Debug)]
pub struct Pow2Submission {
    /// Submitter's public key
    pub pub_key: PublicKey,
    /// Submitter's winning nonce
    pub nonce: u64,
    /// Submitter's network address, from the connection entry
    pub peer: Peer,
}

/// Target member count per shard (`COMM_SIZE` in the original).
pub const COMM_SIZE: usize = 1;

/// `numCommittees = floor(population / commSize)`, clamped to a minimum of 1.
pub fn num_committees(population: usize, comm_size: usize) -> usize {
    let n = population / comm_size.max(1);
    n.max(1)
}

/// `SHA256(nonce(32B BE) || pubkey(33B))`, the sort key every PoW-2
/// submission is ordered by before round-robin assignment.
fn sort_hash(nonce: u64, pub_key: &PublicKey) -> [u8; 32] {
    let mut buf = [0u8; 32 + 33];
    // Nonce occupies the low 8 bytes of a 32-byte big-endian field, matching
    // the original's 256-bit PoW nonce serialization with our narrower u64.
    buf[24..32].copy_from_slice(&nonce.to_be_bytes());
    buf[32..].copy_from_slice(pub_key.as_bytes());
    *sha256(&buf).as_bytes()
}

/// Compute the sharding structure and its inverse index from a set of
/// verified PoW-2 submissions, using `comm_size` as the target shard size.
pub fn compute_sharding(
    submissions: &[Pow2Submission],
    comm_size: usize,
) -> (ShardingStructure, PublicKeyToShardId) {
    let num_comms = num_committees(submissions.len(), comm_size);

    let mut sorted: Vec<&Pow2Submission> = submissions.iter().collect();
    sorted.sort_by_key(|s| sort_hash(s.nonce, &s.pub_key));

    let mut members_by_shard: Vec<Vec<(PublicKey, Peer)>> = vec![Vec::new(); num_comms];
    for (i, submission) in sorted.into_iter().enumerate() {
        members_by_shard[i % num_comms].push((submission.pub_key, submission.peer));
    }

    let structure: ShardingStructure =
        members_by_shard.into_iter().map(Shard::from_members).collect();
    let index = PublicKeyToShardId::from_sharding_structure(&structure);
    (structure, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn key(byte: u8) -> PublicKey {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[32] = byte;
        PublicKey::from_bytes(bytes)
    }

    fn submission(byte: u8, nonce: u64) -> Pow2Submission {
        Pow2Submission { pub_key: key(byte), nonce, peer: Peer::new(Ipv4Addr::new(10, 0, 0, byte as u32 % 255 + 1), 3000) }
    }

    #[test]
    fn num_committees_clamps_to_one_when_population_too_small() {
        assert_eq!(num_committees(5, 10), 1);
        assert_eq!(num_committees(0, 10), 1);
        assert_eq!(num_committees(25, 10), 2);
    }

    #[test]
    fn every_submission_lands_in_exactly_one_shard() {
        let submissions: Vec<_> = (1..=12u8).map(|b| submission(b, b as u64)).collect();
        let (structure, index) = compute_sharding(&submissions, 5);

        assert_eq!(structure.len(), 2);
        let total: usize = structure.iter().map(|s| s.len()).sum();
        assert_eq!(total, 12);

        for s in &submissions {
            assert!(index.shard_of(&s.pub_key).is_some());
        }
    }

    #[test]
    fn assignment_is_deterministic_regardless_of_input_order() {
        let mut submissions: Vec<_> = (1..=9u8).map(|b| submission(b, (10 - b) as u64)).collect();
        let (structure_a, _) = compute_sharding(&submissions, 3);

        submissions.reverse();
        let (structure_b, _) = compute_sharding(&submissions, 3);

        assert_eq!(structure_a, structure_b);
    }

    #[test]
    fn single_submission_still_forms_one_shard() {
        let submissions = vec![submission(1, 7)];
        let (structure, index) = compute_sharding(&submissions, 5);
        assert_eq!(structure.len(), 1);
        assert_eq!(index.shard_of(&key(1)), Some(0));
    }
}
