//! SHA-256 hashing used for block header hashes, transaction hashes, and the
//! Schnorr multisignature challenge.

use shardchain_primitives::H256;
use sha2::{Digest, Sha256};

/// SHA-256 of the given bytes.
pub fn sha256(data: &[u8]) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    H256::from_slice(&digest).expect("sha256 digest is always 32 bytes")
}

/// SHA-256 of the concatenation of several byte slices, without an
/// intermediate allocation.
pub fn sha256_concat(parts: &[&[u8]]) -> H256 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    H256::from_slice(&digest).expect("sha256 digest is always 32 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let a = sha256(b"shardchain");
        let b = sha256(b"shardchain");
        assert_eq!(a, b);
    }

    #[test]
    fn sha256_concat_matches_joined_input() {
        let joined = sha256(b"foobar");
        let split = sha256_concat(&[b"foo", b"bar"]);
        assert_eq!(joined, split);
    }

    #[test]
    fn known_vector_empty_input() {
        let digest = sha256(b"");
        assert_eq!(
            digest.to_hex(),
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector_abc() {
        let digest = sha256(b"abc");
        assert_eq!(
            digest.to_hex(),
            "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
