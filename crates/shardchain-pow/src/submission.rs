//! The Schnorr-signed PoW submission a node sends to the DS committee.
//!
//! Wire layout: `blockNum(u64) || difficulty(u8) || listeningPort(u32) ||
//! pubKey(33) || nonce(u64) || resultHash(32) || mixHash(32) ||
//! schnorrSig(64)`.

use crate::error::PowResult;
use shardchain_crypto::{sign, verify, MultiSignature};
use shardchain_primitives::{KeyPair, PublicKey, H256};

/// A PoW solution ready to be broadcast to the DS committee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowSubmission {
    /// DS block number this solution is for
    pub block_num: u64,
    /// Difficulty the solution meets
    pub difficulty: u8,
    /// Port the submitting node listens on
    pub listening_port: u32,
    /// Submitter's public key
    pub pub_key: PublicKey,
    /// Winning nonce
    pub nonce: u64,
    /// Winning result digest
    pub result: H256,
    /// Winning mix digest
    pub mix_hash: H256,
    /// Schnorr signature over every field above
    pub signature: MultiSignature,
}

impl PowSubmission {
    /// The exact bytes the signature is computed over: every field except
    /// the signature itself, in wire order.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 1 + 4 + 33 + 8 + 32 + 32);
        buf.extend_from_slice(&self.block_num.to_be_bytes());
        buf.push(self.difficulty);
        buf.extend_from_slice(&self.listening_port.to_be_bytes());
        buf.extend_from_slice(self.pub_key.as_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(self.result.as_bytes());
        buf.extend_from_slice(self.mix_hash.as_bytes());
        buf
    }

    /// Build and sign a submission from a mining result.
    pub fn sign(
        block_num: u64,
        difficulty: u8,
        listening_port: u32,
        nonce: u64,
        result: H256,
        mix_hash: H256,
        keypair: &KeyPair,
    ) -> PowResult<Self> {
        let mut submission = Self {
            block_num,
            difficulty,
            listening_port,
            pub_key: keypair.public,
            nonce,
            result,
            mix_hash,
            signature: sign(&[], keypair)?,
        };
        submission.signature = sign(&submission.signing_bytes(), keypair)?;
        Ok(submission)
    }

    /// Verify the submission's signature against its claimed `pub_key`.
    pub fn verify_signature(&self) -> bool {
        verify(&self.signing_bytes(), &self.signature, &self.pub_key).unwrap_or(false)
    }
}
