//! # shardchain-crypto
//!
//! Hashing and Schnorr multisignature primitives: SHA-256 (block header and
//! transaction hashing) and the two-round Schnorr multisignature scheme used
//! to finalize `DsBlock`/`TxBlock`/`MicroBlock`/`VcBlock` headers.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::{sha256, sha256_concat};
pub use signature::{
    aggregate_commitments, aggregate_public_keys, aggregate_responses, challenge, commit,
    generate_keypair, respond, sign, verify, verify_multisig, CommitPoint, CommitSecret,
    MultiSignature, Response,
};
