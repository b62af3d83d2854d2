//! Schnorr signatures and two-round Schnorr multisignatures over secp256k1.
//!
//! Every block in the system (`DsBlock`, `TxBlock`, `MicroBlock`, `VcBlock`) is
//! finalized by a committee multisignature rather than a single signer. The
//! scheme here mirrors the commit/challenge/response shape of the consensus
//! engine's CS1/CS2 phases directly: the "commit" step below produces the
//! per-node nonce exchanged in CS1, and "respond" produces the per-node
//! response exchanged in CS2.
//!
//! Single-signer `sign`/`verify` are the degenerate one-party case of the
//! same commit/challenge/response construction, used for transaction
//! signatures.

use k256::elliptic_curve::ff::{Field, PrimeField};
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use rand::RngCore;
use shardchain_primitives::{KeyPair, PrivateKey, PublicKey, H256};

use crate::hash::sha256_concat;
use crate::{CryptoError, CryptoResult};

/// Generate a fresh keypair.
pub fn generate_keypair() -> KeyPair {
    let scalar = random_nonzero_scalar();
    let public = public_from_scalar(&scalar);
    KeyPair::new(PrivateKey::from_bytes(scalar.to_repr().into()), public)
}

fn random_nonzero_scalar() -> Scalar {
    loop {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        if let Some(scalar) = scalar_from_bytes(&bytes) {
            if scalar != Scalar::ZERO {
                return scalar;
            }
        }
    }
}

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr((*bytes).into()))
}

fn scalar_from_private_key(key: &PrivateKey) -> CryptoResult<Scalar> {
    scalar_from_bytes(key.as_bytes())
        .ok_or_else(|| CryptoError::InvalidPrivateKey("scalar out of range".to_string()))
}

fn point_from_public_key(key: &PublicKey) -> CryptoResult<ProjectivePoint> {
    let encoded = k256::EncodedPoint::from_bytes(key.as_bytes())
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| CryptoError::InvalidPublicKey("point not on curve".to_string()))?;
    Ok(ProjectivePoint::from(affine))
}

fn public_key_from_point(point: &ProjectivePoint) -> PublicKey {
    let encoded = point.to_affine().to_encoded_point(true);
    PublicKey::from_slice(encoded.as_bytes()).expect("compressed SEC1 point is 33 bytes")
}

fn public_from_scalar(scalar: &Scalar) -> PublicKey {
    let point = ProjectivePoint::GENERATOR * scalar;
    public_key_from_point(&point)
}

/// Map a SHA-256 digest to a scalar mod the curve order. Used both for the
/// Schnorr challenge and as the generic hash-to-scalar primitive. Digests
/// that exceed the curve order are astronomically unlikely (~2^-128) but are
/// folded back in range rather than rejected, so challenge computation can
/// never fail.
fn hash_to_scalar(digest: &H256) -> Scalar {
    scalar_from_bytes(digest.as_bytes()).unwrap_or_else(|| {
        let mut reduced = *digest.as_bytes();
        reduced[0] = 0;
        scalar_from_bytes(&reduced).expect("clearing the top byte brings digest in range")
    })
}

/// A single committee member's signing nonce, held privately between the
/// commit and respond steps of one consensus round. Must never be reused
/// across rounds or leaked: reuse lets an observer recover the private key.
#[derive(Clone)]
pub struct CommitSecret(Scalar);

/// The public commitment point broadcast during the commit phase (CS1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitPoint(PublicKey);

impl CommitPoint {
    /// Compressed point bytes, as carried on the wire.
    pub fn as_bytes(&self) -> &[u8; 33] {
        self.0.as_bytes()
    }

    /// Build from compressed point bytes received over the wire.
    pub fn from_bytes(bytes: [u8; 33]) -> Self {
        CommitPoint(PublicKey::from_bytes(bytes))
    }
}

/// A committee member's response scalar, broadcast during the response
/// phase (CS2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response([u8; 32]);

impl Response {
    /// Raw scalar bytes, as carried on the wire.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Build from scalar bytes received over the wire.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Response(bytes)
    }

    fn to_scalar(self) -> CryptoResult<Scalar> {
        scalar_from_bytes(&self.0)
            .ok_or_else(|| CryptoError::InvalidSignature("response scalar out of range".into()))
    }
}

/// A finalized multisignature: the aggregate commitment point plus the
/// aggregate response scalar. Combined with the participation bitmap this
/// is what `CoSignatures` carries on each block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultiSignature {
    /// Aggregate of the selected signers' commitment points.
    pub commitment: CommitPoint,
    /// Aggregate of the selected signers' response scalars.
    pub response: Response,
}

/// Generate this node's per-round nonce and its public commitment. Call once
/// per consensus round; the secret half must be held until [`respond`] and
/// then discarded.
pub fn commit() -> (CommitSecret, CommitPoint) {
    let k = random_nonzero_scalar();
    let point = ProjectivePoint::GENERATOR * k;
    (CommitSecret(k), CommitPoint(public_key_from_point(&point)))
}

/// Sum a set of commitment points (or public keys, via [`aggregate_public_keys`])
/// into a single aggregate point. Used to combine the commitments of the
/// committee members selected in a round's participation bitmap.
pub fn aggregate_commitments(points: &[CommitPoint]) -> CryptoResult<CommitPoint> {
    if points.is_empty() {
        return Err(CryptoError::EmptySignerSet);
    }
    let mut acc = ProjectivePoint::IDENTITY;
    for p in points {
        acc += point_from_public_key(&p.0)?;
    }
    Ok(CommitPoint(public_key_from_point(&acc)))
}

/// Sum a set of public keys into a single aggregate public key. The bitmap
/// that selected these keys is carried alongside on the wire so verifiers
/// can recompute the same aggregate independently.
pub fn aggregate_public_keys(keys: &[PublicKey]) -> CryptoResult<PublicKey> {
    if keys.is_empty() {
        return Err(CryptoError::EmptySignerSet);
    }
    let mut acc = ProjectivePoint::IDENTITY;
    for k in keys {
        acc += point_from_public_key(k)?;
    }
    Ok(public_key_from_point(&acc))
}

/// Compute the Schnorr challenge `c = H(aggregate_commitment || aggregate_pubkey || message)`.
pub fn challenge(aggregate_commitment: &CommitPoint, aggregate_pubkey: &PublicKey, message: &[u8]) -> H256 {
    sha256_concat(&[
        aggregate_commitment.as_bytes(),
        aggregate_pubkey.as_bytes(),
        message,
    ])
}

/// Produce this node's response scalar for the response phase (CS2):
/// `response = nonce + challenge * private_key (mod n)`.
pub fn respond(
    secret: &CommitSecret,
    private_key: &PrivateKey,
    challenge: &H256,
) -> CryptoResult<Response> {
    let x = scalar_from_private_key(private_key)?;
    let c = hash_to_scalar(challenge);
    let s = secret.0 + c * x;
    Ok(Response(s.to_repr().into()))
}

/// Sum a set of response scalars mod the curve order.
pub fn aggregate_responses(responses: &[Response]) -> CryptoResult<Response> {
    if responses.is_empty() {
        return Err(CryptoError::EmptySignerSet);
    }
    let mut acc = Scalar::ZERO;
    for r in responses {
        acc += r.to_scalar()?;
    }
    Ok(Response(acc.to_repr().into()))
}

/// Verify a finalized multisignature: `response * G == aggregate_commitment + challenge * aggregate_pubkey`.
pub fn verify_multisig(
    signature: &MultiSignature,
    aggregate_pubkey: &PublicKey,
    message: &[u8],
) -> CryptoResult<bool> {
    let c_digest = challenge(&signature.commitment, aggregate_pubkey, message);
    let c = hash_to_scalar(&c_digest);
    let s = signature.response.to_scalar()?;

    let lhs = ProjectivePoint::GENERATOR * s;
    let rhs = point_from_public_key(&signature.commitment.0)? + point_from_public_key(aggregate_pubkey)? * c;

    Ok(lhs == rhs)
}

/// Single-signer Schnorr signature, the one-party case of the same
/// commit/challenge/response construction. Used for transaction signatures.
pub fn sign(message: &[u8], key: &KeyPair) -> CryptoResult<MultiSignature> {
    let (secret, commitment) = commit();
    let c_digest = challenge(&commitment, &key.public, message);
    let response = respond(&secret, &key.private, &c_digest)?;
    Ok(MultiSignature { commitment, response })
}

/// Verify a single-signer Schnorr signature produced by [`sign`].
pub fn verify(message: &[u8], signature: &MultiSignature, public_key: &PublicKey) -> CryptoResult<bool> {
    verify_multisig(signature, public_key, message)
}
