//! The canonical byte encoding of a phase-one signature, used as the
//! phase-two challenge payload. Leader and backups must derive byte-identical
//! encodings independently, since each recomputes the phase-two challenge
//! rather than trusting the other side's claim.

use shardchain_crypto::MultiSignature;
use shardchain_types::Bitmap;

/// Encode `(cosig1, bitmap)` as the payload phase two's challenge is
/// computed over.
pub fn phase_two_payload(signature: &MultiSignature, bitmap: &Bitmap) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(33 + 32 + bitmap.popcount() * 4);
    bytes.extend_from_slice(signature.commitment.as_bytes());
    bytes.extend_from_slice(signature.response.as_bytes());
    for i in bitmap.set_indices() {
        bytes.extend_from_slice(&(i as u32).to_be_bytes());
    }
    bytes
}
