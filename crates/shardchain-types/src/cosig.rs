//! Committee co-signatures: the two-phase Schnorr multisignature attached to
//! every committed block.

use shardchain_crypto::{aggregate_public_keys, verify_multisig, MultiSignature};
use shardchain_primitives::PublicKey;

use crate::error::{TypesError, TypesResult};

/// A participation bitmap over committee positions, one bit per member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitmap(Vec<bool>);

impl Bitmap {
    /// An all-zero bitmap of the given length.
    pub fn zeroed(len: usize) -> Self {
        Bitmap(vec![false; len])
    }

    /// Build directly from bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Bitmap(bits)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bitmap has no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mark committee position `index` as a signer.
    pub fn set(&mut self, index: usize) {
        self.0[index] = true;
    }

    /// Whether committee position `index` is marked as a signer.
    pub fn is_set(&self, index: usize) -> bool {
        self.0[index]
    }

    /// Count of set bits.
    pub fn popcount(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    /// Indices of all set bits, in ascending order.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter_map(|(i, b)| b.then_some(i))
    }
}

/// Minimum signer count for a committee of size `n`: `floor(2n/3)+1`.
pub fn threshold(committee_size: usize) -> usize {
    (2 * committee_size) / 3 + 1
}

/// The two-phase committee co-signature attached to every block kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoSignatures {
    /// Phase-1 (CS1) aggregated response
    pub cs1: MultiSignature,
    /// Phase-1 participation bitmap
    pub b1: Bitmap,
    /// Phase-2 (CS2) aggregated response
    pub cs2: MultiSignature,
    /// Phase-2 participation bitmap
    pub b2: Bitmap,
}

impl CoSignatures {
    /// Verify this co-signature against the committee's public keys and the
    /// canonical block-header bytes it was signed over.
    ///
    /// Only the CS2 phase (the final, full-committee signature) gates block
    /// acceptance; CS1 is the intermediate commit-phase signature and is not
    /// independently re-verified here.
    pub fn verify(&self, committee: &[PublicKey], header_bytes: &[u8]) -> TypesResult<bool> {
        if self.b2.len() != committee.len() {
            return Err(TypesError::BitmapLengthMismatch {
                expected: committee.len(),
                got: self.b2.len(),
            });
        }
        let required = threshold(committee.len());
        let signers = self.b2.popcount();
        if signers < required {
            return Err(TypesError::InsufficientSigners {
                signers,
                committee_size: committee.len(),
                required,
            });
        }

        let signer_keys: Vec<PublicKey> =
            self.b2.set_indices().map(|i| committee[i]).collect();
        let aggregate = aggregate_public_keys(&signer_keys)?;
        Ok(verify_multisig(&self.cs2, &aggregate, header_bytes)?)
    }
}
