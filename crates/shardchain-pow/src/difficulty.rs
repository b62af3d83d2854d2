//! Difficulty-to-target mapping and target comparison.
//!
//! A difficulty level `d` maps to a 256-bit target whose first `d` bits are
//! zero; the remaining bits (including any partial leading byte) are one.
//! A candidate hash passes iff, read as a big-endian unsigned integer, it is
//! `<= target`.

use shardchain_primitives::H256;

/// Build the target for a given difficulty.
pub fn target_for_difficulty(difficulty: u8) -> H256 {
    let mut bytes = [0xffu8; 32];
    let full_bytes = (difficulty / 8) as usize;
    let remaining_bits = difficulty % 8;

    for byte in bytes.iter_mut().take(full_bytes.min(32)) {
        *byte = 0x00;
    }
    if full_bytes < 32 && remaining_bits > 0 {
        bytes[full_bytes] = 0xff >> remaining_bits;
    }
    H256::from_bytes(bytes)
}

/// Whether `hash`, as a big-endian unsigned integer, is `<= target`.
pub fn meets_target(hash: &H256, target: &H256) -> bool {
    hash.as_bytes() <= target.as_bytes()
}
