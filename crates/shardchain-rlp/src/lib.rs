//! # shardchain-rlp
//!
//! RLP (Recursive Length Prefix) encoding/decoding for shardchain.
//!
//! Wraps the `rlp` crate for direct use, plus the minimal-bytes integer
//! encoding helpers needed to key the transaction Merkle-Patricia trie by
//! RLP-encoded sequential index (see `shardchain-trie`).
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

use bytes::{BufMut, BytesMut};

// Re-export rlp crate for direct use
pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

// Re-export primitives with RLP support
pub use shardchain_primitives::{Address, H160, H256};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}

/// Encode a sequential trie index the same way the original index-keyed
/// transaction trie does: `RLPStream << index`.
pub fn encode_trie_key(index: u64) -> Vec<u8> {
    utils::encode_u64(index)
}

/// RLP encoding utilities
pub mod utils {
    use super::*;

    /// Encode a u64 with minimal bytes (no leading zeros)
    pub fn encode_u64(value: u64) -> Vec<u8> {
        if value == 0 {
            return vec![0x80]; // Empty string for 0
        }
        if value < 128 {
            return vec![value as u8];
        }

        let mut buf = BytesMut::with_capacity(9);
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(8);
        let len = 8 - start;
        buf.put_u8(0x80 + len as u8);
        buf.put_slice(&bytes[start..]);
        buf.to_vec()
    }

    /// Encode a u128 with minimal bytes
    pub fn encode_u128(value: u128) -> Vec<u8> {
        if value == 0 {
            return vec![0x80];
        }
        if value < 128 {
            return vec![value as u8];
        }

        let mut buf = BytesMut::with_capacity(17);
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(16);
        let len = 16 - start;
        buf.put_u8(0x80 + len as u8);
        buf.put_slice(&bytes[start..]);
        buf.to_vec()
    }

    /// Decode RLP-encoded integer to u64
    pub fn decode_u64(data: &[u8]) -> Result<(u64, usize), DecoderError> {
        if data.is_empty() {
            return Err(DecoderError::RlpIsTooShort);
        }

        let first = data[0];
        if first < 0x80 {
            return Ok((first as u64, 1));
        }
        if first == 0x80 {
            return Ok((0, 1));
        }
        if first <= 0xb7 {
            let len = (first - 0x80) as usize;
            if data.len() < 1 + len {
                return Err(DecoderError::RlpIsTooShort);
            }
            if len > 8 {
                return Err(DecoderError::RlpIsTooBig);
            }
            let mut value: u64 = 0;
            for &byte in &data[1..1 + len] {
                value = (value << 8) | byte as u64;
            }
            return Ok((value, 1 + len));
        }

        Err(DecoderError::RlpExpectedToBeData)
    }

    /// Compute list payload length header
    pub fn list_header(payload_len: usize) -> Vec<u8> {
        if payload_len < 56 {
            vec![0xc0 + payload_len as u8]
        } else {
            let len_bytes = encode_length(payload_len);
            let mut header = vec![0xf7 + len_bytes.len() as u8];
            header.extend(len_bytes);
            header
        }
    }

    /// Encode length as minimal big-endian bytes
    fn encode_length(len: usize) -> Vec<u8> {
        let bytes = (len as u64).to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        bytes[start..].to_vec()
    }
}
