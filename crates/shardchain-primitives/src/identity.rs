//! Node identity types: compressed Schnorr public keys, private key material,
//! and network peer addresses.
//!
//! `PublicKey` and `PrivateKey` only carry raw, fixed-length key bytes here;
//! the signing/verification/aggregation operations that act on them live in
//! `shardchain-crypto` to keep curve arithmetic out of the primitives crate.

use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Identity parsing error
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// expected length
        expected: usize,
        /// actual length
        got: usize,
    },
}

/// Compressed secp256k1-family public key (33 bytes: parity byte + x-coordinate).
#[derive(Clone, Copy, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Size in bytes.
    pub const LEN: usize = 33;

    /// All-zero placeholder. Never a valid curve point; used for padding only.
    pub const ZERO: PublicKey = PublicKey([0u8; 33]);

    /// Build from raw compressed bytes without curve validation.
    pub const fn from_bytes(bytes: [u8; 33]) -> Self {
        PublicKey(bytes)
    }

    /// Build from a byte slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, IdentityError> {
        if slice.len() != 33 {
            return Err(IdentityError::InvalidLength {
                expected: 33,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(slice);
        Ok(PublicKey(bytes))
    }

    /// Parse from a hex string (with or without `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| IdentityError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Hex encoding with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    /// Total order used for deterministic committee/shard member indexing.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Raw private scalar (32 bytes). Does not implement `Debug`/`Display` to avoid
/// accidental leakage into logs.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Size in bytes.
    pub const LEN: usize = 32;

    /// Build from raw scalar bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        PrivateKey(bytes)
    }

    /// Build from a byte slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, IdentityError> {
        if slice.len() != 32 {
            return Err(IdentityError::InvalidLength {
                expected: 32,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(PrivateKey(bytes))
    }

    /// Raw scalar bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A keypair: private scalar plus its derived public point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPair {
    /// Private half
    pub private: PrivateKey,
    /// Public half
    pub public: PublicKey,
}

impl KeyPair {
    /// Build a keypair from its two halves without re-deriving the public
    /// point (callers obtain a consistent pair from `shardchain-crypto::generate_keypair`).
    pub fn new(private: PrivateKey, public: PublicKey) -> Self {
        Self { private, public }
    }
}

/// Network address of a peer: IPv4 + port, totally ordered for deterministic
/// iteration over committees and shards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Peer {
    /// IPv4 address
    pub ip: Ipv4Addr,
    /// Listening port
    pub port: u16,
}

impl Peer {
    /// Construct a peer address.
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Construct from a big-endian u32 IPv4 representation (wire format).
    pub fn from_u32_be(ip: u32, port: u16) -> Self {
        Self {
            ip: Ipv4Addr::from(ip),
            port,
        }
    }

    /// IPv4 address as big-endian u32 (wire format).
    pub fn ip_u32_be(&self) -> u32 {
        u32::from(self.ip)
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
