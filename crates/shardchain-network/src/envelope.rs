//! The generic message envelope: `[classByte][instructionByte][payload]`.
//!
//! Every message on the wire, regardless of which subsystem it addresses,
//! is framed this way; `Class` picks the subsystem and `instruction` is a
//! per-class discriminant the subsystem itself interprets (consensus phase
//! tags, directory submission kinds, node block-forwarding kinds, ...).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{NetworkError, NetworkResult};

/// The five message classes named by the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Class {
    /// Peer discovery / liveness.
    PeerManager = 0,
    /// DS-committee messages: PoW submissions, DS/sharding/final block gossip.
    Directory = 1,
    /// Per-node messages: block announcements, transaction forwarding.
    Node = 2,
    /// Consensus engine messages (announce/commit/challenge/response/collective).
    Consensus = 3,
    /// Lookup/sync service messages.
    Lookup = 4,
}

impl TryFrom<u8> for Class {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PeerManager),
            1 => Ok(Self::Directory),
            2 => Ok(Self::Node),
            3 => Ok(Self::Consensus),
            4 => Ok(Self::Lookup),
            _ => Err(()),
        }
    }
}

/// A framed wire message: class, instruction, and opaque payload.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Which subsystem this message addresses.
    pub class: Class,
    /// Per-class instruction discriminant.
    pub instruction: u8,
    /// Opaque payload, interpreted by the addressed subsystem.
    pub payload: Bytes,
}

impl Envelope {
    /// Build a new envelope.
    pub fn new(class: Class, instruction: u8, payload: Bytes) -> Self {
        Self { class, instruction, payload }
    }

    /// Encode as `[len: u32 BE][classByte][instructionByte][payload]`, where
    /// `len` covers the class and instruction bytes plus the payload.
    pub fn encode(&self) -> Bytes {
        let body_len = 2 + self.payload.len();
        let mut buf = BytesMut::with_capacity(4 + body_len);
        buf.put_u32(body_len as u32);
        buf.put_u8(self.class as u8);
        buf.put_u8(self.instruction);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode from the framed wire format. Returns an error on a truncated
    /// length prefix, a declared length exceeding the data present, or an
    /// unrecognized class byte.
    pub fn decode(mut data: Bytes) -> NetworkResult<Self> {
        if data.len() < 6 {
            return Err(NetworkError::MalformedEnvelope("shorter than the minimum frame".into()));
        }
        let len = data.get_u32() as usize;
        if len < 2 || data.len() < len {
            return Err(NetworkError::MalformedEnvelope("declared length exceeds data present".into()));
        }
        let class = Class::try_from(data.get_u8())
            .map_err(|_| NetworkError::MalformedEnvelope("unrecognized class byte".into()))?;
        let instruction = data.get_u8();
        let payload = data.split_to(len - 2);
        Ok(Self { class, instruction, payload })
    }
}
