//! Peer connection bookkeeping.
//!
//! Peers are identified by their committee/shard [`PublicKey`], not a
//! separate handshake-assigned id: the overlay already indexes everything
//! that way, so reusing it here avoids a second identity space.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use shardchain_primitives::{Peer as PeerAddr, PublicKey};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::envelope::Envelope;
use crate::error::{NetworkError, NetworkResult};

/// Connection lifecycle state for a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Handshake in progress.
    Connecting,
    /// Handshake complete, ready for traffic.
    Connected,
    /// Disconnected and evicted.
    Disconnected,
}

/// Bookkeeping for one known peer.
#[derive(Debug, Clone)]
pub struct PeerInfo {
    /// Peer identity
    pub public_key: PublicKey,
    /// Network address
    pub addr: PeerAddr,
    /// Connection lifecycle state
    pub state: PeerState,
    /// Time of last received message, for liveness tracking
    pub last_message_at: Instant,
    /// Whether this connection was accepted (true) or dialed by us (false)
    pub inbound: bool,
}

impl PeerInfo {
    /// Build bookkeeping for a freshly accepted/dialed peer.
    pub fn new(public_key: PublicKey, addr: PeerAddr, inbound: bool) -> Self {
        Self {
            public_key,
            addr,
            state: PeerState::Connecting,
            last_message_at: Instant::now(),
            inbound,
        }
    }

    /// Record that a message was just received from this peer.
    pub fn touch(&mut self) {
        self.last_message_at = Instant::now();
    }
}

/// A handle for sending envelopes to one connected peer.
pub struct PeerConnection {
    /// Peer identity
    pub public_key: PublicKey,
    /// Outgoing message sender
    sender: mpsc::Sender<Envelope>,
}

impl PeerConnection {
    /// Queue an envelope for delivery to this peer.
    pub async fn send(&self, envelope: Envelope) -> NetworkResult<()> {
        self.sender.send(envelope).await.map_err(|_| NetworkError::ChannelClosed)
    }
}

/// Read one framed envelope from a connected stream.
pub async fn read_envelope(stream: &mut TcpStream) -> NetworkResult<Envelope> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len < 2 || len > 16 * 1024 * 1024 {
        return Err(NetworkError::MalformedEnvelope("length prefix out of bounds".into()));
    }
    let mut buf = bytes::BytesMut::with_capacity(4 + len);
    buf.extend_from_slice(&len_buf);
    buf.resize(4 + len, 0);
    stream.read_exact(&mut buf[4..]).await?;
    Envelope::decode(buf.freeze())
}

/// Write one framed envelope to a connected stream.
pub async fn write_envelope(stream: &mut TcpStream, envelope: &Envelope) -> NetworkResult<()> {
    let data = envelope.encode();
    stream.write_all(&data).await?;
    stream.flush().await?;
    Ok(())
}

/// Tracks every connected peer: who they are, their bookkeeping, and the
/// channel used to send them envelopes.
pub struct PeerManager {
    peers: RwLock<HashMap<PublicKey, PeerInfo>>,
    connections: RwLock<HashMap<PublicKey, Arc<PeerConnection>>>,
    max_peers: usize,
}

impl PeerManager {
    /// Build an empty manager with a connection cap.
    pub fn new(max_peers: usize) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            max_peers,
        }
    }

    /// Register a freshly connected peer and its send handle.
    pub fn add_peer(&self, info: PeerInfo, sender: mpsc::Sender<Envelope>) -> NetworkResult<()> {
        let mut peers = self.peers.write();
        let mut connections = self.connections.write();

        if peers.len() >= self.max_peers {
            return Err(NetworkError::ConnectionFailed("max peers reached".into()));
        }
        if peers.contains_key(&info.public_key) {
            return Err(NetworkError::AlreadyConnected(info.public_key.to_hex()));
        }

        let key = info.public_key;
        let conn = Arc::new(PeerConnection { public_key: key, sender });
        peers.insert(key, info);
        connections.insert(key, conn);
        Ok(())
    }

    /// Evict a peer.
    pub fn remove_peer(&self, public_key: &PublicKey) {
        self.peers.write().remove(public_key);
        self.connections.write().remove(public_key);
    }

    /// Look up bookkeeping for a peer.
    pub fn get_peer(&self, public_key: &PublicKey) -> Option<PeerInfo> {
        self.peers.read().get(public_key).cloned()
    }

    /// Look up the send handle for a peer.
    pub fn get_connection(&self, public_key: &PublicKey) -> Option<Arc<PeerConnection>> {
        self.connections.read().get(public_key).cloned()
    }

    /// Record that a message just arrived from a peer.
    pub fn touch_peer(&self, public_key: &PublicKey) {
        if let Some(peer) = self.peers.write().get_mut(public_key) {
            peer.touch();
        }
    }

    /// All connected peer identities.
    pub fn peer_keys(&self) -> Vec<PublicKey> {
        self.peers.read().keys().copied().collect()
    }

    /// Current peer count.
    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether another peer can be accepted under the configured cap.
    pub fn can_accept(&self) -> bool {
        self.peers.read().len() < self.max_peers
    }
}
