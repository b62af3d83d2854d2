//! The network service: listens, dials, and dispatches framed envelopes.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use shardchain_primitives::PublicKey;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::envelope::{Class, Envelope};
use crate::error::{NetworkError, NetworkResult};
use crate::peer::{read_envelope, write_envelope, PeerInfo, PeerManager, PeerState};

/// The handshake instruction under [`Class::PeerManager`]: a bare public key.
const HANDSHAKE_INSTRUCTION: u8 = 0;

/// Network service configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Local listen address
    pub listen_addr: SocketAddr,
    /// Peers dialed on startup
    pub bootstrap_peers: Vec<SocketAddr>,
    /// Maximum simultaneous peers
    pub max_peers: usize,
    /// This node's public key, sent as the handshake payload
    pub public_key: PublicKey,
}

impl NetworkConfig {
    /// Build a config for `public_key` listening on `listen_addr`.
    pub fn new(listen_addr: SocketAddr, public_key: PublicKey) -> Self {
        Self { listen_addr, bootstrap_peers: Vec::new(), max_peers: 50, public_key }
    }
}

/// An event surfaced to the rest of the node.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A peer completed its handshake.
    PeerConnected(PublicKey),
    /// A peer's connection was torn down.
    PeerDisconnected(PublicKey),
    /// An application envelope arrived from a peer.
    Envelope {
        /// Sender identity
        from: PublicKey,
        /// The envelope itself
        envelope: Envelope,
    },
}

/// Owns peer connections and dispatches inbound envelopes as [`NetworkEvent`]s.
pub struct NetworkService {
    config: NetworkConfig,
    peers: Arc<PeerManager>,
    event_tx: mpsc::Sender<NetworkEvent>,
    event_rx: Option<mpsc::Receiver<NetworkEvent>>,
    running: Arc<RwLock<bool>>,
}

impl NetworkService {
    /// Build a new, not-yet-started service.
    pub fn new(config: NetworkConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1024);
        Self {
            peers: Arc::new(PeerManager::new(config.max_peers)),
            config,
            event_tx,
            event_rx: Some(event_rx),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Take ownership of the event stream. Callable once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<NetworkEvent>> {
        self.event_rx.take()
    }

    /// Whether `start` has been called and `stop` has not.
    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Current connected-peer count.
    pub fn peer_count(&self) -> usize {
        self.peers.peer_count()
    }

    /// This node's own public key.
    pub fn public_key(&self) -> PublicKey {
        self.config.public_key
    }

    /// Broadcast an envelope to every connected peer, best-effort.
    pub async fn broadcast(&self, envelope: Envelope) {
        for key in self.peers.peer_keys() {
            if let Some(conn) = self.peers.get_connection(&key) {
                if let Err(e) = conn.send(envelope.clone()).await {
                    warn!("failed to send to peer {}: {}", key, e);
                }
            }
        }
    }

    /// Send an envelope to one specific peer.
    pub async fn send_to(&self, public_key: &PublicKey, envelope: Envelope) -> NetworkResult<()> {
        let conn = self
            .peers
            .get_connection(public_key)
            .ok_or_else(|| NetworkError::PeerNotFound(public_key.to_hex()))?;
        conn.send(envelope).await
    }

    /// Dial a peer and complete the handshake.
    pub async fn connect(&self, addr: SocketAddr) -> NetworkResult<PublicKey> {
        if !self.peers.can_accept() {
            return Err(NetworkError::ConnectionFailed("max peers reached".into()));
        }
        info!("connecting to {}", addr);
        let stream = TcpStream::connect(addr).await?;
        self.handle_connection(stream, addr, false).await
    }

    /// Start listening and dial configured bootstrap peers.
    pub async fn start(&self) -> NetworkResult<()> {
        if *self.running.read() {
            return Err(NetworkError::AlreadyRunning);
        }
        *self.running.write() = true;

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        info!("listening on {}", self.config.listen_addr);

        for addr in self.config.bootstrap_peers.clone() {
            let service = self.clone_handle();
            tokio::spawn(async move {
                if let Err(e) = service.connect(addr).await {
                    warn!("failed to connect to bootstrap peer {}: {}", addr, e);
                }
            });
        }

        let running = self.running.clone();
        let service = self.clone_handle();
        tokio::spawn(async move {
            while *running.read() {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("incoming connection from {}", addr);
                        let service = service.clone_handle();
                        tokio::spawn(async move {
                            if let Err(e) = service.handle_connection(stream, addr, true).await {
                                warn!("connection error from {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("accept error: {}", e),
                }
            }
        });

        Ok(())
    }

    /// Stop accepting new traffic. Existing connections drain naturally.
    pub fn stop(&self) {
        *self.running.write() = false;
    }

    async fn handle_connection(
        &self,
        mut stream: TcpStream,
        addr: SocketAddr,
        inbound: bool,
    ) -> NetworkResult<PublicKey> {
        let our_handshake =
            Envelope::new(Class::PeerManager, HANDSHAKE_INSTRUCTION, Bytes::copy_from_slice(self.config.public_key.as_bytes()));
        write_envelope(&mut stream, &our_handshake).await?;

        let response = read_envelope(&mut stream).await?;
        if response.class != Class::PeerManager || response.instruction != HANDSHAKE_INSTRUCTION {
            return Err(NetworkError::MalformedEnvelope("expected handshake".into()));
        }
        let their_key = PublicKey::from_slice(&response.payload)
            .map_err(|e| NetworkError::MalformedEnvelope(e.to_string()))?;

        let (tx, mut rx) = mpsc::channel::<Envelope>(256);
        let mut info = PeerInfo::new(their_key, shardchain_primitives::Peer::from_u32_be(0, addr.port()), inbound);
        info.state = PeerState::Connected;
        self.peers.add_peer(info, tx)?;

        let _ = self.event_tx.send(NetworkEvent::PeerConnected(their_key)).await;
        info!("connected to peer {} at {}", their_key, addr);

        let (read_half, mut write_half) = stream.into_split();
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let data = envelope.encode();
                if tokio::io::AsyncWriteExt::write_all(&mut write_half, &data).await.is_err() {
                    break;
                }
            }
        });

        let peers = self.peers.clone();
        let event_tx = self.event_tx.clone();
        let running = self.running.clone();
        tokio::spawn(async move {
            let mut stream = read_half;
            while *running.read() {
                let envelope = match read_envelope_half(&mut stream).await {
                    Ok(e) => e,
                    Err(_) => break,
                };
                peers.touch_peer(&their_key);
                let _ = event_tx.send(NetworkEvent::Envelope { from: their_key, envelope }).await;
            }
            peers.remove_peer(&their_key);
            let _ = event_tx.send(NetworkEvent::PeerDisconnected(their_key)).await;
            debug!("peer {} disconnected", their_key);
        });

        Ok(their_key)
    }

    fn clone_handle(&self) -> Self {
        Self {
            config: self.config.clone(),
            peers: self.peers.clone(),
            event_tx: self.event_tx.clone(),
            event_rx: None,
            running: self.running.clone(),
        }
    }
}

/// Reads one envelope off the read half of a split stream.
async fn read_envelope_half(
    stream: &mut tokio::net::tcp::OwnedReadHalf,
) -> NetworkResult<Envelope> {
    use tokio::io::AsyncReadExt;
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU16, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn key(byte: u8) -> PublicKey {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[32] = byte;
        PublicKey::from_bytes(bytes)
    }

    fn base_port() -> u16 {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        40000 + ((secs % 20000) as u16)
    }

    static PORT_COUNTER: AtomicU16 = AtomicU16::new(0);

    fn next_port() -> u16 {
        base_port() + PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    fn test_config(port: u16, id_byte: u8) -> NetworkConfig {
        NetworkConfig::new(format!("127.0.0.1:{port}").parse().unwrap(), key(id_byte))
    }

    #[test]
    fn service_starts_idle() {
        let mut service = NetworkService::new(test_config(30000, 1));
        assert!(!service.is_running());
        assert_eq!(service.peer_count(), 0);
        assert!(service.take_events().is_some());
    }

    #[tokio::test]
    async fn start_stop_toggles_running() {
        let service = NetworkService::new(test_config(next_port(), 2));
        service.start().await.unwrap();
        assert!(service.is_running());
        service.stop();
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let service = NetworkService::new(test_config(next_port(), 3));
        service.start().await.unwrap();
        let result = service.start().await;
        assert!(matches!(result, Err(NetworkError::AlreadyRunning)));
        service.stop();
    }

    #[tokio::test]
    async fn two_services_complete_handshake_and_see_each_other() {
        let port1 = next_port();
        let port2 = next_port();
        let config1 = test_config(port1, 10);
        let config2 = test_config(port2, 20);

        let mut service1 = NetworkService::new(config1);
        let mut service2 = NetworkService::new(config2.clone());
        let mut events1 = service1.take_events().unwrap();
        let mut events2 = service2.take_events().unwrap();

        service1.start().await.unwrap();
        service2.start().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let _peer_key = service1.connect(config2.listen_addr).await.unwrap();

        let event1 = tokio::time::timeout(std::time::Duration::from_secs(1), events1.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event1, NetworkEvent::PeerConnected(k) if k == key(20)));

        let event2 = tokio::time::timeout(std::time::Duration::from_secs(1), events2.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event2, NetworkEvent::PeerConnected(k) if k == key(10)));

        assert_eq!(service1.peer_count(), 1);
        assert_eq!(service2.peer_count(), 1);

        service1.stop();
        service2.stop();
    }
}
