//! # shardchain-network
//!
//! The wire envelope (`classByte`/`instructionByte`/payload), peer
//! connection bookkeeping, the network service that dispatches framed
//! envelopes as events, and the transaction-sharing overlay that decides
//! who forwards microblock bodies to whom for a DS epoch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod envelope;
pub mod error;
pub mod overlay;
pub mod peer;
pub mod service;

pub use envelope::{Class, Envelope};
pub use error::{NetworkError, NetworkResult};
pub use overlay::{
    compute_ds_receivers, compute_shard_tx_sharing, compute_tx_sharing_assignments, downstream_peers,
    NodeRole, ShardTxSharing, TxSharingAssignments,
};
pub use peer::{PeerConnection, PeerInfo, PeerManager, PeerState};
pub use service::{NetworkConfig, NetworkEvent, NetworkService};
