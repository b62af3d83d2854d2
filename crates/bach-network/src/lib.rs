//! # bach-network
//!
//! P2P networking for BachLedger.
//!
//! This crate provides:
//! - Peer discovery
//! - Message broadcasting
//! - Connection management
//! - Protocol multiplexing

#![warn(missing_docs)]
#![warn(clippy::all)]

// TODO: Implement P2P networking
