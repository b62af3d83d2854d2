//! # bach-consensus
//!
//! TBFT (Tendermint-like BFT) consensus for BachLedger.
//!
//! This crate provides:
//! - TBFT consensus protocol
//! - Block proposal
//! - Voting rounds
//! - Finality guarantees

#![warn(missing_docs)]
#![warn(clippy::all)]

// TODO: Implement TBFT consensus protocol
