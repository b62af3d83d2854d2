//! # shardchain-types
//!
//! The core data model: committees and shards, the four block kinds
//! (`DsBlock`, `TxBlock`, `MicroBlock`, `VcBlock`) and their co-signatures,
//! transactions and the pools that stage them, and the runtime state kept
//! per consensus instance.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod committee;
pub mod consensus_state;
pub mod cosig;
pub mod error;
pub mod transaction;

pub use block::{
    DsBlock, DsBlockHeader, MicroBlock, MicroBlockHeader, TxBlock, TxBlockHeader, VcBlock,
    VcBlockHeader, ViewChangeState,
};
pub use committee::{DsCommittee, PublicKeyToShardId, Shard, ShardId, ShardingStructure};
pub use consensus_state::{ConsensusInstance, ConsensusKind, ConsensusState};
pub use cosig::{threshold, Bitmap, CoSignatures};
pub use error::{TypesError, TypesResult};
pub use transaction::{
    AddrNonceTxnMap, CreatedTransactions, MicroBlockHashSet, ProcessedTransactions, Receipt,
    Transaction, TransactionWithReceipt, UnavailableMicroBlocks,
};
