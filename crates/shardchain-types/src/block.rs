//! Block headers and bodies: `DsBlock`, `TxBlock` (finalblock), `MicroBlock`,
//! and `VcBlock` (view-change block).
//!
//! Each header type exposes `canonical_bytes()` (the exact RLP encoding the
//! hash and the co-signature payload are taken over) and `hash()`
//! (`SHA256(canonical_bytes())`).

use rlp::RlpStream;
use shardchain_crypto::sha256;
use shardchain_primitives::{Peer, PublicKey, H256, U256};

use crate::committee::ShardId;
use crate::cosig::CoSignatures;

/// Header of a `DsBlock`. Sequence number increases by 1 per DS epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsBlockHeader {
    /// Shard-membership PoW difficulty (PoW-2)
    pub difficulty: u8,
    /// DS-membership PoW difficulty (PoW-1)
    pub ds_difficulty: u8,
    /// Hash of the previous DS block header
    pub prev_hash: H256,
    /// DS epoch number
    pub block_num: u64,
    /// PoW-1 winner's public key (the new committee head)
    pub winner_pub_key: PublicKey,
    /// Public key of the leader that proposed this block
    pub leader_pub_key: PublicKey,
    /// Block timestamp, microseconds since epoch
    pub timestamp: U256,
    /// Software version of the proposing node
    pub software_version: u32,
    /// PoW-1 winning nonce
    pub nonce: u64,
}

impl DsBlockHeader {
    /// The exact byte sequence the header hash and co-signature payload are
    /// computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        s.append(&self.difficulty);
        s.append(&self.ds_difficulty);
        s.append(&self.prev_hash);
        s.append(&self.block_num);
        s.append(&self.winner_pub_key.as_bytes().to_vec());
        s.append(&self.leader_pub_key.as_bytes().to_vec());
        s.append(&self.timestamp.low_u64());
        s.append(&self.software_version);
        s.append(&self.nonce);
        s.out().to_vec()
    }

    /// Canonical header hash.
    pub fn hash(&self) -> H256 {
        sha256(&self.canonical_bytes())
    }
}

/// A DS block: header plus the committee co-signature finalizing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsBlock {
    /// Header
    pub header: DsBlockHeader,
    /// Committee co-signature over `header.canonical_bytes()`
    pub cosigs: CoSignatures,
}

/// Header of a `TxBlock` (finalblock).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxBlockHeader {
    /// Block-kind discriminant, kept for wire-format parity with `MicroBlockHeader`
    pub block_type: u8,
    /// Header format version
    pub version: u32,
    /// Epoch gas limit
    pub gas_limit: u64,
    /// Epoch gas used
    pub gas_used: u64,
    /// Hash of the previous `TxBlock` header
    pub prev_hash: H256,
    /// Tx-epoch number
    pub block_num: u64,
    /// Block timestamp, microseconds since epoch
    pub timestamp: U256,
    /// Merkle root of `(microBlockHashes.txRoots)`
    pub micro_block_txn_root: H256,
    /// State trie root; only non-zero on a vacuous epoch
    pub state_root: H256,
    /// Merkle root of `(microBlockHashes.stateDeltaHashes)`
    pub micro_block_delta_root: H256,
    /// Total transactions across all microblocks in this epoch
    pub num_txs: u64,
    /// Number of microblocks referenced
    pub num_micro_blocks: u32,
    /// Public key of the DS leader that proposed this finalblock
    pub miner_pub_key: PublicKey,
    /// DS epoch this tx-epoch belongs to
    pub ds_block_num: u64,
    /// Header of the DS block for `ds_block_num`
    pub ds_block_header: DsBlockHeader,
}

impl TxBlockHeader {
    /// The exact byte sequence the header hash and co-signature payload are
    /// computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(14);
        s.append(&self.block_type);
        s.append(&self.version);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.prev_hash);
        s.append(&self.block_num);
        s.append(&self.timestamp.low_u64());
        s.append(&self.micro_block_txn_root);
        s.append(&self.state_root);
        s.append(&self.micro_block_delta_root);
        s.append(&self.num_txs);
        s.append(&self.num_micro_blocks);
        s.append(&self.miner_pub_key.as_bytes().to_vec());
        s.append(&self.ds_block_num);
        s.out().to_vec()
    }

    /// Canonical header hash.
    pub fn hash(&self) -> H256 {
        sha256(&self.canonical_bytes())
    }
}

/// A finalblock: header, per-microblock metadata, and the committee
/// co-signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxBlock {
    /// Header
    pub header: TxBlockHeader,
    /// `true` at position `i` iff the i-th referenced microblock had `numTxs == 0`
    pub micro_block_empty_bits: Vec<bool>,
    /// Microblock header hashes, in shard-id order
    pub micro_block_hashes: Vec<H256>,
    /// Shard id each entry in `micro_block_hashes` came from
    pub shard_ids: Vec<ShardId>,
    /// Committee co-signature over `header.canonical_bytes()`
    pub cosigs: CoSignatures,
}

/// Header of a `MicroBlock`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicroBlockHeader {
    /// Block-kind discriminant
    pub block_type: u8,
    /// Header format version
    pub version: u32,
    /// Originating shard
    pub shard_id: ShardId,
    /// Epoch gas limit for this shard
    pub gas_limit: u64,
    /// Gas used by this microblock's transactions
    pub gas_used: u64,
    /// Hash of the previous microblock header from the same shard
    pub prev_hash: H256,
    /// Tx-epoch number
    pub block_num: u64,
    /// Block timestamp, microseconds since epoch
    pub timestamp: U256,
    /// Merkle root of this microblock's transaction hashes
    pub tx_root: H256,
    /// Number of transactions in this microblock
    pub num_txs: u64,
    /// Public key of the shard leader that proposed this microblock
    pub miner_pub_key: PublicKey,
    /// DS epoch this microblock belongs to
    pub ds_block_num: u64,
    /// Header of the DS block for `ds_block_num`
    pub ds_block_header: DsBlockHeader,
    /// Hash of the state delta this microblock's execution produced
    pub state_delta_hash: H256,
    /// Merkle root of this microblock's transaction receipts
    pub tx_receipt_hash: H256,
}

impl MicroBlockHeader {
    /// The exact byte sequence the header hash and co-signature payload are
    /// computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(14);
        s.append(&self.block_type);
        s.append(&self.version);
        s.append(&self.shard_id);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.prev_hash);
        s.append(&self.block_num);
        s.append(&self.timestamp.low_u64());
        s.append(&self.tx_root);
        s.append(&self.num_txs);
        s.append(&self.miner_pub_key.as_bytes().to_vec());
        s.append(&self.ds_block_num);
        s.append(&self.state_delta_hash);
        s.append(&self.tx_receipt_hash);
        s.out().to_vec()
    }

    /// Canonical header hash.
    pub fn hash(&self) -> H256 {
        sha256(&self.canonical_bytes())
    }
}

/// A microblock: header, ordered transaction-hash list, and the shard
/// committee co-signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicroBlock {
    /// Header
    pub header: MicroBlockHeader,
    /// Transaction hashes, in inclusion order
    pub tran_hashes: Vec<H256>,
    /// Shard committee co-signature over `header.canonical_bytes()`
    pub cosigs: CoSignatures,
}

/// The DS-committee node states a view change may legitimately interrupt.
/// `currentDsState` in a view-change payload must be one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ViewChangeState {
    /// Interrupted while preparing DS-block consensus
    DsBlockConsensusPrep = 0,
    /// Interrupted mid DS-block consensus
    DsBlockConsensus = 1,
    /// Interrupted while preparing sharding consensus
    ShardingConsensusPrep = 2,
    /// Interrupted mid sharding consensus
    ShardingConsensus = 3,
    /// Interrupted while preparing finalblock consensus
    FinalBlockConsensusPrep = 4,
    /// Interrupted mid finalblock consensus
    FinalBlockConsensus = 5,
}

/// Header of a `VcBlock` (view-change block).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcBlockHeader {
    /// `(currentLeaderIndex + 1) mod committeeSize`
    pub candidate_leader_index: u32,
    /// Candidate leader's network address
    pub candidate_leader_peer: Peer,
    /// Candidate leader's public key
    pub candidate_leader_pub_key: PublicKey,
    /// The consensus-pending state the view change interrupted
    pub view_change_state: ViewChangeState,
    /// Epoch number the view change occurred in
    pub view_change_epoch_num: u64,
}

impl VcBlockHeader {
    /// The exact byte sequence the header hash and co-signature payload are
    /// computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(6);
        s.append(&self.candidate_leader_index);
        s.append(&self.candidate_leader_peer.ip_u32_be());
        s.append(&self.candidate_leader_peer.port);
        s.append(&self.candidate_leader_pub_key.as_bytes().to_vec());
        s.append(&(self.view_change_state as u8));
        s.append(&self.view_change_epoch_num);
        s.out().to_vec()
    }

    /// Canonical header hash.
    pub fn hash(&self) -> H256 {
        sha256(&self.canonical_bytes())
    }
}

/// A view-change block: header plus the committee co-signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VcBlock {
    /// Header
    pub header: VcBlockHeader,
    /// Committee co-signature over `header.canonical_bytes()`
    pub cosigs: CoSignatures,
}
