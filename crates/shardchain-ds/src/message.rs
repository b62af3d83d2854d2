//! Dispatch-level instructions `DirectoryService::execute` accepts (spec
//! §4.1's ten `process*` handlers).
//!
//! Decoding a wire `Envelope` into one of these belongs to the network
//! layer; these types represent an already-framed instruction ready for
//! state-machine dispatch. Each block-kind instruction carries either a raw
//! consensus protocol message (this node is a committee member driving that
//! kind's `ConsensusLeader`/`ConsensusBackup`) or the already-finalized block
//! (this node is a passive recipient of the committee's result), since both
//! arrive over the same instruction in the original protocol.

use rlp::RlpStream;
use shardchain_consensus::ConsensusMessage;
use shardchain_crypto::sha256;
use shardchain_primitives::{Peer, PublicKey, H256};
use shardchain_types::{
    CoSignatures, DsBlock, MicroBlock, ShardId, ShardingStructure, Transaction, TxBlock, VcBlock,
};

use crate::admission::NodeAction;

/// A fallback block: elects a new shard leader the same way a DS view
/// change elects a new DS leader, but runs when the shard cannot reach the
/// DS committee at all rather than when a sitting DS leader stalls. Has no
/// counterpart in `shardchain-types` since the DS-committee-facing block
/// kinds don't cover a shard-only recovery path; modeled here, shaped like
/// `VcBlockHeader`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackBlockHeader {
    /// Shard member taking over as leader
    pub candidate_leader_index: u32,
    /// Candidate leader's network address
    pub candidate_leader_peer: Peer,
    /// Candidate leader's public key
    pub candidate_leader_pub_key: PublicKey,
    /// Tx-epoch number the fallback occurred in
    pub fallback_epoch_num: u64,
}

impl FallbackBlockHeader {
    /// The exact byte sequence the header hash and co-signature payload are
    /// computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(5);
        s.append(&self.candidate_leader_index);
        s.append(&self.candidate_leader_peer.ip_u32_be());
        s.append(&self.candidate_leader_peer.port);
        s.append(&self.candidate_leader_pub_key.as_bytes().to_vec());
        s.append(&self.fallback_epoch_num);
        s.out().to_vec()
    }

    /// Canonical header hash.
    pub fn hash(&self) -> H256 {
        sha256(&self.canonical_bytes())
    }
}

/// A fallback block: header plus the shard committee co-signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackBlock {
    /// Header
    pub header: FallbackBlockHeader,
    /// Shard committee co-signature over `header.canonical_bytes()`
    pub cosigs: CoSignatures,
}

/// A finalized DS block plus the PoW-1 winner's address, as carried by the
/// `Node/DsBlock` instruction (spec §6).
#[derive(Clone, Debug)]
pub struct DsBlockFinalized {
    /// The finalized block
    pub block: DsBlock,
    /// Network address of the block's PoW-1 winner
    pub winner_peer: Peer,
}

/// Either a DS-block consensus protocol message (this node sits on the DS
/// committee) or the finalized block broadcast to shard nodes.
#[derive(Clone, Debug)]
pub enum DsBlockInstruction {
    /// Consensus protocol traffic for the currently-running DS-block instance
    Protocol(ConsensusMessage),
    /// The already-finalized block
    Finalized(DsBlockFinalized),
}

/// A finalized sharding structure plus the view-change counter active when
/// it was computed, as carried by `Node/Sharding`.
#[derive(Clone, Debug)]
pub struct ShardingFinalized {
    /// Current view-change counter, echoed so stale sharding announcements
    /// from a superseded leader are rejected
    pub view_change_counter: u32,
    /// The computed sharding structure
    pub structure: ShardingStructure,
}

/// Either a sharding-consensus protocol message or the finalized structure.
#[derive(Clone, Debug)]
pub enum ShardingInstruction {
    /// Consensus protocol traffic for the currently-running sharding instance
    Protocol(ConsensusMessage),
    /// The already-finalized sharding structure
    Finalized(ShardingFinalized),
}

/// Either a microblock-consensus protocol message (this node is a shard
/// committee member) or a shard's submitted microblock entering the DS
/// committee's passive submission window (spec §4.2 point 3).
#[derive(Clone, Debug)]
pub enum MicroblockInstruction {
    /// Consensus protocol traffic for the currently-running microblock instance
    Protocol(ConsensusMessage),
    /// A microblock submitted by its shard for DS-side collection
    Submission(MicroBlock),
}

/// A finalized finalblock plus the metadata a receiving shard needs to
/// locate its own microblock within it, as carried by `Node/FinalBlock`.
#[derive(Clone, Debug)]
pub struct FinalBlockFinalized {
    /// DS epoch this finalblock belongs to
    pub ds_block_num: u64,
    /// Consensus id the finalblock instance ran under
    pub consensus_id: u32,
    /// This node's shard, for locating its microblock within the finalblock
    pub shard_id: ShardId,
    /// The finalized block
    pub block: TxBlock,
}

/// Either a finalblock-consensus protocol message or the finalized block.
#[derive(Clone, Debug)]
pub enum FinalBlockInstruction {
    /// Consensus protocol traffic for the currently-running finalblock instance
    Protocol(ConsensusMessage),
    /// The already-finalized block
    Finalized(FinalBlockFinalized),
}

/// A transaction-body batch forwarded from a shard sender, as carried by
/// `Node/ForwardTransaction`.
#[derive(Clone, Debug)]
pub struct ForwardTransactionBatch {
    /// Tx-epoch number the batch was forwarded for
    pub block_num: u64,
    /// The microblock's tx root the batch is meant to reconstitute
    pub micro_block_tx_root: H256,
    /// The forwarded transaction bodies
    pub transactions: Vec<Transaction>,
}

/// Either a view-change consensus protocol message or the finalized
/// view-change block broadcast once it commits.
#[derive(Clone, Debug)]
pub enum VcBlockInstruction {
    /// Consensus protocol traffic for the currently-running view-change instance
    Protocol(ConsensusMessage),
    /// The already-finalized view-change block
    Finalized(VcBlock),
}

/// Either a fallback consensus protocol message or the finalized fallback
/// block.
#[derive(Clone, Debug)]
pub enum FallbackInstruction {
    /// Consensus protocol traffic for the currently-running fallback instance
    Protocol(ConsensusMessage),
    /// The already-finalized fallback block
    Finalized(FallbackBlock),
}

/// One of the ten instructions `DirectoryService::execute` dispatches to.
#[derive(Clone, Debug)]
pub enum Instruction {
    /// `processDsBlock`
    DsBlock(DsBlockInstruction),
    /// `processSharding`
    Sharding(ShardingInstruction),
    /// `processSubmitTransaction`
    SubmitTransaction(Transaction),
    /// `processMicroblockConsensus`
    MicroblockConsensus(MicroblockInstruction),
    /// `processFinalBlock`
    FinalBlock(FinalBlockInstruction),
    /// `processForwardTransaction`
    ForwardTransaction(ForwardTransactionBatch),
    /// `processCreateTransactionFromLookup`
    CreateTransactionFromLookup(Transaction),
    /// `processTxnPacketFromLookup`
    TxnPacketFromLookup(Vec<Transaction>),
    /// `processVcBlock`
    VcBlock(VcBlockInstruction),
    /// `processFallbackBlock`
    FallbackBlock(FallbackInstruction),
}

impl Instruction {
    /// The `NodeAction`/`DsAction` this instruction is checked against by
    /// `checkState` before dispatch.
    pub fn action(&self) -> NodeAction {
        match self {
            Instruction::DsBlock(_) => NodeAction::DsBlock,
            Instruction::Sharding(_) => NodeAction::Sharding,
            Instruction::SubmitTransaction(_) => NodeAction::SubmitTransaction,
            Instruction::MicroblockConsensus(_) => NodeAction::MicroblockConsensus,
            Instruction::FinalBlock(_) => NodeAction::FinalBlock,
            Instruction::ForwardTransaction(_) => NodeAction::ForwardTransaction,
            Instruction::CreateTransactionFromLookup(_) => NodeAction::CreateTransactionFromLookup,
            Instruction::TxnPacketFromLookup(_) => NodeAction::TxnPacketFromLookup,
            Instruction::VcBlock(_) => NodeAction::VcBlock,
            Instruction::FallbackBlock(_) => NodeAction::FallbackBlock,
        }
    }
}
