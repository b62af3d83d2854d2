//! The `DirectoryService` coordinator: the single dispatch entry point a
//! node's message-handling loop calls into, plus the per-epoch consensus
//! orchestration that wires `shardchain-consensus`'s `ConsensusLeader`/
//! `ConsensusBackup` to each block kind in spec §4.2's sequence.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use shardchain_consensus::{ConsensusBackup, ConsensusLeader, Validator};
use shardchain_primitives::{KeyPair, Peer, PublicKey, H256, U256};
use shardchain_types::{
    ConsensusInstance, ConsensusKind, DsBlockHeader, DsCommittee, PublicKeyToShardId, ShardId,
    ShardingStructure, Transaction, ViewChangeState,
};
use shardchain_txpool::{NonceSource, PoolConfig, TxPool};

use crate::active_consensus::ConsensusMultiplexer;
use crate::admission::{check_ds_state, check_node_state, Admission};
use crate::difficulty::adjust_difficulty;
use crate::epoch::{post_final_block_action, EpochConfig, PostFinalBlockAction};
use crate::error::{DsError, DsResult};
use crate::message::{Instruction, MicroblockInstruction};
use crate::pow_pool::PowPool;
use crate::state::{DsMode, DsNodeState, MembershipRole, NodeState};

/// How long a buffered (state-inadmissible) instruction is held before it is
/// dropped and logged as stale (spec §4.1's "buffered-and-retried-with-timeout").
const RETRY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Default)]
struct RetryQueue {
    entries: Vec<(Instant, Peer, Instruction)>,
}

impl RetryQueue {
    fn push(&mut self, instruction: Instruction, from: Peer) {
        self.entries.push((Instant::now(), from, instruction));
    }

    /// Evict everything past its timeout and hand back the rest for a retry
    /// attempt; the caller (the node event loop, via
    /// [`DirectoryService::drain_retries`]) re-runs `execute` on each, which
    /// re-buffers anything still inadmissible.
    fn take_all(&mut self) -> Vec<(Peer, Instruction)> {
        let now = Instant::now();
        let entries = std::mem::take(&mut self.entries);
        let mut ready = Vec::with_capacity(entries.len());
        for (queued_at, from, instruction) in entries {
            if now.duration_since(queued_at) > RETRY_TIMEOUT {
                tracing::warn!(action = ?instruction.action(), "buffered instruction timed out, dropping");
                continue;
            }
            ready.push((from, instruction));
        }
        ready
    }
}

/// The Directory Service / Node coordinator: drives a single node's epoch
/// state machine, collects PoW submissions, and wires the four-phase
/// consensus engine through one DS epoch's sequence of block kinds.
pub struct DirectoryService {
    identity: KeyPair,
    #[allow(dead_code)]
    peer: Peer,
    role: MembershipRole,
    node_state: NodeState,
    ds_node_state: DsNodeState,
    ds_mode: DsMode,
    epoch_config: EpochConfig,
    ds_committee: DsCommittee,
    sharding_structure: ShardingStructure,
    shard_index: PublicKeyToShardId,
    my_shard_id: Option<ShardId>,
    ds_block_num: u64,
    current_epoch: u64,
    consensus_id: u32,
    view_change_counter: u32,
    difficulty: u8,
    ds_difficulty: u8,
    pow_pool: PowPool,
    pow2_pool: PowPool,
    tx_pool: TxPool,
    nonces: Box<dyn NonceSource + Send + Sync>,
    multiplexer: ConsensusMultiplexer,
    retry: RetryQueue,
    microblocks: BTreeMap<ShardId, shardchain_types::MicroBlock>,
    ds_blocks: Vec<shardchain_types::DsBlock>,
    tx_blocks: Vec<shardchain_types::TxBlock>,
}

impl DirectoryService {
    /// Build a coordinator bootstrapped into `ds_committee`'s membership.
    pub fn new(
        identity: KeyPair,
        peer: Peer,
        ds_committee: DsCommittee,
        epoch_config: EpochConfig,
        bootstrap_difficulty: u8,
        bootstrap_ds_difficulty: u8,
        nonces: Box<dyn NonceSource + Send + Sync>,
    ) -> Self {
        let (role, ds_mode) = match ds_committee.index_of(&identity.public) {
            Some(0) => (MembershipRole::DsNode, DsMode::Primary),
            Some(_) => (MembershipRole::DsNode, DsMode::Backup),
            None => (MembershipRole::ShardNode, DsMode::Idle),
        };
        Self {
            identity,
            peer,
            role,
            node_state: NodeState::PoWSubmission,
            ds_node_state: DsNodeState::PoWSubmission,
            ds_mode,
            epoch_config,
            ds_committee,
            sharding_structure: Vec::new(),
            shard_index: PublicKeyToShardId::new(),
            my_shard_id: None,
            ds_block_num: 0,
            current_epoch: 0,
            consensus_id: 0,
            view_change_counter: 0,
            difficulty: bootstrap_difficulty,
            ds_difficulty: bootstrap_ds_difficulty,
            pow_pool: PowPool::new(),
            pow2_pool: PowPool::new(),
            tx_pool: TxPool::new(PoolConfig::default()),
            nonces,
            multiplexer: ConsensusMultiplexer::new(),
            retry: RetryQueue::default(),
            microblocks: BTreeMap::new(),
            ds_blocks: Vec::new(),
            tx_blocks: Vec::new(),
        }
    }

    /// This node's current membership role.
    pub fn role(&self) -> MembershipRole {
        self.role
    }

    /// This node's standing relative to the DS committee.
    pub fn ds_mode(&self) -> DsMode {
        self.ds_mode
    }

    /// This node's shard epoch state.
    pub fn node_state(&self) -> NodeState {
        self.node_state
    }

    /// This node's DS-committee epoch state.
    pub fn ds_node_state(&self) -> DsNodeState {
        self.ds_node_state
    }

    /// The shard pool collecting and selecting this node's own transactions.
    pub fn tx_pool(&self) -> &TxPool {
        &self.tx_pool
    }

    /// PoW-1 submission pool for the current DS-membership window.
    pub fn pow_pool_mut(&mut self) -> &mut PowPool {
        &mut self.pow_pool
    }

    /// PoW-2 submission pool for the current shard-membership window.
    pub fn pow2_pool_mut(&mut self) -> &mut PowPool {
        &mut self.pow2_pool
    }

    /// The dispatch entry point: check admissibility under `checkState`,
    /// then either process the instruction, buffer it for retry, or reject
    /// it outright. Returns whether the instruction was processed now.
    pub fn execute(&mut self, instruction: Instruction, from: Peer) -> bool {
        let action = instruction.action();
        let admission = match self.role {
            MembershipRole::DsNode => check_ds_state(action, self.ds_node_state),
            MembershipRole::ShardNode | MembershipRole::LookupNode | MembershipRole::Archival => {
                check_node_state(action, self.node_state)
            }
        };

        match admission {
            Admission::Reject => {
                tracing::warn!(?from, ?action, "instruction rejected by checkState");
                false
            }
            Admission::Buffer => {
                tracing::debug!(?from, ?action, "instruction buffered pending state change");
                self.retry.push(instruction, from);
                false
            }
            Admission::Admissible => match self.dispatch(instruction, from) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(?from, ?action, error = %err, "instruction handling failed");
                    false
                }
            },
        }
    }

    /// Re-attempt every instruction buffered by a prior `Admission::Buffer`
    /// verdict. Callers (the node event loop) run this whenever local state
    /// advances, since that's the only time a buffered instruction can
    /// become admissible.
    pub fn drain_retries(&mut self) -> usize {
        let pending = self.retry.take_all();
        let mut processed = 0;
        for (from, instruction) in pending {
            if self.execute(instruction, from) {
                processed += 1;
            }
        }
        processed
    }

    fn dispatch(&mut self, instruction: Instruction, from: Peer) -> DsResult<()> {
        match instruction {
            Instruction::DsBlock(i) => self.process_ds_block(i, from),
            Instruction::Sharding(i) => self.process_sharding(i, from),
            Instruction::SubmitTransaction(tx) => self.process_submit_transaction(tx, from),
            Instruction::MicroblockConsensus(i) => self.process_microblock_consensus(i, from),
            Instruction::FinalBlock(i) => self.process_final_block(i, from),
            Instruction::ForwardTransaction(batch) => self.process_forward_transaction(batch, from),
            Instruction::CreateTransactionFromLookup(tx) => self.process_create_transaction_from_lookup(tx, from),
            Instruction::TxnPacketFromLookup(txs) => self.process_txn_packet_from_lookup(txs, from),
            Instruction::VcBlock(i) => self.process_vc_block(i, from),
            Instruction::FallbackBlock(i) => self.process_fallback_block(i, from),
        }
    }

    /// `processDsBlock`.
    fn process_ds_block(&mut self, instr: crate::message::DsBlockInstruction, _from: Peer) -> DsResult<()> {
        use crate::message::DsBlockInstruction;
        match instr {
            DsBlockInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            DsBlockInstruction::Finalized(finalized) => {
                let committee_view = self.ds_committee.public_keys();
                if !finalized
                    .block
                    .cosigs
                    .verify(&committee_view, &finalized.block.header.canonical_bytes())?
                {
                    return Err(DsError::InvariantViolation("DS block co-signature failed to verify".into()));
                }

                let winner = (finalized.block.header.winner_pub_key, finalized.winner_peer);
                self.pow_pool.record_connection(winner.0, winner.1);
                let outcome = crate::rotation::rotate(&mut self.ds_committee, winner, &self.identity.public);
                self.ds_mode = outcome.mode;
                self.difficulty = finalized.block.header.difficulty;
                self.ds_difficulty = finalized.block.header.ds_difficulty;
                self.ds_block_num = finalized.block.header.block_num;
                self.ds_blocks.push(finalized.block);

                self.node_state = NodeState::WaitingDsBlock;
                match self.ds_mode {
                    DsMode::Primary | DsMode::Backup => {
                        self.role = MembershipRole::DsNode;
                        self.ds_node_state = DsNodeState::ShardingConsensusPrep;
                    }
                    DsMode::Idle => {
                        self.role = MembershipRole::ShardNode;
                    }
                }
                self.pow_pool = PowPool::new();
                Ok(())
            }
        }
    }

    /// Leader-side: the PoW-1 submission window has closed. Picks the
    /// winner, computes the next difficulty, and begins driving this DS
    /// epoch's DS-block consensus instance.
    pub fn start_ds_block_consensus(&mut self) -> DsResult<DsBlockHeader> {
        let winner = self
            .pow_pool
            .winner()
            .ok_or_else(|| DsError::InvariantViolation("no PoW-1 submissions collected".into()))?;
        let difficulty = if self.ds_block_num < 1 {
            self.difficulty
        } else {
            adjust_difficulty(self.difficulty, self.pow_pool.len() as u32)
        };
        let header = DsBlockHeader {
            difficulty,
            ds_difficulty: self.ds_difficulty,
            prev_hash: self.ds_blocks.last().map(|b| b.header.hash()).unwrap_or(H256::ZERO),
            block_num: self.ds_block_num + 1,
            winner_pub_key: winner.pub_key,
            leader_pub_key: self.identity.public,
            timestamp: U256::zero(),
            software_version: 1,
            nonce: winner.nonce,
        };
        self.begin_leader_round(ConsensusKind::DsBlock, header.hash(), header.canonical_bytes())?;
        self.ds_node_state = DsNodeState::DsBlockConsensus;
        Ok(header)
    }

    /// `processSharding`.
    fn process_sharding(&mut self, instr: crate::message::ShardingInstruction, _from: Peer) -> DsResult<()> {
        use crate::message::ShardingInstruction;
        match instr {
            ShardingInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            ShardingInstruction::Finalized(finalized) => {
                if finalized.view_change_counter != self.view_change_counter {
                    return Err(DsError::InvariantViolation(
                        "sharding structure announced under a stale view".into(),
                    ));
                }
                self.sharding_structure = finalized.structure;
                self.shard_index = PublicKeyToShardId::from_sharding_structure(&self.sharding_structure);
                self.my_shard_id = self.shard_index.shard_of(&self.identity.public);

                match self.my_shard_id {
                    Some(_) => self.node_state = NodeState::MicroblockConsensusPrep,
                    None => {
                        tracing::warn!("sharding structure finalized with no shard assignment for this node");
                        self.node_state = NodeState::Sync;
                    }
                }
                if let DsMode::Primary | DsMode::Backup = self.ds_mode {
                    self.ds_node_state = DsNodeState::MicroblockSubmission;
                    self.microblocks.clear();
                }
                self.pow2_pool = PowPool::new();
                Ok(())
            }
        }
    }

    /// Leader-side: the PoW-2 submission window has closed. Computes the
    /// sharding structure and begins driving this DS epoch's
    /// sharding-consensus instance.
    pub fn start_sharding_consensus(&mut self) -> DsResult<ShardingStructure> {
        let submissions: Vec<crate::sharding::Pow2Submission> = self
            .pow2_pool
            .submissions()
            .map(|s| crate::sharding::Pow2Submission {
                pub_key: s.pub_key,
                nonce: s.nonce,
                peer: self.pow2_pool.connection_of(&s.pub_key).unwrap_or(Peer::new(std::net::Ipv4Addr::UNSPECIFIED, 0)),
            })
            .collect();
        let (structure, _) = crate::sharding::compute_sharding(&submissions, crate::sharding::COMM_SIZE);
        let payload = encode_sharding_announcement(self.view_change_counter, &structure);
        let block_hash = shardchain_crypto::sha256(&payload);
        self.begin_leader_round(ConsensusKind::Sharding, block_hash, payload)?;
        self.ds_node_state = DsNodeState::ShardingConsensus;
        Ok(structure)
    }

    /// `processSubmitTransaction`.
    fn process_submit_transaction(&mut self, tx: Transaction, _from: Peer) -> DsResult<()> {
        self.tx_pool
            .submit(tx, self.nonces.as_ref())
            .map_err(|e| DsError::InvariantViolation(e.to_string()))?;
        Ok(())
    }

    /// `processMicroblockConsensus`.
    fn process_microblock_consensus(&mut self, instr: MicroblockInstruction, _from: Peer) -> DsResult<()> {
        match instr {
            MicroblockInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            MicroblockInstruction::Submission(block) => {
                let shard_id = block.header.shard_id;
                let shard = self
                    .sharding_structure
                    .get(shard_id as usize)
                    .ok_or_else(|| DsError::InvariantViolation("microblock submitted for unknown shard".into()))?;
                let committee: Vec<PublicKey> = shard.iter().map(|(pk, _)| *pk).collect();
                if !block.cosigs.verify(&committee, &block.header.canonical_bytes())? {
                    return Err(DsError::InvariantViolation("microblock co-signature failed to verify".into()));
                }
                self.microblocks.insert(shard_id, block);
                if self.microblocks.len() == self.sharding_structure.len() {
                    self.ds_node_state = DsNodeState::FinalBlockConsensusPrep;
                }
                Ok(())
            }
        }
    }

    /// `processFinalBlock`.
    fn process_final_block(&mut self, instr: crate::message::FinalBlockInstruction, _from: Peer) -> DsResult<()> {
        use crate::message::FinalBlockInstruction;
        match instr {
            FinalBlockInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            FinalBlockInstruction::Finalized(finalized) => {
                let committee_view = self.ds_committee.public_keys();
                if !finalized
                    .block
                    .cosigs
                    .verify(&committee_view, &finalized.block.header.canonical_bytes())?
                {
                    return Err(DsError::InvariantViolation("finalblock co-signature failed to verify".into()));
                }

                self.current_epoch += 1;
                self.tx_pool.finalize_block(finalized.block.header.block_num);
                self.tx_blocks.push(finalized.block);

                match post_final_block_action(&self.epoch_config, self.current_epoch) {
                    PostFinalBlockAction::ReseedPowAndRestartEpoch => {
                        self.current_epoch = 0;
                        self.consensus_id = 0;
                        self.node_state = NodeState::PoWSubmission;
                        self.ds_node_state = DsNodeState::PoWSubmission;
                        self.pow_pool = PowPool::new();
                        self.pow2_pool = PowPool::new();
                    }
                    PostFinalBlockAction::ContinueMicroblockSubmission => {
                        self.consensus_id += 1;
                        self.microblocks.clear();
                        self.node_state = NodeState::MicroblockConsensusPrep;
                        self.ds_node_state = DsNodeState::MicroblockSubmission;
                    }
                }
                Ok(())
            }
        }
    }

    /// `processForwardTransaction`.
    fn process_forward_transaction(
        &mut self,
        batch: crate::message::ForwardTransactionBatch,
        _from: Peer,
    ) -> DsResult<()> {
        for tx in batch.transactions {
            let id = tx.id();
            if self.tx_pool.mark_received(id) {
                if let Err(err) = self.tx_pool.submit(tx, self.nonces.as_ref()) {
                    tracing::debug!(%id, error = %err, "forwarded transaction rejected");
                }
            }
        }
        Ok(())
    }

    /// `processCreateTransactionFromLookup`.
    fn process_create_transaction_from_lookup(&mut self, tx: Transaction, _from: Peer) -> DsResult<()> {
        self.tx_pool
            .submit(tx, self.nonces.as_ref())
            .map_err(|e| DsError::InvariantViolation(e.to_string()))?;
        Ok(())
    }

    /// `processTxnPacketFromLookup`.
    fn process_txn_packet_from_lookup(&mut self, txs: Vec<Transaction>, from: Peer) -> DsResult<()> {
        for tx in txs {
            self.process_create_transaction_from_lookup(tx, from)?;
        }
        Ok(())
    }

    /// `processVcBlock`.
    fn process_vc_block(&mut self, instr: crate::message::VcBlockInstruction, _from: Peer) -> DsResult<()> {
        use crate::message::VcBlockInstruction;
        match instr {
            VcBlockInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            VcBlockInstruction::Finalized(block) => {
                let committee_view = self.ds_committee.public_keys();
                if !block.cosigs.verify(&committee_view, &block.header.canonical_bytes())? {
                    return Err(DsError::InvariantViolation("view-change block co-signature failed to verify".into()));
                }

                // View change demotes the current leader to the tail rather
                // than ejecting anyone or inserting a new member -- the
                // opposite of DS-block rotation, which always replaces the
                // tail with a PoW-1 winner.
                let members: Vec<(PublicKey, Peer)> = self.ds_committee.iter().copied().collect();
                if let Some((head, rest)) = members.split_first() {
                    let mut rotated = rest.to_vec();
                    rotated.push(*head);
                    self.ds_committee = DsCommittee::from_bootstrap(rotated);
                }
                self.view_change_counter += 1;

                self.ds_mode = match self.ds_committee.index_of(&self.identity.public) {
                    Some(0) => DsMode::Primary,
                    Some(_) => DsMode::Backup,
                    None => DsMode::Idle,
                };
                match self.ds_mode {
                    DsMode::Primary | DsMode::Backup => {
                        self.role = MembershipRole::DsNode;
                        self.ds_node_state = match block.header.view_change_state {
                            ViewChangeState::DsBlockConsensusPrep | ViewChangeState::DsBlockConsensus => {
                                DsNodeState::DsBlockConsensusPrep
                            }
                            ViewChangeState::ShardingConsensusPrep | ViewChangeState::ShardingConsensus => {
                                DsNodeState::ShardingConsensusPrep
                            }
                            ViewChangeState::FinalBlockConsensusPrep | ViewChangeState::FinalBlockConsensus => {
                                DsNodeState::FinalBlockConsensusPrep
                            }
                        };
                    }
                    DsMode::Idle => {
                        self.role = MembershipRole::ShardNode;
                        self.node_state = NodeState::WaitingDsBlock;
                    }
                }
                Ok(())
            }
        }
    }

    /// `processFallbackBlock`.
    fn process_fallback_block(&mut self, instr: crate::message::FallbackInstruction, _from: Peer) -> DsResult<()> {
        use crate::message::FallbackInstruction;
        match instr {
            FallbackInstruction::Protocol(msg) => self.multiplexer.deliver(self.consensus_id, msg),
            FallbackInstruction::Finalized(block) => {
                let shard_id = self
                    .my_shard_id
                    .ok_or_else(|| DsError::InvariantViolation("fallback finalized with no shard assignment".into()))?;
                let shard = self
                    .sharding_structure
                    .get(shard_id as usize)
                    .ok_or_else(|| DsError::InvariantViolation("fallback finalized for unknown shard".into()))?;
                let committee: Vec<PublicKey> = shard.iter().map(|(pk, _)| *pk).collect();
                if !block.cosigs.verify(&committee, &block.header.canonical_bytes())? {
                    return Err(DsError::InvariantViolation("fallback block co-signature failed to verify".into()));
                }
                // The shard ran fallback because the DS committee was
                // unreachable; once the new shard leader is installed, wait
                // to see whether the committee has since recovered rather
                // than declaring it gone for good.
                self.node_state = NodeState::WaitingDsBlock;
                Ok(())
            }
        }
    }

    fn begin_leader_round(&mut self, kind: ConsensusKind, block_hash: H256, announcement: Vec<u8>) -> DsResult<()> {
        let my_id = self
            .ds_committee
            .index_of(&self.identity.public)
            .map(|i| i as u16)
            .ok_or_else(|| DsError::InvariantViolation("self is not a DS committee member".into()))?;
        let committee_view: Vec<(PublicKey, Peer)> = self.ds_committee.iter().copied().collect();
        let instance = ConsensusInstance::new(self.consensus_id, block_hash, my_id, 0, committee_view, kind);
        let mut leader = ConsensusLeader::new(instance, self.identity, self.ds_committee.public_keys());
        leader.start(announcement)?;
        self.multiplexer.set_leader(leader);
        Ok(())
    }

    /// Backup-side: begin tracking a consensus instance of `kind` led by the
    /// current DS-committee leader (always committee index 0). `validator`
    /// checks the leader's announcement before this node commits to it --
    /// callers supply the block-kind-specific check (matching difficulty,
    /// matching sharding structure, and so on).
    pub fn begin_backup_round<V: Validator + 'static>(
        &mut self,
        kind: ConsensusKind,
        block_hash: H256,
        validator: V,
    ) -> DsResult<()> {
        let my_id = self
            .ds_committee
            .index_of(&self.identity.public)
            .map(|i| i as u16)
            .ok_or_else(|| DsError::InvariantViolation("self is not a DS committee member".into()))?;
        let committee_view: Vec<(PublicKey, Peer)> = self.ds_committee.iter().copied().collect();
        let instance = ConsensusInstance::new(self.consensus_id, block_hash, my_id, 0, committee_view, kind);
        let backup = ConsensusBackup::new(instance, self.identity, self.ds_committee.public_keys(), validator);
        self.multiplexer.set_backup(backup);
        Ok(())
    }
}

/// Deterministic sharding-structure announcement payload: the consensus
/// engine only needs stable bytes to hash and sign over, not a full codec.
fn encode_sharding_announcement(view_change_counter: u32, structure: &ShardingStructure) -> Vec<u8> {
    use rlp::RlpStream;
    let mut s = RlpStream::new_list(2 + structure.len());
    s.append(&view_change_counter);
    s.append(&(structure.len() as u32));
    for shard in structure {
        let mut shard_stream = RlpStream::new_list(shard.len());
        for (key, _) in shard.iter() {
            shard_stream.append(&key.as_bytes().to_vec());
        }
        s.append(&shard_stream.out().to_vec());
    }
    s.out().to_vec()
}
