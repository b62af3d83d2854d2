//! Consensus types

use bach_primitives::{Address, H256};

/// Vote type in TBFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteType {
    /// Prevote - first voting round
    Prevote,
    /// Precommit - second voting round
    Precommit,
}

/// A vote in the consensus protocol
#[derive(Debug, Clone)]
pub struct Vote {
    /// Vote type
    pub vote_type: VoteType,
    /// Block height
    pub height: u64,
    /// Consensus round
    pub round: u32,
    /// Block hash being voted on (None for nil vote)
    pub block_hash: Option<H256>,
    /// Voter address
    pub voter: Address,
    /// Signature (r, s, v)
    pub signature: [u8; 65],
}

impl Vote {
    /// Create a new vote
    pub fn new(
        vote_type: VoteType,
        height: u64,
        round: u32,
        block_hash: Option<H256>,
        voter: Address,
    ) -> Self {
        Self {
            vote_type,
            height,
            round,
            block_hash,
            voter,
            signature: [0u8; 65],
        }
    }

    /// Set signature
    pub fn with_signature(mut self, signature: [u8; 65]) -> Self {
        self.signature = signature;
        self
    }

    /// Check if this is a nil vote
    pub fn is_nil(&self) -> bool {
        self.block_hash.is_none()
    }

    /// Get signing message
    pub fn signing_message(&self) -> Vec<u8> {
        let mut msg = Vec::new();
        msg.push(self.vote_type as u8);
        msg.extend_from_slice(&self.height.to_le_bytes());
        msg.extend_from_slice(&self.round.to_le_bytes());
        if let Some(hash) = &self.block_hash {
            msg.extend_from_slice(hash.as_bytes());
        }
        msg
    }
}

/// Block proposal
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Block height
    pub height: u64,
    /// Consensus round
    pub round: u32,
    /// Block hash
    pub block_hash: H256,
    /// Proposer address
    pub proposer: Address,
    /// Proposal timestamp
    pub timestamp: u64,
    /// Signature
    pub signature: [u8; 65],
}

impl Proposal {
    /// Create a new proposal
    pub fn new(height: u64, round: u32, block_hash: H256, proposer: Address, timestamp: u64) -> Self {
        Self {
            height,
            round,
            block_hash,
            proposer,
            timestamp,
            signature: [0u8; 65],
        }
    }

    /// Set signature
    pub fn with_signature(mut self, signature: [u8; 65]) -> Self {
        self.signature = signature;
        self
    }

    /// Get signing message
    pub fn signing_message(&self) -> Vec<u8> {
        let mut msg = Vec::new();
        msg.extend_from_slice(&self.height.to_le_bytes());
        msg.extend_from_slice(&self.round.to_le_bytes());
        msg.extend_from_slice(self.block_hash.as_bytes());
        msg.extend_from_slice(&self.timestamp.to_le_bytes());
        msg
    }
}

/// Validator info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// Validator address
    pub address: Address,
    /// Voting power
    pub voting_power: u64,
}

impl Validator {
    /// Create a new validator
    pub fn new(address: Address, voting_power: u64) -> Self {
        Self {
            address,
            voting_power,
        }
    }
}

/// Validator set
#[derive(Debug, Clone, Default)]
pub struct ValidatorSet {
    /// List of validators
    validators: Vec<Validator>,
    /// Total voting power
    total_power: u64,
}

impl ValidatorSet {
    /// Create an empty validator set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a list of validators
    pub fn from_validators(validators: Vec<Validator>) -> Self {
        let total_power = validators.iter().map(|v| v.voting_power).sum();
        Self {
            validators,
            total_power,
        }
    }

    /// Add a validator
    pub fn add(&mut self, validator: Validator) {
        self.total_power += validator.voting_power;
        self.validators.push(validator);
    }

    /// Get validator by address
    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.validators.iter().find(|v| &v.address == address)
    }

    /// Check if address is a validator
    pub fn contains(&self, address: &Address) -> bool {
        self.validators.iter().any(|v| &v.address == address)
    }

    /// Get total voting power
    pub fn total_power(&self) -> u64 {
        self.total_power
    }

    /// Get number of validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Get all validators
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Get the proposer for a given height and round
    pub fn proposer(&self, height: u64, round: u32) -> Option<&Validator> {
        if self.validators.is_empty() {
            return None;
        }
        // Simple round-robin based on height + round
        let index = ((height + round as u64) as usize) % self.validators.len();
        Some(&self.validators[index])
    }

    /// Calculate if we have 2/3+ voting power
    pub fn has_two_thirds(&self, power: u64) -> bool {
        // 2/3 majority means > 2/3 of total power
        power * 3 > self.total_power * 2
    }

    /// Calculate if we have 1/3+ voting power (for liveness)
    pub fn has_one_third(&self, power: u64) -> bool {
        power * 3 >= self.total_power
    }
}

/// Commit (aggregated precommit votes for a block)
#[derive(Debug, Clone)]
pub struct Commit {
    /// Block height
    pub height: u64,
    /// Round
    pub round: u32,
    /// Block hash
    pub block_hash: H256,
    /// Precommit votes
    pub votes: Vec<Vote>,
}

impl Commit {
    /// Create a new commit
    pub fn new(height: u64, round: u32, block_hash: H256) -> Self {
        Self {
            height,
            round,
            block_hash,
            votes: Vec::new(),
        }
    }

    /// Add a vote
    pub fn add_vote(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    /// Get total voting power in this commit
    pub fn voting_power(&self, validator_set: &ValidatorSet) -> u64 {
        self.votes
            .iter()
            .filter_map(|v| validator_set.get(&v.voter))
            .map(|v| v.voting_power)
            .sum()
    }
}
