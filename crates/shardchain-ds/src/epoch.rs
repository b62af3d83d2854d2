//! Post-finalblock epoch bookkeeping: vacuous-epoch detection and the
//! 4-action sequence spec §4.2 runs once a finalblock completes.

/// Configuration governing where a DS epoch's tx-epochs fall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochConfig {
    /// Tx-epochs per DS epoch, after which PoW reseeds
    pub num_final_block_per_pow: u64,
    /// Trailing tx-epochs of a DS epoch during which the state root commits
    pub num_vacuous_epochs: u64,
}

impl EpochConfig {
    /// Whether `current_epoch` (1-based count within the DS epoch) falls in
    /// the trailing vacuous window.
    pub fn is_vacuous_epoch(&self, current_epoch: u64) -> bool {
        current_epoch > self.num_final_block_per_pow.saturating_sub(self.num_vacuous_epochs)
    }

    /// Whether `current_epoch` is the last tx-epoch of its DS epoch, at
    /// which point PoW reseeds for the next DS block.
    pub fn is_end_of_ds_epoch(&self, current_epoch: u64) -> bool {
        current_epoch % self.num_final_block_per_pow == 0
    }
}

/// The action the DS coordinator takes immediately after a finalblock
/// commits, per spec §4.2's post-finalblock sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostFinalBlockAction {
    /// End of DS epoch: reseed PoW for the next DS block number, reset
    /// `consensusId` to 0, re-enter `PoWSubmission`.
    ReseedPowAndRestartEpoch,
    /// Mid DS epoch: increment `consensusId`, reset the microblock pool,
    /// re-enter `MicroblockSubmission`.
    ContinueMicroblockSubmission,
}

/// Decide the post-finalblock action for `current_epoch` under `config`.
pub fn post_final_block_action(config: &EpochConfig, current_epoch: u64) -> PostFinalBlockAction {
    if config.is_end_of_ds_epoch(current_epoch) {
        PostFinalBlockAction::ReseedPowAndRestartEpoch
    } else {
        PostFinalBlockAction::ContinueMicroblockSubmission
    }
}
