//! The consensus error taxonomy: which faults are recoverable within the
//! running instance and which force a transition to `Error` (and, further up
//! the stack, a view change).

use shardchain_primitives::H256;
use shardchain_types::ConsensusState;

/// A fault reported back by a backup's validator, carried on the wire as an
/// `Error` message to the leader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackupFault {
    /// Microblock only: the proposed block references transactions this
    /// backup has not seen. Recoverable: the leader replies with bodies and
    /// the backup re-enters consensus from `Initial`.
    MissingTxn(Vec<H256>),
    /// Any other validator rejection: wrong hash, wrong root, wrong
    /// timestamp, bad signature. Not recoverable within this instance.
    ValidationFailure(String),
    /// The backup was asked to commit to a payload it never announced.
    WrongOrder,
}

/// Errors raised while driving a consensus instance.
#[derive(thiserror::Error, Debug)]
pub enum ConsensusError {
    /// A message failed to parse or had a structurally invalid shape.
    /// Dropped; never propagates, never triggers view change by itself.
    #[error("malformed consensus message: {0}")]
    MalformedMessage(String),

    /// The message's action is not admissible in the instance's current
    /// state.
    #[error("message not admissible in state {got:?}")]
    StateMismatch {
        /// The state the instance is actually in
        got: ConsensusState,
    },

    /// The message names a `consensusId` older than the instance's current
    /// one. Discarded.
    #[error("stale consensus id {got} (current {current})")]
    StaleConsensusId {
        /// This instance's current id
        current: u32,
        /// The id named by the message
        got: u32,
    },

    /// The message names a `consensusId` newer than the instance's current
    /// one. Caller should buffer and redeliver once the instance advances.
    #[error("future consensus id {got} (current {current})")]
    FutureConsensusId {
        /// This instance's current id
        current: u32,
        /// The id named by the message
        got: u32,
    },

    /// A committee position sent a second commit or response within the
    /// same phase.
    #[error("duplicate submission from committee position {0}")]
    DuplicateSubmission(u16),

    /// A response arrived from a position that never committed in this
    /// phase.
    #[error("response from non-committing position {0}")]
    UncommittedResponder(u16),

    /// A backup reported a recoverable or non-recoverable validator fault.
    #[error("backup {0} reported a fault")]
    BackupReported(u16, BackupFault),

    /// The instance did not reach `Done` before its deadline. Caller should
    /// start view change for this committee and kind.
    #[error("consensus instance timed out")]
    Timeout,

    /// Underlying Schnorr primitive failure (aggregation of an empty set,
    /// out-of-range scalar, and the like).
    #[error(transparent)]
    Crypto(#[from] shardchain_crypto::CryptoError),

    /// Underlying block/cosig type-level failure.
    #[error(transparent)]
    Types(#[from] shardchain_types::TypesError),
}

/// Convenience alias.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
