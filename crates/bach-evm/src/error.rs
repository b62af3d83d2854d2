//! EVM error types

use thiserror::Error;

/// EVM execution errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// Invalid memory access
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Write in static context
    #[error("state modification in static context")]
    StaticCallViolation,

    /// Return data out of bounds
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// Contract creation collision
    #[error("contract address collision")]
    CreateCollision,

    /// Max code size exceeded (EIP-170)
    #[error("max code size exceeded (limit: 24576 bytes)")]
    MaxCodeSizeExceeded,

    /// Call depth exceeded
    #[error("call depth exceeded (max 1024)")]
    CallDepthExceeded,

    /// Insufficient balance for transfer
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Invalid call input
    #[error("invalid call input")]
    InvalidInput,

    /// Precompile error
    #[error("precompile error: {0}")]
    PrecompileError(String),

    /// Revert with data
    #[error("execution reverted")]
    Revert(Vec<u8>),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;

/// Execution result with gas and return data
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Gas used
    pub gas_used: u64,
    /// Return data (or revert data)
    pub output: Vec<u8>,
    /// Logs emitted
    pub logs: Vec<Log>,
}

/// Log entry emitted by LOG opcodes
#[derive(Debug, Clone, Default)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: bach_primitives::Address,
    /// Log topics (0-4)
    pub topics: Vec<bach_primitives::H256>,
    /// Log data
    pub data: Vec<u8>,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(gas_used: u64, output: Vec<u8>, logs: Vec<Log>) -> Self {
        Self {
            success: true,
            gas_used,
            output,
            logs,
        }
    }

    /// Create a failed result
    pub fn failure(gas_used: u64, output: Vec<u8>) -> Self {
        Self {
            success: false,
            gas_used,
            output,
            logs: Vec::new(),
        }
    }

    /// Create a revert result
    pub fn revert(gas_used: u64, output: Vec<u8>) -> Self {
        Self {
            success: false,
            gas_used,
            output,
            logs: Vec::new(),
        }
    }
}
