//! Gas cost calculations

use crate::opcode::Opcode;

/// Gas costs for EVM operations
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;

    /// Jump dest gas
    pub const JUMPDEST: u64 = 1;
    /// Exp gas
    pub const EXP: u64 = 10;
    /// Exp byte gas
    pub const EXP_BYTE: u64 = 50;
    /// SHA3 base gas
    pub const SHA3: u64 = 30;
    /// SHA3 word gas
    pub const SHA3_WORD: u64 = 6;

    /// Balance gas (EIP-2929 cold)
    pub const BALANCE_COLD: u64 = 2600;
    /// Balance gas (warm)
    pub const BALANCE_WARM: u64 = 100;
    /// Ext code size gas (cold)
    pub const EXTCODESIZE_COLD: u64 = 2600;
    /// Ext code size gas (warm)
    pub const EXTCODESIZE_WARM: u64 = 100;
    /// Ext code copy base (cold)
    pub const EXTCODECOPY_COLD: u64 = 2600;
    /// Ext code copy base (warm)
    pub const EXTCODECOPY_WARM: u64 = 100;
    /// Ext code hash (cold)
    pub const EXTCODEHASH_COLD: u64 = 2600;
    /// Ext code hash (warm)
    pub const EXTCODEHASH_WARM: u64 = 100;

    /// Sload gas (cold)
    pub const SLOAD_COLD: u64 = 2100;
    /// Sload gas (warm)
    pub const SLOAD_WARM: u64 = 100;
    /// Sstore set gas
    pub const SSTORE_SET: u64 = 20000;
    /// Sstore reset gas
    pub const SSTORE_RESET: u64 = 2900;
    /// Sstore clear refund
    pub const SSTORE_CLEAR_REFUND: u64 = 4800;

    /// Log gas
    pub const LOG: u64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: u64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: u64 = 8;

    /// Create gas
    pub const CREATE: u64 = 32000;
    /// Create2 gas
    pub const CREATE2: u64 = 32000;
    /// Call gas (cold)
    pub const CALL_COLD: u64 = 2600;
    /// Call gas (warm)
    pub const CALL_WARM: u64 = 100;
    /// Call value transfer gas
    pub const CALL_VALUE: u64 = 9000;
    /// Call new account gas
    pub const CALL_NEW_ACCOUNT: u64 = 25000;
    /// Call stipend
    pub const CALL_STIPEND: u64 = 2300;

    /// Memory gas per word
    pub const MEMORY: u64 = 3;
    /// Copy gas per word
    pub const COPY: u64 = 3;

    /// Transaction gas
    pub const TX: u64 = 21000;
    /// Transaction create gas
    pub const TX_CREATE: u64 = 32000;
    /// Transaction data zero byte
    pub const TX_DATA_ZERO: u64 = 4;
    /// Transaction data non-zero byte
    pub const TX_DATA_NONZERO: u64 = 16;
    /// Access list address gas
    pub const ACCESS_LIST_ADDRESS: u64 = 2400;
    /// Access list storage key gas
    pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;

    /// Selfdestruct gas
    pub const SELFDESTRUCT: u64 = 5000;
    /// Selfdestruct new account gas
    pub const SELFDESTRUCT_NEW_ACCOUNT: u64 = 25000;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Max code size (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
    /// Max init code size (EIP-3860)
    pub const MAX_INIT_CODE_SIZE: usize = 49152;
}

/// Get static gas cost for an opcode
pub fn static_gas(opcode: Opcode) -> u64 {
    match opcode {
        // Zero cost
        Opcode::STOP | Opcode::RETURN | Opcode::REVERT => cost::ZERO,

        // Base cost (2)
        Opcode::ADDRESS | Opcode::ORIGIN | Opcode::CALLER | Opcode::CALLVALUE |
        Opcode::CALLDATASIZE | Opcode::CODESIZE | Opcode::GASPRICE |
        Opcode::COINBASE | Opcode::TIMESTAMP | Opcode::NUMBER |
        Opcode::PREVRANDAO | Opcode::GASLIMIT | Opcode::CHAINID |
        Opcode::RETURNDATASIZE | Opcode::POP | Opcode::PC |
        Opcode::MSIZE | Opcode::GAS | Opcode::BASEFEE | Opcode::PUSH0 => cost::BASE,

        // Very low cost (3)
        Opcode::ADD | Opcode::SUB | Opcode::NOT | Opcode::LT | Opcode::GT |
        Opcode::SLT | Opcode::SGT | Opcode::EQ | Opcode::ISZERO |
        Opcode::AND | Opcode::OR | Opcode::XOR | Opcode::BYTE |
        Opcode::SHL | Opcode::SHR | Opcode::SAR |
        Opcode::CALLDATALOAD | Opcode::MLOAD | Opcode::MSTORE | Opcode::MSTORE8 |
        Opcode::PUSH1 | Opcode::PUSH2 | Opcode::PUSH3 | Opcode::PUSH4 |
        Opcode::PUSH5 | Opcode::PUSH6 | Opcode::PUSH7 | Opcode::PUSH8 |
        Opcode::PUSH9 | Opcode::PUSH10 | Opcode::PUSH11 | Opcode::PUSH12 |
        Opcode::PUSH13 | Opcode::PUSH14 | Opcode::PUSH15 | Opcode::PUSH16 |
        Opcode::PUSH17 | Opcode::PUSH18 | Opcode::PUSH19 | Opcode::PUSH20 |
        Opcode::PUSH21 | Opcode::PUSH22 | Opcode::PUSH23 | Opcode::PUSH24 |
        Opcode::PUSH25 | Opcode::PUSH26 | Opcode::PUSH27 | Opcode::PUSH28 |
        Opcode::PUSH29 | Opcode::PUSH30 | Opcode::PUSH31 | Opcode::PUSH32 |
        Opcode::DUP1 | Opcode::DUP2 | Opcode::DUP3 | Opcode::DUP4 |
        Opcode::DUP5 | Opcode::DUP6 | Opcode::DUP7 | Opcode::DUP8 |
        Opcode::DUP9 | Opcode::DUP10 | Opcode::DUP11 | Opcode::DUP12 |
        Opcode::DUP13 | Opcode::DUP14 | Opcode::DUP15 | Opcode::DUP16 |
        Opcode::SWAP1 | Opcode::SWAP2 | Opcode::SWAP3 | Opcode::SWAP4 |
        Opcode::SWAP5 | Opcode::SWAP6 | Opcode::SWAP7 | Opcode::SWAP8 |
        Opcode::SWAP9 | Opcode::SWAP10 | Opcode::SWAP11 | Opcode::SWAP12 |
        Opcode::SWAP13 | Opcode::SWAP14 | Opcode::SWAP15 | Opcode::SWAP16 => cost::VERYLOW,

        // Low cost (5)
        Opcode::MUL | Opcode::DIV | Opcode::SDIV | Opcode::MOD |
        Opcode::SMOD | Opcode::SIGNEXTEND | Opcode::SELFBALANCE => cost::LOW,

        // Mid cost (8)
        Opcode::ADDMOD | Opcode::MULMOD | Opcode::JUMP => cost::MID,

        // High cost (10)
        Opcode::JUMPI => cost::HIGH,

        // Jump destination
        Opcode::JUMPDEST => cost::JUMPDEST,

        // Special costs (dynamic)
        Opcode::EXP => cost::EXP,
        Opcode::KECCAK256 => cost::SHA3,
        Opcode::BALANCE => cost::BALANCE_WARM, // Default warm, adjust if cold
        Opcode::EXTCODESIZE => cost::EXTCODESIZE_WARM,
        Opcode::EXTCODECOPY => cost::EXTCODECOPY_WARM,
        Opcode::EXTCODEHASH => cost::EXTCODEHASH_WARM,
        Opcode::BLOCKHASH => 20,
        Opcode::SLOAD => cost::SLOAD_WARM,
        Opcode::SSTORE => 0, // Dynamic based on storage state
        Opcode::LOG0 => cost::LOG,
        Opcode::LOG1 => cost::LOG + cost::LOG_TOPIC,
        Opcode::LOG2 => cost::LOG + 2 * cost::LOG_TOPIC,
        Opcode::LOG3 => cost::LOG + 3 * cost::LOG_TOPIC,
        Opcode::LOG4 => cost::LOG + 4 * cost::LOG_TOPIC,
        Opcode::CREATE => cost::CREATE,
        Opcode::CREATE2 => cost::CREATE2,
        Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL |
        Opcode::STATICCALL => cost::CALL_WARM,
        Opcode::SELFDESTRUCT => cost::SELFDESTRUCT,
        Opcode::CALLDATACOPY | Opcode::CODECOPY |
        Opcode::RETURNDATACOPY | Opcode::MCOPY => cost::VERYLOW,
        Opcode::TLOAD | Opcode::TSTORE => cost::SLOAD_WARM,
        Opcode::INVALID => 0,
    }
}

/// Calculate memory expansion cost
pub fn memory_gas(current_size: usize, new_size: usize) -> u64 {
    if new_size <= current_size {
        return 0;
    }

    let new_words = new_size.div_ceil(32);
    let old_words = current_size.div_ceil(32);

    let new_cost = memory_word_cost(new_words);
    let old_cost = memory_word_cost(old_words);

    new_cost.saturating_sub(old_cost)
}

/// Calculate memory cost for a number of words
fn memory_word_cost(words: usize) -> u64 {
    let words = words as u64;
    cost::MEMORY * words + words * words / 512
}

/// Calculate copy cost (for CALLDATACOPY, CODECOPY, etc.)
pub fn copy_gas(length: usize) -> u64 {
    let words = length.div_ceil(32);
    cost::COPY * words as u64
}

/// Calculate EXP gas cost
pub fn exp_gas(exponent: &[u8; 32]) -> u64 {
    let mut byte_size = 32;
    for (i, &b) in exponent.iter().enumerate() {
        if b != 0 {
            byte_size = 32 - i;
            break;
        }
    }
    if exponent.iter().all(|&b| b == 0) {
        byte_size = 0;
    }
    cost::EXP + cost::EXP_BYTE * byte_size as u64
}

/// Calculate SHA3/KECCAK256 gas cost
pub fn sha3_gas(length: usize) -> u64 {
    let words = length.div_ceil(32);
    cost::SHA3 + cost::SHA3_WORD * words as u64
}

/// Calculate LOG gas cost
pub fn log_gas(topics: usize, data_size: usize) -> u64 {
    cost::LOG + cost::LOG_TOPIC * topics as u64 + cost::LOG_DATA * data_size as u64
}
