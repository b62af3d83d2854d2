//! EVM bytecode interpreter

use crate::context::Environment;
use crate::error::{EvmError, EvmResult, ExecutionResult, Log};
use crate::gas;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::stack::{self, Stack, U256, U256_ONE, U256_ZERO};
use bach_crypto::keccak256;
use bach_primitives::H256;
use std::collections::HashSet;

/// Interpreter state
#[derive(Clone, Debug)]
pub struct Interpreter {
    /// Bytecode being executed
    code: Vec<u8>,
    /// Program counter
    pc: usize,
    /// Stack
    stack: Stack,
    /// Memory
    memory: Memory,
    /// Return data from last call
    return_data: Vec<u8>,
    /// Gas remaining
    gas: u64,
    /// Valid jump destinations
    jump_dests: HashSet<usize>,
    /// Execution stopped
    stopped: bool,
    /// Logs emitted
    logs: Vec<Log>,
}

impl Interpreter {
    /// Create a new interpreter with bytecode and gas
    pub fn new(code: Vec<u8>, gas: u64) -> Self {
        let jump_dests = Self::analyze_jump_dests(&code);
        Self {
            code,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            gas,
            jump_dests,
            stopped: false,
            logs: Vec::new(),
        }
    }

    /// Analyze bytecode for valid jump destinations
    fn analyze_jump_dests(code: &[u8]) -> HashSet<usize> {
        let mut dests = HashSet::new();
        let mut i = 0;

        while i < code.len() {
            let opcode = code[i];
            if opcode == Opcode::JUMPDEST as u8 {
                dests.insert(i);
            }
            // Skip PUSH operands
            if (0x60..=0x7F).contains(&opcode) {
                let push_size = (opcode - 0x5F) as usize;
                i += push_size;
            }
            i += 1;
        }

        dests
    }

    /// Execute until completion or error
    pub fn run(&mut self, env: &Environment) -> ExecutionResult {
        let initial_gas = self.gas;

        while !self.stopped && self.pc < self.code.len() {
            match self.step(env) {
                Ok(()) => {}
                Err(EvmError::Revert(data)) => {
                    return ExecutionResult::revert(
                        initial_gas - self.gas,
                        data,
                    );
                }
                Err(_e) => {
                    // Consume all gas on error
                    return ExecutionResult::failure(initial_gas, Vec::new());
                }
            }
        }

        // Normal completion (STOP, RETURN, or end of code)
        ExecutionResult::success(
            initial_gas - self.gas,
            self.return_data.clone(),
            std::mem::take(&mut self.logs),
        )
    }

    /// Execute a single step
    pub fn step(&mut self, env: &Environment) -> EvmResult<()> {
        if self.pc >= self.code.len() {
            self.stopped = true;
            return Ok(());
        }

        let opcode_byte = self.code[self.pc];
        let opcode = Opcode::from_byte(opcode_byte)
            .ok_or(EvmError::InvalidOpcode(opcode_byte))?;

        // Check and consume static gas
        let static_gas = gas::static_gas(opcode);
        self.use_gas(static_gas)?;

        // Execute opcode
        self.execute(opcode, env)?;

        Ok(())
    }

    /// Use gas, returning error if insufficient
    fn use_gas(&mut self, amount: u64) -> EvmResult<()> {
        if self.gas < amount {
            return Err(EvmError::OutOfGas);
        }
        self.gas -= amount;
        Ok(())
    }

    /// Execute an opcode
    fn execute(&mut self, opcode: Opcode, env: &Environment) -> EvmResult<()> {
        match opcode {
            // Stop
            Opcode::STOP => {
                self.stopped = true;
            }

            // Arithmetic
            Opcode::ADD => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(stack::u256_add(&a, &b))?;
                self.pc += 1;
            }
            Opcode::SUB => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(stack::u256_sub(&a, &b))?;
                self.pc += 1;
            }
            Opcode::MUL => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                // Simple multiplication for small values
                let result = self.u256_mul(&a, &b);
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::DIV => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                let result = if stack::u256_is_zero(&b) {
                    U256_ZERO
                } else {
                    self.u256_div(&a, &b)
                };
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::MOD => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                let result = if stack::u256_is_zero(&b) {
                    U256_ZERO
                } else {
                    self.u256_mod(&a, &b)
                };
                self.stack.push(result)?;
                self.pc += 1;
            }

            // Comparison
            Opcode::LT => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                let result = if stack::u256_lt(&a, &b) { U256_ONE } else { U256_ZERO };
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::GT => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                let result = if stack::u256_gt(&a, &b) { U256_ONE } else { U256_ZERO };
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::EQ => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                let result = if a == b { U256_ONE } else { U256_ZERO };
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::ISZERO => {
                let a = self.stack.pop()?;
                let result = if stack::u256_is_zero(&a) { U256_ONE } else { U256_ZERO };
                self.stack.push(result)?;
                self.pc += 1;
            }

            // Bitwise
            Opcode::AND => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(stack::u256_and(&a, &b))?;
                self.pc += 1;
            }
            Opcode::OR => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(stack::u256_or(&a, &b))?;
                self.pc += 1;
            }
            Opcode::XOR => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(stack::u256_xor(&a, &b))?;
                self.pc += 1;
            }
            Opcode::NOT => {
                let a = self.stack.pop()?;
                self.stack.push(stack::u256_not(&a))?;
                self.pc += 1;
            }

            // SHA3
            Opcode::KECCAK256 => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                // Memory expansion gas
                let new_size = self.memory.expand(offset, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                self.use_gas(gas::sha3_gas(size))?;

                let data = self.memory.load_slice(offset, size);
                let hash = keccak256(&data);
                self.stack.push(*hash.as_bytes())?;
                self.pc += 1;
            }

            // Environment
            Opcode::ADDRESS => {
                let mut addr = U256_ZERO;
                addr[12..32].copy_from_slice(env.call.address.as_bytes());
                self.stack.push(addr)?;
                self.pc += 1;
            }
            Opcode::CALLER => {
                let mut addr = U256_ZERO;
                addr[12..32].copy_from_slice(env.call.caller.as_bytes());
                self.stack.push(addr)?;
                self.pc += 1;
            }
            Opcode::CALLVALUE => {
                self.stack.push(stack::u128_to_u256(env.call.value))?;
                self.pc += 1;
            }
            Opcode::CALLDATALOAD => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .unwrap_or(usize::MAX);
                let mut result = U256_ZERO;
                for (i, byte) in result.iter_mut().enumerate().take(32) {
                    if offset + i < env.call.data.len() {
                        *byte = env.call.data[offset + i];
                    }
                }
                self.stack.push(result)?;
                self.pc += 1;
            }
            Opcode::CALLDATASIZE => {
                self.stack.push(stack::u64_to_u256(env.call.data.len() as u64))?;
                self.pc += 1;
            }
            Opcode::CALLDATACOPY => {
                let dest = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .unwrap_or(usize::MAX);
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                // Memory expansion and copy gas
                let new_size = self.memory.expand(dest, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                self.use_gas(gas::copy_gas(size))?;

                let mut data = vec![0u8; size];
                for (i, byte) in data.iter_mut().enumerate() {
                    if offset + i < env.call.data.len() {
                        *byte = env.call.data[offset + i];
                    }
                }
                self.memory.store_slice(dest, &data);
                self.pc += 1;
            }
            Opcode::CODESIZE => {
                self.stack.push(stack::u64_to_u256(self.code.len() as u64))?;
                self.pc += 1;
            }
            Opcode::CODECOPY => {
                let dest = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .unwrap_or(usize::MAX);
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                let new_size = self.memory.expand(dest, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                self.use_gas(gas::copy_gas(size))?;

                let mut data = vec![0u8; size];
                for (i, byte) in data.iter_mut().enumerate() {
                    if offset + i < self.code.len() {
                        *byte = self.code[offset + i];
                    }
                }
                self.memory.store_slice(dest, &data);
                self.pc += 1;
            }
            Opcode::GASPRICE => {
                self.stack.push(stack::u128_to_u256(env.tx.gas_price))?;
                self.pc += 1;
            }
            Opcode::RETURNDATASIZE => {
                self.stack.push(stack::u64_to_u256(self.return_data.len() as u64))?;
                self.pc += 1;
            }
            Opcode::RETURNDATACOPY => {
                let dest = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::ReturnDataOutOfBounds)?;
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                if offset.saturating_add(size) > self.return_data.len() {
                    return Err(EvmError::ReturnDataOutOfBounds);
                }

                let new_mem_size = self.memory.expand(dest, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_mem_size))?;
                self.use_gas(gas::copy_gas(size))?;

                self.memory.store_slice(dest, &self.return_data[offset..offset + size]);
                self.pc += 1;
            }

            // Block info
            Opcode::BLOCKHASH => {
                let _block_num = self.stack.pop()?;
                // TODO: Implement blockhash lookup
                self.stack.push(U256_ZERO)?;
                self.pc += 1;
            }
            Opcode::COINBASE => {
                let mut addr = U256_ZERO;
                addr[12..32].copy_from_slice(env.block.coinbase.as_bytes());
                self.stack.push(addr)?;
                self.pc += 1;
            }
            Opcode::TIMESTAMP => {
                self.stack.push(stack::u64_to_u256(env.block.timestamp))?;
                self.pc += 1;
            }
            Opcode::NUMBER => {
                self.stack.push(stack::u64_to_u256(env.block.number))?;
                self.pc += 1;
            }
            Opcode::PREVRANDAO => {
                self.stack.push(*env.block.prevrandao.as_bytes())?;
                self.pc += 1;
            }
            Opcode::GASLIMIT => {
                self.stack.push(stack::u64_to_u256(env.block.gas_limit))?;
                self.pc += 1;
            }
            Opcode::CHAINID => {
                self.stack.push(stack::u64_to_u256(env.block.chain_id))?;
                self.pc += 1;
            }
            Opcode::BASEFEE => {
                self.stack.push(stack::u128_to_u256(env.block.base_fee))?;
                self.pc += 1;
            }
            Opcode::ORIGIN => {
                let mut addr = U256_ZERO;
                addr[12..32].copy_from_slice(env.tx.origin.as_bytes());
                self.stack.push(addr)?;
                self.pc += 1;
            }

            // Stack, Memory, Flow
            Opcode::POP => {
                self.stack.pop()?;
                self.pc += 1;
            }
            Opcode::MLOAD => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let new_size = self.memory.expand(offset, 32);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                let value = self.memory.load(offset);
                self.stack.push(value)?;
                self.pc += 1;
            }
            Opcode::MSTORE => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let value = self.stack.pop()?;
                let new_size = self.memory.expand(offset, 32);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                self.memory.store(offset, &value);
                self.pc += 1;
            }
            Opcode::MSTORE8 => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let value = self.stack.pop()?;
                let new_size = self.memory.expand(offset, 1);
                self.use_gas(gas::memory_gas(self.memory.size(), new_size))?;
                self.memory.store8(offset, value[31]);
                self.pc += 1;
            }
            Opcode::MSIZE => {
                self.stack.push(stack::u64_to_u256(self.memory.size() as u64))?;
                self.pc += 1;
            }
            Opcode::GAS => {
                self.stack.push(stack::u64_to_u256(self.gas))?;
                self.pc += 1;
            }
            Opcode::JUMP => {
                let dest = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidJump(usize::MAX))?;
                if !self.jump_dests.contains(&dest) {
                    return Err(EvmError::InvalidJump(dest));
                }
                self.pc = dest;
            }
            Opcode::JUMPI => {
                let dest = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidJump(usize::MAX))?;
                let cond = self.stack.pop()?;
                if !stack::u256_is_zero(&cond) {
                    if !self.jump_dests.contains(&dest) {
                        return Err(EvmError::InvalidJump(dest));
                    }
                    self.pc = dest;
                } else {
                    self.pc += 1;
                }
            }
            Opcode::JUMPDEST => {
                self.pc += 1;
            }
            Opcode::PC => {
                self.stack.push(stack::u64_to_u256(self.pc as u64))?;
                self.pc += 1;
            }

            // Push operations
            Opcode::PUSH0 => {
                self.stack.push(U256_ZERO)?;
                self.pc += 1;
            }
            op if op.is_push() => {
                let size = op.push_size();
                let mut value = U256_ZERO;
                for i in 0..size {
                    let idx = self.pc + 1 + i;
                    if idx < self.code.len() {
                        value[32 - size + i] = self.code[idx];
                    }
                }
                self.stack.push(value)?;
                self.pc += 1 + size;
            }

            // Dup operations
            op if op.dup_depth() > 0 => {
                self.stack.dup(op.dup_depth())?;
                self.pc += 1;
            }

            // Swap operations
            op if op.swap_depth() > 0 => {
                self.stack.swap(op.swap_depth())?;
                self.pc += 1;
            }

            // Return/Revert
            Opcode::RETURN => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                let new_mem_size = self.memory.expand(offset, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_mem_size))?;

                self.return_data = self.memory.load_slice(offset, size);
                self.stopped = true;
            }
            Opcode::REVERT => {
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                let new_mem_size = self.memory.expand(offset, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_mem_size))?;

                let data = self.memory.load_slice(offset, size);
                return Err(EvmError::Revert(data));
            }
            Opcode::INVALID => {
                return Err(EvmError::InvalidOpcode(0xFE));
            }

            // LOG operations
            op if op.log_topics() > 0 || op == Opcode::LOG0 => {
                if env.call.is_static {
                    return Err(EvmError::StaticCallViolation);
                }
                let offset = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;
                let size = stack::u256_to_usize(&self.stack.pop()?)
                    .ok_or(EvmError::InvalidMemoryAccess)?;

                let topic_count = op.log_topics();
                let mut topics = Vec::with_capacity(topic_count);
                for _ in 0..topic_count {
                    let topic = self.stack.pop()?;
                    topics.push(H256::from_bytes(topic));
                }

                let new_mem_size = self.memory.expand(offset, size);
                self.use_gas(gas::memory_gas(self.memory.size(), new_mem_size))?;
                self.use_gas(gas::log_gas(topic_count, size))?;

                let data = self.memory.load_slice(offset, size);
                self.logs.push(Log {
                    address: env.call.address,
                    topics,
                    data,
                });
                self.pc += 1;
            }

            // Unimplemented opcodes
            _ => {
                return Err(EvmError::InvalidOpcode(opcode as u8));
            }
        }

        Ok(())
    }

    // Simple U256 multiplication (for small values)
    fn u256_mul(&self, a: &U256, b: &U256) -> U256 {
        // Convert to u128 if possible for simple cases
        if let (Some(a_val), Some(b_val)) = (stack::u256_to_u64(a), stack::u256_to_u64(b)) {
            let result = (a_val as u128) * (b_val as u128);
            return stack::u128_to_u256(result);
        }
        // For larger values, return zero (simplified)
        U256_ZERO
    }

    // Simple U256 division (for small values)
    fn u256_div(&self, a: &U256, b: &U256) -> U256 {
        if let (Some(a_val), Some(b_val)) = (stack::u256_to_u64(a), stack::u256_to_u64(b)) {
            if b_val == 0 {
                return U256_ZERO;
            }
            return stack::u64_to_u256(a_val / b_val);
        }
        U256_ZERO
    }

    // Simple U256 modulo (for small values)
    fn u256_mod(&self, a: &U256, b: &U256) -> U256 {
        if let (Some(a_val), Some(b_val)) = (stack::u256_to_u64(a), stack::u256_to_u64(b)) {
            if b_val == 0 {
                return U256_ZERO;
            }
            return stack::u64_to_u256(a_val % b_val);
        }
        U256_ZERO
    }

    /// Get remaining gas
    pub fn gas_remaining(&self) -> u64 {
        self.gas
    }

    /// Get return data
    pub fn return_data(&self) -> &[u8] {
        &self.return_data
    }
}
