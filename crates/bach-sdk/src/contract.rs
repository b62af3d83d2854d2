//! Contract interaction helpers

use bach_primitives::Address;
use bytes::Bytes;

use crate::abi::{decode, encode_function_call, function_selector, ParamType, Token};
use crate::SdkError;

/// Contract helper for encoding/decoding function calls
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Function definitions
    functions: Vec<FunctionDef>,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Function selector (4 bytes)
    pub selector: [u8; 4],
    /// Input parameter types
    pub inputs: Vec<ParamType>,
    /// Output parameter types
    pub outputs: Vec<ParamType>,
}

impl FunctionDef {
    /// Create a new function definition
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    ) -> Self {
        let signature = signature.into();
        let selector = function_selector(&signature);
        Self {
            name: name.into(),
            signature,
            selector,
            inputs,
            outputs,
        }
    }
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
        }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Add a function definition
    pub fn add_function(&mut self, function: FunctionDef) {
        self.functions.push(function);
    }

    /// Add a function with builder pattern
    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Encode a function call
    pub fn encode_call(&self, function_name: &str, args: &[Token]) -> Result<Bytes, SdkError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| SdkError::AbiEncode(format!("Unknown function: {}", function_name)))?;

        if args.len() != function.inputs.len() {
            return Err(SdkError::AbiEncode(format!(
                "Expected {} arguments, got {}",
                function.inputs.len(),
                args.len()
            )));
        }

        let data = encode_function_call(function.selector, args);
        Ok(Bytes::from(data))
    }

    /// Decode function output
    pub fn decode_output(&self, function_name: &str, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        let function = self
            .function(function_name)
            .ok_or_else(|| SdkError::AbiDecode(format!("Unknown function: {}", function_name)))?;

        decode(&function.outputs, data)
    }
}

/// Builder for creating common contract interfaces
pub struct ContractBuilder {
    address: Address,
    functions: Vec<FunctionDef>,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            address,
            functions: Vec::new(),
        }
    }

    /// Add a function
    pub fn function(
        mut self,
        name: &str,
        signature: &str,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    ) -> Self {
        self.functions.push(FunctionDef::new(name, signature, inputs, outputs));
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        Contract {
            address: self.address,
            functions: self.functions,
        }
    }
}

/// Create an ERC20 contract helper
pub fn erc20(address: Address) -> Contract {
    ContractBuilder::new(address)
        .function(
            "name",
            "name()",
            vec![],
            vec![ParamType::String],
        )
        .function(
            "symbol",
            "symbol()",
            vec![],
            vec![ParamType::String],
        )
        .function(
            "decimals",
            "decimals()",
            vec![],
            vec![ParamType::Uint(8)],
        )
        .function(
            "totalSupply",
            "totalSupply()",
            vec![],
            vec![ParamType::Uint(256)],
        )
        .function(
            "balanceOf",
            "balanceOf(address)",
            vec![ParamType::Address],
            vec![ParamType::Uint(256)],
        )
        .function(
            "transfer",
            "transfer(address,uint256)",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .function(
            "approve",
            "approve(address,uint256)",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .function(
            "allowance",
            "allowance(address,address)",
            vec![ParamType::Address, ParamType::Address],
            vec![ParamType::Uint(256)],
        )
        .function(
            "transferFrom",
            "transferFrom(address,address,uint256)",
            vec![ParamType::Address, ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        )
        .build()
}
