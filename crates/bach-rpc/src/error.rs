//! RPC error types

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes
pub mod error_code {
    /// Parse error: Invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// Invalid Request: The JSON is not a valid Request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;

    // Ethereum-specific error codes
    /// Execution error (revert)
    pub const EXECUTION_ERROR: i64 = 3;
    /// Transaction rejected
    pub const TRANSACTION_REJECTED: i64 = -32003;
    /// Resource not found
    pub const RESOURCE_NOT_FOUND: i64 = -32001;
    /// Resource unavailable
    pub const RESOURCE_UNAVAILABLE: i64 = -32002;
}

/// JSON-RPC error response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create error with additional data
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error
    pub fn parse_error() -> Self {
        Self::new(error_code::PARSE_ERROR, "Parse error")
    }

    /// Invalid request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_REQUEST, message)
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            error_code::METHOD_NOT_FOUND,
            format!("method not found: {}", method),
        )
    }

    /// Invalid params
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_PARAMS, message)
    }

    /// Internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_code::INTERNAL_ERROR, message)
    }

    /// Execution error (for eth_call/eth_estimateGas)
    pub fn execution_error(message: impl Into<String>) -> Self {
        Self::new(error_code::EXECUTION_ERROR, message)
    }

    /// Transaction rejected
    pub fn transaction_rejected(message: impl Into<String>) -> Self {
        Self::new(error_code::TRANSACTION_REJECTED, message)
    }

    /// Resource not found
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(error_code::RESOURCE_NOT_FOUND, message)
    }
}

/// RPC server errors
#[derive(Debug, Error)]
pub enum RpcError {
    /// Server bind error
    #[error("failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Execution error
    #[error("execution error: {0}")]
    Execution(String),

    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

impl From<bach_storage::StorageError> for RpcError {
    fn from(e: bach_storage::StorageError) -> Self {
        RpcError::Storage(e.to_string())
    }
}

impl From<bach_core::ExecutionError> for RpcError {
    fn from(e: bach_core::ExecutionError) -> Self {
        RpcError::Execution(e.to_string())
    }
}

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;
