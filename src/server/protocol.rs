//! Protocol types for the façade
//!
//! This module defines the request/response envelopes exchanged with the
//! GUI shell, the error codes, and small shared payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Request Types
// =============================================================================

/// Request envelope sent by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Optional request correlation ID (client may omit; one is generated and echoed)
    #[serde(default)]
    pub id: Option<String>,

    /// Operation to perform (e.g., "query.run")
    pub method: String,

    /// Operation-specific parameters
    #[serde(default)]
    pub params: Value,
}

// =============================================================================
// Response Types
// =============================================================================

/// Response envelope sent back for every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Request correlation ID (client-provided or generated)
    pub id: String,

    /// Response type
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Response payload
    pub data: Value,
}

impl ResponseEnvelope {
    /// Create a result response
    pub fn result(id: String, data: Value) -> Self {
        Self {
            id,
            response_type: ResponseType::Result,
            data,
        }
    }

    /// Create an error response
    pub fn error(id: String, error: ErrorData) -> Self {
        Self {
            id,
            response_type: ResponseType::Error,
            data: serde_json::to_value(error).unwrap_or(Value::Null),
        }
    }

    pub fn is_error(&self) -> bool {
        self.response_type == ResponseType::Error
    }
}

/// Response type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Successful response (exactly once per request)
    Result,
    /// Error response (terminal)
    Error,
}

// =============================================================================
// Error Types
// =============================================================================

/// Error data structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorData {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an error with details
    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Create an unknown method error
    pub fn unknown_method(method: &str) -> Self {
        Self::new(
            ErrorCode::UnknownMethod,
            format!("Unknown method: {}", method),
        )
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for ErrorData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorData {}

/// Error codes carried in error responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request message
    InvalidRequest,
    /// Method not found
    UnknownMethod,
    /// Invalid or missing parameters
    InvalidParams,
    /// Unknown connection id
    NotFound,
    /// No adapter for the connection type
    UnsupportedType,
    /// Connection config lacks a required key
    MissingConfig,
    /// Data source is not a valid database image
    LoadFailed,
    /// Statement failed inside the embedded engine
    ExecutionFailed,
    /// Filesystem fault
    IoError,
    /// Operation failed outside the engine (e.g. the file picker)
    OperationFailed,
    /// Unexpected server error
    InternalError,
}

// =============================================================================
// Shared payloads
// =============================================================================

/// Acknowledgement returned by delete/save operations without a richer result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// System information response
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Protocol version
    pub protocol_version: u32,

    /// Server version
    pub server_version: String,

    /// Connection types the query engine can open
    pub connection_types: Vec<&'static str>,

    /// Directory holding the connection and settings records
    pub data_dir: String,
}

impl SystemInfo {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            protocol_version: 1,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            connection_types: crate::engine::Adapter::supported_kinds().to_vec(),
            data_dir: data_dir.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
