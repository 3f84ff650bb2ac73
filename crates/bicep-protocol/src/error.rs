//! Error types for protocol operations
//!
//! Provides error types for decoding JSON-RPC envelopes.

use std::fmt;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while decoding protocol messages
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// JSON serialization/deserialization error
    SerializationError(String),

    /// Message is valid JSON but not a JSON-RPC 2.0 message
    InvalidMessage(String),

    /// Missing required field
    MissingField(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            Self::MissingField(field) => write!(f, "Missing required field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
