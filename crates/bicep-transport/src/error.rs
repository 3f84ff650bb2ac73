//! Transport error types

use std::fmt;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in transport operations
#[derive(Debug)]
pub enum TransportError {
    /// The subprocess could not be started, or the channel to it broke
    Connection(String),

    /// The transport was disposed before or while the request was in flight
    Disposed,

    /// The CLI answered with a JSON-RPC error object
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the CLI
        message: String,
    },

    /// The CLI sent something that is not a valid JSON-RPC response
    Protocol(String),

    /// Serialization error
    Serialization(String),

    /// I/O error
    Io(std::io::Error),
}

impl TransportError {
    /// Whether this error means the channel is gone for good
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Disposed | Self::Io(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Disposed => write!(f, "Transport has been disposed"),
            Self::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            Self::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bicep_protocol::ProtocolError> for TransportError {
    fn from(err: bicep_protocol::ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
