//! Error types for the bridge
//!
//! Every failure surfaces to the caller of the operation that hit it. The
//! bridge never retries and never degrades silently: a version gate that is
//! not met stops the request before it is written to the channel.

use bicep_transport::TransportError;
use thiserror::Error;
use tracing::warn;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors returned by [`Bridge`](crate::Bridge) operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The CLI could not be started or reached, or the channel broke
    #[error("Connection error: {0}")]
    Connection(String),

    /// A version string could not be parsed
    #[error("Malformed version {input:?}: {reason}")]
    MalformedVersion {
        /// The offending input
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// The CLI is older than an operation requires
    #[error("Bicep CLI version {actual} is not supported. Please install version {minimum} or later.")]
    UnsupportedVersion {
        /// Version the CLI reported
        actual: String,
        /// Minimum version required
        minimum: String,
    },

    /// The bridge was disposed before or during the operation
    #[error("Bridge has been disposed")]
    Disposed,

    /// The CLI sent a response that does not match the protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The CLI answered the request with an error
    #[error("Bicep CLI error {code}: {message}")]
    Remote {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the CLI
        message: String,
    },

    /// Invalid bridge configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// The minimum version named by an `UnsupportedVersion` error
    pub fn required_version(&self) -> Option<&str> {
        match self {
            Self::UnsupportedVersion { minimum, .. } => Some(minimum),
            _ => None,
        }
    }
}

impl From<TransportError> for BridgeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(msg) => Self::Connection(msg),
            TransportError::Io(e) => {
                warn!(kind = ?e.kind(), error = %e, "I/O failure on the CLI channel");
                Self::Connection(format!("{} ({:?})", e, e.kind()))
            }
            TransportError::Disposed => Self::Disposed,
            TransportError::Rpc { code, message } => Self::Remote { code, message },
            TransportError::Protocol(msg) | TransportError::Serialization(msg) => {
                Self::Protocol(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = BridgeError::UnsupportedVersion {
            actual: "0.24.24".to_string(),
            minimum: "0.25.3".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Bicep CLI version 0.24.24 is not supported. Please install version 0.25.3 or later."
        );
        assert_eq!(err.required_version(), Some("0.25.3"));
    }

    #[test]
    fn test_transport_errors_map_to_taxonomy() {
        assert!(matches!(
            BridgeError::from(TransportError::Disposed),
            BridgeError::Disposed
        ));
        assert!(matches!(
            BridgeError::from(TransportError::Connection("gone".into())),
            BridgeError::Connection(msg) if msg == "gone"
        ));
        assert!(matches!(
            BridgeError::from(TransportError::Rpc { code: -32603, message: "boom".into() }),
            BridgeError::Remote { code: -32603, .. }
        ));
        assert!(matches!(
            BridgeError::from(TransportError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe))),
            BridgeError::Connection(msg) if msg.contains("BrokenPipe")
        ));
        assert!(matches!(
            BridgeError::from(TransportError::Protocol("bad id".into())),
            BridgeError::Protocol(_)
        ));
    }
}
