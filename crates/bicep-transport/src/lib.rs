//! Subprocess JSON-RPC transport for the Bicep CLI
//!
//! Provides a trait-based transport abstraction and its implementation over
//! a spawned `bicep jsonrpc` process. The bridge client is written against
//! [`Transport`] only.
//!
//! # Architecture
//!
//! - **Transport trait**: correlated request/response plus idempotent disposal
//! - **Framing**: `Content-Length` delimited JSON bodies
//! - **Message router**: id-based correlation with pipelined requests over any byte stream
//! - **Subprocess transport**: spawns the CLI and owns it until disposal
//! - **Error handling**: Unified error types across transports
//!
//! # Usage
//!
//! ```ignore
//! use bicep_transport::{CliTransport, ProcessConfig, Transport};
//!
//! let transport = CliTransport::open(ProcessConfig::new("/usr/local/bin/bicep")).await?;
//! let version = transport.send_request("bicep/version", serde_json::json!({})).await?;
//! transport.dispose().await;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod framing;
pub mod routing;
pub mod subprocess;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use routing::MessageRouter;
pub use subprocess::{ChannelMode, CliTransport, ProcessConfig};
pub use traits::Transport;
