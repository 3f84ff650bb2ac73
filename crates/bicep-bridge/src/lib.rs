//! Typed async client for the Bicep CLI
//!
//! Starts `bicep jsonrpc` as a child process, checks that it is recent
//! enough, and exposes its compiler operations as typed async methods.
//!
//! # Quick Start
//!
//! ```no_run
//! use bicep_bridge::{Bridge, FormatRequest, GetMetadataRequest};
//!
//! # async fn example() -> bicep_bridge::Result<()> {
//! let bridge = Bridge::initialize("/usr/local/bin/bicep").await?;
//!
//! let metadata = bridge.get_metadata(&GetMetadataRequest::new("/src/main.bicep")).await?;
//! for param in &metadata.parameters {
//!     println!("param {}", param.name);
//! }
//!
//! // Needs CLI 0.37.0 or later; fails with UnsupportedVersion otherwise
//! let formatted = bridge.format(&FormatRequest::new("/src/main.bicep")).await?;
//! println!("{}", formatted.contents);
//!
//! bridge.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Version gates
//!
//! The CLI must report at least [`BASELINE_VERSION`] when the bridge
//! connects. Operations added in later CLI releases carry their own minimum
//! ([`Method::minimum_version`]); the bridge re-queries the version before
//! each such call.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod state;
pub mod version;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use state::BridgeState;
pub use version::{GateOutcome, Version, VersionGate};

pub use bicep_protocol::{
    BASELINE_VERSION, CompileParamsRequest, CompileParamsResponse, CompileRequest,
    CompileResponse, Diagnostic, DiagnosticLevel, ExportDefinition, ExternalInputValue,
    FormatRequest, FormatResponse, GetDeploymentGraphRequest, GetDeploymentGraphResponse,
    GetFileReferencesRequest, GetFileReferencesResponse, GetMetadataRequest,
    GetMetadataResponse, GetSnapshotRequest, GetSnapshotResponse, GraphEdge, GraphNode,
    MetadataDefinition, Method, Position, Range, RpcRequest, SnapshotMetadata, SymbolDefinition,
    TypeDescription, VersionRequest, VersionResponse,
};
pub use bicep_transport::{ChannelMode, Transport, TransportError};
