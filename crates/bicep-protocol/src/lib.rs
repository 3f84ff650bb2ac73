//! Shared protocol types for talking to the Bicep CLI over JSON-RPC
//!
//! This crate holds the pure data side of the bridge: the JSON-RPC 2.0
//! envelope, the method identifiers the CLI understands, and the typed
//! request/response records for each method.
//!
//! # Type Organization
//!
//! - **Envelope**: [`jsonrpc`] - requests, responses, error objects
//! - **Methods**: [`methods`] - wire names and per-method minimum versions
//! - **Records**: [`types`] - compile, metadata, graph, snapshot, format payloads
//! - **Error types**: [`error`] - envelope decoding errors
//!
//! # Design Principles
//!
//! - **Zero I/O**: All types are pure data structures
//! - **Serialization**: serde-based, camelCase on the wire
//! - **Typed dispatch**: every request record names its method and response type through [`RpcRequest`]

//!
//! # Usage
//!
//! ```
//! use bicep_protocol::{CompileRequest, Method, RpcRequest};
//!
//! let request = CompileRequest::new("/src/main.bicep");
//! assert_eq!(CompileRequest::METHOD, Method::Compile);
//! assert_eq!(CompileRequest::METHOD.as_str(), "bicep/compile");
//! # let _ = request;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod jsonrpc;
pub mod methods;
pub mod types;

// Re-export commonly used types at crate level
pub use error::{ProtocolError, Result};
pub use jsonrpc::{
    IncomingMessage, JSONRPC_VERSION, JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse,
};
pub use methods::{BASELINE_VERSION, Method, RpcRequest};
pub use types::{
    CompileParamsRequest, CompileParamsResponse, CompileRequest, CompileResponse, Diagnostic,
    DiagnosticLevel, ExportDefinition, ExternalInputValue, FormatRequest, FormatResponse,
    GetDeploymentGraphRequest, GetDeploymentGraphResponse, GetFileReferencesRequest,
    GetFileReferencesResponse, GetMetadataRequest, GetMetadataResponse, GetSnapshotRequest,
    GetSnapshotResponse, GraphEdge, GraphNode, MetadataDefinition, Position, Range,
    SnapshotMetadata, SymbolDefinition, TypeDescription, VersionRequest, VersionResponse,
};
