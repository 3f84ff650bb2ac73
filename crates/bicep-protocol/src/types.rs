//! Request and response records for each CLI method
//!
//! Field names follow the CLI's camelCase wire format. Optional fields are
//! omitted on serialization when absent and tolerated when missing on input.

use crate::methods::{Method, RpcRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Zero-based position in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Line number
    pub line: u32,
    /// Character offset within the line
    pub char: u32,
}

/// Span in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start
    pub start: Position,
    /// Exclusive end
    pub end: Position,
}

/// Severity of a compiler diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error; compilation did not succeed
    Error,
}

/// A diagnostic reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File the diagnostic belongs to
    pub source: String,
    /// Location in that file
    pub range: Range,
    /// Severity
    pub level: DiagnosticLevel,
    /// Diagnostic code, e.g. `BCP035`
    pub code: String,
    /// Message text
    pub message: String,
}

impl Diagnostic {
    /// Whether this diagnostic is an error
    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

/// `bicep/version` request (empty object on the wire)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {}

/// `bicep/version` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Version string reported by the CLI
    pub version: String,
}

impl RpcRequest for VersionRequest {
    const METHOD: Method = Method::Version;
    type Response = VersionResponse;
}

/// `bicep/compile` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Path of the `.bicep` file
    pub path: String,
}

impl CompileRequest {
    /// Create a request for the given file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// `bicep/compile` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    /// Whether compilation produced a template
    pub success: bool,
    /// Diagnostics from all files involved
    pub diagnostics: Vec<Diagnostic>,
    /// Compiled ARM template JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl RpcRequest for CompileRequest {
    const METHOD: Method = Method::Compile;
    type Response = CompileResponse;
}

/// `bicep/compileParams` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileParamsRequest {
    /// Path of the `.bicepparam` file
    pub path: String,
    /// Parameter values replacing those in the file
    pub parameter_overrides: BTreeMap<String, Value>,
}

impl CompileParamsRequest {
    /// Create a request with no overrides
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parameter_overrides: BTreeMap::new(),
        }
    }

    /// Override a single parameter
    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameter_overrides.insert(name.into(), value.into());
        self
    }
}

/// `bicep/compileParams` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileParamsResponse {
    /// Whether compilation succeeded
    pub success: bool,
    /// Diagnostics from all files involved
    pub diagnostics: Vec<Diagnostic>,
    /// Parameters file JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    /// Template JSON, when the params file references a local template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Template spec id, when the params file references a template spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_spec_id: Option<String>,
}

impl RpcRequest for CompileParamsRequest {
    const METHOD: Method = Method::CompileParams;
    type Response = CompileParamsResponse;
}

/// `bicep/getMetadata` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMetadataRequest {
    /// Path of the `.bicep` file
    pub path: String,
}

impl GetMetadataRequest {
    /// Create a request for the given file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A `metadata` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDefinition {
    /// Metadata name
    pub name: String,
    /// Metadata value
    pub value: String,
}

/// Declared type of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Where the type is declared, for user-defined types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    /// Type name
    pub name: String,
}

/// A parameter or output declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// Declaration span
    pub range: Range,
    /// Symbol name
    pub name: String,
    /// Declared type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeDescription>,
    /// `@description` text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An `@export()`ed declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDefinition {
    /// Declaration span
    pub range: Range,
    /// Exported name
    pub name: String,
    /// Declaration kind, e.g. `Type`, `Variable`, `Function`
    pub kind: String,
    /// `@description` text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `bicep/getMetadata` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMetadataResponse {
    /// File-level metadata
    pub metadata: Vec<MetadataDefinition>,
    /// Parameter declarations
    pub parameters: Vec<SymbolDefinition>,
    /// Output declarations
    pub outputs: Vec<SymbolDefinition>,
    /// Exported declarations
    pub exports: Vec<ExportDefinition>,
}

impl RpcRequest for GetMetadataRequest {
    const METHOD: Method = Method::GetMetadata;
    type Response = GetMetadataResponse;
}

/// `bicep/getDeploymentGraph` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDeploymentGraphRequest {
    /// Path of the `.bicep` file
    pub path: String,
}

impl GetDeploymentGraphRequest {
    /// Create a request for the given file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A resource or module in the deployment graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Declaration span
    pub range: Range,
    /// Symbolic name
    pub name: String,
    /// Resource type, or `<module>` for modules
    #[serde(rename = "type")]
    pub type_: String,
    /// Whether the declaration uses `existing`
    pub is_existing: bool,
    /// Module path relative to the entry file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
}

/// A dependency between two graph nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Dependent node name
    pub source: String,
    /// Dependency node name
    pub target: String,
}

/// `bicep/getDeploymentGraph` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDeploymentGraphResponse {
    /// Graph nodes
    pub nodes: Vec<GraphNode>,
    /// Graph edges
    pub edges: Vec<GraphEdge>,
}

impl RpcRequest for GetDeploymentGraphRequest {
    const METHOD: Method = Method::GetDeploymentGraph;
    type Response = GetDeploymentGraphResponse;
}

/// `bicep/getFileReferences` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetFileReferencesRequest {
    /// Path of the entry file
    pub path: String,
}

impl GetFileReferencesRequest {
    /// Create a request for the given file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// `bicep/getFileReferences` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFileReferencesResponse {
    /// Every file the entry file transitively references
    pub file_paths: Vec<String>,
}

impl RpcRequest for GetFileReferencesRequest {
    const METHOD: Method = Method::GetFileReferences;
    type Response = GetFileReferencesResponse;
}

/// Deployment scope used to evaluate a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Tenant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Subscription id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Resource group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    /// Deployment location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,
}

/// Value supplied for an `externalInput()` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalInputValue {
    /// External input kind
    pub kind: String,
    /// Kind-specific configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// Value to substitute
    pub value: Value,
}

/// `bicep/getSnapshot` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSnapshotRequest {
    /// Path of the `.bicepparam` file
    pub path: String,
    /// Deployment scope
    pub metadata: SnapshotMetadata,
    /// Values for external inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_inputs: Option<Vec<ExternalInputValue>>,
}

impl GetSnapshotRequest {
    /// Create a request with empty scope metadata
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            metadata: SnapshotMetadata::default(),
            external_inputs: None,
        }
    }

    /// Set the deployment scope
    pub fn with_metadata(mut self, metadata: SnapshotMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add an external input value
    pub fn with_external_input(mut self, input: ExternalInputValue) -> Self {
        self.external_inputs.get_or_insert_with(Vec::new).push(input);
        self
    }
}

/// `bicep/getSnapshot` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSnapshotResponse {
    /// Snapshot JSON
    pub snapshot: String,
}

impl RpcRequest for GetSnapshotRequest {
    const METHOD: Method = Method::GetSnapshot;
    type Response = GetSnapshotResponse;
}

/// `bicep/format` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequest {
    /// Path of the file to format
    pub path: String,
}

impl FormatRequest {
    /// Create a request for the given file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// `bicep/format` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatResponse {
    /// Formatted source
    pub contents: String,
}

impl RpcRequest for FormatRequest {
    const METHOD: Method = Method::Format;
    type Response = FormatResponse;
}
