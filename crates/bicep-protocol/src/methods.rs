//! Method identifiers and capability gates
//!
//! Every operation the CLI exposes is named here together with the minimum
//! CLI version that implements it. Methods without their own minimum are
//! covered by [`BASELINE_VERSION`], which the bridge enforces once during
//! its handshake.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Minimum CLI version for any use of the JSON-RPC interface
pub const BASELINE_VERSION: &str = "0.25.3";

/// A JSON-RPC method understood by the Bicep CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `bicep/version`
    Version,
    /// `bicep/compile`
    Compile,
    /// `bicep/compileParams`
    CompileParams,
    /// `bicep/getMetadata`
    GetMetadata,
    /// `bicep/getDeploymentGraph`
    GetDeploymentGraph,
    /// `bicep/getFileReferences`
    GetFileReferences,
    /// `bicep/getSnapshot`
    GetSnapshot,
    /// `bicep/format`
    Format,
}

impl Method {
    /// All methods, in protocol order
    pub const ALL: [Method; 8] = [
        Method::Version,
        Method::Compile,
        Method::CompileParams,
        Method::GetMetadata,
        Method::GetDeploymentGraph,
        Method::GetFileReferences,
        Method::GetSnapshot,
        Method::Format,
    ];

    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Version => "bicep/version",
            Method::Compile => "bicep/compile",
            Method::CompileParams => "bicep/compileParams",
            Method::GetMetadata => "bicep/getMetadata",
            Method::GetDeploymentGraph => "bicep/getDeploymentGraph",
            Method::GetFileReferences => "bicep/getFileReferences",
            Method::GetSnapshot => "bicep/getSnapshot",
            Method::Format => "bicep/format",
        }
    }

    /// Per-method minimum CLI version, beyond the baseline
    pub fn minimum_version(&self) -> Option<&'static str> {
        match self {
            Method::GetSnapshot => Some("0.36.1"),
            Method::Format => Some("0.37.0"),
            _ => None,
        }
    }

    /// Look up a method by its wire name
    pub fn from_wire(name: &str) -> Option<Method> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed request record
///
/// Ties a request payload to the method that carries it and to the shape of
/// the response, so dispatch can be written once for all operations.
pub trait RpcRequest: Serialize + Send + Sync {
    /// Method this record is sent with
    const METHOD: Method;

    /// Shape of a successful result
    type Response: DeserializeOwned + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Method::Version, "bicep/version")]
    #[case(Method::CompileParams, "bicep/compileParams")]
    #[case(Method::GetDeploymentGraph, "bicep/getDeploymentGraph")]
    #[case(Method::Format, "bicep/format")]
    fn test_wire_names(#[case] method: Method, #[case] wire: &str) {
        assert_eq!(method.as_str(), wire);
        assert_eq!(Method::from_wire(wire), Some(method));
    }

    #[test]
    fn test_only_snapshot_and_format_are_gated() {
        let gated: Vec<_> = Method::ALL
            .into_iter()
            .filter_map(|m| m.minimum_version().map(|v| (m, v)))
            .collect();

        assert_eq!(
            gated,
            vec![(Method::GetSnapshot, "0.36.1"), (Method::Format, "0.37.0")]
        );
    }

    #[test]
    fn test_unknown_wire_name() {
        assert_eq!(Method::from_wire("bicep/decompile"), None);
    }
}
