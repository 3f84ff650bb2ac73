//! The bridge client
//!
//! Provides [`Bridge`], which owns one CLI transport and exposes the CLI's
//! compiler operations as typed async methods.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::state::BridgeState;
use crate::version::VersionGate;
use bicep_protocol::{
    BASELINE_VERSION, CompileParamsRequest, CompileParamsResponse, CompileRequest,
    CompileResponse, FormatRequest, FormatResponse, GetDeploymentGraphRequest,
    GetDeploymentGraphResponse, GetFileReferencesRequest, GetFileReferencesResponse,
    GetMetadataRequest, GetMetadataResponse, GetSnapshotRequest, GetSnapshotResponse, RpcRequest,
    VersionRequest,
};
use bicep_transport::{CliTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Typed client for a running Bicep CLI
///
/// Created only through a successful handshake: the CLI is asked for its
/// version and must be at least [`BASELINE_VERSION`]. Operations take
/// `&self`, so one bridge can be shared between tasks behind an `Arc`;
/// concurrent requests are pipelined over the same channel.
///
/// # Example
///
/// ```no_run
/// # use bicep_bridge::{Bridge, CompileRequest};
/// # async fn example() -> bicep_bridge::Result<()> {
/// let bridge = Bridge::initialize("/usr/local/bin/bicep").await?;
/// let compiled = bridge.compile(&CompileRequest::new("/src/main.bicep")).await?;
/// if compiled.success {
///     println!("{}", compiled.contents.unwrap_or_default());
/// }
/// bridge.dispose().await;
/// # Ok(())
/// # }
/// ```
pub struct Bridge {
    transport: Arc<dyn Transport>,
    disposed: AtomicBool,
}

impl Bridge {
    /// Start the CLI at `cli_path` and connect to it
    pub async fn initialize(cli_path: impl Into<PathBuf>) -> Result<Self> {
        Self::initialize_with_config(BridgeConfig::new(cli_path)).await
    }

    /// Start the CLI with an explicit configuration and connect to it
    ///
    /// A CLI that cannot be started fails with [`BridgeError::Connection`]
    /// before any version check.
    pub async fn initialize_with_config(config: BridgeConfig) -> Result<Self> {
        let process_config = config.into_process_config();
        debug!(cli_path = %process_config.cli_path.display(), mode = ?process_config.mode, "starting Bicep CLI");

        let transport = CliTransport::open(process_config).await?;
        Self::connect(Arc::new(transport)).await
    }

    /// Run the handshake over an already open transport
    ///
    /// On any handshake failure the transport is disposed before the error
    /// is returned.
    pub async fn connect(transport: Arc<dyn Transport>) -> Result<Self> {
        let bridge = Self {
            transport,
            disposed: AtomicBool::new(false),
        };

        match bridge.handshake().await {
            Ok(version) => {
                info!(%version, "connected to Bicep CLI");
                Ok(bridge)
            }
            Err(err) => {
                warn!(error = %err, "Bicep CLI handshake failed");
                bridge.dispose().await;
                Err(err)
            }
        }
    }

    async fn handshake(&self) -> Result<String> {
        let version = self.version().await?;
        VersionGate::require(&version, BASELINE_VERSION)?;
        Ok(version)
    }

    /// Version string reported by the CLI
    pub async fn version(&self) -> Result<String> {
        self.ensure_ready()?;
        let response = self.dispatch(&VersionRequest::default()).await?;
        Ok(response.version)
    }

    /// Compile a `.bicep` file to an ARM template
    pub async fn compile(&self, request: &CompileRequest) -> Result<CompileResponse> {
        self.request(request).await
    }

    /// Compile a `.bicepparam` file, applying any parameter overrides
    pub async fn compile_params(
        &self,
        request: &CompileParamsRequest,
    ) -> Result<CompileParamsResponse> {
        self.request(request).await
    }

    /// Parameters, outputs, exports and metadata declared by a file
    pub async fn get_metadata(&self, request: &GetMetadataRequest) -> Result<GetMetadataResponse> {
        self.request(request).await
    }

    /// Resource dependency graph of a file
    pub async fn get_deployment_graph(
        &self,
        request: &GetDeploymentGraphRequest,
    ) -> Result<GetDeploymentGraphResponse> {
        self.request(request).await
    }

    /// Every file a compilation of the given file reads
    pub async fn get_file_references(
        &self,
        request: &GetFileReferencesRequest,
    ) -> Result<GetFileReferencesResponse> {
        self.request(request).await
    }

    /// Deployment snapshot of a `.bicepparam` file
    ///
    /// Requires CLI 0.36.1 or later.
    pub async fn get_snapshot(&self, request: &GetSnapshotRequest) -> Result<GetSnapshotResponse> {
        self.request(request).await
    }

    /// Formatted contents of a file
    ///
    /// Requires CLI 0.37.0 or later.
    pub async fn format(&self, request: &FormatRequest) -> Result<FormatResponse> {
        self.request(request).await
    }

    /// Send any typed request
    ///
    /// Methods with their own minimum version re-query the CLI version first
    /// and fail with [`BridgeError::UnsupportedVersion`] without sending
    /// anything when it is too old.
    pub async fn request<R: RpcRequest>(&self, request: &R) -> Result<R::Response> {
        self.ensure_ready()?;

        if let Some(minimum) = R::METHOD.minimum_version() {
            let version = self.version().await?;
            VersionGate::require(&version, minimum)?;
        }

        self.dispatch(request).await
    }

    async fn dispatch<R: RpcRequest>(&self, request: &R) -> Result<R::Response> {
        let method = R::METHOD.as_str();
        let params = serde_json::to_value(request).map_err(|e| {
            BridgeError::Protocol(format!("failed to serialize {} request: {}", method, e))
        })?;

        let result = self.transport.send_request(method, params).await?;

        serde_json::from_value(result).map_err(|e| {
            BridgeError::Protocol(format!("unexpected {} response: {}", method, e))
        })
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state().is_ready() {
            Ok(())
        } else {
            Err(BridgeError::Disposed)
        }
    }

    /// Shut down the CLI and release the channel
    ///
    /// Idempotent and never fails. Requests still in flight resolve with
    /// [`BridgeError::Disposed`].
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("disposing bridge");
        self.transport.dispose().await;
    }

    /// Current lifecycle state
    pub fn state(&self) -> BridgeState {
        if self.disposed.load(Ordering::Acquire) {
            BridgeState::Disposed
        } else {
            BridgeState::Ready
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
