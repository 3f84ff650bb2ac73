//! Bridge configuration

use crate::error::{BridgeError, Result};
use bicep_transport::{ChannelMode, ProcessConfig};
use std::path::PathBuf;

/// Environment variable holding the path of the CLI executable
pub const CLI_PATH_ENV: &str = "BICEP_CLI_PATH";

/// Environment variable selecting the channel mode (`stdio` or `pipe`)
pub const CHANNEL_ENV: &str = "BICEP_CHANNEL";

/// Configuration for a [`Bridge`](crate::Bridge)
///
/// Controls how the CLI process is started. The executable path normally
/// comes from whatever installed or located the CLI.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    process: ProcessConfig,
}

impl BridgeConfig {
    /// Configuration for the CLI at `cli_path` with default settings
    pub fn new(cli_path: impl Into<PathBuf>) -> Self {
        Self {
            process: ProcessConfig::new(cli_path),
        }
    }

    /// Read configuration from the environment
    ///
    /// `BICEP_CLI_PATH` is required; `BICEP_CHANNEL` is optional.
    pub fn from_env() -> Result<Self> {
        let cli_path = std::env::var_os(CLI_PATH_ENV)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| BridgeError::Config(format!("{} is not set", CLI_PATH_ENV)))?;

        let mut config = Self::new(cli_path);
        if let Ok(name) = std::env::var(CHANNEL_ENV) {
            let mode = ChannelMode::from_name(&name).ok_or_else(|| {
                BridgeError::Config(format!("unsupported {} value {:?}", CHANNEL_ENV, name))
            })?;
            config = config.with_mode(mode);
        }

        Ok(config)
    }

    /// Set the channel mode
    pub fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.process = self.process.with_mode(mode);
        self
    }

    /// Add an extra CLI argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.process = self.process.with_arg(arg);
        self
    }

    /// Replace the arguments placed before the channel flags
    ///
    /// Defaults to `jsonrpc`. Useful when the CLI is started through a host,
    /// for example `dotnet bicep.dll jsonrpc`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.process = self.process.with_args(args);
        self
    }

    /// Set an environment variable for the CLI
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.process = self.process.with_env(key, value);
        self
    }

    /// Start the CLI with only the variables set via [`with_env`](Self::with_env)
    pub fn with_env_clear(mut self, clear: bool) -> Self {
        self.process = self.process.with_env_clear(clear);
        self
    }

    /// Set the CLI's working directory
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.process = self.process.with_current_dir(dir);
        self
    }

    /// Path of the CLI executable
    pub fn cli_path(&self) -> &std::path::Path {
        &self.process.cli_path
    }

    /// The process configuration handed to the transport
    pub fn process_config(&self) -> &ProcessConfig {
        &self.process
    }

    pub(crate) fn into_process_config(self) -> ProcessConfig {
        self.process
    }
}
