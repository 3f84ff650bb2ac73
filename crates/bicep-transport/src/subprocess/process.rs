//! Process management for the CLI subprocess

use crate::error::{Result, TransportError};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child as TokioChild, Command};
use tracing::{debug, warn};

/// How the JSON-RPC channel to the CLI is established
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelMode {
    /// Frames over the child's stdin/stdout (`jsonrpc --stdio`)
    #[default]
    Stdio,

    /// Frames over a unix socket the CLI connects to (`jsonrpc --pipe <path>`)
    #[cfg(unix)]
    Pipe,
}

impl ChannelMode {
    /// Parse a mode name (`stdio` or `pipe`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            #[cfg(unix)]
            "pipe" => Some(Self::Pipe),
            _ => None,
        }
    }
}

/// Configuration for spawning the CLI process
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Path to the CLI executable
    pub cli_path: PathBuf,

    /// Arguments passed before the channel flags
    pub args: Vec<String>,

    /// How the channel is established
    pub mode: ChannelMode,

    /// Environment variables to set
    pub env: HashMap<String, String>,

    /// Start the child with an empty environment plus [`env`](Self::env)
    pub env_clear: bool,

    /// Working directory of the child
    pub current_dir: Option<PathBuf>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new("bicep")
    }
}

impl ProcessConfig {
    /// Create a new process configuration
    pub fn new(cli_path: impl Into<PathBuf>) -> Self {
        Self {
            cli_path: cli_path.into(),
            args: vec!["jsonrpc".to_string()],
            mode: ChannelMode::default(),
            env: HashMap::new(),
            env_clear: false,
            current_dir: None,
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the argument list
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the channel mode
    pub fn with_mode(mut self, mode: ChannelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Do not inherit the parent's environment
    ///
    /// Only variables set via [`with_env`](Self::with_env) reach the child.
    /// The CLI is a .NET program and typically needs at least `HOME` and
    /// `PATH`, so callers enabling this must pass those explicitly.
    pub fn with_env_clear(mut self, clear: bool) -> Self {
        self.env_clear = clear;
        self
    }

    /// Set the working directory
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn command(&self, channel_args: &[OsString]) -> Command {
        let mut cmd = Command::new(&self.cli_path);
        cmd.args(&self.args).args(channel_args);

        if self.env_clear {
            cmd.env_clear();
        }
        cmd.envs(&self.env);

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

/// The two halves of an established channel
pub struct Channel {
    /// Bytes from the CLI
    pub reader: Box<dyn AsyncRead + Send + Unpin>,

    /// Bytes to the CLI
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

/// Handle to a running CLI process
///
/// The child is spawned with kill-on-drop, so dropping the handle without
/// calling [`terminate`](Self::terminate) still ends the process.
pub struct ProcessHandle {
    child: TokioChild,
    // Holds the socket directory until the process is gone
    _socket_dir: Option<tempfile::TempDir>,
}

impl ProcessHandle {
    /// Spawn the CLI and establish the channel to it
    pub async fn spawn(config: ProcessConfig) -> Result<(Self, Channel)> {
        match config.mode {
            ChannelMode::Stdio => Self::spawn_stdio(config),
            #[cfg(unix)]
            ChannelMode::Pipe => Self::spawn_pipe(config).await,
        }
    }

    fn spawn_stdio(config: ProcessConfig) -> Result<(Self, Channel)> {
        let mut cmd = config.command(&[OsString::from("--stdio")]);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());

        let mut child = start(&mut cmd, &config.cli_path)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Connection("failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Connection("failed to get stdout".to_string()))?;
        forward_stderr(&mut child);

        debug!(pid = child.id(), cli = %config.cli_path.display(), "spawned CLI (stdio)");

        Ok((
            Self {
                child,
                _socket_dir: None,
            },
            Channel {
                reader: Box::new(stdout),
                writer: Box::new(stdin),
            },
        ))
    }

    #[cfg(unix)]
    async fn spawn_pipe(config: ProcessConfig) -> Result<(Self, Channel)> {
        let socket_dir = tempfile::Builder::new()
            .prefix("bicep-rpc-")
            .tempdir()
            .map_err(|e| {
                TransportError::Connection(format!("failed to create socket directory: {}", e))
            })?;
        let socket_path = socket_dir.path().join("cli.sock");
        let listener = tokio::net::UnixListener::bind(&socket_path).map_err(|e| {
            TransportError::Connection(format!(
                "failed to listen on {}: {}",
                socket_path.display(),
                e
            ))
        })?;

        let mut cmd = config.command(&[
            OsString::from("--pipe"),
            socket_path.clone().into_os_string(),
        ]);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());

        let mut child = start(&mut cmd, &config.cli_path)?;
        forward_stderr(&mut child);

        let stream = tokio::select! {
            accepted = listener.accept() => accepted
                .map(|(stream, _)| stream)
                .map_err(|e| TransportError::Connection(format!("failed to accept CLI connection: {}", e)))?,
            status = child.wait() => {
                let status = status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|e| e.to_string());
                return Err(TransportError::Connection(format!(
                    "CLI exited before connecting ({})",
                    status
                )));
            }
        };

        debug!(pid = child.id(), socket = %socket_path.display(), "CLI connected (pipe)");

        let (reader, writer) = stream.into_split();
        Ok((
            Self {
                child,
                _socket_dir: Some(socket_dir),
            },
            Channel {
                reader: Box::new(reader),
                writer: Box::new(writer),
            },
        ))
    }

    /// OS process id, if the process has not been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check if the process is still alive
    pub fn is_alive(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Kill the process and wait for it to exit
    pub async fn terminate(mut self) {
        // Fails only when the process already exited
        let _ = self.child.start_kill();
        match self.child.wait().await {
            Ok(status) => debug!(status = %status, "CLI process exited"),
            Err(e) => warn!(error = %e, "failed to reap CLI process"),
        }
    }
}

fn start(cmd: &mut Command, cli_path: &Path) -> Result<TokioChild> {
    cmd.spawn().map_err(|e| {
        TransportError::Connection(format!(
            "failed to start {}: {}",
            cli_path.display(),
            e
        ))
    })
}

fn forward_stderr(child: &mut TokioChild) {
    let Some(stderr) = child.stderr.take() else {
        return;
    };
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "bicep_transport::cli", "{}", line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_process_config_default() {
        let config = ProcessConfig::default();
        assert_eq!(config.cli_path, PathBuf::from("bicep"));
        assert_eq!(config.args, vec!["jsonrpc".to_string()]);
        assert_eq!(config.mode, ChannelMode::Stdio);
        assert!(!config.env_clear);
    }

    #[test]
    fn test_process_config_builder() {
        let config = ProcessConfig::new("/opt/bicep/bicep")
            .with_arg("--verbose")
            .with_env("DOTNET_CLI_TELEMETRY_OPTOUT", "1")
            .with_env_clear(true)
            .with_current_dir("/work");

        assert_eq!(config.cli_path, PathBuf::from("/opt/bicep/bicep"));
        assert_eq!(config.args, vec!["jsonrpc", "--verbose"]);
        assert_eq!(
            config.env.get("DOTNET_CLI_TELEMETRY_OPTOUT"),
            Some(&"1".to_string())
        );
        assert!(config.env_clear);
        assert_eq!(config.current_dir, Some(PathBuf::from("/work")));
    }

    #[rstest]
    #[case("stdio", Some(ChannelMode::Stdio))]
    #[case(" STDIO ", Some(ChannelMode::Stdio))]
    #[case("tcp", None)]
    fn test_channel_mode_from_name(#[case] name: &str, #[case] expected: Option<ChannelMode>) {
        assert_eq!(ChannelMode::from_name(name), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_mode_name() {
        assert_eq!(ChannelMode::from_name("pipe"), Some(ChannelMode::Pipe));
    }

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let config = ProcessConfig::new("/nonexistent/path/to/bicep");
        let result = ProcessHandle::spawn(config).await;

        match result {
            Err(TransportError::Connection(msg)) => assert!(msg.contains("/nonexistent")),
            Err(other) => panic!("expected Connection error, got {:?}", other),
            Ok(_) => panic!("expected spawn to fail"),
        }
    }
}
