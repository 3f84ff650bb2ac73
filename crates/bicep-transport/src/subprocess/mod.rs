//! Subprocess transport for CLI communication
//!
//! Spawns `bicep jsonrpc` and exchanges framed JSON-RPC messages with it
//! over stdin/stdout or, on unix, a private domain socket.

pub mod cli;
pub mod process;

pub use cli::CliTransport;
pub use process::{Channel, ChannelMode, ProcessConfig, ProcessHandle};
