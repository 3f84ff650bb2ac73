//! CLI transport implementation
//!
//! Owns the spawned CLI process together with the [`MessageRouter`] that
//! speaks JSON-RPC over its channel.

use crate::error::Result;
use crate::routing::MessageRouter;
use crate::traits::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use super::process::{ChannelMode, ProcessConfig, ProcessHandle};

/// JSON-RPC transport over a spawned Bicep CLI process
pub struct CliTransport {
    router: MessageRouter,
    process: Mutex<Option<ProcessHandle>>,
    disposed: AtomicBool,
}

impl CliTransport {
    /// Spawn the CLI and connect to it
    ///
    /// Fails with [`TransportError::Connection`](crate::TransportError::Connection)
    /// when the executable cannot be started or never connects. Nothing is
    /// left running on failure.
    pub async fn open(config: ProcessConfig) -> Result<Self> {
        let (process, channel) = ProcessHandle::spawn(config).await?;
        let router = MessageRouter::start(channel.reader, channel.writer);

        Ok(Self {
            router,
            process: Mutex::new(Some(process)),
            disposed: AtomicBool::new(false),
        })
    }

    /// Check if the process is still alive
    pub async fn is_alive(&self) -> bool {
        match self.process.lock().await.as_mut() {
            Some(process) => process.is_alive(),
            None => false,
        }
    }

    /// OS process id of the CLI
    pub async fn pid(&self) -> Option<u32> {
        self.process.lock().await.as_ref().and_then(ProcessHandle::id)
    }

    /// Number of requests waiting for a response
    pub fn pending_count(&self) -> usize {
        self.router.pending_count()
    }
}

#[async_trait]
impl Transport for CliTransport {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let result = self.router.send_request(method, params).await;
        if let Err(err) = &result {
            if err.is_fatal() && !self.is_disposed() {
                warn!(method, error = %err, "CLI channel failed");
            }
        }
        result
    }

    async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.router.close();

        // Concurrent callers queue here; only the first finds a process
        let process = self.process.lock().await.take();
        if let Some(process) = process {
            let pid = process.id();
            process.terminate().await;
            info!(pid, "CLI transport disposed");
        } else {
            debug!("CLI transport already disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

