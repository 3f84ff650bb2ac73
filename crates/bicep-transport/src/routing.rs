//! Request/response correlation
//!
//! [`MessageRouter`] owns both halves of a framed byte stream. Callers write
//! requests under a short-lived writer lock and then wait on a oneshot
//! channel keyed by the request id; a background task reads every incoming
//! frame and completes the matching waiter. Requests are therefore
//! pipelined: a slow response never holds up an unrelated one.

use crate::error::{Result, TransportError};
use crate::framing::{FrameReader, write_frame};
use crate::traits::Transport;
use async_trait::async_trait;
use bicep_protocol::{IncomingMessage, JsonRpcRequest};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type Waiter = oneshot::Sender<Result<Value>>;

/// Why the router stopped accepting requests
#[derive(Debug, Clone, PartialEq)]
enum Closed {
    Disposed,
    ConnectionLost(String),
}

impl Closed {
    fn to_error(&self) -> TransportError {
        match self {
            Closed::Disposed => TransportError::Disposed,
            Closed::ConnectionLost(reason) => TransportError::Connection(reason.clone()),
        }
    }
}

/// Waiters for in-flight requests
///
/// Registration and closing happen under the same lock, so a request can
/// never be registered after the router closed and then wait forever.
#[derive(Default)]
struct PendingRequests {
    waiters: HashMap<u64, Waiter>,
    closed: Option<Closed>,
}

impl PendingRequests {
    fn register(&mut self, id: u64) -> Result<oneshot::Receiver<Result<Value>>> {
        if let Some(closed) = &self.closed {
            return Err(closed.to_error());
        }
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(id, tx);
        Ok(rx)
    }

    fn complete(&mut self, id: u64, result: Result<Value>) -> bool {
        match self.waiters.remove(&id) {
            // The caller may have stopped waiting; nothing to do then
            Some(waiter) => {
                let _ = waiter.send(result);
                true
            }
            None => false,
        }
    }

    fn forget(&mut self, id: u64) {
        self.waiters.remove(&id);
    }

    /// Close and fail every waiter. The first reason wins.
    fn close(&mut self, reason: Closed) {
        if self.closed.is_none() {
            self.closed = Some(reason);
        }
        let Some(closed) = self.closed.clone() else {
            return;
        };
        for (_, waiter) in self.waiters.drain() {
            let _ = waiter.send(Err(closed.to_error()));
        }
    }
}

fn lock(pending: &Mutex<PendingRequests>) -> MutexGuard<'_, PendingRequests> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes the waiter if the caller stops waiting before a response arrives
struct WaiterGuard<'a> {
    pending: &'a Mutex<PendingRequests>,
    id: u64,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).forget(self.id);
    }
}

/// Closes the pending map however the reader task ends
///
/// Covers a normal end of stream, a panic while routing, and the task being
/// aborted. When the router was already closed the earlier reason stands.
struct CloseOnExit {
    pending: Arc<Mutex<PendingRequests>>,
    reason: Option<String>,
}

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        let reason = self
            .reason
            .take()
            .unwrap_or_else(|| "reader task stopped unexpectedly".to_string());

        let mut pending = lock(&self.pending);
        if pending.closed.is_none() {
            warn!(reason = %reason, outstanding = pending.waiters.len(), "channel closed");
        }
        pending.close(Closed::ConnectionLost(reason));
    }
}

/// Correlates JSON-RPC requests and responses over a framed byte stream
pub struct MessageRouter {
    writer: tokio::sync::Mutex<BoxedWriter>,
    pending: Arc<Mutex<PendingRequests>>,
    next_id: AtomicU64,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl MessageRouter {
    /// Start routing over the given stream halves
    ///
    /// Spawns the reader task, so this must be called inside a Tokio runtime.
    pub fn start<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending = Arc::new(Mutex::new(PendingRequests::default()));

        let reader_task = {
            let pending = Arc::clone(&pending);
            tokio::spawn(async move {
                Self::message_loop(FrameReader::new(reader), pending).await;
            })
        };

        Self {
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            reader_task: Mutex::new(Some(reader_task)),
        }
    }

    /// Send a request and wait for its response
    pub async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let receiver = lock(&self.pending).register(id)?;
        let _guard = WaiterGuard {
            pending: &self.pending,
            id,
        };

        let body = JsonRpcRequest::new(id, method, params).to_vec()?;
        debug!(id, method, bytes = body.len(), "sending request");

        {
            let mut writer = self.writer.lock().await;
            if let Err(err) = write_frame(&mut *writer, &body).await {
                // A write failing because we were disposed reports as such
                if let Some(closed) = &lock(&self.pending).closed {
                    return Err(closed.to_error());
                }
                return Err(match err {
                    TransportError::Io(e) => {
                        TransportError::Connection(format!("failed to write to CLI: {}", e))
                    }
                    other => other,
                });
            }
        }

        match receiver.await {
            Ok(result) => {
                debug!(id, method, ok = result.is_ok(), "received response");
                result
            }
            Err(_) => Err(lock(&self.pending)
                .closed
                .as_ref()
                .map_or(TransportError::Disposed, Closed::to_error)),
        }
    }

    /// Number of requests waiting for a response
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).waiters.len()
    }

    /// Whether the router no longer accepts requests
    pub fn is_closed(&self) -> bool {
        lock(&self.pending).closed.is_some()
    }

    /// Stop routing: fail outstanding requests with `Disposed` and stop the reader
    pub fn close(&self) {
        lock(&self.pending).close(Closed::Disposed);
        let task = self
            .reader_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    async fn message_loop<R: AsyncRead + Unpin>(
        mut frames: FrameReader<R>,
        pending: Arc<Mutex<PendingRequests>>,
    ) {
        let mut exit = CloseOnExit {
            pending,
            reason: None,
        };

        let reason = loop {
            match frames.read_frame().await {
                Ok(Some(body)) => Self::route(&body, &exit.pending),
                Ok(None) => break "CLI closed the channel".to_string(),
                Err(e) => break format!("failed to read from CLI: {}", e),
            }
        };
        exit.reason = Some(reason);
    }

    fn route(body: &[u8], pending: &Mutex<PendingRequests>) {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "dropping frame that is not JSON");
                return;
            }
        };
        let raw_id = value.get("id").and_then(Value::as_u64);

        match IncomingMessage::from_value(value) {
            Ok(IncomingMessage::Response(response)) => {
                let result = response
                    .outcome
                    .map_err(|error| TransportError::Rpc {
                        code: error.code,
                        message: error.message,
                    });
                if !lock(pending).complete(response.id, result) {
                    warn!(id = response.id, "dropping response for unknown request");
                }
            }
            Ok(IncomingMessage::ServerMessage { method, id }) => {
                debug!(method = %method, id = ?id, "ignoring server-initiated message");
            }
            Err(e) => match raw_id {
                Some(id) => {
                    lock(pending).complete(id, Err(e.into()));
                }
                None => warn!(error = %e, "dropping malformed message"),
            },
        }
    }
}

impl Drop for MessageRouter {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl Transport for MessageRouter {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        MessageRouter::send_request(self, method, params).await
    }

    async fn dispose(&self) {
        self.close();
        // Best effort: signal end of stream unless a write is in progress
        if let Ok(mut writer) = self.writer.try_lock() {
            let _ = writer.shutdown().await;
        }
    }

    fn is_disposed(&self) -> bool {
        lock(&self.pending).closed == Some(Closed::Disposed)
    }
}
