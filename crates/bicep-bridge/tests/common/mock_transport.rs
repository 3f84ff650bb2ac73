//! Scripted transport for testing the bridge without a CLI process
//!
//! Answers `bicep/version` from a settable version string, answers other
//! methods from canned results, and records every request it is sent.

use async_trait::async_trait;
use bicep_transport::{Result as TransportResult, Transport, TransportError};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A failure to return for a method
#[derive(Debug, Clone)]
pub enum Fault {
    /// JSON-RPC error object
    Rpc { code: i64, message: String },
    /// Broken channel
    Connection(String),
}

impl From<Fault> for TransportError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Rpc { code, message } => TransportError::Rpc { code, message },
            Fault::Connection(msg) => TransportError::Connection(msg),
        }
    }
}

#[derive(Default)]
struct Script {
    version: String,
    results: HashMap<String, Value>,
    faults: HashMap<String, Fault>,
    stalled: HashSet<String>,
    sent: Vec<(String, Value)>,
    disposed: bool,
}

/// A mock transport for testing bridge behavior in isolation
///
/// # Examples
///
/// ```rust,ignore
/// let transport = MockTransport::with_version("0.37.4");
/// transport.respond("bicep/format", json!({ "contents": "param x int\n" }));
///
/// let bridge = Bridge::connect(transport.clone()).await?;
/// bridge.format(&FormatRequest::new("/src/main.bicep")).await?;
///
/// assert_eq!(transport.sent_methods(), ["bicep/version", "bicep/format"]);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    dispose_calls: Arc<AtomicUsize>,
    disposed_signal: Arc<Notify>,
}

impl MockTransport {
    /// Create a transport whose CLI reports `version`
    pub fn with_version(version: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(Mutex::new(Script {
                version: version.to_string(),
                ..Default::default()
            })),
            dispose_calls: Arc::new(AtomicUsize::new(0)),
            disposed_signal: Arc::new(Notify::new()),
        })
    }

    /// Change the version reported from now on
    pub fn set_version(&self, version: &str) {
        self.script.lock().unwrap().version = version.to_string();
    }

    /// Answer `method` with `result`
    pub fn respond(&self, method: &str, result: Value) {
        self.script
            .lock()
            .unwrap()
            .results
            .insert(method.to_string(), result);
    }

    /// Fail `method` with `fault`
    pub fn fail(&self, method: &str, fault: Fault) {
        self.script
            .lock()
            .unwrap()
            .faults
            .insert(method.to_string(), fault);
    }

    /// Never answer `method`; the request resolves only when disposed
    pub fn stall(&self, method: &str) {
        self.script.lock().unwrap().stalled.insert(method.to_string());
    }

    /// Methods sent so far, in order
    pub fn sent_methods(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Params of the most recent request for `method`
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.script
            .lock()
            .unwrap()
            .sent
            .iter()
            .rev()
            .find(|(sent, _)| sent == method)
            .map(|(_, params)| params.clone())
    }

    /// Number of times `dispose` was called
    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_request(&self, method: &str, params: Value) -> TransportResult<Value> {
        let stalled = {
            let mut script = self.script.lock().unwrap();
            if script.disposed {
                return Err(TransportError::Disposed);
            }
            script.sent.push((method.to_string(), params));

            if let Some(fault) = script.faults.get(method) {
                return Err(fault.clone().into());
            }
            script.stalled.contains(method)
        };

        if stalled {
            // Register before re-checking so a concurrent dispose is not missed
            let notified = self.disposed_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let disposed = self.script.lock().unwrap().disposed;
            if !disposed {
                notified.await;
            }
            return Err(TransportError::Disposed);
        }

        let script = self.script.lock().unwrap();
        if method == "bicep/version" {
            return Ok(json!({ "version": script.version }));
        }
        script.results.get(method).cloned().ok_or_else(|| TransportError::Rpc {
            code: -32601,
            message: format!("Unhandled method '{}'", method),
        })
    }

    async fn dispose(&self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().disposed = true;
        self.disposed_signal.notify_waiters();
    }

    fn is_disposed(&self) -> bool {
        self.script.lock().unwrap().disposed
    }
}
