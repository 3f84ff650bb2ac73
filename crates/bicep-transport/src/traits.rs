//! Transport trait
//!
//! Defines the request/response interface the bridge is written against.
//! [`CliTransport`](crate::CliTransport) implements it over a spawned CLI
//! process; [`MessageRouter`](crate::MessageRouter) implements it over any
//! byte stream whose peer is owned elsewhere.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A correlated request/response channel
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for its correlated response
    ///
    /// Calls from different tasks may be in flight at the same time; each
    /// resolves with its own response regardless of the order in which the
    /// peer answers.
    async fn send_request(&self, method: &str, params: Value) -> Result<Value>;

    /// Close the channel and release everything it owns
    ///
    /// Idempotent. Outstanding requests resolve with
    /// [`TransportError::Disposed`](crate::TransportError::Disposed).
    async fn dispose(&self);

    /// Whether [`dispose`](Transport::dispose) has been called
    fn is_disposed(&self) -> bool;
}
