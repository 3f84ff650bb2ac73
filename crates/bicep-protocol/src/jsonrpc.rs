//! JSON-RPC 2.0 envelope
//!
//! Outgoing requests are always `{"jsonrpc":"2.0","id":N,"method":..,"params":..}`
//! with a numeric id chosen by the client. Incoming messages are decoded into
//! [`IncomingMessage`], which separates correlated responses from anything the
//! server sends on its own initiative.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version tag carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// A request sent from the bridge to the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`
    pub jsonrpc: String,

    /// Correlation id, unique per channel
    pub id: u64,

    /// Method wire name, e.g. `bicep/compile`
    pub method: String,

    /// Request payload (by-name parameters)
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a request envelope
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Serialize to the bytes of one frame body
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Error object returned by the CLI in place of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    /// JSON-RPC error code
    pub code: i64,

    /// Human-readable message
    pub message: String,

    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A response to one of our requests
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    /// Id of the originating request
    pub id: u64,

    /// `Ok(result)` or the error object sent by the CLI
    pub outcome: std::result::Result<Value, JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Build the wire form of this response
    ///
    /// The bridge never sends responses; this exists for peers written in
    /// Rust, such as in-process fakes of the CLI.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("jsonrpc".into(), Value::from(JSONRPC_VERSION));
        object.insert("id".into(), Value::from(self.id));
        match &self.outcome {
            Ok(result) => {
                object.insert("result".into(), result.clone());
            }
            Err(error) => {
                object.insert(
                    "error".into(),
                    serde_json::to_value(error).unwrap_or(Value::Null),
                );
            }
        }
        Value::Object(object)
    }
}

/// Any message read from the channel
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    /// Response correlated to a request we sent
    Response(JsonRpcResponse),

    /// Server-initiated request or notification (not used by the CLI today)
    ServerMessage {
        /// Method name sent by the server
        method: String,
        /// Id, present when the server expects an answer
        id: Option<Value>,
    },
}

impl IncomingMessage {
    /// Decode one frame body
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Decode an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::InvalidMessage(
                "expected a JSON object".to_string(),
            ));
        };

        if let Some(method) = object.get("method").and_then(Value::as_str) {
            return Ok(Self::ServerMessage {
                method: method.to_string(),
                id: object.remove("id"),
            });
        }

        let id = object
            .get("id")
            .ok_or_else(|| ProtocolError::MissingField("id".to_string()))
            .and_then(parse_id)?;

        let outcome = if let Some(error) = object.remove("error") {
            Err(serde_json::from_value::<JsonRpcErrorObject>(error)?)
        } else if let Some(result) = object.remove("result") {
            Ok(result)
        } else {
            return Err(ProtocolError::MissingField("result".to_string()));
        };

        Ok(Self::Response(JsonRpcResponse { id, outcome }))
    }
}

// Ids are numbers on our side, but some servers echo them back as strings.
fn parse_id(id: &Value) -> Result<u64> {
    match id {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ProtocolError::InvalidMessage(format!("unsupported id {}", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| ProtocolError::InvalidMessage(format!("unsupported id {:?}", s))),
        other => Err(ProtocolError::InvalidMessage(format!(
            "unsupported id {}",
            other
        ))),
    }
}
