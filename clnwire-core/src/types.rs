//! Envelopes exchanged with the daemon
//!
//! The daemon speaks a JSON-RPC 2.0 dialect over a byte stream, one JSON
//! object per line. Three shapes travel on the wire:
//!
//! 1. **Request** (client → daemon): `{jsonrpc, id, method, params}`
//! 2. **Response** (daemon → client): `{jsonrpc, id, result}` or `{jsonrpc, id, error}`
//! 3. **Notification** (daemon → client): `{jsonrpc, method, params}` with no `id`
//!
//! Request ids are plain `u64` counters assigned by the client; a response
//! carries the id of exactly one request.

use crate::error::RpcErrorData;
use serde::{Deserialize, Serialize};

fn jsonrpc_version() -> String {
    "2.0".to_string()
}

/// Request envelope
///
/// `params` is either a JSON object (name-keyed) or a JSON array
/// (positional); the daemon accepts both.
///
/// # Examples
///
/// ```rust
/// use clnwire_core::RpcRequest;
/// use serde_json::json;
///
/// let request = RpcRequest::new(1, "checkmessage", json!({"message": "hi", "zbase": "d6tq"}));
/// assert_eq!(request.jsonrpc, "2.0");
/// assert_eq!(request.id, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Connection-unique, strictly increasing identifier
    pub id: u64,
    /// Command name
    pub method: String,
    /// Canonical parameters
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Response envelope
///
/// Exactly one of `result` and `error` is present in a well-formed response;
/// [`RpcResponse::into_result`] enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    /// Id of the request this answers; `None` when the daemon could not
    /// determine it (unparseable request)
    #[serde(default)]
    pub id: Option<u64>,
    /// An explicit `null` result is kept as `Some(Value::Null)`
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorData>,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl RpcResponse {
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: RpcErrorData) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id: Some(id),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Split into the result value or the wire error
    ///
    /// A response with neither member is a protocol violation and is reported
    /// as an `Err` carrying `None`.
    pub fn into_result(self) -> std::result::Result<serde_json::Value, Option<RpcErrorData>> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(Some(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(None),
        }
    }
}

/// Id-less message pushed by the daemon (log lines, progress reports)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params,
        }
    }
}

/// Anything the daemon can send on the read side
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonMessage {
    Response(RpcResponse),
    Notification(Notification),
}

impl DaemonMessage {
    pub fn is_response(&self) -> bool {
        matches!(self, DaemonMessage::Response(_))
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, DaemonMessage::Notification(_))
    }
}
