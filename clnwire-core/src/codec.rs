//! Line codec for the daemon's framing
//!
//! Every message is one compact JSON document followed by `\n`. Compact
//! `serde_json` output never contains a raw newline (newlines inside strings
//! are escaped), so the terminator is unambiguous.
//!
//! On the read side blank lines are ignored: the daemon separates some
//! replies with an extra `\n`, and a line-oriented reader sees that as an
//! empty message.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_core::{codec, DaemonMessage, RpcRequest};
//! use serde_json::json;
//!
//! let line = codec::encode_line(&RpcRequest::new(1, "invoice", json!({}))).unwrap();
//! assert_eq!(line.last(), Some(&b'\n'));
//!
//! let message = codec::decode(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#).unwrap();
//! assert!(matches!(message, Some(DaemonMessage::Response(_))));
//! ```

use crate::error::{Error, Result};
use crate::types::{DaemonMessage, Notification, RpcRequest, RpcResponse};
use serde::Serialize;

/// Encode any serializable message as compact JSON (no terminator)
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request as one newline-terminated frame
pub fn encode_line(request: &RpcRequest) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(request).map_err(|e| Error::Serialization(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode one line read from the daemon
///
/// Returns `Ok(None)` for blank lines. Objects with a `method` and no `id`
/// are notifications; objects with an `id`, `result` or `error` are
/// responses. Anything else (including daemon-initiated requests, which
/// this client never expects) is a protocol error.
pub fn decode(line: &str) -> Result<Option<DaemonMessage>> {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed.trim().is_empty() {
        return Ok(None);
    }

    // Two-step decode: inspect the keys, then deserialize into the right shape
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| Error::Protocol(format!("invalid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::Protocol("expected a JSON object".to_string()))?;

    let has_method = object.contains_key("method");
    let has_id = object.contains_key("id");
    let has_outcome = object.contains_key("result") || object.contains_key("error");

    if has_method && !has_id {
        let notification: Notification =
            serde_json::from_value(value).map_err(|e| Error::Protocol(e.to_string()))?;
        return Ok(Some(DaemonMessage::Notification(notification)));
    }

    if has_method {
        return Err(Error::Protocol("unexpected request from daemon".to_string()));
    }

    if has_id || has_outcome {
        let response: RpcResponse =
            serde_json::from_value(value).map_err(|e| Error::Protocol(e.to_string()))?;
        return Ok(Some(DaemonMessage::Response(response)));
    }

    Err(Error::Protocol("neither a response nor a notification".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpcErrorData;
    use serde_json::json;

    #[test]
    fn test_encode_line_is_single_line() {
        let request = RpcRequest::new(
            9,
            "invoice",
            json!({"description": "line one\nline two", "label": "l"}),
        );
        let bytes = encode_line(&request).unwrap();

        let newlines = bytes.iter().filter(|b| **b == b'\n').count();
        assert_eq!(newlines, 1);
        assert_eq!(bytes.last(), Some(&b'\n'));

        let text = std::str::from_utf8(&bytes).unwrap();
        let decoded: RpcRequest = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_decode_success_response() {
        let msg = decode(r#"{"jsonrpc":"2.0","id":12,"result":{"bolt11":"lnbc1"}}"#)
            .unwrap()
            .unwrap();
        match msg {
            DaemonMessage::Response(response) => {
                assert_eq!(response.id, Some(12));
                assert_eq!(response.result, Some(json!({"bolt11": "lnbc1"})));
            }
            _ => panic!("Expected response"),
        }
    }

    #[test]
    fn test_decode_error_response() {
        let line = encode(&RpcResponse::failure(2, RpcErrorData::new(1301, "not found"))).unwrap();
        let msg = decode(&line).unwrap().unwrap();
        match msg {
            DaemonMessage::Response(response) => {
                assert_eq!(response.error.unwrap().code, 1301);
            }
            _ => panic!("Expected response"),
        }
    }

    #[test]
    fn test_decode_notification() {
        let msg = decode(r#"{"jsonrpc":"2.0","method":"message","params":{"message":"hi"}}"#)
            .unwrap()
            .unwrap();
        assert!(msg.is_notification());
    }

    #[test]
    fn test_decode_blank_lines() {
        assert!(decode("").unwrap().is_none());
        assert!(decode("\n").unwrap().is_none());
        assert!(decode("   \r\n").unwrap().is_none());
    }

    #[test]
    fn test_decode_rejects_junk() {
        assert!(matches!(decode("not json"), Err(Error::Protocol(_))));
        assert!(matches!(decode("[1,2]"), Err(Error::Protocol(_))));
        assert!(matches!(decode(r#"{"foo":1}"#), Err(Error::Protocol(_))));
        assert!(matches!(
            decode(r#"{"id":1,"method":"getinfo","params":{}}"#),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_decode_response_with_null_id() {
        let msg = decode(r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32600,"message":"bad"}}"#)
            .unwrap()
            .unwrap();
        match msg {
            DaemonMessage::Response(response) => assert!(response.id.is_none()),
            _ => panic!("Expected response"),
        }
    }
}
