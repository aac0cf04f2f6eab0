//! Common test utilities for clnwire-client integration tests
//!
//! This module provides a scripted fake daemon and helpers for testing
//! client behavior without a running node.

#![allow(dead_code)]

use clnwire_client::{ClientBuilder, DaemonClient};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{
    duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

/// Node id used across tests (the secp256k1 generator point)
pub const NODE_ID: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

/// How long helpers wait for the client before giving up
const WAIT: Duration = Duration::from_secs(5);

/// Daemon end of an in-memory connection
///
/// Tests read the client's requests and write whatever lines they want,
/// in whatever order. Dropping it closes the connection.
pub struct FakeDaemon {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl FakeDaemon {
    /// Client with default settings connected to a fresh fake daemon
    pub fn pair() -> (DaemonClient, FakeDaemon) {
        Self::pair_with(ClientBuilder::new())
    }

    /// Client from `builder` connected to a fresh fake daemon
    pub fn pair_with(builder: ClientBuilder) -> (DaemonClient, FakeDaemon) {
        Self::pair_with_capacity(builder, 64 * 1024)
    }

    /// Like [`FakeDaemon::pair_with`] with `capacity` bytes of buffering each way
    ///
    /// A small capacity makes the client's writes block until the daemon reads.
    pub fn pair_with_capacity(builder: ClientBuilder, capacity: usize) -> (DaemonClient, FakeDaemon) {
        let (local, remote) = duplex(capacity);
        let client = builder.build(local).unwrap();
        let (read_half, writer) = tokio::io::split(remote);
        let daemon = FakeDaemon {
            lines: BufReader::new(read_half).lines(),
            writer,
        };
        (client, daemon)
    }

    /// Next request line from the client, parsed
    ///
    /// Returns `None` if the client closed its side or nothing arrived in time.
    pub async fn next_request(&mut self) -> Option<Value> {
        let line = tokio::time::timeout(WAIT, self.lines.next_line())
            .await
            .ok()?
            .ok()??;
        Some(serde_json::from_str(&line).expect("client sent invalid JSON"))
    }

    pub async fn expect_request(&mut self) -> Value {
        self.next_request().await.expect("no request from client")
    }

    /// Assert the client writes nothing for `wait`
    pub async fn assert_silent(&mut self, wait: Duration) {
        if let Ok(Ok(Some(line))) = tokio::time::timeout(wait, self.lines.next_line()).await {
            panic!("unexpected request: {}", line);
        }
    }

    /// Write one line (a newline is appended)
    pub async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Answer `request` with `result`
    pub async fn reply(&mut self, request: &Value, result: Value) {
        let id = request["id"].as_u64().expect("request without numeric id");
        self.send_line(&mock_response(id, result)).await;
    }
}

/// Helper to create a daemon response line
pub fn mock_response(id: u64, result: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
    .to_string()
}

/// Helper to create a daemon error response line
pub fn mock_error_response(id: u64, code: i64, message: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
    .to_string()
}

/// Helper to create a daemon notification line
pub fn mock_notification(method: &str, params: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    })
    .to_string()
}

/// Poll `check` until it holds or the wait runs out
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fake_daemon_pair() {
        let (client, mut daemon) = FakeDaemon::pair();
        assert_eq!(client.pending_count().await, 0);
        daemon.assert_silent(Duration::from_millis(20)).await;
    }

    #[test]
    fn test_mock_response_format() {
        let response = mock_response(1, json!({"value": 42}));
        assert!(response.contains("\"jsonrpc\":\"2.0\""));
        assert!(response.contains("\"id\":1"));
        assert!(response.contains("\"result\""));
    }

    #[test]
    fn test_mock_error_response_format() {
        let response = mock_error_response(1, 1301, "pubkey not found in the graph");
        assert!(response.contains("\"error\""));
        assert!(response.contains("1301"));
        assert!(response.contains("pubkey not found"));
    }

    #[test]
    fn test_mock_notification_format() {
        let notification = mock_notification("progress", json!({"num": 1, "total": 2}));
        assert!(notification.contains("\"method\":\"progress\""));
        assert!(notification.contains("\"params\""));
        assert!(!notification.contains("\"id\""));
    }
}
