//! Wire layer for talking to a Lightning node daemon
//!
//! This crate holds everything the other clnwire crates agree on:
//!
//! - **Types**: request, response and notification envelopes
//! - **Codec**: newline-delimited JSON framing
//! - **Errors**: the local/transport/daemon error taxonomy
//! - **Error mapping**: classification of daemon error codes
//! - **Observability**: `tracing` subscriber and OTLP export setup
//!
//! It performs no I/O of its own; `clnwire-client` owns the transport and
//! `clnwire-schema` owns parameter validation.
//!
//! # Example
//!
//! ```rust
//! use clnwire_core::{codec, DaemonMessage, RpcRequest};
//! use serde_json::json;
//!
//! let frame = codec::encode_line(&RpcRequest::new(1, "checkmessage", json!({"message": "hi"}))).unwrap();
//! assert!(frame.ends_with(b"\n"));
//!
//! match codec::decode(r#"{"jsonrpc":"2.0","id":1,"result":{"verified":true}}"#).unwrap() {
//!     Some(DaemonMessage::Response(response)) => assert_eq!(response.id, Some(1)),
//!     _ => unreachable!(),
//! }
//! ```

pub mod codec;
pub mod error;
pub mod error_map;
pub mod observability;
pub mod types;

pub use error::{
    DaemonError, DaemonErrorKind, Error, Result, RpcErrorData, ValidationError, ValidationErrors,
};
pub use error_map::{map_error, ErrorMapper};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{DaemonMessage, Notification, RpcRequest, RpcResponse};
