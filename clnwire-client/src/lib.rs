//! JSON-RPC dispatcher for a Lightning node daemon
//!
//! This crate sends commands to the daemon's administrative interface over
//! one long-lived, newline-delimited JSON stream (normally the daemon's
//! local domain socket) and hands back typed results or structured errors.
//!
//! # Core Features
//!
//! - **Validated calls**: parameters are canonicalized against the command's
//!   schema before anything is written
//! - **Concurrent calls**: any number of requests in flight on one stream,
//!   answered in any order
//! - **Deadlines**: per-call or default timeouts
//! - **Notifications**: `message` and `progress` pushed by the daemon
//! - **Observability**: tracing spans and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clnwire_client::ClientBuilder;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new()
//!         .connect_unix("/home/user/.lightning/bitcoin/lightning-rpc")
//!         .await?;
//!
//!     let result = client
//!         .call("setchannel", json!({"id": "all", "feeppm": 10}))
//!         .await?;
//!     println!("Result: {}", result);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! ```rust,no_run
//! use clnwire_client::DaemonClient;
//! use clnwire_core::{DaemonErrorKind, Error};
//! use serde_json::json;
//!
//! # async fn example(client: &DaemonClient) {
//! match client.call("checkmessage", json!({"message": "hi", "zbase": "d6tq"})).await {
//!     Ok(result) => println!("verified: {}", result["verified"]),
//!     Err(Error::Validation { errors, .. }) => eprintln!("bad input: {}", errors),
//!     Err(Error::Daemon(e)) if e.kind == DaemonErrorKind::DomainNotFound => {
//!         eprintln!("key not in graph: {}", e.message)
//!     }
//!     Err(e) => eprintln!("call failed: {}", e),
//! }
//! # }
//! ```

mod builder;
mod client;
mod metrics;
pub mod notification;
mod request;

pub use builder::{ClientBuilder, ClientConfig};
pub use client::DaemonClient;
pub use metrics::ClientMetrics;
pub use notification::{NotificationFn, NotificationHandler};
