//! clnwire - Lightning daemon RPC client core
//!
//! This is the main convenience crate that re-exports all clnwire sub-crates.
//! Use this crate if you want a single dependency for validating parameters
//! and calling a Lightning node daemon.
//!
//! # Architecture
//!
//! clnwire is organized into modular crates:
//!
//! - **clnwire-core**: Wire envelopes, line codec, error taxonomy, error mapper, observability
//! - **clnwire-schema**: Amount/feerate/duration grammars, command schemas, canonicalizer
//! - **clnwire-client**: Dispatcher with pending-call correlation over one stream
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clnwire::ClientBuilder;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new()
//!         .connect_unix("/home/user/.lightning/bitcoin/lightning-rpc")
//!         .await?;
//!
//!     let result = client
//!         .call("fundchannel", json!({"id": "02...", "amount": "0.01btc", "feerate": "normal"}))
//!         .await?;
//!     println!("Result: {}", result);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Validation only
//!
//! ```rust
//! use clnwire::schema::{canonicalize, Catalogue, ParamStyle};
//! use serde_json::json;
//!
//! let schema = Catalogue::builtin().get("txprepare").unwrap();
//! let input = json!({
//!     "outputs": [{"bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4": "0.001btc"}],
//!     "feerate": "urgent"
//! });
//! let bag = canonicalize(&schema, input.as_object().unwrap()).unwrap();
//! assert_eq!(
//!     bag.encode(ParamStyle::Named)["outputs"],
//!     json!([{"bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4": "100000sat"}])
//! );
//! ```

// Re-export all public APIs from sub-crates
pub use clnwire_client as client;
pub use clnwire_core as core;
pub use clnwire_schema as schema;

// Convenience re-exports of the most commonly used types
pub use clnwire_client::{ClientBuilder, DaemonClient};
pub use clnwire_core::{DaemonError, DaemonErrorKind, Error, Result, ValidationError};
pub use clnwire_schema::Catalogue;
