//! Observability client example
//!
//! Demonstrates OpenTelemetry tracing and metrics on the client side.
//!
//! Run with: cargo run --example observability_client -- /path/to/lightning-rpc

use clnwire::core::ObservabilityConfig;
use clnwire::ClientBuilder;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/root/.lightning/regtest/lightning-rpc".to_string());

    let otel_config = ObservabilityConfig::new("clnwire-observability-client")
        .with_endpoint("http://localhost:4317")
        .with_log_level("debug")
        .with_traces(true)
        .with_metrics(true);

    let client = ClientBuilder::new()
        .with_observability(otel_config)
        .service_name("observability-client")
        .connect_unix(&socket)
        .await?;

    println!("Connected; sending calls with tracing enabled...\n");

    for i in 1..=5u32 {
        tracing::info!(iteration = i, "Starting iteration");

        let result = client
            .call("setchannel", json!({"id": "all", "feeppm": i * 10, "enforcedelay": "5m"}))
            .await?;
        println!("Iteration {}: {}", i, result);
    }

    client.close().await?;
    clnwire::core::shutdown_observability();
    Ok(())
}
