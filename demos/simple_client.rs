//! Simple daemon client example
//!
//! Run with: cargo run --example simple_client -- /path/to/lightning-rpc

use clnwire::schema::responses::{InvoiceResponse, SetChannelResponse};
use clnwire::{ClientBuilder, Error};
use serde_json::json;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let socket = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/root/.lightning/regtest/lightning-rpc".to_string());
    println!("Connecting to daemon at {}", socket);

    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .connect_unix(&socket)
        .await?;

    println!("Connected! Sending requests...\n");

    // Amounts accept any unit; the daemon receives canonical millisatoshi
    let invoice: InvoiceResponse = client
        .call_typed(
            "invoice",
            json!({"msatoshi": "0.0001btc", "label": "example", "description": "clnwire example", "expiry": "1h"}),
        )
        .await?;
    println!("invoice: {}", invoice.bolt11);
    for (name, text) in invoice.warnings.present() {
        println!("  {}: {}", name, text);
    }

    // Raise fees on every channel
    let policy: SetChannelResponse = client
        .call_typed("setchannel", json!({"id": "all", "feebase": "1sat", "feeppm": 100}))
        .await?;
    println!("updated {} channels", policy.channels.len());

    // Bad input never reaches the daemon
    match client.call("fundchannel", json!({"amount": "lots"})).await {
        Err(Error::Validation { errors, .. }) => println!("rejected locally: {}", errors),
        other => println!("unexpected: {:?}", other),
    }

    // Daemon errors come back classified
    match client
        .call("invoice", json!({"msatoshi": "any", "label": "example", "description": "again"}))
        .await
    {
        Err(Error::Daemon(e)) => println!("daemon said {} ({}): {}", e.kind, e.code, e.message),
        other => println!("unexpected: {:?}", other),
    }

    client.close().await?;
    Ok(())
}
