//! Offline parameter canonicalization
//!
//! Prints what would be sent for a command without contacting a daemon.
//!
//! Run with: cargo run --example canonicalize -- fundchannel '{"id":"02...","amount":"0.01btc"}'

use clnwire::schema::{canonicalize_value, Catalogue, ParamStyle};
use serde_json::Value;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(method) = args.next() else {
        println!("commands: {}", Catalogue::builtin().methods().join(", "));
        return Ok(());
    };
    let params: Value = match args.next() {
        Some(text) => serde_json::from_str(&text)?,
        None => Value::Null,
    };

    let schema = Catalogue::builtin()
        .get(&method)
        .ok_or_else(|| format!("unknown command {}", method))?;

    match canonicalize_value(&schema, &params) {
        Ok(bag) => {
            println!("named:      {}", bag.encode(ParamStyle::Named));
            println!("positional: {}", bag.encode(ParamStyle::Positional));
        }
        Err(errors) => {
            for error in errors {
                println!("error: {}", error);
            }
        }
    }
    Ok(())
}
