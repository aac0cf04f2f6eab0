//! Pass-through validators
//!
//! These check values the daemon takes verbatim (keys, transaction
//! references, hex blobs, labels) so that a typo fails locally instead of
//! after a round trip. Apart from [`validate_label`], which turns numeric
//! labels into strings, they return the input unchanged.

use crate::amount::{parse_amount, AmountSpec};
use crate::error::{render_input, GrammarError, GrammarResult};
use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::secp256k1::PublicKey;
use bitcoin::OutPoint;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Constraints on a hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HexSpec {
    /// Exact decoded length in bytes, if fixed
    pub byte_len: Option<usize>,
}

impl HexSpec {
    pub fn any_length() -> Self {
        Self { byte_len: None }
    }

    pub fn bytes(len: usize) -> Self {
        Self { byte_len: Some(len) }
    }
}

/// `BLOCKxTXxOUTPUT` channel locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortChannelId {
    pub block: u32,
    pub tx_index: u32,
    pub output: u16,
}

impl ShortChannelId {
    /// Packed 64-bit form: 24 bits block, 24 bits tx index, 16 bits output
    pub fn to_u64(&self) -> u64 {
        ((self.block as u64) << 40) | ((self.tx_index as u64) << 16) | self.output as u64
    }
}

impl FromStr for ShortChannelId {
    type Err = GrammarError;

    fn from_str(s: &str) -> GrammarResult<Self> {
        let invalid = |reason: &str| GrammarError::value(s, reason);

        let mut parts = s.split('x');
        let (Some(block), Some(tx), Some(out), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected BLOCKxTXxOUTPUT"));
        };

        let number = |part: &str| -> GrammarResult<u64> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("expected BLOCKxTXxOUTPUT"));
            }
            part.parse::<u64>().map_err(|_| invalid("component out of range"))
        };

        let (block, tx, out) = (number(block)?, number(tx)?, number(out)?);
        if block >= 1 << 24 || tx >= 1 << 24 || out >= 1 << 16 {
            return Err(invalid("component out of range"));
        }

        Ok(Self {
            block: block as u32,
            tx_index: tx as u32,
            output: out as u16,
        })
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.block, self.tx_index, self.output)
    }
}

fn string<'a>(raw: &'a Value, what: &str) -> GrammarResult<&'a str> {
    raw.as_str()
        .ok_or_else(|| GrammarError::value(render_input(raw), format!("expected {}", what)))
}

pub fn validate_hex(raw: &Value, spec: &HexSpec) -> GrammarResult<Value> {
    let s = string(raw, "a hex string")?;
    let bytes = hex::decode(s).map_err(|e| GrammarError::value(s, e.to_string()))?;
    if let Some(expected) = spec.byte_len {
        if bytes.len() != expected {
            return Err(GrammarError::value(
                s,
                format!("expected {} bytes, got {}", expected, bytes.len()),
            ));
        }
    }
    Ok(raw.clone())
}

/// 33-byte compressed secp256k1 key, hex encoded
pub fn validate_pubkey(raw: &Value) -> GrammarResult<Value> {
    let s = string(raw, "a public key")?;
    parse_pubkey(s)?;
    Ok(raw.clone())
}

fn parse_pubkey(s: &str) -> GrammarResult<PublicKey> {
    if s.len() != 66 {
        return Err(GrammarError::value(s, "expected 66 hex characters"));
    }
    PublicKey::from_str(s).map_err(|e| GrammarError::value(s, e.to_string()))
}

pub fn validate_short_channel_id(raw: &Value) -> GrammarResult<Value> {
    let s = string(raw, "a short channel id")?;
    ShortChannelId::from_str(s)?;
    Ok(raw.clone())
}

/// A channel or peer reference: `all`, a short channel id, a 32-byte
/// channel id or a peer's public key
pub fn validate_channel_ref(raw: &Value) -> GrammarResult<Value> {
    let s = string(raw, "a channel reference")?;
    let valid = s == "all"
        || ShortChannelId::from_str(s).is_ok()
        || (s.len() == 64 && hex::decode(s).is_ok())
        || parse_pubkey(s).is_ok();
    if !valid {
        return Err(GrammarError::value(
            s,
            "expected all, a short channel id, a channel id or a node id",
        ));
    }
    Ok(raw.clone())
}

/// `txid:vout`
pub fn validate_utxo(raw: &Value) -> GrammarResult<Value> {
    let s = string(raw, "a txid:vout string")?;
    OutPoint::from_str(s).map_err(|e| GrammarError::value(s, e.to_string()))?;
    Ok(raw.clone())
}

pub fn validate_utxo_list(raw: &Value) -> GrammarResult<Value> {
    let items = raw
        .as_array()
        .ok_or_else(|| GrammarError::value(render_input(raw), "expected an array of txid:vout strings"))?;
    for item in items {
        validate_utxo(item)?;
    }
    Ok(raw.clone())
}

/// String or number; numbers are sent as their decimal text
pub fn validate_label(raw: &Value) -> GrammarResult<Value> {
    match raw {
        Value::String(_) => Ok(raw.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err(GrammarError::value(render_input(raw), "expected a string or a number")),
    }
}

pub fn validate_text(raw: &Value) -> GrammarResult<Value> {
    string(raw, "a string")?;
    Ok(raw.clone())
}

pub fn validate_bool(raw: &Value) -> GrammarResult<Value> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        _ => Err(GrammarError::value(render_input(raw), "expected true or false")),
    }
}

pub fn validate_u32(raw: &Value) -> GrammarResult<Value> {
    match raw.as_u64() {
        Some(n) if n <= u32::MAX as u64 => Ok(raw.clone()),
        _ => Err(GrammarError::value(render_input(raw), "expected an unsigned 32-bit integer")),
    }
}

pub fn validate_u64(raw: &Value) -> GrammarResult<Value> {
    match raw.as_u64() {
        Some(_) => Ok(raw.clone()),
        None => Err(GrammarError::value(render_input(raw), "expected an unsigned integer")),
    }
}

pub fn validate_text_list(raw: &Value) -> GrammarResult<Value> {
    let items = raw
        .as_array()
        .ok_or_else(|| GrammarError::value(render_input(raw), "expected an array of strings"))?;
    for item in items {
        validate_text(item)?;
    }
    Ok(raw.clone())
}

/// `true`, `false` or a block count
pub fn validate_bool_or_u32(raw: &Value) -> GrammarResult<Value> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        _ => validate_u32(raw)
            .map_err(|_| GrammarError::value(render_input(raw), "expected a boolean or a block count")),
    }
}

/// Withdrawal outputs: `[{address: amount}, ...]`
///
/// Each amount is a satoshi amount or `all`, and is rewritten to its
/// canonical `<n>sat` form. Addresses are checked for syntax only; the
/// daemon checks the network.
pub fn validate_outputs(raw: &Value) -> GrammarResult<Value> {
    let items = raw
        .as_array()
        .ok_or_else(|| GrammarError::value(render_input(raw), "expected an array of {address: amount} objects"))?;
    let spec = AmountSpec::sat().accepting_all();

    let mut outputs = Vec::with_capacity(items.len());
    for item in items {
        let entry = match item.as_object() {
            Some(object) if object.len() == 1 => object.iter().next(),
            _ => None,
        };
        let Some((address, amount)) = entry else {
            return Err(GrammarError::value(render_input(item), "expected a single {address: amount} pair"));
        };

        address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| GrammarError::value(address.as_str(), e.to_string()))?;
        let amount = parse_amount(amount, &spec)?;

        let mut output = Map::new();
        output.insert(address.clone(), Value::String(amount.encode(spec.unit)));
        outputs.push(Value::Object(output));
    }
    Ok(Value::Array(outputs))
}

/// Onion route for `createonion`: `[{pubkey, payload, style?}, ...]`
pub fn validate_onion_hops(raw: &Value) -> GrammarResult<Value> {
    let hops = raw
        .as_array()
        .ok_or_else(|| GrammarError::value(render_input(raw), "expected an array of hops"))?;
    if hops.is_empty() {
        return Err(GrammarError::value(render_input(raw), "route has no hops"));
    }

    for hop in hops {
        let object = hop
            .as_object()
            .ok_or_else(|| GrammarError::value(render_input(hop), "expected a hop object"))?;
        let missing = |key: &str| GrammarError::value(render_input(hop), format!("hop is missing {}", key));

        validate_pubkey(object.get("pubkey").ok_or_else(|| missing("pubkey"))?)?;
        validate_hex(object.get("payload").ok_or_else(|| missing("payload"))?, &HexSpec::any_length())?;
        match object.get("style") {
            None => {}
            Some(Value::String(style)) if style == "legacy" || style == "tlv" => {}
            Some(other) => return Err(GrammarError::value(render_input(other), "unknown hop style")),
        }
        if let Some(key) = object.keys().find(|k| !matches!(k.as_str(), "pubkey" | "payload" | "style")) {
            return Err(GrammarError::value(key.as_str(), "unknown hop field"));
        }
    }
    Ok(raw.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PUBKEY: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const TXID: &str = "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16";

    #[test]
    fn test_hex() {
        assert!(validate_hex(&json!("00ff"), &HexSpec::any_length()).is_ok());
        assert!(validate_hex(&json!(""), &HexSpec::any_length()).is_ok());
        assert!(validate_hex(&json!("0g"), &HexSpec::any_length()).is_err());
        assert!(validate_hex(&json!("abc"), &HexSpec::any_length()).is_err());
        assert!(validate_hex(&json!(TXID), &HexSpec::bytes(32)).is_ok());
        assert!(validate_hex(&json!("00ff"), &HexSpec::bytes(32)).is_err());
        assert!(validate_hex(&json!(12), &HexSpec::any_length()).is_err());
    }

    #[test]
    fn test_pubkey() {
        assert!(validate_pubkey(&json!(PUBKEY)).is_ok());
        // Right length, invalid prefix byte
        let bad_prefix = format!("05{}", &PUBKEY[2..]);
        assert!(validate_pubkey(&json!(bad_prefix)).is_err());
        assert!(validate_pubkey(&json!(&PUBKEY[..64])).is_err());
    }

    #[test]
    fn test_short_channel_id() {
        let scid: ShortChannelId = "103x1x0".parse().unwrap();
        assert_eq!(scid.block, 103);
        assert_eq!(scid.to_string(), "103x1x0");
        assert_eq!(scid.to_u64(), (103u64 << 40) | (1 << 16));

        assert!("16777215x16777215x65535".parse::<ShortChannelId>().is_ok());
        assert!("16777216x0x0".parse::<ShortChannelId>().is_err());
        assert!("1x1x65536".parse::<ShortChannelId>().is_err());
        assert!("1x1".parse::<ShortChannelId>().is_err());
        assert!("1x1x1x1".parse::<ShortChannelId>().is_err());
        assert!("1:1:1".parse::<ShortChannelId>().is_err());
        assert!("x1x1".parse::<ShortChannelId>().is_err());
    }

    #[test]
    fn test_channel_ref() {
        assert!(validate_channel_ref(&json!("all")).is_ok());
        assert!(validate_channel_ref(&json!("103x1x0")).is_ok());
        assert!(validate_channel_ref(&json!(TXID)).is_ok());
        assert!(validate_channel_ref(&json!(PUBKEY)).is_ok());
        assert!(validate_channel_ref(&json!("ALL")).is_err());
        assert!(validate_channel_ref(&json!("nope")).is_err());
    }

    #[test]
    fn test_utxo() {
        assert!(validate_utxo(&json!(format!("{}:0", TXID))).is_ok());
        assert!(validate_utxo(&json!(TXID)).is_err());
        assert!(validate_utxo(&json!(format!("{}:x", TXID))).is_err());

        let list = json!([format!("{}:0", TXID), format!("{}:1", TXID)]);
        assert!(validate_utxo_list(&list).is_ok());
        assert!(validate_utxo_list(&json!([format!("{}:0", TXID), "bad"])).is_err());
        assert!(validate_utxo_list(&json!(format!("{}:0", TXID))).is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(validate_label(&json!("coffee")).unwrap(), json!("coffee"));
        assert_eq!(validate_label(&json!(42)).unwrap(), json!("42"));
        assert!(validate_label(&json!(["a"])).is_err());
    }

    #[test]
    fn test_outputs_are_canonicalized() {
        let outputs = json!([
            {"bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4": "0.001btc"},
            {"1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2": "all"}
        ]);
        let canonical = validate_outputs(&outputs).unwrap();
        assert_eq!(
            canonical,
            json!([
                {"bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4": "100000sat"},
                {"1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2": "all"}
            ])
        );
    }

    #[test]
    fn test_outputs_rejects_bad_entries() {
        let address = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
        assert!(matches!(
            validate_outputs(&json!([{ address: "1500msat" }])),
            Err(GrammarError::InvalidAmount { .. })
        ));
        assert!(validate_outputs(&json!([{ "not-an-address": 1000 }])).is_err());
        assert!(validate_outputs(&json!([{ address: 1, "x": 2 }])).is_err());
        assert!(validate_outputs(&json!({ address: 1000 })).is_err());
    }

    #[test]
    fn test_onion_hops() {
        let hops = json!([
            {"pubkey": PUBKEY, "payload": "00"},
            {"pubkey": PUBKEY, "payload": "0a0b", "style": "legacy"}
        ]);
        assert!(validate_onion_hops(&hops).is_ok());
        assert!(validate_onion_hops(&json!([])).is_err());
        assert!(validate_onion_hops(&json!([{"pubkey": PUBKEY}])).is_err());
        assert!(validate_onion_hops(&json!([{"pubkey": "02", "payload": "00"}])).is_err());
        assert!(validate_onion_hops(&json!([{"pubkey": PUBKEY, "payload": "00", "extra": 1}])).is_err());
    }

    #[test]
    fn test_bool_or_u32_and_text_list() {
        assert!(validate_bool_or_u32(&json!(true)).is_ok());
        assert!(validate_bool_or_u32(&json!(144)).is_ok());
        assert!(validate_bool_or_u32(&json!("yes")).is_err());
        assert!(validate_text_list(&json!(["a", "b"])).is_ok());
        assert!(validate_text_list(&json!(["a", 1])).is_err());
    }

    #[test]
    fn test_scalars() {
        assert!(validate_bool(&json!(true)).is_ok());
        assert!(validate_bool(&json!("true")).is_err());
        assert!(validate_u32(&json!(4_294_967_295u64)).is_ok());
        assert!(validate_u32(&json!(4_294_967_296u64)).is_err());
        assert!(validate_u32(&json!(-1)).is_err());
        assert!(validate_u64(&json!(0)).is_ok());
        assert!(validate_u64(&json!("0")).is_err());
        assert!(validate_text(&json!("hi")).is_ok());
        assert!(validate_text(&json!(1)).is_err());
    }
}
