//! Typed results for the catalogued commands
//!
//! These mirror the daemon's result objects. Unknown members are ignored so
//! newer daemons with extra fields still decode. Millisatoshi values arrive
//! either as plain numbers or as `"<n>msat"` strings depending on the daemon
//! version; [`Msat`] accepts both.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Millisatoshi quantity in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Msat(pub u64);

impl Msat {
    pub fn msat(&self) -> u64 {
        self.0
    }

    /// Whole satoshi, rounding down
    pub fn sat(&self) -> u64 {
        self.0 / 1000
    }
}

impl fmt::Display for Msat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}msat", self.0)
    }
}

impl<'de> Deserialize<'de> for Msat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .map(Msat)
                .ok_or_else(|| D::Error::custom(format!("invalid msat amount {}", n))),
            Value::String(s) => s
                .strip_suffix("msat")
                .and_then(|digits| digits.parse::<u64>().ok())
                .map(Msat)
                .ok_or_else(|| D::Error::custom(format!("invalid msat amount {:?}", s))),
            other => Err(D::Error::custom(format!("invalid msat amount {}", other))),
        }
    }
}

/// Advisory warnings attached to a freshly created invoice
///
/// Each is present only when the daemon found the condition; the text is
/// the daemon's explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceWarnings {
    /// No channel has enough incoming capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_capacity: Option<String>,
    /// Every channel with capacity is a dead end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_deadends: Option<String>,
    /// Enough capacity only if the payer splits the payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_mpp: Option<String>,
    /// Capacity exists only through offline peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_offline: Option<String>,
    /// Capacity exists only through private channels not exposed in the invoice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_private_unused: Option<String>,
}

impl InvoiceWarnings {
    /// `(name, text)` of every warning present
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("warning_capacity", &self.warning_capacity),
            ("warning_deadends", &self.warning_deadends),
            ("warning_mpp", &self.warning_mpp),
            ("warning_offline", &self.warning_offline),
            ("warning_private_unused", &self.warning_private_unused),
        ]
        .into_iter()
        .filter_map(|(name, text)| text.as_deref().map(|t| (name, t)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub bolt11: String,
    pub payment_hash: String,
    pub payment_secret: String,
    pub expires_at: u64,
    #[serde(flatten)]
    pub warnings: InvoiceWarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Expired,
    Unpaid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceResponse {
    pub label: String,
    #[serde(default)]
    pub bolt11: Option<String>,
    #[serde(default)]
    pub bolt12: Option<String>,
    pub payment_hash: String,
    #[serde(default)]
    pub amount_msat: Option<Msat>,
    pub status: InvoiceStatus,
    pub description: String,
    pub expires_at: u64,
    #[serde(default)]
    pub pay_index: Option<u64>,
    #[serde(default)]
    pub amount_received_msat: Option<Msat>,
    #[serde(default)]
    pub paid_at: Option<u64>,
    #[serde(default)]
    pub payment_preimage: Option<String>,
    #[serde(default)]
    pub local_offer_id: Option<String>,
    #[serde(default)]
    pub payer_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMessageResponse {
    pub pubkey: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundChannelResponse {
    pub tx: String,
    pub txid: String,
    pub outnum: u32,
    pub channel_id: String,
    #[serde(default)]
    pub close_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundChannelStartResponse {
    pub funding_address: String,
    pub scriptpubkey: String,
    #[serde(default)]
    pub close_to: Option<String>,
}

/// Resulting policy for one channel touched by `setchannel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPolicy {
    pub peer_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub short_channel_id: Option<String>,
    pub fee_base_msat: Msat,
    pub fee_proportional_millionths: u32,
    pub minimum_htlc_out_msat: Msat,
    pub maximum_htlc_out_msat: Msat,
    /// The requested minimum was below the peer's and was raised
    #[serde(default)]
    pub warning_htlcmin_too_low: Option<String>,
    /// The requested maximum exceeded the channel and was lowered
    #[serde(default)]
    pub warning_htlcmax_too_high: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetChannelResponse {
    pub channels: Vec<ChannelPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPrepareResponse {
    pub psbt: String,
    pub txid: String,
    pub unsigned_tx: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub txid: String,
    pub vout: u32,
    pub was_reserved: bool,
    pub reserved: bool,
    pub reserved_to_block: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoPsbtResponse {
    pub psbt: String,
    pub feerate_per_kw: u32,
    pub estimated_final_weight: u32,
    pub excess_msat: Msat,
    #[serde(default)]
    pub change_outnum: Option<u32>,
    #[serde(default)]
    pub reservations: Option<Vec<Reservation>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOnionResponse {
    pub onion: String,
    pub shared_secrets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_msat_both_forms() {
        assert_eq!(serde_json::from_value::<Msat>(json!(1500)).unwrap(), Msat(1500));
        assert_eq!(serde_json::from_value::<Msat>(json!("1500msat")).unwrap(), Msat(1500));
        assert!(serde_json::from_value::<Msat>(json!("1500sat")).is_err());
        assert!(serde_json::from_value::<Msat>(json!(-1)).is_err());
        assert_eq!(serde_json::to_value(Msat(7)).unwrap(), json!(7));
        assert_eq!(Msat(2500).sat(), 2);
    }

    #[test]
    fn test_invoice_with_warnings() {
        let response: InvoiceResponse = serde_json::from_value(json!({
            "bolt11": "lnbcrt1",
            "payment_hash": "00",
            "payment_secret": "11",
            "expires_at": 1_700_000_000u64,
            "warning_capacity": "Insufficient incoming channel capacity",
            "warning_mpp": "Would need multi-part payment"
        }))
        .unwrap();

        assert_eq!(
            response.warnings.present(),
            [
                ("warning_capacity", "Insufficient incoming channel capacity"),
                ("warning_mpp", "Would need multi-part payment")
            ]
        );
        assert!(response.warnings.warning_offline.is_none());
    }

    #[test]
    fn test_invoice_without_warnings() {
        let response: InvoiceResponse = serde_json::from_value(json!({
            "bolt11": "lnbcrt1",
            "payment_hash": "00",
            "payment_secret": "11",
            "expires_at": 1
        }))
        .unwrap();
        assert!(response.warnings.is_empty());

        let encoded = serde_json::to_value(&response).unwrap();
        assert!(encoded.get("warning_capacity").is_none());
    }

    #[test]
    fn test_setchannel_response() {
        let response: SetChannelResponse = serde_json::from_value(json!({
            "channels": [{
                "peer_id": "02aa",
                "channel_id": "ff",
                "short_channel_id": "103x1x0",
                "fee_base_msat": "1000msat",
                "fee_proportional_millionths": 10,
                "minimum_htlc_out_msat": 0,
                "maximum_htlc_out_msat": "990000000msat",
                "warning_htlcmax_too_high": "Set maximum_htlc_out_msat to maximum possible in channel"
            }]
        }))
        .unwrap();

        let channel = &response.channels[0];
        assert_eq!(channel.fee_base_msat, Msat(1000));
        assert_eq!(channel.maximum_htlc_out_msat, Msat(990_000_000));
        assert!(channel.warning_htlcmax_too_high.is_some());
        assert!(channel.warning_htlcmin_too_low.is_none());
    }

    #[test]
    fn test_createinvoice_status() {
        let response: CreateInvoiceResponse = serde_json::from_value(json!({
            "label": "l",
            "bolt11": "lnbc",
            "payment_hash": "00",
            "status": "unpaid",
            "description": "coffee",
            "expires_at": 10,
            "amount_msat": 5000
        }))
        .unwrap();
        assert_eq!(response.status, InvoiceStatus::Unpaid);
        assert_eq!(response.amount_msat, Some(Msat(5000)));
        assert!(response.bolt12.is_none());
    }

    #[test]
    fn test_utxopsbt_reservations() {
        let response: UtxoPsbtResponse = serde_json::from_value(json!({
            "psbt": "cHNidP8=",
            "feerate_per_kw": 253,
            "estimated_final_weight": 600,
            "excess_msat": "0msat",
            "reservations": [{
                "txid": "aa",
                "vout": 1,
                "was_reserved": false,
                "reserved": true,
                "reserved_to_block": 172
            }]
        }))
        .unwrap();
        assert_eq!(response.reservations.unwrap()[0].reserved_to_block, 172);
        assert!(response.change_outnum.is_none());
    }
}
