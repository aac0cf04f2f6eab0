//! Per-command parameter schemas
//!
//! A [`ParameterSchema`] is the ordered list of fields a command takes. The
//! order matters twice: it is the order validation errors are reported in,
//! and it is the position of each field when parameters are sent as a JSON
//! array.
//!
//! Schemas are built once with the builder methods and not modified
//! afterwards; the catalogue hands them out behind an `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_schema::{AmountSpec, Grammar, ParameterSchema};
//! use serde_json::json;
//!
//! let schema = ParameterSchema::new("pay")
//!     .required("bolt11", Grammar::Text)
//!     .optional("amount_msat", Grammar::Amount(AmountSpec::msat()))
//!     .optional_with_default("retry_for", Grammar::Duration, json!(60));
//!
//! assert_eq!(schema.position("amount_msat"), Some(1));
//! assert!(schema.field("bolt11").unwrap().required);
//! ```

use crate::amount::{parse_amount, AmountSpec};
use crate::canonical::CanonicalValue;
use crate::duration::parse_duration;
use crate::error::GrammarResult;
use crate::feerate::{parse_feerate, FeerateSpec};
use crate::validate::{self, HexSpec};
use clnwire_core::DaemonErrorKind;
use serde_json::Value;

/// How a field's raw value is validated and canonicalized
#[derive(Debug, Clone, PartialEq)]
pub enum Grammar {
    Amount(AmountSpec),
    Feerate(FeerateSpec),
    Duration,
    Hex(HexSpec),
    /// Passed through untouched
    Raw,
    PubKey,
    ShortChannelId,
    /// `all`, short channel id, channel id or node id
    ChannelRef,
    /// `txid:vout`
    Utxo,
    UtxoList,
    /// String or number, sent as a string
    Label,
    Text,
    TextList,
    Bool,
    /// Boolean or block count
    BoolOrU32,
    U32,
    U64,
    /// `[{address: amount}]` withdrawal outputs
    Outputs,
    /// `createonion` route
    OnionHops,
}

impl Grammar {
    /// Validate `raw` and produce its canonical value
    pub fn apply(&self, raw: &Value) -> GrammarResult<CanonicalValue> {
        let json = match self {
            Grammar::Amount(spec) => {
                return parse_amount(raw, spec).map(|literal| CanonicalValue::Amount {
                    literal,
                    unit: spec.unit,
                })
            }
            Grammar::Feerate(spec) => return parse_feerate(raw, spec).map(CanonicalValue::Feerate),
            Grammar::Duration => return parse_duration(Some(raw), 0).map(CanonicalValue::Duration),
            Grammar::Hex(spec) => validate::validate_hex(raw, spec)?,
            Grammar::Raw => raw.clone(),
            Grammar::PubKey => validate::validate_pubkey(raw)?,
            Grammar::ShortChannelId => validate::validate_short_channel_id(raw)?,
            Grammar::ChannelRef => validate::validate_channel_ref(raw)?,
            Grammar::Utxo => validate::validate_utxo(raw)?,
            Grammar::UtxoList => validate::validate_utxo_list(raw)?,
            Grammar::Label => validate::validate_label(raw)?,
            Grammar::Text => validate::validate_text(raw)?,
            Grammar::TextList => validate::validate_text_list(raw)?,
            Grammar::Bool => validate::validate_bool(raw)?,
            Grammar::BoolOrU32 => validate::validate_bool_or_u32(raw)?,
            Grammar::U32 => validate::validate_u32(raw)?,
            Grammar::U64 => validate::validate_u64(raw)?,
            Grammar::Outputs => validate::validate_outputs(raw)?,
            Grammar::OnionHops => validate::validate_onion_hops(raw)?,
        };
        Ok(CanonicalValue::Json(json))
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub grammar: Grammar,
    pub required: bool,
    /// Value used when the caller omits the field
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>, grammar: Grammar) -> Self {
        Self {
            name: name.into(),
            grammar,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, grammar: Grammar) -> Self {
        Self {
            name: name.into(),
            grammar,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Ordered field list plus command-specific error codes
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    method: String,
    fields: Vec<FieldSpec>,
    error_codes: Vec<(i64, DaemonErrorKind)>,
}

impl ParameterSchema {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            fields: Vec::new(),
            error_codes: Vec::new(),
        }
    }

    /// Append a field; a field with the same name replaces the earlier one
    /// in place
    pub fn field_spec(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn required(self, name: impl Into<String>, grammar: Grammar) -> Self {
        self.field_spec(FieldSpec::required(name, grammar))
    }

    pub fn optional(self, name: impl Into<String>, grammar: Grammar) -> Self {
        self.field_spec(FieldSpec::optional(name, grammar))
    }

    pub fn optional_with_default(self, name: impl Into<String>, grammar: Grammar, default: Value) -> Self {
        self.field_spec(FieldSpec::optional(name, grammar).with_default(default))
    }

    /// Declare what a command-specific daemon error code means
    pub fn error_code(mut self, code: i64, kind: DaemonErrorKind) -> Self {
        self.error_codes.push((code, kind));
        self
    }

    /// Copy of this schema with a different default for `field`
    ///
    /// Unknown field names leave the schema unchanged.
    pub fn with_default(mut self, field: &str, default: Value) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field) {
            Some(spec) => spec.default = Some(default),
            None => tracing::warn!(method = %self.method, field, "default for undeclared field ignored"),
        }
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Zero-based position of a field in positional encoding
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn error_codes(&self) -> &[(i64, DaemonErrorKind)] {
        &self.error_codes
    }
}
