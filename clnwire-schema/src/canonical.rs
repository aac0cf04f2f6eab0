//! Parameter canonicalization
//!
//! [`canonicalize`] checks a caller's raw parameters against a
//! [`ParameterSchema`] and produces a [`ParameterBag`]: the validated
//! values in schema order, ready to be encoded by name or by position.
//!
//! # Rules
//!
//! 1. Input keys the schema does not declare are reported first, in input
//!    order, as `UnknownParameter`.
//! 2. Declared fields are then visited in schema order. A JSON `null`
//!    counts as absent.
//!    - absent, with a default: the default is validated and used
//!    - absent, required: `MissingRequiredField`
//!    - absent, optional: left out of the bag
//!    - present: validated by the field's grammar
//! 3. Every failure is collected. Any failure rejects the whole input.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_schema::{canonicalize, AmountSpec, Grammar, ParameterSchema};
//! use serde_json::json;
//!
//! let schema = ParameterSchema::new("invoice")
//!     .required("msatoshi", Grammar::Amount(AmountSpec::msat().accepting_any()))
//!     .required("label", Grammar::Label)
//!     .optional_with_default("expiry", Grammar::Duration, json!(604800));
//!
//! let input = json!({"label": 5, "msatoshi": "10sat"});
//! let bag = canonicalize(&schema, input.as_object().unwrap()).unwrap();
//! assert_eq!(
//!     bag.to_named(),
//!     json!({"msatoshi": "10000msat", "label": "5", "expiry": 604800})
//! );
//! ```

use crate::amount::{AmountLiteral, AmountUnit};
use crate::duration::DurationLiteral;
use crate::feerate::FeerateLiteral;
use crate::schema::ParameterSchema;
use clnwire_core::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A validated field value
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    Amount { literal: AmountLiteral, unit: AmountUnit },
    Feerate(FeerateLiteral),
    Duration(DurationLiteral),
    Json(Value),
}

impl CanonicalValue {
    /// Wire representation
    pub fn to_json(&self) -> Value {
        match self {
            CanonicalValue::Amount { literal, unit } => Value::String(literal.encode(*unit)),
            CanonicalValue::Feerate(feerate) => Value::String(feerate.encode()),
            CanonicalValue::Duration(duration) => Value::from(duration.seconds()),
            CanonicalValue::Json(value) => value.clone(),
        }
    }
}

/// How parameters are laid out in the request's `params`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// JSON object keyed by field name
    #[default]
    Named,
    /// JSON array in schema order
    Positional,
}

#[derive(Debug, Clone, PartialEq)]
struct BagEntry {
    slot: usize,
    name: String,
    value: CanonicalValue,
}

/// Validated parameters in schema order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterBag {
    entries: Vec<BagEntry>,
}

impl ParameterBag {
    pub fn get(&self, name: &str) -> Option<&CanonicalValue> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in the order they will be sent
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// JSON object with keys in schema order
    pub fn to_named(&self) -> Value {
        let mut object = Map::new();
        for entry in &self.entries {
            object.insert(entry.name.clone(), entry.value.to_json());
        }
        Value::Object(object)
    }

    /// JSON array laid out by `schema`'s field positions
    ///
    /// Skipped optional fields before the last present one become `null`;
    /// trailing absent fields are dropped.
    pub fn to_positional(&self, schema: &ParameterSchema) -> Value {
        positional(
            self.entries
                .iter()
                .filter_map(|e| schema.position(&e.name).map(|slot| (slot, e.value.to_json()))),
        )
    }

    /// Encode with the schema this bag was built from
    pub fn encode(&self, style: ParamStyle) -> Value {
        match style {
            ParamStyle::Named => self.to_named(),
            ParamStyle::Positional => positional(self.entries.iter().map(|e| (e.slot, e.value.to_json()))),
        }
    }
}

fn positional(slots: impl Iterator<Item = (usize, Value)>) -> Value {
    let mut array: Vec<Value> = Vec::new();
    for (slot, value) in slots {
        if array.len() <= slot {
            array.resize(slot + 1, Value::Null);
        }
        array[slot] = value;
    }
    Value::Array(array)
}

/// Validate `input` against `schema`
pub fn canonicalize(schema: &ParameterSchema, input: &Map<String, Value>) -> Result<ParameterBag, Vec<ValidationError>> {
    let mut errors = Vec::new();

    for key in input.keys() {
        if schema.field(key).is_none() {
            errors.push(ValidationError::UnknownParameter { field: key.clone() });
        }
    }

    let mut bag = ParameterBag::default();
    for (slot, field) in schema.fields().iter().enumerate() {
        let supplied = input.get(&field.name).filter(|v| !v.is_null());
        let raw = match (supplied, &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) if field.required => {
                errors.push(ValidationError::MissingRequiredField {
                    field: field.name.clone(),
                });
                continue;
            }
            (None, None) => continue,
        };

        match field.grammar.apply(raw) {
            Ok(value) => bag.entries.push(BagEntry {
                slot,
                name: field.name.clone(),
                value,
            }),
            Err(e) => errors.push(e.for_field(&field.name)),
        }
    }

    if errors.is_empty() {
        Ok(bag)
    } else {
        tracing::debug!(method = schema.method(), failures = errors.len(), "parameters rejected");
        Err(errors)
    }
}

/// Validate parameters given as any JSON shape
///
/// Objects are handled by [`canonicalize`]. Arrays are matched to fields by
/// position; extra elements are reported as unknown parameters named by
/// their index. `null` means no parameters.
pub fn canonicalize_value(schema: &ParameterSchema, input: &Value) -> Result<ParameterBag, Vec<ValidationError>> {
    match input {
        Value::Object(object) => canonicalize(schema, object),
        Value::Null => canonicalize(schema, &Map::new()),
        Value::Array(items) => {
            let mut object = Map::new();
            let mut extra = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match schema.fields().get(i) {
                    Some(field) => {
                        object.insert(field.name.clone(), item.clone());
                    }
                    None => extra.push(ValidationError::UnknownParameter {
                        field: format!("#{}", i),
                    }),
                }
            }
            match canonicalize(schema, &object) {
                Ok(bag) if extra.is_empty() => Ok(bag),
                Ok(_) => Err(extra),
                Err(errors) => {
                    extra.extend(errors);
                    Err(extra)
                }
            }
        }
        other => Err(vec![ValidationError::InvalidValue {
            field: "params".to_string(),
            input: other.to_string(),
            reason: "expected an object or an array".to_string(),
        }]),
    }
}
