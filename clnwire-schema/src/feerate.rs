//! Feerate grammar
//!
//! A feerate is either one of the daemon's estimate names or an explicit
//! rate with a unit:
//!
//! - `urgent`, `normal`, `slow` (case-sensitive): resolved by the daemon
//! - `<n>perkw`: satoshi per 1000 weight units
//! - `<n>perkb`: satoshi per 1000 virtual bytes
//! - `<n>`: same as `<n>perkb`
//!
//! `1perkw` is `4perkb`; the grammar keeps whichever unit was written and
//! [`FeerateLiteral::per_kw`] converts when a caller needs a single scale.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_schema::{parse_feerate, FeerateLiteral, FeerateSpec};
//! use serde_json::json;
//!
//! let spec = FeerateSpec::default();
//! assert_eq!(parse_feerate(&json!("253"), &spec).unwrap(), FeerateLiteral::PerKb(253));
//! assert_eq!(parse_feerate(&json!("1000perkw"), &spec).unwrap().encode(), "1000perkw");
//! ```

use crate::error::{render_input, GrammarError, GrammarResult};
use serde_json::Value;
use std::fmt;

/// Named estimate the daemon resolves at execution time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeerateEstimate {
    Urgent,
    Normal,
    Slow,
}

impl FeerateEstimate {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeerateEstimate::Urgent => "urgent",
            FeerateEstimate::Normal => "normal",
            FeerateEstimate::Slow => "slow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeerateLiteral {
    Estimate(FeerateEstimate),
    PerKw(u32),
    PerKb(u32),
}

/// What a feerate field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeerateSpec {
    /// Reject an explicit rate of zero
    pub must_be_positive: bool,
}

impl Default for FeerateSpec {
    fn default() -> Self {
        Self {
            must_be_positive: true,
        }
    }
}

impl FeerateLiteral {
    pub fn parse(input: &str, spec: &FeerateSpec) -> GrammarResult<Self> {
        match input {
            "urgent" => return Ok(FeerateLiteral::Estimate(FeerateEstimate::Urgent)),
            "normal" => return Ok(FeerateLiteral::Estimate(FeerateEstimate::Normal)),
            "slow" => return Ok(FeerateLiteral::Estimate(FeerateEstimate::Slow)),
            _ => {}
        }

        let (body, per_kw) = if let Some(body) = input.strip_suffix("perkw") {
            (body, true)
        } else if let Some(body) = input.strip_suffix("perkb") {
            (body, false)
        } else {
            (input, false)
        };

        let rate = rate(body, input, spec)?;
        Ok(if per_kw {
            FeerateLiteral::PerKw(rate)
        } else {
            FeerateLiteral::PerKb(rate)
        })
    }

    /// Wire form: the estimate name or `<n>perkw` / `<n>perkb`
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, FeerateLiteral::Estimate(_))
    }

    /// Explicit rate in satoshi per kiloweight, rounding perkb down
    pub fn per_kw(&self) -> Option<u32> {
        match self {
            FeerateLiteral::Estimate(_) => None,
            FeerateLiteral::PerKw(n) => Some(*n),
            FeerateLiteral::PerKb(n) => Some(n / 4),
        }
    }
}

impl fmt::Display for FeerateLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeerateLiteral::Estimate(e) => f.write_str(e.as_str()),
            FeerateLiteral::PerKw(n) => write!(f, "{}perkw", n),
            FeerateLiteral::PerKb(n) => write!(f, "{}perkb", n),
        }
    }
}

/// Parse a raw JSON feerate (number or string)
pub fn parse_feerate(raw: &Value, spec: &FeerateSpec) -> GrammarResult<FeerateLiteral> {
    match raw {
        Value::String(s) => FeerateLiteral::parse(s, spec),
        Value::Number(n) => {
            let text = n.to_string();
            match n.as_u64() {
                Some(_) => FeerateLiteral::parse(&text, spec),
                None => Err(GrammarError::feerate(text, "not a non-negative integer")),
            }
        }
        _ => Err(GrammarError::feerate(render_input(raw), "expected a number or a string")),
    }
}

fn rate(body: &str, input: &str, spec: &FeerateSpec) -> GrammarResult<u32> {
    if body.is_empty() {
        return Err(GrammarError::feerate(input, "missing digits"));
    }
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrammarError::feerate(
            input,
            "expected urgent, normal, slow or digits with an optional perkw or perkb suffix",
        ));
    }
    let rate = body
        .parse::<u32>()
        .map_err(|_| GrammarError::feerate(input, "feerate overflows"))?;
    if rate == 0 && spec.must_be_positive {
        return Err(GrammarError::feerate(input, "feerate must be positive"));
    }
    Ok(rate)
}
