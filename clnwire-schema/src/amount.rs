//! Monetary amount grammar
//!
//! Amounts appear in two native units across the command surface: satoshi
//! (on-chain values such as `fundchannel`'s `amount`) and millisatoshi
//! (Lightning values such as `invoice`'s `msatoshi`). Each field declares its
//! unit with an [`AmountSpec`]; the same input text can be valid in one and
//! invalid in the other.
//!
//! # Accepted forms
//!
//! | input          | sat field            | msat field         |
//! |----------------|----------------------|--------------------|
//! | `1500`         | 1500 sat             | 1500 msat          |
//! | `1500sat`      | 1500 sat             | 1500000 msat       |
//! | `2000msat`     | 2 sat                | 2000 msat          |
//! | `1500msat`     | error (sub-satoshi)  | 1500 msat          |
//! | `1.001sat`     | error                | 1001 msat          |
//! | `0.00000001btc`| 1 sat                | 1000 msat          |
//! | `0.000000001btc`| error (9 places)    | 100 msat           |
//! | `all`          | only if declared     | only if declared   |
//! | `any`          | only if declared     | only if declared   |
//!
//! No whitespace, signs or exponents are accepted anywhere, and the input is
//! never trimmed.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_schema::{AmountLiteral, AmountSpec, AmountUnit};
//!
//! let one_sat = AmountLiteral::parse("0.00000001btc", &AmountSpec::sat()).unwrap();
//! assert_eq!(one_sat, AmountLiteral::Sat(1));
//! assert_eq!(one_sat.encode(AmountUnit::Sat), "1sat");
//!
//! assert!(AmountLiteral::parse("0.000000001btc", &AmountSpec::sat()).is_err());
//! ```

use crate::error::{render_input, GrammarError, GrammarResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const MSAT_PER_SAT: u64 = 1_000;
pub const MSAT_PER_BTC: u64 = 100_000_000_000;

const DIGITS_EXPECTED: &str = "expected digits with an optional sat, msat or btc suffix";
const OVERFLOW: &str = "amount overflows";

/// Native unit of an amount field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountUnit {
    #[default]
    Sat,
    MilliSat,
}

impl AmountUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            AmountUnit::Sat => "sat",
            AmountUnit::MilliSat => "msat",
        }
    }

    /// Most fractional btc digits the unit can represent exactly
    pub fn max_btc_decimals(&self) -> usize {
        match self {
            AmountUnit::Sat => 8,
            AmountUnit::MilliSat => 11,
        }
    }
}

/// What an amount field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmountSpec {
    pub unit: AmountUnit,
    /// `all` means "everything available" (wallet sweeps)
    pub accepts_all: bool,
    /// `any` means "payer chooses" (amountless invoices)
    pub accepts_any: bool,
}

impl AmountSpec {
    pub fn sat() -> Self {
        Self {
            unit: AmountUnit::Sat,
            ..Default::default()
        }
    }

    pub fn msat() -> Self {
        Self {
            unit: AmountUnit::MilliSat,
            ..Default::default()
        }
    }

    pub fn accepting_all(mut self) -> Self {
        self.accepts_all = true;
        self
    }

    pub fn accepting_any(mut self) -> Self {
        self.accepts_any = true;
        self
    }
}

/// A bitcoin-denominated amount, held exactly in millisatoshi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BtcAmount {
    msat: u64,
}

impl BtcAmount {
    pub fn from_msat(msat: u64) -> Self {
        Self { msat }
    }

    pub fn msat(&self) -> u64 {
        self.msat
    }
}

impl fmt::Display for BtcAmount {
    /// Decimal btc without trailing zeros, e.g. `0.001` or `2`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.msat / MSAT_PER_BTC;
        let frac = self.msat % MSAT_PER_BTC;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:011}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

/// A parsed amount, keeping the unit it was written in
///
/// Equality compares the denoted quantity, so `Sat(1)`, `MilliSat(1000)` and
/// a `Btc` of 1000 msat are all equal. The sentinels only equal themselves.
#[derive(Debug, Clone, Copy)]
pub enum AmountLiteral {
    Sat(u64),
    MilliSat(u64),
    Btc(BtcAmount),
    All,
    Any,
}

impl AmountLiteral {
    /// Parse amount text for a field described by `spec`
    pub fn parse(input: &str, spec: &AmountSpec) -> GrammarResult<Self> {
        if input.is_empty() {
            return Err(GrammarError::amount(input, "empty amount"));
        }

        match input {
            "all" if spec.accepts_all => return Ok(AmountLiteral::All),
            "all" => return Err(GrammarError::UnsupportedAll),
            "any" if spec.accepts_any => return Ok(AmountLiteral::Any),
            "any" => return Err(GrammarError::amount(input, "\"any\" is not accepted here")),
            _ => {}
        }

        // msat must be checked before sat, which is its suffix
        if let Some(body) = input.strip_suffix("msat") {
            let msat = digits(body, input)?;
            if spec.unit == AmountUnit::Sat && msat % MSAT_PER_SAT != 0 {
                return Err(GrammarError::amount(
                    input,
                    "millisatoshi amount is not a whole number of satoshi",
                ));
            }
            return Ok(AmountLiteral::MilliSat(msat));
        }

        if let Some(body) = input.strip_suffix("sat") {
            if let Some((whole, frac)) = body.split_once('.') {
                if spec.unit == AmountUnit::Sat {
                    return Err(GrammarError::amount(input, "fractional satoshi in a satoshi field"));
                }
                let msat = decimal(whole, frac, 3, MSAT_PER_SAT, input)?;
                return Ok(AmountLiteral::MilliSat(msat));
            }
            return sat(digits(body, input)?, input);
        }

        if let Some(body) = input.strip_suffix("btc") {
            let (whole, frac) = match body.split_once('.') {
                Some((whole, frac)) => (whole, frac),
                None => (body, ""),
            };
            if body.contains('.') && frac.is_empty() {
                return Err(GrammarError::amount(input, "missing decimal digits"));
            }
            let max = spec.unit.max_btc_decimals();
            if frac.len() > max {
                return Err(GrammarError::amount(
                    input,
                    format!("more than {} decimal places for a {} field", max, spec.unit.suffix()),
                ));
            }
            let msat = decimal(whole, frac, 11, MSAT_PER_BTC, input)?;
            return Ok(AmountLiteral::Btc(BtcAmount::from_msat(msat)));
        }

        native(digits(input, input)?, spec, input)
    }

    /// Quantity in millisatoshi; `None` for sentinels
    pub fn msat(&self) -> Option<u64> {
        self.quantity().and_then(|q| u64::try_from(q).ok())
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, AmountLiteral::All | AmountLiteral::Any)
    }

    // u128 so that Sat(u64::MAX) still has a quantity
    fn quantity(&self) -> Option<u128> {
        match self {
            AmountLiteral::Sat(n) => Some(*n as u128 * MSAT_PER_SAT as u128),
            AmountLiteral::MilliSat(n) => Some(*n as u128),
            AmountLiteral::Btc(b) => Some(b.msat() as u128),
            AmountLiteral::All | AmountLiteral::Any => None,
        }
    }

    /// Wire form in the field's declared unit
    ///
    /// A quantity that is not a whole number of satoshi keeps its `msat`
    /// suffix even in a sat unit; parsing never produces one, so this only
    /// happens for hand-built literals.
    pub fn encode(&self, unit: AmountUnit) -> String {
        let Some(q) = self.quantity() else {
            // "all" / "any"
            return self.to_string();
        };
        match unit {
            AmountUnit::Sat if q % MSAT_PER_SAT as u128 == 0 => {
                format!("{}sat", q / MSAT_PER_SAT as u128)
            }
            _ => format!("{}msat", q),
        }
    }
}

impl PartialEq for AmountLiteral {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AmountLiteral::All, AmountLiteral::All) | (AmountLiteral::Any, AmountLiteral::Any) => true,
            _ => match (self.quantity(), other.quantity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for AmountLiteral {}

impl fmt::Display for AmountLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountLiteral::Sat(n) => write!(f, "{}sat", n),
            AmountLiteral::MilliSat(n) => write!(f, "{}msat", n),
            AmountLiteral::Btc(b) => write!(f, "{}btc", b),
            AmountLiteral::All => f.write_str("all"),
            AmountLiteral::Any => f.write_str("any"),
        }
    }
}

/// Parse a raw JSON amount (number or string)
pub fn parse_amount(raw: &Value, spec: &AmountSpec) -> GrammarResult<AmountLiteral> {
    match raw {
        Value::String(s) => AmountLiteral::parse(s, spec),
        Value::Number(n) => match n.as_u64() {
            Some(v) => native(v, spec, &n.to_string()),
            None => Err(GrammarError::amount(render_input(raw), "not a non-negative integer")),
        },
        _ => Err(GrammarError::amount(render_input(raw), "expected a number or a string")),
    }
}

fn native(value: u64, spec: &AmountSpec, input: &str) -> GrammarResult<AmountLiteral> {
    match spec.unit {
        AmountUnit::Sat => sat(value, input),
        AmountUnit::MilliSat => Ok(AmountLiteral::MilliSat(value)),
    }
}

fn sat(value: u64, input: &str) -> GrammarResult<AmountLiteral> {
    value
        .checked_mul(MSAT_PER_SAT)
        .map(|_| AmountLiteral::Sat(value))
        .ok_or_else(|| GrammarError::amount(input, OVERFLOW))
}

fn digits(body: &str, input: &str) -> GrammarResult<u64> {
    if body.is_empty() {
        return Err(GrammarError::amount(input, "missing digits"));
    }
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrammarError::amount(input, DIGITS_EXPECTED));
    }
    body.parse::<u64>().map_err(|_| GrammarError::amount(input, OVERFLOW))
}

/// `whole.frac` scaled so that `frac_places` decimal places equal `scale`
/// millisatoshi per unit. Callers have already bounded `frac.len()`.
fn decimal(whole: &str, frac: &str, frac_places: usize, scale: u64, input: &str) -> GrammarResult<u64> {
    if frac.len() > frac_places {
        return Err(GrammarError::amount(
            input,
            format!("more than {} decimal places", frac_places),
        ));
    }
    let whole = digits(whole, input)?;
    let frac_value = if frac.is_empty() {
        0
    } else {
        let f = digits(frac, input)?;
        // frac_places - len <= 11 so the power always fits
        f * 10u64.pow((frac_places - frac.len()) as u32)
    };
    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or_else(|| GrammarError::amount(input, OVERFLOW))
}
