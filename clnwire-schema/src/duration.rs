//! Duration grammar
//!
//! Relative times (invoice expiry, fee-change grace periods) are given in
//! seconds, optionally with a unit suffix:
//!
//! | suffix | multiplier |
//! |--------|-----------:|
//! | `s`    | 1          |
//! | `m`    | 60         |
//! | `h`    | 3600       |
//! | `d`    | 86400      |
//! | `w`    | 604800     |
//!
//! An absent value (or JSON `null`) yields the field's default unchanged.

use crate::error::{render_input, GrammarError, GrammarResult};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Normalized duration in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DurationLiteral {
    seconds: u64,
}

impl DurationLiteral {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    pub fn parse(input: &str) -> GrammarResult<Self> {
        let (body, multiplier) = match input.as_bytes().last() {
            Some(b's') => (&input[..input.len() - 1], 1),
            Some(b'm') => (&input[..input.len() - 1], 60),
            Some(b'h') => (&input[..input.len() - 1], 3_600),
            Some(b'd') => (&input[..input.len() - 1], 86_400),
            Some(b'w') => (&input[..input.len() - 1], 604_800),
            Some(b) if b.is_ascii_digit() => (input, 1),
            Some(_) => return Err(GrammarError::duration(input, "unknown unit suffix")),
            None => return Err(GrammarError::duration(input, "empty duration")),
        };

        if body.is_empty() {
            return Err(GrammarError::duration(input, "missing digits"));
        }
        if !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GrammarError::duration(
                input,
                "expected digits with an optional s, m, h, d or w suffix",
            ));
        }

        body.parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .map(Self::from_seconds)
            .ok_or_else(|| GrammarError::duration(input, "duration overflows"))
    }
}

impl fmt::Display for DurationLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

impl From<DurationLiteral> for Duration {
    fn from(value: DurationLiteral) -> Self {
        value.as_duration()
    }
}

/// Parse an optional raw JSON duration, falling back to `default_seconds`
///
/// # Examples
///
/// ```rust
/// use clnwire_schema::parse_duration;
/// use serde_json::json;
///
/// assert_eq!(parse_duration(Some(&json!("1w")), 604800).unwrap().seconds(), 604800);
/// assert_eq!(parse_duration(None, 600).unwrap().seconds(), 600);
/// ```
pub fn parse_duration(raw: Option<&Value>, default_seconds: u64) -> GrammarResult<DurationLiteral> {
    match raw {
        None | Some(Value::Null) => Ok(DurationLiteral::from_seconds(default_seconds)),
        Some(Value::String(s)) => DurationLiteral::parse(s),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(DurationLiteral::from_seconds)
            .ok_or_else(|| GrammarError::duration(n.to_string(), "not a non-negative integer")),
        Some(other) => Err(GrammarError::duration(
            render_input(other),
            "expected a number or a string",
        )),
    }
}
