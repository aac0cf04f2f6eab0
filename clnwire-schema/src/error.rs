//! Grammar-level failures
//!
//! The grammar engines validate a single value and know nothing about the
//! field it came from. The canonicalizer attaches the field name with
//! [`GrammarError::for_field`], producing the [`ValidationError`] that
//! callers see.

use clnwire_core::ValidationError;
use serde_json::Value;
use thiserror::Error;

/// Result type for grammar operations
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;

/// A value that does not match its grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid feerate {input:?}: {reason}")]
    InvalidFeerate { input: String, reason: String },

    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("invalid value {input:?}: {reason}")]
    InvalidValue { input: String, reason: String },

    /// `all` given where the field does not take it
    #[error("\"all\" is not accepted here")]
    UnsupportedAll,
}

impl GrammarError {
    pub(crate) fn amount(input: impl Into<String>, reason: impl Into<String>) -> Self {
        GrammarError::InvalidAmount {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn feerate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        GrammarError::InvalidFeerate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn duration(input: impl Into<String>, reason: impl Into<String>) -> Self {
        GrammarError::InvalidDuration {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn value(input: impl Into<String>, reason: impl Into<String>) -> Self {
        GrammarError::InvalidValue {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Tag this failure with the field it was found in
    pub fn for_field(self, field: &str) -> ValidationError {
        let field = field.to_string();
        match self {
            GrammarError::InvalidAmount { input, reason } => ValidationError::InvalidAmount { field, input, reason },
            GrammarError::InvalidFeerate { input, reason } => ValidationError::InvalidFeerate { field, input, reason },
            GrammarError::InvalidDuration { input, reason } => ValidationError::InvalidDuration { field, input, reason },
            GrammarError::InvalidValue { input, reason } => ValidationError::InvalidValue { field, input, reason },
            GrammarError::UnsupportedAll => ValidationError::UnsupportedAllSentinel { field },
        }
    }
}

/// Render a raw JSON input for an error message
///
/// Strings are shown without their JSON quotes so `"abc"` reads as `abc`.
pub(crate) fn render_input(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
