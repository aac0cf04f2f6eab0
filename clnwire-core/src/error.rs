//! Error types for clnwire
//!
//! Failures fall into three groups, and the group tells a caller what to do
//! about them:
//!
//! - **Local validation** ([`ValidationError`], carried by [`Error::Validation`]):
//!   the caller's input was wrong. Raised before any byte reaches the daemon
//!   and never retried.
//! - **Transport** ([`Error::TransportClosed`], [`Error::Timeout`], [`Error::Io`]):
//!   the connection failed or the caller stopped waiting.
//! - **Daemon-reported** ([`Error::Daemon`]): the request made the round trip
//!   and the daemon answered with an error object. The raw `code` and
//!   `message` are always kept inside [`DaemonError`].
//!
//! # Wire error object
//!
//! [`RpcErrorData`] is the `error` member of a response envelope exactly as
//! the daemon sends it. [`crate::ErrorMapper`] turns it into a [`DaemonError`].
//!
//! # Examples
//!
//! ```rust
//! use clnwire_core::{Error, ValidationError, ValidationErrors};
//!
//! let error = Error::Validation {
//!     method: "invoice".into(),
//!     errors: ValidationErrors::from(vec![ValidationError::MissingRequiredField {
//!         field: "label".into(),
//!     }]),
//! };
//! assert!(error.to_string().contains("label"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for clnwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for a command invocation
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// One or more parameters failed local validation
    ///
    /// Every failing field is reported, not just the first one.
    #[error("invalid parameters for {method}: {errors}")]
    Validation {
        /// Command being invoked
        method: String,
        /// Every field-level failure found
        errors: ValidationErrors,
    },

    /// The command has no schema in the catalogue
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// The transport closed (or failed) before a response arrived
    #[error("transport closed")]
    TransportClosed,

    /// The caller's deadline expired before the response arrived
    ///
    /// The request was still sent; its eventual response is discarded.
    #[error("request {id} ({method}) timed out")]
    Timeout {
        /// Command being invoked
        method: String,
        /// Request id that timed out
        id: u64,
    },

    /// Low-level I/O failure that did not close the transport
    #[error("IO error: {0}")]
    Io(String),

    /// Encoding a request or decoding a result failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The daemon sent something that is not a valid envelope
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Client setup failed (observability bootstrap, socket path)
    #[error("configuration error: {0}")]
    Config(String),

    /// The daemon answered with an error object
    #[error(transparent)]
    Daemon(#[from] DaemonError),
}

impl Error {
    /// Field-level failures, if this is a validation error
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Error::Validation { errors, .. } => Some(errors.as_slice()),
            _ => None,
        }
    }

    /// The classified daemon error, if the daemon reported one
    pub fn daemon_error(&self) -> Option<&DaemonError> {
        match self {
            Error::Daemon(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the failure happened before anything was written
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::UnknownMethod(_))
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::UnknownMethod(_) => "unknown_method",
            Error::TransportClosed => "transport_closed",
            Error::Timeout { .. } => "timeout",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Protocol(_) => "protocol",
            Error::Config(_) => "config",
            Error::Daemon(e) => e.kind.as_str(),
        }
    }
}

/// A single parameter that failed local validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a valid monetary amount for this field
    #[error("{field}: invalid amount {input:?}: {reason}")]
    InvalidAmount {
        field: String,
        input: String,
        reason: String,
    },

    /// Not a valid feerate
    #[error("{field}: invalid feerate {input:?}: {reason}")]
    InvalidFeerate {
        field: String,
        input: String,
        reason: String,
    },

    /// Not a valid duration
    #[error("{field}: invalid duration {input:?}: {reason}")]
    InvalidDuration {
        field: String,
        input: String,
        reason: String,
    },

    /// Failed a pass-through check (hex, pubkey, utxo, short channel id, type)
    #[error("{field}: invalid value {input:?}: {reason}")]
    InvalidValue {
        field: String,
        input: String,
        reason: String,
    },

    /// A required field was absent
    #[error("{field}: missing required field")]
    MissingRequiredField { field: String },

    /// The input named a field the command does not declare
    #[error("{field}: unknown parameter")]
    UnknownParameter { field: String },

    /// `all` was given to a field that does not accept it
    #[error("{field}: \"all\" is not accepted for this field")]
    UnsupportedAllSentinel { field: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidAmount { field, .. }
            | ValidationError::InvalidFeerate { field, .. }
            | ValidationError::InvalidDuration { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::MissingRequiredField { field }
            | ValidationError::UnknownParameter { field }
            | ValidationError::UnsupportedAllSentinel { field } => field,
        }
    }
}

/// Ordered collection of validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Error object as it appears in a response envelope
///
/// Codes are signed 64-bit: the daemon uses the negative JSON-RPC 2.0
/// reserved range for protocol failures and positive codes for
/// command-specific ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorData {
    /// Numeric error code
    pub code: i64,

    /// Human-readable error message
    pub message: String,

    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorData {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i64, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for RpcErrorData {
    /// Formats as "[code] message"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Classification of a daemon-reported error
///
/// Non-exhaustive on purpose: new command families add new kinds. Anything
/// unclassified is [`DaemonErrorKind::UnknownDaemonError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DaemonErrorKind {
    /// The daemon rejected the parameters (-32602)
    InvalidParameters,
    /// The envelope itself was rejected (-32600)
    InvalidRequest,
    /// The daemon has no such command (-32601)
    MethodNotFound,
    /// A referenced object (key, invoice, peer) does not exist
    DomainNotFound,
    /// The request collides with existing state (duplicate label or preimage)
    Conflict,
    /// The wallet cannot cover the requested amount
    InsufficientFunds,
    /// Any code without a classification
    UnknownDaemonError,
}

impl DaemonErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DaemonErrorKind::InvalidParameters => "invalid_parameters",
            DaemonErrorKind::InvalidRequest => "invalid_request",
            DaemonErrorKind::MethodNotFound => "method_not_found",
            DaemonErrorKind::DomainNotFound => "domain_not_found",
            DaemonErrorKind::Conflict => "conflict",
            DaemonErrorKind::InsufficientFunds => "insufficient_funds",
            DaemonErrorKind::UnknownDaemonError => "unknown_daemon_error",
        }
    }
}

impl fmt::Display for DaemonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A daemon-reported error, classified, with its raw code and message intact
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonError {
    /// Classification from the error mapper
    pub kind: DaemonErrorKind,
    /// Raw code as sent by the daemon
    pub code: i64,
    /// Raw message as sent by the daemon
    pub message: String,
    /// Raw `data` member, if any
    pub data: Option<serde_json::Value>,
    /// Command that produced the error, when known
    pub method: Option<String>,
}

impl DaemonError {
    /// The raw wire object this error was built from
    pub fn raw(&self) -> RpcErrorData {
        RpcErrorData {
            code: self.code,
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(method) = &self.method {
            write!(f, "{}: ", method)?;
        }
        write!(f, "{} [{}] {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for DaemonError {}
