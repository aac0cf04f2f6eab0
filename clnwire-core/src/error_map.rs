//! Classification of daemon error codes
//!
//! The daemon reports failures as `{code, message}`. Codes in the JSON-RPC
//! reserved range mean the same thing for every command; positive codes are
//! allocated per command family (`300`s for funding, `900`s for invoices,
//! `1301` for message verification, ...). [`ErrorMapper`] keeps a global table
//! for the former and per-command tables for the latter, with the
//! per-command entry winning when both match.
//!
//! A family code only means something for its own commands: `1301` from
//! `checkmessage` is [`DaemonErrorKind::DomainNotFound`], the same code from
//! any other command is unknown. The family meanings are used as a fallback
//! only when no command is known at all, as in [`map_error`].
//!
//! Unrecognized codes become [`DaemonErrorKind::UnknownDaemonError`]; the raw
//! code and message are kept either way so callers can still branch on them.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_core::{map_error, DaemonErrorKind, ErrorMapper};
//!
//! assert_eq!(map_error(-32602, "bad").kind, DaemonErrorKind::InvalidParameters);
//!
//! let mapper = ErrorMapper::new().with_command_code("pay", 205, DaemonErrorKind::DomainNotFound);
//! let error = mapper.map_code(Some("pay"), 205, "no route");
//! assert_eq!(error.kind, DaemonErrorKind::DomainNotFound);
//! assert_eq!(error.code, 205);
//! ```

use crate::error::{DaemonError, DaemonErrorKind, RpcErrorData};
use std::collections::HashMap;

/// Envelope is not a valid request
pub const INVALID_REQUEST: i64 = -32600;
/// No such command
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Parameter missing or malformed
pub const INVALID_PARAMS: i64 = -32602;
/// Wallet cannot afford the requested amount
pub const FUND_CANNOT_AFFORD: i64 = 301;
/// Peer is not known to the daemon
pub const FUNDING_UNKNOWN_PEER: i64 = 306;
/// Invoice label already in use
pub const INVOICE_LABEL_ALREADY_EXISTS: i64 = 900;
/// Invoice preimage already in use
pub const INVOICE_PREIMAGE_ALREADY_EXISTS: i64 = 901;
/// No invoice with that label
pub const INVOICE_NOT_FOUND: i64 = 905;
/// Key referenced by a signature check is not in the graph
pub const SIGNMESSAGE_PUBKEY_NOT_FOUND: i64 = 1301;

/// Code → kind lookup with per-command overrides
#[derive(Debug, Clone)]
pub struct ErrorMapper {
    global: HashMap<i64, DaemonErrorKind>,
    commands: HashMap<String, HashMap<i64, DaemonErrorKind>>,
    contextless: HashMap<i64, DaemonErrorKind>,
}

impl ErrorMapper {
    /// Mapper preloaded with the reserved JSON-RPC codes
    ///
    /// Family codes are only registered as the fallback for calls without a
    /// command; per-command tables come from the schema catalogue.
    pub fn new() -> Self {
        Self::empty()
            .with_code(INVALID_REQUEST, DaemonErrorKind::InvalidRequest)
            .with_code(METHOD_NOT_FOUND, DaemonErrorKind::MethodNotFound)
            .with_code(INVALID_PARAMS, DaemonErrorKind::InvalidParameters)
            .with_contextless_code(FUND_CANNOT_AFFORD, DaemonErrorKind::InsufficientFunds)
            .with_contextless_code(FUNDING_UNKNOWN_PEER, DaemonErrorKind::DomainNotFound)
            .with_contextless_code(INVOICE_LABEL_ALREADY_EXISTS, DaemonErrorKind::Conflict)
            .with_contextless_code(INVOICE_PREIMAGE_ALREADY_EXISTS, DaemonErrorKind::Conflict)
            .with_contextless_code(INVOICE_NOT_FOUND, DaemonErrorKind::DomainNotFound)
            .with_contextless_code(SIGNMESSAGE_PUBKEY_NOT_FOUND, DaemonErrorKind::DomainNotFound)
    }

    /// Mapper with no entries at all
    pub fn empty() -> Self {
        Self {
            global: HashMap::new(),
            commands: HashMap::new(),
            contextless: HashMap::new(),
        }
    }

    /// Add or replace a code used only when no command is given
    pub fn with_contextless_code(mut self, code: i64, kind: DaemonErrorKind) -> Self {
        self.contextless.insert(code, kind);
        self
    }

    /// Add or replace a code that means the same for every command
    pub fn with_code(mut self, code: i64, kind: DaemonErrorKind) -> Self {
        self.global.insert(code, kind);
        self
    }

    /// Add or replace a code for one command only
    pub fn with_command_code(mut self, method: impl Into<String>, code: i64, kind: DaemonErrorKind) -> Self {
        self.register_command_code(method, code, kind);
        self
    }

    /// In-place form of [`ErrorMapper::with_command_code`]
    pub fn register_command_code(&mut self, method: impl Into<String>, code: i64, kind: DaemonErrorKind) {
        self.commands
            .entry(method.into())
            .or_default()
            .insert(code, kind);
    }

    /// Kind for a code, consulting the command's own table first
    pub fn classify(&self, method: Option<&str>, code: i64) -> DaemonErrorKind {
        let scoped = match method {
            Some(m) => self.commands.get(m).and_then(|table| table.get(&code)),
            None => self.contextless.get(&code),
        };
        scoped
            .or_else(|| self.global.get(&code))
            .copied()
            .unwrap_or(DaemonErrorKind::UnknownDaemonError)
    }

    /// Classify a wire error object returned for `method`
    pub fn map(&self, method: &str, error: RpcErrorData) -> DaemonError {
        DaemonError {
            kind: self.classify(Some(method), error.code),
            code: error.code,
            message: error.message,
            data: error.data,
            method: Some(method.to_string()),
        }
    }

    /// Classify a bare code and message
    pub fn map_code(&self, method: Option<&str>, code: i64, message: impl Into<String>) -> DaemonError {
        DaemonError {
            kind: self.classify(method, code),
            code,
            message: message.into(),
            data: None,
            method: method.map(str::to_string),
        }
    }
}

impl Default for ErrorMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a code with the default table, without command context
pub fn map_error(code: i64, message: impl Into<String>) -> DaemonError {
    ErrorMapper::new().map_code(None, code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_params_maps_globally() {
        let error = map_error(-32602, "amount: should be a millisatoshi amount");
        assert_eq!(error.kind, DaemonErrorKind::InvalidParameters);
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "amount: should be a millisatoshi amount");
        assert!(error.method.is_none());
    }

    #[test]
    fn test_pubkey_not_found_maps_to_domain_not_found() {
        let error = map_error(1301, "pubkey not found in the graph");
        assert_eq!(error.kind, DaemonErrorKind::DomainNotFound);
    }

    #[test]
    fn test_unknown_code_preserved_verbatim() {
        let error = map_error(4242, "something odd");
        assert_eq!(error.kind, DaemonErrorKind::UnknownDaemonError);
        assert_eq!(error.code, 4242);
        assert_eq!(error.message, "something odd");
    }

    #[test]
    fn test_command_table_wins_over_global() {
        let mapper = ErrorMapper::new().with_command_code(
            "setchannel",
            INVALID_PARAMS,
            DaemonErrorKind::DomainNotFound,
        );

        assert_eq!(
            mapper.classify(Some("setchannel"), INVALID_PARAMS),
            DaemonErrorKind::DomainNotFound
        );
        assert_eq!(
            mapper.classify(Some("invoice"), INVALID_PARAMS),
            DaemonErrorKind::InvalidParameters
        );
    }

    #[test]
    fn test_family_codes_do_not_leak_across_commands() {
        let mapper = ErrorMapper::new()
            .with_command_code("checkmessage", SIGNMESSAGE_PUBKEY_NOT_FOUND, DaemonErrorKind::DomainNotFound)
            .with_command_code("txprepare", FUND_CANNOT_AFFORD, DaemonErrorKind::InsufficientFunds);

        assert_eq!(
            mapper.classify(Some("checkmessage"), SIGNMESSAGE_PUBKEY_NOT_FOUND),
            DaemonErrorKind::DomainNotFound
        );
        assert_eq!(
            mapper.classify(Some("invoice"), SIGNMESSAGE_PUBKEY_NOT_FOUND),
            DaemonErrorKind::UnknownDaemonError
        );
        assert_eq!(
            mapper.classify(Some("setchannel"), FUND_CANNOT_AFFORD),
            DaemonErrorKind::UnknownDaemonError
        );

        // Without a command the family meaning is the best guess
        assert_eq!(
            mapper.classify(None, SIGNMESSAGE_PUBKEY_NOT_FOUND),
            DaemonErrorKind::DomainNotFound
        );
    }

    #[test]
    fn test_map_keeps_data_and_method() {
        let mapper = ErrorMapper::new().with_command_code(
            "invoice",
            INVOICE_LABEL_ALREADY_EXISTS,
            DaemonErrorKind::Conflict,
        );
        let error = mapper.map(
            "invoice",
            RpcErrorData::with_data(900, "Duplicate label", json!({"label": "coffee"})),
        );

        assert_eq!(error.kind, DaemonErrorKind::Conflict);
        assert_eq!(error.method.as_deref(), Some("invoice"));
        assert_eq!(error.data, Some(json!({"label": "coffee"})));
    }

    #[test]
    fn test_empty_mapper_classifies_nothing() {
        let mapper = ErrorMapper::empty();
        assert_eq!(
            mapper.classify(None, INVALID_PARAMS),
            DaemonErrorKind::UnknownDaemonError
        );
    }
}
