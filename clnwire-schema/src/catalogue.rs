//! Built-in command schemas
//!
//! The catalogue maps command names to their [`ParameterSchema`]. The
//! built-in set covers the invoice, signature, funding, fee-policy, wallet
//! and onion commands; applications add their own with
//! [`Catalogue::register`].
//!
//! Field order follows the daemon's positional order for each command.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_schema::Catalogue;
//!
//! let catalogue = Catalogue::builtin();
//! let schema = catalogue.get("setchannel").unwrap();
//! assert_eq!(schema.fields()[0].name, "id");
//! assert!(catalogue.get("no_such_command").is_none());
//! ```

use crate::amount::AmountSpec;
use crate::feerate::FeerateSpec;
use crate::schema::{Grammar, ParameterSchema};
use crate::validate::HexSpec;
use clnwire_core::error_map::{
    FUND_CANNOT_AFFORD, FUNDING_UNKNOWN_PEER, INVALID_PARAMS, INVOICE_LABEL_ALREADY_EXISTS,
    INVOICE_PREIMAGE_ALREADY_EXISTS, SIGNMESSAGE_PUBKEY_NOT_FOUND,
};
use clnwire_core::{DaemonErrorKind, ErrorMapper};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Default invoice lifetime: one week
pub const DEFAULT_INVOICE_EXPIRY: u64 = 604_800;
/// Default grace period before raised fees are enforced
pub const DEFAULT_ENFORCE_DELAY: u64 = 600;
/// Default confirmations required of spent outputs
pub const DEFAULT_MINCONF: u32 = 1;
/// Default onion packet size in bytes
pub const DEFAULT_ONION_SIZE: u32 = 1300;

/// Command name → schema lookup
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    schemas: HashMap<String, Arc<ParameterSchema>>,
}

impl Catalogue {
    /// Empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared instance holding the built-in schemas, built on first use
    pub fn builtin() -> &'static Catalogue {
        static BUILTIN: OnceLock<Catalogue> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut catalogue = Catalogue::new();
            for schema in builtin_schemas() {
                catalogue.register(schema);
            }
            catalogue
        })
    }

    /// Add or replace a schema, returning the one it replaced
    pub fn register(&mut self, schema: ParameterSchema) -> Option<Arc<ParameterSchema>> {
        self.schemas.insert(schema.method().to_string(), Arc::new(schema))
    }

    /// Builder form of [`Catalogue::register`]
    pub fn with_schema(mut self, schema: ParameterSchema) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, method: &str) -> Option<Arc<ParameterSchema>> {
        self.schemas.get(method).cloned()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.schemas.contains_key(method)
    }

    /// Command names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Default error mapper extended with every schema's own codes
    pub fn error_mapper(&self) -> ErrorMapper {
        let mut mapper = ErrorMapper::new();
        for schema in self.schemas.values() {
            for (code, kind) in schema.error_codes() {
                mapper.register_command_code(schema.method(), *code, *kind);
            }
        }
        mapper
    }
}

fn feerate() -> Grammar {
    Grammar::Feerate(FeerateSpec::default())
}

fn sat() -> Grammar {
    Grammar::Amount(AmountSpec::sat())
}

fn msat() -> Grammar {
    Grammar::Amount(AmountSpec::msat())
}

fn builtin_schemas() -> Vec<ParameterSchema> {
    vec![
        ParameterSchema::new("invoice")
            .required("msatoshi", Grammar::Amount(AmountSpec::msat().accepting_any()))
            .required("label", Grammar::Label)
            .required("description", Grammar::Text)
            .optional_with_default("expiry", Grammar::Duration, json!(DEFAULT_INVOICE_EXPIRY))
            .optional("fallbacks", Grammar::TextList)
            .optional("preimage", Grammar::Hex(HexSpec::bytes(32)))
            .optional("exposeprivatechannels", Grammar::Raw)
            .optional("cltv", Grammar::U32)
            .error_code(INVOICE_LABEL_ALREADY_EXISTS, DaemonErrorKind::Conflict)
            .error_code(INVOICE_PREIMAGE_ALREADY_EXISTS, DaemonErrorKind::Conflict),
        ParameterSchema::new("createinvoice")
            .required("invstring", Grammar::Text)
            .required("label", Grammar::Label)
            .required("preimage", Grammar::Hex(HexSpec::bytes(32)))
            .error_code(INVOICE_LABEL_ALREADY_EXISTS, DaemonErrorKind::Conflict)
            .error_code(INVOICE_PREIMAGE_ALREADY_EXISTS, DaemonErrorKind::Conflict),
        ParameterSchema::new("checkmessage")
            .required("message", Grammar::Text)
            .required("zbase", Grammar::Text)
            .optional("pubkey", Grammar::PubKey)
            .error_code(INVALID_PARAMS, DaemonErrorKind::InvalidParameters)
            .error_code(SIGNMESSAGE_PUBKEY_NOT_FOUND, DaemonErrorKind::DomainNotFound),
        ParameterSchema::new("fundchannel")
            .required("id", Grammar::PubKey)
            .required("amount", Grammar::Amount(AmountSpec::sat().accepting_all()))
            .optional("feerate", feerate())
            .optional_with_default("announce", Grammar::Bool, json!(true))
            .optional_with_default("minconf", Grammar::U32, json!(DEFAULT_MINCONF))
            .optional("utxos", Grammar::UtxoList)
            .optional("push_msat", msat())
            .optional("close_to", Grammar::Text)
            .optional("request_amt", sat())
            .optional("compact_lease", Grammar::Hex(HexSpec::any_length()))
            .error_code(FUND_CANNOT_AFFORD, DaemonErrorKind::InsufficientFunds)
            .error_code(FUNDING_UNKNOWN_PEER, DaemonErrorKind::DomainNotFound),
        ParameterSchema::new("fundchannel_start")
            .required("id", Grammar::PubKey)
            .required("amount", sat())
            .optional("feerate", feerate())
            .optional_with_default("announce", Grammar::Bool, json!(true))
            .optional("close_to", Grammar::Text)
            .optional("push_msat", msat())
            .error_code(FUNDING_UNKNOWN_PEER, DaemonErrorKind::DomainNotFound),
        ParameterSchema::new("setchannel")
            .required("id", Grammar::ChannelRef)
            .optional("feebase", msat())
            .optional("feeppm", Grammar::U32)
            .optional("htlcmin", msat())
            .optional("htlcmax", msat())
            .optional_with_default("enforcedelay", Grammar::Duration, json!(DEFAULT_ENFORCE_DELAY)),
        ParameterSchema::new("txprepare")
            .required("outputs", Grammar::Outputs)
            .optional("feerate", feerate())
            .optional_with_default("minconf", Grammar::U32, json!(DEFAULT_MINCONF))
            .optional("utxos", Grammar::UtxoList)
            .error_code(FUND_CANNOT_AFFORD, DaemonErrorKind::InsufficientFunds),
        ParameterSchema::new("utxopsbt")
            .required("satoshi", Grammar::Amount(AmountSpec::sat().accepting_all()))
            .required("feerate", feerate())
            .required("startweight", Grammar::U32)
            .required("utxos", Grammar::UtxoList)
            .optional("reserve", Grammar::BoolOrU32)
            .optional("reservedok", Grammar::Bool)
            .optional("locktime", Grammar::U32)
            .optional("min_witness_weight", Grammar::U32)
            .optional("excess_as_change", Grammar::Bool)
            .error_code(FUND_CANNOT_AFFORD, DaemonErrorKind::InsufficientFunds),
        ParameterSchema::new("createonion")
            .required("hops", Grammar::OnionHops)
            .required("assocdata", Grammar::Hex(HexSpec::any_length()))
            .optional("session_key", Grammar::Hex(HexSpec::bytes(32)))
            .optional_with_default("onion_size", Grammar::U32, json!(DEFAULT_ONION_SIZE)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_methods() {
        assert_eq!(
            Catalogue::builtin().methods(),
            [
                "checkmessage",
                "createinvoice",
                "createonion",
                "fundchannel",
                "fundchannel_start",
                "invoice",
                "setchannel",
                "txprepare",
                "utxopsbt"
            ]
        );
    }

    #[test]
    fn test_builtin_defaults() {
        let catalogue = Catalogue::builtin();
        let default_of = |method: &str, field: &str| {
            catalogue
                .get(method)
                .and_then(|s| s.field(field).and_then(|f| f.default.clone()))
        };

        assert_eq!(default_of("invoice", "expiry"), Some(json!(604_800)));
        assert_eq!(default_of("setchannel", "enforcedelay"), Some(json!(600)));
        assert_eq!(default_of("fundchannel", "minconf"), Some(json!(1)));
        assert_eq!(default_of("txprepare", "minconf"), Some(json!(1)));
        assert_eq!(default_of("createonion", "onion_size"), Some(json!(1300)));
        assert_eq!(default_of("checkmessage", "pubkey"), None);
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = Catalogue::builtin().get("invoice").unwrap();
        let b = Catalogue::builtin().get("invoice").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_register_replaces() {
        let mut catalogue = Catalogue::builtin().clone();
        let replaced = catalogue.register(ParameterSchema::new("invoice").required("label", Grammar::Label));
        assert!(replaced.is_some());
        assert_eq!(catalogue.get("invoice").unwrap().fields().len(), 1);
        // The shared instance is untouched
        assert_eq!(Catalogue::builtin().get("invoice").unwrap().fields().len(), 8);

        let extended = Catalogue::new().with_schema(ParameterSchema::new("getinfo"));
        assert!(extended.contains("getinfo"));
        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn test_error_mapper_uses_command_codes() {
        let mapper = Catalogue::new()
            .with_schema(ParameterSchema::new("pay").error_code(205, DaemonErrorKind::DomainNotFound))
            .error_mapper();

        assert_eq!(mapper.classify(Some("pay"), 205), DaemonErrorKind::DomainNotFound);
        assert_eq!(mapper.classify(Some("invoice"), 205), DaemonErrorKind::UnknownDaemonError);
        assert_eq!(
            Catalogue::builtin().error_mapper().classify(Some("checkmessage"), 1301),
            DaemonErrorKind::DomainNotFound
        );
    }

    #[test]
    fn test_builtin_mapper_scopes_family_codes() {
        let mapper = Catalogue::builtin().error_mapper();

        assert_eq!(mapper.classify(Some("setchannel"), 1301), DaemonErrorKind::UnknownDaemonError);
        assert_eq!(mapper.classify(Some("checkmessage"), 301), DaemonErrorKind::UnknownDaemonError);
        assert_eq!(mapper.classify(Some("utxopsbt"), 301), DaemonErrorKind::InsufficientFunds);
        assert_eq!(mapper.classify(Some("createonion"), -32602), DaemonErrorKind::InvalidParameters);
    }
}
