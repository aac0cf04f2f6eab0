//! Parameter grammars and command schemas for clnwire
//!
//! Everything here is pure and synchronous: it turns a caller's loosely
//! typed parameters into the exact form the daemon expects, or explains
//! every way in which they are wrong.
//!
//! - **Grammars**: [`amount`], [`feerate`] and [`duration`] parse the
//!   daemon's unit-suffixed literals and render their canonical wire form
//! - **Validators**: [`validate`] checks pass-through values (keys,
//!   outpoints, short channel ids, hex)
//! - **Schemas**: [`ParameterSchema`] declares a command's fields in
//!   positional order; [`canonicalize`] applies it
//! - **Catalogue**: [`Catalogue::builtin`] holds the built-in command set
//! - **Responses**: typed result shapes in [`responses`]
//!
//! # Example
//!
//! ```rust
//! use clnwire_schema::{canonicalize, Catalogue, ParamStyle};
//! use serde_json::json;
//!
//! let schema = Catalogue::builtin().get("setchannel").unwrap();
//! let input = json!({"id": "all", "feebase": "1sat", "feeppm": 10});
//! let bag = canonicalize(&schema, input.as_object().unwrap()).unwrap();
//!
//! assert_eq!(
//!     bag.encode(ParamStyle::Positional),
//!     json!(["all", "1000msat", 10, null, null, 600])
//! );
//! ```

pub mod amount;
pub mod canonical;
pub mod catalogue;
pub mod duration;
pub mod error;
pub mod feerate;
pub mod responses;
pub mod schema;
pub mod validate;

pub use amount::{parse_amount, AmountLiteral, AmountSpec, AmountUnit, BtcAmount};
pub use canonical::{canonicalize, canonicalize_value, CanonicalValue, ParamStyle, ParameterBag};
pub use catalogue::Catalogue;
pub use duration::{parse_duration, DurationLiteral};
pub use error::{GrammarError, GrammarResult};
pub use feerate::{parse_feerate, FeerateEstimate, FeerateLiteral, FeerateSpec};
pub use schema::{FieldSpec, Grammar, ParameterSchema};
pub use validate::{HexSpec, ShortChannelId};
