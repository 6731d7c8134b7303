//! # sieve-schema: Schema Composition & Validation
//!
//! Builds schemas out of constructors and fluent modifiers, validates
//! untyped [`Value`]s against them, and keeps the metadata registry that
//! the JSON Schema bridge reads.
//!
//! ## Layers
//!
//! 1. **Checks** ([`check`]): units of validation with an optional guard,
//!    an abort flag, and `on_attach` callbacks that record emission hints
//!    in the host schema's [`Bag`].
//!
//! 2. **Schemas** ([`schema`]): a tagged sum of kinds plus an orthogonal
//!    decorator record (optionality, defaults, prefaults, coercion, error
//!    maps). Wrappers derive new nodes; nothing is mutated in place.
//!
//! 3. **Parsing** ([`parse`]): the per-node state machine: absent input,
//!    coercion, type check and descent, checks, prefault.
//!
//! 4. **Registry** ([`registry`]): schema identity → [`Meta`], with
//!    fall-through along wrapper chains.
//!
//! ## Example
//!
//! ```
//! use sieve_schema::Schema;
//!
//! let user = Schema::object([
//!     ("name", Schema::string().min(1)),
//!     ("age", Schema::uint8().optional()),
//! ]);
//! let out = user.parse_any(serde_json::json!({"name": "ada", "age": 36})).unwrap();
//! assert_eq!(out.get("name").and_then(|v| v.as_str()), Some("ada"));
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `sieve-core` internally.
//! - No `unsafe` code.
//! - Construction failures are [`SchemaError`]s; validation failures are
//!   [`ParseError`]s. The only panic is [`Schema::must_parse`].

pub mod check;
pub mod coerce;
pub mod error;
pub mod formats;
pub mod parse;
pub mod registry;
pub mod schema;

pub use check::format::StringFormat;
pub use check::{Check, CheckParams, CustomParams, Params};
pub use error::SchemaError;
pub use formats::{IsoDateTimeOptions, TimePrecision};
pub use parse::ParseOptions;
pub use registry::{Meta, Registry};
pub use schema::{
    discriminator_values, ComplexKind, DefaultValue, FloatKind, IntKind, Internals, Kind,
    LazySchema, ObjectShape, Schema, SchemaId, StringBoolOptions, TypeCode, UnknownKeys,
    WrapperKind,
};

pub use sieve_core::{
    Bag, ErrorMap, FileInfo, FromValue, FunctionRef, Issue, IssueCode, ParseError, PathSegment,
    RawIssue, Value,
};
