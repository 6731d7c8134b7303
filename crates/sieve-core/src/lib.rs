//! # sieve-core: Value Model for the sieve Schema Toolkit
//!
//! This crate is the leaf of the workspace. It defines the data that
//! flows through validation and the shapes in which failures are
//! reported; it knows nothing about schemas or JSON Schema documents.
//!
//! ## Key Types
//!
//! 1. **[`Value`]**: untyped carrier for inputs and outputs. Richer than
//!    JSON: big integers, complex numbers, files, timestamps, functions,
//!    and maps with non-string keys are first-class.
//!
//! 2. **[`Payload`]**: the mutable unit passed through the check
//!    pipeline: current value, path stack, accumulated issues.
//!
//! 3. **[`RawIssue`]** / **[`IssueCode`]**: structured failures before
//!    message resolution, built through code-specific factories.
//!
//! 4. **[`ParseError`]**: aggregated failure exposing issues as a flat
//!    list, a first-segment grouping, and a path-indexed tree.
//!
//! 5. **[`Bag`]**: per-schema emission hints with write-time merge rules.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod bag;
pub mod config;
pub mod error;
pub mod error_map;
pub mod issue;
pub mod path;
pub mod payload;
pub mod value;

pub use bag::Bag;
pub use error::{ErrorTree, FlattenedError, Issue, Issues, ParseError};
pub use error_map::{default_message, ErrorMap};
pub use issue::{IssueCode, IssueSource, RawIssue};
pub use path::PathSegment;
pub use payload::Payload;
pub use value::{FileInfo, FromValue, FunctionRef, Value};
