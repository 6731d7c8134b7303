//! # Construction Errors
//!
//! Failures raised while *building* a schema, as opposed to validation
//! failures, which are reported through [`sieve_core::ParseError`].

use thiserror::Error;

use crate::schema::TypeCode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// An object helper was applied to a schema that is not an object or
    /// struct.
    #[error("expected an object or struct schema, found {found}")]
    NotObjectOrStruct { found: TypeCode },

    /// A regex pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// `pick`, `omit`, or `required` named a key the shape does not have.
    #[error("unknown key {key:?} in object shape")]
    UnknownKey { key: String },

    /// A discriminated union option is not an object whose discriminator
    /// field is a literal or enum.
    #[error("option {index} has no literal discriminator {discriminator:?}")]
    InvalidDiscriminator { index: usize, discriminator: String },
}
