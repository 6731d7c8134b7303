//! # Bridge Errors
//!
//! Emission and loading fail with their own enums. Neither returns a
//! partial document or schema: the first error aborts the run.

use sieve_schema::TypeCode;
use thiserror::Error;

/// Failure converting a schema into a JSON Schema document.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The schema accepts input that JSON cannot carry, such as a map
    /// keyed by non-strings.
    #[error("unsupported input type {type_code} at {path}")]
    UnsupportedInputType { type_code: TypeCode, path: String },

    /// A cycle was reached while cycles are configured to fail.
    #[error("circular reference at {path}")]
    CircularReference { path: String },

    /// The type has no JSON Schema equivalent (big integers, complex
    /// numbers, functions, output side of a transform, ...).
    #[error("type {type_code} is not representable in JSON Schema (at {path})")]
    UnrepresentableType { type_code: TypeCode, path: String },

    /// A deferred schema was never filled.
    #[error("lazy schema at {path} never resolved")]
    UnresolvedLazy { path: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure building a schema from a JSON Schema document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Strict mode met a keyword the loader does not model.
    #[error("unsupported keyword {keyword:?} at {path}")]
    UnsupportedKeyword { keyword: String, path: String },

    /// A `$ref` that is not a local pointer into the document, or whose
    /// target does not exist.
    #[error("unresolved reference {reference:?}")]
    UnresolvedReference { reference: String },

    #[error("invalid schema document at {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    #[error("invalid pattern {pattern:?} at {path}: {reason}")]
    InvalidPattern {
        pattern: String,
        path: String,
        reason: String,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_error_display() {
        let err = EmitError::UnrepresentableType {
            type_code: TypeCode::BigInt,
            path: "/amount".into(),
        };
        assert_eq!(
            err.to_string(),
            "type big_int is not representable in JSON Schema (at /amount)"
        );
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::UnsupportedKeyword {
            keyword: "if".into(),
            path: "#/properties/a".into(),
        };
        assert!(err.to_string().contains("\"if\""));
    }
}
