//! # Raw Issues
//!
//! A [`RawIssue`] is a structured validation failure as produced by a
//! check or a schema node, before message resolution. The parser turns
//! raw issues into finalized [`Issue`](crate::error::Issue)s once a parse
//! completes.
//!
//! Factories mirror the closed set of [`IssueCode`]s. Each fills the
//! origin-specific `properties` that the default error messages and
//! custom error maps read (`expected`, `maximum`, `inclusive`, `origin`,
//! `format`, `divisor`, `keys`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error_map::ErrorMap;
use crate::path::PathSegment;
use crate::value::Value;

/// Closed set of issue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidFormat,
    TooBig,
    TooSmall,
    NotMultipleOf,
    InvalidValue,
    InvalidUnion,
    InvalidKey,
    UnrecognizedKeys,
    Custom,
}

impl IssueCode {
    /// The canonical snake_case code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidFormat => "invalid_format",
            IssueCode::TooBig => "too_big",
            IssueCode::TooSmall => "too_small",
            IssueCode::NotMultipleOf => "not_multiple_of",
            IssueCode::InvalidValue => "invalid_value",
            IssueCode::InvalidUnion => "invalid_union",
            IssueCode::InvalidKey => "invalid_key",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The check or schema node that produced an issue.
///
/// Carries the producer's error map so message resolution can honor a
/// check-level or schema-level `error` override.
#[derive(Debug, Clone)]
pub struct IssueSource {
    /// Producer name (`min_length`, `string`, `refine`, ...).
    pub name: String,
    /// Producer-level error map, if one was configured.
    pub error: Option<ErrorMap>,
}

impl IssueSource {
    pub fn new(name: impl Into<String>, error: Option<ErrorMap>) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

/// A validation failure prior to message resolution.
#[derive(Debug, Clone)]
pub struct RawIssue {
    pub code: IssueCode,
    /// The offending value.
    pub input: Option<Value>,
    /// Absolute path once attached to a payload; relative before.
    pub path: Vec<PathSegment>,
    pub properties: BTreeMap<String, Value>,
    /// Explicit message that bypasses every error map.
    pub message: Option<String>,
    /// Whether sibling checks on the same node may still run.
    pub continuable: bool,
    pub inst: Option<IssueSource>,
    /// Per-branch issues for `invalid_union`; nested issues for `invalid_key`.
    pub errors: Vec<Vec<RawIssue>>,
}

impl RawIssue {
    /// Bare issue with no properties. Prefer the code-specific factories.
    pub fn new(code: IssueCode, input: Value) -> Self {
        Self {
            code,
            input: Some(input),
            path: Vec::new(),
            properties: BTreeMap::new(),
            message: None,
            continuable: true,
            inst: None,
            errors: Vec::new(),
        }
    }

    /// `invalid_type`: the input is not of the `expected` type.
    ///
    /// Type failures are terminal for the node that produced them.
    pub fn invalid_type(expected: &str, input: Value) -> Self {
        let received = input.type_name();
        Self::new(IssueCode::InvalidType, input)
            .with_property("expected", expected)
            .with_property("received", received)
            .terminal()
    }

    /// `invalid_format`: a string failed a named format. `extras` carries
    /// format-specific context such as `pattern`, `prefix`, or `suffix`.
    pub fn invalid_format(format: &str, input: Value, extras: BTreeMap<String, Value>) -> Self {
        let mut issue = Self::new(IssueCode::InvalidFormat, input).with_property("format", format);
        issue.properties.extend(extras);
        issue
    }

    /// `too_big`: the input exceeds `limit` for the given `origin`
    /// (`number`, `string`, `array`, `file`, ...).
    pub fn too_big(limit: impl Into<Value>, inclusive: bool, origin: &str, input: Value) -> Self {
        Self::new(IssueCode::TooBig, input)
            .with_property("maximum", limit)
            .with_property("inclusive", inclusive)
            .with_property("origin", origin)
    }

    /// `too_small`: the input falls below `limit` for the given `origin`.
    pub fn too_small(limit: impl Into<Value>, inclusive: bool, origin: &str, input: Value) -> Self {
        Self::new(IssueCode::TooSmall, input)
            .with_property("minimum", limit)
            .with_property("inclusive", inclusive)
            .with_property("origin", origin)
    }

    pub fn not_multiple_of(divisor: impl Into<Value>, input: Value) -> Self {
        Self::new(IssueCode::NotMultipleOf, input).with_property("divisor", divisor)
    }

    /// `invalid_value`: the input is not one of the allowed `values`.
    pub fn invalid_value(values: Vec<Value>, input: Value) -> Self {
        Self::new(IssueCode::InvalidValue, input).with_property("values", Value::Array(values))
    }

    /// `invalid_union`: no branch (or, for xor, not exactly one branch)
    /// accepted the input. `errors` holds each branch's issues.
    pub fn invalid_union(errors: Vec<Vec<RawIssue>>, input: Value) -> Self {
        let mut issue = Self::new(IssueCode::InvalidUnion, input).terminal();
        issue.errors = errors;
        issue
    }

    /// `invalid_key`: a record or map key failed its key schema.
    pub fn invalid_key(origin: &str, issues: Vec<RawIssue>, input: Value) -> Self {
        let mut issue = Self::new(IssueCode::InvalidKey, input).with_property("origin", origin);
        issue.errors = vec![issues];
        issue
    }

    pub fn unrecognized_keys(keys: Vec<String>, input: Value) -> Self {
        Self::new(IssueCode::UnrecognizedKeys, input).with_property("keys", keys)
    }

    /// `custom`: produced by refinements and custom checks.
    pub fn custom(message: Option<String>, input: Value) -> Self {
        let mut issue = Self::new(IssueCode::Custom, input);
        issue.message = message;
        issue
    }

    /// Builder: set one property.
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Builder: record the producing check or schema.
    pub fn with_source(mut self, source: IssueSource) -> Self {
        self.inst = Some(source);
        self
    }

    /// Builder: relative path below the node that produced the issue.
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Builder: mark the issue as aborting the current node.
    pub fn terminal(mut self) -> Self {
        self.continuable = false;
        self
    }

    /// Property lookup helper.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// `origin` property as a string, if present.
    pub fn origin(&self) -> Option<&str> {
        self.property("origin").and_then(Value::as_str)
    }
}
