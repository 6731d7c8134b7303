//! # Parse Orchestrator
//!
//! [`Schema::run`] drives one node through its state machine:
//!
//! 1. **Absent input.** A nil value is replaced by the default when one
//!    is set; otherwise a nilable or optional node accepts it as is.
//! 2. **Coercion** when the node was built with `.coerce()`.
//! 3. **Type check and descent** per kind ([`leaf`], [`composite`]).
//!    Composite kinds push a path segment per child, run the child on the
//!    same payload, and pop, so child issues carry absolute paths.
//! 4. **Checks** in attachment order, unless the type check rejected the
//!    value.
//! 5. **Prefault.** If anything failed and a prefault is set, the node's
//!    issues are discarded and the node reruns once on the prefault value.
//!
//! The public entry points finalize the payload into either the output
//! value or a [`ParseError`].

mod composite;
mod leaf;

use std::any::type_name;

use sieve_core::{ErrorMap, FromValue, IssueSource, ParseError, Payload, RawIssue, Value};
use tracing::trace;

use crate::check::run_checks;
use crate::coerce::coerce;
use crate::schema::{Kind, Schema};

/// Per-call parse settings.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Consulted after check- and schema-level maps, before the global one.
    pub error_map: Option<ErrorMap>,
    /// Keep the offending input on finalized issues.
    pub report_input: bool,
}

impl Schema {
    /// Validate the payload's value in place.
    pub(crate) fn run(&self, p: &mut Payload) {
        self.run_node(p, true);
    }

    fn run_node(&self, p: &mut Payload, allow_prefault: bool) {
        let internals = self.internals();
        trace!(
            type_code = %self.type_code(),
            depth = p.path().len(),
            "parse node"
        );

        if p.value.is_nil() {
            if let Some(default) = &internals.default {
                p.value = default.produce();
            } else if internals.nilable || self.is_optional() {
                return;
            }
        }

        if internals.coerce {
            let value = p.take_value();
            p.value = coerce(self.kind(), value);
        }

        let mark = p.issue_count();
        let accepted = self.parse_kind(p);

        let name = self.kind().type_code().as_str();
        for issue in p.issues_since_mut(mark) {
            if issue.inst.is_none() {
                issue.inst = Some(IssueSource::new(name, internals.error.clone()));
            }
        }

        if accepted {
            run_checks(&internals.checks, p, mark, internals.error.as_ref());
        }

        if allow_prefault && p.issue_count() > mark {
            if let Some(prefault) = &internals.prefault {
                trace!(type_code = %self.type_code(), "validation failed; using prefault");
                p.truncate_issues(mark);
                p.value = prefault.produce();
                self.run_node(p, false);
            }
        }
    }

    /// Type check and descend. Returns `false` when the value was
    /// rejected outright and checks must not run.
    fn parse_kind(&self, p: &mut Payload) -> bool {
        match self.kind() {
            Kind::Union(options) => composite::union(options, p),
            Kind::Xor(options) => composite::xor(options, p),
            Kind::Intersection(left, right) => composite::intersection(left, right, p),
            Kind::DiscriminatedUnion {
                discriminator,
                options,
            } => composite::discriminated_union(discriminator, options, p),
            Kind::Object(shape) | Kind::Struct(shape) => composite::object(self.kind(), shape, p),
            Kind::Record { key, value } => composite::record(key, value, p),
            Kind::Map { key, value } => composite::map(key, value, p),
            Kind::Set(element) => composite::set(element, p),
            Kind::Slice(element) => composite::slice(element, p),
            Kind::Array { element, length } => composite::array(element, *length, p),
            Kind::Tuple { items, rest } => composite::tuple(items, rest.as_ref(), p),
            Kind::Lazy(lazy) => composite::lazy(lazy, p),
            Kind::Pipe { input, output } => composite::pipe(input, output, p),
            Kind::Transform { input, func } => composite::transform(input, func.as_ref(), p),
            leaf_kind => leaf::parse(leaf_kind, p),
        }
    }

    /// Validate `input`, returning the output value.
    pub fn parse_any(&self, input: impl Into<Value>) -> Result<Value, ParseError> {
        self.parse_any_with(input, &ParseOptions::default())
    }

    pub fn parse_any_with(
        &self,
        input: impl Into<Value>,
        options: &ParseOptions,
    ) -> Result<Value, ParseError> {
        let mut payload = Payload::new(input);
        self.run(&mut payload);
        let (value, issues) = payload.into_parts();
        if issues.is_empty() {
            Ok(value)
        } else {
            Err(ParseError::from_raw(
                issues,
                options.error_map.as_ref(),
                options.report_input,
            ))
        }
    }

    /// Validate `input` and extract the output as `T`. An output that
    /// does not extract as `T` is reported as `invalid_type`.
    pub fn parse<T: FromValue>(&self, input: impl Into<Value>) -> Result<T, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with<T: FromValue>(
        &self,
        input: impl Into<Value>,
        options: &ParseOptions,
    ) -> Result<T, ParseError> {
        let value = self.parse_any_with(input, options)?;
        T::from_value(value).map_err(|value| {
            ParseError::from_raw(
                vec![RawIssue::invalid_type(type_name::<T>(), value)],
                options.error_map.as_ref(),
                options.report_input,
            )
        })
    }

    /// [`Schema::parse`], panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the rendered [`ParseError`] when validation fails.
    pub fn must_parse<T: FromValue>(&self, input: impl Into<Value>) -> T {
        match self.parse(input) {
            Ok(value) => value,
            Err(err) => panic!("must_parse: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::IssueCode;

    #[test]
    fn test_leaf_type_mismatch_skips_checks() {
        let err = Schema::string().min(3).parse_any(5).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.issues()[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_optional_and_nilable_accept_nil() {
        assert_eq!(Schema::string().optional().parse_any(Value::Nil), Ok(Value::Nil));
        assert_eq!(Schema::string().nilable().parse_any(()), Ok(Value::Nil));
        assert!(Schema::string().parse_any(()).is_err());
        assert!(Schema::string().optional().non_optional().parse_any(()).is_err());
    }

    #[test]
    fn test_default_runs_validation_on_substitute() {
        let s = Schema::int().min(5).default(10);
        assert_eq!(s.parse_any(()), Ok(Value::Int(10)));
        let bad = Schema::int().min(5).default(1);
        assert!(bad.parse_any(()).is_err());
        let generated = Schema::string().default_with(|| Value::from("gen"));
        assert_eq!(generated.parse::<String>(()).as_deref(), Ok("gen"));
    }

    #[test]
    fn test_prefault_only_on_failure() {
        let s = Schema::int().min(5).prefault(7);
        assert_eq!(s.parse_any(9), Ok(Value::Int(9)));
        assert_eq!(s.parse_any(1), Ok(Value::Int(7)));
        let bad = Schema::int().min(5).prefault(2);
        let err = bad.parse_any(1).unwrap_err();
        assert_eq!(err.issues()[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_typed_parse_mismatch() {
        let err = Schema::any().parse::<i64>("x").unwrap_err();
        assert_eq!(err.issues()[0].code, IssueCode::InvalidType);
        assert_eq!(Schema::int().parse::<i64>(3), Ok(3));
    }

    #[test]
    fn test_schema_error_map_applies() {
        let s = Schema::string().error("need text");
        let err = s.parse_any(1).unwrap_err();
        assert_eq!(err.issues()[0].message, "need text");
    }

    #[test]
    fn test_check_error_beats_schema_error() {
        let s = Schema::string()
            .check(crate::check::length::min_length(3, "too short"))
            .error("schema level");
        let err = s.parse_any("ab").unwrap_err();
        assert_eq!(err.issues()[0].message, "too short");
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Schema::int().coerce().parse_any("12"), Ok(Value::Int(12)));
        assert!(Schema::int().parse_any("12").is_err());
    }

    #[test]
    fn test_parse_options_error_map() {
        let options = ParseOptions {
            error_map: Some(ErrorMap::new(|issue| {
                (issue.code == IssueCode::InvalidType).then(|| "per-parse".to_string())
            })),
            report_input: true,
        };
        let err = Schema::bool().parse_any_with("yes", &options).unwrap_err();
        assert_eq!(err.issues()[0].message, "per-parse");
        assert_eq!(err.issues()[0].input, Some(Value::from("yes")));
    }

    #[test]
    #[should_panic(expected = "must_parse")]
    fn test_must_parse_panics() {
        let _: String = Schema::string().must_parse(1);
    }
}
