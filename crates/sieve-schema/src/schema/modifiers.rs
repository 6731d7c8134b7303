//! Fluent modifiers available on every schema.
//!
//! Wrappers derive a decorated node; constraint modifiers attach the
//! matching check. `min`/`max`/`length` pick the check family from the
//! schema kind: length for strings and arrays, entry count for objects
//! and maps, byte size for files, and value bounds for everything else.

use std::sync::Arc;

use regex::Regex;
use sieve_core::{ErrorMap, Payload, Value};

use super::{DefaultValue, Kind, Schema, WrapperKind};
use crate::check::format::{self, StringFormat};
use crate::check::{custom, file, length, numeric, string, Check, Params};
use crate::error::SchemaError;
use crate::registry::{Meta, Registry};

#[derive(Clone, Copy)]
enum Measure {
    Length,
    Size,
    FileSize,
    Bound,
}

fn as_count(value: &Value) -> u64 {
    value
        .as_i128()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

impl Schema {
    fn measure(&self) -> Measure {
        match self.kind() {
            Kind::String(_)
            | Kind::Slice(_)
            | Kind::Array { .. }
            | Kind::Set(_)
            | Kind::Tuple { .. } => Measure::Length,
            Kind::Object(_) | Kind::Struct(_) | Kind::Record { .. } | Kind::Map { .. } => {
                Measure::Size
            }
            Kind::File => Measure::FileSize,
            _ => Measure::Bound,
        }
    }

    // ─── Wrappers ───────────────────────────────────────────────────

    /// Accept absent input.
    pub fn optional(&self) -> Schema {
        self.wrap(WrapperKind::Optional, |i| i.optional = true)
    }

    /// Accept explicit null.
    pub fn nilable(&self) -> Schema {
        self.wrap(WrapperKind::Nilable, |i| i.nilable = true)
    }

    pub fn nullish(&self) -> Schema {
        self.optional().nilable()
    }

    /// Reject absent input even if an inner wrapper accepted it.
    pub fn non_optional(&self) -> Schema {
        self.wrap(WrapperKind::NonOptional, |i| {
            i.optional = false;
            i.non_optional = true;
        })
    }

    /// Substitute `value` for absent input.
    pub fn default(&self, value: impl Into<Value>) -> Schema {
        let value = DefaultValue::Value(value.into());
        self.wrap(WrapperKind::Default, |i| i.default = Some(value))
    }

    pub fn default_with(&self, f: impl Fn() -> Value + Send + Sync + 'static) -> Schema {
        let value = DefaultValue::Func(Arc::new(f));
        self.wrap(WrapperKind::Default, |i| i.default = Some(value))
    }

    /// Substitute `value` when validation of the input fails.
    pub fn prefault(&self, value: impl Into<Value>) -> Schema {
        let value = DefaultValue::Value(value.into());
        self.wrap(WrapperKind::Prefault, |i| i.prefault = Some(value))
    }

    pub fn prefault_with(&self, f: impl Fn() -> Value + Send + Sync + 'static) -> Schema {
        let value = DefaultValue::Func(Arc::new(f));
        self.wrap(WrapperKind::Prefault, |i| i.prefault = Some(value))
    }

    /// Register `meta` for a new node in `registry`.
    pub fn register(&self, registry: &Registry, meta: Meta) -> Schema {
        let schema = self.wrap(WrapperKind::Meta, |_| {});
        registry.add(&schema, meta);
        schema
    }

    /// Register `meta` in the global registry.
    pub fn meta(&self, meta: Meta) -> Schema {
        self.register(Registry::global(), meta)
    }

    pub fn describe(&self, description: impl Into<String>) -> Schema {
        self.meta(Meta::new().description(description))
    }

    // ─── Behavior ───────────────────────────────────────────────────

    /// Schema-level error map for every issue this node reports.
    pub fn error(&self, map: impl Into<ErrorMap>) -> Schema {
        let map = map.into();
        self.wrap(WrapperKind::Meta, |i| i.error = Some(map))
    }

    /// Convert compatible inputs before the type check.
    pub fn coerce(&self) -> Schema {
        self.wrap(WrapperKind::Meta, |i| i.coerce = true)
    }

    pub fn refine(&self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Schema {
        self.check(custom::refine(predicate, ()))
    }

    pub fn refine_with(
        &self,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        params: impl Into<Params>,
    ) -> Schema {
        self.check(custom::refine(predicate, params))
    }

    pub fn super_refine(&self, body: impl Fn(&mut Payload) + Send + Sync + 'static) -> Schema {
        self.check(custom::super_refine(body, ()))
    }

    pub fn overwrite(&self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Schema {
        self.check(custom::overwrite(f))
    }

    /// Parse with `self`, then map the output through `f`. An `Err` is
    /// reported as a `custom` issue carrying the message.
    pub fn transform(
        &self,
        f: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Schema {
        Schema::new(Kind::Transform {
            input: self.clone(),
            func: Arc::new(f),
        })
    }

    pub fn pipe(&self, output: Schema) -> Schema {
        Schema::pipeline(self.clone(), output)
    }

    // ─── Bounds ─────────────────────────────────────────────────────

    pub fn min(&self, n: impl Into<Value>) -> Schema {
        let n = n.into();
        self.check(match self.measure() {
            Measure::Length => length::min_length(as_count(&n) as usize, ()),
            Measure::Size => length::min_size(as_count(&n), ()),
            Measure::FileSize => file::min_file_size(as_count(&n), ()),
            Measure::Bound => numeric::gte(n, ()),
        })
    }

    pub fn max(&self, n: impl Into<Value>) -> Schema {
        let n = n.into();
        self.check(match self.measure() {
            Measure::Length => length::max_length(as_count(&n) as usize, ()),
            Measure::Size => length::max_size(as_count(&n), ()),
            Measure::FileSize => file::max_file_size(as_count(&n), ()),
            Measure::Bound => numeric::lte(n, ()),
        })
    }

    /// Exact length, entry count, or file size.
    pub fn length(&self, n: u64) -> Schema {
        self.check(match self.measure() {
            Measure::Size => length::size(n, ()),
            Measure::FileSize => file::file_size(n, ()),
            _ => length::length(n as usize, ()),
        })
    }

    pub fn gt(&self, n: impl Into<Value>) -> Schema {
        self.check(numeric::gt(n, ()))
    }

    pub fn gte(&self, n: impl Into<Value>) -> Schema {
        self.check(numeric::gte(n, ()))
    }

    pub fn lt(&self, n: impl Into<Value>) -> Schema {
        self.check(numeric::lt(n, ()))
    }

    pub fn lte(&self, n: impl Into<Value>) -> Schema {
        self.check(numeric::lte(n, ()))
    }

    pub fn positive(&self) -> Schema {
        self.check(numeric::positive(()))
    }

    pub fn non_negative(&self) -> Schema {
        self.check(numeric::non_negative(()))
    }

    pub fn negative(&self) -> Schema {
        self.check(numeric::negative(()))
    }

    pub fn non_positive(&self) -> Schema {
        self.check(numeric::non_positive(()))
    }

    pub fn multiple_of(&self, divisor: impl Into<Value>) -> Schema {
        self.check(numeric::multiple_of(divisor, ()))
    }

    pub fn finite(&self) -> Schema {
        self.check(numeric::finite(()))
    }

    pub fn safe(&self) -> Schema {
        self.check(numeric::safe(()))
    }

    // ─── Strings ────────────────────────────────────────────────────

    /// Add a format check to a string schema.
    pub fn format(&self, fmt: StringFormat) -> Schema {
        self.check(format::format(fmt, ()))
    }

    pub fn regex(&self, re: &Regex) -> Schema {
        self.check(string::regex(re, ()))
    }

    /// [`Schema::regex`] from source text.
    pub fn pattern(&self, pattern: &str) -> Result<Schema, SchemaError> {
        let re = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.regex(&re))
    }

    pub fn includes(&self, needle: impl Into<String>) -> Schema {
        self.check(string::includes(needle, ()))
    }

    pub fn starts_with(&self, prefix: impl Into<String>) -> Schema {
        self.check(string::starts_with(prefix, ()))
    }

    pub fn ends_with(&self, suffix: impl Into<String>) -> Schema {
        self.check(string::ends_with(suffix, ()))
    }

    pub fn lowercase(&self) -> Schema {
        self.check(string::lowercase(()))
    }

    pub fn uppercase(&self) -> Schema {
        self.check(string::uppercase(()))
    }

    pub fn trim(&self) -> Schema {
        self.check(string::trim())
    }

    pub fn to_lower_case(&self) -> Schema {
        self.check(string::to_lower_case())
    }

    pub fn to_upper_case(&self) -> Schema {
        self.check(string::to_upper_case())
    }

    /// Earliest accepted ISO date or datetime.
    pub fn iso_min(&self, bound: impl Into<String>) -> Schema {
        self.check(format::iso_min(bound, ()))
    }

    /// Latest accepted ISO date or datetime.
    pub fn iso_max(&self, bound: impl Into<String>) -> Schema {
        self.check(format::iso_max(bound, ()))
    }

    // ─── Files ──────────────────────────────────────────────────────

    pub fn mime<I, S>(&self, types: I) -> Schema
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check(file::mime(types, ()))
    }

    /// Attach several checks in order.
    pub fn checks(&self, checks: impl IntoIterator<Item = Check>) -> Schema {
        checks
            .into_iter()
            .fold(self.clone(), |schema, check| schema.check(check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_min_max_dispatch_by_kind() {
        let s = Schema::string().min(2).max(5);
        assert_eq!(s.internals().bag.get("minLength"), Some(&json!(2)));
        assert_eq!(s.internals().bag.get("maxLength"), Some(&json!(5)));

        let n = Schema::float().min(5).max(10);
        assert_eq!(n.internals().bag.get("minimum"), Some(&json!(5)));
        assert_eq!(n.internals().bag.get("maximum"), Some(&json!(10)));

        let o = Schema::record(Schema::string(), Schema::int()).min(1);
        assert_eq!(o.internals().bag.get("minSize"), Some(&json!(1)));
    }

    #[test]
    fn test_bound_merge_keeps_stricter() {
        let s = Schema::int().min(1).min(5).max(10).max(7);
        assert_eq!(s.internals().bag.get("minimum"), Some(&json!(5)));
        assert_eq!(s.internals().bag.get("maximum"), Some(&json!(7)));
        let s = Schema::int().gt(3).gte(3);
        assert_eq!(s.internals().bag.get("exclusiveMinimum"), None);
        assert_eq!(s.internals().bag.get("minimum"), Some(&json!(3)));
    }

    #[test]
    fn test_pattern_rejects_bad_regex() {
        assert!(Schema::string().pattern("^[a-z]+$").is_ok());
        let err = Schema::string().pattern("(").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_patterns_deduplicate() {
        let s = Schema::string().starts_with("ab").starts_with("ab").ends_with("z");
        assert_eq!(s.internals().bag.patterns().len(), 2);
    }

    #[test]
    fn test_register_in_isolated_registry() {
        let registry = Registry::new();
        let s = Schema::string().register(&registry, Meta::new().id("Name"));
        assert_eq!(registry.get(&s).and_then(|m| m.id).as_deref(), Some("Name"));
        assert!(Registry::global().get_own(&s).is_none());
    }

    #[test]
    fn test_flags() {
        let s = Schema::string().optional();
        assert!(s.is_optional());
        assert!(!s.non_optional().is_optional());
        let d = Schema::int().default(1);
        assert!(d.internals().default.is_some());
        assert!(Schema::int().coerce().internals().coerce);
    }
}
