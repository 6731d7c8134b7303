//! Custom checks, overwrites, property checks, and metadata checks.
//!
//! ## Refinement Signatures
//!
//! Refinements come in a closed set of shapes:
//!
//! - [`refine`]: predicate over the untyped [`Value`].
//! - [`refine_typed`]: predicate over a typed extraction `T: FromValue`.
//!   A value that does not extract as `T` fails with a `custom` issue.
//! - [`super_refine`]: full access to the [`Payload`], free to add any
//!   number of issues.
//!
//! Every refinement runs inside an unwind boundary: a panicking predicate
//! is reported as a `custom` issue rather than tearing down the parse.

use std::any::type_name;
use std::panic::{catch_unwind, AssertUnwindSafe};

use sieve_core::{FromValue, Payload, RawIssue, Value};
use tracing::warn;

use super::{Check, CustomParams, Params};
use crate::registry::{Meta, Registry};
use crate::schema::Schema;

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

fn custom_issue(params: &CustomParams, input: Value) -> RawIssue {
    let mut issue = RawIssue::custom(None, input).with_path(params.path.clone());
    issue.properties.extend(params.params.clone());
    issue
}

/// Report a panicking refinement as a `custom` issue.
fn report_panic(p: &mut Payload, params: &CustomParams, name: &str, message: String) {
    warn!(check = name, panic = %message, "refinement panicked; reporting as issue");
    let input = p.value.clone();
    p.add_issue(custom_issue(params, input).with_property("panic", message));
}

fn predicate_check(
    name: &'static str,
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    params: CustomParams,
) -> Check {
    let captured = params.clone();
    Check::new(name, move |p: &mut Payload| {
        match catch_unwind(AssertUnwindSafe(|| predicate(&p.value))) {
            Ok(true) => {}
            Ok(false) => {
                let input = p.value.clone();
                p.add_issue(custom_issue(&captured, input));
            }
            Err(panic) => report_panic(p, &captured, name, panic_message(panic.as_ref())),
        }
    })
    .with_params(&params)
}

/// Predicate check reported as `custom`.
pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static, params: impl Into<Params>) -> Check {
    predicate_check("custom", predicate, params.into().normalize())
}

/// Predicate over the untyped value.
pub fn refine(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static, params: impl Into<Params>) -> Check {
    predicate_check("refine", predicate, params.into().normalize())
}

/// Predicate over a typed view of the value.
pub fn refine_typed<T, F>(predicate: F, params: impl Into<Params>) -> Check
where
    T: FromValue,
    F: Fn(T) -> bool + Send + Sync + 'static,
{
    let params = params.into().normalize();
    let captured = params.clone();
    Check::new("refine", move |p: &mut Payload| {
        let typed = match T::from_value(p.value.clone()) {
            Ok(typed) => typed,
            Err(input) => {
                p.add_issue(custom_issue(&captured, input).with_property("expected", type_name::<T>()));
                return;
            }
        };
        match catch_unwind(AssertUnwindSafe(|| predicate(typed))) {
            Ok(true) => {}
            Ok(false) => {
                let input = p.value.clone();
                p.add_issue(custom_issue(&captured, input));
            }
            Err(panic) => report_panic(p, &captured, "refine", panic_message(panic.as_ref())),
        }
    })
    .with_params(&params)
}

/// Refinement with direct access to the payload.
pub fn super_refine(body: impl Fn(&mut Payload) + Send + Sync + 'static, params: impl Into<Params>) -> Check {
    let params = params.into().normalize();
    let captured = params.clone();
    Check::new("super_refine", move |p: &mut Payload| {
        let before = p.issue_count();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| body(p))) {
            p.truncate_issues(before);
            report_panic(p, &captured, "super_refine", panic_message(panic.as_ref()));
        }
    })
    .with_params(&params)
}

/// Replace the value with `f(value)`. Never reports issues.
pub fn overwrite(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Check {
    Check::new("overwrite", move |p: &mut Payload| {
        let value = p.take_value();
        p.value = f(value);
    })
}

/// Validate one field of an object value against `schema`. Issues are
/// reported under the field name; the value itself is left unchanged.
pub fn property(name: impl Into<String>, schema: Schema, params: impl Into<Params>) -> Check {
    let name = name.into();
    let params = params.into().normalize();
    Check::new("property", move |p: &mut Payload| {
        let Value::Object(fields) = &p.value else {
            return;
        };
        let field = fields.get(&name).cloned().unwrap_or_default();
        let mut fork = p.fork(field);
        fork.push_path(name.as_str());
        schema.run(&mut fork);
        p.absorb(fork.take_issues());
    })
    .with_params(&params)
}

/// Metadata check merging `meta` into the host schema's entry in
/// `registry`. Validation is a no-op.
pub fn meta_in(registry: &Registry, meta: Meta) -> Check {
    let registry = registry.clone();
    Check::new("meta", |_: &mut Payload| {}).on_attach(move |ctx| ctx.register(&registry, meta.clone()))
}

/// [`meta_in`] against the global registry.
pub fn meta(meta: Meta) -> Check {
    meta_in(Registry::global(), meta)
}

/// Set the host schema's description in the global registry.
pub fn describe(description: impl Into<String>) -> Check {
    meta_in(Registry::global(), Meta::new().description(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::run_checks;
    use sieve_core::{IssueCode, PathSegment};

    fn run(check: Check, value: impl Into<Value>) -> Payload {
        let mut payload = Payload::new(value);
        run_checks(&[check], &mut payload, 0, None);
        payload
    }

    #[test]
    fn test_refine_reports_custom_with_params() {
        let check = refine(
            |v| v.as_str().is_some_and(|s| s.len() > 3),
            CustomParams::new().path(["confirm"]).param("rule", "len"),
        );
        let payload = run(check, "ab");
        let issue = &payload.issues()[0];
        assert_eq!(issue.code, IssueCode::Custom);
        assert_eq!(issue.path, vec![PathSegment::from("confirm")]);
        assert_eq!(issue.property("rule"), Some(&Value::from("len")));
    }

    #[test]
    fn test_refine_typed_mismatch_is_custom() {
        let check = refine_typed(|n: i64| n % 2 == 0, ());
        assert!(!run(check.clone(), 4).has_issues());
        assert!(run(check.clone(), 3).has_issues());
        let payload = run(check, "four");
        assert_eq!(payload.issues()[0].code, IssueCode::Custom);
        assert!(payload.issues()[0].property("expected").is_some());
    }

    #[test]
    fn test_panicking_refine_becomes_issue() {
        let check = refine(|_| panic!("boom"), ());
        let payload = run(check, 1);
        let issue = &payload.issues()[0];
        assert_eq!(issue.code, IssueCode::Custom);
        assert_eq!(issue.property("panic"), Some(&Value::from("boom")));
    }

    #[test]
    fn test_super_refine_adds_many() {
        let check = super_refine(
            |p: &mut Payload| {
                p.add_issue(RawIssue::custom(Some("one".into()), Value::Nil));
                p.add_issue(RawIssue::custom(Some("two".into()), Value::Nil));
            },
            (),
        );
        assert_eq!(run(check, 1).issue_count(), 2);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let check = overwrite(|v| match v {
            Value::Int(i) => Value::Int(i * 2),
            other => other,
        });
        assert_eq!(run(check, 21).value, Value::Int(42));
    }

    #[test]
    fn test_property_prefixes_path() {
        let check = property("age", Schema::int().min(18), ());
        let mut input = std::collections::BTreeMap::new();
        input.insert("age".to_string(), Value::Int(12));
        let payload = run(check, input);
        assert_eq!(payload.issues()[0].path, vec![PathSegment::from("age")]);
        assert_eq!(payload.issues()[0].code, IssueCode::TooSmall);
    }
}
