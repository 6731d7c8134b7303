//! Length and size checks.
//!
//! Length counts characters of strings and elements of arrays; size
//! counts entries of collections and bytes of files. Both carry a guard
//! so they only run against values that have a length (or size), and
//! therefore still report after a sibling issue aborted the node.

use std::sync::Arc;

use sieve_core::{Payload, RawIssue, Value};

use super::{Check, Params, WhenFn};

fn origin_of(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Map(_) => "map",
        Value::File(_) => "file",
        _ => "value",
    }
}

#[derive(Clone, Copy)]
enum Measure {
    Length,
    Size,
}

impl Measure {
    fn of(self, value: &Value) -> Option<u64> {
        match self {
            Measure::Length => value.length().map(|n| n as u64),
            Measure::Size => value.size(),
        }
    }

    fn guard(self) -> Arc<WhenFn> {
        Arc::new(move |p: &Payload| self.of(&p.value).is_some())
    }
}

#[derive(Clone, Copy)]
enum Limit {
    Min(u64),
    Max(u64),
    Exact(u64),
}

fn measured(name: &'static str, measure: Measure, limit: Limit, params: impl Into<Params>) -> Check {
    let params = params.into().normalize();
    Check::new(name, move |p: &mut Payload| {
        let Some(n) = measure.of(&p.value) else {
            return;
        };
        let input = p.value.clone();
        let origin = origin_of(&input);
        let issue = match limit {
            Limit::Min(min) if n < min => RawIssue::too_small(min, true, origin, input),
            Limit::Max(max) if n > max => RawIssue::too_big(max, true, origin, input),
            Limit::Exact(len) if n < len => {
                RawIssue::too_small(len, true, origin, input).with_property("exact", true)
            }
            Limit::Exact(len) if n > len => {
                RawIssue::too_big(len, true, origin, input).with_property("exact", true)
            }
            _ => return,
        };
        p.add_issue(issue);
    })
    .with_when(measure.guard())
    .with_params(&params)
    .on_attach(move |ctx| match (measure, limit) {
        (Measure::Length, Limit::Min(n)) => ctx.bag.merge_min_length(n),
        (Measure::Length, Limit::Max(n)) => ctx.bag.merge_max_length(n),
        (Measure::Length, Limit::Exact(n)) => ctx.bag.set_length(n),
        (Measure::Size, Limit::Min(n)) => ctx.bag.merge_min_size(n),
        (Measure::Size, Limit::Max(n)) => ctx.bag.merge_max_size(n),
        (Measure::Size, Limit::Exact(n)) => ctx.bag.set_size(n),
    })
}

pub fn min_length(n: usize, params: impl Into<Params>) -> Check {
    measured("min_length", Measure::Length, Limit::Min(n as u64), params)
}

pub fn max_length(n: usize, params: impl Into<Params>) -> Check {
    measured("max_length", Measure::Length, Limit::Max(n as u64), params)
}

/// Exact length.
pub fn length(n: usize, params: impl Into<Params>) -> Check {
    measured("length_equals", Measure::Length, Limit::Exact(n as u64), params)
}

pub fn min_size(n: u64, params: impl Into<Params>) -> Check {
    measured("min_size", Measure::Size, Limit::Min(n), params)
}

pub fn max_size(n: u64, params: impl Into<Params>) -> Check {
    measured("max_size", Measure::Size, Limit::Max(n), params)
}

/// Exact size.
pub fn size(n: u64, params: impl Into<Params>) -> Check {
    measured("size_equals", Measure::Size, Limit::Exact(n), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{run_checks, AttachContext};
    use crate::schema::TypeCode;
    use sieve_core::{Bag, FileInfo, IssueCode};

    fn run(check: Check, value: impl Into<Value>) -> Vec<RawIssue> {
        let mut payload = Payload::new(value);
        run_checks(&[check], &mut payload, 0, None);
        payload.take_issues()
    }

    #[test]
    fn test_empty_string_length_boundaries() {
        assert!(run(length(0, ()), "").is_empty());
        assert_eq!(run(min_length(1, ()), "")[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(run(max_length(3, ()), "héé").is_empty());
        assert_eq!(run(max_length(2, ()), "héé")[0].origin(), Some("string"));
    }

    #[test]
    fn test_exact_length_marks_exact() {
        let issues = run(length(2, ()), vec![1, 2, 3]);
        assert_eq!(issues[0].code, IssueCode::TooBig);
        assert_eq!(issues[0].property("exact"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_guard_skips_values_without_length() {
        assert!(run(min_length(1, ()), 5).is_empty());
        assert!(run(min_size(1, ()), "abc").is_empty());
    }

    #[test]
    fn test_file_size() {
        let file = FileInfo::new("a.png", 2048, "image/png");
        assert!(run(max_size(4096, ()), file.clone()).is_empty());
        assert_eq!(run(max_size(1024, ()), file)[0].origin(), Some("file"));
    }

    #[test]
    fn test_bag_merge() {
        let mut bag = Bag::new();
        let mut ctx = AttachContext::new(TypeCode::String, &mut bag);
        min_length(2, ()).attach(&mut ctx);
        min_length(4, ()).attach(&mut ctx);
        max_length(8, ()).attach(&mut ctx);
        assert_eq!(bag.get("minLength"), Some(&serde_json::json!(4)));
        assert_eq!(bag.get("maxLength"), Some(&serde_json::json!(8)));
    }
}
