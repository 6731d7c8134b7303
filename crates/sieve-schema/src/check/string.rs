//! String content checks and string-normalizing overwrites.
//!
//! Content checks only inspect string values; anything else passes
//! through untouched, since the host schema's type check already reported
//! it. Every content check contributes an equivalent regex to the bag.

use std::collections::BTreeMap;

use regex::Regex;
use sieve_core::{Payload, RawIssue, Value};

use super::custom::overwrite;
use super::{Check, Params};

/// Build a check that tests string values and reports `invalid_format`.
pub(crate) fn string_check(
    name: &'static str,
    format: &'static str,
    extras: BTreeMap<String, Value>,
    pattern: Option<String>,
    test: impl Fn(&str) -> bool + Send + Sync + 'static,
    params: impl Into<Params>,
) -> Check {
    let params = params.into().normalize();
    Check::new(name, move |p: &mut Payload| {
        let Value::String(s) = &p.value else {
            return;
        };
        if !test(s) {
            let input = p.value.clone();
            p.add_issue(RawIssue::invalid_format(format, input, extras.clone()));
        }
    })
    .with_params(&params)
    .on_attach(move |ctx| {
        if let Some(pattern) = &pattern {
            ctx.bag.push_pattern(pattern);
        }
    })
}

fn extra(key: &str, value: impl Into<Value>) -> BTreeMap<String, Value> {
    BTreeMap::from([(key.to_string(), value.into())])
}

/// String matches `re`.
pub fn regex(re: &Regex, params: impl Into<Params>) -> Check {
    let source = re.as_str().to_string();
    let re = re.clone();
    string_check(
        "regex",
        "regex",
        extra("pattern", source.as_str()),
        Some(source),
        move |s| re.is_match(s),
        params,
    )
}

/// String contains `needle`.
pub fn includes(needle: impl Into<String>, params: impl Into<Params>) -> Check {
    let needle = needle.into();
    let pattern = regex::escape(&needle);
    string_check(
        "includes",
        "includes",
        extra("includes", needle.as_str()),
        Some(pattern),
        move |s| s.contains(needle.as_str()),
        params,
    )
}

pub fn starts_with(prefix: impl Into<String>, params: impl Into<Params>) -> Check {
    let prefix = prefix.into();
    let pattern = format!("^{}.*", regex::escape(&prefix));
    string_check(
        "starts_with",
        "starts_with",
        extra("prefix", prefix.as_str()),
        Some(pattern),
        move |s| s.starts_with(prefix.as_str()),
        params,
    )
}

pub fn ends_with(suffix: impl Into<String>, params: impl Into<Params>) -> Check {
    let suffix = suffix.into();
    let pattern = format!(".*{}$", regex::escape(&suffix));
    string_check(
        "ends_with",
        "ends_with",
        extra("suffix", suffix.as_str()),
        Some(pattern),
        move |s| s.ends_with(suffix.as_str()),
        params,
    )
}

/// No ASCII uppercase letters.
pub fn lowercase(params: impl Into<Params>) -> Check {
    string_check(
        "lowercase",
        "lowercase",
        BTreeMap::new(),
        Some("^[^A-Z]*$".to_string()),
        |s| !s.chars().any(|c| c.is_ascii_uppercase()),
        params,
    )
}

/// No ASCII lowercase letters.
pub fn uppercase(params: impl Into<Params>) -> Check {
    string_check(
        "uppercase",
        "uppercase",
        BTreeMap::new(),
        Some("^[^a-z]*$".to_string()),
        |s| !s.chars().any(|c| c.is_ascii_lowercase()),
        params,
    )
}

fn map_string(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

pub fn trim() -> Check {
    overwrite(|v| map_string(v, |s| s.trim().to_string()))
}

pub fn to_lower_case() -> Check {
    overwrite(|v| map_string(v, str::to_lowercase))
}

pub fn to_upper_case() -> Check {
    overwrite(|v| map_string(v, str::to_uppercase))
}
