//! Descent into composite kinds.
//!
//! Children run on the parent's payload: swap the child value in, push
//! a path segment, run, pop, take the value back. Trial parses (union
//! branches, intersection sides, map keys) run on forks whose issues are
//! either absorbed or discarded.

use std::collections::BTreeMap;

use sieve_core::{PathSegment, Payload, RawIssue, Value};

use super::leaf::loose_eq;
use crate::schema::{discriminator_values, Kind, LazySchema, ObjectShape, Schema, TransformFn, UnknownKeys};

fn reject(p: &mut Payload, expected: &str) -> bool {
    let input = p.value.clone();
    p.add_issue(RawIssue::invalid_type(expected, input).terminal());
    false
}

/// Run `schema` on `value` at `segment`, returning the output.
fn descend(schema: &Schema, value: Value, segment: impl Into<PathSegment>, p: &mut Payload) -> Value {
    p.value = value;
    p.push_path(segment);
    schema.run(p);
    p.pop_path();
    p.take_value()
}

/// Run `schema` on a fork; returns the output and the fork's issues.
fn trial(schema: &Schema, value: Value, p: &Payload) -> (Value, Vec<RawIssue>) {
    let mut fork = p.fork(value);
    schema.run(&mut fork);
    fork.into_parts()
}

pub(super) fn object(kind: &Kind, shape: &ObjectShape, p: &mut Payload) -> bool {
    let expected = kind.type_code().as_str();
    let mut input = match p.take_value() {
        Value::Object(fields) => fields,
        other => {
            p.value = other;
            return reject(p, expected);
        }
    };

    let mut output = BTreeMap::new();
    for (name, field) in &shape.fields {
        let present = input.contains_key(name);
        let value = input.remove(name).unwrap_or_default();
        let out = descend(field, value, name.as_str(), p);
        if present || !out.is_nil() {
            output.insert(name.clone(), out);
        }
    }

    match &shape.unknown_keys {
        UnknownKeys::Strip => {}
        UnknownKeys::Passthrough => output.extend(input),
        UnknownKeys::Strict => {
            if !input.is_empty() {
                let keys: Vec<String> = input.keys().cloned().collect();
                p.add_issue(RawIssue::unrecognized_keys(keys, Value::Object(input)));
            }
        }
        UnknownKeys::Catchall(schema) => {
            for (name, value) in input {
                let out = descend(schema, value, name.as_str(), p);
                output.insert(name, out);
            }
        }
    }

    p.value = Value::Object(output);
    true
}

pub(super) fn record(key: &Schema, value: &Schema, p: &mut Payload) -> bool {
    let input = match p.take_value() {
        Value::Object(fields) => fields,
        other => {
            p.value = other;
            return reject(p, "record");
        }
    };

    let mut output = BTreeMap::new();
    for (k, v) in input {
        let (key_out, key_issues) = trial(key, Value::String(k.clone()), p);
        if !key_issues.is_empty() {
            let issue = RawIssue::invalid_key("record", key_issues, Value::String(k.clone()))
                .with_path(vec![PathSegment::Key(k.clone())]);
            p.add_issue(issue);
            continue;
        }
        let out = descend(value, v, k.as_str(), p);
        let key_out = match key_out {
            Value::String(s) => s,
            _ => k,
        };
        output.insert(key_out, out);
    }
    p.value = Value::Object(output);
    true
}

fn key_segment(key: &Value) -> PathSegment {
    match key {
        Value::String(s) => PathSegment::Key(s.clone()),
        other => PathSegment::Key(other.to_string()),
    }
}

pub(super) fn map(key: &Schema, value: &Schema, p: &mut Payload) -> bool {
    let entries = match p.take_value() {
        Value::Map(entries) => entries,
        Value::Object(fields) => fields
            .into_iter()
            .map(|(k, v)| (Value::String(k), v))
            .collect(),
        other => {
            p.value = other;
            return reject(p, "map");
        }
    };

    let mut output = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let segment = key_segment(&k);
        let (key_out, key_issues) = trial(key, k.clone(), p);
        if !key_issues.is_empty() {
            let issue = RawIssue::invalid_key("map", key_issues, k).with_path(vec![segment]);
            p.add_issue(issue);
            continue;
        }
        let out = descend(value, v, segment, p);
        output.push((key_out, out));
    }
    p.value = Value::Map(output);
    true
}

fn elements(expected: &str, p: &mut Payload) -> Option<Vec<Value>> {
    match p.take_value() {
        Value::Array(items) => Some(items),
        other => {
            p.value = other;
            reject(p, expected);
            None
        }
    }
}

pub(super) fn slice(element: &Schema, p: &mut Payload) -> bool {
    let Some(items) = elements("slice", p) else {
        return false;
    };
    let output = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| descend(element, v, i, p))
        .collect();
    p.value = Value::Array(output);
    true
}

pub(super) fn set(element: &Schema, p: &mut Payload) -> bool {
    let Some(items) = elements("set", p) else {
        return false;
    };
    let mut output: Vec<Value> = Vec::with_capacity(items.len());
    for (i, v) in items.into_iter().enumerate() {
        let out = descend(element, v, i, p);
        if !output.contains(&out) {
            output.push(out);
        }
    }
    p.value = Value::Array(output);
    true
}

pub(super) fn array(element: &Schema, length: usize, p: &mut Payload) -> bool {
    let Some(items) = elements("array", p) else {
        return false;
    };
    if items.len() != length {
        let short = items.len() < length;
        p.value = Value::Array(items);
        let input = p.value.clone();
        let issue = if short {
            RawIssue::too_small(length, true, "array", input)
        } else {
            RawIssue::too_big(length, true, "array", input)
        };
        p.add_issue(issue.with_property("exact", true).terminal());
        return false;
    }
    let output = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| descend(element, v, i, p))
        .collect();
    p.value = Value::Array(output);
    true
}

pub(super) fn tuple(items: &[Schema], rest: Option<&Schema>, p: &mut Payload) -> bool {
    let Some(input) = elements("tuple", p) else {
        return false;
    };
    let required = items
        .iter()
        .rposition(|s| !s.is_optional() && s.internals().default.is_none())
        .map_or(0, |i| i + 1);

    let len = input.len();
    if rest.is_none() && len > items.len() {
        p.value = Value::Array(input);
        let issue = RawIssue::too_big(items.len(), true, "array", p.value.clone());
        p.add_issue(issue.terminal());
        return false;
    }
    if len < required {
        p.value = Value::Array(input);
        let issue = RawIssue::too_small(required, true, "array", p.value.clone());
        p.add_issue(issue.terminal());
        return false;
    }

    let mut input = input.into_iter();
    let mut output = Vec::with_capacity(len.max(items.len()));
    for (i, item) in items.iter().enumerate() {
        let value = input.next().unwrap_or_default();
        let out = descend(item, value, i, p);
        if i < len || !out.is_nil() {
            output.push(out);
        }
    }
    if let Some(rest) = rest {
        for (offset, value) in input.enumerate() {
            output.push(descend(rest, value, items.len() + offset, p));
        }
    }
    p.value = Value::Array(output);
    true
}

pub(super) fn union(options: &[Schema], p: &mut Payload) -> bool {
    let input = p.value.clone();
    let mut branches = Vec::with_capacity(options.len());
    for option in options {
        let (value, issues) = trial(option, input.clone(), p);
        if issues.is_empty() {
            p.value = value;
            return true;
        }
        branches.push(issues);
    }
    p.add_issue(RawIssue::invalid_union(branches, input).terminal());
    false
}

pub(super) fn xor(options: &[Schema], p: &mut Payload) -> bool {
    let input = p.value.clone();
    let mut branches = Vec::new();
    let mut matched = Vec::new();
    for option in options {
        let (value, issues) = trial(option, input.clone(), p);
        if issues.is_empty() {
            matched.push(value);
        } else {
            branches.push(issues);
        }
    }
    match matched.len() {
        1 => {
            p.value = matched.remove(0);
            true
        }
        0 => {
            p.add_issue(RawIssue::invalid_union(branches, input).terminal());
            false
        }
        _ => {
            let issue = RawIssue::invalid_union(Vec::new(), input).with_property("multiple", true);
            p.add_issue(issue.terminal());
            false
        }
    }
}

/// Deep-merge two outputs of the same input.
fn merge_values(a: Value, b: Value) -> Option<Value> {
    match (a, b) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (k, rv) in right {
                let merged = match left.remove(&k) {
                    Some(lv) => merge_values(lv, rv)?,
                    None => rv,
                };
                left.insert(k, merged);
            }
            Some(Value::Object(left))
        }
        (Value::Array(left), Value::Array(right)) => {
            if left.len() != right.len() {
                return None;
            }
            left.into_iter()
                .zip(right)
                .map(|(l, r)| merge_values(l, r))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
        }
        (a, b) if loose_eq(&a, &b) => Some(a),
        _ => None,
    }
}

pub(super) fn intersection(left: &Schema, right: &Schema, p: &mut Payload) -> bool {
    let input = p.value.clone();
    let (lv, left_issues) = trial(left, input.clone(), p);
    let (rv, right_issues) = trial(right, input.clone(), p);
    if !left_issues.is_empty() || !right_issues.is_empty() {
        p.absorb(left_issues);
        p.absorb(right_issues);
        return false;
    }
    match merge_values(lv, rv) {
        Some(merged) => {
            p.value = merged;
            true
        }
        None => {
            let issue = RawIssue::custom(None, input).with_property("reason", "unmergeable_intersection");
            p.add_issue(issue.terminal());
            false
        }
    }
}

pub(super) fn discriminated_union(discriminator: &str, options: &[Schema], p: &mut Payload) -> bool {
    let Value::Object(fields) = &p.value else {
        return reject(p, "object");
    };
    let tag = fields.get(discriminator).cloned().unwrap_or_default();
    let chosen = options.iter().find(|option| {
        discriminator_values(option, discriminator)
            .is_some_and(|values| values.iter().any(|v| loose_eq(v, &tag)))
    });
    match chosen {
        Some(option) => {
            let before = p.issue_count();
            option.run(p);
            p.issue_count() == before
        }
        None => {
            let issue = RawIssue::invalid_union(Vec::new(), tag)
                .with_property("note", "No matching discriminator")
                .with_property("discriminator", discriminator)
                .with_path(vec![PathSegment::Key(discriminator.to_string())]);
            p.add_issue(issue.terminal());
            false
        }
    }
}

pub(super) fn lazy(lazy: &LazySchema, p: &mut Payload) -> bool {
    match lazy.resolve() {
        Some(schema) => {
            let before = p.issue_count();
            schema.run(p);
            p.issue_count() == before
        }
        None => {
            let input = p.value.clone();
            p.add_issue(RawIssue::custom(Some("unresolved lazy schema".into()), input).terminal());
            false
        }
    }
}

pub(super) fn pipe(input: &Schema, output: &Schema, p: &mut Payload) -> bool {
    let before = p.issue_count();
    input.run(p);
    if p.issue_count() > before {
        return false;
    }
    output.run(p);
    p.issue_count() == before
}

pub(super) fn transform(input: &Schema, func: &TransformFn, p: &mut Payload) -> bool {
    let before = p.issue_count();
    input.run(p);
    if p.issue_count() > before {
        return false;
    }
    let value = p.take_value();
    let snapshot = value.clone();
    match func(value) {
        Ok(out) => {
            p.value = out;
            true
        }
        Err(message) => {
            p.value = snapshot.clone();
            p.add_issue(RawIssue::custom(Some(message), snapshot));
            false
        }
    }
}
