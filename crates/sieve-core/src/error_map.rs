//! # Error Maps
//!
//! An error map converts a [`RawIssue`] into a message. Returning `None`
//! defers to the next map in the resolution chain:
//!
//! 1. explicit `RawIssue::message`
//! 2. the producing check's or schema's error map (`RawIssue::inst`)
//! 3. the per-parse error map (`ParseOptions::error_map`)
//! 4. the process-wide map installed through [`crate::config`]
//! 5. [`default_message`]

use std::fmt;
use std::sync::Arc;

use crate::issue::{IssueCode, RawIssue};
use crate::value::Value;

type MapFn = dyn Fn(&RawIssue) -> Option<String> + Send + Sync;

/// Shared, cloneable error map.
#[derive(Clone)]
pub struct ErrorMap(Arc<MapFn>);

impl ErrorMap {
    /// Wrap a mapping function.
    pub fn new(map: impl Fn(&RawIssue) -> Option<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(map))
    }

    /// A map that always yields the same message.
    pub fn constant(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Some(message.clone()))
    }

    pub fn resolve(&self, issue: &RawIssue) -> Option<String> {
        (self.0)(issue)
    }
}

impl fmt::Debug for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorMap(..)")
    }
}

impl From<&str> for ErrorMap {
    fn from(message: &str) -> Self {
        ErrorMap::constant(message)
    }
}

impl From<String> for ErrorMap {
    fn from(message: String) -> Self {
        ErrorMap::constant(message)
    }
}

fn unit_for(origin: &str) -> &'static str {
    match origin {
        "string" => " characters",
        "array" | "slice" | "tuple" | "set" => " items",
        "file" => " bytes",
        "object" | "record" | "map" => " entries",
        _ => "",
    }
}

fn describe_values(values: Option<&Value>) -> String {
    match values {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("|"),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn format_message(issue: &RawIssue) -> String {
    let format = issue
        .property("format")
        .and_then(Value::as_str)
        .unwrap_or("format");
    let detail = |key: &str| issue.property(key).map(|v| v.to_string()).unwrap_or_default();
    match format {
        "starts_with" => format!("Invalid string: must start with {}", detail("prefix")),
        "ends_with" => format!("Invalid string: must end with {}", detail("suffix")),
        "includes" => format!("Invalid string: must include {}", detail("includes")),
        "regex" => format!(
            "Invalid string: must match pattern /{}/",
            issue
                .property("pattern")
                .and_then(Value::as_str)
                .unwrap_or_default()
        ),
        "lowercase" => "Invalid string: must be lowercase".to_string(),
        "uppercase" => "Invalid string: must be uppercase".to_string(),
        "email" => "Invalid email address".to_string(),
        "iso_offset" => format!(
            "Invalid datetime: offset style must match bound {}",
            detail("bound")
        ),
        "mime" => format!("Invalid MIME type: expected one of {}", describe_values(issue.property("mime"))),
        other => format!("Invalid {other}"),
    }
}

/// Built-in English message for an issue.
pub fn default_message(issue: &RawIssue) -> String {
    let origin = issue.origin().unwrap_or("value");
    match issue.code {
        IssueCode::InvalidType => format!(
            "Invalid input: expected {}, received {}",
            issue
                .property("expected")
                .and_then(Value::as_str)
                .unwrap_or("value"),
            issue
                .property("received")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        ),
        IssueCode::TooBig => {
            let op = if matches!(issue.property("inclusive"), Some(Value::Bool(false))) {
                "<"
            } else {
                "<="
            };
            let limit = issue.property("maximum").map(|v| v.to_string()).unwrap_or_default();
            match unit_for(origin) {
                "" => format!("Too big: expected {origin} to be {op}{limit}"),
                unit => format!("Too big: expected {origin} to have {op}{limit}{unit}"),
            }
        }
        IssueCode::TooSmall => {
            let op = if matches!(issue.property("inclusive"), Some(Value::Bool(false))) {
                ">"
            } else {
                ">="
            };
            let limit = issue.property("minimum").map(|v| v.to_string()).unwrap_or_default();
            match unit_for(origin) {
                "" => format!("Too small: expected {origin} to be {op}{limit}"),
                unit => format!("Too small: expected {origin} to have {op}{limit}{unit}"),
            }
        }
        IssueCode::InvalidFormat => format_message(issue),
        IssueCode::NotMultipleOf => format!(
            "Invalid number: must be a multiple of {}",
            issue.property("divisor").map(|v| v.to_string()).unwrap_or_default()
        ),
        IssueCode::InvalidValue => match issue.property("values") {
            Some(Value::Array(values)) if values.len() == 1 => {
                format!("Invalid input: expected {}", values[0])
            }
            values => format!("Invalid option: expected one of {}", describe_values(values)),
        },
        IssueCode::InvalidUnion => {
            if matches!(issue.property("multiple"), Some(Value::Bool(true))) {
                "Invalid input: expected exactly one union option to match".to_string()
            } else if let Some(Value::String(note)) = issue.property("note") {
                format!("Invalid input: {note}")
            } else {
                "Invalid input".to_string()
            }
        }
        IssueCode::InvalidKey => format!("Invalid key in {origin}"),
        IssueCode::UnrecognizedKeys => {
            let keys = match issue.property("keys") {
                Some(Value::Array(keys)) => keys.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
                _ => Vec::new(),
            };
            let plural = if keys.len() > 1 { "s" } else { "" };
            format!("Unrecognized key{plural}: {}", keys.join(", "))
        }
        IssueCode::Custom => "Invalid input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_constant_map() {
        let map = ErrorMap::from("nope");
        let issue = RawIssue::custom(None, Value::Nil);
        assert_eq!(map.resolve(&issue).as_deref(), Some("nope"));
    }

    #[test]
    fn test_default_messages() {
        let issue = RawIssue::too_small(3, true, "string", Value::from("ab"));
        assert_eq!(
            default_message(&issue),
            "Too small: expected string to have >=3 characters"
        );
        let issue = RawIssue::too_big(10, false, "number", Value::Int(10));
        assert_eq!(default_message(&issue), "Too big: expected number to be <10");
        let issue = RawIssue::invalid_type("string", Value::Int(1));
        assert_eq!(
            default_message(&issue),
            "Invalid input: expected string, received int"
        );
        let issue = RawIssue::unrecognized_keys(vec!["a".into(), "b".into()], Value::Nil);
        assert_eq!(default_message(&issue), "Unrecognized keys: \"a\", \"b\"");
    }

    #[test]
    fn test_format_messages() {
        let mut extras = BTreeMap::new();
        extras.insert("prefix".to_string(), Value::from("ab"));
        let issue = RawIssue::invalid_format("starts_with", Value::from("x"), extras);
        assert_eq!(default_message(&issue), "Invalid string: must start with \"ab\"");
        let issue = RawIssue::invalid_format("uuid", Value::from("x"), BTreeMap::new());
        assert_eq!(default_message(&issue), "Invalid uuid");
    }
}
