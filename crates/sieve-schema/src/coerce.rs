//! Input coercion for schemas built with `.coerce()`.
//!
//! Coercion is best effort: a value that cannot be converted is returned
//! unchanged and the type check reports it.

use chrono::{DateTime, NaiveDate, Utc};
use sieve_core::Value;

use crate::schema::Kind;

/// Convert `value` toward the type `kind` expects.
pub fn coerce(kind: &Kind, value: Value) -> Value {
    match kind {
        Kind::String(_) => to_string(value),
        Kind::Int(_) => to_integer(value),
        Kind::Float(_) => to_float(value),
        Kind::Bool => to_bool(value),
        Kind::BigInt => to_big_int(value),
        Kind::Date | Kind::Time => to_datetime(value, matches!(kind, Kind::Date)),
        _ => value,
    }
}

fn to_string(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::String(i.to_string()),
        Value::Uint(u) => Value::String(u.to_string()),
        Value::BigInt(b) => Value::String(b.to_string()),
        Value::Float(f) => Value::String(f.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::DateTime(_) => match value.to_json() {
            Some(serde_json::Value::String(s)) => Value::String(s),
            _ => value,
        },
        other => other,
    }
}

fn to_integer(value: Value) -> Value {
    match value {
        Value::String(ref s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(u) = s.parse::<u64>() {
                Value::Uint(u)
            } else if let Ok(f) = s.parse::<f64>() {
                Value::Float(f)
            } else {
                value
            }
        }
        Value::Bool(b) => Value::Int(i64::from(b)),
        other => other,
    }
}

fn to_float(value: Value) -> Value {
    match value {
        Value::String(ref s) => match s.trim().parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => value,
        },
        Value::Bool(b) => Value::Float(if b { 1.0 } else { 0.0 }),
        Value::Int(_) | Value::Uint(_) | Value::BigInt(_) => match value.as_f64() {
            Some(f) => Value::Float(f),
            None => value,
        },
        other => other,
    }
}

fn to_bool(value: Value) -> Value {
    match value {
        Value::String(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" | "" => Value::Bool(false),
            _ => value,
        },
        Value::Int(_) | Value::Uint(_) | Value::Float(_) | Value::BigInt(_) => {
            match value.as_f64() {
                Some(f) if !f.is_nan() => Value::Bool(f != 0.0),
                _ => value,
            }
        }
        other => other,
    }
}

fn to_big_int(value: Value) -> Value {
    match value {
        Value::String(ref s) => match s.trim().parse::<i128>() {
            Ok(b) => Value::BigInt(b),
            Err(_) => value,
        },
        Value::Int(_) | Value::Uint(_) | Value::Float(_) => match value.as_i128() {
            Some(b) => Value::BigInt(b),
            None => value,
        },
        Value::Bool(b) => Value::BigInt(i128::from(b)),
        other => other,
    }
}

fn to_datetime(value: Value, accept_date: bool) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Value::DateTime(dt.with_timezone(&Utc));
    }
    if accept_date {
        if let Some(dt) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Value::DateTime(dt.and_utc());
        }
    }
    value
}
