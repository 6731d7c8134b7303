//! Type checks for leaf kinds.

use sieve_core::{Payload, RawIssue, Value};

use crate::schema::{ComplexKind, FloatKind, IntKind, Kind, StringBoolOptions};

/// Equality that treats numbers of different representations as equal
/// when they denote the same value.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    if a.is_number() && b.is_number() {
        return a.compare(b).is_some_and(|o| o.is_eq());
    }
    a == b
}

fn reject(p: &mut Payload, expected: &str) -> bool {
    let input = p.value.clone();
    p.add_issue(RawIssue::invalid_type(expected, input).terminal());
    false
}

pub(super) fn parse(kind: &Kind, p: &mut Payload) -> bool {
    match kind {
        Kind::String(_) => match p.value {
            Value::String(_) => true,
            _ => reject(p, "string"),
        },
        Kind::Int(int) => integer(*int, p),
        Kind::Float(float) => floating(*float, p),
        Kind::Bool => match p.value {
            Value::Bool(_) => true,
            _ => reject(p, "bool"),
        },
        Kind::Nil => match p.value {
            Value::Nil => true,
            _ => reject(p, "nil"),
        },
        Kind::Any | Kind::Unknown => true,
        Kind::Never => reject(p, "never"),
        Kind::Nan => match p.value {
            Value::Float(f) if f.is_nan() => true,
            _ => reject(p, "nan"),
        },
        Kind::BigInt => match p.value {
            Value::BigInt(_) => true,
            Value::Int(_) | Value::Uint(_) => {
                if let Some(b) = p.value.as_i128() {
                    p.value = Value::BigInt(b);
                }
                true
            }
            _ => reject(p, "big_int"),
        },
        Kind::Complex(width) => complex(*width, p),
        Kind::StringBool(options) => string_bool(options, p),
        Kind::Date => match p.value {
            Value::DateTime(_) => true,
            _ => reject(p, "date"),
        },
        Kind::Time => match p.value {
            Value::DateTime(_) => true,
            _ => reject(p, "time"),
        },
        Kind::Function => match p.value {
            Value::Function(_) => true,
            _ => reject(p, "function"),
        },
        Kind::Custom(predicate) => {
            if predicate(&p.value) {
                true
            } else {
                let input = p.value.clone();
                p.add_issue(RawIssue::custom(None, input).terminal());
                false
            }
        }
        Kind::Literal(values) | Kind::Enum(values) => {
            if values.iter().any(|v| loose_eq(v, &p.value)) {
                true
            } else {
                let input = p.value.clone();
                p.add_issue(RawIssue::invalid_value(values.clone(), input).terminal());
                false
            }
        }
        Kind::File => match p.value {
            Value::File(_) => true,
            _ => reject(p, "file"),
        },
        // Composite kinds are dispatched before reaching here.
        _ => reject(p, kind.type_code().as_str()),
    }
}

fn integer(int: IntKind, p: &mut Payload) -> bool {
    let expected = int.type_code().as_str();
    let Some(n) = p.value.as_i128() else {
        return reject(p, expected);
    };
    if n > int.max() {
        let input = p.value.clone();
        p.add_issue(RawIssue::too_big(int.max(), true, "number", input).terminal());
        return false;
    }
    if n < int.min() {
        let input = p.value.clone();
        p.add_issue(RawIssue::too_small(int.min(), true, "number", input).terminal());
        return false;
    }
    p.value = if int.is_signed() {
        i64::try_from(n).map(Value::Int).unwrap_or(Value::BigInt(n))
    } else {
        u64::try_from(n).map(Value::Uint).unwrap_or(Value::BigInt(n))
    };
    true
}

fn floating(float: FloatKind, p: &mut Payload) -> bool {
    let expected = float.type_code().as_str();
    let Some(f) = p.value.as_f64() else {
        return reject(p, expected);
    };
    if f.is_nan() {
        return reject(p, expected);
    }
    if f.is_finite() && f.abs() > float.max() {
        let input = p.value.clone();
        let issue = if f > 0.0 {
            RawIssue::too_big(float.max(), true, "number", input)
        } else {
            RawIssue::too_small(-float.max(), true, "number", input)
        };
        p.add_issue(issue.terminal());
        return false;
    }
    p.value = Value::Float(match float {
        FloatKind::Float32 => f64::from(f as f32),
        FloatKind::Float64 => f,
    });
    true
}

fn complex(width: ComplexKind, p: &mut Payload) -> bool {
    let (re, im) = match &p.value {
        Value::Complex { re, im } => (*re, *im),
        v if v.is_number() => match v.as_f64() {
            Some(re) => (re, 0.0),
            None => return reject(p, "complex"),
        },
        _ => return reject(p, "complex"),
    };
    p.value = match width {
        ComplexKind::Complex64 => Value::Complex {
            re: f64::from(re as f32),
            im: f64::from(im as f32),
        },
        ComplexKind::Complex128 => Value::Complex { re, im },
    };
    true
}

fn string_bool(options: &StringBoolOptions, p: &mut Payload) -> bool {
    let Value::String(s) = &p.value else {
        return reject(p, "string_bool");
    };
    let matches = |candidates: &[String]| {
        candidates.iter().any(|c| {
            if options.case_sensitive {
                c == s
            } else {
                c.eq_ignore_ascii_case(s)
            }
        })
    };
    if matches(&options.truthy) {
        p.value = Value::Bool(true);
        return true;
    }
    if matches(&options.falsy) {
        p.value = Value::Bool(false);
        return true;
    }
    let accepted = options
        .truthy
        .iter()
        .chain(&options.falsy)
        .map(|w| Value::from(w.as_str()))
        .collect();
    let input = p.value.clone();
    p.add_issue(RawIssue::invalid_value(accepted, input).terminal());
    false
}
