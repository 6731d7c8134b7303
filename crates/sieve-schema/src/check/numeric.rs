//! Numeric and date bound checks.
//!
//! Bounds compare through [`Value::compare`], so integers, floats, big
//! integers, and timestamps all work against a limit of a compatible kind.
//! An incomparable value (a string against a numeric limit, or `NaN`)
//! fails with `invalid_type`.

use sieve_core::{Payload, RawIssue, Value};

use super::{Check, Params};

/// Largest integer exactly representable in an `f64`.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

fn origin_of(value: &Value) -> &'static str {
    match value {
        Value::BigInt(_) => "bigint",
        Value::DateTime(_) => "date",
        _ => "number",
    }
}

fn expected_for(limit: &Value) -> &'static str {
    match limit {
        Value::DateTime(_) => "date",
        Value::String(_) => "string",
        _ => "number",
    }
}

fn bound(
    name: &'static str,
    limit: Value,
    inclusive: bool,
    lower: bool,
    params: impl Into<Params>,
) -> Check {
    let params = params.into().normalize();
    let bag_value = limit.to_json();
    Check::new(name, move |p: &mut Payload| {
        let Some(ord) = p.value.compare(&limit) else {
            let input = p.value.clone();
            p.add_issue(RawIssue::invalid_type(expected_for(&limit), input));
            return;
        };
        let strict = if lower { ord.is_gt() } else { ord.is_lt() };
        let within = strict || (inclusive && ord.is_eq());
        if within {
            return;
        }
        let input = p.value.clone();
        let origin = origin_of(&input);
        let issue = if lower {
            RawIssue::too_small(limit.clone(), inclusive, origin, input)
        } else {
            RawIssue::too_big(limit.clone(), inclusive, origin, input)
        };
        p.add_issue(issue);
    })
    .with_params(&params)
    .on_attach(move |ctx| {
        if let Some(value) = &bag_value {
            if lower {
                ctx.bag.merge_minimum(value.clone(), inclusive);
            } else {
                ctx.bag.merge_maximum(value.clone(), inclusive);
            }
        }
    })
}

/// Value strictly below `limit`.
pub fn lt(limit: impl Into<Value>, params: impl Into<Params>) -> Check {
    bound("less_than", limit.into(), false, false, params)
}

/// Value at most `limit`.
pub fn lte(limit: impl Into<Value>, params: impl Into<Params>) -> Check {
    bound("less_than", limit.into(), true, false, params)
}

/// Value strictly above `limit`.
pub fn gt(limit: impl Into<Value>, params: impl Into<Params>) -> Check {
    bound("greater_than", limit.into(), false, true, params)
}

/// Value at least `limit`.
pub fn gte(limit: impl Into<Value>, params: impl Into<Params>) -> Check {
    bound("greater_than", limit.into(), true, true, params)
}

pub fn positive(params: impl Into<Params>) -> Check {
    gt(0, params)
}

pub fn non_negative(params: impl Into<Params>) -> Check {
    gte(0, params)
}

pub fn negative(params: impl Into<Params>) -> Check {
    lt(0, params)
}

pub fn non_positive(params: impl Into<Params>) -> Check {
    lte(0, params)
}

/// Number of decimal digits in the shortest representation of `x`.
fn decimals(x: f64) -> i32 {
    let text = format!("{x:e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let fraction_digits = mantissa
        .split_once('.')
        .map(|(_, f)| f.len() as i32)
        .unwrap_or(0);
    let exponent: i32 = exponent.parse().unwrap_or(0);
    (fraction_digits - exponent).max(0)
}

/// Remainder of `value / step` computed on scaled integers, so that
/// `0.3 % 0.1` is zero.
pub fn float_safe_remainder(value: f64, step: f64) -> f64 {
    let places = decimals(value).max(decimals(step)).min(15);
    let scale = 10f64.powi(places);
    let v = (value * scale).round();
    let s = (step * scale).round();
    if s == 0.0 {
        return value % step;
    }
    (v % s) / scale
}

/// Value is an exact multiple of `divisor`.
pub fn multiple_of(divisor: impl Into<Value>, params: impl Into<Params>) -> Check {
    let divisor = divisor.into();
    let params = params.into().normalize();
    let bag_value = divisor.to_json();
    Check::new("multiple_of", move |p: &mut Payload| {
        let ok = match (p.value.as_i128(), divisor.as_i128()) {
            (Some(v), Some(d)) if d != 0 => v % d == 0,
            _ => match (p.value.as_f64(), divisor.as_f64()) {
                (Some(v), Some(d)) if d != 0.0 => float_safe_remainder(v, d) == 0.0,
                (Some(_), Some(_)) => false,
                _ => {
                    let input = p.value.clone();
                    p.add_issue(RawIssue::invalid_type("number", input));
                    return;
                }
            },
        };
        if !ok {
            let input = p.value.clone();
            p.add_issue(RawIssue::not_multiple_of(divisor.clone(), input));
        }
    })
    .with_params(&params)
    .on_attach(move |ctx| {
        if let Some(value) = &bag_value {
            ctx.bag.set_multiple_of(value.clone());
        }
    })
}

/// Rejects infinite floats. Integers always pass.
pub fn finite(params: impl Into<Params>) -> Check {
    let params = params.into().normalize();
    Check::new("finite", |p: &mut Payload| {
        if let Value::Float(f) = p.value {
            if f.is_infinite() {
                let input = p.value.clone();
                p.add_issue(
                    RawIssue::invalid_type("number", input).with_property("received", "Infinity"),
                );
            }
        }
    })
    .with_params(&params)
}

/// Value within `±(2^53 - 1)`.
pub fn safe(params: impl Into<Params>) -> Check {
    let params = params.into().normalize();
    Check::new("safe", |p: &mut Payload| {
        let (min, max) = (Value::Int(-MAX_SAFE_INTEGER), Value::Int(MAX_SAFE_INTEGER));
        let input = p.value.clone();
        match (input.compare(&min), input.compare(&max)) {
            (Some(lo), _) if lo.is_lt() => {
                p.add_issue(RawIssue::too_small(min, true, origin_of(&input), input))
            }
            (_, Some(hi)) if hi.is_gt() => {
                p.add_issue(RawIssue::too_big(max, true, origin_of(&input), input))
            }
            (None, _) | (_, None) => p.add_issue(RawIssue::invalid_type("number", input)),
            _ => {}
        }
    })
    .with_params(&params)
    .on_attach(|ctx| {
        ctx.bag.merge_minimum((-MAX_SAFE_INTEGER).into(), true);
        ctx.bag.merge_maximum(MAX_SAFE_INTEGER.into(), true);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::run_checks;
    use sieve_core::{Bag, IssueCode};

    fn run(check: &Check, value: impl Into<Value>) -> Vec<RawIssue> {
        let mut payload = Payload::new(value);
        run_checks(std::slice::from_ref(check), &mut payload, 0, None);
        payload.take_issues()
    }

    #[test]
    fn test_bounds() {
        assert!(run(&gte(5, ()), 5).is_empty());
        assert!(run(&gt(5, ()), 5.5).is_empty());
        assert_eq!(run(&gt(5, ()), 5)[0].code, IssueCode::TooSmall);
        assert_eq!(run(&lt(10, ()), 10)[0].code, IssueCode::TooBig);
        assert!(run(&lte(10, ()), 10u8).is_empty());
    }

    #[test]
    fn test_mismatched_type_fails() {
        let issues = run(&gte(5, ()), "five");
        assert_eq!(issues[0].code, IssueCode::InvalidType);
        let issues = run(&gte(5, ()), f64::NAN);
        assert_eq!(issues[0].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_exclusive_flag_recorded() {
        let issues = run(&gt(0, ()), -1);
        assert_eq!(issues[0].property("inclusive"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_multiple_of() {
        assert!(run(&multiple_of(3, ()), 9).is_empty());
        assert_eq!(run(&multiple_of(3, ()), 10)[0].code, IssueCode::NotMultipleOf);
        assert!(run(&multiple_of(0.1, ()), 0.3).is_empty());
        assert!(run(&multiple_of(0.01, ()), 1.23).is_empty());
        assert!(!run(&multiple_of(0.1, ()), 0.35).is_empty());
    }

    #[test]
    fn test_float_safe_remainder() {
        assert_eq!(float_safe_remainder(0.3, 0.1), 0.0);
        assert_eq!(float_safe_remainder(10.0, 2.5), 0.0);
        assert!(float_safe_remainder(1.0, 0.3) > 0.0);
    }

    #[test]
    fn test_finite_and_safe() {
        assert!(!run(&finite(()), f64::INFINITY).is_empty());
        assert!(run(&finite(()), 1.5).is_empty());
        assert!(run(&safe(()), MAX_SAFE_INTEGER).is_empty());
        assert_eq!(run(&safe(()), MAX_SAFE_INTEGER + 1)[0].code, IssueCode::TooBig);
    }

    #[test]
    fn test_on_attach_writes_bag() {
        let mut bag = Bag::new();
        let mut ctx = crate::check::AttachContext::new(crate::schema::TypeCode::Float64, &mut bag);
        gte(5, ()).attach(&mut ctx);
        lt(10, ()).attach(&mut ctx);
        multiple_of(5, ()).attach(&mut ctx);
        assert_eq!(bag.get("minimum"), Some(&serde_json::json!(5)));
        assert_eq!(bag.get("exclusiveMaximum"), Some(&serde_json::json!(10)));
        assert_eq!(bag.get("multipleOf"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_date_bounds() {
        use chrono::{TimeZone, Utc};
        let limit = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        let early = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).single().unwrap();
        let issues = run(&gte(limit, ()), early);
        assert_eq!(issues[0].origin(), Some("date"));
    }
}
