//! # End-to-End Parse Scenarios
//!
//! Exercises the public parse entry points the way a caller would:
//! building schemas with constructors and modifiers, parsing JSON-shaped
//! input, and inspecting the aggregated error as a flat list, a
//! first-segment grouping, and a path-indexed tree.

use serde_json::json;
use sieve_schema::{CustomParams, IssueCode, ParseOptions, PathSegment, Schema, StringFormat, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn order() -> Schema {
    Schema::object([
        ("id", Schema::uuid()),
        ("email", Schema::string().format(StringFormat::Email).max(50)),
        (
            "lines",
            Schema::slice(Schema::object([
                ("sku", Schema::string().min(1)),
                ("qty", Schema::uint16().positive()),
            ]))
            .min(1),
        ),
        ("note", Schema::string().optional()),
        ("priority", Schema::int8().default(0)),
    ])
}

#[test]
fn test_valid_order_fills_defaults() {
    init_tracing();
    let input = json!({
        "id": "3f2504e0-4f89-41d3-9a0c-0305e82c3301",
        "email": "ops@example.com",
        "lines": [{"sku": "A-1", "qty": 2}],
        "extra": true,
    });
    let out = order().parse_any(input).unwrap();
    assert_eq!(out.get("priority"), Some(&Value::Int(0)));
    assert_eq!(out.get("note"), None);
    assert_eq!(out.get("extra"), None);
}

#[test]
fn test_invalid_order_reports_absolute_paths() {
    init_tracing();
    let input = json!({
        "id": "not-a-uuid",
        "email": "ops@example.com",
        "lines": [{"sku": "", "qty": 0}, {"sku": "B", "qty": "many"}],
    });
    let err = order().parse_any(input).unwrap_err();
    let pointers: Vec<String> = err.issues().iter().map(|i| i.pointer()).collect();
    assert_eq!(
        pointers,
        vec!["/id", "/lines/0/sku", "/lines/0/qty", "/lines/1/qty"]
    );

    let flat = err.flatten();
    assert!(flat.form_errors.is_empty());
    assert_eq!(flat.field_errors.get("lines").map(Vec::len), Some(3));

    let tree = err.tree();
    let qty = tree
        .at(&[PathSegment::from("lines"), PathSegment::from(1usize), PathSegment::from("qty")])
        .unwrap();
    assert_eq!(qty.errors.len(), 1);
}

#[test]
fn test_empty_string_length_boundaries() {
    assert!(Schema::string().length(0).parse_any("").is_ok());
    let err = Schema::string().min(1).parse_any("").unwrap_err();
    assert_eq!(err.issues()[0].code, IssueCode::TooSmall);
}

#[test]
fn test_tuple_with_rest_scenario() {
    let t = Schema::tuple_with_rest([Schema::string(), Schema::int()], Schema::bool());
    assert!(t.parse_any(json!(["x", 2, true, false])).is_ok());
    let err = t.parse_any(json!(["x", 2, 3])).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.issues()[0].code, IssueCode::InvalidType);
    assert_eq!(err.issues()[0].path, vec![PathSegment::Index(2)]);

    let closed = Schema::tuple([Schema::string(), Schema::int()]);
    assert!(closed.parse_any(json!(["x", 2, 3])).is_err());
}

#[test]
fn test_optional_nilable_default_laws() {
    let base = Schema::string().min(3);
    assert_eq!(base.optional().parse_any(Value::Nil), Ok(Value::Nil));
    assert_eq!(base.nilable().parse_any(Value::Nil), Ok(Value::Nil));
    assert_eq!(
        base.default("abcd").parse_any(Value::Nil),
        base.parse_any("abcd")
    );
    assert_eq!(
        base.default("ab").parse_any(Value::Nil).is_err(),
        base.parse_any("ab").is_err()
    );
}

#[test]
fn test_panicking_refinement_becomes_issue() {
    init_tracing();
    let s = Schema::string().refine(|v| {
        if v.as_str() == Some("boom") {
            panic!("exploded");
        }
        true
    });
    assert!(s.parse_any("fine").is_ok());
    let err = s.parse_any("boom").unwrap_err();
    assert_eq!(err.issues()[0].code, IssueCode::Custom);
    assert_eq!(err.issues()[0].properties.get("panic"), Some(&Value::from("exploded")));
}

#[test]
fn test_abort_halts_later_checks() {
    let s = Schema::string()
        .refine_with(|v| v.as_str().is_some_and(|s| s.len() > 3), CustomParams::new().abort())
        .refine(|v| v.as_str().is_some_and(|s| s.contains('@')));
    let err = s.parse_any("ab").unwrap_err();
    assert_eq!(err.len(), 1);

    let lenient = Schema::string()
        .refine(|v| v.as_str().is_some_and(|s| s.len() > 3))
        .refine(|v| v.as_str().is_some_and(|s| s.contains('@')));
    assert_eq!(lenient.parse_any("ab").unwrap_err().len(), 2);
}

#[test]
fn test_string_overwrites_run_in_order() {
    let s = Schema::string().trim().to_lower_case().min(2);
    assert_eq!(s.parse_any("  HeLLo "), Ok(Value::from("hello")));
}

#[test]
fn test_discriminated_union_with_report_input() {
    let event = Schema::discriminated_union(
        "type",
        [
            Schema::object([("type", Schema::literal("click")), ("x", Schema::int())]),
            Schema::object([("type", Schema::literal("key")), ("code", Schema::string())]),
        ],
    )
    .unwrap();
    let options = ParseOptions {
        report_input: true,
        ..ParseOptions::default()
    };
    let err = event
        .parse_any_with(json!({"type": "key", "code": 13}), &options)
        .unwrap_err();
    assert_eq!(err.issues()[0].pointer(), "/code");
    assert_eq!(err.issues()[0].input, Some(Value::Int(13)));
}

#[test]
fn test_typed_parse_and_must_parse() {
    let n: u16 = Schema::uint16().coerce().must_parse("512");
    assert_eq!(n, 512);
    let s: String = Schema::string().trim().parse("  x ").unwrap();
    assert_eq!(s, "x");
}
