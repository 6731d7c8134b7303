//! Property tests: integer width ranges, user bounds overriding them,
//! stable enum ordering, and round trips over a scalar object.

use proptest::prelude::*;
use serde_json::{json, Value};
use sieve_jsonschema::{from_json_schema, to_json_schema, FromOptions, Io, ToOptions};
use sieve_schema::{Registry, Schema};

fn emit(schema: &Schema) -> Value {
    to_json_schema(schema, &ToOptions::new().metadata(Registry::new()))
        .unwrap()
        .to_value()
        .unwrap()
}

fn signed_widths() -> Vec<(Schema, i64, i64)> {
    vec![
        (Schema::int8(), i8::MIN.into(), i8::MAX.into()),
        (Schema::int16(), i16::MIN.into(), i16::MAX.into()),
        (Schema::int32(), i32::MIN.into(), i32::MAX.into()),
        (Schema::int64(), i64::MIN, i64::MAX),
    ]
}

#[test]
fn test_signed_width_ranges() {
    for (schema, min, max) in signed_widths() {
        let doc = emit(&schema);
        assert_eq!(doc["minimum"], json!(min));
        assert_eq!(doc["maximum"], json!(max));
    }
}

#[test]
fn test_unsigned_width_ranges() {
    let doc = emit(&Schema::uint8());
    assert_eq!((doc["minimum"].clone(), doc["maximum"].clone()), (json!(0), json!(255)));
    let doc = emit(&Schema::uint64());
    assert_eq!(doc["maximum"], json!(u64::MAX));
}

proptest! {
    #[test]
    fn test_user_bounds_override_width(width in 0usize..4, lower in -100i64..0, upper in 0i64..100) {
        let (schema, _, max) = signed_widths().swap_remove(width);
        let doc = emit(&schema.min(lower));
        prop_assert_eq!(&doc["minimum"], &json!(lower));
        prop_assert_eq!(&doc["maximum"], &json!(max));

        let (schema, _, _) = signed_widths().swap_remove(width);
        let doc = emit(&schema.gt(lower).lt(upper));
        prop_assert!(doc.get("minimum").is_none());
        prop_assert!(doc.get("maximum").is_none());
        prop_assert_eq!(&doc["exclusiveMinimum"], &json!(lower));
        prop_assert_eq!(&doc["exclusiveMaximum"], &json!(upper));
    }

    #[test]
    fn test_enum_emits_sorted(values in prop::collection::btree_set("[a-z]{1,5}", 1..8)) {
        let mut shuffled: Vec<String> = values.iter().cloned().collect();
        shuffled.reverse();
        let doc = emit(&Schema::enum_(shuffled));
        let sorted: Vec<Value> = values.into_iter().map(Value::from).collect();
        prop_assert_eq!(&doc["enum"], &Value::Array(sorted));
    }

    #[test]
    fn test_scalar_round_trip(name in "[a-z]{0,14}", age in -20i64..160, active in any::<bool>()) {
        let schema = Schema::object([
            ("name", Schema::string().min(2).max(12)),
            ("age", Schema::int().gte(0).lte(130)),
            ("active", Schema::bool()),
        ]);
        let doc = to_json_schema(&schema, &ToOptions::new().metadata(Registry::new()).io(Io::Input))
            .unwrap()
            .to_value()
            .unwrap();
        let loaded = from_json_schema(&doc, &FromOptions::new().registry(Registry::new())).unwrap();
        let input = json!({"name": name, "age": age, "active": active});
        prop_assert_eq!(
            schema.parse_any(input.clone()).is_ok(),
            loaded.parse_any(input).is_ok()
        );
    }
}
