//! # Emission Scenarios
//!
//! Full documents for representative schemas, checked key for key, plus
//! a cross-check of emitted documents against an independent JSON Schema
//! validator.

use serde_json::{json, Value};
use sieve_jsonschema::{
    registry_to_json_schema, to_json_schema, Cycles, EmitError, Io, Reused, Target, ToOptions,
};
use sieve_schema::{Meta, Registry, Schema, StringFormat};

const DRAFT_2020: &str = "https://json-schema.org/draft/2020-12/schema";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn isolated() -> ToOptions {
    ToOptions::new().metadata(Registry::new())
}

fn emit(schema: &Schema, opts: &ToOptions) -> Value {
    to_json_schema(schema, opts).unwrap().to_value().unwrap()
}

/// Every `$ref` in the document, in no particular order.
fn refs(doc: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_refs(doc, &mut out);
    out
}

fn collect_refs(doc: &Value, out: &mut Vec<String>) {
    match doc {
        Value::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("$ref", Value::String(target)) => out.push(target.clone()),
                    _ => collect_refs(value, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

#[test]
fn test_numeric_range_chain() {
    init_tracing();
    let doc = emit(&Schema::float().min(5).max(10), &isolated());
    assert_eq!(
        doc,
        json!({"$schema": DRAFT_2020, "type": "number", "minimum": 5, "maximum": 10})
    );
}

#[test]
fn test_email_with_length() {
    let doc = emit(&Schema::email().min(10).max(50), &isolated());
    let pattern = StringFormat::Email.pattern().unwrap();
    assert_eq!(
        doc,
        json!({
            "$schema": DRAFT_2020,
            "type": "string",
            "format": "email",
            "pattern": pattern,
            "minLength": 10,
            "maxLength": 50
        })
    );
}

#[test]
fn test_required_depends_on_io() {
    let shape = Schema::object([
        ("required", Schema::string()),
        ("optional", Schema::string().optional()),
        ("withDefault", Schema::int().default(1)),
    ]);
    let input = emit(&shape, &isolated().io(Io::Input));
    assert_eq!(input["required"], json!(["required"]));
    assert!(input.get("additionalProperties").is_none());

    let output = emit(&shape, &isolated());
    assert_eq!(output["required"], json!(["required", "withDefault"]));
    assert_eq!(output["additionalProperties"], json!(false));
    assert_eq!(output["properties"]["withDefault"], json!({"type": "integer", "default": 1}));
}

#[test]
fn test_tuple_with_rest() {
    let tuple = Schema::tuple_with_rest([Schema::string(), Schema::int()], Schema::bool());
    assert_eq!(
        emit(&tuple, &isolated()),
        json!({
            "$schema": DRAFT_2020,
            "type": "array",
            "prefixItems": [{"type": "string"}, {"type": "integer"}],
            "items": {"type": "boolean"}
        })
    );
}

#[test]
fn test_tuple_draft07() {
    let tuple = Schema::tuple([Schema::string(), Schema::int().optional()]);
    let doc = emit(&tuple, &isolated().target(Target::Draft07));
    assert_eq!(
        doc,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "array",
            "items": [{"type": "string"}, {"type": "integer"}],
            "minItems": 1,
            "maxItems": 2
        })
    );
}

#[test]
fn test_reused_struct_hoisting() {
    init_tracing();
    let user = Schema::object([("name", Schema::string())]);
    let target = user.clone();
    let root = Schema::object([
        ("a", user.clone()),
        ("b", user.optional()),
        ("c", Schema::lazy(move || target.clone())),
    ]);
    let doc = emit(&root, &isolated().reused(Reused::Ref));

    let user_shape = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"],
        "additionalProperties": false
    });
    assert_eq!(doc["$defs"], json!({"def1": user_shape}));
    assert_eq!(doc["properties"]["a"], json!({"$ref": "#/$defs/def1"}));
    assert_eq!(doc["properties"]["b"], user_shape);
    assert_eq!(doc["properties"]["c"], json!({"$ref": "#/$defs/def1"}));
    assert_eq!(refs(&doc).len(), 2);
    assert_eq!(doc["required"], json!(["a", "c"]));
}

#[test]
fn test_reused_inline_by_default() {
    let user = Schema::object([("name", Schema::string())]);
    let root = Schema::object([("a", user.clone()), ("b", user)]);
    let doc = emit(&root, &isolated());
    assert!(doc.get("$defs").is_none());
    assert_eq!(doc["properties"]["a"], doc["properties"]["b"]);
}

fn tree() -> Schema {
    Schema::recursive(|this| {
        Schema::struct_([
            ("id", Schema::string()),
            ("children", Schema::slice(this)),
        ])
    })
}

#[test]
fn test_recursive_tree_refs_root() {
    let doc = emit(&tree(), &isolated());
    assert_eq!(doc["type"], json!("object"));
    assert_eq!(doc["properties"]["children"]["items"], json!({"$ref": "#"}));
    assert_eq!(refs(&doc), vec!["#".to_string()]);
    assert!(doc.get("$defs").is_none());
}

#[test]
fn test_recursive_tree_with_id() {
    let registry = Registry::new();
    let tree = tree().register(&registry, Meta::new().id("Tree"));
    let doc = emit(&tree, &ToOptions::new().metadata(registry));
    assert_eq!(doc["$ref"], json!("#/$defs/Tree"));
    let body = &doc["$defs"]["Tree"];
    assert_eq!(body["type"], json!("object"));
    assert_eq!(body["properties"]["children"]["items"], json!({"$ref": "#/$defs/Tree"}));
    assert_eq!(refs(&doc).len(), 2);
}

#[test]
fn test_cycles_throw() {
    let err = to_json_schema(&tree(), &isolated().cycles(Cycles::Throw)).unwrap_err();
    match err {
        EmitError::CircularReference { path } => {
            assert_eq!(path, "#/properties/children/items")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nested_cycle_gets_definition() {
    let doc = emit(&Schema::object([("root", tree())]), &isolated());
    assert_eq!(doc["properties"]["root"], json!({"$ref": "#/$defs/def1"}));
    assert_eq!(
        doc["$defs"]["def1"]["properties"]["children"]["items"],
        json!({"$ref": "#/$defs/def1"})
    );
}

#[test]
fn test_uri_remaps_identified_refs() {
    let registry = Registry::new();
    let address = Schema::object([("city", Schema::string())])
        .register(&registry, Meta::new().id("Address").title("Postal address"));
    let person = Schema::object([("home", address.clone()), ("work", address.optional())]);
    let opts = ToOptions::new()
        .metadata(registry)
        .uri(|id| format!("https://schemas.example.com/{id}.json"));
    let doc = emit(&person, &opts);
    assert_eq!(
        doc["properties"]["home"],
        json!({"$ref": "https://schemas.example.com/Address.json"})
    );
    assert_eq!(doc["$defs"]["Address"]["title"], json!("Postal address"));
}

#[test]
fn test_registry_document() {
    let registry = Registry::new();
    let id = Schema::uuid().register(&registry, Meta::new().id("Id"));
    Schema::object([("id", id), ("name", Schema::string())])
        .register(&registry, Meta::new().id("Account").description("billing account"));
    let doc = registry_to_json_schema(&registry, &ToOptions::new())
        .unwrap()
        .to_value()
        .unwrap();
    assert_eq!(doc["$schema"], json!(DRAFT_2020));
    let defs = doc["$defs"].as_object().unwrap();
    assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["Account", "Id"]);
    assert_eq!(defs["Account"]["properties"]["id"], json!({"$ref": "#/$defs/Id"}));
    assert_eq!(defs["Account"]["description"], json!("billing account"));
    assert_eq!(defs["Id"]["format"], json!("uuid"));
}

#[test]
fn test_draft07_definitions_table() {
    let registry = Registry::new();
    let point = Schema::tuple([Schema::float(), Schema::float()])
        .register(&registry, Meta::new().id("Point"));
    let line = Schema::object([("from", point.clone()), ("to", point)]);
    let doc = emit(&line, &ToOptions::new().metadata(registry).target(Target::Draft07));
    assert!(doc.get("$defs").is_none());
    assert!(doc["definitions"]["Point"].is_object());
    assert_eq!(doc["properties"]["from"], json!({"$ref": "#/definitions/Point"}));
}

#[test]
fn test_emitted_documents_validate_like_the_schema() {
    let schema = Schema::object([
        ("name", Schema::string().min(2).max(12)),
        ("age", Schema::int().gte(0).lte(130)),
        ("tags", Schema::slice(Schema::string()).max(3)),
        ("nickname", Schema::string().nilable().optional()),
        ("role", Schema::enum_(["admin", "member"])),
    ]);
    let doc = emit(&schema, &isolated());
    let validator = jsonschema::validator_for(&doc).unwrap();

    let cases = [
        json!({"name": "ada", "age": 36, "tags": [], "role": "admin"}),
        json!({"name": "ada", "age": 36, "tags": ["x"], "role": "member", "nickname": null}),
        json!({"name": "a", "age": 36, "tags": [], "role": "admin"}),
        json!({"name": "ada", "age": -1, "tags": [], "role": "admin"}),
        json!({"name": "ada", "age": 36, "tags": ["a", "b", "c", "d"], "role": "admin"}),
        json!({"name": "ada", "age": 36, "tags": [], "role": "owner"}),
        json!({"name": "ada", "tags": [], "role": "admin"}),
        json!({"name": "ada", "age": 36.5, "tags": [], "role": "admin"}),
    ];
    for case in cases {
        assert_eq!(
            validator.is_valid(&case),
            schema.parse_any(case.clone()).is_ok(),
            "disagreement on {case}"
        );
    }
}
