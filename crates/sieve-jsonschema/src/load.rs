//! # JSON Schema Loading
//!
//! Builds a [`Schema`] from a JSON Schema document (Draft 2020-12 or
//! Draft-07, detected from `$schema` unless forced).
//!
//! Local `$ref`s (`#`, `#/$defs/...`, `#/definitions/...`) are resolved
//! against the document root. A reference reached again while its target
//! is still being built becomes a deferred schema filled in once the
//! target completes, so recursive documents load without unbounded
//! descent.
//!
//! Keywords without a schema equivalent (`if`/`then`/`else`,
//! `patternProperties`, `unevaluated*`, ...) fail in strict mode and are
//! dropped with a warning otherwise.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use sieve_schema::{IsoDateTimeOptions, Meta, Registry, Schema, SchemaError, StringFormat};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::options::{FromOptions, Target};

type Object = Map<String, Value>;

/// Keywords the loader cannot model.
const UNSUPPORTED: &[&str] = &[
    "if",
    "then",
    "else",
    "patternProperties",
    "$dynamicRef",
    "$recursiveRef",
    "unevaluatedProperties",
    "unevaluatedItems",
    "dependentSchemas",
    "dependentRequired",
    "contains",
    "minContains",
    "maxContains",
];

const STRING_KEYWORDS: &[&str] = &[
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "contentEncoding",
    "formatMinimum",
    "formatMaximum",
];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "minProperties",
    "maxProperties",
    "propertyNames",
];
const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "prefixItems",
    "additionalItems",
    "minItems",
    "maxItems",
    "uniqueItems",
];

/// Build a schema from a parsed JSON Schema document.
pub fn from_json_schema(doc: &Value, opts: &FromOptions) -> Result<Schema, LoadError> {
    let target = opts
        .target
        .or_else(|| {
            doc.get("$schema")
                .and_then(Value::as_str)
                .map(Target::from_schema_uri)
        })
        .unwrap_or_default();
    let registry = opts.registry.as_ref().unwrap_or_else(|| Registry::global());
    let mut loader = Loader {
        root: doc,
        strict: opts.strict,
        target,
        registry,
        pending: HashMap::new(),
        resolved: HashMap::new(),
        chain: Vec::new(),
        path: Vec::new(),
    };
    loader.resolve("#")
}

/// Build a schema from a YAML rendering of a JSON Schema document.
pub fn from_yaml_str(text: &str, opts: &FromOptions) -> Result<Schema, LoadError> {
    let doc: Value = serde_yaml::from_str(text)?;
    from_json_schema(&doc, opts)
}

struct Loader<'a> {
    root: &'a Value,
    strict: bool,
    target: Target,
    registry: &'a Registry,
    /// References under construction, with the cell their deferred
    /// stand-ins read from.
    pending: HashMap<String, Arc<OnceLock<Schema>>>,
    resolved: HashMap<String, Schema>,
    /// References entered since the last keyword that descends into the
    /// input (`properties`, `items`, ...). Reaching one of these again
    /// would build a schema that only refers to itself.
    chain: Vec<String>,
    path: Vec<String>,
}

impl<'a> Loader<'a> {
    fn pointer(&self) -> String {
        let mut out = String::from("#");
        for segment in &self.path {
            out.push('/');
            out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        }
        out
    }

    fn invalid(&self, reason: impl Into<String>) -> LoadError {
        LoadError::InvalidDocument {
            path: self.pointer(),
            reason: reason.into(),
        }
    }

    fn schema_error(&self, err: SchemaError) -> LoadError {
        self.invalid(err.to_string())
    }

    fn unsupported(&self, keyword: &str) -> Result<(), LoadError> {
        if self.strict {
            return Err(LoadError::UnsupportedKeyword {
                keyword: keyword.to_string(),
                path: self.pointer(),
            });
        }
        warn!(keyword, path = %self.pointer(), "dropping unsupported JSON Schema keyword");
        Ok(())
    }

    fn child(&mut self, segments: &[&str], node: &Value) -> Result<Schema, LoadError> {
        let descends = !matches!(segments.first(), Some(&("allOf" | "anyOf" | "oneOf")));
        let chain = if descends {
            std::mem::take(&mut self.chain)
        } else {
            Vec::new()
        };
        self.path.extend(segments.iter().map(|s| s.to_string()));
        let schema = self.load(node);
        self.path.truncate(self.path.len() - segments.len());
        if descends {
            self.chain = chain;
        }
        schema
    }

    fn children(&mut self, keyword: &str, node: &Value) -> Result<Vec<Schema>, LoadError> {
        let Some(list) = node.as_array() else {
            return Err(self.invalid(format!("{keyword} must be an array")));
        };
        let mut schemas = Vec::with_capacity(list.len());
        for (i, item) in list.iter().enumerate() {
            schemas.push(self.child(&[keyword, &i.to_string()], item)?);
        }
        Ok(schemas)
    }

    fn load(&mut self, node: &Value) -> Result<Schema, LoadError> {
        let map = match node {
            Value::Bool(true) => return Ok(Schema::unknown()),
            Value::Bool(false) => return Ok(Schema::never()),
            Value::Object(map) => map,
            _ => return Err(self.invalid("expected an object or boolean schema")),
        };
        self.check_keywords(map)?;

        let mut schema = match map.get("$ref") {
            Some(Value::String(reference)) => self.resolve(reference)?,
            Some(_) => return Err(self.invalid("$ref must be a string")),
            None => self.body(map)?,
        };
        if let Some(default) = map.get("default") {
            schema = schema.default(default);
        }
        if let Some(meta) = self.meta(map)? {
            schema = schema.register(self.registry, meta);
        }
        Ok(schema)
    }

    fn check_keywords(&self, map: &Object) -> Result<(), LoadError> {
        for keyword in UNSUPPORTED {
            if map.contains_key(*keyword) {
                self.unsupported(keyword)?;
            }
        }
        if map.contains_key("propertyNames") && !is_record(map) {
            self.unsupported("propertyNames")?;
        }
        if let Some(not) = map.get("not") {
            if !is_empty_schema(not) {
                self.unsupported("not")?;
            }
        }
        Ok(())
    }

    fn resolve(&mut self, reference: &str) -> Result<Schema, LoadError> {
        if let Some(schema) = self.resolved.get(reference) {
            return Ok(schema.clone());
        }
        if self.chain.iter().any(|r| r == reference) {
            return Err(self.invalid(format!(
                "reference {reference:?} refers back to itself without an enclosing schema"
            )));
        }
        if let Some(cell) = self.pending.get(reference) {
            debug!(reference, "deferring recursive reference");
            return Ok(Schema::deferred(cell.clone()));
        }
        let root = self.root;
        let target = match reference {
            "#" => Some(root),
            local if local.starts_with("#/") => root.pointer(&local[1..]),
            _ => None,
        };
        let Some(target) = target else {
            return Err(LoadError::UnresolvedReference {
                reference: reference.to_string(),
            });
        };

        let cell = Arc::new(OnceLock::new());
        self.pending.insert(reference.to_string(), cell.clone());
        self.chain.push(reference.to_string());
        let outer = std::mem::replace(
            &mut self.path,
            reference
                .trim_start_matches("#/")
                .split('/')
                .filter(|s| !s.is_empty() && *s != "#")
                .map(|s| s.replace("~1", "/").replace("~0", "~"))
                .collect(),
        );
        let loaded = self.load(target);
        self.path = outer;
        self.chain.pop();
        self.pending.remove(reference);

        let mut schema = loaded?;
        if let Some(key) = definition_key(reference) {
            if self.registry.get(&schema).and_then(|m| m.id).is_none() {
                schema = schema.register(self.registry, Meta::new().id(key));
            }
        }
        let _ = cell.set(schema.clone());
        debug!(reference, "resolved reference");
        self.resolved.insert(reference.to_string(), schema.clone());
        Ok(schema)
    }

    fn meta(&self, map: &Object) -> Result<Option<Meta>, LoadError> {
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        let mut meta = Meta {
            id: text("$id"),
            title: text("title"),
            description: text("description"),
            ..Meta::default()
        };
        match map.get("examples") {
            Some(Value::Array(examples)) => meta.examples = examples.clone(),
            Some(_) => return Err(self.invalid("examples must be an array")),
            None => {}
        }
        let empty = meta.id.is_none()
            && meta.title.is_none()
            && meta.description.is_none()
            && meta.examples.is_empty();
        Ok((!empty).then_some(meta))
    }

    /// Type keywords, then composition, folded into one schema.
    fn body(&mut self, map: &Object) -> Result<Schema, LoadError> {
        let mut parts: Vec<Schema> = self.typed(map)?.into_iter().collect();
        if let Some(all) = map.get("allOf") {
            parts.extend(self.children("allOf", all)?);
        }
        if let Some(any) = map.get("anyOf") {
            parts.push(self.any_of(any)?);
        }
        if let Some(one) = map.get("oneOf") {
            parts.push(Schema::xor(self.children("oneOf", one)?));
        }
        if map.get("not").is_some_and(is_empty_schema) {
            parts.push(Schema::never());
        }
        Ok(parts
            .into_iter()
            .reduce(Schema::intersection)
            .unwrap_or_else(Schema::any))
    }

    /// `anyOf` over exactly one schema and `{type: null}` is a nilable
    /// schema.
    fn any_of(&mut self, node: &Value) -> Result<Schema, LoadError> {
        if let Some([a, b]) = node.as_array().map(Vec::as_slice) {
            if is_null_schema(b) {
                return Ok(self.child(&["anyOf", "0"], a)?.nilable());
            }
            if is_null_schema(a) {
                return Ok(self.child(&["anyOf", "1"], b)?.nilable());
            }
        }
        Ok(Schema::union(self.children("anyOf", node)?))
    }

    fn typed(&mut self, map: &Object) -> Result<Option<Schema>, LoadError> {
        if let Some(value) = map.get("const") {
            return Ok(Some(Schema::literal(value)));
        }
        if let Some(values) = map.get("enum") {
            let Some(values) = values.as_array() else {
                return Err(self.invalid("enum must be an array"));
            };
            let strings: Option<Vec<&str>> = values.iter().map(Value::as_str).collect();
            return Ok(Some(match (strings, values.as_slice()) {
                (Some(strings), _) if !strings.is_empty() => Schema::enum_(strings),
                (_, [one]) => Schema::literal(one),
                _ => Schema::literals(values.iter()),
            }));
        }

        let types: Vec<&str> = match map.get("type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(list)) => {
                let names: Option<Vec<&str>> = list.iter().map(Value::as_str).collect();
                names.ok_or_else(|| self.invalid("type entries must be strings"))?
            }
            Some(_) => return Err(self.invalid("type must be a string or an array")),
            None => match infer_type(map) {
                Some(t) => vec![t],
                None => return Ok(None),
            },
        };

        let nullable = types.len() > 1 && types.contains(&"null");
        let mut options = Vec::with_capacity(types.len());
        for name in types.iter().filter(|t| !nullable || **t != "null") {
            options.push(self.for_type(name, map)?);
        }
        let schema = match options.len() {
            0 => Schema::nil(),
            1 => options.remove(0),
            _ => Schema::union(options),
        };
        Ok(Some(if nullable { schema.nilable() } else { schema }))
    }

    fn for_type(&mut self, name: &str, map: &Object) -> Result<Schema, LoadError> {
        match name {
            "string" => self.string(map),
            "integer" => self.number(Schema::int(), map),
            "number" => self.number(Schema::float(), map),
            "boolean" => Ok(Schema::bool()),
            "null" => Ok(Schema::nil()),
            "object" => self.object(map),
            "array" => self.array(map),
            other => Err(self.invalid(format!("unknown type {other:?}"))),
        }
    }

    fn count(&self, map: &Object, key: &str) -> Result<Option<u64>, LoadError> {
        match map.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("{key} must be a non-negative integer"))),
        }
    }

    fn string(&mut self, map: &Object) -> Result<Schema, LoadError> {
        let format_name = map.get("format").and_then(Value::as_str);
        let encoding = map.get("contentEncoding").and_then(Value::as_str);
        if format_name == Some("binary") {
            return self.file(map);
        }
        let format = match (format_name, encoding) {
            (_, Some("base64")) => Some(StringFormat::Base64),
            (Some(name), _) => {
                let format = format_for(name);
                if format.is_none() {
                    debug!(format = name, "unknown format loaded as a plain string");
                }
                format
            }
            (None, _) => None,
        };
        let mut schema = match &format {
            Some(format) => Schema::formatted(format.clone()),
            None => Schema::string(),
        };

        if let Some(n) = self.count(map, "minLength")? {
            schema = schema.min(n);
        }
        if let Some(n) = self.count(map, "maxLength")? {
            schema = schema.max(n);
        }
        match map.get("pattern") {
            Some(Value::String(pattern)) => {
                let implied = format.as_ref().and_then(StringFormat::pattern);
                if implied.as_deref() != Some(pattern.as_str()) {
                    schema = schema.pattern(pattern).map_err(|e| LoadError::InvalidPattern {
                        pattern: pattern.clone(),
                        path: self.pointer(),
                        reason: e.to_string(),
                    })?;
                }
            }
            Some(_) => return Err(self.invalid("pattern must be a string")),
            None => {}
        }
        if let Some(bound) = map.get("formatMinimum").and_then(Value::as_str) {
            schema = schema.iso_min(bound);
        }
        if let Some(bound) = map.get("formatMaximum").and_then(Value::as_str) {
            schema = schema.iso_max(bound);
        }
        Ok(schema)
    }

    fn file(&mut self, map: &Object) -> Result<Schema, LoadError> {
        let mut schema = Schema::file();
        if let Some(n) = self.count(map, "minLength")? {
            schema = schema.min(n);
        }
        if let Some(n) = self.count(map, "maxLength")? {
            schema = schema.max(n);
        }
        if let Some(mime) = map.get("contentMediaType").and_then(Value::as_str) {
            schema = schema.mime([mime]);
        }
        Ok(schema)
    }

    fn number(&mut self, mut schema: Schema, map: &Object) -> Result<Schema, LoadError> {
        let bound = |key: &str| map.get(key).filter(|v| v.is_number());
        if let Some(n) = bound("minimum") {
            schema = schema.gte(n);
        }
        if let Some(n) = bound("maximum") {
            schema = schema.lte(n);
        }
        if let Some(n) = bound("exclusiveMinimum") {
            schema = schema.gt(n);
        }
        if let Some(n) = bound("exclusiveMaximum") {
            schema = schema.lt(n);
        }
        if let Some(n) = bound("multipleOf") {
            schema = schema.multiple_of(n);
        }
        Ok(schema)
    }

    fn object(&mut self, map: &Object) -> Result<Schema, LoadError> {
        let additional = map.get("additionalProperties");
        let mut schema = if is_record(map) {
            let key = match map.get("propertyNames") {
                Some(names) => self.child(&["propertyNames"], names)?,
                None => Schema::string(),
            };
            let value = match additional {
                Some(value) => self.child(&["additionalProperties"], value)?,
                None => Schema::unknown(),
            };
            Schema::record(key, value)
        } else {
            let required: BTreeSet<&str> = match map.get("required") {
                Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
                Some(_) => return Err(self.invalid("required must be an array")),
                None => BTreeSet::new(),
            };
            let mut fields = Vec::new();
            match map.get("properties") {
                Some(Value::Object(properties)) => {
                    for (name, node) in properties {
                        let field = self.child(&["properties", name], node)?;
                        let field = if required.contains(name.as_str()) {
                            field
                        } else {
                            field.optional()
                        };
                        fields.push((name.clone(), field));
                    }
                }
                Some(_) => return Err(self.invalid("properties must be an object")),
                None => {}
            }
            let object = Schema::object(fields);
            let object = match additional {
                Some(Value::Bool(false)) => object.strict(),
                Some(Value::Bool(true)) | None => object.passthrough(),
                Some(node) => {
                    let rest = self.child(&["additionalProperties"], node)?;
                    object.catchall(rest)
                }
            };
            object.map_err(|e| self.schema_error(e))?
        };

        if let Some(n) = self.count(map, "minProperties")? {
            schema = schema.min(n);
        }
        if let Some(n) = self.count(map, "maxProperties")? {
            schema = schema.max(n);
        }
        Ok(schema)
    }

    fn array(&mut self, map: &Object) -> Result<Schema, LoadError> {
        let (prefix_keyword, rest_keyword) = match (map.get("prefixItems"), map.get("items")) {
            (Some(_), _) => ("prefixItems", "items"),
            (None, Some(Value::Array(_))) => ("items", "additionalItems"),
            _ => ("", ""),
        };
        if !prefix_keyword.is_empty() {
            if self.target == Target::Draft07 && prefix_keyword == "prefixItems" {
                debug!(path = %self.pointer(), "prefixItems in a Draft-07 document");
            }
            let items = match map.get(prefix_keyword) {
                Some(node) => self.children(prefix_keyword, node)?,
                None => Vec::new(),
            };
            return Ok(match map.get(rest_keyword) {
                Some(Value::Bool(false)) | None => Schema::tuple(items),
                Some(rest) => {
                    let rest = self.child(&[rest_keyword], rest)?;
                    Schema::tuple_with_rest(items, rest)
                }
            });
        }

        let element = match map.get("items") {
            Some(node) => self.child(&["items"], node)?,
            None => Schema::unknown(),
        };
        let mut schema = if map.get("uniqueItems") == Some(&Value::Bool(true)) {
            Schema::set(element)
        } else {
            Schema::slice(element)
        };
        if let Some(n) = self.count(map, "minItems")? {
            schema = schema.min(n);
        }
        if let Some(n) = self.count(map, "maxItems")? {
            schema = schema.max(n);
        }
        Ok(schema)
    }
}

fn format_for(name: &str) -> Option<StringFormat> {
    Some(match name {
        "email" => StringFormat::Email,
        "uuid" => StringFormat::Uuid(None),
        "uri" | "url" => StringFormat::Url,
        "ipv4" => StringFormat::Ipv4,
        "ipv6" => StringFormat::Ipv6,
        "cidrv4" => StringFormat::Cidrv4,
        "cidrv6" => StringFormat::Cidrv6,
        "hostname" => StringFormat::Hostname,
        "mac" => StringFormat::Mac,
        "e164" => StringFormat::E164,
        "date" => StringFormat::IsoDate,
        "time" => StringFormat::IsoTime(None),
        "date-time" => StringFormat::IsoDateTime(IsoDateTimeOptions {
            offset: true,
            ..IsoDateTimeOptions::default()
        }),
        "duration" => StringFormat::IsoDuration,
        _ => return None,
    })
}

/// The key of the `$defs` (or `definitions`) entry `reference` names.
fn definition_key(reference: &str) -> Option<String> {
    let key = reference
        .strip_prefix("#/$defs/")
        .or_else(|| reference.strip_prefix("#/definitions/"))?;
    (!key.is_empty() && !key.contains('/')).then(|| key.replace("~1", "/").replace("~0", "~"))
}

/// An object type with no fixed properties and a schema for the rest.
fn is_record(map: &Object) -> bool {
    !map.contains_key("properties")
        && (map.contains_key("propertyNames")
            || map.get("additionalProperties").is_some_and(Value::is_object))
}

fn is_empty_schema(node: &Value) -> bool {
    matches!(node, Value::Object(map) if map.is_empty()) || *node == Value::Bool(true)
}

fn is_null_schema(node: &Value) -> bool {
    node.as_object().is_some_and(|map| {
        map.len() == 1 && map.get("type").and_then(Value::as_str) == Some("null")
    })
}

fn infer_type(map: &Object) -> Option<&'static str> {
    let has = |keywords: &[&str]| keywords.iter().any(|k| map.contains_key(*k));
    if has(STRING_KEYWORDS) {
        Some("string")
    } else if has(NUMBER_KEYWORDS) {
        Some("number")
    } else if has(OBJECT_KEYWORDS) {
        Some("object")
    } else if has(ARRAY_KEYWORDS) {
        Some("array")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_schema::{Kind, TypeCode};

    fn load(doc: Value) -> Schema {
        from_json_schema(&doc, &FromOptions::new().registry(Registry::new())).unwrap()
    }

    #[test]
    fn test_boolean_schemas() {
        assert_eq!(load(json!(true)).type_code(), TypeCode::Unknown);
        assert_eq!(load(json!(false)).type_code(), TypeCode::Never);
    }

    #[test]
    fn test_numbers_with_bounds() {
        let s = load(json!({"type": "integer", "minimum": 1, "exclusiveMaximum": 10}));
        assert!(s.parse_any(json!(1)).is_ok());
        assert!(s.parse_any(json!(10)).is_err());
        assert!(s.parse_any(json!(1.5)).is_err());
    }

    #[test]
    fn test_object_required_and_additional() {
        let s = load(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}},
            "required": ["a"],
            "additionalProperties": false
        }));
        assert!(s.parse_any(json!({"a": "x"})).is_ok());
        assert!(s.parse_any(json!({"b": 1})).is_err());
        assert!(s.parse_any(json!({"a": "x", "c": 1})).is_err());
    }

    #[test]
    fn test_absent_additional_properties_passes_through() {
        let s = load(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let out = s.parse_any(json!({"a": "x", "extra": 1})).unwrap();
        assert!(out.get("extra").is_some());
    }

    #[test]
    fn test_record_from_additional_properties() {
        let s = load(json!({"type": "object", "additionalProperties": {"type": "integer"}}));
        assert!(matches!(s.kind(), Kind::Record { .. }));
        assert!(s.parse_any(json!({"x": 1})).is_ok());
        assert!(s.parse_any(json!({"x": "no"})).is_err());
    }

    #[test]
    fn test_nilable_collapse() {
        let s = load(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));
        assert!(s.internals().nilable);
        assert!(s.parse_any(Value::Null).is_ok());
        let s = load(json!({"type": ["integer", "null"]}));
        assert!(s.internals().nilable);
    }

    #[test]
    fn test_enum_and_const() {
        let s = load(json!({"enum": ["red", "green"]}));
        assert_eq!(s.type_code(), TypeCode::Enum);
        let s = load(json!({"const": 3}));
        assert!(s.parse_any(json!(3)).is_ok());
        assert!(s.parse_any(json!(4)).is_err());
        let s = load(json!({"enum": [1, "one"]}));
        assert!(s.parse_any(json!("one")).is_ok());
        assert!(s.parse_any(json!(2)).is_err());
    }

    #[test]
    fn test_strict_rejects_conditionals() {
        let doc = json!({"type": "object", "if": {"required": ["a"]}});
        let opts = FromOptions::new().registry(Registry::new()).strict(true);
        let err = from_json_schema(&doc, &opts).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedKeyword { ref keyword, .. } if keyword == "if"));
        assert!(from_json_schema(&doc, &opts.strict(false)).is_ok());
    }

    #[test]
    fn test_bad_pattern_reported() {
        let doc = json!({"type": "string", "pattern": "(unclosed"});
        let err = from_json_schema(&doc, &FromOptions::new().registry(Registry::new())).unwrap_err();
        assert!(matches!(err, LoadError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unresolved_reference() {
        let doc = json!({"$ref": "#/$defs/missing"});
        let err = from_json_schema(&doc, &FromOptions::new().registry(Registry::new())).unwrap_err();
        assert!(matches!(err, LoadError::UnresolvedReference { .. }));
        let doc = json!({"$ref": "https://example.com/schema.json"});
        assert!(from_json_schema(&doc, &FromOptions::new().registry(Registry::new())).is_err());
    }

    #[test]
    fn test_recursive_reference() {
        let s = load(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "children": {"type": "array", "items": {"$ref": "#"}}
            },
            "required": ["id", "children"]
        }));
        let tree = json!({"id": "a", "children": [{"id": "b", "children": []}]});
        assert!(s.parse_any(tree).is_ok());
        let bad = json!({"id": "a", "children": [{"id": 1, "children": []}]});
        assert!(s.parse_any(bad).is_err());
    }

    #[test]
    fn test_reference_to_itself_is_rejected() {
        let opts = FromOptions::new().registry(Registry::new());
        let docs = [
            json!({"$ref": "#"}),
            json!({
                "$ref": "#/$defs/A",
                "$defs": {"A": {"$ref": "#/$defs/B"}, "B": {"$ref": "#/$defs/A"}}
            }),
            json!({"type": "object", "allOf": [{"$ref": "#"}]}),
            json!({"anyOf": [{"type": "string"}, {"$ref": "#"}]}),
        ];
        for doc in docs {
            let err = from_json_schema(&doc, &opts).unwrap_err();
            assert!(matches!(err, LoadError::InvalidDocument { .. }), "{doc}: {err}");
        }
    }

    #[test]
    fn test_mutual_reference_through_property_loads() {
        let s = load(json!({
            "$ref": "#/$defs/A",
            "$defs": {
                "A": {"$ref": "#/$defs/B"},
                "B": {"type": "object", "properties": {"next": {"$ref": "#/$defs/A"}}}
            }
        }));
        assert!(s.parse_any(json!({"next": {"next": {}}})).is_ok());
        assert!(s.parse_any(json!({"next": {"next": 1}})).is_err());
    }

    #[test]
    fn test_metadata_registered() {
        let registry = Registry::new();
        let doc = json!({"type": "string", "title": "Name", "$id": "Name"});
        let s = from_json_schema(&doc, &FromOptions::new().registry(registry.clone())).unwrap();
        let meta = registry.get(&s).unwrap();
        assert_eq!(meta.id.as_deref(), Some("Name"));
        assert_eq!(meta.title.as_deref(), Some("Name"));
    }

    #[test]
    fn test_draft07_tuple_items() {
        let s = load(json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "array",
            "items": [{"type": "string"}, {"type": "integer"}],
            "additionalItems": {"type": "boolean"}
        }));
        assert!(s.parse_any(json!(["a", 1, true, false])).is_ok());
        assert!(s.parse_any(json!(["a", 1, "x"])).is_err());
    }

    #[test]
    fn test_yaml_source() {
        let yaml = "type: string\nminLength: 2\nformat: email\n";
        let s = from_yaml_str(yaml, &FromOptions::new().registry(Registry::new())).unwrap();
        assert!(s.parse_any(json!("a@b.io")).is_ok());
        assert!(s.parse_any(json!("nope")).is_err());
    }
}
