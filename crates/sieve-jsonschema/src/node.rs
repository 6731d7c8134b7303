//! # JSON Schema Node
//!
//! Typed rendering of the keywords the emitter produces. Fields serialize
//! in declaration order and absent keywords are skipped, so a node
//! serializes to exactly the keywords that were set. Annotations and
//! override additions without a dedicated field live in `extra`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::EmitError;

/// Primitive JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

/// `additionalProperties` / `items` may be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoolOrSchema {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

/// `items`: one schema, or (Draft-07 tuples) a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Items {
    Schema(Box<JsonSchema>),
    Bool(bool),
    Tuple(Vec<JsonSchema>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    // Strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_exclusive_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_exclusive_maximum: Option<Value>,

    // Numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Value>,

    // Objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<BoolOrSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    // Arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<BoolOrSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // Composition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<JsonSchema>>,

    // Annotations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,

    #[serde(rename = "$defs", skip_serializing_if = "Option::is_none")]
    pub defs: Option<BTreeMap<String, JsonSchema>>,
    /// Draft-07 definitions table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, JsonSchema>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl JsonSchema {
    /// The empty schema, accepting anything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn typed(instance_type: InstanceType) -> Self {
        Self {
            instance_type: Some(instance_type),
            ..Self::default()
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    /// `{"not": {}}`: accepts nothing.
    pub fn never() -> Self {
        Self {
            not: Some(Box::new(Self::any())),
            ..Self::default()
        }
    }

    /// `anyOf` over `options`.
    pub fn any_of(options: Vec<JsonSchema>) -> Self {
        Self {
            any_of: Some(options),
            ..Self::default()
        }
    }

    pub fn is_null(&self) -> bool {
        self.instance_type == Some(InstanceType::Null)
    }

    pub fn to_value(&self) -> Result<Value, EmitError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_string_pretty(&self) -> Result<String, EmitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_set_keywords_serialize() {
        let node = JsonSchema {
            min_length: Some(2),
            ..JsonSchema::typed(InstanceType::String)
        };
        assert_eq!(node.to_value().unwrap(), json!({"type": "string", "minLength": 2}));
    }

    #[test]
    fn test_never_is_not_empty() {
        assert_eq!(JsonSchema::never().to_value().unwrap(), json!({"not": {}}));
    }

    #[test]
    fn test_bool_or_schema_forms() {
        let closed = JsonSchema {
            additional_properties: Some(BoolOrSchema::Bool(false)),
            ..JsonSchema::typed(InstanceType::Object)
        };
        assert_eq!(
            closed.to_value().unwrap(),
            json!({"type": "object", "additionalProperties": false})
        );
        let tuple = JsonSchema {
            items: Some(Items::Tuple(vec![JsonSchema::typed(InstanceType::Null)])),
            ..JsonSchema::default()
        };
        assert_eq!(tuple.to_value().unwrap(), json!({"items": [{"type": "null"}]}));
    }

    #[test]
    fn test_extra_keywords_flatten() {
        let mut node = JsonSchema::reference("#/$defs/User");
        node.extra.insert("deprecated".into(), json!(true));
        assert_eq!(
            node.to_value().unwrap(),
            json!({"$ref": "#/$defs/User", "deprecated": true})
        );
    }
}
