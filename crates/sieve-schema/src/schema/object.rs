//! Object and struct shape helpers.
//!
//! Each helper returns a new schema of the same variant (object stays
//! object, struct stays struct) and fails with
//! [`SchemaError::NotObjectOrStruct`] on any other kind. Helpers that
//! change the field set drop attached checks, since refinements written
//! against the old shape may no longer hold.

use sieve_core::Value;

use super::{Kind, ObjectShape, Schema, UnknownKeys};
use crate::error::SchemaError;

impl Schema {
    fn object_parts(&self) -> Result<(&ObjectShape, bool), SchemaError> {
        match self.kind() {
            Kind::Object(shape) => Ok((shape, false)),
            Kind::Struct(shape) => Ok((shape, true)),
            _ => Err(SchemaError::NotObjectOrStruct {
                found: self.kind().type_code(),
            }),
        }
    }

    fn reshape(
        &self,
        keep_checks: bool,
        f: impl FnOnce(&ObjectShape) -> Result<ObjectShape, SchemaError>,
    ) -> Result<Schema, SchemaError> {
        let (shape, is_struct) = self.object_parts()?;
        let shape = f(shape)?;
        let kind = if is_struct {
            Kind::Struct(shape)
        } else {
            Kind::Object(shape)
        };
        Ok(self.with_kind(kind, keep_checks))
    }

    fn require_keys(shape: &ObjectShape, keys: &[&str]) -> Result<(), SchemaError> {
        match keys.iter().find(|k| shape.get(k).is_none()) {
            Some(missing) => Err(SchemaError::UnknownKey {
                key: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Add or replace fields.
    pub fn extend<K: Into<String>>(
        &self,
        fields: impl IntoIterator<Item = (K, Schema)>,
    ) -> Result<Schema, SchemaError> {
        self.reshape(false, |shape| {
            let mut shape = shape.clone();
            for (k, s) in fields {
                shape.insert(k.into(), s);
            }
            Ok(shape)
        })
    }

    /// Fields of `other` override ours; `other`'s unknown-key policy wins.
    pub fn merge(&self, other: &Schema) -> Result<Schema, SchemaError> {
        let (theirs, _) = other.object_parts()?;
        self.reshape(false, |shape| {
            let mut shape = shape.clone();
            for (k, s) in &theirs.fields {
                shape.insert(k.clone(), s.clone());
            }
            shape.unknown_keys = theirs.unknown_keys.clone();
            Ok(shape)
        })
    }

    /// Keep only `keys`.
    pub fn pick(&self, keys: &[&str]) -> Result<Schema, SchemaError> {
        self.reshape(false, |shape| {
            Self::require_keys(shape, keys)?;
            Ok(ObjectShape {
                fields: shape
                    .fields
                    .iter()
                    .filter(|(k, _)| keys.contains(&k.as_str()))
                    .cloned()
                    .collect(),
                unknown_keys: shape.unknown_keys.clone(),
            })
        })
    }

    /// Drop `keys`.
    pub fn omit(&self, keys: &[&str]) -> Result<Schema, SchemaError> {
        self.reshape(false, |shape| {
            Self::require_keys(shape, keys)?;
            Ok(ObjectShape {
                fields: shape
                    .fields
                    .iter()
                    .filter(|(k, _)| !keys.contains(&k.as_str()))
                    .cloned()
                    .collect(),
                unknown_keys: shape.unknown_keys.clone(),
            })
        })
    }

    /// Every field optional.
    pub fn partial(&self) -> Result<Schema, SchemaError> {
        self.reshape(false, |shape| {
            Ok(ObjectShape {
                fields: shape
                    .fields
                    .iter()
                    .map(|(k, s)| (k.clone(), s.optional()))
                    .collect(),
                unknown_keys: shape.unknown_keys.clone(),
            })
        })
    }

    /// Every field required, undoing `optional`.
    pub fn required(&self) -> Result<Schema, SchemaError> {
        self.reshape(false, |shape| {
            Ok(ObjectShape {
                fields: shape
                    .fields
                    .iter()
                    .map(|(k, s)| (k.clone(), s.non_optional()))
                    .collect(),
                unknown_keys: shape.unknown_keys.clone(),
            })
        })
    }

    /// Enum of the field names.
    pub fn keyof(&self) -> Result<Schema, SchemaError> {
        let (shape, _) = self.object_parts()?;
        Ok(Schema::enum_(shape.keys().map(Value::from)))
    }

    pub fn strict(&self) -> Result<Schema, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    pub fn strip(&self) -> Result<Schema, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    pub fn passthrough(&self) -> Result<Schema, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Validate unknown keys against `schema`.
    pub fn catchall(&self, schema: Schema) -> Result<Schema, SchemaError> {
        self.with_unknown_keys(UnknownKeys::Catchall(schema))
    }

    fn with_unknown_keys(&self, unknown_keys: UnknownKeys) -> Result<Schema, SchemaError> {
        self.reshape(true, |shape| {
            Ok(ObjectShape {
                fields: shape.fields.clone(),
                unknown_keys,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeCode;

    fn user() -> Schema {
        Schema::object([
            ("name", Schema::string()),
            ("age", Schema::int()),
            ("email", Schema::email().optional()),
        ])
    }

    fn keys(schema: &Schema) -> Vec<String> {
        schema
            .shape()
            .map(|s| s.keys().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_pick_and_omit() {
        let picked = user().pick(&["name"]).unwrap();
        assert_eq!(keys(&picked), vec!["name"]);
        let omitted = user().omit(&["age"]).unwrap();
        assert_eq!(keys(&omitted), vec!["name", "email"]);
        let err = user().pick(&["nope"]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownKey { key: "nope".into() });
    }

    #[test]
    fn test_extend_and_merge() {
        let extended = user().extend([("admin", Schema::bool())]).unwrap();
        assert_eq!(keys(&extended), vec!["name", "age", "email", "admin"]);
        let other = Schema::object([("age", Schema::string())]).strict().unwrap();
        let merged = user().merge(&other).unwrap();
        let age = merged.shape().and_then(|s| s.get("age")).map(Schema::type_code);
        assert_eq!(age, Some(TypeCode::String));
        assert!(matches!(
            merged.shape().map(|s| &s.unknown_keys),
            Some(UnknownKeys::Strict)
        ));
    }

    #[test]
    fn test_partial_and_required() {
        let partial = user().partial().unwrap();
        assert!(partial.shape().is_some_and(|s| s.fields.iter().all(|(_, f)| f.is_optional())));
        let required = partial.required().unwrap();
        assert!(required.shape().is_some_and(|s| s.fields.iter().all(|(_, f)| !f.is_optional())));
    }

    #[test]
    fn test_keyof() {
        let k = user().keyof().unwrap();
        let Kind::Enum(values) = k.kind() else {
            panic!("keyof is not an enum");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_struct_stays_struct() {
        let s = Schema::struct_([("a", Schema::int())]).passthrough().unwrap();
        assert_eq!(s.type_code(), TypeCode::Struct);
    }

    #[test]
    fn test_non_object_fails() {
        let err = Schema::string().strict().unwrap_err();
        assert_eq!(
            err,
            SchemaError::NotObjectOrStruct {
                found: TypeCode::String
            }
        );
    }
}
