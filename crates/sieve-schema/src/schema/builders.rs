//! Constructors, one per type code.

use std::sync::{Arc, OnceLock};

use sieve_core::Value;

use super::{
    discriminator_values, ComplexKind, FloatKind, IntKind, Kind, LazySchema, ObjectShape, Schema,
    StringBoolOptions,
};
use crate::check::format::{self, StringFormat};
use crate::error::SchemaError;
use crate::formats::{IsoDateTimeOptions, TimePrecision};

impl Schema {
    pub fn string() -> Schema {
        Schema::new(Kind::String(None))
    }

    /// String restricted to `fmt`, validated by the matching format check.
    pub fn formatted(fmt: StringFormat) -> Schema {
        Schema::new(Kind::String(Some(fmt.clone()))).check(format::format(fmt, ()))
    }

    pub fn email() -> Schema {
        Schema::formatted(StringFormat::Email)
    }

    pub fn uuid() -> Schema {
        Schema::formatted(StringFormat::Uuid(None))
    }

    /// UUID of one specific version.
    pub fn uuid_v(version: u8) -> Schema {
        Schema::formatted(StringFormat::Uuid(Some(version)))
    }

    pub fn url() -> Schema {
        Schema::formatted(StringFormat::Url)
    }

    pub fn ipv4() -> Schema {
        Schema::formatted(StringFormat::Ipv4)
    }

    pub fn ipv6() -> Schema {
        Schema::formatted(StringFormat::Ipv6)
    }

    pub fn cidrv4() -> Schema {
        Schema::formatted(StringFormat::Cidrv4)
    }

    pub fn cidrv6() -> Schema {
        Schema::formatted(StringFormat::Cidrv6)
    }

    pub fn hostname() -> Schema {
        Schema::formatted(StringFormat::Hostname)
    }

    pub fn mac() -> Schema {
        Schema::formatted(StringFormat::Mac)
    }

    pub fn e164() -> Schema {
        Schema::formatted(StringFormat::E164)
    }

    pub fn base64() -> Schema {
        Schema::formatted(StringFormat::Base64)
    }

    pub fn iso_date() -> Schema {
        Schema::formatted(StringFormat::IsoDate)
    }

    pub fn iso_time(precision: Option<TimePrecision>) -> Schema {
        Schema::formatted(StringFormat::IsoTime(precision))
    }

    pub fn iso_datetime(options: IsoDateTimeOptions) -> Schema {
        Schema::formatted(StringFormat::IsoDateTime(options))
    }

    pub fn iso_duration() -> Schema {
        Schema::formatted(StringFormat::IsoDuration)
    }

    pub fn integer(kind: IntKind) -> Schema {
        Schema::new(Kind::Int(kind))
    }

    pub fn int() -> Schema {
        Schema::integer(IntKind::Int)
    }

    pub fn int8() -> Schema {
        Schema::integer(IntKind::Int8)
    }

    pub fn int16() -> Schema {
        Schema::integer(IntKind::Int16)
    }

    pub fn int32() -> Schema {
        Schema::integer(IntKind::Int32)
    }

    pub fn int64() -> Schema {
        Schema::integer(IntKind::Int64)
    }

    pub fn uint() -> Schema {
        Schema::integer(IntKind::Uint)
    }

    pub fn uint8() -> Schema {
        Schema::integer(IntKind::Uint8)
    }

    pub fn uint16() -> Schema {
        Schema::integer(IntKind::Uint16)
    }

    pub fn uint32() -> Schema {
        Schema::integer(IntKind::Uint32)
    }

    pub fn uint64() -> Schema {
        Schema::integer(IntKind::Uint64)
    }

    pub fn float32() -> Schema {
        Schema::new(Kind::Float(FloatKind::Float32))
    }

    pub fn float64() -> Schema {
        Schema::new(Kind::Float(FloatKind::Float64))
    }

    /// Alias for [`Schema::float64`].
    pub fn float() -> Schema {
        Schema::float64()
    }

    pub fn bool() -> Schema {
        Schema::new(Kind::Bool)
    }

    pub fn nil() -> Schema {
        Schema::new(Kind::Nil)
    }

    pub fn any() -> Schema {
        Schema::new(Kind::Any)
    }

    pub fn unknown() -> Schema {
        Schema::new(Kind::Unknown)
    }

    pub fn never() -> Schema {
        Schema::new(Kind::Never)
    }

    pub fn nan() -> Schema {
        Schema::new(Kind::Nan)
    }

    pub fn big_int() -> Schema {
        Schema::new(Kind::BigInt)
    }

    pub fn complex64() -> Schema {
        Schema::new(Kind::Complex(ComplexKind::Complex64))
    }

    pub fn complex128() -> Schema {
        Schema::new(Kind::Complex(ComplexKind::Complex128))
    }

    /// Boolean spelled as a string (`"yes"`, `"off"`, ...).
    pub fn string_bool() -> Schema {
        Schema::string_bool_with(StringBoolOptions::default())
    }

    pub fn string_bool_with(options: StringBoolOptions) -> Schema {
        Schema::new(Kind::StringBool(options))
    }

    pub fn date() -> Schema {
        Schema::new(Kind::Date)
    }

    pub fn time() -> Schema {
        Schema::new(Kind::Time)
    }

    pub fn function() -> Schema {
        Schema::new(Kind::Function)
    }

    /// Any value accepted by `predicate`.
    pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Schema {
        Schema::new(Kind::Custom(Arc::new(predicate)))
    }

    pub fn literal(value: impl Into<Value>) -> Schema {
        Schema::new(Kind::Literal(vec![value.into()]))
    }

    /// Literal matching any of `values`.
    pub fn literals<I, V>(values: I) -> Schema
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Schema::new(Kind::Literal(values.into_iter().map(Into::into).collect()))
    }

    pub fn enum_<I, V>(values: I) -> Schema
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Schema::new(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn file() -> Schema {
        Schema::new(Kind::File)
    }

    pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::new(Kind::Union(options.into_iter().collect()))
    }

    /// Exactly one option must match.
    pub fn xor(options: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::new(Kind::Xor(options.into_iter().collect()))
    }

    pub fn intersection(left: Schema, right: Schema) -> Schema {
        Schema::new(Kind::Intersection(left, right))
    }

    /// Union of object schemas routed by the literal value of
    /// `discriminator`.
    pub fn discriminated_union(
        discriminator: impl Into<String>,
        options: impl IntoIterator<Item = Schema>,
    ) -> Result<Schema, SchemaError> {
        let discriminator = discriminator.into();
        let options: Vec<Schema> = options.into_iter().collect();
        for (index, option) in options.iter().enumerate() {
            if discriminator_values(option, &discriminator).is_none() {
                return Err(SchemaError::InvalidDiscriminator {
                    index,
                    discriminator,
                });
            }
        }
        Ok(Schema::new(Kind::DiscriminatedUnion {
            discriminator,
            options,
        }))
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
        Schema::object_shape(fields.into_iter().collect())
    }

    pub fn object_shape(shape: ObjectShape) -> Schema {
        Schema::new(Kind::Object(shape))
    }

    /// Object schema mirroring a host struct.
    pub fn struct_<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Schema {
        Schema::struct_shape(fields.into_iter().collect())
    }

    pub fn struct_shape(shape: ObjectShape) -> Schema {
        Schema::new(Kind::Struct(shape))
    }

    /// String-keyed object with uniformly typed values.
    pub fn record(key: Schema, value: Schema) -> Schema {
        Schema::new(Kind::Record { key, value })
    }

    pub fn map(key: Schema, value: Schema) -> Schema {
        Schema::new(Kind::Map { key, value })
    }

    pub fn set(element: Schema) -> Schema {
        Schema::new(Kind::Set(element))
    }

    pub fn slice(element: Schema) -> Schema {
        Schema::new(Kind::Slice(element))
    }

    /// Array of exactly `length` elements.
    pub fn array(element: Schema, length: usize) -> Schema {
        Schema::new(Kind::Array { element, length })
    }

    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::new(Kind::Tuple {
            items: items.into_iter().collect(),
            rest: None,
        })
    }

    /// Tuple whose elements past `items` are validated by `rest`.
    pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
        Schema::new(Kind::Tuple {
            items: items.into_iter().collect(),
            rest: Some(rest),
        })
    }

    pub fn lazy(getter: impl Fn() -> Schema + Send + Sync + 'static) -> Schema {
        Schema::new(Kind::Lazy(LazySchema::new(getter)))
    }

    /// Lazy schema resolved through a cell filled by the caller.
    pub fn deferred(cell: Arc<OnceLock<Schema>>) -> Schema {
        Schema::new(Kind::Lazy(LazySchema::deferred(cell)))
    }

    /// Build a self-referential schema. `build` receives a lazy handle to
    /// the schema it returns.
    ///
    /// The resulting node graph is cyclic and is never freed.
    pub fn recursive(build: impl FnOnce(Schema) -> Schema) -> Schema {
        let cell = Arc::new(OnceLock::new());
        let schema = build(Schema::deferred(Arc::clone(&cell)));
        let _ = cell.set(schema.clone());
        schema
    }

    /// Parse with `input`, then feed the result to `output`.
    pub fn pipeline(input: Schema, output: Schema) -> Schema {
        Schema::new(Kind::Pipe { input, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeCode;

    #[test]
    fn test_leaf_type_codes() {
        assert_eq!(Schema::int16().type_code(), TypeCode::Int16);
        assert_eq!(Schema::float().type_code(), TypeCode::Float64);
        assert_eq!(Schema::complex64().type_code(), TypeCode::Complex64);
        assert_eq!(Schema::email().type_code(), TypeCode::Email);
        assert_eq!(Schema::string_bool().type_code(), TypeCode::StringBool);
    }

    #[test]
    fn test_format_constructor_records_bag() {
        let s = Schema::email();
        assert_eq!(s.internals().bag.format(), Some("email"));
        assert_eq!(s.internals().checks.len(), 1);
    }

    #[test]
    fn test_discriminated_union_requires_literal_field() {
        let cat = Schema::object([("kind", Schema::literal("cat")), ("lives", Schema::int())]);
        let dog = Schema::object([("kind", Schema::literal("dog"))]);
        assert!(Schema::discriminated_union("kind", [cat.clone(), dog]).is_ok());
        let bad = Schema::object([("kind", Schema::string())]);
        let err = Schema::discriminated_union("kind", [cat, bad]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidDiscriminator {
                index: 1,
                discriminator: "kind".into()
            }
        );
    }

    #[test]
    fn test_recursive_points_back() {
        let tree = Schema::recursive(|this| {
            Schema::struct_([("id", Schema::string()), ("children", Schema::slice(this))])
        });
        let Some(Kind::Slice(child)) = tree.shape().and_then(|s| s.get("children")).map(Schema::kind)
        else {
            panic!("children is not a slice");
        };
        let Kind::Lazy(lazy) = child.kind() else {
            panic!("element is not lazy");
        };
        assert!(lazy.resolve().is_some_and(|s| s.ptr_eq(&tree)));
    }
}
