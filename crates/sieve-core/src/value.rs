//! # Untyped Value Carrier
//!
//! `Value` is the unit of data flowing through the parse pipeline. It is
//! deliberately richer than `serde_json::Value`: the schema model covers
//! types that JSON cannot express (big integers, complex numbers, NaN,
//! files, timestamps, functions, maps with non-string keys), and the
//! validation engine needs to see them as-is.
//!
//! ## Conversions
//!
//! - `From<serde_json::Value>` is lossless: integers land in `Int` or
//!   `Uint`, everything else numeric in `Float`.
//! - [`Value::to_json`] is partial: it returns `None` for values with no
//!   JSON representation.
//! - [`FromValue`] extracts typed Rust values after a successful parse.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// File header handed to the validation engine by the caller.
///
/// The engine never touches the file system; size and content type are
/// taken from this header as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileInfo {
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME content type (e.g., `image/png`).
    pub mime: String,
}

impl FileInfo {
    /// Construct a file header.
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }
}

type FunctionBody = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A callable carried as a value. Equality is pointer identity.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    body: Arc<FunctionBody>,
}

impl FunctionRef {
    /// Wrap a closure as a function value.
    pub fn new(name: impl Into<String>, body: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    /// The function's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({})", self.name)
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

/// Untyped value passed through the check pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or explicit null.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    BigInt(i128),
    Complex {
        re: f64,
        im: f64,
    },
    String(String),
    Array(Vec<Value>),
    /// String-keyed object. Keys are kept sorted.
    Object(BTreeMap<String, Value>),
    /// Map with arbitrary keys, insertion-ordered.
    Map(Vec<(Value, Value)>),
    File(FileInfo),
    DateTime(DateTime<Utc>),
    Function(FunctionRef),
}

impl Value {
    /// Short type name used in `invalid_type` issues.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(f) if f.is_nan() => "nan",
            Value::Float(_) => "float",
            Value::BigInt(_) => "bigint",
            Value::Complex { .. } => "complex",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::File(_) => "file",
            Value::DateTime(_) => "datetime",
            Value::Function(_) => "function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// True for `Int`, `Uint`, `Float`, and `BigInt`.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Uint(_) | Value::Float(_) | Value::BigInt(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view as `f64`. Large integers lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            Value::BigInt(b) => Some(*b as f64),
            _ => None,
        }
    }

    /// Exact integer view. Floats qualify only when finite and integral.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(i128::from(*i)),
            Value::Uint(u) => Some(i128::from(*u)),
            Value::BigInt(b) => Some(*b),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 => {
                Some(*f as i128)
            }
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Length used by length checks: characters for strings, elements for
    /// arrays, entries for objects and maps.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Object(map) => Some(map.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Size used by size checks: entries for collections, bytes for files.
    pub fn size(&self) -> Option<u64> {
        match self {
            Value::Array(items) => Some(items.len() as u64),
            Value::Object(map) => Some(map.len() as u64),
            Value::Map(entries) => Some(entries.len() as u64),
            Value::File(file) => Some(file.size),
            _ => None,
        }
    }

    /// Order two values for bound checks.
    ///
    /// Numbers compare numerically across representations (exactly when
    /// both are integral), strings lexicographically, timestamps
    /// chronologically. Anything else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (a, b) if a.is_number() && b.is_number() => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
            _ => None,
        }
    }

    /// Convert to JSON. Returns `None` when the value (or any nested
    /// value) has no JSON representation.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as J;
        Some(match self {
            Value::Nil => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Uint(u) => J::from(*u),
            Value::Float(f) => J::Number(serde_json::Number::from_f64(*f)?),
            Value::BigInt(b) => {
                if let Ok(i) = i64::try_from(*b) {
                    J::from(i)
                } else {
                    J::from(u64::try_from(*b).ok()?)
                }
            }
            Value::String(s) => J::String(s.clone()),
            Value::Array(items) => {
                J::Array(items.iter().map(Value::to_json).collect::<Option<Vec<_>>>()?)
            }
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                J::Object(out)
            }
            Value::Map(entries) => {
                let mut out = serde_json::Map::new();
                for (k, v) in entries {
                    out.insert(k.as_str()?.to_string(), v.to_json()?);
                }
                J::Object(out)
            }
            Value::DateTime(dt) => J::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Complex { .. } | Value::File(_) | Value::Function(_) => return None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::BigInt(b) => write!(f, "{b}n"),
            Value::Complex { re, im } => write!(f, "({re}{im:+}i)"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::File(file) => write!(f, "<file {} ({} bytes)>", file.name, file.size),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ─── Conversions into Value ─────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Nil,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            J::String(s) => Value::String(s),
            J::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            J::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

macro_rules! value_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        }
    )*};
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(u64::from(v))
            }
        }
    )*};
}

value_from_signed!(i8, i16, i32, i64);
value_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<FileInfo> for Value {
    fn from(v: FileInfo) -> Self {
        Value::File(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<FunctionRef> for Value {
    fn from(v: FunctionRef) -> Self {
        Value::Function(v)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Value::Object(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

// ─── Typed extraction ───────────────────────────────────────────────

/// Extract a typed Rust value from a parsed [`Value`].
///
/// On mismatch the original value is handed back so callers can report it.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

macro_rules! from_value_integer {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, Value> {
                match value.as_i128().and_then(|i| <$t>::try_from(i).ok()) {
                    Some(v) => Ok(v),
                    None => Err(value),
                }
            }
        }
    )*};
}

from_value_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value.as_f64() {
            Some(f) => Ok(f),
            None => Err(value),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value.as_f64() {
            Some(f) => Ok(f as f32),
            None => Err(value),
        }
    }
}

impl FromValue for FileInfo {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::File(f) => Ok(f),
            other => Err(other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value.to_json() {
            Some(json) => Ok(json),
            None => Err(value),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Array(items) => {
                let snapshot = items.clone();
                items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| Value::Array(snapshot))
            }
            other => Err(other),
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => {
                let snapshot = map.clone();
                map.into_iter()
                    .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map_err(|_| Value::Object(snapshot))
            }
            other => Err(other),
        }
    }
}
