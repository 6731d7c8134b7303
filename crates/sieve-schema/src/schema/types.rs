//! # Type Codes
//!
//! The closed enumeration of schema type codes, plus the numeric width
//! tables that drive integer range enforcement at parse time and default
//! `minimum`/`maximum` emission.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of schema type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCode {
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    Nil,
    Any,
    Unknown,
    Never,
    Union,
    Xor,
    Intersection,
    Pipe,
    Transform,
    DiscriminatedUnion,
    Record,
    Object,
    Struct,
    Slice,
    Array,
    Tuple,
    Enum,
    Literal,
    File,
    Lazy,
    Map,
    Set,
    Nan,
    StringBool,
    Function,
    Custom,
    Complex64,
    Complex128,
    BigInt,
    Date,
    Time,
    Email,
    Uuid,
    Url,
    Ipv4,
    Ipv6,
    Cidrv4,
    Cidrv6,
    Hostname,
    Mac,
    E164,
    Base64,
    IsoDate,
    IsoTime,
    IsoDateTime,
    IsoDuration,
    Optional,
    Nilable,
    Default,
    Prefault,
    Refine,
    Check,
    NonOptional,
}

impl TypeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::String => "string",
            TypeCode::Int => "int",
            TypeCode::Int8 => "int8",
            TypeCode::Int16 => "int16",
            TypeCode::Int32 => "int32",
            TypeCode::Int64 => "int64",
            TypeCode::Uint => "uint",
            TypeCode::Uint8 => "uint8",
            TypeCode::Uint16 => "uint16",
            TypeCode::Uint32 => "uint32",
            TypeCode::Uint64 => "uint64",
            TypeCode::Float32 => "float32",
            TypeCode::Float64 => "float64",
            TypeCode::Bool => "bool",
            TypeCode::Nil => "nil",
            TypeCode::Any => "any",
            TypeCode::Unknown => "unknown",
            TypeCode::Never => "never",
            TypeCode::Union => "union",
            TypeCode::Xor => "xor",
            TypeCode::Intersection => "intersection",
            TypeCode::Pipe => "pipe",
            TypeCode::Transform => "transform",
            TypeCode::DiscriminatedUnion => "discriminated_union",
            TypeCode::Record => "record",
            TypeCode::Object => "object",
            TypeCode::Struct => "struct",
            TypeCode::Slice => "slice",
            TypeCode::Array => "array",
            TypeCode::Tuple => "tuple",
            TypeCode::Enum => "enum",
            TypeCode::Literal => "literal",
            TypeCode::File => "file",
            TypeCode::Lazy => "lazy",
            TypeCode::Map => "map",
            TypeCode::Set => "set",
            TypeCode::Nan => "nan",
            TypeCode::StringBool => "string_bool",
            TypeCode::Function => "function",
            TypeCode::Custom => "custom",
            TypeCode::Complex64 => "complex64",
            TypeCode::Complex128 => "complex128",
            TypeCode::BigInt => "big_int",
            TypeCode::Date => "date",
            TypeCode::Time => "time",
            TypeCode::Email => "email",
            TypeCode::Uuid => "uuid",
            TypeCode::Url => "url",
            TypeCode::Ipv4 => "ipv4",
            TypeCode::Ipv6 => "ipv6",
            TypeCode::Cidrv4 => "cidrv4",
            TypeCode::Cidrv6 => "cidrv6",
            TypeCode::Hostname => "hostname",
            TypeCode::Mac => "mac",
            TypeCode::E164 => "e164",
            TypeCode::Base64 => "base64",
            TypeCode::IsoDate => "iso_date",
            TypeCode::IsoTime => "iso_time",
            TypeCode::IsoDateTime => "iso_datetime",
            TypeCode::IsoDuration => "iso_duration",
            TypeCode::Optional => "optional",
            TypeCode::Nilable => "nilable",
            TypeCode::Default => "default",
            TypeCode::Prefault => "prefault",
            TypeCode::Refine => "refine",
            TypeCode::Check => "check",
            TypeCode::NonOptional => "non_optional",
        }
    }

    /// Types whose JSON Schema rendering has structure worth hoisting
    /// into `$defs` when reused.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeCode::Union
                | TypeCode::Xor
                | TypeCode::Intersection
                | TypeCode::DiscriminatedUnion
                | TypeCode::Record
                | TypeCode::Object
                | TypeCode::Struct
                | TypeCode::Slice
                | TypeCode::Array
                | TypeCode::Tuple
                | TypeCode::Map
                | TypeCode::Set
                | TypeCode::Enum
        )
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer widths. `Int`/`Uint` follow the platform word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntKind {
    pub fn type_code(&self) -> TypeCode {
        match self {
            IntKind::Int => TypeCode::Int,
            IntKind::Int8 => TypeCode::Int8,
            IntKind::Int16 => TypeCode::Int16,
            IntKind::Int32 => TypeCode::Int32,
            IntKind::Int64 => TypeCode::Int64,
            IntKind::Uint => TypeCode::Uint,
            IntKind::Uint8 => TypeCode::Uint8,
            IntKind::Uint16 => TypeCode::Uint16,
            IntKind::Uint32 => TypeCode::Uint32,
            IntKind::Uint64 => TypeCode::Uint64,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntKind::Int | IntKind::Int8 | IntKind::Int16 | IntKind::Int32 | IntKind::Int64
        )
    }

    /// Inclusive lower bound of the width.
    pub fn min(&self) -> i128 {
        match self {
            IntKind::Int => isize::MIN as i128,
            IntKind::Int8 => i8::MIN.into(),
            IntKind::Int16 => i16::MIN.into(),
            IntKind::Int32 => i32::MIN.into(),
            IntKind::Int64 => i64::MIN.into(),
            _ => 0,
        }
    }

    /// Inclusive upper bound of the width.
    pub fn max(&self) -> i128 {
        match self {
            IntKind::Int => isize::MAX as i128,
            IntKind::Int8 => i8::MAX.into(),
            IntKind::Int16 => i16::MAX.into(),
            IntKind::Int32 => i32::MAX.into(),
            IntKind::Int64 => i64::MAX.into(),
            IntKind::Uint => usize::MAX as i128,
            IntKind::Uint8 => u8::MAX.into(),
            IntKind::Uint16 => u16::MAX.into(),
            IntKind::Uint32 => u32::MAX.into(),
            IntKind::Uint64 => u64::MAX.into(),
        }
    }
}

/// Floating point widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    Float32,
    Float64,
}

impl FloatKind {
    pub fn type_code(&self) -> TypeCode {
        match self {
            FloatKind::Float32 => TypeCode::Float32,
            FloatKind::Float64 => TypeCode::Float64,
        }
    }

    /// Largest finite magnitude.
    pub fn max(&self) -> f64 {
        match self {
            FloatKind::Float32 => f64::from(f32::MAX),
            FloatKind::Float64 => f64::MAX,
        }
    }
}

/// Complex number widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexKind {
    Complex64,
    Complex128,
}

/// The wrapper method that derived a schema from its inner schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Optional,
    Nilable,
    Default,
    Prefault,
    NonOptional,
    /// `describe`/`meta`: same validation, new registry entry.
    Meta,
}

impl WrapperKind {
    /// Type code of the wrapper. `Meta` wrappers keep the inner type code.
    pub fn type_code(&self) -> Option<TypeCode> {
        match self {
            WrapperKind::Optional => Some(TypeCode::Optional),
            WrapperKind::Nilable => Some(TypeCode::Nilable),
            WrapperKind::Default => Some(TypeCode::Default),
            WrapperKind::Prefault => Some(TypeCode::Prefault),
            WrapperKind::NonOptional => Some(TypeCode::NonOptional),
            WrapperKind::Meta => None,
        }
    }
}
