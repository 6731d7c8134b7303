//! # Schema Nodes
//!
//! A [`Schema`] is a cheap, shareable handle to an immutable [`Node`].
//! Every node pairs a [`Kind`] (one variant per type code, carrying the
//! children of composites) with an [`Internals`] record of decorators:
//! the constraint bag, attached checks, optionality flags, defaults, a
//! schema-level error map, and the link to the schema it was derived
//! from.
//!
//! ## Derivation
//!
//! Nothing is ever mutated in place. Builder methods return a new node:
//!
//! - **Wrappers** (`optional`, `nilable`, `default`, `prefault`,
//!   `non_optional`, `meta`) copy the kind, flip a decorator, and record
//!   `inner` + `wrapper`. Unwrapping follows these links back to the base.
//! - **Checks** copy the kind, append the check, fire its `on_attach`
//!   callbacks against the copied bag, and record `inner` with no
//!   wrapper. A constrained schema is a distinct base.
//! - **Object helpers** build a fresh kind with no `inner` link.
//!
//! Node identity ([`SchemaId`]) is assigned from a process-wide counter
//! and is the key for the registry and for cycle/reuse detection.

mod builders;
mod modifiers;
mod object;
mod types;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use sieve_core::{Bag, ErrorMap, Value};

use crate::check::format::StringFormat;
use crate::check::{AttachContext, Check};

pub use types::{ComplexKind, FloatKind, IntKind, TypeCode, WrapperKind};

/// Upper bound on wrapper-chain walks. Chains are acyclic by
/// construction; the bound guards against pathological depth.
pub const MAX_UNWRAP_DEPTH: usize = 64;

/// Identity of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(u64);

impl SchemaId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SchemaId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;
pub type TransformFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;
pub type DefaultFn = dyn Fn() -> Value + Send + Sync;
pub type LazyFn = dyn Fn() -> Schema + Send + Sync;

/// A default or prefault: a fixed value or a generator.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Func(Arc<DefaultFn>),
}

impl DefaultValue {
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Func(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Deferred schema. Resolved on first use and cached.
#[derive(Clone)]
pub struct LazySchema {
    getter: Option<Arc<LazyFn>>,
    cell: Arc<OnceLock<Schema>>,
}

impl LazySchema {
    pub fn new(getter: impl Fn() -> Schema + Send + Sync + 'static) -> Self {
        Self {
            getter: Some(Arc::new(getter)),
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// A lazy schema filled later through `cell`.
    pub fn deferred(cell: Arc<OnceLock<Schema>>) -> Self {
        Self { getter: None, cell }
    }

    /// The target schema, or `None` for a deferred cell never filled.
    pub fn resolve(&self) -> Option<Schema> {
        if let Some(schema) = self.cell.get() {
            return Some(schema.clone());
        }
        let getter = self.getter.as_ref()?;
        Some(self.cell.get_or_init(|| getter()).clone())
    }
}

/// Handling of object keys not named in the shape.
#[derive(Debug, Clone, Default)]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Report `unrecognized_keys`.
    Strict,
    /// Copy them to the output unchanged.
    Passthrough,
    /// Validate them against a schema.
    Catchall(Schema),
}

/// Fields of an object or struct schema, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    pub fields: Vec<(String, Schema)>,
    pub unknown_keys: UnknownKeys,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, keeping the original position on replace.
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.insert(name.into(), schema);
        self
    }

    pub(crate) fn insert(&mut self, name: String, schema: Schema) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = schema,
            None => self.fields.push((name, schema)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, s)| s)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Schema)> for ObjectShape {
    fn from_iter<I: IntoIterator<Item = (K, Schema)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ObjectShape::new(), |shape, (k, s)| shape.field(k, s))
    }
}

/// Accepted spellings for `string_bool`.
#[derive(Debug, Clone, PartialEq)]
pub struct StringBoolOptions {
    pub truthy: Vec<String>,
    pub falsy: Vec<String>,
    pub case_sensitive: bool,
}

impl Default for StringBoolOptions {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            truthy: owned(&["true", "1", "yes", "on", "y", "enabled"]),
            falsy: owned(&["false", "0", "no", "off", "n", "disabled"]),
            case_sensitive: false,
        }
    }
}

/// One variant per type code.
#[derive(Clone)]
pub enum Kind {
    /// Plain string, or a string restricted to a format.
    String(Option<StringFormat>),
    Int(IntKind),
    Float(FloatKind),
    Bool,
    Nil,
    Any,
    Unknown,
    Never,
    Nan,
    BigInt,
    Complex(ComplexKind),
    StringBool(StringBoolOptions),
    Date,
    Time,
    Function,
    Custom(Arc<PredicateFn>),
    Literal(Vec<Value>),
    Enum(Vec<Value>),
    File,
    Union(Vec<Schema>),
    Xor(Vec<Schema>),
    Intersection(Schema, Schema),
    DiscriminatedUnion {
        discriminator: String,
        options: Vec<Schema>,
    },
    Object(ObjectShape),
    Struct(ObjectShape),
    Record {
        key: Schema,
        value: Schema,
    },
    Map {
        key: Schema,
        value: Schema,
    },
    Set(Schema),
    Slice(Schema),
    /// Fixed-length homogeneous array.
    Array {
        element: Schema,
        length: usize,
    },
    Tuple {
        items: Vec<Schema>,
        rest: Option<Schema>,
    },
    Lazy(LazySchema),
    Pipe {
        input: Schema,
        output: Schema,
    },
    Transform {
        input: Schema,
        func: Arc<TransformFn>,
    },
}

impl Kind {
    pub fn type_code(&self) -> TypeCode {
        match self {
            Kind::String(None) => TypeCode::String,
            Kind::String(Some(format)) => format.type_code(),
            Kind::Int(k) => k.type_code(),
            Kind::Float(k) => k.type_code(),
            Kind::Bool => TypeCode::Bool,
            Kind::Nil => TypeCode::Nil,
            Kind::Any => TypeCode::Any,
            Kind::Unknown => TypeCode::Unknown,
            Kind::Never => TypeCode::Never,
            Kind::Nan => TypeCode::Nan,
            Kind::BigInt => TypeCode::BigInt,
            Kind::Complex(ComplexKind::Complex64) => TypeCode::Complex64,
            Kind::Complex(ComplexKind::Complex128) => TypeCode::Complex128,
            Kind::StringBool(_) => TypeCode::StringBool,
            Kind::Date => TypeCode::Date,
            Kind::Time => TypeCode::Time,
            Kind::Function => TypeCode::Function,
            Kind::Custom(_) => TypeCode::Custom,
            Kind::Literal(_) => TypeCode::Literal,
            Kind::Enum(_) => TypeCode::Enum,
            Kind::File => TypeCode::File,
            Kind::Union(_) => TypeCode::Union,
            Kind::Xor(_) => TypeCode::Xor,
            Kind::Intersection(..) => TypeCode::Intersection,
            Kind::DiscriminatedUnion { .. } => TypeCode::DiscriminatedUnion,
            Kind::Object(_) => TypeCode::Object,
            Kind::Struct(_) => TypeCode::Struct,
            Kind::Record { .. } => TypeCode::Record,
            Kind::Map { .. } => TypeCode::Map,
            Kind::Set(_) => TypeCode::Set,
            Kind::Slice(_) => TypeCode::Slice,
            Kind::Array { .. } => TypeCode::Array,
            Kind::Tuple { .. } => TypeCode::Tuple,
            Kind::Lazy(_) => TypeCode::Lazy,
            Kind::Pipe { .. } => TypeCode::Pipe,
            Kind::Transform { .. } => TypeCode::Transform,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_code().as_str())
    }
}

/// Decorators carried by every node.
#[derive(Debug, Clone, Default)]
pub struct Internals {
    pub bag: Bag,
    pub checks: Vec<Check>,
    pub optional: bool,
    pub nilable: bool,
    pub non_optional: bool,
    pub coerce: bool,
    pub default: Option<DefaultValue>,
    pub prefault: Option<DefaultValue>,
    /// Schema-level error map, consulted after check-level maps.
    pub error: Option<ErrorMap>,
    /// The schema this node was derived from.
    pub inner: Option<Schema>,
    /// How this node was derived from `inner`; `None` for check
    /// attachment.
    pub wrapper: Option<WrapperKind>,
}

pub struct Node {
    id: SchemaId,
    kind: Kind,
    internals: Internals,
}

/// Shareable handle to an immutable schema node.
#[derive(Clone)]
pub struct Schema(Arc<Node>);

/// Handle that does not keep its node alive.
#[derive(Clone)]
pub(crate) struct WeakSchema(Weak<Node>);

impl WeakSchema {
    pub(crate) fn upgrade(&self) -> Option<Schema> {
        self.0.upgrade().map(Schema)
    }

    pub(crate) fn is_dropped(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl Schema {
    pub(crate) fn downgrade(&self) -> WeakSchema {
        WeakSchema(Arc::downgrade(&self.0))
    }

    pub fn new(kind: Kind) -> Schema {
        Schema::from_parts(kind, Internals::default())
    }

    pub(crate) fn from_parts(kind: Kind, internals: Internals) -> Schema {
        Schema(Arc::new(Node {
            id: SchemaId::next(),
            kind,
            internals,
        }))
    }

    pub fn id(&self) -> SchemaId {
        self.0.id
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn internals(&self) -> &Internals {
        &self.0.internals
    }

    /// The wrapper's code for wrapper nodes, otherwise the kind's code.
    pub fn type_code(&self) -> TypeCode {
        self.0
            .internals
            .wrapper
            .and_then(|w| w.type_code())
            .unwrap_or_else(|| self.0.kind.type_code())
    }

    pub fn inner(&self) -> Option<&Schema> {
        self.0.internals.inner.as_ref()
    }

    pub fn wrapper(&self) -> Option<WrapperKind> {
        self.0.internals.wrapper
    }

    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Absent input is accepted (and yields nil).
    pub fn is_optional(&self) -> bool {
        let internals = self.internals();
        internals.optional && !internals.non_optional
    }

    /// Shape of an object or struct schema.
    pub fn shape(&self) -> Option<&ObjectShape> {
        match self.kind() {
            Kind::Object(shape) | Kind::Struct(shape) => Some(shape),
            _ => None,
        }
    }

    /// Follow wrapper links back to the base schema. Check-derived links
    /// are not followed.
    pub fn unwrap_wrappers(&self) -> Schema {
        let mut current = self.clone();
        for _ in 0..MAX_UNWRAP_DEPTH {
            match (current.wrapper(), current.inner()) {
                (Some(_), Some(inner)) => current = inner.clone(),
                _ => break,
            }
        }
        current
    }

    /// Derive a wrapper node.
    pub(crate) fn wrap(&self, wrapper: WrapperKind, edit: impl FnOnce(&mut Internals)) -> Schema {
        let mut internals = self.0.internals.clone();
        internals.inner = Some(self.clone());
        internals.wrapper = Some(wrapper);
        edit(&mut internals);
        Schema::from_parts(self.0.kind.clone(), internals)
    }

    /// Derive a node with `check` appended.
    pub fn check(&self, check: Check) -> Schema {
        let mut internals = self.0.internals.clone();
        let mut ctx = AttachContext::new(self.0.kind.type_code(), &mut internals.bag);
        check.attach(&mut ctx);
        let registrations = ctx.into_registrations();
        internals.checks.push(check);
        internals.inner = Some(self.clone());
        internals.wrapper = None;
        let schema = Schema::from_parts(self.0.kind.clone(), internals);
        for (registry, meta) in registrations {
            registry.merge(&schema, meta);
        }
        schema
    }

    /// Build a node of a new kind. Flags carry over; the derivation link
    /// is cut. With `keep_checks` unset the bag and checks are dropped too.
    pub(crate) fn with_kind(&self, kind: Kind, keep_checks: bool) -> Schema {
        let mut internals = self.0.internals.clone();
        internals.inner = None;
        internals.wrapper = None;
        if !keep_checks {
            internals.bag = Bag::new();
            internals.checks.clear();
        }
        Schema::from_parts(kind, internals)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.0.id.0)
            .field("type", &self.type_code())
            .finish()
    }
}

/// Values an object schema's `key` field can take when that field is a
/// literal or an enum. Used to route discriminated unions.
pub fn discriminator_values(schema: &Schema, key: &str) -> Option<Vec<Value>> {
    let field = schema.shape()?.get(key)?;
    match field.kind() {
        Kind::Literal(values) | Kind::Enum(values) => Some(values.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrappers_link_to_inner() {
        let base = Schema::string();
        let opt = base.optional();
        assert_eq!(opt.type_code(), TypeCode::Optional);
        assert_eq!(opt.inner().map(Schema::id), Some(base.id()));
        assert!(opt.unwrap_wrappers().ptr_eq(&base));
        assert!(!base.internals().optional);
    }

    #[test]
    fn test_meta_wrapper_keeps_type_code() {
        let s = Schema::int().describe("count");
        assert_eq!(s.type_code(), TypeCode::Int);
        assert_eq!(s.wrapper(), Some(WrapperKind::Meta));
    }

    #[test]
    fn test_check_attachment_is_copy_on_write() {
        let base = Schema::string();
        let constrained = base.min(3);
        assert!(base.internals().checks.is_empty());
        assert!(base.internals().bag.is_empty());
        assert_eq!(constrained.internals().checks.len(), 1);
        assert_eq!(
            constrained.internals().bag.get("minLength"),
            Some(&serde_json::json!(3))
        );
        assert!(constrained.unwrap_wrappers().ptr_eq(&constrained));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Schema::bool();
        let b = a.clone();
        let c = Schema::bool();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_lazy_resolves_once() {
        let lazy = LazySchema::new(Schema::string);
        let first = lazy.resolve().map(|s| s.id());
        let second = lazy.resolve().map(|s| s.id());
        assert_eq!(first, second);
        let deferred = LazySchema::deferred(Arc::new(OnceLock::new()));
        assert!(deferred.resolve().is_none());
    }

    #[test]
    fn test_shape_replace_keeps_position() {
        let shape = ObjectShape::new()
            .field("a", Schema::string())
            .field("b", Schema::int())
            .field("a", Schema::bool());
        let keys: Vec<_> = shape.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(shape.get("a").map(Schema::type_code), Some(TypeCode::Bool));
    }
}
