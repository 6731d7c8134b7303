//! # JSON Schema Emission
//!
//! Converts a [`Schema`] (or every identified schema in a [`Registry`])
//! into a [`JsonSchema`] document.
//!
//! ## Passes
//!
//! 1. **Count.** Walk the tree once, counting visits per *base* schema:
//!    the node left after unwrapping wrappers and resolving lazy
//!    schemas. Wrapping a schema in `optional` therefore does not make it
//!    a different definition.
//! 2. **Convert.** Walk again, building nodes. For each schema:
//!    - a registry ID places the base under `$defs[id]` and the use site
//!      becomes a `$ref`;
//!    - a base already under construction is a cycle: `$ref: "#"` for the
//!      root, otherwise a `$ref` to a definition filled in once the base
//!      completes;
//!    - with [`Reused::Ref`], a composite base visited more than once is
//!      hoisted under an auto-generated `defN` name. Wrapper nodes are
//!      rendered inline and never become the reference themselves.
//!
//! Decorators are applied around the converted shape: `nilable` becomes
//! `anyOf[shape, {type: null}]` and defaults become the `default`
//! keyword. Registry annotations (`title`, `description`, `examples`,
//! extras) attach last, then the override hook runs.
//!
//! Integer and float schemas converted at the root carry the range of
//! their width as `minimum`/`maximum` unless a bound was set explicitly.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use sieve_core::bag::keys;
use sieve_core::Bag;
use sieve_schema::schema::MAX_UNWRAP_DEPTH;
use sieve_schema::{
    FloatKind, IntKind, Kind, Meta, ObjectShape, Registry, Schema, SchemaId, TypeCode,
    UnknownKeys,
};
use tracing::{debug, warn};

use crate::error::EmitError;
use crate::node::{BoolOrSchema, InstanceType, Items, JsonSchema};
use crate::options::{Cycles, Io, OverrideContext, Reused, Target, ToOptions, Unrepresentable};

/// Convert one schema into a standalone document.
pub fn to_json_schema(schema: &Schema, opts: &ToOptions) -> Result<JsonSchema, EmitError> {
    let mut emitter = Emitter::new(opts, opts.registry());
    let root = emitter.base(schema)?;
    emitter.root = Some(root.id());
    emitter.count(schema)?;
    let mut doc = emitter.convert(schema, 1)?;
    emitter.attach_definitions(&mut doc);
    doc.schema = Some(opts.target.schema_uri().to_string());
    Ok(doc)
}

/// Convert every schema registered with an ID into one document whose
/// definition table holds them all, keyed by ID.
pub fn registry_to_json_schema(
    registry: &Registry,
    opts: &ToOptions,
) -> Result<JsonSchema, EmitError> {
    let mut identified: Vec<(String, Schema)> = registry
        .entries()
        .into_iter()
        .filter_map(|(schema, meta)| meta.id.map(|id| (id, schema)))
        .collect();
    identified.sort_by(|a, b| a.0.cmp(&b.0));

    let mut emitter = Emitter::new(opts, registry);
    for (_, schema) in &identified {
        emitter.count(schema)?;
    }
    for (id, schema) in &identified {
        emitter.path = vec![defs_keyword(opts.target).to_string(), escape(id)];
        emitter.convert(schema, 1)?;
    }
    emitter.path.clear();

    let mut doc = JsonSchema::default();
    emitter.attach_definitions(&mut doc);
    doc.schema = Some(opts.target.schema_uri().to_string());
    Ok(doc)
}

fn defs_keyword(target: Target) -> &'static str {
    match target {
        Target::Draft2020_12 => "$defs",
        Target::Draft07 => "definitions",
    }
}

/// JSON Pointer escaping of one reference token.
fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Per-run conversion state. Never shared between runs.
struct Emitter<'a> {
    opts: &'a ToOptions,
    registry: &'a Registry,
    /// Visits per base schema, from the counting pass.
    counts: HashMap<SchemaId, usize>,
    /// `$ref` target for bases that live in the definition table.
    refs: HashMap<SchemaId, String>,
    /// Bases reached again while under construction, with the
    /// definition name they will be stored under.
    cyclic: HashMap<SchemaId, String>,
    defs: BTreeMap<String, JsonSchema>,
    /// Bases under construction, innermost last.
    stack: Vec<SchemaId>,
    root: Option<SchemaId>,
    auto: usize,
    /// Escaped pointer segments of the node being converted.
    path: Vec<String>,
}

impl<'a> Emitter<'a> {
    fn new(opts: &'a ToOptions, registry: &'a Registry) -> Self {
        Self {
            opts,
            registry,
            counts: HashMap::new(),
            refs: HashMap::new(),
            cyclic: HashMap::new(),
            defs: BTreeMap::new(),
            stack: Vec::new(),
            root: None,
            auto: 0,
            path: Vec::new(),
        }
    }

    fn pointer(&self) -> String {
        let mut out = String::from("#");
        for segment in &self.path {
            out.push('/');
            out.push_str(segment);
        }
        out
    }

    /// Canonical base: wrappers unwrapped, lazy schemas resolved.
    fn base(&self, schema: &Schema) -> Result<Schema, EmitError> {
        let mut current = schema.unwrap_wrappers();
        for _ in 0..MAX_UNWRAP_DEPTH {
            let Kind::Lazy(lazy) = current.kind() else {
                return Ok(current);
            };
            let target = lazy.resolve().ok_or_else(|| EmitError::UnresolvedLazy {
                path: self.pointer(),
            })?;
            current = target.unwrap_wrappers();
        }
        Ok(current)
    }

    fn count(&mut self, schema: &Schema) -> Result<(), EmitError> {
        let base = self.base(schema)?;
        let visits = self.counts.entry(base.id()).or_insert(0);
        *visits += 1;
        if *visits > 1 {
            return Ok(());
        }
        for child in self.children(base.kind()) {
            self.count(&child)?;
        }
        Ok(())
    }

    /// Children that the convert pass will visit.
    fn children(&self, kind: &Kind) -> Vec<Schema> {
        match kind {
            Kind::Union(options) | Kind::Xor(options) => options.clone(),
            Kind::DiscriminatedUnion { options, .. } => options.clone(),
            Kind::Intersection(left, right) => vec![left.clone(), right.clone()],
            Kind::Object(shape) | Kind::Struct(shape) => {
                let mut children: Vec<Schema> =
                    shape.fields.iter().map(|(_, s)| s.clone()).collect();
                if let UnknownKeys::Catchall(schema) = &shape.unknown_keys {
                    children.push(schema.clone());
                }
                children
            }
            Kind::Record { key, value } | Kind::Map { key, value } => {
                vec![key.clone(), value.clone()]
            }
            Kind::Set(element) | Kind::Slice(element) => vec![element.clone()],
            Kind::Array { element, .. } => vec![element.clone()],
            Kind::Tuple { items, rest } => items.iter().chain(rest).cloned().collect(),
            Kind::Pipe { input, output } => match self.opts.io {
                Io::Input => vec![input.clone()],
                Io::Output => vec![output.clone()],
            },
            Kind::Transform { input, .. } => match self.opts.io {
                Io::Input => vec![input.clone()],
                Io::Output => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn defs_prefix(&self) -> &'static str {
        self.opts.target.defs_prefix()
    }

    fn ref_for_id(&self, id: &str) -> String {
        match &self.opts.uri {
            Some(uri) => uri(id),
            None => format!("{}{}", self.defs_prefix(), escape(id)),
        }
    }

    fn next_auto_name(&mut self) -> String {
        loop {
            self.auto += 1;
            let name = format!("def{}", self.auto);
            if !self.defs.contains_key(&name) {
                return name;
            }
        }
    }

    fn attach_definitions(&mut self, doc: &mut JsonSchema) {
        if self.defs.is_empty() {
            return;
        }
        let defs = std::mem::take(&mut self.defs);
        match self.opts.target {
            Target::Draft2020_12 => doc.defs = Some(defs),
            Target::Draft07 => doc.definitions = Some(defs),
        }
    }

    fn child(
        &mut self,
        segments: &[&str],
        schema: &Schema,
        depth: usize,
    ) -> Result<JsonSchema, EmitError> {
        self.path.extend(segments.iter().map(|s| escape(s)));
        let node = self.convert(schema, depth + 1);
        self.path.truncate(self.path.len() - segments.len());
        node
    }

    fn convert(&mut self, schema: &Schema, depth: usize) -> Result<JsonSchema, EmitError> {
        let base = self.base(schema)?;
        let key = base.id();
        let meta = self.registry.get(schema);
        let is_wrapper = schema.wrapper().is_some();

        if let Some(id) = meta.as_ref().and_then(|m| m.id.clone()) {
            let target = self.ref_for_id(&id);
            self.refs.entry(key).or_insert_with(|| target.clone());
            if !self.defs.contains_key(&id) && !self.stack.contains(&key) {
                debug!(name = %id, reason = "identified", "hoisting schema into definitions");
                let mut body = self.body(&base, depth)?;
                annotate(&mut body, meta.as_ref());
                self.defs.insert(id, body);
            }
            let mut node = JsonSchema::reference(target);
            self.decorate(&mut node, schema);
            return Ok(self.finish(schema, node));
        }

        if self.stack.contains(&key) {
            if self.opts.cycles == Cycles::Throw {
                return Err(EmitError::CircularReference {
                    path: self.pointer(),
                });
            }
            let mut node = JsonSchema::reference(self.cycle_target(key));
            self.decorate(&mut node, schema);
            annotate(&mut node, meta.as_ref());
            return Ok(self.finish(schema, node));
        }

        if !is_wrapper && Some(key) != self.root {
            if let Some(target) = self.refs.get(&key).cloned() {
                let mut node = JsonSchema::reference(target);
                if !schema.ptr_eq(&base) {
                    annotate(&mut node, meta.as_ref());
                }
                return Ok(self.finish(schema, node));
            }
            let shared = self.opts.reused == Reused::Ref
                && is_composite(base.kind())
                && self.counts.get(&key).copied().unwrap_or(0) > 1;
            if shared {
                let name = self.next_auto_name();
                let target = format!("{}{}", self.defs_prefix(), name);
                debug!(name = %name, reason = "reused", "hoisting schema into definitions");
                self.refs.insert(key, target.clone());
                let mut body = self.body(&base, depth)?;
                annotate(&mut body, self.registry.get(&base).as_ref());
                self.defs.insert(name, body);
                let mut node = JsonSchema::reference(target);
                if !schema.ptr_eq(&base) {
                    annotate(&mut node, meta.as_ref());
                }
                return Ok(self.finish(schema, node));
            }
        }

        let mut node = self.body(&base, depth)?;
        if let Some(name) = self.cyclic.remove(&key) {
            debug!(name = %name, reason = "cycle", "hoisting schema into definitions");
            let target = format!("{}{}", self.defs_prefix(), name);
            self.defs.insert(name, node);
            node = JsonSchema::reference(target);
        }
        self.decorate(&mut node, schema);
        annotate(&mut node, meta.as_ref());
        Ok(self.finish(schema, node))
    }

    /// Reference target for a base reached while under construction.
    fn cycle_target(&mut self, key: SchemaId) -> String {
        if let Some(target) = self.refs.get(&key) {
            return target.clone();
        }
        if Some(key) == self.root {
            return "#".to_string();
        }
        let name = self.next_auto_name();
        let target = format!("{}{}", self.defs_prefix(), name);
        self.refs.insert(key, target.clone());
        self.cyclic.insert(key, name);
        target
    }

    fn body(&mut self, base: &Schema, depth: usize) -> Result<JsonSchema, EmitError> {
        self.stack.push(base.id());
        let node = self.shape(base, depth);
        self.stack.pop();
        node
    }

    fn decorate(&self, node: &mut JsonSchema, schema: &Schema) {
        let internals = schema.internals();
        if internals.nilable && !node.is_null() {
            let shape = std::mem::take(node);
            *node = JsonSchema::any_of(vec![shape, JsonSchema::typed(InstanceType::Null)]);
        }
        if let Some(default) = internals.default.as_ref().and_then(|d| d.produce().to_json()) {
            node.default = Some(default);
        }
    }

    fn finish(&self, schema: &Schema, mut node: JsonSchema) -> JsonSchema {
        if let Some(hook) = &self.opts.override_hook {
            let path = self.pointer();
            hook(&mut OverrideContext {
                schema,
                node: &mut node,
                path: &path,
            });
        }
        node
    }

    fn unrepresentable(&self, type_code: TypeCode) -> Result<JsonSchema, EmitError> {
        match self.opts.unrepresentable {
            Unrepresentable::Any => {
                warn!(type_code = %type_code, path = %self.pointer(), "unrepresentable type emitted as {{}}");
                Ok(JsonSchema::any())
            }
            Unrepresentable::Throw => Err(EmitError::UnrepresentableType {
                type_code,
                path: self.pointer(),
            }),
        }
    }

    /// The shape of a base schema, with its bag applied.
    fn shape(&mut self, base: &Schema, depth: usize) -> Result<JsonSchema, EmitError> {
        let bag = &base.internals().bag;
        let kind = base.kind();
        let node = match kind {
            Kind::String(_) => {
                let mut node = JsonSchema::typed(InstanceType::String);
                apply_string(&mut node, bag);
                node
            }
            Kind::Date | Kind::Time => {
                let mut node = JsonSchema {
                    format: Some("date-time".to_string()),
                    ..JsonSchema::typed(InstanceType::String)
                };
                apply_bounds(&mut node, bag);
                node
            }
            Kind::Int(int) => {
                let mut node = JsonSchema::typed(InstanceType::Integer);
                apply_bounds(&mut node, bag);
                if depth == 1 {
                    int_range(&mut node, *int);
                }
                node
            }
            Kind::Float(float) => {
                let mut node = JsonSchema::typed(InstanceType::Number);
                apply_bounds(&mut node, bag);
                if depth == 1 {
                    float_range(&mut node, *float);
                }
                node
            }
            Kind::Bool => JsonSchema::typed(InstanceType::Boolean),
            Kind::Nil => JsonSchema::typed(InstanceType::Null),
            Kind::Any | Kind::Unknown => JsonSchema::any(),
            Kind::Never => JsonSchema::never(),
            Kind::StringBool(options) => match self.opts.io {
                Io::Input => JsonSchema {
                    enum_values: Some(
                        options
                            .truthy
                            .iter()
                            .chain(&options.falsy)
                            .map(|w| Value::from(w.as_str()))
                            .collect(),
                    ),
                    ..JsonSchema::typed(InstanceType::String)
                },
                Io::Output => JsonSchema::typed(InstanceType::Boolean),
            },
            Kind::Literal(values) => match json_values(values) {
                Some(mut values) if values.len() == 1 => JsonSchema {
                    const_value: values.pop(),
                    ..JsonSchema::default()
                },
                Some(values) => enum_node(values),
                None => self.unrepresentable(TypeCode::Literal)?,
            },
            Kind::Enum(values) => match json_values(values) {
                Some(values) => enum_node(values),
                None => self.unrepresentable(TypeCode::Enum)?,
            },
            Kind::File => file_node(bag),
            Kind::Union(options) | Kind::DiscriminatedUnion { options, .. } => {
                JsonSchema::any_of(self.each("anyOf", options, depth)?)
            }
            Kind::Xor(options) => JsonSchema {
                one_of: Some(self.each("oneOf", options, depth)?),
                ..JsonSchema::default()
            },
            Kind::Intersection(left, right) => {
                let left = self.child(&["allOf", "0"], left, depth)?;
                let right = self.child(&["allOf", "1"], right, depth)?;
                JsonSchema {
                    all_of: Some(vec![left, right]),
                    ..JsonSchema::default()
                }
            }
            Kind::Object(shape) | Kind::Struct(shape) => {
                let mut node = self.object_node(shape, depth)?;
                apply_properties(&mut node, bag);
                node
            }
            Kind::Record { key, value } => {
                let mut node = self.record_node(key, value, depth)?;
                apply_properties(&mut node, bag);
                node
            }
            Kind::Map { key, value } => {
                if self.is_string_key(key)? {
                    let mut node = self.record_node(key, value, depth)?;
                    apply_properties(&mut node, bag);
                    node
                } else {
                    match self.opts.unrepresentable {
                        Unrepresentable::Any => self.unrepresentable(TypeCode::Map)?,
                        Unrepresentable::Throw => {
                            return Err(EmitError::UnsupportedInputType {
                                type_code: TypeCode::Map,
                                path: self.pointer(),
                            })
                        }
                    }
                }
            }
            Kind::Set(element) => {
                let items = self.child(&["items"], element, depth)?;
                let mut node = JsonSchema {
                    items: Some(Items::Schema(Box::new(items))),
                    unique_items: Some(true),
                    ..JsonSchema::typed(InstanceType::Array)
                };
                apply_items(&mut node, bag);
                node
            }
            Kind::Slice(element) => {
                let items = self.child(&["items"], element, depth)?;
                let mut node = JsonSchema {
                    items: Some(Items::Schema(Box::new(items))),
                    ..JsonSchema::typed(InstanceType::Array)
                };
                apply_items(&mut node, bag);
                node
            }
            Kind::Array { element, length } => {
                let items = self.child(&["items"], element, depth)?;
                let length = *length as u64;
                JsonSchema {
                    items: Some(Items::Schema(Box::new(items))),
                    min_items: Some(length),
                    max_items: Some(length),
                    ..JsonSchema::typed(InstanceType::Array)
                }
            }
            Kind::Tuple { items, rest } => self.tuple_node(items, rest.as_ref(), depth)?,
            Kind::Pipe { input, output } => {
                let side = match self.opts.io {
                    Io::Input => input,
                    Io::Output => output,
                };
                self.convert(side, depth)?
            }
            Kind::Transform { input, .. } => match self.opts.io {
                Io::Input => self.convert(input, depth)?,
                Io::Output => self.unrepresentable(TypeCode::Transform)?,
            },
            Kind::Lazy(_) => {
                return Err(EmitError::UnresolvedLazy {
                    path: self.pointer(),
                })
            }
            Kind::Nan
            | Kind::BigInt
            | Kind::Complex(_)
            | Kind::Function
            | Kind::Custom(_) => self.unrepresentable(kind.type_code())?,
        };
        Ok(node)
    }

    fn each(
        &mut self,
        keyword: &str,
        options: &[Schema],
        depth: usize,
    ) -> Result<Vec<JsonSchema>, EmitError> {
        let mut nodes = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            nodes.push(self.child(&[keyword, &i.to_string()], option, depth)?);
        }
        Ok(nodes)
    }

    fn is_string_key(&self, key: &Schema) -> Result<bool, EmitError> {
        Ok(match self.base(key)?.kind() {
            Kind::String(_) => true,
            Kind::Enum(values) | Kind::Literal(values) => {
                values.iter().all(|v| matches!(v, sieve_core::Value::String(_)))
            }
            _ => false,
        })
    }

    fn object_node(&mut self, shape: &ObjectShape, depth: usize) -> Result<JsonSchema, EmitError> {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        for (name, field) in &shape.fields {
            let node = self.child(&["properties", name], field, depth)?;
            properties.insert(name.clone(), node);
            if self.is_required(field) {
                required.push(name.clone());
            }
        }
        required.sort();

        let additional_properties = match &shape.unknown_keys {
            UnknownKeys::Strict => Some(BoolOrSchema::Bool(false)),
            UnknownKeys::Strip if self.opts.io == Io::Output => Some(BoolOrSchema::Bool(false)),
            UnknownKeys::Strip | UnknownKeys::Passthrough => None,
            UnknownKeys::Catchall(schema) => Some(BoolOrSchema::Schema(Box::new(
                self.child(&["additionalProperties"], schema, depth)?,
            ))),
        };

        Ok(JsonSchema {
            properties: Some(properties),
            required: (!required.is_empty()).then_some(required),
            additional_properties,
            ..JsonSchema::typed(InstanceType::Object)
        })
    }

    /// Whether an object field must be present, per IO mode. Input may
    /// omit defaulted fields; output always carries them.
    fn is_required(&self, field: &Schema) -> bool {
        if field.is_optional() {
            return false;
        }
        let internals = field.internals();
        match self.opts.io {
            Io::Input => internals.default.is_none() && internals.prefault.is_none(),
            Io::Output => true,
        }
    }

    fn record_node(
        &mut self,
        key: &Schema,
        value: &Schema,
        depth: usize,
    ) -> Result<JsonSchema, EmitError> {
        let key = self.child(&["propertyNames"], key, depth)?;
        let value = self.child(&["additionalProperties"], value, depth)?;
        Ok(JsonSchema {
            property_names: Some(Box::new(key)),
            additional_properties: Some(BoolOrSchema::Schema(Box::new(value))),
            ..JsonSchema::typed(InstanceType::Object)
        })
    }

    fn tuple_node(
        &mut self,
        items: &[Schema],
        rest: Option<&Schema>,
        depth: usize,
    ) -> Result<JsonSchema, EmitError> {
        let target = self.opts.target;
        let prefix_keyword = match target {
            Target::Draft2020_12 => "prefixItems",
            Target::Draft07 => "items",
        };
        let prefix = self.each(prefix_keyword, items, depth)?;
        let mut node = JsonSchema::typed(InstanceType::Array);
        match target {
            Target::Draft2020_12 => {
                node.prefix_items = Some(prefix);
                if let Some(rest) = rest {
                    let rest = self.child(&["items"], rest, depth)?;
                    node.items = Some(Items::Schema(Box::new(rest)));
                }
            }
            Target::Draft07 => {
                node.items = Some(Items::Tuple(prefix));
                if let Some(rest) = rest {
                    let rest = self.child(&["additionalItems"], rest, depth)?;
                    node.additional_items = Some(BoolOrSchema::Schema(Box::new(rest)));
                }
            }
        }
        if rest.is_none() {
            let required = items
                .iter()
                .rposition(|s| !s.is_optional() && s.internals().default.is_none())
                .map_or(0, |i| i + 1);
            node.min_items = Some(required as u64);
            node.max_items = Some(items.len() as u64);
        }
        Ok(node)
    }
}

fn is_composite(kind: &Kind) -> bool {
    matches!(
        kind,
        Kind::Object(_)
            | Kind::Struct(_)
            | Kind::Record { .. }
            | Kind::Map { .. }
            | Kind::Set(_)
            | Kind::Slice(_)
            | Kind::Array { .. }
            | Kind::Tuple { .. }
            | Kind::Union(_)
            | Kind::Xor(_)
            | Kind::Intersection(..)
            | Kind::DiscriminatedUnion { .. }
    )
}

fn annotate(node: &mut JsonSchema, meta: Option<&Meta>) {
    let Some(meta) = meta else {
        return;
    };
    if meta.title.is_some() {
        node.title = meta.title.clone();
    }
    if meta.description.is_some() {
        node.description = meta.description.clone();
    }
    if !meta.examples.is_empty() {
        node.examples = Some(meta.examples.clone());
    }
    for (key, value) in &meta.extra {
        node.extra.insert(key.clone(), value.clone());
    }
}

fn json_values(values: &[sieve_core::Value]) -> Option<Vec<Value>> {
    values.iter().map(sieve_core::Value::to_json).collect()
}

/// `enum` node, sorted (stably) and typed when the values are all
/// strings or all numbers.
fn enum_node(mut values: Vec<Value>) -> JsonSchema {
    let instance_type = if values.is_empty() {
        None
    } else if values.iter().all(Value::is_string) {
        values.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        Some(InstanceType::String)
    } else if values.iter().all(Value::is_number) {
        values.sort_by(|a, b| {
            a.as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Some(InstanceType::Number)
    } else {
        None
    };
    JsonSchema {
        instance_type,
        enum_values: Some(values),
        ..JsonSchema::default()
    }
}

fn file_node(bag: &Bag) -> JsonSchema {
    let node = JsonSchema {
        format: Some("binary".to_string()),
        content_encoding: Some("binary".to_string()),
        min_length: count(bag, keys::MIN_SIZE),
        max_length: count(bag, keys::MAX_SIZE),
        ..JsonSchema::typed(InstanceType::String)
    };
    match bag.mime().as_slice() {
        [] => node,
        [one] => JsonSchema {
            content_media_type: Some(one.to_string()),
            ..node
        },
        many => JsonSchema::any_of(
            many.iter()
                .map(|m| JsonSchema {
                    content_media_type: Some(m.to_string()),
                    ..node.clone()
                })
                .collect(),
        ),
    }
}

fn count(bag: &Bag, key: &str) -> Option<u64> {
    bag.get(key).and_then(Value::as_u64)
}

/// JSON Schema `format` for a recorded format name. Base64 is expressed
/// through `contentEncoding` instead.
fn json_format(name: &str) -> Option<&str> {
    match name {
        "url" => Some("uri"),
        "iso_date" => Some("date"),
        "iso_time" => Some("time"),
        "iso_datetime" => Some("date-time"),
        "iso_duration" => Some("duration"),
        "base64" => None,
        other => Some(other),
    }
}

fn apply_string(node: &mut JsonSchema, bag: &Bag) {
    node.min_length = count(bag, keys::MIN_LENGTH);
    node.max_length = count(bag, keys::MAX_LENGTH);
    node.format = bag.format().and_then(json_format).map(str::to_string);
    node.content_encoding = bag
        .get(keys::CONTENT_ENCODING)
        .and_then(Value::as_str)
        .map(str::to_string);
    match bag.patterns().as_slice() {
        [] => {}
        [one] => node.pattern = Some(one.to_string()),
        many => {
            node.all_of = Some(
                many.iter()
                    .map(|p| JsonSchema {
                        pattern: Some(p.to_string()),
                        ..JsonSchema::default()
                    })
                    .collect(),
            )
        }
    }
    apply_bounds(node, bag);
}

/// Numeric bounds; string-valued bounds (ISO dates, timestamps) become
/// the `format*` keywords.
fn apply_bounds(node: &mut JsonSchema, bag: &Bag) {
    let split = |key: &str| match bag.get(key) {
        Some(v) if v.is_string() => (None, Some(v.clone())),
        other => (other.cloned(), None),
    };
    (node.minimum, node.format_minimum) = split(keys::MINIMUM);
    (node.maximum, node.format_maximum) = split(keys::MAXIMUM);
    (node.exclusive_minimum, node.format_exclusive_minimum) = split(keys::EXCLUSIVE_MINIMUM);
    (node.exclusive_maximum, node.format_exclusive_maximum) = split(keys::EXCLUSIVE_MAXIMUM);
    node.multiple_of = bag.get(keys::MULTIPLE_OF).cloned();
}

fn apply_items(node: &mut JsonSchema, bag: &Bag) {
    node.min_items = count(bag, keys::MIN_LENGTH);
    node.max_items = count(bag, keys::MAX_LENGTH);
}

fn apply_properties(node: &mut JsonSchema, bag: &Bag) {
    node.min_properties = count(bag, keys::MIN_SIZE);
    node.max_properties = count(bag, keys::MAX_SIZE);
}

fn int_json(n: i128) -> Value {
    match i64::try_from(n) {
        Ok(i) => Value::from(i),
        Err(_) => u64::try_from(n).map_or(Value::Null, Value::from),
    }
}

fn int_range(node: &mut JsonSchema, int: IntKind) {
    if node.minimum.is_none() && node.exclusive_minimum.is_none() {
        node.minimum = Some(int_json(int.min()));
    }
    if node.maximum.is_none() && node.exclusive_maximum.is_none() {
        node.maximum = Some(int_json(int.max()));
    }
}

fn float_range(node: &mut JsonSchema, float: FloatKind) {
    if node.minimum.is_none() && node.exclusive_minimum.is_none() {
        node.minimum = Some(Value::from(-float.max()));
    }
    if node.maximum.is_none() && node.exclusive_maximum.is_none() {
        node.maximum = Some(Value::from(float.max()));
    }
}
