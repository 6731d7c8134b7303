//! # Metadata Registry
//!
//! Maps schema identity to a metadata record (`id`, `title`,
//! `description`, `examples`, free-form extras). The JSON Schema bridge
//! reads it to hoist identified schemas into `$defs` and to attach
//! annotations; the loader writes it so that annotations survive a round
//! trip.
//!
//! ## Inheritance
//!
//! Lookups fall through the chain of schemas each node was derived from.
//! Fields set closer to the queried node win. Crossing a link created by
//! attaching a check drops the inherited `id`: a schema with an extra
//! constraint is a different definition and must not claim the same
//! `$defs` slot.
//!
//! ## Concurrency
//!
//! Entries sit behind a `parking_lot::RwLock`; writes are serialized and
//! last-write-wins per schema. Entries for dropped schemas are pruned as
//! the table grows. [`Registry::global`] is the process-wide
//! default, and isolated registries can be created freely.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::schema::{Schema, SchemaId, WeakSchema, MAX_UNWRAP_DEPTH};

/// Metadata attached to a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.examples.push(example);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Layer `self` over `below`: fields set on `self` win.
    pub fn overlay(self, below: Meta) -> Meta {
        let mut extra = below.extra;
        extra.extend(self.extra);
        Meta {
            id: self.id.or(below.id),
            title: self.title.or(below.title),
            description: self.description.or(below.description),
            examples: if self.examples.is_empty() {
                below.examples
            } else {
                self.examples
            },
            extra,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Meta::default()
    }
}

struct Entry {
    schema: WeakSchema,
    meta: Meta,
}

/// Size below which dead entries are left in place.
const PRUNE_FLOOR: usize = 64;

struct Table {
    entries: BTreeMap<SchemaId, Entry>,
    /// Strong handles for schemas registered with an ID, one per ID.
    identified: BTreeMap<String, Schema>,
    prune_at: usize,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            identified: BTreeMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }
}

impl Table {
    fn upsert(&mut self, schema: &Schema, meta: Meta, overlay: bool) {
        let meta = match self.entries.remove(&schema.id()) {
            Some(existing) if overlay => meta.overlay(existing.meta),
            _ => meta,
        };
        if let Some(id) = &meta.id {
            self.identified.insert(id.clone(), schema.clone());
        }
        self.entries.insert(
            schema.id(),
            Entry {
                schema: schema.downgrade(),
                meta,
            },
        );
        if self.entries.len() >= self.prune_at {
            self.prune();
        }
    }

    /// Drop entries whose schema no longer exists.
    fn prune(&mut self) {
        self.entries.retain(|_, entry| !entry.schema.is_dropped());
        self.prune_at = (self.entries.len() * 2).max(PRUNE_FLOOR);
    }
}

/// Thread-safe schema → metadata table.
///
/// Entries do not keep their schema alive, and an entry disappears once
/// its schema is dropped. Schemas registered with an `id` are the
/// exception: the latest schema per ID is held so that a registry can be
/// emitted as a whole.
#[derive(Clone, Default)]
pub struct Registry {
    table: Arc<RwLock<Table>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by `describe`/`meta`.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Set the entry for `schema`, replacing any previous one.
    pub fn add(&self, schema: &Schema, meta: Meta) {
        self.table.write().upsert(schema, meta, false);
    }

    /// Merge `meta` over the existing entry for `schema`.
    pub fn merge(&self, schema: &Schema, meta: Meta) {
        self.table.write().upsert(schema, meta, true);
    }

    pub fn remove(&self, schema: &Schema) -> Option<Meta> {
        let mut table = self.table.write();
        let entry = table.entries.remove(&schema.id())?;
        if let Some(id) = &entry.meta.id {
            if table.identified.get(id).is_some_and(|s| s.id() == schema.id()) {
                table.identified.remove(id);
            }
        }
        Some(entry.meta)
    }

    pub fn contains(&self, schema: &Schema) -> bool {
        self.table.read().entries.contains_key(&schema.id())
    }

    /// The entry recorded for exactly this schema.
    pub fn get_own(&self, schema: &Schema) -> Option<Meta> {
        self.table
            .read()
            .entries
            .get(&schema.id())
            .map(|e| e.meta.clone())
    }

    /// Effective metadata, inherited along the derivation chain.
    pub fn get(&self, schema: &Schema) -> Option<Meta> {
        let table = self.table.read();
        let mut merged: Option<Meta> = None;
        let mut crossed_check = false;
        let mut current = Some(schema.clone());
        for _ in 0..MAX_UNWRAP_DEPTH {
            let Some(node) = current else {
                break;
            };
            if let Some(entry) = table.entries.get(&node.id()) {
                let mut meta = entry.meta.clone();
                if crossed_check {
                    meta.id = None;
                }
                merged = Some(match merged {
                    Some(outer) => outer.overlay(meta),
                    None => meta,
                });
            }
            if node.internals().wrapper.is_none() {
                crossed_check = true;
            }
            current = node.internals().inner.clone();
        }
        merged.filter(|m| !m.is_empty())
    }

    /// The schema registered under `id`, if any.
    pub fn find(&self, id: &str) -> Option<Schema> {
        let table = self.table.read();
        let schema = table.identified.get(id)?;
        let current = table.entries.get(&schema.id())?;
        (current.meta.id.as_deref() == Some(id)).then(|| schema.clone())
    }

    /// All live entries in registration-identity order.
    pub fn entries(&self) -> Vec<(Schema, Meta)> {
        self.table
            .read()
            .entries
            .values()
            .filter_map(|e| Some((e.schema.upgrade()?, e.meta.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table
            .read()
            .entries
            .values()
            .filter(|e| !e.schema.is_dropped())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut table = self.table.write();
        table.entries.clear();
        table.identified.clear();
        table.prune_at = PRUNE_FLOOR;
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_own() {
        let registry = Registry::new();
        let s = Schema::string();
        registry.add(&s, Meta::new().id("Name").title("A name"));
        assert_eq!(registry.get_own(&s).and_then(|m| m.id), Some("Name".into()));
        assert_eq!(registry.find("Name").map(|f| f.id()), Some(s.id()));
    }

    #[test]
    fn test_lookup_falls_through_wrappers() {
        let registry = Registry::new();
        let base = Schema::string();
        registry.add(&base, Meta::new().id("Base").description("inner"));
        let wrapped = base.optional().nilable();
        let meta = registry.get(&wrapped).unwrap_or_default();
        assert_eq!(meta.id.as_deref(), Some("Base"));
        assert_eq!(meta.description.as_deref(), Some("inner"));
        assert!(registry.get_own(&wrapped).is_none());
    }

    #[test]
    fn test_outer_fields_win() {
        let registry = Registry::new();
        let base = Schema::string();
        registry.add(&base, Meta::new().title("inner").description("kept"));
        let outer = base.optional();
        registry.add(&outer, Meta::new().title("outer"));
        let meta = registry.get(&outer).unwrap_or_default();
        assert_eq!(meta.title.as_deref(), Some("outer"));
        assert_eq!(meta.description.as_deref(), Some("kept"));
    }

    #[test]
    fn test_checks_drop_inherited_id() {
        let registry = Registry::new();
        let base = Schema::string();
        registry.add(&base, Meta::new().id("Base").title("t"));
        let constrained = base.min(3);
        let meta = registry.get(&constrained).unwrap_or_default();
        assert_eq!(meta.id, None);
        assert_eq!(meta.title.as_deref(), Some("t"));
    }

    #[test]
    fn test_merge_is_last_write_wins_per_field() {
        let registry = Registry::new();
        let s = Schema::int();
        registry.merge(&s, Meta::new().title("a").description("d"));
        registry.merge(&s, Meta::new().title("b"));
        let meta = registry.get_own(&s).unwrap_or_default();
        assert_eq!(meta.title.as_deref(), Some("b"));
        assert_eq!(meta.description.as_deref(), Some("d"));
    }

    #[test]
    fn test_isolated_registries() {
        let a = Registry::new();
        let b = Registry::new();
        let s = Schema::bool();
        a.add(&s, Meta::new().id("Flag"));
        assert!(a.contains(&s));
        assert!(!b.contains(&s));
    }

    #[test]
    fn test_dropped_schema_leaves_registry() {
        let registry = Registry::new();
        let kept = Schema::string().register(&registry, Meta::new().title("kept"));
        for i in 0..1000 {
            let transient = Schema::string().register(&registry, Meta::new().title(format!("t{i}")));
            drop(transient);
        }
        let entries = registry.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.id(), kept.id());
        assert_eq!(registry.len(), 1);
        assert!(registry.table.read().entries.len() < PRUNE_FLOOR);
    }

    #[test]
    fn test_global_describe_does_not_retain() {
        let label = "transient description for registry pruning";
        let described = Schema::int().describe(label);
        let id = described.id();
        assert!(Registry::global().entries().iter().any(|(s, _)| s.id() == id));
        drop(described);
        assert!(Registry::global().entries().iter().all(|(s, _)| s.id() != id));
    }

    #[test]
    fn test_identified_schema_is_retained() {
        let registry = Registry::new();
        let id = Schema::uuid().register(&registry, Meta::new().id("Id")).id();
        let found = registry.find("Id").map(|s| s.id());
        assert_eq!(found, Some(id));
        assert_eq!(registry.entries().len(), 1);

        let replacement = Schema::string().register(&registry, Meta::new().id("Id"));
        assert_eq!(registry.find("Id").map(|s| s.id()), Some(replacement.id()));
    }
}
