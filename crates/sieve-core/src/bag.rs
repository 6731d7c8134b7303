//! # Constraint Bag
//!
//! Every schema carries a bag: an ordered `key → JSON value` map of the
//! hints its checks contribute for JSON Schema emission. Checks write to
//! the bag when they are attached; the emitter later maps bag keys to
//! keywords with a single table lookup.
//!
//! ## Merge Rules
//!
//! Merging happens at write time so the bag never holds contradictory
//! bounds:
//!
//! - `minimum`: keep the larger. An `exclusiveMinimum` whose value is
//!   `<=` a new inclusive minimum is dropped, and an inclusive `minimum`
//!   whose value is `<=` a new exclusive minimum is dropped.
//! - `maximum`: symmetric, keeping the smaller.
//! - `minLength`/`minSize`: keep the larger; `maxLength`/`maxSize`: the
//!   smaller. Exact length or size writes both ends.
//! - `patterns`: append, deduplicated by exact string equality.
//! - `mime`: append, deduplicated.
//!
//! Bound values may be numbers or, for ISO date bounds, strings. Values of
//! different kinds are incomparable; the later write wins.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

/// Well-known bag keys.
pub mod keys {
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const MULTIPLE_OF: &str = "multipleOf";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_SIZE: &str = "minSize";
    pub const MAX_SIZE: &str = "maxSize";
    pub const PATTERNS: &str = "patterns";
    pub const FORMAT: &str = "format";
    pub const CONTENT_ENCODING: &str = "contentEncoding";
    pub const MIME: &str = "mime";
}

/// Ordered bag of emission hints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bag {
    entries: BTreeMap<String, Value>,
}

/// Compare two bound values. Numbers compare numerically (exactly for
/// integers), strings lexicographically.
pub fn compare_bounds(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw insert with no merge semantics. Prefer the typed writers.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Keep whichever of the existing and new value `prefer` selects.
    fn merge_bound(&mut self, key: &str, value: Value, prefer: Ordering) {
        let keep_existing = self
            .entries
            .get(key)
            .and_then(|existing| compare_bounds(existing, &value))
            .is_some_and(|ord| ord == prefer || ord == Ordering::Equal);
        if !keep_existing {
            self.entries.insert(key.to_string(), value);
        }
    }

    /// Drop `key` when its value is `<=` (for lower bounds) or `>=` (for
    /// upper bounds) the new opposite-inclusivity bound.
    fn drop_weaker(&mut self, key: &str, value: &Value, weaker: Ordering) {
        let weaker_or_equal = self
            .entries
            .get(key)
            .and_then(|existing| compare_bounds(existing, value))
            .is_some_and(|ord| ord == weaker || ord == Ordering::Equal);
        if weaker_or_equal {
            self.entries.remove(key);
        }
    }

    /// Record a lower bound.
    pub fn merge_minimum(&mut self, value: Value, inclusive: bool) {
        if inclusive {
            self.drop_weaker(keys::EXCLUSIVE_MINIMUM, &value, Ordering::Less);
            self.merge_bound(keys::MINIMUM, value, Ordering::Greater);
        } else {
            self.drop_weaker(keys::MINIMUM, &value, Ordering::Less);
            self.merge_bound(keys::EXCLUSIVE_MINIMUM, value, Ordering::Greater);
        }
    }

    /// Record an upper bound.
    pub fn merge_maximum(&mut self, value: Value, inclusive: bool) {
        if inclusive {
            self.drop_weaker(keys::EXCLUSIVE_MAXIMUM, &value, Ordering::Greater);
            self.merge_bound(keys::MAXIMUM, value, Ordering::Less);
        } else {
            self.drop_weaker(keys::MAXIMUM, &value, Ordering::Greater);
            self.merge_bound(keys::EXCLUSIVE_MAXIMUM, value, Ordering::Less);
        }
    }

    pub fn merge_min_length(&mut self, n: u64) {
        self.merge_bound(keys::MIN_LENGTH, Value::from(n), Ordering::Greater);
    }

    pub fn merge_max_length(&mut self, n: u64) {
        self.merge_bound(keys::MAX_LENGTH, Value::from(n), Ordering::Less);
    }

    /// Exact length: both ends.
    pub fn set_length(&mut self, n: u64) {
        self.merge_min_length(n);
        self.merge_max_length(n);
    }

    pub fn merge_min_size(&mut self, n: u64) {
        self.merge_bound(keys::MIN_SIZE, Value::from(n), Ordering::Greater);
    }

    pub fn merge_max_size(&mut self, n: u64) {
        self.merge_bound(keys::MAX_SIZE, Value::from(n), Ordering::Less);
    }

    /// Exact size: both ends.
    pub fn set_size(&mut self, n: u64) {
        self.merge_min_size(n);
        self.merge_max_size(n);
    }

    pub fn set_multiple_of(&mut self, divisor: Value) {
        self.insert(keys::MULTIPLE_OF, divisor);
    }

    pub fn set_format(&mut self, format: &str) {
        self.insert(keys::FORMAT, Value::from(format));
    }

    pub fn set_content_encoding(&mut self, encoding: &str) {
        self.insert(keys::CONTENT_ENCODING, Value::from(encoding));
    }

    fn append_unique(&mut self, key: &str, item: &str) {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            if !items.iter().any(|p| p.as_str() == Some(item)) {
                items.push(Value::from(item));
            }
        } else {
            *entry = Value::Array(vec![Value::from(item)]);
        }
    }

    /// Append a regex pattern, skipping exact duplicates.
    pub fn push_pattern(&mut self, pattern: &str) {
        self.append_unique(keys::PATTERNS, pattern);
    }

    /// Append accepted MIME types, skipping duplicates.
    pub fn push_mime(&mut self, mime: &[String]) {
        for m in mime {
            self.append_unique(keys::MIME, m);
        }
    }

    fn string_list(&self, key: &str) -> Vec<&str> {
        match self.entries.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Patterns in attachment order.
    pub fn patterns(&self) -> Vec<&str> {
        self.string_list(keys::PATTERNS)
    }

    pub fn mime(&self) -> Vec<&str> {
        self.string_list(keys::MIME)
    }

    pub fn format(&self) -> Option<&str> {
        self.get(keys::FORMAT).and_then(Value::as_str)
    }

    /// Whether any numeric or date bound has been recorded.
    pub fn has_bounds(&self) -> bool {
        [
            keys::MINIMUM,
            keys::MAXIMUM,
            keys::EXCLUSIVE_MINIMUM,
            keys::EXCLUSIVE_MAXIMUM,
        ]
        .iter()
        .any(|k| self.contains_key(k))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Successive inclusive minimums always retain the largest.
        #[test]
        fn minimum_is_max_of_writes(values in prop::collection::vec(-1000i64..1000, 1..10)) {
            let mut bag = Bag::new();
            for v in &values {
                bag.merge_minimum(Value::from(*v), true);
            }
            let expected = values.iter().max().copied().unwrap_or_default();
            prop_assert_eq!(bag.get(keys::MINIMUM), Some(&Value::from(expected)));
        }

        /// Successive inclusive maximums always retain the smallest.
        #[test]
        fn maximum_is_min_of_writes(values in prop::collection::vec(-1000i64..1000, 1..10)) {
            let mut bag = Bag::new();
            for v in &values {
                bag.merge_maximum(Value::from(*v), true);
            }
            let expected = values.iter().min().copied().unwrap_or_default();
            prop_assert_eq!(bag.get(keys::MAXIMUM), Some(&Value::from(expected)));
        }

        /// `gt(x)` followed by `gte(y)` with `y >= x` keeps only the inclusive bound.
        #[test]
        fn inclusive_replaces_weaker_exclusive(x in -1000i64..1000, delta in 0i64..1000) {
            let mut bag = Bag::new();
            bag.merge_minimum(Value::from(x), false);
            bag.merge_minimum(Value::from(x + delta), true);
            prop_assert!(bag.get(keys::EXCLUSIVE_MINIMUM).is_none());
            prop_assert_eq!(bag.get(keys::MINIMUM), Some(&Value::from(x + delta)));
        }
    }
}
