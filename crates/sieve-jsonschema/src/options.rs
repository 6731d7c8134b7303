//! Emission and loading options.

use std::fmt;
use std::sync::Arc;

use sieve_schema::{Registry, Schema};

use crate::node::JsonSchema;

/// JSON Schema dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Draft2020_12,
    Draft07,
}

impl Target {
    pub fn schema_uri(&self) -> &'static str {
        match self {
            Target::Draft2020_12 => "https://json-schema.org/draft/2020-12/schema",
            Target::Draft07 => "http://json-schema.org/draft-07/schema#",
        }
    }

    /// Prefix of local definition references.
    pub fn defs_prefix(&self) -> &'static str {
        match self {
            Target::Draft2020_12 => "#/$defs/",
            Target::Draft07 => "#/definitions/",
        }
    }

    /// Detect the dialect from a `$schema` URI. Unknown URIs map to
    /// 2020-12.
    pub fn from_schema_uri(uri: &str) -> Target {
        if uri.contains("draft-07") {
            Target::Draft07
        } else {
            Target::Draft2020_12
        }
    }
}

/// Which side of pipes and transforms to describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Io {
    /// What parsing produces. Defaulted fields are required.
    #[default]
    Output,
    /// What parsing accepts. Defaulted fields are optional.
    Input,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cycles {
    /// Emit a `$ref` back to the cycle root.
    #[default]
    Ref,
    /// Fail with [`crate::EmitError::CircularReference`].
    Throw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reused {
    /// Repeat the definition at every use.
    #[default]
    Inline,
    /// Hoist composite schemas used more than once into `$defs`.
    Ref,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unrepresentable {
    /// Fail with [`crate::EmitError::UnrepresentableType`].
    #[default]
    Throw,
    /// Emit `{}` in place of the type.
    Any,
}

/// What an override hook sees for one converted node.
pub struct OverrideContext<'a> {
    pub schema: &'a Schema,
    pub node: &'a mut JsonSchema,
    /// JSON Pointer of the node within the emitted document.
    pub path: &'a str,
}

pub type OverrideFn = dyn Fn(&mut OverrideContext<'_>) + Send + Sync;
/// Maps a registry ID to the `$ref` URI used for it.
pub type UriFn = dyn Fn(&str) -> String + Send + Sync;

/// Options for [`crate::to_json_schema`].
#[derive(Clone, Default)]
pub struct ToOptions {
    /// Registry consulted for IDs and annotations; the global registry
    /// when unset.
    pub metadata: Option<Registry>,
    pub unrepresentable: Unrepresentable,
    pub cycles: Cycles,
    pub reused: Reused,
    pub uri: Option<Arc<UriFn>>,
    pub target: Target,
    pub io: Io,
    pub override_hook: Option<Arc<OverrideFn>>,
}

impl ToOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(mut self, registry: Registry) -> Self {
        self.metadata = Some(registry);
        self
    }

    pub fn unrepresentable(mut self, unrepresentable: Unrepresentable) -> Self {
        self.unrepresentable = unrepresentable;
        self
    }

    pub fn cycles(mut self, cycles: Cycles) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn reused(mut self, reused: Reused) -> Self {
        self.reused = reused;
        self
    }

    pub fn uri(mut self, uri: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.uri = Some(Arc::new(uri));
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn io(mut self, io: Io) -> Self {
        self.io = io;
        self
    }

    pub fn override_with(
        mut self,
        hook: impl Fn(&mut OverrideContext<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.override_hook = Some(Arc::new(hook));
        self
    }

    pub(crate) fn registry(&self) -> &Registry {
        self.metadata.as_ref().unwrap_or_else(|| Registry::global())
    }
}

impl fmt::Debug for ToOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToOptions")
            .field("metadata", &self.metadata.is_some())
            .field("unrepresentable", &self.unrepresentable)
            .field("cycles", &self.cycles)
            .field("reused", &self.reused)
            .field("uri", &self.uri.as_ref().map(|_| "<fn>"))
            .field("target", &self.target)
            .field("io", &self.io)
            .field("override_hook", &self.override_hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options for [`crate::from_json_schema`].
#[derive(Debug, Clone, Default)]
pub struct FromOptions {
    /// Registry receiving `title`/`description`/`$id`/`examples`; the
    /// global registry when unset.
    pub registry: Option<Registry>,
    /// Fail on keywords the loader cannot model instead of dropping them.
    pub strict: bool,
    /// Dialect override; detected from `$schema` when unset.
    pub target: Option<Target>,
}

impl FromOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}
