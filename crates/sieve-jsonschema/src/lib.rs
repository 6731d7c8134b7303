//! # sieve-jsonschema: JSON Schema Bridge
//!
//! Converts sieve schemas to JSON Schema documents and back.
//!
//! - **Emit** ([`emit`]): [`to_json_schema`] renders one schema,
//!   [`registry_to_json_schema`] renders every identified schema of a
//!   registry into a single definitions table. Draft 2020-12 by default,
//!   Draft-07 on request.
//! - **Load** ([`load`]): [`from_json_schema`] and [`from_yaml_str`]
//!   build a schema from a document, registering `title`, `description`,
//!   `$id` and `examples` in the configured registry.
//!
//! ## Example
//!
//! ```
//! use sieve_jsonschema::{to_json_schema, ToOptions};
//! use sieve_schema::{Registry, Schema};
//!
//! let schema = Schema::float().min(5).max(10);
//! let doc = to_json_schema(&schema, &ToOptions::new().metadata(Registry::new())).unwrap();
//! assert_eq!(
//!     doc.to_value().unwrap(),
//!     serde_json::json!({
//!         "$schema": "https://json-schema.org/draft/2020-12/schema",
//!         "type": "number",
//!         "minimum": 5,
//!         "maximum": 10
//!     })
//! );
//! ```

pub mod emit;
pub mod error;
pub mod load;
pub mod node;
pub mod options;

pub use emit::{registry_to_json_schema, to_json_schema};
pub use error::{EmitError, LoadError};
pub use load::{from_json_schema, from_yaml_str};
pub use node::{BoolOrSchema, InstanceType, Items, JsonSchema};
pub use options::{
    Cycles, FromOptions, Io, OverrideContext, OverrideFn, Reused, Target, ToOptions,
    Unrepresentable, UriFn,
};
