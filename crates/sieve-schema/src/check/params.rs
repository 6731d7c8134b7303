//! # Check Parameters
//!
//! Check constructors take a single `params` argument accepting any of
//! three shapes, all collapsed by [`Params::normalize`] into one
//! [`CustomParams`]:
//!
//! | Shape | Example |
//! |---|---|
//! | none | `()` |
//! | plain message | `"too short"` |
//! | [`CheckParams`] | `CheckParams::error("too short")` |
//! | [`CustomParams`] | `CustomParams::new().abort().path(["confirm"])` |
//!
//! The `error` field of [`CustomParams`] is an [`ErrorMap`], so it accepts
//! a constant string or a `(RawIssue) -> Option<String>` function.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use sieve_core::{ErrorMap, Payload, PathSegment, Value};

use super::WhenFn;

/// The simple parameter shape: an optional error message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckParams {
    pub error: Option<String>,
}

impl CheckParams {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}

/// The rich parameter shape.
#[derive(Clone, Default)]
pub struct CustomParams {
    pub error: Option<ErrorMap>,
    /// Halt the node's check chain when this check reports an issue.
    pub abort: bool,
    /// Extra properties copied onto every issue the check produces.
    pub params: BTreeMap<String, Value>,
    /// Relative path appended to issues the check produces.
    pub path: Vec<PathSegment>,
    /// Guard; when present the check runs even after an aborting issue.
    pub when: Option<Arc<WhenFn>>,
}

impl CustomParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(mut self, error: impl Into<ErrorMap>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn abort(mut self) -> Self {
        self.abort = true;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn when(mut self, when: impl Fn(&Payload) -> bool + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(when));
        self
    }
}

impl fmt::Debug for CustomParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomParams")
            .field("error", &self.error)
            .field("abort", &self.abort)
            .field("params", &self.params)
            .field("path", &self.path)
            .field("when", &self.when.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Any accepted parameter shape.
#[derive(Debug, Clone, Default)]
pub enum Params {
    #[default]
    None,
    Check(CheckParams),
    Custom(CustomParams),
}

impl Params {
    /// Collapse into the single internal shape.
    pub fn normalize(self) -> CustomParams {
        match self {
            Params::None => CustomParams::default(),
            Params::Check(CheckParams { error }) => CustomParams {
                error: error.map(ErrorMap::from),
                ..CustomParams::default()
            },
            Params::Custom(custom) => custom,
        }
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}

impl From<&str> for Params {
    fn from(message: &str) -> Self {
        Params::Check(CheckParams::error(message))
    }
}

impl From<String> for Params {
    fn from(message: String) -> Self {
        Params::Check(CheckParams::error(message))
    }
}

impl From<CheckParams> for Params {
    fn from(params: CheckParams) -> Self {
        Params::Check(params)
    }
}

impl From<CustomParams> for Params {
    fn from(params: CustomParams) -> Self {
        Params::Custom(params)
    }
}

impl From<ErrorMap> for Params {
    fn from(map: ErrorMap) -> Self {
        Params::Custom(CustomParams::new().error(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::RawIssue;

    fn resolve(params: impl Into<Params>) -> Option<String> {
        params
            .into()
            .normalize()
            .error
            .and_then(|m| m.resolve(&RawIssue::custom(None, Value::Nil)))
    }

    #[test]
    fn test_string_shapes_become_constant_maps() {
        assert_eq!(resolve("plain"), Some("plain".to_string()));
        assert_eq!(resolve(String::from("owned")), Some("owned".to_string()));
        assert_eq!(resolve(CheckParams::error("struct")), Some("struct".to_string()));
        assert_eq!(resolve(()), None);
    }

    #[test]
    fn test_custom_shape_passes_through() {
        let params = Params::from(
            CustomParams::new()
                .abort()
                .path(["confirm"])
                .param("min", 3)
                .error(ErrorMap::new(|issue| Some(format!("code {}", issue.code)))),
        )
        .normalize();
        assert!(params.abort);
        assert_eq!(params.path, vec![PathSegment::from("confirm")]);
        assert_eq!(params.params.get("min"), Some(&Value::Int(3)));
        let message = params
            .error
            .and_then(|m| m.resolve(&RawIssue::custom(None, Value::Nil)));
        assert_eq!(message.as_deref(), Some("code custom"));
    }
}
