//! # Error Types: Finalized Issues and Aggregated Parse Errors
//!
//! A parse that records at least one issue fails with a [`ParseError`]
//! carrying every finalized [`Issue`]. The error exposes the issues in
//! three shapes:
//!
//! - a flat, ordered list ([`ParseError::issues`]),
//! - a first-segment grouping ([`ParseError::flatten`]) for form-style
//!   consumers,
//! - a path-indexed tree ([`ParseError::tree`]).
//!
//! Each issue's message is resolved exactly once, at finalization, by
//! walking the error map chain documented in [`crate::error_map`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config;
use crate::error_map::{default_message, ErrorMap};
use crate::issue::{IssueCode, RawIssue};
use crate::path::{to_pointer, PathSegment};
use crate::value::Value;

/// A validation failure with its resolved message.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
    /// The offending value, when input reporting is enabled.
    pub input: Option<Value>,
    pub properties: BTreeMap<String, Value>,
    /// Finalized per-branch issues for unions and invalid keys.
    pub errors: Vec<Vec<Issue>>,
}

impl Issue {
    /// JSON Pointer rendering of the issue path.
    pub fn pointer(&self) -> String {
        to_pointer(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.pointer(), self.message)
        }
    }
}

/// Message resolution context for one finalization batch.
struct Resolver<'a> {
    parse_map: Option<&'a ErrorMap>,
    global_map: Option<ErrorMap>,
    report_input: bool,
}

impl Resolver<'_> {
    fn message(&self, raw: &RawIssue) -> String {
        raw.message
            .clone()
            .or_else(|| raw.inst.as_ref()?.error.as_ref()?.resolve(raw))
            .or_else(|| self.parse_map?.resolve(raw))
            .or_else(|| self.global_map.as_ref()?.resolve(raw))
            .unwrap_or_else(|| default_message(raw))
    }

    fn finalize(&self, raw: RawIssue) -> Issue {
        let message = self.message(&raw);
        Issue {
            code: raw.code,
            path: raw.path,
            message,
            input: if self.report_input { raw.input } else { None },
            properties: raw.properties,
            errors: raw
                .errors
                .into_iter()
                .map(|branch| branch.into_iter().map(|i| self.finalize(i)).collect())
                .collect(),
        }
    }
}

/// Finalize raw issues into issues with resolved messages.
pub fn finalize_issues(
    raw: Vec<RawIssue>,
    parse_map: Option<&ErrorMap>,
    report_input: bool,
) -> Vec<Issue> {
    let resolver = Resolver {
        parse_map,
        global_map: config::error_map(),
        report_input,
    };
    raw.into_iter().map(|i| resolver.finalize(i)).collect()
}

/// Ordered list of issues with a line-per-issue display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Issue> {
        self.0
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Aggregated validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation failed:\n{issues}")]
pub struct ParseError {
    issues: Issues,
}

/// Issues grouped by their first path segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlattenedError {
    /// Messages of issues at the root.
    pub form_errors: Vec<String>,
    /// Messages keyed by the first path segment.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// Issues arranged along their paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorTree {
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ErrorTree>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<usize, ErrorTree>,
}

impl ErrorTree {
    /// Descend along a path, if every step exists.
    pub fn at(&self, path: &[PathSegment]) -> Option<&ErrorTree> {
        let mut node = self;
        for segment in path {
            node = match segment {
                PathSegment::Key(k) => node.properties.get(k)?,
                PathSegment::Index(i) => node.items.get(i)?,
            };
        }
        Some(node)
    }

    fn insert(&mut self, path: &[PathSegment], message: &str) {
        let mut node = self;
        for segment in path {
            node = match segment {
                PathSegment::Key(k) => node.properties.entry(k.clone()).or_default(),
                PathSegment::Index(i) => node.items.entry(*i).or_default(),
            };
        }
        node.errors.push(message.to_string());
    }
}

impl ParseError {
    /// Build from finalized issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues: Issues(issues),
        }
    }

    /// Finalize raw issues and wrap them.
    pub fn from_raw(raw: Vec<RawIssue>, parse_map: Option<&ErrorMap>, report_input: bool) -> Self {
        Self::new(finalize_issues(raw, parse_map, report_input))
    }

    pub fn issues(&self) -> &[Issue] {
        self.issues.as_slice()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues.into_inner()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Group messages by the first path segment.
    pub fn flatten(&self) -> FlattenedError {
        let mut flat = FlattenedError::default();
        for issue in self.issues() {
            match issue.path.first() {
                None => flat.form_errors.push(issue.message.clone()),
                Some(first) => flat
                    .field_errors
                    .entry(first.to_string())
                    .or_default()
                    .push(issue.message.clone()),
            }
        }
        flat
    }

    /// Arrange messages along their full paths.
    pub fn tree(&self) -> ErrorTree {
        let mut tree = ErrorTree::default();
        for issue in self.issues() {
            tree.insert(&issue.path, &issue.message);
        }
        tree
    }

    /// Human-readable multi-line listing, one `✖ message → at path` pair
    /// per issue.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for issue in self.issues() {
            out.push_str("✖ ");
            out.push_str(&issue.message);
            out.push('\n');
            if !issue.path.is_empty() {
                let dotted = issue
                    .path
                    .iter()
                    .map(|s| match s {
                        PathSegment::Key(k) => format!(".{k}"),
                        PathSegment::Index(i) => format!("[{i}]"),
                    })
                    .collect::<String>();
                out.push_str("  → at ");
                out.push_str(dotted.trim_start_matches('.'));
                out.push('\n');
            }
        }
        out
    }
}
