//! # Payload
//!
//! The mutable carrier threaded through the check pipeline. A single
//! payload travels through an entire parse: composite nodes push a path
//! segment, swap the child's value in, run the child, take the value
//! back, and pop. Issues therefore always carry absolute paths.
//!
//! ## Invariants
//!
//! - The path stack depth equals the depth of the schema walk.
//! - Issues added through [`Payload::add_issue`] are prefixed with the
//!   current path stack at insertion time.

use crate::issue::RawIssue;
use crate::path::PathSegment;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Payload {
    /// The value under validation at the current node.
    pub value: Value,
    path: Vec<PathSegment>,
    issues: Vec<RawIssue>,
}

impl Payload {
    /// A payload at the root with an empty path and no issues.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            path: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// A fresh payload at the same location as `self`, with no issues.
    ///
    /// Used for trial parses (union branches, prefault detection) whose
    /// issues may be discarded.
    pub fn fork(&self, value: Value) -> Self {
        Self {
            value,
            path: self.path.clone(),
            issues: Vec::new(),
        }
    }

    /// Append an issue. Its relative path is prefixed with the current
    /// path stack.
    pub fn add_issue(&mut self, mut issue: RawIssue) {
        if self.path.is_empty() {
            self.issues.push(issue);
            return;
        }
        let mut absolute = self.path.clone();
        absolute.append(&mut issue.path);
        issue.path = absolute;
        self.issues.push(issue);
    }

    /// Append an issue whose path is already absolute.
    pub fn add_issue_with_path(&mut self, mut issue: RawIssue, path: Vec<PathSegment>) {
        issue.path = path;
        self.issues.push(issue);
    }

    /// Append issues produced by a forked payload; their paths are
    /// already absolute.
    pub fn absorb(&mut self, issues: Vec<RawIssue>) {
        self.issues.extend(issues);
    }

    pub fn push_path(&mut self, segment: impl Into<PathSegment>) {
        self.path.push(segment.into());
    }

    pub fn pop_path(&mut self) -> Option<PathSegment> {
        self.path.pop()
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn issues(&self) -> &[RawIssue] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether any issue recorded at or after `mark` aborts the node.
    pub fn aborted_since(&self, mark: usize) -> bool {
        self.issues
            .get(mark..)
            .is_some_and(|tail| tail.iter().any(|i| !i.continuable))
    }

    /// Issues recorded at or after `mark`, for annotation.
    pub fn issues_since_mut(&mut self, mark: usize) -> &mut [RawIssue] {
        let start = mark.min(self.issues.len());
        &mut self.issues[start..]
    }

    /// Drop every issue recorded at or after `mark`.
    pub fn truncate_issues(&mut self, mark: usize) {
        self.issues.truncate(mark);
    }

    /// Move the value out, leaving `Nil` behind.
    pub fn take_value(&mut self) -> Value {
        std::mem::take(&mut self.value)
    }

    /// Take all issues, leaving the list empty.
    pub fn take_issues(&mut self) -> Vec<RawIssue> {
        std::mem::take(&mut self.issues)
    }

    /// Decompose into the final value and the accumulated issues.
    pub fn into_parts(self) -> (Value, Vec<RawIssue>) {
        (self.value, self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueCode;

    #[test]
    fn test_add_issue_prefixes_current_path() {
        let mut payload = Payload::new("x");
        payload.push_path("items");
        payload.push_path(2usize);
        payload.add_issue(RawIssue::custom(None, Value::Nil).with_path(vec!["name".into()]));
        payload.pop_path();
        payload.pop_path();
        assert_eq!(
            payload.issues()[0].path,
            vec![
                PathSegment::from("items"),
                PathSegment::Index(2),
                PathSegment::from("name")
            ]
        );
    }

    #[test]
    fn test_add_issue_with_explicit_path() {
        let mut payload = Payload::new(1);
        payload.push_path("ignored");
        payload.add_issue_with_path(
            RawIssue::new(IssueCode::Custom, Value::Nil),
            vec!["a".into()],
        );
        assert_eq!(payload.issues()[0].path, vec![PathSegment::from("a")]);
    }

    #[test]
    fn test_aborted_since_only_looks_at_tail() {
        let mut payload = Payload::new(1);
        payload.add_issue(RawIssue::invalid_type("string", Value::Int(1)));
        let mark = payload.issue_count();
        payload.add_issue(RawIssue::custom(None, Value::Nil));
        assert!(payload.aborted_since(0));
        assert!(!payload.aborted_since(mark));
        payload.truncate_issues(mark);
        assert_eq!(payload.issue_count(), 1);
    }

    #[test]
    fn test_fork_shares_path_not_issues() {
        let mut payload = Payload::new(1);
        payload.push_path("a");
        payload.add_issue(RawIssue::custom(None, Value::Nil));
        let fork = payload.fork(Value::Int(2));
        assert_eq!(fork.path(), payload.path());
        assert!(!fork.has_issues());
    }
}
