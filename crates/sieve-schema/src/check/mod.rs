//! # Check Pipeline
//!
//! A [`Check`] is one unit of validation attached to a schema. Its
//! [`CheckInternals`] carry:
//!
//! - a definition (`name`, optional error map, `abort` flag),
//! - the body, which inspects or rewrites the [`Payload`],
//! - an optional `when` guard,
//! - `on_attach` callbacks that annotate the host schema's [`Bag`] (and,
//!   for metadata checks, its registry entry) when the check is attached.
//!
//! ## Execution
//!
//! Checks run in attachment order. A check without a guard is skipped
//! once the node has recorded a non-continuable issue; a check with a
//! guard runs whenever the guard returns `true`. An `abort` check that
//! reports an issue marks it non-continuable and halts the chain.
//!
//! ## Check Kinds
//!
//! | Module | Checks |
//! |---|---|
//! | [`numeric`] | `lt`, `lte`, `gt`, `gte`, `multiple_of`, sign helpers, `finite` |
//! | [`length`] | `length`, `min_length`, `max_length`, `size`, `min_size`, `max_size` |
//! | [`string`] | `regex`, `includes`, `starts_with`, `ends_with`, case checks, trims |
//! | [`format`] | `email`, `uuid`, `url`, IP and CIDR families, ISO date/time |
//! | [`file`] | `min_file_size`, `max_file_size`, `file_size`, `mime` |
//! | [`custom`] | `custom`, `refine`, `super_refine`, `overwrite`, `property`, `describe`, `meta` |

pub mod custom;
pub mod file;
pub mod format;
pub mod length;
pub mod numeric;
pub mod params;
pub mod string;

use std::fmt;
use std::sync::Arc;

use sieve_core::{Bag, ErrorMap, IssueSource, Payload};
use tracing::trace;

use crate::registry::{Meta, Registry};
use crate::schema::TypeCode;

pub use params::{CheckParams, CustomParams, Params};

/// Check body.
pub type CheckFn = dyn Fn(&mut Payload) + Send + Sync;
/// Guard deciding whether a check runs.
pub type WhenFn = dyn Fn(&Payload) -> bool + Send + Sync;
/// Callback fired once per attachment.
pub type AttachFn = dyn Fn(&mut AttachContext<'_>) + Send + Sync;

/// Static description of a check.
#[derive(Debug, Clone)]
pub struct CheckDef {
    pub name: String,
    pub error: Option<ErrorMap>,
    pub abort: bool,
}

#[derive(Clone)]
pub struct CheckInternals {
    pub def: CheckDef,
    pub check: Arc<CheckFn>,
    pub when: Option<Arc<WhenFn>>,
    pub on_attach: Vec<Arc<AttachFn>>,
}

/// What an `on_attach` callback may touch on the host schema.
pub struct AttachContext<'a> {
    /// Type code of the host schema.
    pub type_code: TypeCode,
    pub bag: &'a mut Bag,
    registrations: Vec<(Registry, Meta)>,
}

impl<'a> AttachContext<'a> {
    pub(crate) fn new(type_code: TypeCode, bag: &'a mut Bag) -> Self {
        Self {
            type_code,
            bag,
            registrations: Vec::new(),
        }
    }

    /// Merge `meta` into the host schema's entry in `registry`. Applied
    /// once the host schema exists.
    pub fn register(&mut self, registry: &Registry, meta: Meta) {
        self.registrations.push((registry.clone(), meta));
    }

    pub(crate) fn into_registrations(self) -> Vec<(Registry, Meta)> {
        self.registrations
    }
}

/// A shareable, immutable check. Builder methods return modified copies.
#[derive(Clone)]
pub struct Check(Arc<CheckInternals>);

impl Check {
    pub fn new(name: impl Into<String>, body: impl Fn(&mut Payload) + Send + Sync + 'static) -> Self {
        Self(Arc::new(CheckInternals {
            def: CheckDef {
                name: name.into(),
                error: None,
                abort: false,
            },
            check: Arc::new(body),
            when: None,
            on_attach: Vec::new(),
        }))
    }

    pub fn internals(&self) -> &CheckInternals {
        &self.0
    }

    pub fn name(&self) -> &str {
        &self.0.def.name
    }

    fn edit(mut self, f: impl FnOnce(&mut CheckInternals)) -> Self {
        f(Arc::make_mut(&mut self.0));
        self
    }

    pub fn with_error(self, error: impl Into<ErrorMap>) -> Self {
        let error = error.into();
        self.edit(|c| c.def.error = Some(error))
    }

    pub fn with_abort(self, abort: bool) -> Self {
        self.edit(|c| c.def.abort = abort)
    }

    pub fn with_when(self, when: Arc<WhenFn>) -> Self {
        self.edit(|c| c.when = Some(when))
    }

    pub fn on_attach(self, callback: impl Fn(&mut AttachContext<'_>) + Send + Sync + 'static) -> Self {
        self.edit(|c| c.on_attach.push(Arc::new(callback)))
    }

    /// Apply normalized parameters: error map, abort flag, guard.
    pub fn with_params(self, params: &CustomParams) -> Self {
        let error = params.error.clone();
        let abort = params.abort;
        let when = params.when.clone();
        self.edit(|c| {
            if error.is_some() {
                c.def.error = error;
            }
            c.def.abort |= abort;
            if when.is_some() {
                c.when = when;
            }
        })
    }

    /// Fire every `on_attach` callback against a host schema.
    pub(crate) fn attach(&self, ctx: &mut AttachContext<'_>) {
        for callback in &self.0.on_attach {
            callback(ctx);
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.0.def.name)
            .field("abort", &self.0.def.abort)
            .field("when", &self.0.when.is_some())
            .finish()
    }
}

/// Run `checks` in order against the payload.
///
/// `mark` is the issue count at node entry; issues before it belong to
/// other nodes and never influence skipping. Issues a check produces are
/// attributed to it, falling back to `schema_error` for message lookup.
pub(crate) fn run_checks(
    checks: &[Check],
    payload: &mut Payload,
    mark: usize,
    schema_error: Option<&ErrorMap>,
) {
    for check in checks {
        let internals = check.internals();
        match &internals.when {
            Some(when) => {
                if !when(payload) {
                    trace!(check = %internals.def.name, "check skipped by guard");
                    continue;
                }
            }
            None => {
                if payload.aborted_since(mark) {
                    trace!(check = %internals.def.name, "check skipped after abort");
                    continue;
                }
            }
        }

        let before = payload.issue_count();
        (internals.check)(payload);
        if payload.issue_count() == before {
            continue;
        }

        let error = internals.def.error.clone().or_else(|| schema_error.cloned());
        for issue in payload.issues_since_mut(before) {
            if issue.inst.is_none() {
                issue.inst = Some(IssueSource::new(internals.def.name.clone(), error.clone()));
            }
            if internals.def.abort {
                issue.continuable = false;
            }
        }
        if internals.def.abort {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::{RawIssue, Value};

    fn failing(name: &str) -> Check {
        Check::new(name, |p: &mut Payload| {
            let input = p.value.clone();
            p.add_issue(RawIssue::custom(None, input));
        })
    }

    #[test]
    fn test_checks_run_in_order_and_accumulate() {
        let mut payload = Payload::new(1);
        run_checks(&[failing("a"), failing("b")], &mut payload, 0, None);
        let names: Vec<_> = payload
            .issues()
            .iter()
            .map(|i| i.inst.as_ref().map(|s| s.name.clone()).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_abort_halts_chain() {
        let mut payload = Payload::new(1);
        run_checks(
            &[failing("a").with_abort(true), failing("b")],
            &mut payload,
            0,
            None,
        );
        assert_eq!(payload.issue_count(), 1);
        assert!(!payload.issues()[0].continuable);
    }

    #[test]
    fn test_guarded_check_runs_after_abort() {
        let mut payload = Payload::new(1);
        payload.add_issue(RawIssue::invalid_type("string", Value::Int(1)));
        let guarded = failing("guarded").with_when(Arc::new(|_: &Payload| true));
        run_checks(&[failing("skipped"), guarded], &mut payload, 0, None);
        assert_eq!(payload.issue_count(), 2);
        assert_eq!(
            payload.issues()[1].inst.as_ref().map(|s| s.name.as_str()),
            Some("guarded")
        );
    }

    #[test]
    fn test_guard_false_skips() {
        let mut payload = Payload::new(1);
        let guarded = failing("guarded").with_when(Arc::new(|_: &Payload| false));
        run_checks(&[guarded], &mut payload, 0, None);
        assert!(!payload.has_issues());
    }

    #[test]
    fn test_issues_before_mark_do_not_skip() {
        let mut payload = Payload::new(1);
        payload.add_issue(RawIssue::invalid_type("string", Value::Int(1)));
        run_checks(&[failing("a")], &mut payload, 1, None);
        assert_eq!(payload.issue_count(), 2);
    }

    #[test]
    fn test_schema_error_is_fallback_source() {
        let mut payload = Payload::new(1);
        let schema_map = ErrorMap::constant("schema says no");
        run_checks(&[failing("a")], &mut payload, 0, Some(&schema_map));
        let source = payload.issues()[0].inst.as_ref().and_then(|s| s.error.clone());
        assert!(source.is_some());
    }
}
