//! File checks. Sizes and MIME types are read from the [`FileInfo`]
//! header carried by `Value::File`; other values pass through.

use std::collections::BTreeMap;

use sieve_core::{FileInfo, Payload, RawIssue, Value};

use super::{Check, Params};

fn file_size_check(
    name: &'static str,
    min: Option<u64>,
    max: Option<u64>,
    params: impl Into<Params>,
) -> Check {
    let params = params.into().normalize();
    Check::new(name, move |p: &mut Payload| {
        let Value::File(FileInfo { size, .. }) = &p.value else {
            return;
        };
        let size = *size;
        let input = p.value.clone();
        let exact = min.is_some() && min == max;
        if let Some(min) = min.filter(|m| size < *m) {
            let issue = RawIssue::too_small(min, true, "file", input);
            p.add_issue(if exact { issue.with_property("exact", true) } else { issue });
        } else if let Some(max) = max.filter(|m| size > *m) {
            let issue = RawIssue::too_big(max, true, "file", input);
            p.add_issue(if exact { issue.with_property("exact", true) } else { issue });
        }
    })
    .with_params(&params)
    .on_attach(move |ctx| {
        if let Some(min) = min {
            ctx.bag.merge_min_size(min);
        }
        if let Some(max) = max {
            ctx.bag.merge_max_size(max);
        }
    })
}

pub fn min_file_size(bytes: u64, params: impl Into<Params>) -> Check {
    file_size_check("min_file_size", Some(bytes), None, params)
}

pub fn max_file_size(bytes: u64, params: impl Into<Params>) -> Check {
    file_size_check("max_file_size", None, Some(bytes), params)
}

/// Exact file size.
pub fn file_size(bytes: u64, params: impl Into<Params>) -> Check {
    file_size_check("file_size", Some(bytes), Some(bytes), params)
}

/// File MIME type is one of `types`.
pub fn mime<I, S>(types: I, params: impl Into<Params>) -> Check
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let types: Vec<String> = types.into_iter().map(Into::into).collect();
    let params = params.into().normalize();
    let allowed = types.clone();
    Check::new("mime", move |p: &mut Payload| {
        let Value::File(file) = &p.value else {
            return;
        };
        if allowed.iter().any(|m| *m == file.mime) {
            return;
        }
        let input = p.value.clone();
        let extras = BTreeMap::from([(
            "mime".to_string(),
            Value::Array(allowed.iter().map(|m| Value::from(m.as_str())).collect()),
        )]);
        p.add_issue(RawIssue::invalid_format("mime", input, extras));
    })
    .with_params(&params)
    .on_attach(move |ctx| ctx.bag.push_mime(&types))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{run_checks, AttachContext};
    use crate::schema::TypeCode;
    use sieve_core::{Bag, IssueCode};

    fn png(size: u64) -> FileInfo {
        FileInfo::new("logo.png", size, "image/png")
    }

    fn run(check: Check, value: impl Into<Value>) -> Vec<RawIssue> {
        let mut payload = Payload::new(value);
        run_checks(&[check], &mut payload, 0, None);
        payload.take_issues()
    }

    #[test]
    fn test_file_size_bounds() {
        assert!(run(min_file_size(10, ()), png(10)).is_empty());
        assert_eq!(run(min_file_size(10, ()), png(9))[0].code, IssueCode::TooSmall);
        assert_eq!(run(max_file_size(10, ()), png(11))[0].code, IssueCode::TooBig);
        let exact = run(file_size(10, ()), png(12));
        assert_eq!(exact[0].property("exact"), Some(&Value::Bool(true)));
        assert!(run(max_file_size(1, ()), "not a file").is_empty());
    }

    #[test]
    fn test_mime() {
        assert!(run(mime(["image/png", "image/jpeg"], ()), png(1)).is_empty());
        let issues = run(mime(["application/pdf"], ()), png(1));
        assert_eq!(issues[0].property("format"), Some(&Value::from("mime")));
    }

    #[test]
    fn test_bag_effects() {
        let mut bag = Bag::new();
        let mut ctx = AttachContext::new(TypeCode::File, &mut bag);
        file_size(64, ()).attach(&mut ctx);
        mime(["image/png"], ()).attach(&mut ctx);
        assert_eq!(bag.get("minSize"), Some(&serde_json::json!(64)));
        assert_eq!(bag.get("maxSize"), Some(&serde_json::json!(64)));
        assert_eq!(bag.mime(), vec!["image/png"]);
    }
}
