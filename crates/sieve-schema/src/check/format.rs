//! String format checks.
//!
//! Each [`StringFormat`] names a validator from [`crate::formats`]. The
//! check records the format name in the bag and, for regex-backed
//! formats, the canonical pattern.
//!
//! ISO bounds ([`iso_min`], [`iso_max`]) compare ISO strings
//! lexicographically. That ordering is only chronological when both
//! sides use the same offset convention, so a value whose offset style
//! differs from the bound's is rejected outright.

use std::collections::BTreeMap;

use sieve_core::{Payload, RawIssue, Value};

use super::string::string_check;
use super::{Check, Params};
use crate::formats::{self, IsoDateTimeOptions, TimePrecision};
use crate::schema::TypeCode;

#[derive(Debug, Clone, PartialEq)]
pub enum StringFormat {
    Email,
    /// Optionally pinned to one UUID version.
    Uuid(Option<u8>),
    Url,
    Ipv4,
    Ipv6,
    Cidrv4,
    Cidrv6,
    Hostname,
    Mac,
    E164,
    Base64,
    IsoDate,
    IsoTime(Option<TimePrecision>),
    IsoDateTime(IsoDateTimeOptions),
    IsoDuration,
}

impl StringFormat {
    /// Name recorded in the bag and in `invalid_format` issues.
    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uuid(_) => "uuid",
            StringFormat::Url => "url",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::Cidrv4 => "cidrv4",
            StringFormat::Cidrv6 => "cidrv6",
            StringFormat::Hostname => "hostname",
            StringFormat::Mac => "mac",
            StringFormat::E164 => "e164",
            StringFormat::Base64 => "base64",
            StringFormat::IsoDate => "iso_date",
            StringFormat::IsoTime(_) => "iso_time",
            StringFormat::IsoDateTime(_) => "iso_datetime",
            StringFormat::IsoDuration => "iso_duration",
        }
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            StringFormat::Email => TypeCode::Email,
            StringFormat::Uuid(_) => TypeCode::Uuid,
            StringFormat::Url => TypeCode::Url,
            StringFormat::Ipv4 => TypeCode::Ipv4,
            StringFormat::Ipv6 => TypeCode::Ipv6,
            StringFormat::Cidrv4 => TypeCode::Cidrv4,
            StringFormat::Cidrv6 => TypeCode::Cidrv6,
            StringFormat::Hostname => TypeCode::Hostname,
            StringFormat::Mac => TypeCode::Mac,
            StringFormat::E164 => TypeCode::E164,
            StringFormat::Base64 => TypeCode::Base64,
            StringFormat::IsoDate => TypeCode::IsoDate,
            StringFormat::IsoTime(_) => TypeCode::IsoTime,
            StringFormat::IsoDateTime(_) => TypeCode::IsoDateTime,
            StringFormat::IsoDuration => TypeCode::IsoDuration,
        }
    }

    /// Canonical pattern, for formats that have one.
    pub fn pattern(&self) -> Option<String> {
        let fixed = match self {
            StringFormat::Email => formats::EMAIL,
            StringFormat::Uuid(_) => formats::UUID,
            StringFormat::Ipv4 => formats::IPV4,
            StringFormat::Cidrv4 => formats::CIDRV4,
            StringFormat::Hostname => formats::HOSTNAME,
            StringFormat::Mac => formats::MAC,
            StringFormat::E164 => formats::E164,
            StringFormat::Base64 => formats::BASE64,
            StringFormat::IsoDuration => formats::ISO_DURATION,
            StringFormat::IsoDate => return Some(formats::iso_date_pattern()),
            StringFormat::IsoTime(precision) => return Some(formats::iso_time_pattern(*precision)),
            StringFormat::IsoDateTime(options) => {
                return Some(formats::iso_datetime_pattern(options))
            }
            StringFormat::Url | StringFormat::Ipv6 | StringFormat::Cidrv6 => return None,
        };
        Some(fixed.to_string())
    }

    pub fn test(&self, input: &str) -> bool {
        match self {
            StringFormat::Email => formats::is_email(input),
            StringFormat::Uuid(version) => formats::is_uuid(input, *version),
            StringFormat::Url => formats::is_url(input),
            StringFormat::Ipv4 => formats::is_ipv4(input),
            StringFormat::Ipv6 => formats::is_ipv6(input),
            StringFormat::Cidrv4 => formats::is_cidrv4(input),
            StringFormat::Cidrv6 => formats::is_cidrv6(input),
            StringFormat::Hostname => formats::is_hostname(input),
            StringFormat::Mac => formats::is_mac(input),
            StringFormat::E164 => formats::is_e164(input),
            StringFormat::Base64 => formats::is_base64(input),
            StringFormat::IsoDate => formats::is_iso_date(input),
            StringFormat::IsoTime(precision) => formats::is_iso_time(input, *precision),
            StringFormat::IsoDateTime(options) => formats::is_iso_datetime(input, options),
            StringFormat::IsoDuration => formats::is_iso_duration(input),
        }
    }
}

/// Check that a string satisfies `format`.
pub fn format(format: StringFormat, params: impl Into<Params>) -> Check {
    let name = format.name();
    let pattern = format.pattern();
    let extras = pattern
        .as_ref()
        .map(|p| BTreeMap::from([("pattern".to_string(), Value::from(p.as_str()))]))
        .unwrap_or_default();
    let is_base64 = matches!(format, StringFormat::Base64);
    string_check(name, name, extras, pattern, move |s| format.test(s), params).on_attach(
        move |ctx| {
            ctx.bag.set_format(name);
            if is_base64 {
                ctx.bag.set_content_encoding("base64");
            }
        },
    )
}

pub fn email(params: impl Into<Params>) -> Check {
    format(StringFormat::Email, params)
}

pub fn uuid(params: impl Into<Params>) -> Check {
    format(StringFormat::Uuid(None), params)
}

pub fn url(params: impl Into<Params>) -> Check {
    format(StringFormat::Url, params)
}

pub fn ipv4(params: impl Into<Params>) -> Check {
    format(StringFormat::Ipv4, params)
}

pub fn ipv6(params: impl Into<Params>) -> Check {
    format(StringFormat::Ipv6, params)
}

pub fn iso_date(params: impl Into<Params>) -> Check {
    format(StringFormat::IsoDate, params)
}

pub fn iso_time(precision: Option<TimePrecision>, params: impl Into<Params>) -> Check {
    format(StringFormat::IsoTime(precision), params)
}

pub fn iso_datetime(options: IsoDateTimeOptions, params: impl Into<Params>) -> Check {
    format(StringFormat::IsoDateTime(options), params)
}

pub fn iso_duration(params: impl Into<Params>) -> Check {
    format(StringFormat::IsoDuration, params)
}

fn iso_bound(name: &'static str, bound: String, lower: bool, params: impl Into<Params>) -> Check {
    let params = params.into().normalize();
    let bag_bound = bound.clone();
    let bound_has_offset = formats::has_offset(&bound);
    Check::new(name, move |p: &mut Payload| {
        let Value::String(s) = &p.value else {
            return;
        };
        if formats::has_offset(s) != bound_has_offset {
            let input = p.value.clone();
            let extras = BTreeMap::from([("bound".to_string(), Value::from(bound.as_str()))]);
            p.add_issue(RawIssue::invalid_format("iso_offset", input, extras));
            return;
        }
        let violated = if lower {
            s.as_str() < bound.as_str()
        } else {
            s.as_str() > bound.as_str()
        };
        if violated {
            let input = p.value.clone();
            let issue = if lower {
                RawIssue::too_small(bound.as_str(), true, "date", input)
            } else {
                RawIssue::too_big(bound.as_str(), true, "date", input)
            };
            p.add_issue(issue);
        }
    })
    .with_params(&params)
    .on_attach(move |ctx| {
        let value = serde_json::Value::from(bag_bound.as_str());
        if lower {
            ctx.bag.merge_minimum(value, true);
        } else {
            ctx.bag.merge_maximum(value, true);
        }
    })
}

/// ISO string at or after `bound`.
pub fn iso_min(bound: impl Into<String>, params: impl Into<Params>) -> Check {
    iso_bound("iso_min", bound.into(), true, params)
}

/// ISO string at or before `bound`.
pub fn iso_max(bound: impl Into<String>, params: impl Into<Params>) -> Check {
    iso_bound("iso_max", bound.into(), false, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{run_checks, AttachContext};
    use sieve_core::{Bag, IssueCode};

    fn run(check: Check, value: &str) -> Vec<RawIssue> {
        let mut payload = Payload::new(value);
        run_checks(&[check], &mut payload, 0, None);
        payload.take_issues()
    }

    #[test]
    fn test_email_check_and_bag() {
        assert!(run(email(()), "ada@example.com").is_empty());
        let issues = run(email(()), "nope");
        assert_eq!(issues[0].property("format"), Some(&Value::from("email")));
        let mut bag = Bag::new();
        let mut ctx = AttachContext::new(TypeCode::String, &mut bag);
        email(()).attach(&mut ctx);
        assert_eq!(bag.format(), Some("email"));
        assert_eq!(bag.patterns(), vec![formats::EMAIL]);
    }

    #[test]
    fn test_url_has_no_pattern() {
        let mut bag = Bag::new();
        let mut ctx = AttachContext::new(TypeCode::String, &mut bag);
        url(()).attach(&mut ctx);
        assert_eq!(bag.format(), Some("url"));
        assert!(bag.patterns().is_empty());
    }

    #[test]
    fn test_base64_sets_content_encoding() {
        let mut bag = Bag::new();
        let mut ctx = AttachContext::new(TypeCode::String, &mut bag);
        format(StringFormat::Base64, ()).attach(&mut ctx);
        assert_eq!(bag.get("contentEncoding"), Some(&serde_json::json!("base64")));
    }

    #[test]
    fn test_iso_bounds_compare_lexicographically() {
        assert!(run(iso_min("2024-01-01", ()), "2024-06-30").is_empty());
        assert_eq!(run(iso_min("2024-01-01", ()), "2023-12-31")[0].code, IssueCode::TooSmall);
        assert_eq!(run(iso_max("2024-01-01", ()), "2024-01-02")[0].code, IssueCode::TooBig);
    }

    #[test]
    fn test_iso_bounds_reject_offset_mixing() {
        let issues = run(iso_min("2024-01-01T00:00:00Z", ()), "2024-06-01T00:00:00+02:00");
        assert_eq!(issues[0].code, IssueCode::InvalidFormat);
        assert_eq!(issues[0].property("format"), Some(&Value::from("iso_offset")));
    }
}
