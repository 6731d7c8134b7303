//! # String Format Validators
//!
//! Concrete validators behind the format checks. Each regex-backed format
//! exposes its canonical pattern source so the format check can record it
//! in the bag; the same source is what the JSON Schema emitter renders,
//! keeping emitted documents and runtime validation in agreement.
//!
//! Patterns avoid look-around so that they compile under both the `regex`
//! crate and ECMA-262 engines used by external validators.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

pub const EMAIL: &str =
    r"^[A-Za-z0-9_'+\-\.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$";
pub const UUID: &str = r"^(?:[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-8][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}|00000000-0000-0000-0000-000000000000|ffffffff-ffff-ffff-ffff-ffffffffffff)$";
pub const IPV4: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])$";
pub const CIDRV4: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])/(?:[0-9]|[1-2][0-9]|3[0-2])$";
pub const HOSTNAME: &str = r"^[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*\.?$";
pub const MAC: &str = r"^(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$";
pub const E164: &str = r"^\+[1-9][0-9]{6,14}$";
pub const BASE64: &str =
    r"^(?:[0-9a-zA-Z+/]{4})*(?:[0-9a-zA-Z+/]{2}==|[0-9a-zA-Z+/]{3}=)?$";
pub const ISO_DURATION: &str = r"^P(?:[0-9]+W|(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+(?:[.,][0-9]+)?S)?)?)$";

const DATE_SOURCE: &str = r"[0-9]{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])";
const HHMM: &str = r"(?:[01][0-9]|2[0-3]):[0-5][0-9]";
const OFFSET: &str = r"[+-](?:[01][0-9]|2[0-3]):[0-5][0-9]";

/// Sub-minute precision accepted by ISO time and datetime formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    /// `HH:MM`
    Minute,
    /// `HH:MM:SS`
    Second,
    /// `HH:MM:SS.f…` with exactly this many fractional digits.
    Fraction(u8),
}

/// Which suffixes an ISO datetime may carry. `Z` is always accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IsoDateTimeOptions {
    /// `None` accepts any precision, including omitted seconds.
    pub precision: Option<TimePrecision>,
    /// Accept `±HH:MM` offsets.
    pub offset: bool,
    /// Accept datetimes with no suffix at all.
    pub local: bool,
}

fn cached(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

fn matches(cell: &'static OnceLock<Option<Regex>>, source: &str, input: &str) -> bool {
    cached(cell, source).is_some_and(|re| re.is_match(input))
}

pub fn is_email(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, EMAIL, input)
}

/// RFC 9562 UUID, optionally restricted to one version.
pub fn is_uuid(input: &str, version: Option<u8>) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    if !matches(&RE, UUID, input) {
        return false;
    }
    match version {
        None => true,
        Some(v) => uuid::Uuid::parse_str(input)
            .map(|id| id.get_version_num() == usize::from(v))
            .unwrap_or(false),
    }
}

/// Absolute URL with a host.
pub fn is_url(input: &str) -> bool {
    url::Url::parse(input).is_ok_and(|u| u.has_host())
}

pub fn is_ipv4(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, IPV4, input) && Ipv4Addr::from_str(input).is_ok()
}

pub fn is_ipv6(input: &str) -> bool {
    Ipv6Addr::from_str(input).is_ok()
}

pub fn is_cidrv4(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, CIDRV4, input)
}

pub fn is_cidrv6(input: &str) -> bool {
    let Some((addr, prefix)) = input.split_once('/') else {
        return false;
    };
    Ipv6Addr::from_str(addr).is_ok()
        && !prefix.starts_with('+')
        && prefix.parse::<u8>().is_ok_and(|p| p <= 128)
}

pub fn is_hostname(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    input.len() <= 253 && matches(&RE, HOSTNAME, input)
}

pub fn is_mac(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, MAC, input)
}

pub fn is_e164(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, E164, input)
}

pub fn is_base64(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&RE, BASE64, input)
}

/// Canonical `YYYY-MM-DD` pattern.
pub fn iso_date_pattern() -> String {
    format!("^{DATE_SOURCE}$")
}

/// Calendar date, with day-of-month validated against the month.
pub fn is_iso_date(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    static SOURCE: OnceLock<String> = OnceLock::new();
    let source = SOURCE.get_or_init(iso_date_pattern);
    matches(&RE, source, input) && NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok()
}

fn time_source(precision: Option<TimePrecision>) -> String {
    match precision {
        None => format!(r"{HHMM}(?::[0-5][0-9](?:\.[0-9]+)?)?"),
        Some(TimePrecision::Minute) => HHMM.to_string(),
        Some(TimePrecision::Second) => format!(r"{HHMM}:[0-5][0-9]"),
        Some(TimePrecision::Fraction(digits)) => format!(r"{HHMM}:[0-5][0-9]\.[0-9]{{{digits}}}"),
    }
}

/// Canonical `HH:MM[:SS[.f]]` pattern for a precision.
pub fn iso_time_pattern(precision: Option<TimePrecision>) -> String {
    format!("^{}$", time_source(precision))
}

/// Canonical datetime pattern for a set of options.
pub fn iso_datetime_pattern(options: &IsoDateTimeOptions) -> String {
    let mut suffixes = vec!["Z".to_string()];
    if options.local {
        suffixes.push(String::new());
    }
    if options.offset {
        suffixes.push(OFFSET.to_string());
    }
    format!(
        "^{DATE_SOURCE}T(?:{}(?:{}))$",
        time_source(options.precision),
        suffixes.join("|")
    )
}

pub fn is_iso_time(input: &str, precision: Option<TimePrecision>) -> bool {
    Regex::new(&iso_time_pattern(precision)).is_ok_and(|re| re.is_match(input))
}

/// ISO 8601 datetime per `options`. The date component is validated
/// against the calendar.
pub fn is_iso_datetime(input: &str, options: &IsoDateTimeOptions) -> bool {
    let Ok(re) = Regex::new(&iso_datetime_pattern(options)) else {
        return false;
    };
    re.is_match(input)
        && input
            .get(..10)
            .is_some_and(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

/// ISO 8601 duration. At least one component must be present, and a `T`
/// must be followed by a time component.
pub fn is_iso_duration(input: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    input != "P" && !input.ends_with('T') && matches(&RE, ISO_DURATION, input)
}

/// Whether a datetime string carries an explicit `±HH:MM` offset rather
/// than `Z` or no suffix.
pub fn has_offset(input: &str) -> bool {
    match input.split_once('T') {
        Some((_, time)) => time.contains('+') || time.contains('-'),
        None => false,
    }
}
