//! The process-wide error map. Kept in its own test binary because the
//! configuration is global state shared by every test in a binary.

use sieve_core::config;
use sieve_schema::{ErrorMap, IssueCode, ParseOptions, Schema};

#[test]
fn test_global_error_map_priority() {
    config::set_error_map(ErrorMap::new(|issue| {
        (issue.code == IssueCode::InvalidType).then(|| "global: wrong type".to_string())
    }));

    let err = Schema::bool().parse_any("yes").unwrap_err();
    assert_eq!(err.issues()[0].message, "global: wrong type");

    // Codes the global map declines fall back to built-in messages.
    let err = Schema::string().min(5).parse_any("abc").unwrap_err();
    assert_ne!(err.issues()[0].message, "global: wrong type");

    // Per-parse maps win over the global map.
    let options = ParseOptions {
        error_map: Some(ErrorMap::constant("per parse")),
        ..ParseOptions::default()
    };
    let err = Schema::bool().parse_any_with("yes", &options).unwrap_err();
    assert_eq!(err.issues()[0].message, "per parse");

    // Schema-level maps win over both.
    let err = Schema::bool()
        .error("schema level")
        .parse_any_with("yes", &options)
        .unwrap_err();
    assert_eq!(err.issues()[0].message, "schema level");

    config::reset();
    let err = Schema::bool().parse_any("yes").unwrap_err();
    assert_ne!(err.issues()[0].message, "global: wrong type");
}
