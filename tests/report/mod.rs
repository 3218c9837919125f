// SPDX-License-Identifier: Apache-2.0

//! Failure paths, summary formatting and the exported wire shape.
//!

use crate::utils::{check, fails};
use deep_match::prelude::*;

#[test]
fn test_failure_paths() {
    let r = fails(
        MatchType::Equals,
        r#"{ "orders": [ { "lineItems": [ { "price": 10 } ] }, { "lineItems": [ { "price": 20 } ] } ] }"#,
        r#"{ "orders": [ { "lineItems": [ { "price": 10 } ] }, { "lineItems": [ { "price": 99 } ] } ] }"#,
    );
    assert!(
        r.failures
            .iter()
            .any(|f| f.path == "$.orders[1].lineItems[0].price"),
        "paths: {:?}",
        r.failures.iter().map(|f| &f.path).collect::<Vec<_>>()
    );
}

#[test]
fn test_bracketed_path_for_awkward_keys() {
    let r = fails(
        MatchType::Equals,
        r#"{ "content-type": "a" }"#,
        r#"{ "content-type": "b" }"#,
    );
    assert!(r.failures.iter().any(|f| f.path == "$['content-type']"));
}

#[test]
fn test_xml_failure_paths() {
    let r = fails(
        MatchType::Equals,
        "<cat><name>Billie</name></cat>",
        "<cat><name>Bob</name></cat>",
    );
    assert!(
        r.failures.iter().any(|f| f.path == "/cat/name"),
        "paths: {:?}",
        r.failures.iter().map(|f| &f.path).collect::<Vec<_>>()
    );
}

#[test]
fn test_failure_fields() {
    let r = fails(MatchType::Equals, r#"{ "a": 1 }"#, r#"{ "a": "x" }"#);
    let f = r
        .failures
        .iter()
        .find(|f| f.path == "$.a")
        .expect("leaf failure");
    assert_eq!(f.reason, "data types don't match");
    assert_eq!(f.actual_kind, Kind::Number);
    assert_eq!(f.expected_kind, Kind::String);
    assert_eq!(f.depth, 1);
}

#[test]
fn test_summary_structure() {
    let r = fails(
        MatchType::Equals,
        r#"{ "a": { "b": 1 } }"#,
        r#"{ "a": { "b": 2 } }"#,
    );
    let message = r.message.clone().unwrap();
    assert!(message.starts_with("match failed: EQUALS"));
    // blocks walk the recursion from the root down, indent tracking depth...
    let root = message.find("\n$ |").unwrap();
    let mid = message.find("\n  $.a |").unwrap();
    let leaf = message.find("\n    $.a.b |").unwrap();
    assert!(root < mid && mid < leaf, "summary:\n{message}");
    // the leaf block carries kinds and both renderings...
    assert!(message.contains("not equal (NUMBER:NUMBER)"));
}

#[test]
fn test_summary_expected_is_sorted_like_actual() {
    let r = fails(
        MatchType::Equals,
        r#"{ "a": 1, "b": 2 }"#,
        r#"{ "b": 2, "a": 9 }"#,
    );
    let message = r.message.unwrap();
    // the expected map is re-keyed to the actual's order for readability...
    assert!(
        message.contains(r#"{"a":9,"b":2}"#),
        "summary:\n{message}"
    );
}

#[test]
fn test_pass_produces_no_failures() {
    let r = check(MatchType::Contains, "[1, 2, 3]", "[3]");
    assert!(r.pass);
    assert!(r.message.is_none());
    assert!(r.failures.is_empty());
    assert!(r.as_json().get("failures").is_none());
}

#[test]
fn test_wire_shape() {
    let r = fails(MatchType::Equals, "{\"a\": 1}", "{\"a\": 2}");
    let json = r.as_json();
    assert_eq!(json["pass"], serde_json::json!(false));
    assert!(json["message"].as_str().unwrap().starts_with("match failed"));
    let failure = &json["failures"][0];
    for field in [
        "path",
        "reason",
        "actualType",
        "expectedType",
        "actualValue",
        "expectedValue",
        "depth",
    ] {
        assert!(!failure[field].is_null() || field == "actualValue", "missing {field}");
    }
}

#[test]
fn test_pre_order_failure_collection() {
    // two sibling mismatches arrive in document order...
    let r = fails(
        MatchType::Equals,
        r#"{ "a": 1, "b": 2 }"#,
        r#"{ "a": 9, "b": 8 }"#,
    );
    let paths: Vec<&str> = r.failures.iter().map(|f| f.path.as_str()).collect();
    let a = paths.iter().position(|p| *p == "$.a").unwrap();
    let b = paths.iter().position(|p| *p == "$.b").unwrap();
    assert!(a < b);
}
