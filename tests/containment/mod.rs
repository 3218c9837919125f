// SPDX-License-Identifier: Apache-2.0

//! The containment family and its tie-breaks.
//!

use crate::utils::{check, fails, fails_with, harness, passes};
use deep_match::prelude::*;

#[test]
fn test_list_contains_every_element_of_itself() {
    let xs = ["1", "\"two\"", "null", "{\"id\": 3}"];
    let actual = "[1, \"two\", null, {\"id\": 3}]";
    for x in xs {
        passes(MatchType::Contains, actual, &format!("[{x}]"));
    }
    passes(MatchType::Contains, actual, actual);
}

#[test]
fn test_list_contains() {
    harness(
        MatchType::Contains,
        &[
            ("[1, 2, 3]", "[2]", true),
            ("[1, 2, 3]", "[2, 1]", true),
            ("[1, 2, 3]", "[4]", false),
            ("[1, 2, 3]", "[1, 4]", false),
            // scalar expected is coerced to a singleton list...
            ("[1, 2, 3]", "3", true),
            ("[1, 2, 3]", "4", false),
        ],
    );
}

#[test]
fn test_map_contains_any_subset() {
    let actual = r#"{ "a": 1, "b": 2, "c": { "d": 3 } }"#;
    for subset in [
        "{}",
        "{\"a\": 1}",
        "{\"b\": 2, \"a\": 1}",
        "{\"c\": {\"d\": 3}}",
    ] {
        passes(MatchType::Contains, actual, subset);
    }
    fails(MatchType::Contains, actual, "{\"a\": 2}");
    fails_with(
        MatchType::Contains,
        actual,
        "{\"z\": 1}",
        "does not contain key",
    );
}

#[test]
fn test_contains_only() {
    harness(
        MatchType::ContainsOnly,
        &[
            ("[1, 2, 3]", "[3, 2, 1]", true),
            // duplicates need matching cardinality...
            ("[1, 1, 2]", "[1, 2]", false),
            ("[1, 2, 1]", "[1, 1, 2]", true),
            ("[1, 2]", "[1, 2, 3]", false),
        ],
    );
    fails_with(
        MatchType::ContainsOnly,
        "[1, 1, 2]",
        "[1, 2]",
        "actual array length is not equal to expected - 3:2",
    );
}

#[test]
fn test_contains_any() {
    harness(
        MatchType::ContainsAny,
        &[
            ("[1, 2, 3]", "[9, 2]", true),
            ("[1, 2, 3]", "[9, 8]", false),
            ("{\"a\": 1, \"b\": 2}", "{\"z\": 9, \"b\": 2}", true),
            ("{\"a\": 1, \"b\": 2}", "{\"z\": 9, \"y\": 8}", false),
        ],
    );
    fails_with(
        MatchType::ContainsAny,
        "{\"a\": 1}",
        "{\"z\": 9}",
        "no key-values matched",
    );
    fails_with(
        MatchType::ContainsAny,
        "[1]",
        "[2, 3]",
        "does not contain any",
    );
}

#[test]
fn test_contains_deep() {
    passes(
        MatchType::ContainsDeep,
        r#"[{ "id": 1, "meta": { "tags": ["x", "y"] } }, { "id": 2 }]"#,
        r#"[{ "meta": { "tags": ["x"] } }]"#,
    );
    fails(
        MatchType::ContainsDeep,
        r#"[{ "id": 1, "meta": { "tags": ["x", "y"] } }, { "id": 2 }]"#,
        r#"[{ "meta": { "tags": ["z"] } }]"#,
    );
    // plain CONTAINS stays shallow: nested maps compare by equality...
    fails(
        MatchType::Contains,
        r#"{ "meta": { "tags": ["x", "y"], "n": 1 } }"#,
        r#"{ "meta": { "tags": ["x", "y"] } }"#,
    );
    passes(
        MatchType::ContainsDeep,
        r#"{ "meta": { "tags": ["x", "y"], "n": 1 } }"#,
        r#"{ "meta": { "tags": ["x", "y"] } }"#,
    );
}

#[test]
fn test_contains_only_deep() {
    passes(
        MatchType::ContainsOnlyDeep,
        r#"[{ "a": 1, "b": 2 }, { "c": 3 }]"#,
        r#"[{ "c": 3 }, { "a": 1, "b": 2 }]"#,
    );
    fails(
        MatchType::ContainsOnlyDeep,
        r#"[{ "a": 1 }, { "c": 3 }]"#,
        r#"[{ "c": 3 }]"#,
    );
}

#[test]
fn test_not_contains() {
    passes(MatchType::NotContains, "[1, 2, 3]", "[4]");
    fails_with(
        MatchType::NotContains,
        "[1, 2, 3]",
        "[2]",
        "actual contains expected",
    );
    passes(MatchType::NotContains, "{\"a\": 1}", "{\"b\": 2}");
    fails(MatchType::NotContains, "{\"a\": 1}", "{\"a\": 1}");
}

#[test]
fn test_string_containment() {
    passes(MatchType::Contains, "\"hello world\"", "\"lo wo\"");
    fails_with(
        MatchType::Contains,
        "\"hello\"",
        "\"bye\"",
        "does not contain",
    );
    // WITHIN reverses the substring check...
    passes(MatchType::Within, "\"lo wo\"", "\"hello world\"");
    fails(MatchType::Within, "\"hello world\"", "\"lo wo\"");
}

#[test]
fn test_string_actual_against_xml_expected() {
    // expected XML serializes and the match degrades to substring...
    passes(
        MatchType::Contains,
        "\"prefix <cat><name>Billie</name></cat> suffix\"",
        "<cat><name>Billie</name></cat>",
    );
}

#[test]
fn test_within_lists() {
    harness(
        MatchType::Within,
        &[
            ("[1, 2]", "[3, 2, 1]", true),
            ("[1, 4]", "[3, 2, 1]", false),
            ("[]", "[1]", true),
            // actual must not out-number expected...
            ("[1, 1, 2, 3]", "[1, 2, 3]", false),
            // a scalar actual is coerced to a singleton list...
            ("2", "[3, 2, 1]", true),
            ("4", "[3, 2, 1]", false),
        ],
    );
    fails_with(
        MatchType::Within,
        "[1, 1, 2, 3]",
        "[1, 2, 3]",
        "length exceeds expected",
    );
}

#[test]
fn test_within_maps() {
    passes(
        MatchType::Within,
        "{\"a\": 1}",
        "{\"a\": 1, \"b\": 2}",
    );
    fails_with(
        MatchType::Within,
        "{\"a\": 1, \"z\": 9}",
        "{\"a\": 1, \"b\": 2}",
        "not present in expected",
    );
    fails(MatchType::Within, "{\"a\": 2}", "{\"a\": 1, \"b\": 2}");
    passes(MatchType::NotWithin, "{\"a\": 2}", "{\"a\": 1, \"b\": 2}");
}

#[test]
fn test_xml_containment() {
    // plain CONTAINS compares the single root pair by equality; the deep
    // variant is what tolerates the missing child...
    fails(
        MatchType::Contains,
        "<cat><name>Billie</name><age>3</age></cat>",
        "<cat><name>Billie</name></cat>",
    );
    passes(
        MatchType::ContainsDeep,
        "<cat><name>Billie</name><age>3</age></cat>",
        "<cat><name>Billie</name></cat>",
    );
}

#[test]
fn test_contains_search_rollback() {
    // the successful scan must leave no residue from unsuccessful probes...
    let r = check(MatchType::Contains, "[{\"a\": 1}, {\"a\": 2}]", "[{\"a\": 2}]");
    assert!(r.pass);
    assert!(r.failures.is_empty());
}

#[test]
fn test_contains_failure_keeps_probe_detail() {
    // when the element is genuinely absent the probe failures explain why
    // each candidate was rejected...
    let r = fails(MatchType::Contains, "[{\"a\": 1}]", "[{\"a\": 2}]");
    assert!(r.failures.iter().any(|f| f.path == "$[0].a"));
}
