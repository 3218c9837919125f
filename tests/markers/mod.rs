// SPDX-License-Identifier: Apache-2.0

//! The `#...` marker sub-language end to end: validators, optional
//! markers, size predicates, embedded expressions and predicates.
//!

use crate::utils::{fails, fails_with, harness, passes};
use deep_match::prelude::*;

#[test]
fn test_type_validators() {
    harness(
        MatchType::Equals,
        &[
            ("7", "#number", true),
            ("\"7\"", "#number", false),
            ("\"abc\"", "#string", true),
            ("true", "#boolean", true),
            ("[1, 2]", "#array", true),
            ("{\"a\": 1}", "#object", true),
            ("null", "#null", true),
            ("1", "#null", false),
            ("1", "#notnull", true),
            ("anything at all", "#ignore", true),
        ],
    );
}

#[test]
fn test_uuid_validator() {
    passes(
        MatchType::Equals,
        "\"f81d4fae-7dec-11d0-a765-00a0c91e6bf6\"",
        "#uuid",
    );
    fails(MatchType::Equals, "\"not-a-uuid\"", "#uuid");
}

#[test]
fn test_regex_validator() {
    passes(MatchType::Equals, "\"abc123\"", "#regex [a-z]+[0-9]+");
    fails_with(
        MatchType::Equals,
        "\"abc\"",
        "#regex [a-z]+[0-9]+",
        "regex match failed",
    );
    // the pattern must cover the whole actual...
    fails(MatchType::Equals, "\"abc123xyz\"", "#regex [a-z]+[0-9]+");
}

#[test]
fn test_size_predicate() {
    passes(MatchType::Equals, "[10, 20, 30]", "#[3]");
    passes(MatchType::Equals, "[10, 20, 30]", "#[_ < 5]");
    fails_with(
        MatchType::Equals,
        "[10, 20, 30]",
        "#[2]",
        "array length expression evaluated to 'false'",
    );
    fails(MatchType::Equals, "[10, 20, 30]", "#[_ > 5]");
    fails_with(MatchType::Equals, "7", "#[1]", "actual is not an array or list");
}

#[test]
fn test_size_predicate_with_trailing_schema() {
    passes(MatchType::Equals, "[10, 20, 30]", "#[3] #number");
    fails(MatchType::Equals, "[10, \"x\", 30]", "#[3] #number");
    passes(MatchType::Equals, "[10, 20, 30]", "#[]? _ >= 10");
    fails(MatchType::Equals, "[10, 2, 30]", "#[]? _ >= 10");
}

#[test]
fn test_validator_with_predicate() {
    passes(MatchType::Equals, "7", "#number? _ > 0");
    fails_with(
        MatchType::Equals,
        "-1",
        "#number? _ > 0",
        "evaluated to 'false'",
    );
    // the bare predicate form skips the validator entirely...
    passes(MatchType::Equals, "7", "#? _ == 7");
    fails(MatchType::Equals, "8", "#? _ == 7");
}

#[test]
fn test_optional_markers() {
    // scenario: a missing key against an optional marker...
    passes(
        MatchType::Equals,
        "{ \"a\": 1 }",
        "{ \"a\": 1, \"b\": \"##string\" }",
    );
    // a null actual short-circuits any optional marker...
    passes(MatchType::Equals, "null", "##number");
    fails(MatchType::Equals, "null", "#number");
    // present but wrong type still fails the optional marker...
    fails(
        MatchType::Equals,
        "{ \"a\": 1, \"b\": 2 }",
        "{ \"a\": 1, \"b\": \"##string\" }",
    );
}

#[test]
fn test_not_present() {
    passes(MatchType::Equals, "#notpresent", "#notpresent");
    passes(MatchType::Equals, "#notpresent", "#ignore");
    passes(MatchType::Equals, "#notpresent", "##string");
    fails_with(
        MatchType::Equals,
        "#notpresent",
        "#string",
        "actual path does not exist",
    );
    fails(MatchType::Equals, "1", "#notpresent");
    passes(MatchType::Equals, "1", "#present");
    fails(MatchType::Equals, "#notpresent", "#present");
}

#[test]
fn test_ignore_and_notpresent_in_maps() {
    passes(
        MatchType::Equals,
        "{ \"a\": 1 }",
        "{ \"a\": 1, \"b\": \"#notpresent\" }",
    );
    fails(
        MatchType::Equals,
        "{ \"a\": 1, \"b\": 2 }",
        "{ \"a\": 1, \"b\": \"#notpresent\" }",
    );
    passes(
        MatchType::Equals,
        "{ \"a\": 1, \"b\": \"whatever\" }",
        "{ \"a\": 1, \"b\": \"#ignore\" }",
    );
}

#[test]
fn test_embedded_expression() {
    let evaluator = ScriptEvaluator::new();
    evaluator.put("limit", Value::from(10));
    let r = execute(
        &evaluator,
        MatchType::Equals,
        Value::parse("{\"total\": 10}"),
        Value::parse("{\"total\": \"#(limit)\"}"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);

    // `$` reaches back to the root actual...
    let r = execute(
        &evaluator,
        MatchType::Equals,
        Value::parse("{\"a\": 5, \"b\": 5}"),
        Value::parse("{\"a\": 5, \"b\": \"#($.a)\"}"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}

#[test]
fn test_embedded_expression_with_operator_prefix() {
    let evaluator = ScriptEvaluator::new();
    evaluator.put("want", Value::parse("[2]"));
    // `^` switches the nested comparison to CONTAINS...
    let r = execute(
        &evaluator,
        MatchType::Equals,
        Value::parse("[1, 2, 3]"),
        Value::parse("#(^want)"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);

    // `!=` negates the nested comparison...
    evaluator.put("other", Value::from(9));
    let r = execute(
        &evaluator,
        MatchType::Equals,
        Value::parse("5"),
        Value::parse("#(!=other)"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}

#[test]
fn test_negated_macro() {
    fails_with(MatchType::NotEquals, "7", "#number", "is equal");
    passes(MatchType::NotEquals, "\"x\"", "#number");
}

#[test]
fn test_unknown_validator_falls_back_to_literal() {
    passes(MatchType::Equals, "\"#custom\"", "#custom");
    fails(MatchType::Equals, "\"something\"", "#custom");
    passes(MatchType::Contains, "\"a #custom b\"", "#custom");
}

#[test]
fn test_custom_validator_registration() {
    let mut validators = Validators::with_builtins();
    validators.register("positive", |v: &Value| match v {
        Value::Num(n) if n.as_f64() > 0.0 => Ok(()),
        _ => Err("not positive".into()),
    });
    let evaluator = NoopEvaluator;
    let matcher = Matcher::new(&evaluator).validators(&validators);
    let r = matcher
        .execute(MatchType::Equals, Value::parse("3"), Value::parse("#positive"))
        .unwrap();
    assert!(r.pass);
    let r = matcher
        .execute(MatchType::Equals, Value::parse("-3"), Value::parse("#positive"))
        .unwrap();
    assert!(!r.pass);
}

#[test]
fn test_macro_inside_nested_structures() {
    passes(
        MatchType::Equals,
        r#"{ "id": "f81d4fae-7dec-11d0-a765-00a0c91e6bf6", "tags": ["a", "b"], "n": 3 }"#,
        r##"{ "id": "#uuid", "tags": "#[2] #string", "n": "#number? _ > 2" }"##,
    );
}
