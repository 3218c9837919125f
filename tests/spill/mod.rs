// SPDX-License-Identifier: Apache-2.0

//! Matching semantics must not depend on where a list's elements live.
//!

use deep_match::prelude::*;
use deep_match::estimate_list;

fn spilled_list(json: &str) -> Value {
    let Value::List(seq) = Value::parse(json) else {
        panic!("expected a list input")
    };
    let values: Vec<Value> = seq.iter().map(|x| x.unwrap()).collect();
    Value::List(Seq::spilled(&values).expect("spill"))
}

#[test]
fn test_equals_over_disk_backed_actual() {
    let evaluator = NoopEvaluator;
    let actual = spilled_list(r#"[{ "id": 1 }, { "id": 2 }, null, "x"]"#);
    let r = execute(
        &evaluator,
        MatchType::Equals,
        actual,
        Value::parse(r#"[{ "id": 1 }, { "id": 2 }, null, "x"]"#),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}

#[test]
fn test_contains_over_disk_backed_actual() {
    let evaluator = NoopEvaluator;
    let actual = spilled_list("[1, 2, 3, 4, 5]");
    let r = execute(&evaluator, MatchType::Contains, actual.clone(), Value::parse("[4, 2]"))
        .unwrap();
    assert!(r.pass);
    let r = execute(&evaluator, MatchType::Contains, actual, Value::parse("[9]")).unwrap();
    assert!(!r.pass);
}

#[test]
fn test_each_over_disk_backed_actual() {
    let evaluator = ScriptEvaluator::new();
    let actual = spilled_list("[10, 20, 30]");
    let r = execute(
        &evaluator,
        MatchType::EachEquals,
        actual,
        Value::parse("#number? _ >= 10"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}

#[test]
fn test_disk_backed_expected_side() {
    let evaluator = NoopEvaluator;
    let expected = spilled_list("[3, 2, 1]");
    let r = execute(
        &evaluator,
        MatchType::ContainsOnly,
        Value::parse("[1, 2, 3]"),
        expected,
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}

#[test]
fn test_spill_policy_is_size_driven() {
    // a tiny list stays in memory, a big one crosses the threshold...
    let small: Vec<Value> = (0..4i64).map(Value::from).collect();
    assert!(estimate_list(&small) <= 1024);
    let seq = Seq::from_values_with_threshold(small, 1024).unwrap();
    assert!(!seq.is_disk_backed());

    let big: Vec<Value> = (0..100).map(|i| Value::from(format!("payload {i}"))).collect();
    let seq = Seq::from_values_with_threshold(big, 1024).unwrap();
    assert!(seq.is_disk_backed());
    // semantics survive the spill...
    let evaluator = NoopEvaluator;
    let r = execute(
        &evaluator,
        MatchType::Contains,
        Value::List(seq),
        Value::parse("[\"payload 42\"]"),
    )
    .unwrap();
    assert!(r.pass, "{:?}", r.message);
}
