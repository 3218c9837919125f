// SPDX-License-Identifier: Apache-2.0

//! Test harnesses shared by the suites: one-line pass/fail assertions and a
//! table runner that tallies unexpected outcomes before failing.
//!

use deep_match::prelude::*;

/// Run one match with the bundled script evaluator.
pub(crate) fn check(mtype: MatchType, actual: &str, expected: &str) -> MatchResult {
    let evaluator = ScriptEvaluator::new();
    execute(
        &evaluator,
        mtype,
        Value::parse(actual),
        Value::parse(expected),
    )
    .expect("engine error")
}

pub(crate) fn passes(mtype: MatchType, actual: &str, expected: &str) {
    let r = check(mtype, actual, expected);
    assert!(
        r.pass,
        "expected pass for {mtype} {actual} vs {expected}, got:\n{}",
        r.message.unwrap_or_default()
    );
}

pub(crate) fn fails(mtype: MatchType, actual: &str, expected: &str) -> MatchResult {
    let r = check(mtype, actual, expected);
    assert!(!r.pass, "expected failure for {mtype} {actual} vs {expected}");
    r
}

/// Assert the failure summary mentions a fragment.
pub(crate) fn fails_with(mtype: MatchType, actual: &str, expected: &str, fragment: &str) {
    let r = fails(mtype, actual, expected);
    let message = r.message.unwrap_or_default();
    assert!(
        message.contains(fragment),
        "summary for {mtype} {actual} vs {expected} lacks '{fragment}':\n{message}"
    );
}

/// Process a table of `(actual, expected, should_pass)` cases for one match
/// type, collecting the tally of wrong outcomes.
///
/// The test passes if every case behaves as recorded and fails otherwise.
pub(crate) fn harness(mtype: MatchType, cases: &[(&str, &str, bool)]) {
    let mut failures = 0;
    for (ndx, (actual, expected, should_pass)) in cases.iter().enumerate() {
        let r = check(mtype, actual, expected);
        if r.pass != *should_pass {
            tracing::error!(
                "case #{ndx} ({actual} vs {expected}) - actual/expected: {} / {should_pass}",
                r.pass
            );
            failures += 1;
        }
    }
    assert_eq!(failures, 0);
}
