// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Structured failures and the human-readable summary built from them.
//!

use crate::{Kind, MatchType, Value};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;

/// One recorded mismatch, fully qualified.
#[derive(Clone, Debug)]
pub struct Failure {
    /// Where in the actual tree, e.g. `$.orders[2].price` or `/cat/@id`.
    pub path: String,
    /// Why the comparison failed.
    pub reason: String,
    /// Kind of the actual value at that path.
    pub actual_kind: Kind,
    /// Kind of the expected specification there.
    pub expected_kind: Kind,
    /// The actual value.
    pub actual: Value,
    /// The expected value.
    pub expected: Value,
    /// Recursion depth the failure was recorded at.
    pub depth: usize,
}

/// Outcome of a top-level match: pass/fail, a summary message and the
/// structured failure list in deterministic pre-order.
#[derive(Debug)]
pub struct MatchResult {
    /// TRUE when actual conforms to expected.
    pub pass: bool,
    /// The summary, present on failure only.
    pub message: Option<String>,
    /// Structured failures, empty on pass.
    pub failures: Vec<Failure>,
}

impl MatchResult {
    pub(crate) fn passed() -> Self {
        MatchResult {
            pass: true,
            message: None,
            failures: Vec::new(),
        }
    }

    pub(crate) fn failed(mtype: MatchType, failures: Vec<Failure>) -> Self {
        let message = Some(summary(mtype, &failures));
        MatchResult {
            pass: false,
            message,
            failures,
        }
    }

    /// Export as the wire mapping
    /// `{ pass, message, failures?: [{path, reason, ...}] }`.
    pub fn as_json(&self) -> serde_json::Value {
        let mut out = json!({
            "pass": self.pass,
            "message": self.message,
        });
        if !self.failures.is_empty() {
            let failures: Vec<serde_json::Value> = self
                .failures
                .iter()
                .map(|f| {
                    let wire = WireFailure {
                        path: &f.path,
                        reason: &f.reason,
                        actual_type: f.actual_kind.to_string(),
                        expected_type: f.expected_kind.to_string(),
                        actual_value: f.actual.to_json(),
                        expected_value: f.expected.sorted_like(&f.actual).to_json(),
                        depth: f.depth,
                    };
                    serde_json::to_value(&wire).unwrap_or(serde_json::Value::Null)
                })
                .collect();
            out["failures"] = serde_json::Value::Array(failures);
        }
        out
    }
}

// The camelCase projection of a [Failure] callers see over the wire.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFailure<'a> {
    path: &'a str,
    reason: &'a str,
    actual_type: String,
    expected_type: String,
    actual_value: serde_json::Value,
    expected_value: serde_json::Value,
    depth: usize,
}

// The report walks the failure list leaf-most first (reverse insertion
// order), skips duplicate paths and XML text-holder noise, and indents each
// block by twice the failure's depth.
fn summary(mtype: MatchType, failures: &[Failure]) -> String {
    let mut out = format!("match failed: {mtype}");
    let mut seen: HashSet<&str> = HashSet::new();
    for f in failures.iter().rev() {
        if !seen.insert(&f.path) {
            continue;
        }
        if is_text_holder_noise(&f.actual) {
            continue;
        }
        let indent = " ".repeat(f.depth * 2);
        let expected = f.expected.sorted_like(&f.actual);
        out.push_str(&format!(
            "\n{indent}{} | {} ({}:{})\n{indent}{}\n{indent}{}",
            f.path,
            f.reason,
            f.actual_kind,
            f.expected_kind,
            f.actual.render(),
            expected.render(),
        ));
    }
    out
}

// An XML element w/ attributes compares as a map whose text lands under the
// `_` key; reporting that wrapper as well as the leaf underneath it is pure
// noise.
fn is_text_holder_noise(actual: &Value) -> bool {
    match actual.as_map() {
        Some(m) => m.contains_key("_") && m.contains_key("@"),
        None => false,
    }
}
