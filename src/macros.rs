// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The `#...` marker sub-language on the expected side.
//!
//! Three entry forms, dispatched here and nowhere else: the parenthesized
//! expression `#(...)` with its comparison-operator prefixes, the bracket
//! size/each form `#[...]`, and the validator-plus-predicate form
//! `#name?predicate`. A leading `##` makes any of them optional (a null
//! actual passes immediately).
//!

use crate::{
    MatchError, MatchType, Num, Value,
    operation::Operation,
    validator::regex_validator,
};
use tracing::{debug, trace};

// The comparison-operator prefixes accepted inside `#(...)`. Longest first.
fn nested_prefix(inner: &str) -> (MatchType, &str) {
    const TABLE: [(&str, MatchType); 8] = [
        ("^^", MatchType::ContainsOnly),
        ("^+", MatchType::ContainsDeep),
        ("^*", MatchType::ContainsAny),
        ("!^", MatchType::NotContains),
        ("!<", MatchType::NotWithin),
        ("!=", MatchType::NotEquals),
        ("^", MatchType::Contains),
        ("<", MatchType::Within),
    ];
    for (prefix, mtype) in TABLE {
        if let Some(rest) = inner.strip_prefix(prefix) {
            return (mtype, rest);
        }
    }
    (MatchType::Equals, inner)
}

// TRUE when the expression uses `_` as a bare identifier (neighbours are
// non-word characters); such expressions are size predicates in their own
// right, anything else is compared against `_` for equality.
fn references_underscore(expr: &str) -> bool {
    let bytes = expr.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'_' {
            continue;
        }
        let prev_ok = i == 0 || !is_word(bytes[i - 1]);
        let next_ok = i + 1 == bytes.len() || !is_word(bytes[i + 1]);
        if prev_ok && next_ok {
            return true;
        }
    }
    false
}

impl Operation<'_> {
    // Bind `$` (root actual) and `_`, evaluate, unbind both.
    fn eval_bound(&self, source: &str, underscore: Value) -> Result<Value, MatchError> {
        let evaluator = self.ctx.root.evaluator;
        evaluator.put("$", self.ctx.root.actual.clone());
        evaluator.put("_", underscore);
        let result = evaluator.eval(source);
        evaluator.remove("$");
        evaluator.remove("_");
        result
    }

    pub(crate) fn match_macro(&mut self, raw: &str) -> Result<bool, MatchError> {
        let optional = raw.starts_with("##");
        let body = if optional { &raw[2..] } else { &raw[1..] };
        trace!("macro '{raw}' at {}", self.ctx.path);

        if optional && self.actual.is_null() {
            return Ok(true);
        }

        if body.len() >= 2 && body.starts_with('(') && body.ends_with(')') {
            let inner = &body[1..body.len() - 1];
            let (nested, rest) = nested_prefix(inner);
            debug!("embedded expression w/ nested type {nested}");
            let result = self.eval_bound(rest.trim(), self.actual.clone())?;
            let child = Operation::new(self.ctx.clone(), nested, self.actual.clone(), result);
            return child.execute();
        }

        if body.starts_with('[') {
            return self.match_bracket(body);
        }

        self.match_validator_form(raw, optional, body)
    }

    // `#[expr]?trailing` --array size predicate, optionally followed by a
    // per-element specification.
    fn match_bracket(&mut self, body: &str) -> Result<bool, MatchError> {
        let Some(close) = body.find(']') else {
            return Err(MatchError::Usage(
                format!("unterminated array macro - #{body}").into(),
            ));
        };
        let size_expr = body[1..close].trim().to_string();
        let trailing = body[close + 1..].trim().to_string();

        if !self.actual.is_list() {
            return Ok(self.fail("actual is not an array or list"));
        }
        let len = self.actual.list_size().unwrap_or(0);

        if !size_expr.is_empty() {
            let expr = if references_underscore(&size_expr) {
                size_expr
            } else {
                format!("{size_expr} == _")
            };
            let verdict = self.eval_bound(&expr, Value::Num(Num::Int(len as i64)))?;
            if !verdict.is_truthy() {
                return Ok(self.fail("array length expression evaluated to 'false'"));
            }
        }

        if trailing.is_empty() {
            return Ok(true);
        }
        // `?pred` is shorthand for the `#?pred` macro applied per element;
        // a full macro/schema reference runs per element as-is...
        let each_expected = if trailing.starts_with('?') {
            format!("#{trailing}")
        } else {
            trailing
        };
        let child = Operation::new(
            self.ctx.clone(),
            MatchType::EachEquals,
            self.actual.clone(),
            Value::Str(each_expected),
        );
        child.execute()
    }

    // `#name?predicate` --registry lookup, the `regex` prefix rule, the
    // not-present special cases, and the plain-string fallback.
    fn match_validator_form(
        &mut self,
        raw: &str,
        optional: bool,
        body: &str,
    ) -> Result<bool, MatchError> {
        // carve the name from an optional `?` predicate; `regex` keeps its
        // tail intact since patterns may legitimately contain '?'...
        let (name, predicate): (&str, Option<&str>) = if body.starts_with("regex") {
            (body, None)
        } else if let Some(rest) = body.strip_prefix('?') {
            ("", Some(rest))
        } else {
            match body.find('?') {
                Some(q) => (&body[..q], Some(&body[q + 1..])),
                None => (body, None),
            }
        };

        if self.actual.is_not_present() {
            if optional {
                return Ok(true);
            }
            return Ok(match name {
                "ignore" | "notpresent" => true,
                _ => self.fail("actual path does not exist"),
            });
        }

        if let Some(pattern) = name.strip_prefix("regex") {
            let validator = regex_validator(pattern)?;
            if let Err(reason) = validator(&self.actual) {
                return Ok(self.fail(reason));
            }
        } else if !name.is_empty() {
            let Some(validator) = self.ctx.root.validators.get(name) else {
                // not a validator after all: a string that merely looks
                // like a macro compares literally...
                return self.match_literal_lookalike(raw);
            };
            if let Err(reason) = validator(&self.actual) {
                return Ok(self.fail(reason));
            }
        }

        if let Some(predicate) = predicate {
            let predicate = predicate.trim();
            if !predicate.is_empty() {
                let verdict = self.eval_bound(predicate, self.actual.clone())?;
                if !verdict.is_truthy() {
                    return Ok(self.fail("evaluated to 'false'"));
                }
            }
        }
        Ok(true)
    }

    fn match_literal_lookalike(&self, raw: &str) -> Result<bool, MatchError> {
        match self.actual.as_str() {
            Some(s) => {
                if self.mtype.is_contains() {
                    if s.contains(raw) {
                        Ok(true)
                    } else {
                        Ok(self.fail("actual does not contain expected"))
                    }
                } else if s == raw {
                    Ok(true)
                } else {
                    Ok(self.fail("not equal"))
                }
            }
            None => Ok(self.fail("data types don't match")),
        }
    }
}
