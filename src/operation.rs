// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The recursive comparator.
//!
//! One [Operation] exists per sub-comparison. Every operation borrows the
//! root failure list through its [Ctx]; failures appended by a candidate
//! search that later succeeds are rolled back to the length recorded before
//! the search, so the final report only shows terminal mismatches.
//!

use crate::{
    MatchError, MatchType, Value,
    config::config,
    context::Ctx,
    report::Failure,
    store::Seq,
};
use indexmap::IndexMap;
use tracing::trace;

/// A single comparison node.
pub(crate) struct Operation<'a> {
    pub(crate) mtype: MatchType,
    pub(crate) actual: Value,
    pub(crate) expected: Value,
    pub(crate) ctx: Ctx<'a>,
}

impl<'a> Operation<'a> {
    pub(crate) fn new(ctx: Ctx<'a>, mtype: MatchType, actual: Value, expected: Value) -> Self {
        Operation {
            mtype,
            actual,
            expected,
            ctx,
        }
    }

    fn child(&self, mtype: MatchType, actual: Value, expected: Value, ctx: Ctx<'a>) -> Self {
        Operation::new(ctx, mtype, actual, expected)
    }

    /// Record a failure at this node. Always returns FALSE so call sites
    /// can `return Ok(self.fail(...))`.
    pub(crate) fn fail(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        trace!(
            "fail at {} (name '{}', index {}): {reason}",
            self.ctx.path, self.ctx.name, self.ctx.index
        );
        self.ctx.root.failures.borrow_mut().push(Failure {
            path: self.ctx.path.clone(),
            reason,
            actual_kind: self.actual.kind(),
            expected_kind: self.expected.kind(),
            actual: self.actual.clone(),
            expected: self.expected.clone(),
            depth: self.ctx.depth,
        });
        false
    }

    fn failures_len(&self) -> usize {
        self.ctx.root.failures.borrow().len()
    }

    fn truncate_failures(&self, len: usize) {
        self.ctx.root.failures.borrow_mut().truncate(len);
    }

    // The positive counterpart of a negated type; identity otherwise.
    fn base_type(&self) -> MatchType {
        match self.mtype {
            MatchType::NotEquals => MatchType::Equals,
            MatchType::NotContains => MatchType::Contains,
            MatchType::NotWithin => MatchType::Within,
            x => x,
        }
    }

    /// Run the comparison. `Ok(true)` / `Ok(false)` is the business
    /// outcome; `Err` short-circuits the whole match (usage, store I/O or
    /// evaluator trouble).
    pub(crate) fn execute(mut self) -> Result<bool, MatchError> {
        if self.mtype.is_each() {
            return self.match_each();
        }

        let expected_is_macro =
            matches!(&self.expected, Value::Str(s) if s.starts_with('#'));

        if self.actual.is_not_present() && !expected_is_macro {
            return Ok(self.fail("actual path does not exist"));
        }

        // kind coercion, only when the two sides disagree...
        if self.actual.kind() != self.expected.kind() {
            if self.mtype.is_contains() {
                if self.actual.is_string() && self.expected.is_xml() {
                    // retry as string-in-string containment
                    if let Value::Xml(x) = &self.expected {
                        let serialized = x.to_xml_string();
                        self.expected = Value::Str(serialized);
                    }
                    return self.execute();
                }
                if !self.expected.is_list() && !self.expected.is_array_object_or_reference() {
                    self.expected = Value::list_in_memory(vec![self.expected]);
                    return self.execute();
                }
            }
            if self.mtype.is_within()
                && !self.actual.is_list()
                && !self.actual.is_array_object_or_reference()
            {
                self.actual = Value::list_in_memory(vec![self.actual]);
                return self.execute();
            }
            if self.expected.is_xml() && self.actual.is_map() {
                if let Value::Xml(x) = &self.expected {
                    let as_map = x.to_map();
                    self.expected = Value::Map(as_map);
                }
                return self.execute();
            }
            if !expected_is_macro && self.actual.kind() != self.expected.kind() {
                // NOT_EQUALS is satisfied by a type mismatch alone, w/o any
                // deep recursion...
                return Ok(if self.mtype == MatchType::NotEquals {
                    true
                } else {
                    self.fail("data types don't match")
                });
            }
        }

        if expected_is_macro {
            let Value::Str(raw) = self.expected.clone() else {
                unreachable!()
            };
            let pre = self.failures_len();
            let matched = self.match_macro(&raw)?;
            return Ok(match self.mtype {
                MatchType::NotEquals | MatchType::NotContains => {
                    self.truncate_failures(pre);
                    if matched {
                        self.fail(if self.mtype == MatchType::NotEquals {
                            "is equal"
                        } else {
                            "actual contains expected"
                        })
                    } else {
                        true
                    }
                }
                _ => matched,
            });
        }

        // kinds agree from here on; compute the positive outcome then apply
        // the type's negation...
        let pre = self.failures_len();
        let matched = self.compare_same_kind()?;
        Ok(match self.mtype {
            MatchType::NotEquals | MatchType::NotContains | MatchType::NotWithin => {
                self.truncate_failures(pre);
                if matched {
                    self.fail(match self.mtype {
                        MatchType::NotEquals => "is equal",
                        MatchType::NotContains => "actual contains expected",
                        _ => "actual is within expected",
                    })
                } else {
                    true
                }
            }
            _ => matched,
        })
    }

    // ===== per-kind comparison ==============================================

    fn compare_same_kind(&mut self) -> Result<bool, MatchError> {
        let base = self.base_type();
        if self.actual.is_xml() && self.expected.is_xml() {
            // both sides flatten to maps and path-building switches to the
            // XPath-like form...
            self.ctx.xml = true;
            let (Value::Xml(a), Value::Xml(b)) = (&self.actual, &self.expected) else {
                unreachable!()
            };
            let (a, b) = (a.to_map(), b.to_map());
            return if base.is_within() {
                self.match_map_within(&a, &b)
            } else {
                self.match_map(&a, &b)
            };
        }
        match (&self.actual, &self.expected) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Bool(a), Value::Bool(b)) => {
                if a == b {
                    Ok(true)
                } else {
                    Ok(self.fail("not equal"))
                }
            }
            (Value::Num(a), Value::Num(b)) => {
                if base.is_equals() {
                    if a.matches(b) {
                        Ok(true)
                    } else {
                        Ok(self.fail("not equal"))
                    }
                } else {
                    Err(self.usage_error())
                }
            }
            (Value::Str(a), Value::Str(b)) => {
                if base.is_equals() {
                    if a == b {
                        Ok(true)
                    } else {
                        Ok(self.fail("not equal"))
                    }
                } else if base.is_contains() {
                    if a.contains(b.as_str()) {
                        Ok(true)
                    } else {
                        Ok(self.fail("actual does not contain expected"))
                    }
                } else {
                    // within: the reversed substring check
                    if b.contains(a.as_str()) {
                        Ok(true)
                    } else {
                        Ok(self.fail("actual is not contained in expected"))
                    }
                }
            }
            (Value::Bytes(a), Value::Bytes(b)) => {
                if !base.is_equals() {
                    return Err(self.usage_error());
                }
                if a == b {
                    Ok(true)
                } else {
                    Ok(self.fail("not equal"))
                }
            }
            (Value::List(_), Value::List(_)) => self.match_list(),
            (Value::Map(a), Value::Map(b)) => {
                let (a, b) = (a.clone(), b.clone());
                if base.is_within() {
                    self.match_map_within(&a, &b)
                } else {
                    self.match_map(&a, &b)
                }
            }
            (Value::Other(a), Value::Other(b)) => {
                if a == b {
                    Ok(true)
                } else {
                    Ok(self.fail("not equal"))
                }
            }
            _ => Ok(self.fail("data types don't match")),
        }
    }

    fn usage_error(&self) -> MatchError {
        MatchError::Usage(
            format!(
                "match type {} is not applicable to {}",
                self.mtype,
                self.actual.kind()
            )
            .into(),
        )
    }

    // ===== lists ============================================================

    fn match_list(&self) -> Result<bool, MatchError> {
        let (Some(act), Some(exp)) = (self.actual.as_seq(), self.expected.as_seq()) else {
            unreachable!()
        };
        let (act, exp) = (act.clone(), exp.clone());
        let base = self.base_type();
        if base.is_equals() {
            if act.len() != exp.len() {
                return Ok(self.fail(format!(
                    "actual array length is not equal to expected - {}:{}",
                    act.len(),
                    exp.len()
                )));
            }
            let mut bad = Vec::new();
            for i in 0..act.len() {
                let child = self.child(
                    MatchType::Equals,
                    act.get(i)?,
                    exp.get(i)?,
                    self.ctx.descend_index(i),
                );
                if !child.execute()? {
                    bad.push(i);
                }
            }
            if bad.is_empty() {
                Ok(true)
            } else {
                Ok(self.fail(format!("match failed for array elements at index - {bad:?}")))
            }
        } else if base.is_within() {
            self.match_list_within(&act, &exp)
        } else {
            self.match_list_contains(&act, &exp)
        }
    }

    // The deep variants recurse w/ themselves into nested structures;
    // scalars always fall back to plain equality.
    fn deep_child_type(&self, child_actual: &Value) -> MatchType {
        let base = self.base_type();
        if base.is_deep() && child_actual.is_map_or_list_or_xml() {
            if base == MatchType::ContainsAnyDeep && !config().contains_any_deep_short_circuits() {
                // configured to require a fully-matching top-level pair...
                return MatchType::Equals;
            }
            base
        } else {
            MatchType::Equals
        }
    }

    fn match_list_contains(
        &self,
        act: &Seq,
        exp: &Seq,
    ) -> Result<bool, MatchError> {
        let base = self.base_type();
        if base.is_only() {
            let expected_len = if config().ignore_counts_in_only() {
                exp.len()
            } else {
                let mut n = 0;
                for x in exp.iter() {
                    if !matches!(x?, Value::Str(s) if s == "#ignore") {
                        n += 1;
                    }
                }
                n
            };
            if act.len() != expected_len {
                return Ok(self.fail(format!(
                    "actual array length is not equal to expected - {}:{}",
                    act.len(),
                    expected_len
                )));
            }
        }

        let mut visited = vec![false; act.len()];
        for j in 0..exp.len() {
            let ev = exp.get(j)?;
            if base.is_only()
                && !config().ignore_counts_in_only()
                && matches!(&ev, Value::Str(s) if s == "#ignore")
            {
                continue;
            }
            let pre = self.failures_len();
            let mut found = false;
            for i in 0..act.len() {
                if base.is_only() && visited[i] {
                    // each actual element may satisfy at most one expected
                    // element...
                    continue;
                }
                let av = act.get(i)?;
                let child_type = self.deep_child_type(&av);
                let child = self.child(child_type, av, ev.clone(), self.ctx.descend_index(i));
                if child.execute()? {
                    if base.is_only() {
                        visited[i] = true;
                    }
                    found = true;
                    break;
                }
            }
            if found {
                self.truncate_failures(pre);
                if base.is_any() {
                    return Ok(true);
                }
            } else if base.is_any() {
                self.truncate_failures(pre);
            } else if base.is_only() {
                return Ok(self.fail(format!("expected item not found - {}", ev.render())));
            } else {
                return Ok(self.fail(format!(
                    "actual array does not contain expected item - {}",
                    ev.render()
                )));
            }
        }
        if base.is_any() {
            Ok(self.fail("actual array does not contain any of the expected items"))
        } else {
            Ok(true)
        }
    }

    fn match_list_within(
        &self,
        act: &Seq,
        exp: &Seq,
    ) -> Result<bool, MatchError> {
        if act.len() > exp.len() {
            return Ok(self.fail(format!(
                "actual array length exceeds expected - {}:{}",
                act.len(),
                exp.len()
            )));
        }
        for i in 0..act.len() {
            let av = act.get(i)?;
            let pre = self.failures_len();
            let mut found = false;
            for j in 0..exp.len() {
                let child = self.child(
                    MatchType::Equals,
                    av.clone(),
                    exp.get(j)?,
                    self.ctx.descend_index(i),
                );
                if child.execute()? {
                    found = true;
                    break;
                }
            }
            if found {
                self.truncate_failures(pre);
            } else {
                return Ok(self.fail(format!(
                    "actual array item is not present in expected - {}",
                    av.render()
                )));
            }
        }
        Ok(true)
    }

    // ===== maps =============================================================

    // One routine for the EQUALS and CONTAINS families, per the tie-breaks
    // encoded below.
    fn match_map(
        &self,
        act: &IndexMap<String, Value>,
        exp: &IndexMap<String, Value>,
    ) -> Result<bool, MatchError> {
        let base = self.base_type();
        let any = base.is_any();

        // configurable outcome for `NOT_CONTAINS` against an empty expected
        // map: reporting the positive side as failed makes the negation
        // pass.
        if exp.is_empty()
            && self.mtype == MatchType::NotContains
            && config().not_contains_empty_passes()
        {
            return Ok(false);
        }

        if matches!(
            base,
            MatchType::Equals | MatchType::ContainsOnly | MatchType::ContainsOnlyDeep
        ) && act.len() > exp.len()
        {
            let surplus: IndexMap<String, Value> = act
                .iter()
                .filter(|(k, _)| !exp.contains_key(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            return Ok(self.fail(format!(
                "actual has {} more key(s) than expected - {}",
                act.len() - exp.len(),
                Value::Map(surplus).render()
            )));
        }

        let mut unmatched: Vec<&String> = exp.keys().collect();
        let mut missing: Vec<&String> = Vec::new();
        let mut failed: Vec<&String> = Vec::new();
        for (key, ev) in exp {
            if !act.contains_key(key) {
                let satisfied = matches!(ev, Value::Str(s)
                    if s.starts_with("##") || s == "#ignore" || s == "#notpresent");
                if satisfied {
                    if any {
                        // an optional key counts as an immediate hit...
                        return Ok(true);
                    }
                    unmatched.retain(|k| *k != key);
                } else if !any {
                    missing.push(key);
                }
                continue;
            }
            let av = act.get(key).cloned().unwrap_or(Value::Null);
            let child_type = self.deep_child_type(&av);
            let pre = self.failures_len();
            let child = self.child(child_type, av, ev.clone(), self.ctx.descend_key(key));
            if child.execute()? {
                if any {
                    return Ok(true);
                }
                unmatched.retain(|k| *k != key);
            } else if any {
                self.truncate_failures(pre);
            } else if base == MatchType::Equals {
                failed.push(key);
            }
        }

        // report priority: missing keys, then failed-EQUALS keys, then the
        // no-hit ANY case, then leftover unmatched keys for plain CONTAINS...
        if !missing.is_empty() {
            return Ok(if missing.len() == 1 {
                self.fail(format!("actual does not contain key - '{}'", missing[0]))
            } else {
                self.fail(format!("actual does not contain keys - {missing:?}"))
            });
        }
        if !failed.is_empty() {
            return Ok(if failed.len() == 1 {
                self.fail(format!("match failed for key - '{}'", failed[0]))
            } else {
                self.fail(format!("match failed for keys - {failed:?}"))
            });
        }
        if any {
            return Ok(self.fail("no key-values matched"));
        }
        if !unmatched.is_empty() {
            return Ok(self.fail(format!(
                "actual does not contain expected key-value(s) - {unmatched:?}"
            )));
        }
        Ok(true)
    }

    fn match_map_within(
        &self,
        act: &IndexMap<String, Value>,
        exp: &IndexMap<String, Value>,
    ) -> Result<bool, MatchError> {
        let mut missing: Vec<&String> = Vec::new();
        let mut failed: Vec<&String> = Vec::new();
        for (key, av) in act {
            let Some(ev) = exp.get(key) else {
                missing.push(key);
                continue;
            };
            let child = self.child(
                MatchType::Equals,
                av.clone(),
                ev.clone(),
                self.ctx.descend_key(key),
            );
            if !child.execute()? {
                failed.push(key);
            }
        }
        if !missing.is_empty() {
            return Ok(self.fail(format!(
                "actual key(s) not present in expected - {missing:?}"
            )));
        }
        if !failed.is_empty() {
            return Ok(self.fail(format!("match failed for keys - {failed:?}")));
        }
        Ok(true)
    }

    // ===== each =============================================================

    fn match_each(&mut self) -> Result<bool, MatchError> {
        let Some(seq) = self.actual.as_seq().cloned() else {
            return Ok(self.fail("actual is not an array or list"));
        };
        if seq.is_empty() {
            if self.ctx.root.each_empty_allowed {
                return Ok(true);
            }
            return Ok(self.fail("match each failed, empty array / list"));
        }
        let inner = self.mtype.de_each();
        let mut bad = Vec::new();
        for i in 0..seq.len() {
            let element = seq.get(i)?;
            // the element is visible to macro predicates as `_$` for the
            // duration of this iteration...
            self.ctx.root.evaluator.put("_$", element.clone());
            let child = self.child(
                inner,
                element,
                self.expected.clone(),
                self.ctx.descend_index(i),
            );
            let outcome = child.execute();
            self.ctx.root.evaluator.remove("_$");
            if !outcome? {
                bad.push(i);
            }
        }
        if bad.is_empty() {
            Ok(true)
        } else {
            Ok(self.fail(format!("match each failed at index - {bad:?}")))
        }
    }
}
