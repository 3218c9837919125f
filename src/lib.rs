// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Declarative, recursive value matching.
//!
//! The kernel of this library decides whether an *actual* value conforms to
//! an *expected* specification. Specifications are ordinary values --maps,
//! lists, scalars, XML-- whose string leaves may carry `#...` markers:
//! type validators (`#string`, `#uuid`, `#regex ...`), size predicates
//! (`#[3]`), embedded expressions (`#(...)`) and per-element predicates
//! (`#? _ > 0`). The same engine powers eleven comparison modes, from plain
//! [EQUALS][MatchType::Equals] through the deep and `any`/`only`
//! containment refinements to [WITHIN][MatchType::Within], plus an
//! `EACH_*` variant of each that quantifies over every element of an
//! actual list.
//!
//! # One-shot matching
//!
//! ```rust
//! use deep_match::prelude::*;
//!
//! # fn demo() -> Result<(), MatchError> {
//! let result = execute(
//!     &NoopEvaluator,
//!     MatchType::Equals,
//!     Value::parse(r#"{ "a": 1, "b": { "c": [1, 2, 3] } }"#),
//!     Value::parse(r#"{ "a": 1, "b": { "c": [1, 2, 3] } }"#),
//! )?;
//! assert!(result.pass);
//! #     Ok(())
//! # }
//! ```
//!
//! On failure the [MatchResult] carries a human-readable summary whose
//! blocks point into the actual tree with paths like
//! `$.orders[2].lineItems[0].price`, plus the structured failure list the
//! summary was built from.
//!
//! # Macro predicates and the evaluator capability
//!
//! Markers such as `#number? _ > 0` hand their predicate to an
//! [ExprEvaluator]. The engine binds only three names: `$` (the root
//! actual), `_` (the current actual, or its length inside `#[...]`) and
//! `_$` (the element under an `each` iteration). The bundled
//! [ScriptEvaluator] covers the documented predicate shapes; richer hosts
//! plug in their own implementation of the trait.
//!
//! ```rust
//! use deep_match::prelude::*;
//!
//! # fn demo() -> Result<(), MatchError> {
//! let evaluator = ScriptEvaluator::new();
//! let result = execute(
//!     &evaluator,
//!     MatchType::Equals,
//!     Value::parse("7"),
//!     Value::parse("#number? _ > 0"),
//! )?;
//! assert!(result.pass);
//! #     Ok(())
//! # }
//! ```
//!
//! # Fluent assertions
//!
//! [evaluate()] wraps a value for repeated `is(...)` calls; [that()] is the
//! throwing flavour used in test code:
//!
//! ```rust
//! use deep_match::prelude::*;
//!
//! # fn demo() -> Result<(), MatchError> {
//! that(r#"{ "name": "Billie", "id": 7 }"#)
//!     .is(MatchType::Contains, r#"{ "name": "Billie" }"#)?;
//! #     Ok(())
//! # }
//! ```
//!
//! # Large collections
//!
//! Every list is iterated through [Seq], which has an in-memory and a
//! disk-spilled backing (one JSON value per line in a temp file). A match
//! over a spilled collection behaves identically to an in-memory one; the
//! spill decision is a documented per-kind size estimate against the
//! `DM_SPILL_THRESHOLD` configuration value.
//!

mod config;
mod context;
mod error;
mod evaluator;
mod macros;
mod mtype;
mod num;
mod operation;
mod predicate;
mod report;
mod store;
mod validator;
mod value;
mod xml;

pub use config::{Config, DEFAULT_SPILL_THRESHOLD, config};
pub use error::MatchError;
pub use evaluator::{ExprEvaluator, NoopEvaluator};
pub use mtype::MatchType;
pub use num::Num;
pub use predicate::ScriptEvaluator;
pub use report::{Failure, MatchResult};
pub use store::{DiskSeq, Seq, SeqIter, estimate, estimate_list};
pub use validator::{ValidatorFn, Validators, regex_validator};
pub use value::{Kind, NOT_PRESENT, Value};
pub use xml::XmlNode;

pub mod prelude;

use context::{Ctx, Root};
use operation::Operation;
use std::cell::RefCell;
use tracing::debug;

// strings get the JSON/XML lookalike treatment on entry; everything else is
// already classified...
fn auto_parse(value: Value) -> Value {
    match value {
        Value::Str(s) => Value::parse(&s),
        v => v,
    }
}

/// A configured match runner: evaluator, validator registry and the
/// `EACH_*` empty-list flag.
pub struct Matcher<'a> {
    evaluator: &'a dyn ExprEvaluator,
    validators: &'a Validators,
    each_empty_allowed: bool,
}

impl<'a> Matcher<'a> {
    /// A runner with the built-in validators and default flags.
    pub fn new(evaluator: &'a dyn ExprEvaluator) -> Self {
        Matcher {
            evaluator,
            validators: Validators::builtin(),
            each_empty_allowed: false,
        }
    }

    /// Use a custom validator registry.
    pub fn validators(mut self, validators: &'a Validators) -> Self {
        self.validators = validators;
        self
    }

    /// Tolerate an empty actual list under the `EACH_*` types.
    pub fn each_empty_allowed(mut self, flag: bool) -> Self {
        self.each_empty_allowed = flag;
        self
    }

    /// Run one match. String inputs on either side are auto-parsed when
    /// they look like JSON or XML.
    pub fn execute(
        &self,
        mtype: MatchType,
        actual: Value,
        expected: Value,
    ) -> Result<MatchResult, MatchError> {
        self.run(mtype, auto_parse(actual), auto_parse(expected))
    }

    /// Like [execute][Self::execute], except a string actual is kept
    /// verbatim for the CONTAINS family --substring matching against the
    /// raw text.
    pub fn execute_preserve_actual(
        &self,
        mtype: MatchType,
        actual: Value,
        expected: Value,
    ) -> Result<MatchResult, MatchError> {
        let actual = if actual.is_string() && mtype.is_contains() {
            actual
        } else {
            auto_parse(actual)
        };
        self.run(mtype, actual, auto_parse(expected))
    }

    fn run(
        &self,
        mtype: MatchType,
        actual: Value,
        expected: Value,
    ) -> Result<MatchResult, MatchError> {
        debug!("match {mtype} at root ({}:{})", actual.kind(), expected.kind());
        let xml = actual.is_xml();
        let root = Root {
            evaluator: self.evaluator,
            validators: self.validators,
            actual: actual.clone(),
            failures: RefCell::new(Vec::new()),
            each_empty_allowed: self.each_empty_allowed,
        };
        let pass = {
            let ctx = Ctx::start(&root, xml);
            Operation::new(ctx, mtype, actual, expected).execute()?
        };
        let failures = root.failures.into_inner();
        Ok(if pass {
            MatchResult::passed()
        } else {
            MatchResult::failed(mtype, failures)
        })
    }
}

/// One-shot match with the built-in validator registry.
pub fn execute(
    evaluator: &dyn ExprEvaluator,
    mtype: MatchType,
    actual: Value,
    expected: Value,
) -> Result<MatchResult, MatchError> {
    Matcher::new(evaluator).execute(mtype, actual, expected)
}

/// One-shot match that keeps a string actual verbatim for the CONTAINS
/// family instead of auto-parsing it.
pub fn execute_preserve_actual(
    evaluator: &dyn ExprEvaluator,
    mtype: MatchType,
    actual: Value,
    expected: Value,
) -> Result<MatchResult, MatchError> {
    Matcher::new(evaluator).execute_preserve_actual(mtype, actual, expected)
}

static NOOP: NoopEvaluator = NoopEvaluator;

/// A value wrapped for fluent `is(...)` assertions.
pub struct Subject<'a> {
    value: Value,
    evaluator: &'a dyn ExprEvaluator,
    validators: &'a Validators,
    on_result: Option<Box<dyn Fn(&MatchResult) + 'a>>,
    throwing: bool,
}

/// Wrap an input (JSON/XML auto-parsed) for fluent matching. Results are
/// returned; nothing throws.
pub fn evaluate(input: &str) -> Subject<'static> {
    Subject {
        value: Value::parse(input),
        evaluator: &NOOP,
        validators: Validators::builtin(),
        on_result: None,
        throwing: false,
    }
}

/// Like [evaluate()], except a failed `is(...)` becomes
/// [MatchError::Failed].
pub fn that(input: &str) -> Subject<'static> {
    let mut subject = evaluate(input);
    subject.throwing = true;
    subject
}

impl<'a> Subject<'a> {
    /// Use this evaluator for macro predicates.
    pub fn with_evaluator<'b>(self, evaluator: &'b dyn ExprEvaluator) -> Subject<'b>
    where
        'a: 'b,
    {
        Subject {
            value: self.value,
            evaluator,
            validators: self.validators,
            on_result: self.on_result,
            throwing: self.throwing,
        }
    }

    /// Use a custom validator registry.
    pub fn with_validators<'b>(self, validators: &'b Validators) -> Subject<'b>
    where
        'a: 'b,
    {
        Subject {
            value: self.value,
            evaluator: self.evaluator,
            validators,
            on_result: self.on_result,
            throwing: self.throwing,
        }
    }

    /// Invoke a callback with every [MatchResult] produced by
    /// [is][Self::is].
    pub fn on_result<'b, F>(self, callback: F) -> Subject<'b>
    where
        'a: 'b,
        F: Fn(&MatchResult) + 'b,
    {
        Subject {
            value: self.value,
            evaluator: self.evaluator,
            validators: self.validators,
            on_result: Some(Box::new(callback)),
            throwing: self.throwing,
        }
    }

    /// The wrapped (auto-parsed) value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Match against an expected input string (auto-parsed).
    pub fn is(&self, mtype: MatchType, expected: &str) -> Result<MatchResult, MatchError> {
        self.is_value(mtype, Value::parse(expected))
    }

    /// Match against an already-classified expected value.
    pub fn is_value(&self, mtype: MatchType, expected: Value) -> Result<MatchResult, MatchError> {
        let matcher = Matcher {
            evaluator: self.evaluator,
            validators: self.validators,
            each_empty_allowed: false,
        };
        let result = matcher.run(mtype, self.value.clone(), expected)?;
        if let Some(callback) = &self.on_result {
            callback(&result);
        }
        if self.throwing && !result.pass {
            return Err(MatchError::Failed(
                result.message.clone().unwrap_or_default(),
            ));
        }
        Ok(result)
    }
}
