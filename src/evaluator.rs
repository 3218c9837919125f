// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The scripting capability the engine consumes...
//!
//! Macro bodies such as `#? _ > 0` or `#(foo)` are evaluated by an external
//! collaborator. The engine only ever binds the three documented names
//! `$` (root actual), `_` (current actual, or its length in size
//! expressions) and `_$` (the element under an `each` iteration).
//!

use crate::{MatchError, Value};

/// Capability of evaluating expression strings against named bindings.
///
/// Implementations are synchronous; the engine calls [eval][Self::eval]
/// inline and continues the recursion with the returned value. Errors are
/// bubbled up verbatim and abort the whole match.
pub trait ExprEvaluator {
    /// Evaluate a source string in the current scope.
    fn eval(&self, source: &str) -> Result<Value, MatchError>;

    /// Bind a name in the current scope.
    fn put(&self, name: &str, value: Value);

    /// Unbind a name from the current scope.
    fn remove(&self, name: &str);
}

/// An evaluator for matches whose macros never reference `$`, `_` or `_$`.
/// Any attempt to actually evaluate something is an error.
#[derive(Debug, Default)]
pub struct NoopEvaluator;

impl ExprEvaluator for NoopEvaluator {
    fn eval(&self, source: &str) -> Result<Value, MatchError> {
        Err(MatchError::Eval(
            format!("no expression evaluator configured, cannot eval '{source}'").into(),
        ))
    }

    fn put(&self, _name: &str, _value: Value) {}

    fn remove(&self, _name: &str) {}
}
