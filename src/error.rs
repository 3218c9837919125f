// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Errors raised from this library.
//!

use peg::{error::ParseError, str::LineCol};
use std::borrow::Cow;
use thiserror::Error;

/// Variants of error raised from this library.
///
/// A failed match is NOT an error --it is the expected business outcome and
/// is returned inside a [MatchResult][crate::MatchResult]. Only misuse of
/// the engine, store I/O trouble and evaluator problems surface as `Err`.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Disk-backed store serialization + file access errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (`serde`) related error.
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML (`quick-xml`) related error.
    #[error("Xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Predicate-expression (`peg`) parsing error.
    #[error("Script parse error: {0:?}")]
    Script(ParseError<LineCol>),

    /// Raised by an [ExprEvaluator][crate::ExprEvaluator] and bubbled up
    /// verbatim. The engine never catches these.
    #[error("Evaluator error: {0}")]
    Eval(Cow<'static, str>),

    /// Invalid match type for a configuration, unknown validator where one
    /// was required, etc...
    #[error("Usage error: {0}")]
    Usage(Cow<'static, str>),

    /// Any operation on a disk-backed store after `close()`.
    #[error("Store is closed")]
    StoreClosed,

    /// A failed match surfaced as an error through the throwing entry point
    /// ([that()][crate::that]). Carries the summary message.
    #[error("match failed: {0}")]
    Failed(String),
}
