// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Group imports of the common types and entry points by adding a glob
//! import for use by clients of this library.
//!

pub use super::error::MatchError;
pub use super::evaluator::*;
pub use super::mtype::MatchType;
pub use super::num::Num;
pub use super::predicate::ScriptEvaluator;
pub use super::report::{Failure, MatchResult};
pub use super::store::{Seq, SeqIter};
pub use super::validator::{Validators, regex_validator};
pub use super::value::{Kind, NOT_PRESENT, Value};
pub use super::xml::XmlNode;

pub use super::{Matcher, Subject};
pub use super::{evaluate, execute, execute_preserve_actual, that};
