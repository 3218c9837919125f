// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Bookkeeping carried through the match recursion.
//!
//! A single [Root] exists per top-level match and owns the shared failure
//! list behind interior mutability; every [Ctx] is a lightweight cursor
//! (path, name, index, depth) borrowing into it.
//!

use crate::{ExprEvaluator, Value, report::Failure, validator::Validators};
use std::cell::RefCell;

/// Per-match shared state. Created by the entry points, never by users.
pub(crate) struct Root<'a> {
    /// The scripting collaborator; bound names are only `$`, `_` and `_$`.
    pub(crate) evaluator: &'a dyn ExprEvaluator,
    /// Validator registry in effect for this match.
    pub(crate) validators: &'a Validators,
    /// The root actual, bound to `$` for macro bodies.
    pub(crate) actual: Value,
    /// Pre-order failure list shared by every sub-operation.
    pub(crate) failures: RefCell<Vec<Failure>>,
    /// Whether `EACH_*` tolerates an empty actual list.
    pub(crate) each_empty_allowed: bool,
}

/// Cursor into the value tree: where we are and how we describe it.
#[derive(Clone)]
pub(crate) struct Ctx<'a> {
    pub(crate) root: &'a Root<'a>,
    pub(crate) depth: usize,
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) index: i64,
    pub(crate) xml: bool,
}

// Keys w/o these characters descend as `.key`, anything else as `['key']`.
fn is_plain_key(key: &str) -> bool {
    !key.contains(['-', ' ', '.'])
}

impl<'a> Ctx<'a> {
    /// The cursor at the top of the tree: `$` for JSON-shaped values, `/`
    /// for XML.
    pub(crate) fn start(root: &'a Root<'a>, xml: bool) -> Ctx<'a> {
        Ctx {
            root,
            depth: 0,
            path: if xml { "/".to_string() } else { "$".to_string() },
            name: String::new(),
            index: -1,
            xml,
        }
    }

    /// Descend into a map entry.
    pub(crate) fn descend_key(&self, key: &str) -> Ctx<'a> {
        let path = if self.xml {
            if self.path.ends_with('@') {
                // attribute names hang directly off the `@` marker...
                format!("{}{key}", self.path)
            } else if self.path == "/" {
                format!("/{key}")
            } else {
                format!("{}/{key}", self.path)
            }
        } else if is_plain_key(key) {
            format!("{}.{key}", self.path)
        } else {
            format!("{}['{key}']", self.path)
        };
        Ctx {
            root: self.root,
            depth: self.depth + 1,
            path,
            name: key.to_string(),
            index: -1,
            xml: self.xml,
        }
    }

    /// Descend into a list element. Indices render zero-based for JSON and
    /// one-based for XML.
    pub(crate) fn descend_index(&self, i: usize) -> Ctx<'a> {
        let shown = if self.xml { i + 1 } else { i };
        Ctx {
            root: self.root,
            depth: self.depth + 1,
            path: format!("{}[{shown}]", self.path),
            name: self.name.clone(),
            index: i as i64,
            xml: self.xml,
        }
    }
}
