// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Named leaf-level predicates used by `#...` marker strings.
//!
//! Lookup is case-sensitive. `regex <pattern>` is a prefix rule that
//! bypasses the table entirely and compiles on the spot.
//!

use crate::{MatchError, Value};
use regex::Regex;
use std::{collections::HashMap, sync::OnceLock};
use uuid::Uuid;

/// A leaf predicate: `Ok(())` to pass, `Err(reason)` to fail.
pub type ValidatorFn = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Registry of named validators.
#[derive(Default)]
pub struct Validators {
    table: HashMap<String, ValidatorFn>,
}

impl Validators {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every built-in validator.
    pub fn with_builtins() -> Self {
        let mut v = Self::new();
        v.register("ignore", |_| Ok(()));
        v.register("null", |x: &Value| {
            if x.is_null() { Ok(()) } else { Err("not null".into()) }
        });
        v.register("notnull", |x: &Value| {
            if x.is_null() { Err("null".into()) } else { Ok(()) }
        });
        v.register("present", |x: &Value| {
            if x.is_not_present() { Err("not present".into()) } else { Ok(()) }
        });
        v.register("notpresent", |x: &Value| {
            if x.is_not_present() { Ok(()) } else { Err("present".into()) }
        });
        v.register("boolean", |x: &Value| {
            if x.is_boolean() { Ok(()) } else { Err("not a boolean".into()) }
        });
        v.register("number", |x: &Value| {
            if x.is_number() { Ok(()) } else { Err("not a number".into()) }
        });
        // unlike its siblings, `string` rejects the not-present sentinel
        // before looking at the kind...
        v.register("string", |x: &Value| {
            if x.is_not_present() {
                Err("not present".into())
            } else if x.is_string() {
                Ok(())
            } else {
                Err("not a string".into())
            }
        });
        v.register("array", |x: &Value| {
            if x.is_list() { Ok(()) } else { Err("not an array".into()) }
        });
        v.register("object", |x: &Value| {
            if x.is_map() { Ok(()) } else { Err("not an object".into()) }
        });
        v.register("uuid", |x: &Value| match x.as_str() {
            Some(s) if Uuid::parse_str(s).is_ok() => Ok(()),
            _ => Err("not a valid uuid".into()),
        });
        v
    }

    /// The shared built-in registry.
    pub fn builtin() -> &'static Validators {
        static BUILTIN: OnceLock<Validators> = OnceLock::new();
        BUILTIN.get_or_init(Validators::with_builtins)
    }

    /// Register (or replace) a validator under a name. Lookup is
    /// case-sensitive.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.table.insert(name.to_string(), Box::new(f));
    }

    /// Look a validator up by exact name.
    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.table.get(name)
    }

    /// Return TRUE if a validator is registered under this exact name.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }
}

/// Build a one-off validator for `regex <pattern>` markers. The actual must
/// be a string and must fully match the trimmed pattern.
pub fn regex_validator(pattern: &str) -> Result<ValidatorFn, MatchError> {
    let trimmed = pattern.trim();
    let re = Regex::new(&format!("^(?:{trimmed})$"))
        .map_err(|e| MatchError::Usage(format!("bad regex '{trimmed}': {e}").into()))?;
    Ok(Box::new(move |x: &Value| match x.as_str() {
        Some(s) if re.is_match(s) => Ok(()),
        Some(_) => Err("regex match failed".into()),
        None => Err("not a string".into()),
    }))
}
