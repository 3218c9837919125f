// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Configuration parameters affecting the behaviour of this library.
//!

use dotenvy::var;
use std::sync::OnceLock;

/// Default number of estimated heap bytes above which a candidate list is
/// spilled to a disk-backed store rather than kept in memory.
pub const DEFAULT_SPILL_THRESHOLD: usize = 1 << 20;

/// Runtime tunables sourced from the environment (or a `.env` file) once,
/// on first use.
#[derive(Debug)]
pub struct Config {
    spill_threshold: usize,
    not_contains_empty_passes: bool,
    contains_any_deep_short_circuits: bool,
    ignore_counts_in_only: bool,
}

static CONFIG: OnceLock<Config> = OnceLock::new();
/// This library configuration Singleton.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

fn flag(name: &str, fallback: bool) -> bool {
    var(name)
        .map(|x| matches!(x.trim(), "1" | "true" | "TRUE" | "yes"))
        .unwrap_or(fallback)
}

impl Default for Config {
    fn default() -> Self {
        let spill_threshold = var("DM_SPILL_THRESHOLD")
            .ok()
            .and_then(|x| x.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_SPILL_THRESHOLD);

        Self {
            spill_threshold,
            not_contains_empty_passes: flag("DM_NOT_CONTAINS_EMPTY_PASSES", false),
            contains_any_deep_short_circuits: flag("DM_CONTAINS_ANY_DEEP_SHORT_CIRCUITS", true),
            ignore_counts_in_only: flag("DM_IGNORE_COUNTS_IN_ONLY", true),
        }
    }
}

impl Config {
    /// Return the configured estimated-bytes threshold above which lists are
    /// backed by a temp file instead of the heap.
    pub fn spill_threshold(&self) -> usize {
        self.spill_threshold
    }

    /// Return TRUE if `NOT_CONTAINS` against a map w/ an empty expected map
    /// should pass; FALSE (the default) makes it fail.
    pub fn not_contains_empty_passes(&self) -> bool {
        self.not_contains_empty_passes
    }

    /// Return TRUE (the default) if `CONTAINS_ANY_DEEP` on a map returns as
    /// soon as one inner key-value matches; FALSE requires a top-level pair.
    pub fn contains_any_deep_short_circuits(&self) -> bool {
        self.contains_any_deep_short_circuits
    }

    /// Return TRUE (the default) if `#ignore` list elements still count
    /// towards `CONTAINS_ONLY` length checks.
    pub fn ignore_counts_in_only(&self) -> bool {
        self.ignore_counts_in_only
    }
}
