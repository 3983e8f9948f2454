//! Engine configuration.
//!
//! `SolverOptions` is the only configuration surface of the type engine. It is
//! usually built with `Default`, but hosts can also deserialize it from the
//! JSON configuration they already load.

use serde::Deserialize;

use crate::limits::{CALCULATE_SCALARS_LIMIT, MAX_TYPE_RELATION_DEPTH};

/// Tunable limits for a `TypeEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverOptions {
    /// Hard cap on nested relation / combination / inference queries.
    pub max_relation_depth: u32,
    /// Hard cap on the number of finite values materialized per type.
    pub finite_types_limit: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_relation_depth: MAX_TYPE_RELATION_DEPTH,
            finite_types_limit: CALCULATE_SCALARS_LIMIT,
        }
    }
}

impl SolverOptions {
    /// Parse options from a JSON object. Missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    #[must_use]
    pub fn with_max_relation_depth(mut self, depth: u32) -> Self {
        self.max_relation_depth = depth;
        self
    }

    #[must_use]
    pub fn with_finite_types_limit(mut self, limit: usize) -> Self {
        self.finite_types_limit = limit;
        self
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
