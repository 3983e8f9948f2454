//! Depth limiting for the mutually recursive type algorithms.
//!
//! Relations, the combinator, array operations and inference all call each
//! other. Reflection-backed object types can reach themselves again through
//! declared iterable or property types, so nothing structural guarantees
//! termination. Every recursive entry point goes through a [`DepthCounter`]
//! and answers a neutral value once the cap is reached.
//!
//! # Profiles
//!
//! [`RecursionProfile`] names the presets so call sites say what they guard
//! instead of repeating numbers:
//!
//! ```ignore
//! let mut counter = DepthCounter::with_profile(RecursionProfile::Inference);
//! if !counter.enter() {
//!     return TemplateTypeMap::empty();
//! }
//! let map = walk();
//! counter.leave();
//! map
//! ```
//!
//! In debug builds, dropping a counter with unmatched `enter()` calls panics.

use psz_common::limits::{MAX_DESCRIBE_DEPTH, MAX_INFERENCE_DEPTH, MAX_TYPE_RELATION_DEPTH};

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named depth presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Relations, the combinator and array operations.
    ///
    /// depth = `MAX_TYPE_RELATION_DEPTH` (100)
    Relation,

    /// Template inference walks.
    ///
    /// depth = `MAX_INFERENCE_DEPTH` (50)
    Inference,

    /// Rendering of descriptions.
    ///
    /// depth = `MAX_DESCRIBE_DEPTH` (64)
    Describe,

    /// Explicit limit, usually from `SolverOptions`.
    Custom { max_depth: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Relation => MAX_TYPE_RELATION_DEPTH,
            Self::Inference => MAX_INFERENCE_DEPTH,
            Self::Describe => MAX_DESCRIBE_DEPTH,
            Self::Custom { max_depth } => max_depth,
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard. No cycle detection: the same type is legitimately
/// revisited with different partners all the time.
#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Try to enter a deeper level.
    ///
    /// On `true` the caller must call [`leave`](Self::leave) when done. On
    /// `false` the depth is unchanged, the sticky `exceeded` flag is set, and
    /// `leave()` must not be called.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(
            self.depth > 0,
            "DepthCounter::leave() called at depth 0 without a matching enter()"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Stays `true` until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!(
                "DepthCounter dropped at depth {}: enter() without matching leave()",
                self.depth
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
