//! Three-valued logic for type relations.
//!
//! Every relational query answers `Yes`, `Maybe` or `No` instead of a plain
//! boolean: the type model is approximate, and "don't know" must survive
//! composition instead of collapsing into a false positive or negative.
//!
//! Ordering is `No < Maybe < Yes`, so conjunction is `min` and disjunction
//! is `max`.

use std::fmt;

/// A three-valued truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrinaryLogic {
    No,
    Maybe,
    Yes,
}

impl TrinaryLogic {
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }

    #[inline]
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    #[inline]
    pub fn is_maybe(self) -> bool {
        self == Self::Maybe
    }

    #[inline]
    pub fn is_no(self) -> bool {
        self == Self::No
    }

    /// Conjunction (minimum).
    #[inline]
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.min(other)
    }

    /// Disjunction (maximum).
    #[inline]
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.max(other)
    }

    /// Swaps `Yes` and `No`; `Maybe` stays `Maybe`.
    #[inline]
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::Maybe => Self::Maybe,
            Self::No => Self::Yes,
        }
    }

    /// Variadic conjunction. The empty conjunction is `Yes`.
    pub fn and_all<I: IntoIterator<Item = Self>>(values: I) -> Self {
        values.into_iter().fold(Self::Yes, Self::and)
    }

    /// Variadic disjunction. The empty disjunction is `No`.
    pub fn or_all<I: IntoIterator<Item = Self>>(values: I) -> Self {
        values.into_iter().fold(Self::No, Self::or)
    }

    /// `Yes` if any operand is `Yes`, otherwise the minimum.
    ///
    /// This is the fold used for "is this true of an intersection": one
    /// constituent proving the property is enough, otherwise the weakest
    /// answer wins.
    pub fn max_min<I: IntoIterator<Item = Self>>(values: I) -> Self {
        let mut min = Self::Yes;
        for value in values {
            if value.is_yes() {
                return Self::Yes;
            }
            min = min.min(value);
        }
        min
    }

    /// The common value when every operand agrees, otherwise `Maybe`.
    ///
    /// Used for queries over unions: the answer is only definite when every
    /// branch gives the same definite answer.
    pub fn extreme_identity<I: IntoIterator<Item = Self>>(values: I) -> Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return Self::Yes;
        };
        let (mut min, mut max) = (first, first);
        for value in iter {
            min = min.min(value);
            max = max.max(value);
        }
        if min == max { min } else { Self::Maybe }
    }

    /// Lazy [`max_min`](Self::max_min): stops evaluating at the first `Yes`.
    pub fn lazy_max_min<T, F>(items: impl IntoIterator<Item = T>, mut f: F) -> Self
    where
        F: FnMut(T) -> Self,
    {
        Self::max_min(items.into_iter().map(&mut f))
    }

    /// Lazy conjunction: stops evaluating at the first `No`.
    pub fn lazy_and<T, F>(items: impl IntoIterator<Item = T>, mut f: F) -> Self
    where
        F: FnMut(T) -> Self,
    {
        let mut result = Self::Yes;
        for item in items {
            result = result.and(f(item));
            if result.is_no() {
                break;
            }
        }
        result
    }

    /// Lazy disjunction: stops evaluating at the first `Yes`.
    pub fn lazy_or<T, F>(items: impl IntoIterator<Item = T>, mut f: F) -> Self
    where
        F: FnMut(T) -> Self,
    {
        let mut result = Self::No;
        for item in items {
            result = result.or(f(item));
            if result.is_yes() {
                break;
            }
        }
        result
    }

    /// Stable token for tests and diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::Maybe => "Maybe",
            Self::No => "No",
        }
    }
}

impl From<bool> for TrinaryLogic {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl fmt::Display for TrinaryLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// ---------------------------------------------------------------------------
// AcceptsResult
// ---------------------------------------------------------------------------

/// The answer of an `accepts` query: a trinary value plus the diagnostic
/// reasons collected while computing it.
///
/// Reasons never influence `result`; they only explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptsResult {
    pub result: TrinaryLogic,
    pub reasons: Vec<String>,
}

impl AcceptsResult {
    pub fn new(result: TrinaryLogic, reasons: Vec<String>) -> Self {
        Self { result, reasons }
    }

    pub fn yes() -> Self {
        Self::new(TrinaryLogic::Yes, Vec::new())
    }

    pub fn maybe() -> Self {
        Self::new(TrinaryLogic::Maybe, Vec::new())
    }

    pub fn no() -> Self {
        Self::new(TrinaryLogic::No, Vec::new())
    }

    #[inline]
    pub fn is_yes(&self) -> bool {
        self.result.is_yes()
    }

    #[inline]
    pub fn is_maybe(&self) -> bool {
        self.result.is_maybe()
    }

    #[inline]
    pub fn is_no(&self) -> bool {
        self.result.is_no()
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::new(
            self.result.and(other.result),
            merge_reasons(self.reasons, other.reasons),
        )
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(
            self.result.or(other.result),
            merge_reasons(self.reasons, other.reasons),
        )
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
        self
    }

    /// [`TrinaryLogic::max_min`] over results, keeping every reason.
    pub fn max_min<I: IntoIterator<Item = Self>>(results: I) -> Self {
        Self::fold_with(results, TrinaryLogic::max_min)
    }

    /// [`TrinaryLogic::extreme_identity`] over results, keeping every reason.
    pub fn extreme_identity<I: IntoIterator<Item = Self>>(results: I) -> Self {
        Self::fold_with(results, TrinaryLogic::extreme_identity)
    }

    fn fold_with<I, F>(results: I, fold: F) -> Self
    where
        I: IntoIterator<Item = Self>,
        F: FnOnce(Vec<TrinaryLogic>) -> TrinaryLogic,
    {
        let mut values = Vec::new();
        let mut reasons = Vec::new();
        for result in results {
            values.push(result.result);
            reasons = merge_reasons(reasons, result.reasons);
        }
        Self::new(fold(values), reasons)
    }
}

impl From<TrinaryLogic> for AcceptsResult {
    fn from(result: TrinaryLogic) -> Self {
        Self::new(result, Vec::new())
    }
}

fn merge_reasons(mut left: Vec<String>, right: Vec<String>) -> Vec<String> {
    for reason in right {
        if !left.contains(&reason) {
            left.push(reason);
        }
    }
    left
}

#[cfg(test)]
#[path = "../tests/trinary_tests.rs"]
mod tests;
