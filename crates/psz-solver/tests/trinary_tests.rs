use super::*;

use super::TrinaryLogic::{Maybe, No, Yes};

// =============================================================================
// Basic algebra
// =============================================================================

#[test]
fn test_ordering() {
    assert!(No < Maybe);
    assert!(Maybe < Yes);
}

#[test]
fn test_and_picks_minimum() {
    assert_eq!(Yes.and(Maybe), Maybe);
    assert_eq!(Maybe.and(Yes), Maybe);
    for value in [Yes, Maybe, No] {
        assert_eq!(No.and(value), No);
        assert_eq!(value.and(No), No);
    }
}

#[test]
fn test_or_picks_maximum() {
    assert_eq!(No.or(Maybe), Maybe);
    assert_eq!(Maybe.or(Yes), Yes);
    assert_eq!(No.or(No), No);
}

#[test]
fn test_negate() {
    assert_eq!(Yes.negate(), No);
    assert_eq!(No.negate(), Yes);
    assert_eq!(Maybe.negate(), Maybe);
}

#[test]
fn test_single_element_conjunction_is_identity() {
    for value in [Yes, Maybe, No] {
        assert_eq!(TrinaryLogic::and_all([value]), value);
        assert_eq!(TrinaryLogic::or_all([value]), value);
    }
}

#[test]
fn test_variadic_and_or() {
    assert_eq!(TrinaryLogic::and_all([Yes, Yes, Maybe]), Maybe);
    assert_eq!(TrinaryLogic::and_all([Yes, No, Maybe]), No);
    assert_eq!(TrinaryLogic::or_all([No, Maybe, No]), Maybe);
    assert_eq!(TrinaryLogic::and_all([]), Yes);
    assert_eq!(TrinaryLogic::or_all([]), No);
}

// =============================================================================
// Folds
// =============================================================================

#[test]
fn test_max_min() {
    assert_eq!(TrinaryLogic::max_min([No, Yes]), Yes);
    assert_eq!(TrinaryLogic::max_min([Maybe, No]), No);
    assert_eq!(TrinaryLogic::max_min([Maybe, Maybe]), Maybe);
}

#[test]
fn test_extreme_identity() {
    assert_eq!(TrinaryLogic::extreme_identity([Yes, Yes]), Yes);
    assert_eq!(TrinaryLogic::extreme_identity([No, No, No]), No);
    assert_eq!(TrinaryLogic::extreme_identity([Yes, No]), Maybe);
    assert_eq!(TrinaryLogic::extreme_identity([Maybe, Maybe]), Maybe);
}

#[test]
fn test_lazy_max_min_stops_at_yes() {
    let mut calls = 0;
    let result = TrinaryLogic::lazy_max_min([No, Yes, No], |value| {
        calls += 1;
        value
    });
    assert_eq!(result, Yes);
    assert_eq!(calls, 2);
}

#[test]
fn test_lazy_and_stops_at_no() {
    let mut calls = 0;
    let result = TrinaryLogic::lazy_and([Maybe, No, Yes], |value| {
        calls += 1;
        value
    });
    assert_eq!(result, No);
    assert_eq!(calls, 2);
}

#[test]
fn test_lazy_or_stops_at_yes() {
    let mut calls = 0;
    let result = TrinaryLogic::lazy_or([Maybe, Yes, No], |value| {
        calls += 1;
        value
    });
    assert_eq!(result, Yes);
    assert_eq!(calls, 2);
}

#[test]
fn test_describe_tokens() {
    assert_eq!(Yes.describe(), "Yes");
    assert_eq!(Maybe.describe(), "Maybe");
    assert_eq!(No.describe(), "No");
    assert_eq!(Maybe.to_string(), "Maybe");
}

// =============================================================================
// AcceptsResult
// =============================================================================

#[test]
fn test_accepts_result_merges_reasons_without_duplicates() {
    let left = AcceptsResult::maybe().with_reason("a").with_reason("b");
    let right = AcceptsResult::no().with_reason("b").with_reason("c");
    let merged = left.and(right);
    assert_eq!(merged.result, No);
    assert_eq!(merged.reasons, vec!["a", "b", "c"]);
}

#[test]
fn test_accepts_result_folds() {
    let results = vec![AcceptsResult::no().with_reason("x"), AcceptsResult::yes()];
    let max_min = AcceptsResult::max_min(results.clone());
    assert!(max_min.is_yes());
    assert_eq!(max_min.reasons, vec!["x"]);

    let identity = AcceptsResult::extreme_identity(results);
    assert!(identity.is_maybe());
}
