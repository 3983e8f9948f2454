use super::*;

use crate::fixtures::{registry, template};
use crate::format::VerbosityLevel;
use crate::resolver::NoopResolver;
use crate::types::ArrayKey;

fn value(ty: &Type) -> String {
    ty.describe(VerbosityLevel::Value)
}

fn shape(entries: &[(&str, Type)]) -> Type {
    Type::constant_array(ConstantArrayType::new(
        entries
            .iter()
            .map(|(key, value)| (ArrayKey::from_string(key), value.clone())),
    ))
}

// =============================================================================
// Union
// =============================================================================

#[test]
fn test_union_of_nothing_is_never() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.union(vec![]).is_never());
    assert!(engine.union(vec![Type::never(), Type::never()]).is_never());
}

#[test]
fn test_union_trivial_members() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.union(vec![Type::int()]).equals(&Type::int()));
    assert!(engine.union(vec![Type::int(), Type::never()]).equals(&Type::int()));
    assert!(engine.union(vec![Type::int(), Type::mixed()]).is_mixed());
    assert!(engine.union(vec![Type::int(), Type::int()]).equals(&Type::int()));
}

#[test]
fn test_union_merges_booleans() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.union(vec![Type::constant_bool(true), Type::constant_bool(false)]);
    assert!(result.equals(&Type::bool()));
    let result = engine.union(vec![
        Type::constant_bool(true),
        Type::int(),
        Type::constant_bool(false),
    ]);
    assert_eq!(value(&result), "bool|int");
}

#[test]
fn test_union_drops_subsumed_members() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.union(vec![Type::constant_int(1), Type::int()]);
    assert!(result.equals(&Type::int()));
    let result = engine.union(vec![
        Type::string(),
        engine.intersect(vec![Type::string(), Type::non_empty_string()]),
    ]);
    assert!(result.equals(&Type::string()));
}

#[test]
fn test_union_keeps_templates_apart() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.union(vec![template("T"), Type::int()]);
    assert_eq!(value(&result), "int|T");
    assert_eq!(result.as_union().map(|union| union.types().len()), Some(2));
}

#[test]
fn test_union_is_order_independent() {
    let engine = TypeEngine::new(&NoopResolver);
    let a = engine.union(vec![Type::string(), Type::null(), Type::int()]);
    let b = engine.union(vec![Type::int(), Type::string(), Type::null()]);
    assert!(a.equals(&b));
    assert_eq!(value(&a), "int|string|null");
    assert_eq!(value(&a), value(&b));
}

#[test]
fn test_union_is_idempotent() {
    let engine = TypeEngine::new(&NoopResolver);
    let once = engine.union(vec![Type::constant_int(1), Type::constant_string("a"), Type::null()]);
    let twice = engine.union(vec![once.clone()]);
    assert!(once.equals(&twice));
}

#[test]
fn test_union_merges_general_arrays() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.union(vec![
        Type::array(Type::int(), Type::string()),
        Type::array(Type::string(), Type::int()),
    ]);
    assert_eq!(value(&result), "array<int|string, int|string>");
}

#[test]
fn test_union_merges_shapes_differing_in_one_value() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.union(vec![
        shape(&[("a", Type::constant_int(1)), ("b", Type::int())]),
        shape(&[("a", Type::constant_int(2)), ("b", Type::int())]),
    ]);
    assert_eq!(value(&result), "array{a: 1|2, b: int}");

    let apart = engine.union(vec![
        shape(&[("a", Type::constant_int(1)), ("b", Type::constant_int(1))]),
        shape(&[("a", Type::constant_int(2)), ("b", Type::constant_int(2))]),
    ]);
    assert!(apart.as_union().is_some());
}

#[test]
fn test_benevolent_union_keeps_flag() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.benevolent_union(vec![Type::string(), Type::int()]);
    assert!(result.as_union().is_some_and(UnionType::is_benevolent));
    assert_eq!(value(&result), "(int|string)");
}

// =============================================================================
// Intersection
// =============================================================================

#[test]
fn test_intersection_of_nothing_is_mixed() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.intersect(vec![]).is_mixed());
    assert!(engine.intersect(vec![Type::mixed(), Type::int()]).equals(&Type::int()));
}

#[test]
fn test_intersection_contradiction_is_never() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.intersect(vec![Type::int(), Type::string()]).is_never());
    assert!(engine.intersect(vec![Type::int(), Type::never()]).is_never());
    assert!(
        engine
            .intersect(vec![Type::constant_string(""), Type::non_empty_string()])
            .is_never()
    );
}

#[test]
fn test_intersection_keeps_narrower_member() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.intersect(vec![Type::int(), Type::constant_int(1)]);
    assert!(result.equals(&Type::constant_int(1)));
}

#[test]
fn test_intersection_keeps_refinements() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.intersect(vec![Type::non_empty_string(), Type::string()]);
    assert_eq!(result.as_intersection().map(|i| i.types().len()), Some(2));
    assert_eq!(value(&result), "non-empty-string");
}

#[test]
fn test_intersection_distributes_over_unions() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.intersect(vec![
        engine.union(vec![Type::int(), Type::string()]),
        engine.union(vec![Type::constant_int(1), Type::constant_string("a")]),
    ]);
    assert_eq!(value(&result), "1|'a'");
}

#[test]
fn test_intersection_merges_general_arrays() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.intersect(vec![
        Type::array(Type::int(), Type::mixed()),
        Type::array(Type::mixed(), Type::string()),
    ]);
    assert!(result.equals(&Type::array(Type::int(), Type::string())));
}

#[test]
fn test_intersection_of_unrelated_interfaces_survives() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let result = engine.intersect(vec![Type::object("Countable"), Type::object("DateTimeInterface")]);
    assert_eq!(value(&result), "Countable&DateTimeInterface");
    let result = engine.intersect(vec![Type::object("DateTime"), Type::object("DateTimeImmutable")]);
    assert!(result.is_never());
}

// =============================================================================
// Algebraic properties
// =============================================================================

fn mixed_pool() -> Vec<Type> {
    vec![
        Type::int(),
        Type::constant_int(1),
        Type::string(),
        Type::constant_string("a"),
        Type::constant_string("0"),
        Type::numeric_string(),
        Type::non_empty_string(),
        Type::null(),
        Type::array(Type::int(), Type::string()),
        Type::iterable(Type::mixed(), Type::int()),
        Type::empty_array(),
        Type::callable(),
    ]
}

#[test]
fn test_intersection_is_order_independent() {
    let engine = TypeEngine::new(&NoopResolver);
    let pool = mixed_pool();
    for a in &pool {
        for b in &pool {
            let ab = engine.intersect(vec![a.clone(), b.clone()]);
            let ba = engine.intersect(vec![b.clone(), a.clone()]);
            assert!(ab.equals(&ba), "{a} & {b}: {ab} vs {ba}");
        }
    }
}

#[test]
fn test_normalized_results_are_stable() {
    let engine = TypeEngine::new(&NoopResolver);
    let pool = mixed_pool();
    for a in &pool {
        for b in &pool {
            let intersection = engine.intersect(vec![a.clone(), b.clone()]);
            let again = engine.intersect(vec![intersection.clone()]);
            assert!(intersection.equals(&again), "{a} & {b}: {intersection} vs {again}");

            let union = engine.union(vec![a.clone(), b.clone()]);
            let again = engine.union(vec![union.clone()]);
            assert!(union.equals(&again), "{a} | {b}: {union} vs {again}");
        }
    }
}

#[test]
fn test_intersection_is_associative() {
    let engine = TypeEngine::new(&NoopResolver);
    let pool = mixed_pool();
    for a in &pool {
        for b in &pool {
            for c in &pool {
                let left = engine.intersect(vec![
                    engine.intersect(vec![a.clone(), b.clone()]),
                    c.clone(),
                ]);
                let right = engine.intersect(vec![
                    a.clone(),
                    engine.intersect(vec![b.clone(), c.clone()]),
                ]);
                assert!(left.equals(&right), "({a} & {b}) & {c}: {left} vs {right}");
            }
        }
    }
}

#[test]
fn test_union_is_associative() {
    let engine = TypeEngine::new(&NoopResolver);
    let pool = mixed_pool();
    for a in &pool {
        for b in &pool {
            for c in &pool {
                let left = engine.union(vec![engine.union(vec![a.clone(), b.clone()]), c.clone()]);
                let right = engine.union(vec![a.clone(), engine.union(vec![b.clone(), c.clone()])]);
                assert!(left.equals(&right), "({a} | {b}) | {c}: {left} vs {right}");
            }
        }
    }
}

#[test]
fn test_disjoint_iterables_share_the_empty_array() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = Type::array(Type::int(), Type::string());
    let iterable = Type::iterable(Type::mixed(), Type::int());
    let both = engine.intersect(vec![array.clone(), iterable.clone()]);
    assert!(both.equals(&Type::empty_array()), "{both}");

    let non_empty = engine.intersect(vec![array, iterable, Type::non_empty_array()]);
    assert!(non_empty.is_never());
}

#[test]
fn test_numeric_constant_strings_are_not_callable() {
    let engine = TypeEngine::new(&NoopResolver);
    let zero = engine.intersect(vec![Type::constant_string("0"), Type::callable()]);
    assert!(zero.is_never());
    let name = engine.intersect(vec![Type::constant_string("a"), Type::callable()]);
    assert!(!name.is_never());
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_remove_covered_and_disjoint() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.remove(&Type::int(), &Type::int()).is_never());
    assert!(engine.remove(&Type::int(), &Type::string()).equals(&Type::int()));
    let int_or_string = engine.union(vec![Type::int(), Type::string()]);
    assert!(engine.remove(&int_or_string, &Type::int()).equals(&Type::string()));
}

#[test]
fn test_remove_constant_boolean() {
    let engine = TypeEngine::new(&NoopResolver);
    let result = engine.remove(&Type::bool(), &Type::constant_bool(true));
    assert!(result.equals(&Type::constant_bool(false)));
}

#[test]
fn test_remove_empty_string() {
    let engine = TypeEngine::new(&NoopResolver);
    let non_empty = engine.remove(&Type::string(), &Type::constant_string(""));
    assert_eq!(value(&non_empty), "non-empty-string");
    let non_falsy = engine.remove(&non_empty, &Type::constant_string("0"));
    assert_eq!(value(&non_falsy), "non-falsy-string");
}

#[test]
fn test_remove_empty_array() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = Type::array(Type::mixed(), Type::mixed());
    let non_empty = engine.remove(&array, &Type::empty_array());
    assert_eq!(value(&non_empty), "non-empty-array");
    let empty = engine.remove(&array, &Type::non_empty_array());
    assert!(empty.equals(&Type::empty_array()));
}

#[test]
fn test_remove_union_member_by_member() {
    let engine = TypeEngine::new(&NoopResolver);
    let from = engine.union(vec![Type::int(), Type::string(), Type::null()]);
    let to_remove = engine.union(vec![Type::null(), Type::int()]);
    assert!(engine.remove(&from, &to_remove).equals(&Type::string()));
}

#[test]
fn test_try_remove_inexpressible() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.try_remove(&Type::int(), &Type::constant_int(1)).is_none());
    assert!(
        engine
            .remove(&Type::int(), &Type::constant_int(1))
            .equals(&Type::int())
    );
}

// =============================================================================
// Recursion limit
// =============================================================================

#[test]
fn test_depth_limit_leaves_members_apart() {
    let options = psz_common::SolverOptions::default().with_max_relation_depth(1);
    let engine = TypeEngine::with_options(&NoopResolver, options);
    // Member comparisons answer Maybe past the cap, so nothing collapses.
    let result = engine.intersect(vec![Type::int(), Type::string()]);
    assert!(!result.is_never());
    assert_eq!(result.as_intersection().map(|i| i.types().len()), Some(2));
    assert!(engine.depth_exceeded());

    let fresh = TypeEngine::new(&NoopResolver);
    assert!(fresh.intersect(vec![Type::int(), Type::string()]).is_never());
    assert!(!fresh.depth_exceeded());
}
