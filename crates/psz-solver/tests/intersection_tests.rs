use super::*;

use crate::fixtures::registry;
use crate::resolver::NoopResolver;
use crate::trinary::TrinaryLogic::Maybe;

fn intersection(types: Vec<Type>) -> Type {
    Type::from_intersection(IntersectionType::new(types).unwrap())
}

fn non_empty_list() -> Type {
    intersection(vec![
        Type::array(Type::int(), Type::string()),
        Type::array_list(),
        Type::non_empty_array(),
    ])
}

fn oversized(item: Type) -> Type {
    intersection(vec![
        Type::array(Type::int(), item),
        Type::oversized_array(),
        Type::non_empty_array(),
    ])
}

// =============================================================================
// Oversized arrays
// =============================================================================

#[test]
fn test_oversized_array_widens_to_yes() {
    let engine = TypeEngine::new(&NoopResolver);
    let target = Type::array(Type::int(), Type::constant_int(1));
    let big = oversized(Type::int());
    assert_eq!(engine.is_super_type_of(&target, &big), Yes);
    assert!(engine.accepts(&target, &big, true).is_yes());

    let regular = intersection(vec![
        Type::array(Type::int(), Type::int()),
        Type::non_empty_array(),
    ]);
    assert_eq!(engine.is_super_type_of(&target, &regular), Maybe);
}

#[test]
fn test_oversized_array_stays_disjoint_from_strings() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.is_super_type_of(&Type::string(), &oversized(Type::int())).is_no());
}

#[test]
fn test_oversized_offset_reads_are_benevolent() {
    let engine = TypeEngine::new(&NoopResolver);
    let big = oversized(Type::from_union(
        crate::types::UnionType::new(vec![Type::int(), Type::string()]).unwrap(),
    ));
    let item = engine.get_offset_value_type(&big, &Type::int());
    assert!(item.as_union().is_some_and(|union| union.is_benevolent()));
    assert_eq!(item.describe(VerbosityLevel::Value), "(int|string)");
}

// =============================================================================
// Non-empty lists
// =============================================================================

#[test]
fn test_non_empty_list_offsets() {
    let engine = TypeEngine::new(&NoopResolver);
    let list = non_empty_list();
    assert_eq!(engine.has_offset_value_type(&list, &Type::constant_int(0)), Yes);
    assert_eq!(engine.has_offset_value_type(&list, &Type::constant_string("0")), Yes);
    assert_eq!(engine.has_offset_value_type(&list, &Type::constant_int(3)), Maybe);
}

#[test]
fn test_writing_next_index_keeps_a_list() {
    let engine = TypeEngine::new(&NoopResolver);
    let list = non_empty_list();
    let written = engine.set_offset_value_type(
        &list,
        Some(&Type::constant_int(1)),
        &Type::string(),
        false,
    );
    assert_eq!(written.is_list(), Yes);
    assert_eq!(written.is_iterable_at_least_once(), Yes);

    let gap = engine.set_offset_value_type(
        &list,
        Some(&Type::constant_int(2)),
        &Type::string(),
        false,
    );
    assert!(!gap.is_list().is_yes());
    assert_eq!(gap.is_iterable_at_least_once(), Yes);
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_non_empty_array_is_truthy() {
    let engine = TypeEngine::new(&NoopResolver);
    let non_empty = intersection(vec![
        Type::array(Type::int(), Type::int()),
        Type::non_empty_array(),
    ]);
    assert!(engine.to_boolean(&non_empty).equals(&Type::constant_bool(true)));
    let plain = intersection(vec![Type::string(), Type::lowercase_string()]);
    assert!(engine.to_boolean(&plain).equals(&Type::bool()));
}

#[test]
fn test_refined_string_array_keys() {
    let engine = TypeEngine::new(&NoopResolver);
    let lowercase = intersection(vec![Type::string(), Type::lowercase_string()]);
    assert!(engine.to_array_key(&lowercase).equals(&lowercase));
    let numeric = intersection(vec![Type::string(), Type::numeric_string()]);
    assert!(engine.to_array_key(&numeric).equals(&Type::int()));
}

// =============================================================================
// Finite values
// =============================================================================

#[test]
fn test_enum_cases_common_to_all_members() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let hearts = Type::enum_case("Suit", "Hearts");
    let both = intersection(vec![Type::object("Suit"), hearts.clone()]);
    let cases = engine.get_enum_cases(&both);
    assert_eq!(cases.len(), 1);
    assert!(cases[0].equals(&hearts));
}

#[test]
fn test_common_values_deduplicate() {
    let sets = vec![
        vec![Type::constant_int(1), Type::constant_int(1), Type::constant_int(2)],
        vec![Type::constant_int(1)],
    ];
    let common = common_values(&sets);
    assert_eq!(common.len(), 1);
    assert!(common[0].equals(&Type::constant_int(1)));
    assert!(common_values(&[]).is_empty());
}
