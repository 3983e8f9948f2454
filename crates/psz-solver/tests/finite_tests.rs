use super::*;

use psz_common::SolverOptions;

use crate::fixtures::{bounded_template, registry};
use crate::format::VerbosityLevel;
use crate::resolver::NoopResolver;
use crate::types::{ArrayKey, IntersectionType, UnionType};

fn union(types: Vec<Type>) -> Type {
    Type::from_union(UnionType::new(types).unwrap())
}

fn values(types: &[Type]) -> Vec<String> {
    types
        .iter()
        .map(|ty| ty.describe(VerbosityLevel::Value))
        .collect()
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_finite_scalars() {
    let engine = TypeEngine::new(&NoopResolver);
    assert_eq!(values(&engine.get_finite_types(&Type::bool())), ["false", "true"]);
    assert_eq!(values(&engine.get_finite_types(&Type::null())), ["null"]);
    assert!(engine.get_finite_types(&Type::int()).is_empty());
    assert!(engine.get_finite_types(&Type::string()).is_empty());
}

#[test]
fn test_finite_unions() {
    let engine = TypeEngine::new(&NoopResolver);
    let literals = union(vec![
        Type::constant_int(1),
        Type::constant_string("a"),
        Type::null(),
    ]);
    assert_eq!(engine.get_finite_types(&literals).len(), 3);
    // One open member makes the whole union open.
    let open = union(vec![Type::constant_int(1), Type::int()]);
    assert!(engine.get_finite_types(&open).is_empty());
}

#[test]
fn test_finite_types_respect_limit() {
    let options = SolverOptions::default().with_finite_types_limit(3);
    let engine = TypeEngine::with_options(&NoopResolver, options);
    let four = union((1..=4).map(Type::constant_int).collect());
    assert!(engine.get_finite_types(&four).is_empty());
    let three = union((1..=3).map(Type::constant_int).collect());
    assert_eq!(engine.get_finite_types(&three).len(), 3);
}

#[test]
fn test_template_answers_through_bound() {
    let engine = TypeEngine::new(&NoopResolver);
    let t = bounded_template("T", Type::bool());
    assert_eq!(engine.get_finite_types(&t).len(), 2);
}

// =============================================================================
// Arrays and intersections
// =============================================================================

#[test]
fn test_constant_array_combinations() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = Type::constant_array(ConstantArrayType::new([
        (ArrayKey::from_string("a"), Type::bool()),
        (
            ArrayKey::from_string("b"),
            union(vec![Type::constant_int(1), Type::constant_int(2)]),
        ),
    ]));
    let finite = engine.get_finite_types(&array);
    assert_eq!(
        values(&finite),
        [
            "array{a: false, b: 1}",
            "array{a: false, b: 2}",
            "array{a: true, b: 1}",
            "array{a: true, b: 2}",
        ]
    );

    let open = Type::constant_array(ConstantArrayType::list(vec![Type::int()]));
    assert!(engine.get_finite_types(&open).is_empty());
}

#[test]
fn test_intersection_keeps_common_values() {
    let engine = TypeEngine::new(&NoopResolver);
    let both = Type::from_intersection(
        IntersectionType::new(vec![
            union((1..=3).map(Type::constant_int).collect()),
            union((2..=4).map(Type::constant_int).collect()),
        ])
        .unwrap(),
    );
    assert_eq!(values(&engine.get_finite_types(&both)), ["2", "3"]);
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_cases() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let suit = Type::object("Suit");
    assert_eq!(
        values(&engine.get_enum_cases(&suit)),
        ["Suit::Hearts", "Suit::Spades"]
    );
    assert_eq!(engine.get_finite_types(&suit).len(), 2);
    assert!(engine.get_enum_cases(&Type::object("Foo")).is_empty());

    let hearts = Type::enum_case("Suit", "Hearts");
    let either = union(vec![hearts.clone(), suit]);
    assert_eq!(engine.get_enum_cases(&either).len(), 2);
    assert_eq!(values(&engine.get_enum_cases(&hearts)), ["Suit::Hearts"]);
}
