use super::*;

use crate::fixtures::{bounded_template, registry};
use crate::format::VerbosityLevel;
use crate::resolver::NoopResolver;
use crate::types::{IntersectionType, UnionType};

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

fn list(values: Vec<Type>) -> Type {
    Type::constant_array(ConstantArrayType::list(values))
}

fn ints(values: &[i64]) -> Type {
    list(values.iter().copied().map(Type::constant_int).collect())
}

fn a1_bx() -> Type {
    shape(&[("a", Type::constant_int(1)), ("b", Type::constant_string("x"))])
}

// =============================================================================
// Iteration
// =============================================================================

#[test]
fn test_constant_array_iteration_types() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = a1_bx();
    assert_eq!(value(&engine.get_iterable_key_type(&array)), "'a'|'b'");
    assert_eq!(value(&engine.get_iterable_value_type(&array)), "1|'x'");
    assert_eq!(value(&engine.get_first_iterable_key_type(&array)), "'a'");
    assert_eq!(value(&engine.get_last_iterable_value_type(&array)), "'x'");
    assert!(engine.get_first_iterable_key_type(&Type::empty_array()).is_never());
}

#[test]
fn test_mixed_keys_read_back_benevolently() {
    let engine = TypeEngine::new(&NoopResolver);
    let key = engine.get_iterable_key_type(&Type::array(Type::mixed(), Type::mixed()));
    assert!(key.as_union().is_some_and(UnionType::is_benevolent));
    assert_eq!(value(&key), "(int|string)");
}

#[test]
fn test_iteration_over_objects_resolves_templates() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let collection = Type::generic_object("Collection", vec![Type::int(), Type::string()]);
    assert!(engine.get_iterable_key_type(&collection).equals(&Type::int()));
    assert!(engine.get_iterable_value_type(&collection).equals(&Type::string()));
    assert!(engine.get_iterable_value_type(&Type::object("DateTime")).is_never());
}

#[test]
fn test_templates_answer_through_bound() {
    let engine = TypeEngine::new(&NoopResolver);
    let t = bounded_template("T", Type::array(Type::int(), Type::string()));
    assert!(engine.get_iterable_value_type(&t).equals(&Type::string()));
}

// =============================================================================
// Offsets
// =============================================================================

#[test]
fn test_get_offset_of_constant_array() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = a1_bx();
    let a = Type::constant_string("a");
    assert!(engine.get_offset_value_type(&array, &a).equals(&Type::constant_int(1)));
    assert!(
        engine
            .get_offset_value_type(&array, &Type::constant_string("z"))
            .is_never()
    );
    assert_eq!(value(&engine.get_offset_value_type(&array, &Type::string())), "1|'x'");
}

#[test]
fn test_get_offset_of_union_unions_results() {
    let engine = TypeEngine::new(&NoopResolver);
    let either = Type::from_union(
        UnionType::new(vec![
            shape(&[("a", Type::constant_int(1))]),
            shape(&[("a", Type::constant_int(2))]),
        ])
        .unwrap(),
    );
    let result = engine.get_offset_value_type(&either, &Type::constant_string("a"));
    assert_eq!(value(&result), "1|2");
}

#[test]
fn test_string_offsets() {
    let engine = TypeEngine::new(&NoopResolver);
    let abc = Type::constant_string("abc");
    let second = engine.get_offset_value_type(&abc, &Type::constant_int(1));
    assert!(second.equals(&Type::constant_string("b")));
    assert!(engine.get_offset_value_type(&abc, &Type::constant_int(5)).is_never());
    assert_eq!(engine.has_offset_value_type(&abc, &Type::constant_int(-1)), Yes);
    assert_eq!(
        value(&engine.get_offset_value_type(&Type::string(), &Type::int())),
        "non-empty-string"
    );
    assert!(
        engine
            .get_offset_value_type(&Type::string(), &Type::constant_string("x"))
            .is_never()
    );
}

#[test]
fn test_offsets_of_non_arrays() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let zero = Type::constant_int(0);
    assert!(engine.get_offset_value_type(&Type::object("DateTime"), &zero).is_never());
    assert!(engine.get_offset_value_type(&Type::null(), &zero).equals(&Type::null()));
    assert!(engine.get_offset_value_type(&Type::int(), &zero).is_never());
    assert_eq!(engine.has_offset_value_type(&Type::int(), &zero), No);
}

#[test]
fn test_has_offset_value_type() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = a1_bx();
    assert_eq!(engine.has_offset_value_type(&array, &Type::constant_string("a")), Yes);
    assert_eq!(engine.has_offset_value_type(&array, &Type::constant_string("z")), No);
    assert_eq!(engine.has_offset_value_type(&array, &Type::string()), Maybe);

    let general = Type::array(Type::int(), Type::string());
    assert_eq!(engine.has_offset_value_type(&general, &Type::constant_string("a")), No);
    assert_eq!(engine.has_offset_value_type(&general, &Type::constant_int(1)), Maybe);
}

#[test]
fn test_non_empty_list_has_offset_zero() {
    let engine = TypeEngine::new(&NoopResolver);
    let non_empty_list = Type::from_intersection(
        IntersectionType::new(vec![
            Type::array(Type::int(), Type::string()),
            Type::array_list(),
            Type::non_empty_array(),
        ])
        .unwrap(),
    );
    assert_eq!(engine.has_offset_value_type(&non_empty_list, &Type::constant_int(0)), Yes);
    assert_eq!(engine.has_offset_value_type(&non_empty_list, &Type::constant_int(1)), Maybe);
}

// =============================================================================
// Writes
// =============================================================================

#[test]
fn test_set_offset_on_constant_arrays() {
    let engine = TypeEngine::new(&NoopResolver);
    let c = Type::constant_string("c");
    let result = engine.set_offset_value_type(&a1_bx(), Some(&c), &Type::constant_bool(true), false);
    assert_eq!(value(&result), "array{a: 1, b: 'x', c: true}");

    let appended = engine.set_offset_value_type(&list(vec![Type::int()]), None, &Type::string(), false);
    assert_eq!(value(&appended), "array{int, string}");
    assert_eq!(appended.is_list(), Yes);
}

#[test]
fn test_set_offset_on_general_arrays() {
    let engine = TypeEngine::new(&NoopResolver);
    let ints_to_strings = Type::array(Type::int(), Type::string());
    let appended = engine.set_offset_value_type(&ints_to_strings, None, &Type::string(), false);
    assert_eq!(value(&appended), "non-empty-array<int, string>");

    let widened =
        engine.set_offset_value_type(&ints_to_strings, Some(&Type::int()), &Type::int(), true);
    assert_eq!(value(&widened), "non-empty-array<int, int|string>");
}

#[test]
fn test_writing_the_only_key_yields_a_shape() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = Type::array(Type::constant_string("a"), Type::int());
    let a = Type::constant_string("a");
    let result = engine.set_offset_value_type(&array, Some(&a), &Type::string(), false);
    assert_eq!(value(&result), "array{a: string}");
}

#[test]
fn test_writing_to_null_creates_an_array() {
    let engine = TypeEngine::new(&NoopResolver);
    let a = Type::constant_string("a");
    let result = engine.set_offset_value_type(&Type::null(), Some(&a), &Type::constant_int(1), false);
    assert_eq!(value(&result), "array{a: 1}");
}

#[test]
fn test_unset_offset() {
    let engine = TypeEngine::new(&NoopResolver);
    let a = Type::constant_string("a");
    assert_eq!(value(&engine.unset_offset(&a1_bx(), &a)), "array{b: 'x'}");

    let keyed = Type::array(
        Type::from_union(
            UnionType::new(vec![Type::constant_string("a"), Type::constant_string("b")]).unwrap(),
        ),
        Type::int(),
    );
    assert_eq!(value(&engine.unset_offset(&keyed, &a)), "array<'b', int>");
}

// =============================================================================
// Array functions
// =============================================================================

#[test]
fn test_keys_and_values() {
    let engine = TypeEngine::new(&NoopResolver);
    assert_eq!(value(&engine.get_keys_array(&a1_bx())), "array{'a', 'b'}");
    assert_eq!(value(&engine.get_values_array(&a1_bx())), "array{1, 'x'}");
    let general = Type::array(Type::string(), Type::int());
    assert_eq!(value(&engine.get_keys_array(&general)), "list<string>");
}

#[test]
fn test_pop_shift_reverse() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = ints(&[1, 2, 3]);
    assert_eq!(value(&engine.pop_array(&array)), "array{1, 2}");
    assert_eq!(value(&engine.shift_array(&array)), "array{2, 3}");
    assert_eq!(value(&engine.reverse_array(&array, No)), "array{3, 2, 1}");
    assert_eq!(
        value(&engine.reverse_array(&array, Yes)),
        "array{2: 3, 1: 2, 0: 1}"
    );
}

#[test]
fn test_chunk_and_slice() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = ints(&[1, 2, 3]);
    let chunked = engine.chunk_array(&array, &Type::constant_int(2), No);
    assert_eq!(value(&chunked), "array{array{1, 2}, array{3}}");

    let tail = engine.slice_array(&array, &Type::constant_int(1), &Type::null(), No);
    assert_eq!(value(&tail), "array{2, 3}");
    let last = engine.slice_array(&array, &Type::constant_int(-1), &Type::null(), No);
    assert_eq!(value(&last), "array{3}");
    let head = engine.slice_array(&array, &Type::constant_int(0), &Type::constant_int(-1), No);
    assert_eq!(value(&head), "array{1, 2}");
}

#[test]
fn test_flip_and_fill_keys() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = shape(&[("a", Type::constant_int(1)), ("b", Type::constant_int(2))]);
    assert_eq!(value(&engine.flip_array(&array)), "array{1: 'a', 2: 'b'}");

    let names = list(vec![Type::constant_string("a"), Type::constant_string("b")]);
    assert_eq!(
        value(&engine.fill_keys_array(&names, &Type::int())),
        "array{a: int, b: int}"
    );
}

#[test]
fn test_intersect_key() {
    let engine = TypeEngine::new(&NoopResolver);
    let other = shape(&[("b", Type::int()), ("c", Type::int())]);
    assert_eq!(value(&engine.intersect_key_array(&a1_bx(), &other)), "array{b: 'x'}");
}

#[test]
fn test_search() {
    let engine = TypeEngine::new(&NoopResolver);
    let array = ints(&[1, 2]);
    let found = engine.search_array(&array, &Type::constant_int(2));
    assert!(found.equals(&Type::constant_int(1)));
    assert_eq!(value(&engine.search_array(&array, &Type::int())), "0|1|false");
}

#[test]
fn test_size_and_shuffle() {
    let engine = TypeEngine::new(&NoopResolver);
    assert!(engine.get_array_size(&a1_bx()).equals(&Type::constant_int(2)));
    assert!(
        engine
            .get_array_size(&Type::array(Type::int(), Type::int()))
            .equals(&Type::int())
    );
    assert_eq!(value(&engine.shuffle_array(&ints(&[1, 2]))), "non-empty-list<1|2>");
}
