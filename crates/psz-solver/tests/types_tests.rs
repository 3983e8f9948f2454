use super::*;

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_checked_union_requires_two_members() {
    let err = UnionType::new(vec![Type::int()]).expect_err("one member is not a union");
    assert_eq!(
        err,
        TypeError::UnionArity {
            count: 1,
            described: "int".to_string(),
        }
    );
    assert!(UnionType::new(vec![Type::int(), Type::string()]).is_ok());
}

#[test]
fn test_checked_intersection_requires_two_members() {
    let err = IntersectionType::new(vec![]).expect_err("no members");
    assert!(matches!(err, TypeError::IntersectionArity { count: 0, .. }));
    assert!(err.to_string().contains("at least two are required"));
}

#[test]
fn test_benevolent_flag() {
    let union = UnionType::new_benevolent(vec![Type::int(), Type::string()]).unwrap();
    assert!(union.is_benevolent());
    assert!(!UnionType::new(vec![Type::int(), Type::string()]).unwrap().is_benevolent());
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn test_union_equality_ignores_member_order() {
    let a = Type::from_union(UnionType::new(vec![Type::int(), Type::string()]).unwrap());
    let b = Type::from_union(UnionType::new(vec![Type::string(), Type::int()]).unwrap());
    assert!(a.equals(&b));
    assert_eq!(a, b);
}

#[test]
fn test_benevolence_is_part_of_equality() {
    let plain = Type::from_union(UnionType::new(vec![Type::int(), Type::string()]).unwrap());
    let benevolent =
        Type::from_union(UnionType::new_benevolent(vec![Type::int(), Type::string()]).unwrap());
    assert!(!plain.equals(&benevolent));
}

#[test]
fn test_class_names_compare_case_insensitively() {
    assert!(Type::object("DateTime").equals(&Type::object("datetime")));
    assert!(!Type::object("DateTime").equals(&Type::object("DateTimeImmutable")));
}

#[test]
fn test_explicit_mixed_equals_implicit_mixed() {
    assert!(Type::mixed().equals(&Type::explicit_mixed()));
    assert!(Type::mixed().is_implicit_mixed());
    assert!(!Type::explicit_mixed().is_implicit_mixed());
}

#[test]
fn test_floats_compare_by_bits() {
    assert!(Type::constant_float(f64::NAN).equals(&Type::constant_float(f64::NAN)));
    assert!(!Type::constant_float(0.0).equals(&Type::constant_float(-0.0)));
}

#[test]
fn test_template_equality_includes_scope() {
    let in_a = TemplateType::new(TemplateScope::function("a"), "T", None, Variance::Invariant);
    let in_b = TemplateType::new(TemplateScope::function("b"), "T", None, Variance::Invariant);
    assert!(!Type::template(in_a.clone()).equals(&Type::template(in_b)));
    assert!(!Type::template(in_a.clone()).equals(&Type::template(in_a.to_argument())));
}

// =============================================================================
// Array keys
// =============================================================================

#[test]
fn test_decimal_strings_become_integer_keys() {
    assert_eq!(ArrayKey::from_string("12"), ArrayKey::Int(12));
    assert_eq!(ArrayKey::from_string("-3"), ArrayKey::Int(-3));
    for key in ["012", "+1", "-0", "1.0", ""] {
        assert!(matches!(ArrayKey::from_string(key), ArrayKey::String(_)), "{key}");
    }
}

#[test]
fn test_key_from_scalar_types() {
    assert_eq!(ArrayKey::from_type(&Type::constant_bool(true)), Some(ArrayKey::Int(1)));
    assert_eq!(ArrayKey::from_type(&Type::constant_float(2.7)), Some(ArrayKey::Int(2)));
    assert_eq!(
        ArrayKey::from_type(&Type::null()),
        Some(ArrayKey::String(Arc::from("")))
    );
    assert_eq!(ArrayKey::from_type(&Type::int()), None);
}

// =============================================================================
// Constant arrays
// =============================================================================

#[test]
fn test_repeated_key_overwrites_in_place() {
    let array = ConstantArrayType::new([
        (ArrayKey::Int(0), Type::int()),
        (ArrayKey::Int(1), Type::string()),
        (ArrayKey::Int(0), Type::bool()),
    ]);
    assert_eq!(array.len(), 2);
    assert!(array.values()[0].equals(&Type::bool()));
    assert!(array.is_list());
}

#[test]
fn test_next_auto_index() {
    assert_eq!(ConstantArrayType::empty().next_auto_index(), 0);
    let array = ConstantArrayType::new([
        (ArrayKey::Int(5), Type::int()),
        (ArrayKey::from_string("a"), Type::int()),
    ]);
    assert_eq!(array.next_auto_index(), 6);
    assert!(!array.is_list());
    let negative = ConstantArrayType::new([(ArrayKey::Int(-5), Type::int())]);
    assert_eq!(negative.next_auto_index(), 0);
}

#[test]
fn test_reindexed_keeps_string_keys() {
    let array = ConstantArrayType::reindexed(vec![
        (ArrayKey::Int(7), Type::int()),
        (ArrayKey::from_string("a"), Type::string()),
        (ArrayKey::Int(3), Type::bool()),
    ]);
    assert_eq!(
        array.keys(),
        &[ArrayKey::Int(0), ArrayKey::from_string("a"), ArrayKey::Int(1)]
    );
}

// =============================================================================
// Variance
// =============================================================================

#[test]
fn test_variance_composition() {
    use Variance::*;
    assert_eq!(Contravariant.compose(Covariant), Contravariant);
    assert_eq!(Contravariant.compose(Contravariant), Covariant);
    assert_eq!(Covariant.compose(Invariant), Invariant);
    assert_eq!(Bivariant.compose(Covariant), Bivariant);
    assert_eq!(Invariant.invert(), Invariant);
}

#[test]
fn test_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Type>();
}
