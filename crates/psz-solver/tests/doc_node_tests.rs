use super::*;

use crate::fixtures::template;
use crate::types::UnionType;

fn printed(ty: &Type) -> String {
    ty.to_doc_node().to_string()
}

fn intersection(types: Vec<Type>) -> Type {
    Type::from_intersection(IntersectionType::new(types).unwrap())
}

// =============================================================================
// Leaves
// =============================================================================

#[test]
fn test_scalar_nodes() {
    assert_eq!(Type::int().to_doc_node(), TypeNode::Identifier("int".to_string()));
    assert_eq!(
        Type::constant_int(5).to_doc_node(),
        TypeNode::Const(ConstExprNode::Integer(5))
    );
    let cases = [
        (Type::constant_string("it's"), "'it\\'s'"),
        (Type::constant_bool(true), "true"),
        (Type::constant_float(1.5), "1.5"),
        (Type::null(), "null"),
        (Type::object_without_class(), "object"),
        (Type::enum_case("Suit", "Hearts"), "Suit::Hearts"),
        (template("T"), "T"),
    ];
    for (ty, expected) in cases {
        assert_eq!(printed(&ty), expected);
    }
}

#[test]
fn test_generic_nodes() {
    let collection = Type::generic_object("Collection", vec![Type::int(), Type::string()]);
    assert_eq!(printed(&collection), "Collection<int, string>");
    assert_eq!(printed(&Type::iterable(Type::mixed(), Type::mixed())), "iterable");
    assert_eq!(printed(&Type::iterable(Type::mixed(), Type::string())), "iterable<string>");
    assert_eq!(printed(&Type::array(Type::string(), Type::int())), "array<string, int>");
}

#[test]
fn test_callable_nodes() {
    let closure = Type::closure(vec![Type::int()], Type::string());
    assert_eq!(printed(&closure), "Closure(int): string");

    let nullable = Type::from_union(UnionType::new(vec![Type::int(), Type::null()]).unwrap());
    let closure = Type::closure(vec![], nullable);
    assert_eq!(printed(&closure), "Closure(): (int|null)");
}

// =============================================================================
// Shapes
// =============================================================================

#[test]
fn test_shape_nodes() {
    let shape = Type::constant_array(ConstantArrayType::new([
        (ArrayKey::from_string("a"), Type::int()),
        (ArrayKey::from_string("b c"), Type::string()),
    ]));
    assert_eq!(printed(&shape), "array{a: int, 'b c': string}");

    let list = Type::constant_array(ConstantArrayType::list(vec![
        Type::constant_int(1),
        Type::constant_int(2),
    ]));
    assert_eq!(printed(&list), "array{1, 2}");
    assert_eq!(printed(&Type::empty_array()), "array{}");
}

// =============================================================================
// Unions and intersections
// =============================================================================

#[test]
fn test_union_nodes() {
    let ty = Type::from_union(UnionType::new(vec![Type::int(), Type::string()]).unwrap());
    assert_eq!(printed(&ty), "int|string");

    let benevolent =
        Type::from_union(UnionType::new_benevolent(vec![Type::int(), Type::string()]).unwrap());
    assert_eq!(printed(&benevolent), "__benevolent<int|string>");

    let objects = intersection(vec![Type::object("Foo"), Type::object("Bar")]);
    let nullable = Type::from_union(UnionType::new(vec![objects, Type::null()]).unwrap());
    assert_eq!(printed(&nullable), "(Bar&Foo)|null");
}

#[test]
fn test_string_refinement_nodes() {
    let non_empty = intersection(vec![Type::string(), Type::non_empty_string()]);
    assert_eq!(printed(&non_empty), "non-empty-string");

    let non_falsy = intersection(vec![
        Type::string(),
        Type::non_empty_string(),
        Type::non_falsy_string(),
    ]);
    assert_eq!(printed(&non_falsy), "non-falsy-string");

    let lowercase = intersection(vec![Type::string(), Type::lowercase_string()]);
    assert_eq!(printed(&lowercase), "lowercase-string");
}

#[test]
fn test_array_intersection_nodes() {
    let non_empty_list = intersection(vec![
        Type::array(Type::int(), Type::string()),
        Type::array_list(),
        Type::non_empty_array(),
    ]);
    assert_eq!(printed(&non_empty_list), "non-empty-list<string>");

    let oversized = intersection(vec![
        Type::array(Type::int(), Type::int()),
        Type::oversized_array(),
        Type::non_empty_array(),
    ]);
    assert_eq!(printed(&oversized), "non-empty-array<int, int>");
}

#[test]
fn test_markers_without_doc_syntax_are_dropped() {
    let ty = intersection(vec![Type::object("Foo"), Type::has_method("run")]);
    assert_eq!(ty.to_doc_node(), TypeNode::Identifier("Foo".to_string()));
}
