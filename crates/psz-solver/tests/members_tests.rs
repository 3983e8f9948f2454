use super::*;

use crate::fixtures::{bounded_template, registry};
use crate::resolver::{ClassScope, OutOfClassScope};
use crate::types::{IntersectionType, UnionType};

fn foo_or_bar() -> Type {
    Type::from_union(UnionType::new(vec![Type::object("Foo"), Type::object("Bar")]).unwrap())
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_class_property() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let property = engine
        .get_property(&Type::object("Foo"), "bar", &OutOfClassScope)
        .expect("Foo::$bar exists");
    assert!(property.readable_type.equals(&Type::int()));
    assert_eq!(property.declaring_class.as_deref(), Some("Foo"));
    assert!(!property.is_dummy());
}

#[test]
fn test_union_property_reads_union_and_writes_intersection() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let prototype = engine
        .get_unresolved_property_prototype(&foo_or_bar(), "bar", &OutOfClassScope)
        .expect("both declare bar");
    assert_eq!(prototype.len(), 2);
    let property = prototype.property(&engine);
    assert_eq!(property.readable_type.describe(VerbosityLevel::Value), "int|string");
    assert!(property.writable_type.is_never());
}

#[test]
fn test_union_property_skips_members_without_it() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let foo_or_int =
        Type::from_union(UnionType::new(vec![Type::object("Foo"), Type::int()]).unwrap());
    let property = engine
        .get_property(&foo_or_int, "bar", &OutOfClassScope)
        .expect("Foo declares bar");
    assert!(property.readable_type.equals(&Type::int()));
}

#[test]
fn test_missing_property_is_an_error() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let err = engine
        .get_property(&Type::object("Foo"), "missing", &OutOfClassScope)
        .expect_err("Foo has no $missing");
    assert_eq!(
        err,
        TypeError::UndefinedProperty {
            type_description: "Foo".to_string(),
            name: "missing".to_string(),
        }
    );
    assert!(engine.get_property(&Type::int(), "bar", &OutOfClassScope).is_err());
    assert!(
        engine
            .get_property(&foo_or_bar(), "missing", &OutOfClassScope)
            .is_err()
    );
}

#[test]
fn test_private_property_follows_access_scope() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let foo = Type::object("Foo");
    let err = engine
        .get_property(&foo, "secret", &OutOfClassScope)
        .expect_err("Foo::$secret is private");
    assert_eq!(
        err,
        TypeError::UndefinedProperty {
            type_description: "Foo".to_string(),
            name: "secret".to_string(),
        }
    );

    let property = engine
        .get_property(&foo, "secret", &ClassScope::new("Foo"))
        .expect("visible inside Foo");
    assert!(property.readable_type.equals(&Type::string()));
    assert_eq!(property.visibility, Visibility::Private);
}

#[test]
fn test_placeholder_properties() {
    let engine = TypeEngine::new(&crate::resolver::NoopResolver);
    let property = engine
        .get_property(&Type::mixed(), "anything", &OutOfClassScope)
        .expect("mixed has every property");
    assert!(property.is_dummy());
    assert!(property.readable_type.is_mixed());
    let property = engine
        .get_property(&Type::has_property("x"), "x", &OutOfClassScope)
        .expect("declared by the marker");
    assert!(property.is_dummy());
}

#[test]
fn test_enum_case_properties() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let hearts = Type::enum_case("Suit", "Hearts");
    let name = engine
        .get_property(&hearts, "name", &OutOfClassScope)
        .expect("cases have a name");
    assert!(name.readable_type.equals(&Type::constant_string("Hearts")));
    assert!(name.writable_type.is_never());
    let value = engine
        .get_property(&hearts, "value", &OutOfClassScope)
        .expect("declared on the enum");
    assert!(value.readable_type.equals(&Type::string()));
}

// =============================================================================
// Methods
// =============================================================================

#[test]
fn test_union_method_intersects_parameters() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let method = engine
        .get_method(&foo_or_bar(), "doFoo", &OutOfClassScope)
        .expect("both declare doFoo");
    assert_eq!(method.parameters.len(), 1);
    assert_eq!(&*method.parameters[0].name, "value");
    assert!(method.parameters[0].ty.is_never());
    assert_eq!(method.return_type.describe(VerbosityLevel::Value), "int|string");
}

#[test]
fn test_intersection_method_unions_parameters() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let both = Type::from_intersection(
        IntersectionType::new(vec![Type::object("Foo"), Type::object("Bar")]).unwrap(),
    );
    let method = engine
        .get_method(&both, "dofoo", &OutOfClassScope)
        .expect("both declare doFoo");
    assert_eq!(method.parameters[0].ty.describe(VerbosityLevel::Value), "int|string");
    assert!(method.return_type.is_never());
}

#[test]
fn test_closure_methods() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let closure = Type::closure(vec![Type::int()], Type::string());
    let invoke = engine
        .get_method(&closure, "__invoke", &OutOfClassScope)
        .expect("closures are invokable");
    assert!(invoke.parameters[0].ty.equals(&Type::int()));
    assert!(invoke.return_type.equals(&Type::string()));
    let bind = engine
        .get_method(&closure, "bind", &OutOfClassScope)
        .expect("declared on Closure");
    assert_eq!(bind.declaring_class.as_deref(), Some("Closure"));
}

#[test]
fn test_generic_method_substitutes_class_templates() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let list = Type::generic_object("ReadonlyList", vec![Type::int()]);
    let method = engine
        .get_method(&list, "first", &OutOfClassScope)
        .expect("declared on ReadonlyList");
    assert!(method.return_type.equals(&Type::int()));
}

// =============================================================================
// Constants
// =============================================================================

#[test]
fn test_constants() {
    let registry = registry();
    let engine = TypeEngine::new(&registry);
    let limit = engine
        .get_constant(&foo_or_bar(), "LIMIT")
        .expect("both declare LIMIT");
    assert_eq!(limit.ty.describe(VerbosityLevel::Value), "10|20");

    let bounded = bounded_template("T", Type::object("Foo"));
    let limit = engine.get_constant(&bounded, "LIMIT").expect("through the bound");
    assert!(limit.ty.equals(&Type::constant_int(10)));

    let err = engine
        .get_constant(&Type::object("Foo"), "MISSING")
        .expect_err("not declared");
    assert!(matches!(err, TypeError::UndefinedConstant { ref name, .. } if name == "MISSING"));
}
