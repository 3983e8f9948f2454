//! Shared class hierarchy for the unit tests.

use crate::resolver::{ClassReflection, ClassRegistry, Visibility};
use crate::types::{TemplateScope, TemplateType, Type, Variance};

pub(crate) fn class_template(class_name: &str, name: &str, variance: Variance) -> TemplateType {
    TemplateType::new(TemplateScope::class(class_name), name, None, variance)
}

pub(crate) fn function_template(function_name: &str, name: &str, bound: Option<Type>) -> TemplateType {
    TemplateType::new(
        TemplateScope::function(function_name),
        name,
        bound,
        Variance::Invariant,
    )
}

/// `T` declared on function `a()`.
pub(crate) fn template(name: &str) -> Type {
    Type::template(function_template("a", name, None))
}

pub(crate) fn bounded_template(name: &str, bound: Type) -> Type {
    Type::template(function_template("a", name, Some(bound)))
}

fn iterator_like(name: &str) -> ClassReflection {
    let key = class_template(name, "TKey", Variance::Covariant);
    let value = class_template(name, "TValue", Variance::Covariant);
    let class = ClassReflection::interface(name)
        .with_iterable_types(Type::template(key.clone()), Type::template(value.clone()));
    let class = if name == "Traversable" {
        class
    } else {
        class.implements_generic(
            "Traversable",
            vec![Type::template(key.clone()), Type::template(value.clone())],
        )
    };
    class.with_template(key).with_template(value)
}

/// Iteration interfaces, a small date hierarchy, a collection with
/// invariant and covariant templates, an enum and a class with members.
pub(crate) fn registry() -> ClassRegistry {
    ClassRegistry::new()
        .with(iterator_like("Traversable"))
        .with(iterator_like("Iterator"))
        .with(iterator_like("IteratorAggregate"))
        .with(ClassReflection::interface("ArrayAccess"))
        .with(ClassReflection::interface("Countable"))
        .with(
            ClassReflection::interface("Stringable").with_method(
                "__toString",
                vec![],
                Type::string(),
                Visibility::Public,
            ),
        )
        .with(ClassReflection::interface("DateTimeInterface"))
        .with(ClassReflection::class("DateTime").implements("DateTimeInterface"))
        .with(ClassReflection::class("DateTimeImmutable").implements("DateTimeInterface"))
        .with(ClassReflection::class("Exception"))
        .with(ClassReflection::class("InvalidArgumentException").extends("Exception"))
        .with(
            ClassReflection::class("Closure")
                .final_()
                .with_method(
                    "bind",
                    vec![("closure", Type::object("Closure"))],
                    Type::object("Closure"),
                    Visibility::Public,
                )
                .with_method(
                    "call",
                    vec![("newThis", Type::object_without_class())],
                    Type::mixed(),
                    Visibility::Public,
                ),
        )
        .with(
            ClassReflection::class("Collection")
                .implements_generic(
                    "IteratorAggregate",
                    vec![
                        Type::template(class_template("Collection", "TKey", Variance::Invariant)),
                        Type::template(class_template("Collection", "TValue", Variance::Invariant)),
                    ],
                )
                .implements("Countable")
                .with_template(class_template("Collection", "TKey", Variance::Invariant))
                .with_template(class_template("Collection", "TValue", Variance::Invariant))
                .with_iterable_types(
                    Type::template(class_template("Collection", "TKey", Variance::Invariant)),
                    Type::template(class_template("Collection", "TValue", Variance::Invariant)),
                ),
        )
        .with(
            ClassReflection::class("ReadonlyList")
                .with_template(class_template("ReadonlyList", "T", Variance::Covariant))
                .with_method(
                    "first",
                    vec![],
                    Type::template(class_template("ReadonlyList", "T", Variance::Covariant)),
                    Visibility::Public,
                ),
        )
        .with(
            ClassReflection::class("Sink")
                .with_template(class_template("Sink", "T", Variance::Contravariant)),
        )
        .with(
            ClassReflection::enumeration("Suit")
                .with_case("Hearts")
                .with_case("Spades")
                .with_property("value", Type::string(), Visibility::Public),
        )
        .with(
            ClassReflection::class("Foo")
                .with_property("bar", Type::int(), Visibility::Public)
                .with_property("secret", Type::string(), Visibility::Private)
                .with_method(
                    "doFoo",
                    vec![("value", Type::int())],
                    Type::string(),
                    Visibility::Public,
                )
                .with_constant("LIMIT", Type::constant_int(10), Visibility::Public),
        )
        .with(
            ClassReflection::class("Bar")
                .with_property("bar", Type::string(), Visibility::Public)
                .with_method(
                    "doFoo",
                    vec![("value", Type::string())],
                    Type::int(),
                    Visibility::Public,
                )
                .with_constant("LIMIT", Type::constant_int(20), Visibility::Public),
        )
        .with(ClassReflection::class("FinalThing").final_())
        .with(
            ClassReflection::class("Name")
                .final_()
                .with_method("__toString", vec![], Type::string(), Visibility::Public),
        )
}
