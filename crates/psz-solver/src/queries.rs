//! Classification predicates.
//!
//! Predicates that need no class information are methods on [`Type`]; the
//! ones that ask the resolver (iterability of objects, callability, enum
//! membership, member existence) are on [`TypeEngine`].
//!
//! Composite types fold their members' answers the same way for every
//! predicate: unions with `extreme_identity` (definite only when every
//! branch agrees), intersections with `lazy_max_min` (one member proving it
//! is enough), templates through their bound.

use crate::conversions::is_numeric_str;
use crate::engine::TypeEngine;
use crate::resolver::MemberAccessScope;
use crate::trinary::TrinaryLogic::{self, Maybe, No, Yes};
use crate::types::{AccessoryKind, Type, TypeData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Array,
    List,
    ConstantArray,
    OversizedArray,
    IterableAtLeastOnce,
    String,
    NonEmptyString,
    NonFalsyString,
    NumericString,
    LiteralString,
    LowercaseString,
    UppercaseString,
    Integer,
    Float,
    Boolean,
    True,
    False,
    Null,
    Scalar,
    Object,
    ConstantValue,
    ConstantScalarValue,
}

impl Type {
    /// Fold a per-leaf answer over unions, intersections and templates.
    pub(crate) fn fold_leaves(&self, leaf: &dyn Fn(&Type) -> TrinaryLogic) -> TrinaryLogic {
        match self.data() {
            TypeData::Union(union) => {
                TrinaryLogic::extreme_identity(union.types().iter().map(|ty| ty.fold_leaves(leaf)))
            }
            TypeData::Intersection(intersection) => {
                TrinaryLogic::lazy_max_min(intersection.types(), |ty| ty.fold_leaves(leaf))
            }
            TypeData::Template(template) => template.bound.fold_leaves(leaf),
            _ => leaf(self),
        }
    }

    fn facet(&self, facet: Facet) -> TrinaryLogic {
        self.fold_leaves(&|leaf| leaf_facet(leaf, facet))
    }

    pub fn is_array(&self) -> TrinaryLogic {
        self.facet(Facet::Array)
    }

    pub fn is_list(&self) -> TrinaryLogic {
        self.facet(Facet::List)
    }

    pub fn is_constant_array(&self) -> TrinaryLogic {
        self.facet(Facet::ConstantArray)
    }

    pub fn is_oversized_array(&self) -> TrinaryLogic {
        self.facet(Facet::OversizedArray)
    }

    /// Whether iterating the value runs the loop body at least once.
    pub fn is_iterable_at_least_once(&self) -> TrinaryLogic {
        self.facet(Facet::IterableAtLeastOnce)
    }

    pub fn is_string(&self) -> TrinaryLogic {
        self.facet(Facet::String)
    }

    pub fn is_non_empty_string(&self) -> TrinaryLogic {
        self.facet(Facet::NonEmptyString)
    }

    pub fn is_non_falsy_string(&self) -> TrinaryLogic {
        self.facet(Facet::NonFalsyString)
    }

    pub fn is_numeric_string(&self) -> TrinaryLogic {
        self.facet(Facet::NumericString)
    }

    pub fn is_literal_string(&self) -> TrinaryLogic {
        self.facet(Facet::LiteralString)
    }

    pub fn is_lowercase_string(&self) -> TrinaryLogic {
        self.facet(Facet::LowercaseString)
    }

    pub fn is_uppercase_string(&self) -> TrinaryLogic {
        self.facet(Facet::UppercaseString)
    }

    pub fn is_integer(&self) -> TrinaryLogic {
        self.facet(Facet::Integer)
    }

    pub fn is_float(&self) -> TrinaryLogic {
        self.facet(Facet::Float)
    }

    pub fn is_boolean(&self) -> TrinaryLogic {
        self.facet(Facet::Boolean)
    }

    pub fn is_true(&self) -> TrinaryLogic {
        self.facet(Facet::True)
    }

    pub fn is_false(&self) -> TrinaryLogic {
        self.facet(Facet::False)
    }

    pub fn is_null(&self) -> TrinaryLogic {
        self.facet(Facet::Null)
    }

    pub fn is_scalar(&self) -> TrinaryLogic {
        self.facet(Facet::Scalar)
    }

    pub fn is_object(&self) -> TrinaryLogic {
        self.facet(Facet::Object)
    }

    pub fn is_constant_value(&self) -> TrinaryLogic {
        self.facet(Facet::ConstantValue)
    }

    pub fn is_constant_scalar_value(&self) -> TrinaryLogic {
        self.facet(Facet::ConstantScalarValue)
    }
}

fn leaf_facet(ty: &Type, facet: Facet) -> TrinaryLogic {
    use Facet as F;
    match ty.data() {
        TypeData::Never => No,
        TypeData::Mixed { .. } => Maybe,
        TypeData::Null => match facet {
            F::Null | F::ConstantValue | F::ConstantScalarValue => Yes,
            _ => No,
        },
        TypeData::Boolean => match facet {
            F::Boolean | F::Scalar => Yes,
            F::True | F::False => Maybe,
            _ => No,
        },
        TypeData::ConstantBoolean(value) => match facet {
            F::Boolean | F::Scalar | F::ConstantValue | F::ConstantScalarValue => Yes,
            F::True => TrinaryLogic::from_bool(*value),
            F::False => TrinaryLogic::from_bool(!*value),
            _ => No,
        },
        TypeData::Integer => match facet {
            F::Integer | F::Scalar => Yes,
            _ => No,
        },
        TypeData::ConstantInteger(_) => match facet {
            F::Integer | F::Scalar | F::ConstantValue | F::ConstantScalarValue => Yes,
            _ => No,
        },
        TypeData::Float => match facet {
            F::Float | F::Scalar => Yes,
            _ => No,
        },
        TypeData::ConstantFloat(_) => match facet {
            F::Float | F::Scalar | F::ConstantValue | F::ConstantScalarValue => Yes,
            _ => No,
        },
        TypeData::String => match facet {
            F::String | F::Scalar => Yes,
            F::NonEmptyString
            | F::NonFalsyString
            | F::NumericString
            | F::LiteralString
            | F::LowercaseString
            | F::UppercaseString => Maybe,
            _ => No,
        },
        TypeData::ConstantString(value) => constant_string_facet(value, facet),
        TypeData::ObjectWithoutClass
        | TypeData::Object(_)
        | TypeData::GenericObject(_)
        | TypeData::EnumCase(_)
        | TypeData::Closure(_) => match facet {
            F::Object => Yes,
            F::ConstantValue => {
                TrinaryLogic::from_bool(matches!(ty.data(), TypeData::EnumCase(_)))
            }
            _ => No,
        },
        // Strings, arrays and objects can all be callable.
        TypeData::Callable => match facet {
            F::Object
            | F::String
            | F::Array
            | F::List
            | F::ConstantArray
            | F::IterableAtLeastOnce
            | F::Scalar
            | F::NonEmptyString
            | F::NonFalsyString
            | F::LiteralString
            | F::LowercaseString
            | F::UppercaseString => Maybe,
            _ => No,
        },
        TypeData::Iterable(_) => match facet {
            F::Array
            | F::List
            | F::ConstantArray
            | F::OversizedArray
            | F::IterableAtLeastOnce
            | F::Object => Maybe,
            _ => No,
        },
        TypeData::Array(array) => match facet {
            F::Array => Yes,
            F::List => {
                if array.key.is_integer().is_no() && !array.key.is_never() {
                    No
                } else {
                    Maybe
                }
            }
            F::IterableAtLeastOnce | F::OversizedArray => Maybe,
            _ => No,
        },
        TypeData::ConstantArray(array) => match facet {
            F::Array | F::ConstantArray | F::ConstantValue => Yes,
            F::List => TrinaryLogic::from_bool(array.is_list()),
            F::IterableAtLeastOnce => TrinaryLogic::from_bool(!array.is_empty()),
            _ => No,
        },
        TypeData::Accessory(kind) => accessory_facet(kind, facet),
        TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => ty.facet(facet),
    }
}

fn constant_string_facet(value: &str, facet: Facet) -> TrinaryLogic {
    use Facet as F;
    match facet {
        F::String | F::Scalar | F::LiteralString | F::ConstantValue | F::ConstantScalarValue => Yes,
        F::NonEmptyString => TrinaryLogic::from_bool(!value.is_empty()),
        F::NonFalsyString => TrinaryLogic::from_bool(!value.is_empty() && value != "0"),
        F::NumericString => TrinaryLogic::from_bool(is_numeric_str(value)),
        F::LowercaseString => TrinaryLogic::from_bool(value.to_lowercase() == value),
        F::UppercaseString => TrinaryLogic::from_bool(value.to_uppercase() == value),
        _ => No,
    }
}

fn accessory_facet(kind: &AccessoryKind, facet: Facet) -> TrinaryLogic {
    use AccessoryKind as K;
    use Facet as F;
    let exact = |wanted: &AccessoryKind| if kind.implies(wanted) { Yes } else { Maybe };
    match kind {
        K::NonEmptyString
        | K::NonFalsyString
        | K::LiteralString
        | K::NumericString
        | K::LowercaseString
        | K::UppercaseString => match facet {
            F::String | F::Scalar => Yes,
            F::NonEmptyString => exact(&K::NonEmptyString),
            F::NonFalsyString => exact(&K::NonFalsyString),
            F::NumericString => exact(&K::NumericString),
            F::LiteralString => exact(&K::LiteralString),
            F::LowercaseString => exact(&K::LowercaseString),
            F::UppercaseString => exact(&K::UppercaseString),
            F::ConstantValue | F::ConstantScalarValue => Maybe,
            _ => No,
        },
        K::ArrayList | K::NonEmptyArray | K::OversizedArray => match facet {
            F::Array => Yes,
            F::List => exact(&K::ArrayList),
            F::IterableAtLeastOnce => exact(&K::NonEmptyArray),
            F::OversizedArray => exact(&K::OversizedArray),
            F::ConstantArray | F::ConstantValue => {
                if *kind == K::OversizedArray {
                    No
                } else {
                    Maybe
                }
            }
            _ => No,
        },
        K::HasProperty(_) | K::HasMethod(_) => match facet {
            F::Object => Yes,
            _ => No,
        },
    }
}

// =============================================================================
// Resolver-backed predicates
// =============================================================================

impl TypeEngine<'_> {
    pub fn is_iterable(&self, ty: &Type) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_iterable(leaf))
    }

    pub fn is_callable(&self, ty: &Type) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_callable(leaf))
    }

    pub fn is_enum(&self, ty: &Type) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_enum(leaf))
    }

    pub fn is_offset_accessible(&self, ty: &Type) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_offset_accessible(leaf))
    }

    fn leaf_iterable(&self, ty: &Type) -> TrinaryLogic {
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass | TypeData::Callable => Maybe,
            TypeData::Iterable(_) | TypeData::Array(_) | TypeData::ConstantArray(_) => Yes,
            TypeData::Object(object) => self.instance_of(&object.class_name, "Traversable"),
            TypeData::GenericObject(object) => self.instance_of(&object.class_name, "Traversable"),
            TypeData::EnumCase(case) => self.instance_of(&case.class_name, "Traversable"),
            TypeData::Accessory(kind) if kind.is_array_refinement() => Yes,
            TypeData::Accessory(AccessoryKind::HasProperty(_) | AccessoryKind::HasMethod(_)) => {
                Maybe
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.is_iterable(ty)
            }
            _ => No,
        }
    }

    fn leaf_callable(&self, ty: &Type) -> TrinaryLogic {
        match ty.data() {
            TypeData::Callable | TypeData::Closure(_) => Yes,
            TypeData::Mixed { .. }
            | TypeData::String
            | TypeData::ObjectWithoutClass
            | TypeData::Array(_)
            | TypeData::Iterable(_) => Maybe,
            TypeData::ConstantString(value) => {
                if value.is_empty() || is_numeric_str(value) {
                    No
                } else {
                    Maybe
                }
            }
            TypeData::ConstantArray(array) => {
                if array.len() == 2 {
                    Maybe
                } else {
                    No
                }
            }
            TypeData::Object(object) => self.class_has_method(&object.class_name, "__invoke"),
            TypeData::GenericObject(object) => {
                self.class_has_method(&object.class_name, "__invoke")
            }
            TypeData::EnumCase(_) => No,
            TypeData::Accessory(AccessoryKind::HasMethod(name)) if &**name == "__invoke" => Yes,
            TypeData::Accessory(kind) => {
                if kind == &AccessoryKind::NumericString {
                    No
                } else {
                    Maybe
                }
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.is_callable(ty)
            }
            _ => No,
        }
    }

    fn leaf_enum(&self, ty: &Type) -> TrinaryLogic {
        match ty.data() {
            TypeData::EnumCase(_) => Yes,
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Maybe,
            TypeData::Object(object) => match self.class(&object.class_name) {
                Some(class) => TrinaryLogic::from_bool(class.is_enum()),
                None => Maybe,
            },
            TypeData::Accessory(AccessoryKind::HasProperty(_) | AccessoryKind::HasMethod(_)) => {
                Maybe
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.is_enum(ty)
            }
            _ => No,
        }
    }

    fn leaf_offset_accessible(&self, ty: &Type) -> TrinaryLogic {
        match ty.data() {
            TypeData::Array(_)
            | TypeData::ConstantArray(_)
            | TypeData::String
            | TypeData::ConstantString(_)
            | TypeData::Null => Yes,
            TypeData::Mixed { .. }
            | TypeData::ObjectWithoutClass
            | TypeData::Iterable(_)
            | TypeData::Callable => Maybe,
            TypeData::Object(object) => self.instance_of(&object.class_name, "ArrayAccess"),
            TypeData::GenericObject(object) => self.instance_of(&object.class_name, "ArrayAccess"),
            TypeData::Accessory(AccessoryKind::HasProperty(_) | AccessoryKind::HasMethod(_)) => {
                Maybe
            }
            TypeData::Accessory(_) => Yes,
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.is_offset_accessible(ty)
            }
            _ => No,
        }
    }

    fn class_has_method(&self, class_name: &str, method: &str) -> TrinaryLogic {
        match self.class(class_name) {
            None => Maybe,
            Some(class) => {
                if self.resolver().find_method(class_name, method).is_some() {
                    Yes
                } else if class.is_final {
                    No
                } else {
                    Maybe
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Member existence
    // -------------------------------------------------------------------------

    /// Whether `name` is a readable property, as far as `scope` can see.
    pub fn has_property(&self, ty: &Type, name: &str, scope: &dyn MemberAccessScope) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_has_property(leaf, name, scope))
    }

    pub fn has_method(&self, ty: &Type, name: &str, scope: &dyn MemberAccessScope) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_has_method(leaf, name, scope))
    }

    pub fn has_constant(&self, ty: &Type, name: &str) -> TrinaryLogic {
        ty.fold_leaves(&|leaf| self.leaf_has_constant(leaf, name))
    }

    fn leaf_has_property(&self, ty: &Type, name: &str, scope: &dyn MemberAccessScope) -> TrinaryLogic {
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Maybe,
            TypeData::Accessory(AccessoryKind::HasProperty(property)) => {
                if &**property == name {
                    Yes
                } else {
                    Maybe
                }
            }
            TypeData::Accessory(AccessoryKind::HasMethod(_)) => Maybe,
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => {
                let Some(class_name) = object_class_name(ty) else {
                    return No;
                };
                self.class_member_existence(class_name, |resolver| {
                    resolver
                        .find_property(class_name, name)
                        .map(|property| scope.can_access(&property.declaring_class, property.visibility))
                })
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.has_property(ty, name, scope)
            }
            _ => No,
        }
    }

    fn leaf_has_method(&self, ty: &Type, name: &str, scope: &dyn MemberAccessScope) -> TrinaryLogic {
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Maybe,
            TypeData::Accessory(AccessoryKind::HasMethod(method)) => {
                if method.eq_ignore_ascii_case(name) {
                    Yes
                } else {
                    Maybe
                }
            }
            TypeData::Accessory(AccessoryKind::HasProperty(_)) => Maybe,
            TypeData::Closure(_) => TrinaryLogic::from_bool(
                ["__invoke", "bind", "bindto", "call"].contains(&name.to_ascii_lowercase().as_str()),
            ),
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => {
                let Some(class_name) = object_class_name(ty) else {
                    return No;
                };
                self.class_member_existence(class_name, |resolver| {
                    resolver
                        .find_method(class_name, name)
                        .map(|method| scope.can_access(&method.declaring_class, method.visibility))
                })
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.has_method(ty, name, scope)
            }
            _ => No,
        }
    }

    fn leaf_has_constant(&self, ty: &Type, name: &str) -> TrinaryLogic {
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Maybe,
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => {
                let Some(class_name) = object_class_name(ty) else {
                    return No;
                };
                self.class_member_existence(class_name, |resolver| {
                    resolver.find_constant(class_name, name).map(|_| true)
                })
            }
            TypeData::Template(_) | TypeData::Union(_) | TypeData::Intersection(_) => {
                self.has_constant(ty, name)
            }
            _ => No,
        }
    }

    /// Unknown class: Maybe. Member found: Yes when visible, No otherwise.
    /// Member missing: No on final classes, Maybe where a subclass could
    /// still declare it.
    fn class_member_existence(
        &self,
        class_name: &str,
        lookup: impl FnOnce(&dyn crate::resolver::ClassResolver) -> Option<bool>,
    ) -> TrinaryLogic {
        let Some(class) = self.class(class_name) else {
            return Maybe;
        };
        match lookup(self.resolver()) {
            Some(visible) => TrinaryLogic::from_bool(visible),
            None if class.is_final => No,
            None => Maybe,
        }
    }
}

pub(crate) fn object_class_name(ty: &Type) -> Option<&str> {
    match ty.data() {
        TypeData::Object(object) => Some(&object.class_name),
        TypeData::GenericObject(object) => Some(&object.class_name),
        TypeData::EnumCase(case) => Some(&case.class_name),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/queries_tests.rs"]
mod tests;
