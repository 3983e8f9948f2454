//! Subtyping and acceptance.
//!
//! `is_super_type_of(a, b)` asks "is every value of `b` a value of `a`?".
//! `accepts(a, b)` asks whether a value of type `b` may be passed where `a`
//! is declared; it is slightly more lenient (int to float, stringable
//! objects to string outside strict mode) and carries diagnostic reasons.
//!
//! Dispatch is two-sided. Compound types (unions, intersections, templates,
//! `mixed`, `never`, iterables, callables and accessories) decide relations
//! from their own side: when one shows up as the candidate, the query flips
//! to `is_sub_type_of` / `is_accepted_by` on the candidate. Leaf pairs are
//! decided in `leaf_super_type_of`.

use crate::engine::TypeEngine;
use crate::queries::object_class_name;
use crate::resolver::MemberAccessScope;
use crate::trinary::AcceptsResult;
use crate::trinary::TrinaryLogic::{self, Maybe, No, Yes};
use crate::types::{
    AccessoryKind, ArrayType, ClosureType, ConstantArrayType, GenericObjectType, IterableType,
    TemplateType, Type, TypeData, UnionType, Variance,
};

/// Member checks inside relations ignore visibility: a private property
/// still makes an object "have" it.
pub(crate) struct UnrestrictedScope;

impl MemberAccessScope for UnrestrictedScope {
    fn can_access(&self, _declaring_class: &str, _visibility: crate::resolver::Visibility) -> bool {
        true
    }
}

impl TypeEngine<'_> {
    // =========================================================================
    // Entry points
    // =========================================================================

    /// Is every value of `b` also a value of `a`?
    pub fn is_super_type_of(&self, a: &Type, b: &Type) -> TrinaryLogic {
        self.guarded("is_super_type_of", || Maybe, || self.super_type_of(a, b))
    }

    /// Is every value of `b` also a value of `a`, decided from `b`'s side.
    pub fn is_sub_type_of(&self, b: &Type, a: &Type) -> TrinaryLogic {
        self.guarded("is_sub_type_of", || Maybe, || self.sub_type_of(b, a))
    }

    /// May a value of type `b` be passed where `a` is declared?
    pub fn accepts(&self, a: &Type, b: &Type, strict_types: bool) -> AcceptsResult {
        self.guarded("accepts", AcceptsResult::maybe, || {
            self.accepts_inner(a, b, strict_types)
        })
    }

    /// `accepts`, decided from the candidate's side.
    pub fn is_accepted_by(&self, b: &Type, a: &Type, strict_types: bool) -> AcceptsResult {
        self.guarded("is_accepted_by", AcceptsResult::maybe, || {
            self.accepted_by_inner(b, a, strict_types)
        })
    }

    pub fn equals(&self, a: &Type, b: &Type) -> bool {
        a.equals(b)
    }

    // =========================================================================
    // Super-type dispatch
    // =========================================================================

    fn super_type_of(&self, a: &Type, b: &Type) -> TrinaryLogic {
        match a.data() {
            TypeData::Mixed { .. } => return Yes,
            TypeData::Never => return TrinaryLogic::from_bool(b.is_never()),
            _ => {}
        }
        if b.is_never() || a.equals(b) {
            return Yes;
        }

        match a.data() {
            TypeData::Union(union) => self.union_super_type_of(a, union, b),
            TypeData::Intersection(intersection) => {
                TrinaryLogic::lazy_and(intersection.types(), |member| {
                    self.is_super_type_of(member, b)
                })
            }
            TypeData::Template(template) => {
                if matches!(b.data(), TypeData::Template(_) | TypeData::Intersection(_)) {
                    return self.is_sub_type_of(b, a);
                }
                self.is_super_type_of(&template.bound, b).and(Maybe)
            }
            TypeData::Iterable(iterable) => {
                if b.is_compound() {
                    return self.is_sub_type_of(b, a);
                }
                self.iterable_super_type_of(iterable, b)
            }
            TypeData::Accessory(kind) => {
                if b.is_compound() {
                    return self.is_sub_type_of(b, a);
                }
                self.accessory_query(kind, b)
            }
            TypeData::Callable => {
                if b.is_compound() {
                    return self.is_sub_type_of(b, a);
                }
                self.is_callable(b)
            }
            _ => {
                if b.is_compound() {
                    return self.is_sub_type_of(b, a);
                }
                self.leaf_super_type_of(a, b)
            }
        }
    }

    fn union_super_type_of(&self, a: &Type, union: &UnionType, b: &Type) -> TrinaryLogic {
        if matches!(b.data(), TypeData::Union(_) | TypeData::Iterable(_)) {
            return self.is_sub_type_of(b, a);
        }
        let result = TrinaryLogic::lazy_or(union.types(), |member| self.is_super_type_of(member, b));
        match b.data() {
            // T ⊆ A whenever T's bound is: no single branch sees that.
            TypeData::Template(template) if !result.is_yes() => {
                result.or(self.is_super_type_of(a, &template.bound))
            }
            _ => result,
        }
    }

    /// `iterable<K, V> ⊇ b` for a non-compound `b`.
    fn iterable_super_type_of(&self, iterable: &IterableType, b: &Type) -> TrinaryLogic {
        if b.is_constant_array().is_yes() && b.is_iterable_at_least_once().is_no() {
            return Yes;
        }
        self.is_iterable(b)
            .and(self.is_super_type_of(&iterable.item, &self.get_iterable_value_type(b)))
            .and(self.is_super_type_of(&iterable.key, &self.get_iterable_key_type(b)))
    }

    /// What an accessory requires, asked of `ty`.
    pub(crate) fn accessory_query(&self, kind: &AccessoryKind, ty: &Type) -> TrinaryLogic {
        match kind {
            AccessoryKind::NonEmptyString => ty.is_non_empty_string(),
            AccessoryKind::NonFalsyString => ty.is_non_falsy_string(),
            AccessoryKind::LiteralString => ty.is_literal_string(),
            AccessoryKind::NumericString => ty.is_numeric_string(),
            AccessoryKind::LowercaseString => ty.is_lowercase_string(),
            AccessoryKind::UppercaseString => ty.is_uppercase_string(),
            AccessoryKind::ArrayList => ty.is_array().and(ty.is_list()),
            AccessoryKind::NonEmptyArray => ty.is_array().and(ty.is_iterable_at_least_once()),
            AccessoryKind::OversizedArray => ty.is_array().and(ty.is_oversized_array()),
            AccessoryKind::HasProperty(name) => self.has_property(ty, name, &UnrestrictedScope),
            AccessoryKind::HasMethod(name) => self.has_method(ty, name, &UnrestrictedScope),
        }
    }

    // =========================================================================
    // Sub-type dispatch (compound candidates)
    // =========================================================================

    fn sub_type_of(&self, b: &Type, a: &Type) -> TrinaryLogic {
        let a_is_composite = matches!(a.data(), TypeData::Union(_) | TypeData::Intersection(_));
        match b.data() {
            TypeData::Never => Yes,
            TypeData::Mixed { .. } => {
                if a.is_mixed() {
                    Yes
                } else {
                    Maybe
                }
            }
            TypeData::Union(union) => TrinaryLogic::extreme_identity(
                union.types().iter().map(|member| self.is_super_type_of(a, member)),
            ),
            TypeData::Intersection(intersection) => {
                if a_is_composite {
                    return self.is_super_type_of(a, b);
                }
                self.intersection_is_sub_type_of(b, intersection, a)
            }
            TypeData::Template(template) => {
                if a_is_composite {
                    return self.is_super_type_of(a, b);
                }
                self.template_is_sub_type_of(template, b, a)
            }
            TypeData::Accessory(kind) => {
                if a_is_composite {
                    return self.is_super_type_of(a, b);
                }
                if let TypeData::Accessory(other) = a.data()
                    && kind.implies(other)
                {
                    return Yes;
                }
                let limit = if a.as_accessory() == Some(kind) { Yes } else { Maybe };
                self.accessory_query(kind, a).and(limit)
            }
            TypeData::Iterable(iterable) => self.iterable_is_sub_type_of(iterable, b, a),
            TypeData::Callable => {
                if a_is_composite {
                    return self.is_super_type_of(a, b);
                }
                let limit = if matches!(a.data(), TypeData::Callable) { Yes } else { Maybe };
                self.is_callable(a).and(limit)
            }
            _ => self.is_super_type_of(a, b),
        }
    }

    fn template_is_sub_type_of(&self, template: &TemplateType, b: &Type, a: &Type) -> TrinaryLogic {
        let TypeData::Template(other) = a.data() else {
            return self.is_super_type_of(a, &template.bound);
        };
        if b.equals(a) {
            return Yes;
        }
        if self.is_super_type_of(&other.bound, &template.bound).is_no()
            && self.is_super_type_of(&template.bound, &other.bound).is_no()
        {
            return No;
        }
        Maybe
    }

    fn iterable_is_sub_type_of(&self, iterable: &IterableType, b: &Type, a: &Type) -> TrinaryLogic {
        if matches!(a.data(), TypeData::Union(_) | TypeData::Intersection(_)) {
            // Every iterable is an array or a Traversable object.
            let as_array = Type::array(iterable.key.clone(), iterable.item.clone());
            let as_object = Type::from_intersection(crate::types::IntersectionType::from_members(
                vec![Type::object("Traversable"), b.clone()],
            ));
            let spread = Type::from_union(UnionType::from_members(vec![as_array, as_object], false));
            return self.is_super_type_of(a, &spread);
        }
        let limit = if matches!(a.data(), TypeData::Iterable(_)) { Yes } else { Maybe };
        if a.is_constant_array().is_yes() && a.is_iterable_at_least_once().is_no() {
            return Maybe;
        }
        limit
            .and(self.is_iterable(a))
            .and(self.is_super_type_of(&self.get_iterable_value_type(a), &iterable.item))
            .and(self.is_super_type_of(&self.get_iterable_key_type(a), &iterable.key))
    }

    // =========================================================================
    // Leaf pairs
    // =========================================================================

    fn leaf_super_type_of(&self, a: &Type, b: &Type) -> TrinaryLogic {
        use TypeData as D;
        match (a.data(), b.data()) {
            (D::Null, D::Null) => Yes,

            (D::Boolean, D::Boolean | D::ConstantBoolean(_)) => Yes,
            (D::ConstantBoolean(x), D::ConstantBoolean(y)) => TrinaryLogic::from_bool(x == y),
            (D::ConstantBoolean(_), D::Boolean) => Maybe,

            (D::Integer, D::Integer | D::ConstantInteger(_)) => Yes,
            (D::ConstantInteger(x), D::ConstantInteger(y)) => TrinaryLogic::from_bool(x == y),
            (D::ConstantInteger(_), D::Integer) => Maybe,

            (D::Float, D::Float | D::ConstantFloat(_)) => Yes,
            (D::ConstantFloat(x), D::ConstantFloat(y)) => TrinaryLogic::from_bool(x == y),
            (D::ConstantFloat(_), D::Float) => Maybe,

            (D::String, D::String | D::ConstantString(_)) => Yes,
            (D::ConstantString(x), D::ConstantString(y)) => TrinaryLogic::from_bool(x == y),
            (D::ConstantString(_), D::String) => Maybe,

            (
                D::ObjectWithoutClass,
                D::ObjectWithoutClass
                | D::Object(_)
                | D::GenericObject(_)
                | D::EnumCase(_)
                | D::Closure(_),
            ) => Yes,
            (
                D::Object(_) | D::GenericObject(_) | D::EnumCase(_) | D::Closure(_),
                D::ObjectWithoutClass,
            ) => Maybe,

            (D::Object(object), D::Closure(_)) => self.class_relation(&object.class_name, "Closure"),
            (D::Object(object), D::Object(_) | D::GenericObject(_) | D::EnumCase(_)) => {
                let other = object_class_name(b).unwrap_or_default();
                self.class_relation(&object.class_name, other)
            }
            (D::GenericObject(x), D::GenericObject(y)) => self.generic_object_super_type_of(x, y),
            (D::GenericObject(x), D::Object(_) | D::EnumCase(_)) => {
                let other = object_class_name(b).unwrap_or_default();
                if self.class_relation(&x.class_name, other).is_no() {
                    No
                } else {
                    Maybe
                }
            }
            (D::EnumCase(_), D::EnumCase(_)) => No,
            (D::EnumCase(case), D::Object(object)) => {
                if self.class_relation(&object.class_name, &case.class_name).is_no() {
                    No
                } else {
                    Maybe
                }
            }
            (D::Closure(x), D::Closure(y)) => self.closure_super_type_of(x, y),
            (D::Closure(_), D::Object(object)) => {
                if self.class_relation(&object.class_name, "Closure").is_no() {
                    No
                } else {
                    Maybe
                }
            }

            (D::Array(x), D::Array(y)) => self
                .is_super_type_of(&x.item, &y.item)
                .and(self.is_super_type_of(&x.key, &y.key)),
            (D::Array(x), D::ConstantArray(y)) => self.array_super_type_of_constant(x, y),
            (D::ConstantArray(x), D::ConstantArray(y)) => self.constant_array_super_type_of(x, y),
            (D::ConstantArray(x), D::Array(y)) => {
                if x.is_empty() {
                    return Maybe;
                }
                let keys = TrinaryLogic::lazy_and(x.keys(), |key| {
                    self.is_super_type_of(&y.key, &key.to_type())
                });
                let values =
                    TrinaryLogic::lazy_and(x.values(), |value| self.is_super_type_of(&y.item, value));
                Maybe.and(keys).and(values)
            }

            _ => No,
        }
    }

    fn array_super_type_of_constant(&self, array: &ArrayType, constant: &ConstantArrayType) -> TrinaryLogic {
        TrinaryLogic::lazy_and(constant.entries(), |(key, value)| {
            self.is_super_type_of(&array.key, &key.to_type())
                .and(self.is_super_type_of(&array.item, value))
        })
    }

    fn constant_array_super_type_of(&self, a: &ConstantArrayType, b: &ConstantArrayType) -> TrinaryLogic {
        if a.len() != b.len() {
            return No;
        }
        TrinaryLogic::lazy_and(a.entries(), |(key, value)| match b.get(key) {
            Some(other) => self.is_super_type_of(value, other),
            None => No,
        })
    }

    fn generic_object_super_type_of(&self, a: &GenericObjectType, b: &GenericObjectType) -> TrinaryLogic {
        let relation = self.class_relation(&a.class_name, &b.class_name);
        if relation.is_no() {
            return No;
        }
        let Some(b_args) = self.ancestor_type_args(&b.class_name, &b.type_args, &a.class_name)
        else {
            return Maybe;
        };
        if a.type_args.len() != b_args.len() {
            return Maybe;
        }
        let variances: Vec<Variance> = match self.class(&a.class_name) {
            Some(class) => class.template_types.iter().map(|t| t.variance).collect(),
            None => Vec::new(),
        };
        TrinaryLogic::lazy_and(a.type_args.iter().zip(&b_args).enumerate(), |(index, (x, y))| {
            let variance = variances.get(index).copied().unwrap_or(Variance::Invariant);
            self.is_valid_variance(variance, x, y)
        })
    }

    /// Whether `b` may stand in for `a` in a position of the given variance.
    pub fn is_valid_variance(&self, variance: Variance, a: &Type, b: &Type) -> TrinaryLogic {
        if (a.is_mixed() && a.as_template().is_none()) || (b.is_mixed() && b.as_template().is_none())
        {
            return Yes;
        }
        if a.as_union().is_some_and(UnionType::is_benevolent) && !self.is_super_type_of(a, b).is_no() {
            return Yes;
        }
        match variance {
            Variance::Invariant => TrinaryLogic::from_bool(a.equals(b)),
            Variance::Covariant => self.is_super_type_of(a, b),
            Variance::Contravariant => self.is_super_type_of(b, a),
            Variance::Bivariant => Yes,
        }
    }

    fn closure_super_type_of(&self, a: &ClosureType, b: &ClosureType) -> TrinaryLogic {
        // `b` may not require more arguments than callers of `a` pass.
        if b.parameters.len() > a.parameters.len() {
            return No;
        }
        let parameters = TrinaryLogic::lazy_and(a.parameters.iter().zip(&b.parameters), |(x, y)| {
            self.is_super_type_of(y, x)
        });
        parameters.and(self.is_super_type_of(&a.return_type, &b.return_type))
    }

    // =========================================================================
    // Acceptance
    // =========================================================================

    fn accepts_inner(&self, a: &Type, b: &Type, strict_types: bool) -> AcceptsResult {
        match a.data() {
            TypeData::Never => return TrinaryLogic::from_bool(b.is_never()).into(),
            TypeData::Mixed { .. } => return AcceptsResult::yes(),
            _ => {}
        }
        if b.is_mixed() || b.is_never() || a.equals(b) {
            return AcceptsResult::yes();
        }

        match a.data() {
            TypeData::Union(union) => {
                if b.is_compound()
                    && !matches!(
                        b.data(),
                        TypeData::Callable | TypeData::Template(_) | TypeData::Intersection(_)
                    )
                {
                    return self.is_accepted_by(b, a, strict_types);
                }
                let mut result = AcceptsResult::no();
                for member in union.types() {
                    result = result.or(self.accepts(member, b, strict_types));
                    if result.is_yes() {
                        return result;
                    }
                }
                if let TypeData::Template(template) = b.data() {
                    result = result.or(self.accepts(a, &template.bound, strict_types));
                }
                result
            }
            TypeData::Intersection(intersection) => {
                self.intersection_accepts(a, intersection, b, strict_types)
            }
            TypeData::Template(template) => {
                if b.is_compound() {
                    return self.is_accepted_by(b, a, strict_types);
                }
                if template.is_argument() {
                    return self.is_super_type_of(a, b).into();
                }
                self.accepts(&template.bound, b, strict_types)
            }
            TypeData::Iterable(iterable) => {
                if b.is_constant_array().is_yes() && b.is_iterable_at_least_once().is_no() {
                    return AcceptsResult::yes();
                }
                if self.is_iterable(b).is_yes() {
                    return self
                        .accepts(&iterable.item, &self.get_iterable_value_type(b), strict_types)
                        .and(self.accepts(&iterable.key, &self.get_iterable_key_type(b), strict_types));
                }
                if b.is_compound() {
                    return self.is_accepted_by(b, a, strict_types);
                }
                AcceptsResult::no()
            }
            TypeData::Callable => {
                if b.is_compound() && !matches!(b.data(), TypeData::Callable) {
                    return self.is_accepted_by(b, a, strict_types);
                }
                self.is_callable(b).into()
            }
            TypeData::Accessory(kind) => {
                if b.is_compound() {
                    return self.is_accepted_by(b, a, strict_types);
                }
                self.accessory_query(kind, b).into()
            }
            _ => {
                if b.is_compound() {
                    return self.is_accepted_by(b, a, strict_types);
                }
                self.leaf_accepts(a, b, strict_types)
            }
        }
    }

    fn leaf_accepts(&self, a: &Type, b: &Type, strict_types: bool) -> AcceptsResult {
        use TypeData as D;
        match (a.data(), b.data()) {
            (D::Float, D::Integer | D::ConstantInteger(_)) => AcceptsResult::yes(),
            (D::String, D::Object(_) | D::GenericObject(_)) if !strict_types => {
                self.has_method(b, "__toString", &UnrestrictedScope).into()
            }
            (D::Array(x), D::Array(y)) => self
                .accepts(&x.item, &y.item, strict_types)
                .and(self.accepts(&x.key, &y.key, strict_types)),
            (D::Array(x), D::ConstantArray(y)) => {
                let mut result = AcceptsResult::yes();
                for (key, value) in y.entries() {
                    result = result
                        .and(self.accepts(&x.key, &key.to_type(), strict_types))
                        .and(self.accepts(&x.item, value, strict_types));
                    if result.is_no() {
                        break;
                    }
                }
                result
            }
            (D::ConstantArray(x), D::ConstantArray(y)) => {
                if x.len() != y.len() {
                    return AcceptsResult::no();
                }
                let mut result = AcceptsResult::yes();
                for (key, value) in x.entries() {
                    let Some(other) = y.get(key) else {
                        return AcceptsResult::no();
                    };
                    result = result.and(self.accepts(value, other, strict_types));
                }
                result
            }
            _ => self.leaf_super_type_of(a, b).into(),
        }
    }

    fn accepted_by_inner(&self, b: &Type, a: &Type, strict_types: bool) -> AcceptsResult {
        match b.data() {
            TypeData::Mixed { .. } | TypeData::Never => AcceptsResult::yes(),
            TypeData::Union(union) => {
                let results = union
                    .types()
                    .iter()
                    .map(|member| self.accepts(a, member, strict_types));
                if union.is_benevolent() {
                    AcceptsResult::max_min(results)
                } else {
                    AcceptsResult::extreme_identity(results)
                }
            }
            TypeData::Intersection(intersection) => {
                self.intersection_is_accepted_by(b, intersection, a, strict_types)
            }
            TypeData::Template(template) => self.accepts(a, &template.bound, strict_types),
            _ => self.is_sub_type_of(b, a).into(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
