//! Intersection-specific behaviour.
//!
//! Most queries on an intersection evaluate every member and fold: trinary
//! answers with `lazy_max_min`, type answers by intersecting the member
//! results again. This module holds the places where an intersection knows
//! more than its members do: acceptance reasons, the oversized-array
//! widening, non-empty-list offsets, and the conversions that short-circuit
//! on string refinements.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::array_ops::ArrayOperation;
use crate::engine::TypeEngine;
use crate::format::VerbosityLevel;
use crate::trinary::AcceptsResult;
use crate::trinary::TrinaryLogic::{self, Yes};
use crate::types::{IntersectionType, Type, TypeData};

impl TypeEngine<'_> {
    // =========================================================================
    // Relations
    // =========================================================================

    /// Every member must accept `b`. When the answer is not Yes, explain
    /// the list and non-empty requirements `b` does not guarantee.
    pub(crate) fn intersection_accepts(
        &self,
        a: &Type,
        intersection: &IntersectionType,
        b: &Type,
        strict_types: bool,
    ) -> AcceptsResult {
        let mut result = AcceptsResult::yes();
        for member in intersection.types() {
            result = result.and(self.accepts(member, b, strict_types));
        }
        if result.is_yes() {
            return result;
        }

        let level = VerbosityLevel::recommended_for(a, b);
        let is_list = b.is_list();
        if a.is_list().is_yes() && !is_list.is_yes() {
            let verb = if is_list.is_no() { "is not" } else { "might not be" };
            result = result.with_reason(format!("{} {verb} a list.", b.describe(level)));
        }
        let non_empty = b.is_iterable_at_least_once();
        if a.is_iterable_at_least_once().is_yes() && !non_empty.is_yes() {
            let verb = if non_empty.is_no() { "is" } else { "might be" };
            result = result.with_reason(format!("{} {verb} empty.", b.describe(level)));
        }
        result
    }

    /// `a ⊇ b` decided from the intersection `b`: one member inside `a` is
    /// enough.
    pub(crate) fn intersection_is_sub_type_of(
        &self,
        b: &Type,
        intersection: &IntersectionType,
        a: &Type,
    ) -> TrinaryLogic {
        let result =
            TrinaryLogic::max_min(intersection.types().iter().map(|member| self.is_super_type_of(a, member)));
        widen_oversized(b, result)
    }

    pub(crate) fn intersection_is_accepted_by(
        &self,
        b: &Type,
        intersection: &IntersectionType,
        a: &Type,
        strict_types: bool,
    ) -> AcceptsResult {
        let result = AcceptsResult::max_min(
            intersection
                .types()
                .iter()
                .map(|member| self.accepts(a, member, strict_types)),
        );
        if b.is_oversized_array().is_yes() && !result.is_no() {
            return AcceptsResult::new(Yes, result.reasons);
        }
        result
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    pub(crate) fn intersection_has_offset_value_type(
        &self,
        ty: &Type,
        intersection: &IntersectionType,
        offset: &Type,
    ) -> TrinaryLogic {
        if is_non_empty_list(ty)
            && self
                .is_super_type_of(&Type::constant_int(0), &self.to_array_key(offset))
                .is_yes()
        {
            return Yes;
        }
        TrinaryLogic::lazy_max_min(intersection.types(), |member| {
            self.has_offset_value_type(member, offset)
        })
    }

    pub(crate) fn intersection_array_operation(
        &self,
        ty: &Type,
        intersection: &IntersectionType,
        op: ArrayOperation<'_>,
    ) -> Type {
        let oversized = ty.is_oversized_array().is_yes();
        let results: Vec<Type> = intersection
            .types()
            .iter()
            .map(|member| match op {
                ArrayOperation::SetOffset {
                    offset: Some(offset),
                    value,
                    ..
                } if oversized => self
                    .oversized_set_offset(member, offset, value)
                    .unwrap_or_else(|| self.array_operation(member, op)),
                _ => self.array_operation(member, op),
            })
            .collect();
        let result = self.intersect(results);

        match op {
            ArrayOperation::GetOffset { .. } if oversized => self.to_benevolent_union(result),
            // Writing index 0 or 1 into a non-empty list keeps it a list.
            ArrayOperation::SetOffset {
                offset: Some(offset),
                ..
            } if is_non_empty_list(ty)
                && self
                    .is_super_type_of(&Type::constant_int(1), offset)
                    .is_yes() =>
            {
                self.intersect(vec![result, Type::array_list()])
            }
            _ => result,
        }
    }

    /// An oversized array keeps growing as a general array instead of
    /// becoming a shape when a literal key covering all its keys is written.
    fn oversized_set_offset(&self, member: &Type, offset: &Type, value: &Type) -> Option<Type> {
        let TypeData::Array(array) = member.data() else {
            return None;
        };
        if !matches!(
            offset.data(),
            TypeData::ConstantInteger(_) | TypeData::ConstantString(_)
        ) || !self.is_super_type_of(offset, &array.key).is_yes()
        {
            return None;
        }
        Some(self.intersect(vec![
            Type::array(
                self.union(vec![array.key.clone(), offset.clone()]),
                self.union(vec![array.item.clone(), value.clone()]),
            ),
            Type::non_empty_array(),
        ]))
    }

    fn to_benevolent_union(&self, ty: Type) -> Type {
        match ty.as_union() {
            Some(union) if !union.is_benevolent() => self.benevolent_union(union.types().to_vec()),
            _ => ty,
        }
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    pub(crate) fn intersection_to_boolean(&self, intersection: &IntersectionType) -> Type {
        let result = self.intersect(
            intersection
                .types()
                .iter()
                .map(|member| self.to_boolean(member))
                .collect(),
        );
        if result.is_boolean().is_yes() {
            result
        } else {
            Type::bool()
        }
    }

    pub(crate) fn intersection_to_array_key(
        &self,
        ty: &Type,
        intersection: &IntersectionType,
    ) -> Type {
        if ty.is_numeric_string().is_yes() {
            return Type::int();
        }
        if ty.is_string().is_yes() {
            return ty.clone();
        }
        self.intersect(
            intersection
                .types()
                .iter()
                .map(|member| self.to_array_key(member))
                .collect(),
        )
    }

    // =========================================================================
    // Finite values
    // =========================================================================

    /// Values common to every member, keyed by their precise description.
    pub(crate) fn intersection_finite_types(&self, intersection: &IntersectionType) -> Vec<Type> {
        let per_member: Vec<Vec<Type>> = intersection
            .types()
            .iter()
            .map(|member| self.get_finite_types(member))
            .collect();
        let result = common_values(&per_member);
        if result.len() > self.options().finite_types_limit {
            debug!(
                count = result.len(),
                limit = self.options().finite_types_limit,
                "finite types of intersection over the limit"
            );
            return Vec::new();
        }
        result
    }

    pub(crate) fn intersection_enum_cases(&self, intersection: &IntersectionType) -> Vec<Type> {
        let per_member: Vec<Vec<Type>> = intersection
            .types()
            .iter()
            .map(|member| self.get_enum_cases(member))
            .collect();
        common_values(&per_member)
    }
}

fn is_non_empty_list(ty: &Type) -> bool {
    ty.is_list().is_yes() && ty.is_iterable_at_least_once().is_yes()
}

fn widen_oversized(ty: &Type, result: TrinaryLogic) -> TrinaryLogic {
    if ty.is_oversized_array().is_yes() && !result.is_no() {
        return Yes;
    }
    result
}

/// Values of the first set whose key appears in every other set.
fn common_values(sets: &[Vec<Type>]) -> Vec<Type> {
    let Some((first, rest)) = sets.split_first() else {
        return Vec::new();
    };
    let rest_keys: Vec<FxHashSet<String>> = rest
        .iter()
        .map(|set| {
            set.iter()
                .map(|ty| ty.describe(VerbosityLevel::Precise))
                .collect()
        })
        .collect();
    let mut seen = FxHashSet::default();
    first
        .iter()
        .filter(|ty| {
            let key = ty.describe(VerbosityLevel::Precise);
            rest_keys.iter().all(|keys| keys.contains(&key)) && seen.insert(key)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "../tests/intersection_tests.rs"]
mod tests;
