//! Union, intersection and removal with normalization.
//!
//! This is the only place that builds composite types from arbitrary input.
//! Results are canonical: nested composites are flattened, duplicates and
//! subsumed members are dropped, and members are sorted, so the output does
//! not depend on input order and re-normalizing a result returns an equal
//! type.

use psz_common::limits::MAX_INTERSECTION_DISTRIBUTION;
use tracing::{debug, trace};

use crate::engine::TypeEngine;
use crate::format::sort_types;
use crate::types::{
    AccessoryKind, ArrayType, ConstantArrayType, IntersectionType, Type, TypeData,
    TypeListBuffer, UnionType,
};

impl TypeEngine<'_> {
    // =========================================================================
    // Union
    // =========================================================================

    /// Normalized union. An empty input is `never`.
    pub fn union(&self, types: Vec<Type>) -> Type {
        self.union_with(types, false)
    }

    /// Union flagged benevolent: produced where precision was already given
    /// up, and queried with the lenient folds.
    pub fn benevolent_union(&self, types: Vec<Type>) -> Type {
        self.union_with(types, true)
    }

    fn union_with(&self, types: Vec<Type>, benevolent: bool) -> Type {
        let flat = flatten_union_members(types);
        self.guarded(
            "union",
            || build_union(dedup(flat.clone()), benevolent),
            || {
                let result = self.normalize_union(flat.clone(), benevolent);
                trace!(input = flat.len(), result = %result, benevolent, "union");
                result
            },
        )
    }

    fn normalize_union(&self, flat: TypeListBuffer, benevolent: bool) -> Type {
        if let Some(mixed) = flat.iter().find(|ty| ty.is_mixed()) {
            return mixed.clone();
        }
        let mut members = dedup(flat.into_iter().filter(|ty| !ty.is_never()).collect());
        if members.len() <= 1 {
            return build_union(members, benevolent);
        }

        merge_constant_booleans(&mut members);
        self.merge_general_arrays(&mut members);
        self.merge_constant_arrays(&mut members);

        let sorted = sort_types(members.into_vec());
        let kept = self.drop_subsumed_union_members(sorted);
        build_union(kept.into_iter().collect(), benevolent)
    }

    fn merge_general_arrays(&self, members: &mut TypeListBuffer) {
        let arrays: Vec<(usize, ArrayType)> = members
            .iter()
            .enumerate()
            .filter_map(|(index, ty)| match ty.data() {
                TypeData::Array(array) => Some((index, array.clone())),
                _ => None,
            })
            .collect();
        if arrays.len() < 2 {
            return;
        }
        let key = self.union(arrays.iter().map(|(_, array)| array.key.clone()).collect());
        let item = self.union(arrays.iter().map(|(_, array)| array.item.clone()).collect());
        let first = arrays[0].0;
        for (index, _) in arrays.iter().skip(1).rev() {
            members.remove(*index);
        }
        members[first] = Type::array(key, item);
    }

    /// `array{a: 1, b: int}|array{a: 2, b: int}` becomes
    /// `array{a: 1|2, b: int}`: same keys, exactly one differing value.
    fn merge_constant_arrays(&self, members: &mut TypeListBuffer) {
        loop {
            let Some((left, right, merged)) = self.find_mergeable_constant_arrays(members) else {
                return;
            };
            members[left] = merged;
            members.remove(right);
        }
    }

    fn find_mergeable_constant_arrays(&self, members: &[Type]) -> Option<(usize, usize, Type)> {
        for (left, a) in members.iter().enumerate() {
            let Some(a_array) = a.as_constant_array() else {
                continue;
            };
            for (offset, b) in members[left + 1..].iter().enumerate() {
                let Some(b_array) = b.as_constant_array() else {
                    continue;
                };
                if a_array.keys() != b_array.keys() {
                    continue;
                }
                let differing: Vec<usize> = a_array
                    .values()
                    .iter()
                    .zip(b_array.values())
                    .enumerate()
                    .filter(|(_, (x, y))| !x.equals(y))
                    .map(|(index, _)| index)
                    .collect();
                if let [index] = differing[..] {
                    let mut entries = a_array.owned_entries();
                    entries[index].1 = self.union(vec![
                        a_array.values()[index].clone(),
                        b_array.values()[index].clone(),
                    ]);
                    let merged = Type::constant_array(ConstantArrayType::new(entries));
                    return Some((left, left + 1 + offset, merged));
                }
            }
        }
        None
    }

    /// Drop members another member is a Yes-supertype of. Templates are
    /// never dropped: `T|int` stays apart even when `T` is bounded by int.
    fn drop_subsumed_union_members(&self, members: Vec<Type>) -> Vec<Type> {
        let mut removed = vec![false; members.len()];
        for (index, ty) in members.iter().enumerate() {
            if ty.as_template().is_some() {
                continue;
            }
            let subsumed = members.iter().enumerate().any(|(other_index, other)| {
                other_index != index
                    && !removed[other_index]
                    && self.is_super_type_of(other, ty).is_yes()
            });
            removed[index] = subsumed;
        }
        members
            .into_iter()
            .zip(removed)
            .filter_map(|(ty, removed)| (!removed).then_some(ty))
            .collect()
    }

    // =========================================================================
    // Intersection
    // =========================================================================

    /// Normalized intersection. An empty input is `mixed`; contradictory
    /// members collapse to `never`.
    pub fn intersect(&self, types: Vec<Type>) -> Type {
        let flat = flatten_intersection_members(types);
        self.guarded(
            "intersect",
            || build_intersection(dedup(flat.clone())),
            || {
                let result = self.normalize_intersection(flat.clone());
                trace!(input = flat.len(), result = %result, "intersect");
                result
            },
        )
    }

    fn normalize_intersection(&self, flat: TypeListBuffer) -> Type {
        if let Some(never) = flat.iter().find(|ty| ty.is_never()) {
            return never.clone();
        }
        let mut members = dedup(flat.iter().filter(|ty| !ty.is_mixed()).cloned().collect());
        if members.is_empty() {
            return flat.first().cloned().unwrap_or_else(Type::mixed);
        }
        if members.len() == 1 {
            return members.remove(0);
        }

        if let Some(distributed) = self.distribute_over_union(&members) {
            return distributed;
        }
        self.merge_intersected_arrays(&mut members);

        let mut members = sort_types(members.into_vec());
        let mut i = 0;
        'outer: while i < members.len() {
            let mut j = i + 1;
            while j < members.len() {
                let a_covers_b = self.is_super_type_of(&members[i], &members[j]);
                if a_covers_b.is_yes() {
                    members.remove(i);
                    continue 'outer;
                }
                let b_covers_a = self.is_super_type_of(&members[j], &members[i]);
                if b_covers_a.is_yes() {
                    members.remove(j);
                    continue;
                }
                if a_covers_b.is_no() || b_covers_a.is_no() {
                    if !self.both_hold_empty_array(&members[i], &members[j]) {
                        return Type::never();
                    }
                    members.remove(j);
                    members[i] = Type::empty_array();
                    return self.intersect(members);
                }
                j += 1;
            }
            i += 1;
        }

        build_intersection(sort_types(members).into_iter().collect())
    }

    /// Iterables disjoint in their keys or values still share `array{}`.
    fn both_hold_empty_array(&self, a: &Type, b: &Type) -> bool {
        let empty = Type::empty_array();
        self.is_super_type_of(a, &empty).is_yes() && self.is_super_type_of(b, &empty).is_yes()
    }

    /// `(A|B) & C` is `(A&C)|(B&C)`. Gives up (keeping the union as a
    /// member) when the distribution would exceed the limit.
    fn distribute_over_union(&self, members: &[Type]) -> Option<Type> {
        let position = members.iter().position(|ty| ty.as_union().is_some())?;
        let union = members[position].as_union()?;

        let size: usize = members
            .iter()
            .filter_map(|ty| ty.as_union().map(|union| union.types().len()))
            .try_fold(1usize, |acc, len| acc.checked_mul(len))
            .unwrap_or(usize::MAX);
        if size > MAX_INTERSECTION_DISTRIBUTION {
            debug!(
                size,
                limit = MAX_INTERSECTION_DISTRIBUTION,
                "intersection distribution abandoned"
            );
            return None;
        }

        let rest: Vec<Type> = members
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != position)
            .map(|(_, ty)| ty.clone())
            .collect();
        let branches: Vec<Type> = union
            .types()
            .iter()
            .map(|branch| {
                let mut parts = rest.clone();
                parts.push(branch.clone());
                self.intersect(parts)
            })
            .collect();
        Some(if union.is_benevolent() {
            self.benevolent_union(branches)
        } else {
            self.union(branches)
        })
    }

    /// `array<K1, V1> & array<K2, V2>` is `array<K1&K2, V1&V2>`: an empty
    /// array inhabits both.
    fn merge_intersected_arrays(&self, members: &mut TypeListBuffer) {
        let arrays: Vec<(usize, ArrayType)> = members
            .iter()
            .enumerate()
            .filter_map(|(index, ty)| match ty.data() {
                TypeData::Array(array) => Some((index, array.clone())),
                _ => None,
            })
            .collect();
        if arrays.len() < 2 {
            return;
        }
        let key = self.intersect(arrays.iter().map(|(_, array)| array.key.clone()).collect());
        let item = self.intersect(arrays.iter().map(|(_, array)| array.item.clone()).collect());
        let first = arrays[0].0;
        for (index, _) in arrays.iter().skip(1).rev() {
            members.remove(*index);
        }
        members[first] = Type::array(key, item);
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// `from` without the values of `to_remove`. When the subtraction is not
    /// expressible, `from` comes back unchanged.
    pub fn remove(&self, from: &Type, to_remove: &Type) -> Type {
        self.guarded("remove", || from.clone(), || {
            if let TypeData::Union(union) = to_remove.data() {
                return union
                    .types()
                    .iter()
                    .fold(from.clone(), |acc, member| self.remove(&acc, member));
            }
            let covered = self.is_super_type_of(to_remove, from);
            if covered.is_yes() {
                return Type::never();
            }
            if covered.is_no() {
                return from.clone();
            }
            self.try_remove(from, to_remove)
                .unwrap_or_else(|| from.clone())
        })
    }

    /// The narrowed type, or `None` when `from` cannot express the
    /// subtraction.
    pub fn try_remove(&self, from: &Type, to_remove: &Type) -> Option<Type> {
        match (from.data(), to_remove.data()) {
            (TypeData::Union(union), _) => Some(
                self.union(
                    union
                        .types()
                        .iter()
                        .map(|member| self.remove(member, to_remove))
                        .collect(),
                ),
            ),
            (TypeData::Intersection(intersection), _) => Some(
                self.intersect(
                    intersection
                        .types()
                        .iter()
                        .map(|member| self.remove(member, to_remove))
                        .collect(),
                ),
            ),
            (TypeData::Boolean, TypeData::ConstantBoolean(value)) => {
                Some(Type::constant_bool(!value))
            }
            (TypeData::String, TypeData::ConstantString(value)) if value.is_empty() => {
                Some(self.intersect(vec![Type::string(), Type::non_empty_string()]))
            }
            (TypeData::Accessory(AccessoryKind::NonEmptyString), TypeData::ConstantString(value))
                if &**value == "0" =>
            {
                Some(self.intersect(vec![from.clone(), Type::non_falsy_string()]))
            }
            (TypeData::Array(_), TypeData::ConstantArray(array)) if array.is_empty() => {
                Some(self.intersect(vec![from.clone(), Type::non_empty_array()]))
            }
            (TypeData::Array(_), TypeData::Accessory(AccessoryKind::NonEmptyArray)) => {
                Some(Type::empty_array())
            }
            _ => None,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn flatten_union_members(types: Vec<Type>) -> TypeListBuffer {
    let mut flat = TypeListBuffer::new();
    for ty in types {
        match ty.data() {
            TypeData::Union(union) => flat.extend(union.types().iter().cloned()),
            _ => flat.push(ty),
        }
    }
    flat
}

fn flatten_intersection_members(types: Vec<Type>) -> TypeListBuffer {
    let mut flat = TypeListBuffer::new();
    for ty in types {
        match ty.data() {
            TypeData::Intersection(intersection) => {
                flat.extend(intersection.types().iter().cloned());
            }
            _ => flat.push(ty),
        }
    }
    flat
}

/// Keep the first of each group of structurally equal types.
fn dedup(types: TypeListBuffer) -> TypeListBuffer {
    let mut unique = TypeListBuffer::new();
    for ty in types {
        if !unique.iter().any(|seen| seen.equals(&ty)) {
            unique.push(ty);
        }
    }
    unique
}

fn merge_constant_booleans(members: &mut TypeListBuffer) {
    let has = |members: &TypeListBuffer, wanted: bool| {
        members
            .iter()
            .any(|ty| matches!(ty.data(), TypeData::ConstantBoolean(value) if *value == wanted))
    };
    if has(members, true) && has(members, false) {
        members.retain(|ty| !matches!(ty.data(), TypeData::ConstantBoolean(_)));
        if !members.iter().any(|ty| matches!(ty.data(), TypeData::Boolean)) {
            members.push(Type::bool());
        }
    }
}

fn build_union(mut members: TypeListBuffer, benevolent: bool) -> Type {
    match members.len() {
        0 => Type::never(),
        1 => members.remove(0),
        _ => Type::from_union(UnionType::from_members(members.into_vec(), benevolent)),
    }
}

fn build_intersection(mut members: TypeListBuffer) -> Type {
    match members.len() {
        0 => Type::mixed(),
        1 => members.remove(0),
        _ => Type::from_intersection(IntersectionType::from_members(members.into_vec())),
    }
}

#[cfg(test)]
#[path = "../tests/combinator_tests.rs"]
mod tests;
