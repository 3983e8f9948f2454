//! Array and offset operations.
//!
//! Every operation is one case of [`ArrayOperation`] and is answered per
//! variant by `array_operation`: unions union the member results,
//! intersections intersect them, templates answer through their bound.
//! Constant arrays compute exact shapes and fall back to the general array
//! they degrade to when an argument is not a literal.
//!
//! Types that cannot take part in an operation answer `never`. Accessories
//! answer `mixed` where they carry no information, so that intersecting the
//! member results keeps the informative member.

use crate::engine::TypeEngine;
use crate::trinary::TrinaryLogic::{self, Maybe, No, Yes};
use crate::types::{
    AccessoryKind, ArrayKey, ArrayType, ConstantArrayType, IterableType, Type, TypeData,
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum ArrayOperation<'t> {
    IterableKey,
    IterableValue,
    FirstKey,
    LastKey,
    FirstValue,
    LastValue,
    Keys,
    Values,
    Chunk {
        length: &'t Type,
        preserve_keys: TrinaryLogic,
    },
    FillKeys {
        value: &'t Type,
    },
    Flip,
    IntersectKey {
        other: &'t Type,
    },
    Pop,
    Shift,
    Reverse {
        preserve_keys: TrinaryLogic,
    },
    Search {
        needle: &'t Type,
    },
    Shuffle,
    Slice {
        offset: &'t Type,
        length: &'t Type,
        preserve_keys: TrinaryLogic,
    },
    Size,
    GetOffset {
        offset: &'t Type,
    },
    /// `offset: None` is an append (`$a[] = $v`).
    SetOffset {
        offset: Option<&'t Type>,
        value: &'t Type,
        union_values: bool,
    },
    SetExistingOffset {
        offset: &'t Type,
        value: &'t Type,
    },
    UnsetOffset {
        offset: &'t Type,
    },
}

impl ArrayOperation<'_> {
    /// The answer for an operand that tells nothing.
    fn unknown(self) -> Type {
        match self {
            Self::Size => Type::int(),
            _ => Type::mixed(),
        }
    }
}

impl TypeEngine<'_> {
    // =========================================================================
    // Public surface
    // =========================================================================

    pub fn get_iterable_key_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::IterableKey)
    }

    pub fn get_iterable_value_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::IterableValue)
    }

    pub fn get_first_iterable_key_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::FirstKey)
    }

    pub fn get_last_iterable_key_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::LastKey)
    }

    pub fn get_first_iterable_value_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::FirstValue)
    }

    pub fn get_last_iterable_value_type(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::LastValue)
    }

    pub fn get_offset_value_type(&self, ty: &Type, offset: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::GetOffset { offset })
    }

    /// Write `value` at `offset`, or append when `offset` is `None`.
    /// With `union_values`, a write at a non-literal offset keeps the old
    /// item type next to the new one.
    pub fn set_offset_value_type(
        &self,
        ty: &Type,
        offset: Option<&Type>,
        value: &Type,
        union_values: bool,
    ) -> Type {
        self.array_operation(
            ty,
            ArrayOperation::SetOffset {
                offset,
                value,
                union_values,
            },
        )
    }

    /// Overwrite an offset known to exist: the shape does not change.
    pub fn set_existing_offset_value_type(&self, ty: &Type, offset: &Type, value: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::SetExistingOffset { offset, value })
    }

    pub fn unset_offset(&self, ty: &Type, offset: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::UnsetOffset { offset })
    }

    pub fn get_keys_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Keys)
    }

    pub fn get_values_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Values)
    }

    pub fn chunk_array(&self, ty: &Type, length: &Type, preserve_keys: TrinaryLogic) -> Type {
        self.array_operation(
            ty,
            ArrayOperation::Chunk {
                length,
                preserve_keys,
            },
        )
    }

    pub fn fill_keys_array(&self, ty: &Type, value: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::FillKeys { value })
    }

    pub fn flip_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Flip)
    }

    pub fn intersect_key_array(&self, ty: &Type, other: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::IntersectKey { other })
    }

    pub fn pop_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Pop)
    }

    pub fn shift_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Shift)
    }

    pub fn reverse_array(&self, ty: &Type, preserve_keys: TrinaryLogic) -> Type {
        self.array_operation(ty, ArrayOperation::Reverse { preserve_keys })
    }

    /// Result of searching `needle`: the matching keys, or `false`.
    pub fn search_array(&self, ty: &Type, needle: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Search { needle })
    }

    pub fn shuffle_array(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Shuffle)
    }

    pub fn slice_array(
        &self,
        ty: &Type,
        offset: &Type,
        length: &Type,
        preserve_keys: TrinaryLogic,
    ) -> Type {
        self.array_operation(
            ty,
            ArrayOperation::Slice {
                offset,
                length,
                preserve_keys,
            },
        )
    }

    pub fn get_array_size(&self, ty: &Type) -> Type {
        self.array_operation(ty, ArrayOperation::Size)
    }

    /// Whether reading `offset` from `ty` finds a value.
    pub fn has_offset_value_type(&self, ty: &Type, offset: &Type) -> TrinaryLogic {
        self.guarded("has_offset_value_type", || Maybe, || self.has_offset(ty, offset))
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub(crate) fn array_operation(&self, ty: &Type, op: ArrayOperation<'_>) -> Type {
        self.guarded("array_operation", || op.unknown(), || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Mixed { .. } | TypeData::Callable => op.unknown(),
            TypeData::Union(union) => {
                let results: Vec<Type> = union
                    .types()
                    .iter()
                    .map(|member| self.array_operation(member, op))
                    .collect();
                if union.is_benevolent() {
                    self.benevolent_union(results)
                } else {
                    self.union(results)
                }
            }
            TypeData::Intersection(intersection) => {
                self.intersection_array_operation(ty, intersection, op)
            }
            TypeData::Template(template) => self.array_operation(&template.bound, op),
            TypeData::Array(array) => self.general_array_operation(ty, array, op),
            TypeData::ConstantArray(array) => self.constant_array_operation(ty, array, op),
            TypeData::Iterable(iterable) => iterable_operation(iterable, op),
            TypeData::Accessory(kind) => self.accessory_operation(ty, kind, op),
            TypeData::String | TypeData::ConstantString(_) => self.string_operation(ty, op),
            TypeData::ObjectWithoutClass
            | TypeData::Object(_)
            | TypeData::GenericObject(_)
            | TypeData::EnumCase(_)
            | TypeData::Closure(_) => self.object_operation(ty, op),
            TypeData::Null => match op {
                ArrayOperation::GetOffset { .. } => Type::null(),
                // Writing to null creates an array.
                ArrayOperation::SetOffset { .. } => {
                    self.array_operation(&Type::empty_array(), op)
                }
                _ => Type::never(),
            },
            TypeData::Boolean
            | TypeData::ConstantBoolean(_)
            | TypeData::Integer
            | TypeData::ConstantInteger(_)
            | TypeData::Float
            | TypeData::ConstantFloat(_) => Type::never(),
        })
    }

    fn has_offset(&self, ty: &Type, offset: &Type) -> TrinaryLogic {
        match ty.data() {
            TypeData::Never => Yes,
            TypeData::Mixed { .. } | TypeData::Callable | TypeData::Iterable(_) => Maybe,
            TypeData::Union(union) => TrinaryLogic::extreme_identity(
                union
                    .types()
                    .iter()
                    .map(|member| self.has_offset_value_type(member, offset)),
            ),
            TypeData::Intersection(intersection) => {
                self.intersection_has_offset_value_type(ty, intersection, offset)
            }
            TypeData::Template(template) => self.has_offset_value_type(&template.bound, offset),
            TypeData::Array(array) => {
                let key = self.to_array_key(offset);
                if self.is_super_type_of(&array.key, &key).is_no() {
                    No
                } else {
                    Maybe
                }
            }
            TypeData::ConstantArray(array) => match ArrayKey::from_type(offset) {
                Some(key) => TrinaryLogic::from_bool(array.get(&key).is_some()),
                None => {
                    let key = self.to_array_key(offset);
                    let reachable = array
                        .keys()
                        .iter()
                        .any(|candidate| !self.is_super_type_of(&key, &candidate.to_type()).is_no());
                    if reachable { Maybe } else { No }
                }
            },
            TypeData::String | TypeData::ConstantString(_) => {
                if let (TypeData::ConstantString(value), TypeData::ConstantInteger(index)) =
                    (ty.data(), offset.data())
                {
                    return TrinaryLogic::from_bool(string_offset(value, *index).is_some());
                }
                offset.is_integer().and(Maybe)
            }
            TypeData::Accessory(_) => Maybe,
            TypeData::ObjectWithoutClass
            | TypeData::Object(_)
            | TypeData::GenericObject(_)
            | TypeData::EnumCase(_)
            | TypeData::Closure(_) => {
                if self.is_offset_accessible(ty).is_no() {
                    No
                } else {
                    Maybe
                }
            }
            TypeData::Null
            | TypeData::Boolean
            | TypeData::ConstantBoolean(_)
            | TypeData::Integer
            | TypeData::ConstantInteger(_)
            | TypeData::Float
            | TypeData::ConstantFloat(_) => No,
        }
    }

    // =========================================================================
    // General arrays
    // =========================================================================

    fn general_array_operation(&self, ty: &Type, array: &ArrayType, op: ArrayOperation<'_>) -> Type {
        use ArrayOperation as Op;
        match op {
            Op::IterableKey | Op::FirstKey | Op::LastKey => self.general_array_key(array),
            Op::IterableValue | Op::FirstValue | Op::LastValue => array.item.clone(),
            Op::Keys => self.list_of(self.general_array_key(array)),
            Op::Values | Op::Shuffle => self.list_of(array.item.clone()),
            Op::Chunk { preserve_keys, .. } => {
                let chunk = if preserve_keys.is_yes() {
                    ty.clone()
                } else {
                    self.list_of(array.item.clone())
                };
                let chunk = self.intersect(vec![chunk, Type::non_empty_array()]);
                self.list_of(chunk)
            }
            Op::FillKeys { value } => Type::array(self.to_array_key(&array.item), value.clone()),
            Op::Flip => Type::array(self.to_array_key(&array.item), self.general_array_key(array)),
            Op::IntersectKey { other } => {
                let other_key = self.get_iterable_key_type(other);
                let covered = self.is_super_type_of(&other_key, &array.key);
                if covered.is_no() {
                    Type::empty_array()
                } else if covered.is_yes() {
                    ty.clone()
                } else {
                    Type::array(other_key, array.item.clone())
                }
            }
            Op::Pop | Op::Shift | Op::Reverse { .. } => ty.clone(),
            Op::Search { .. } => self.union(vec![array.key.clone(), Type::constant_bool(false)]),
            Op::Slice {
                length,
                preserve_keys,
                ..
            } => {
                if matches!(length.data(), TypeData::ConstantInteger(0)) {
                    return Type::empty_array();
                }
                if preserve_keys.is_no() && array.key.is_integer().is_yes() {
                    return self.list_of(array.item.clone());
                }
                ty.clone()
            }
            Op::Size => Type::int(),
            Op::GetOffset { offset } => {
                let key = self.to_array_key(offset);
                if self.is_super_type_of(&array.key, &key).is_no() {
                    Type::never()
                } else {
                    array.item.clone()
                }
            }
            Op::SetOffset {
                offset,
                value,
                union_values,
            } => self.general_array_set_offset(array, offset, value, union_values),
            Op::SetExistingOffset { value, .. } => Type::array(
                array.key.clone(),
                self.union(vec![array.item.clone(), value.clone()]),
            ),
            Op::UnsetOffset { offset } => {
                let key = self.to_array_key(offset);
                let literal = matches!(
                    key.data(),
                    TypeData::ConstantInteger(_) | TypeData::ConstantString(_)
                );
                if !literal || self.is_super_type_of(&array.key, &key).is_no() {
                    return ty.clone();
                }
                let remaining = self.remove(&array.key, &key);
                if remaining.is_never() {
                    Type::empty_array()
                } else {
                    Type::array(remaining, array.item.clone())
                }
            }
        }
    }

    /// `mixed` keys read back as the benevolent `int|string`.
    fn general_array_key(&self, array: &ArrayType) -> Type {
        if array.key.is_mixed() {
            return self.benevolent_union(vec![Type::int(), Type::string()]);
        }
        array.key.clone()
    }

    fn general_array_set_offset(
        &self,
        array: &ArrayType,
        offset: Option<&Type>,
        value: &Type,
        union_values: bool,
    ) -> Type {
        let offset = match offset {
            Some(offset) => self.to_array_key(offset),
            None => {
                let integer_keys = array.key.is_integer();
                if integer_keys.is_no() {
                    Type::int()
                } else if integer_keys.is_yes() {
                    array.key.clone()
                } else {
                    self.union(vec![Type::int(), array.key.clone()])
                }
            }
        };
        let literal = matches!(
            offset.data(),
            TypeData::ConstantInteger(_) | TypeData::ConstantString(_)
        );
        if literal {
            // Every existing key is this one: the array now holds exactly it.
            if self.is_super_type_of(&offset, &array.key).is_yes()
                && let Some(key) = ArrayKey::from_type(&offset)
            {
                return Type::constant_array(ConstantArrayType::new([(key, value.clone())]));
            }
        }
        let item = if union_values || literal {
            self.union(vec![array.item.clone(), value.clone()])
        } else {
            value.clone()
        };
        self.intersect(vec![
            Type::array(self.union(vec![array.key.clone(), offset]), item),
            Type::non_empty_array(),
        ])
    }

    // =========================================================================
    // Constant arrays
    // =========================================================================

    fn constant_array_operation(
        &self,
        ty: &Type,
        array: &ConstantArrayType,
        op: ArrayOperation<'_>,
    ) -> Type {
        use ArrayOperation as Op;
        let degraded = || self.array_operation(&self.degrade_constant_array(array), op);
        match op {
            Op::IterableKey => self.union(array.keys().iter().map(ArrayKey::to_type).collect()),
            Op::IterableValue => self.union(array.values().to_vec()),
            Op::FirstKey => array.keys().first().map_or_else(Type::never, ArrayKey::to_type),
            Op::LastKey => array.keys().last().map_or_else(Type::never, ArrayKey::to_type),
            Op::FirstValue => array.values().first().cloned().unwrap_or_else(Type::never),
            Op::LastValue => array.values().last().cloned().unwrap_or_else(Type::never),
            Op::Keys => Type::constant_array(ConstantArrayType::list(
                array.keys().iter().map(ArrayKey::to_type).collect(),
            )),
            Op::Values => Type::constant_array(ConstantArrayType::list(array.values().to_vec())),
            Op::Chunk {
                length,
                preserve_keys,
            } => match length.data() {
                TypeData::ConstantInteger(size) if *size > 0 => {
                    let size = usize::try_from(*size).unwrap_or(usize::MAX);
                    let entries = array.owned_entries();
                    let chunks = entries
                        .chunks(size)
                        .map(|chunk| {
                            let chunk = if preserve_keys.is_yes() {
                                ConstantArrayType::new(chunk.to_vec())
                            } else {
                                ConstantArrayType::list(
                                    chunk.iter().map(|(_, value)| value.clone()).collect(),
                                )
                            };
                            Type::constant_array(chunk)
                        })
                        .collect();
                    Type::constant_array(ConstantArrayType::list(chunks))
                }
                TypeData::ConstantInteger(_) => Type::never(),
                _ => degraded(),
            },
            Op::FillKeys { value } => {
                let keys: Option<Vec<ArrayKey>> =
                    array.values().iter().map(ArrayKey::from_type).collect();
                match keys {
                    Some(keys) => Type::constant_array(ConstantArrayType::new(
                        keys.into_iter().map(|key| (key, value.clone())),
                    )),
                    None => degraded(),
                }
            }
            Op::Flip => {
                let keys: Option<Vec<ArrayKey>> =
                    array.values().iter().map(ArrayKey::from_type).collect();
                match keys {
                    Some(keys) => Type::constant_array(ConstantArrayType::new(
                        keys.into_iter()
                            .zip(array.keys().iter().map(ArrayKey::to_type)),
                    )),
                    None => degraded(),
                }
            }
            Op::IntersectKey { other } => match other.as_constant_array() {
                Some(other) => Type::constant_array(ConstantArrayType::new(
                    array
                        .owned_entries()
                        .into_iter()
                        .filter(|(key, _)| other.get(key).is_some()),
                )),
                None => degraded(),
            },
            Op::Pop => {
                let mut entries = array.owned_entries();
                entries.pop();
                Type::constant_array(ConstantArrayType::new(entries))
            }
            Op::Shift => {
                let mut entries = array.owned_entries();
                if !entries.is_empty() {
                    entries.remove(0);
                }
                Type::constant_array(ConstantArrayType::reindexed(entries))
            }
            Op::Reverse { preserve_keys } => {
                let mut entries = array.owned_entries();
                entries.reverse();
                if preserve_keys.is_yes() {
                    Type::constant_array(ConstantArrayType::new(entries))
                } else {
                    Type::constant_array(ConstantArrayType::reindexed(entries))
                }
            }
            Op::Search { needle } => self.constant_array_search(array, needle),
            Op::Shuffle => {
                if array.is_empty() {
                    return ty.clone();
                }
                self.intersect(vec![
                    self.list_of(self.union(array.values().to_vec())),
                    Type::non_empty_array(),
                ])
            }
            Op::Slice {
                offset,
                length,
                preserve_keys,
            } => match slice_bounds(array.len(), offset, length) {
                Some((start, end)) => {
                    let entries: Vec<(ArrayKey, Type)> = array
                        .owned_entries()
                        .into_iter()
                        .skip(start)
                        .take(end.saturating_sub(start))
                        .collect();
                    if preserve_keys.is_yes() {
                        Type::constant_array(ConstantArrayType::new(entries))
                    } else {
                        Type::constant_array(ConstantArrayType::reindexed(entries))
                    }
                }
                None => degraded(),
            },
            Op::Size => Type::constant_int(array.len() as i64),
            Op::GetOffset { offset } => match ArrayKey::from_type(offset) {
                Some(key) => array.get(&key).cloned().unwrap_or_else(Type::never),
                None => {
                    let key = self.to_array_key(offset);
                    let matching = array
                        .entries()
                        .filter(|(candidate, _)| {
                            !self.is_super_type_of(&key, &candidate.to_type()).is_no()
                        })
                        .map(|(_, value)| value.clone())
                        .collect();
                    self.union(matching)
                }
            },
            Op::SetOffset { offset, value, .. } => {
                let key = match offset {
                    None => Some(ArrayKey::Int(array.next_auto_index())),
                    Some(offset) => ArrayKey::from_type(offset),
                };
                match key {
                    Some(key) => {
                        let mut updated = array.clone();
                        updated.set(key, value.clone());
                        Type::constant_array(updated)
                    }
                    None => degraded(),
                }
            }
            Op::SetExistingOffset { offset, value } => match ArrayKey::from_type(offset) {
                Some(key) => {
                    let mut updated = array.clone();
                    updated.set(key, value.clone());
                    Type::constant_array(updated)
                }
                None => degraded(),
            },
            Op::UnsetOffset { offset } => match ArrayKey::from_type(offset) {
                Some(key) => {
                    let mut updated = array.clone();
                    updated.remove(&key);
                    Type::constant_array(updated)
                }
                None => {
                    let key = self.to_array_key(offset);
                    let reachable = array
                        .keys()
                        .iter()
                        .any(|candidate| !self.is_super_type_of(&key, &candidate.to_type()).is_no());
                    if reachable { degraded() } else { ty.clone() }
                }
            },
        }
    }

    fn constant_array_search(&self, array: &ConstantArrayType, needle: &Type) -> Type {
        let mut matches = Vec::new();
        let mut found_identical = false;
        for (key, value) in array.entries() {
            if self.is_super_type_of(value, needle).is_no() {
                continue;
            }
            if needle.is_constant_scalar_value().is_yes()
                && value.is_constant_scalar_value().is_yes()
                && value.equals(needle)
            {
                found_identical = true;
            }
            matches.push(key.to_type());
        }
        if !found_identical {
            matches.push(Type::constant_bool(false));
        }
        self.union(matches)
    }

    /// The general array a constant array widens to when an operation
    /// cannot be computed on the exact shape.
    pub(crate) fn degrade_constant_array(&self, array: &ConstantArrayType) -> Type {
        if array.is_empty() {
            return Type::array(Type::never(), Type::never());
        }
        let general = Type::array(
            self.union(array.keys().iter().map(ArrayKey::to_type).collect()),
            self.union(array.values().to_vec()),
        );
        let mut parts = vec![general, Type::non_empty_array()];
        if array.is_list() {
            parts.push(Type::array_list());
        }
        self.intersect(parts)
    }

    fn list_of(&self, item: Type) -> Type {
        self.intersect(vec![Type::array(Type::int(), item), Type::array_list()])
    }

    // =========================================================================
    // Accessories, strings and objects
    // =========================================================================

    fn accessory_operation(&self, ty: &Type, kind: &AccessoryKind, op: ArrayOperation<'_>) -> Type {
        use AccessoryKind as K;
        use ArrayOperation as Op;
        match kind {
            K::NonEmptyArray => match op {
                Op::SetOffset { .. }
                | Op::SetExistingOffset { .. }
                | Op::Keys
                | Op::Values
                | Op::Flip
                | Op::FillKeys { .. }
                | Op::Chunk { .. }
                | Op::Reverse { .. }
                | Op::Shuffle => Type::non_empty_array(),
                _ => Type::mixed(),
            },
            K::ArrayList => match op {
                Op::IterableKey | Op::FirstKey | Op::LastKey => Type::int(),
                Op::SetOffset { offset: None, .. } | Op::SetExistingOffset { .. } => ty.clone(),
                Op::SetOffset {
                    offset: Some(offset),
                    ..
                } => {
                    if self.is_super_type_of(&Type::constant_int(0), offset).is_yes() {
                        ty.clone()
                    } else {
                        Type::mixed()
                    }
                }
                Op::UnsetOffset { offset } => {
                    if self.to_array_key(offset).is_integer().is_no() {
                        ty.clone()
                    } else {
                        Type::mixed()
                    }
                }
                Op::Keys
                | Op::Values
                | Op::Pop
                | Op::Shift
                | Op::Shuffle
                | Op::Chunk { .. }
                | Op::Reverse {
                    preserve_keys: TrinaryLogic::No,
                } => Type::array_list(),
                _ => Type::mixed(),
            },
            K::OversizedArray => match op {
                Op::SetOffset { .. } | Op::SetExistingOffset { .. } => ty.clone(),
                _ => Type::mixed(),
            },
            K::NonEmptyString
            | K::NonFalsyString
            | K::LiteralString
            | K::NumericString
            | K::LowercaseString
            | K::UppercaseString => match op {
                Op::SetOffset { .. } | Op::SetExistingOffset { .. } => ty.clone(),
                _ => Type::mixed(),
            },
            K::HasProperty(_) | K::HasMethod(_) => op.unknown(),
        }
    }

    fn string_operation(&self, ty: &Type, op: ArrayOperation<'_>) -> Type {
        match op {
            ArrayOperation::GetOffset { offset } => {
                if let (TypeData::ConstantString(value), TypeData::ConstantInteger(index)) =
                    (ty.data(), offset.data())
                {
                    return string_offset(value, *index)
                        .map_or_else(Type::never, Type::constant_string);
                }
                if offset.is_integer().is_no() {
                    return Type::never();
                }
                self.intersect(vec![Type::string(), Type::non_empty_string()])
            }
            ArrayOperation::SetOffset {
                offset: Some(_), ..
            }
            | ArrayOperation::SetExistingOffset { .. } => Type::string(),
            _ => Type::never(),
        }
    }

    fn object_operation(&self, ty: &Type, op: ArrayOperation<'_>) -> Type {
        use ArrayOperation as Op;
        match op {
            Op::IterableKey | Op::FirstKey | Op::LastKey => self.object_iterable_types(ty).0,
            Op::IterableValue | Op::FirstValue | Op::LastValue => self.object_iterable_types(ty).1,
            Op::GetOffset { .. } => {
                if self.is_offset_accessible(ty).is_no() {
                    Type::never()
                } else {
                    Type::mixed()
                }
            }
            Op::SetOffset { .. } | Op::SetExistingOffset { .. } | Op::UnsetOffset { .. } => {
                if self.is_offset_accessible(ty).is_no() {
                    Type::never()
                } else {
                    ty.clone()
                }
            }
            _ => Type::never(),
        }
    }

    /// Key and value types iteration over an object yields. Objects that
    /// are not Traversable yield nothing; Traversable classes without a
    /// declared pair yield `mixed`.
    pub(crate) fn object_iterable_types(&self, ty: &Type) -> (Type, Type) {
        let (class_name, type_args): (&str, &[Type]) = match ty.data() {
            TypeData::ObjectWithoutClass => return (Type::mixed(), Type::mixed()),
            TypeData::Object(object) => (&object.class_name, &[]),
            TypeData::GenericObject(object) => (&object.class_name, &object.type_args),
            _ => return (Type::never(), Type::never()),
        };
        if self.instance_of(class_name, "Traversable").is_no() {
            return (Type::never(), Type::never());
        }
        let Some(class) = self.class(class_name) else {
            return (Type::mixed(), Type::mixed());
        };
        let Some((key, value)) = &class.iterable_types else {
            return (Type::mixed(), Type::mixed());
        };
        let map = self.class_template_map(&class, type_args);
        (
            self.resolve_template_types(key, &map),
            self.resolve_template_types(value, &map),
        )
    }
}

fn iterable_operation(iterable: &IterableType, op: ArrayOperation<'_>) -> Type {
    use ArrayOperation as Op;
    match op {
        Op::IterableKey | Op::FirstKey | Op::LastKey => iterable.key.clone(),
        Op::IterableValue | Op::FirstValue | Op::LastValue => iterable.item.clone(),
        _ => op.unknown(),
    }
}

/// The one-character string at `index` (negative counts from the end).
fn string_offset(value: &str, index: i64) -> Option<String> {
    let bytes = value.as_bytes();
    let len = bytes.len() as i64;
    let position = if index < 0 { len + index } else { index };
    if position < 0 || position >= len {
        return None;
    }
    let byte = bytes[usize::try_from(position).ok()?];
    Some(String::from_utf8_lossy(&[byte]).into_owned())
}

/// Start and end positions of a slice over `len` entries, or `None` when an
/// argument is not a literal.
fn slice_bounds(len: usize, offset: &Type, length: &Type) -> Option<(usize, usize)> {
    let TypeData::ConstantInteger(offset) = offset.data() else {
        return None;
    };
    let count = len as i64;
    let start = if *offset < 0 {
        (count + offset).max(0)
    } else {
        (*offset).min(count)
    };
    let end = match length.data() {
        TypeData::Null => count,
        TypeData::ConstantInteger(length) if *length < 0 => (count + length).max(start),
        TypeData::ConstantInteger(length) => start.saturating_add(*length).min(count),
        _ => return None,
    };
    Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
}

#[cfg(test)]
#[path = "../tests/array_ops_tests.rs"]
mod tests;
