//! Template inference and substitution.
//!
//! `infer_template_types(pattern, received)` walks a type that mentions
//! templates together with a concrete type and records, per template name,
//! what the concrete type says about it. Upper bounds come from covariant
//! positions; closure parameters contribute lower bounds. Maps from
//! alternative branches are unioned and maps from simultaneous constraints
//! are intersected.
//!
//! A template that cannot be matched is simply absent from the map.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::engine::TypeEngine;
use crate::resolver::ClassReflection;
use crate::types::{ConstantArrayType, TemplateType, Type, TypeData, UnionType, Variance};

// =============================================================================
// TemplateTypeMap
// =============================================================================

/// Template bindings by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TemplateTypeMap {
    types: IndexMap<Arc<str>, Type>,
    lower_bound_types: IndexMap<Arc<str>, Type>,
}

impl TemplateTypeMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(types: impl IntoIterator<Item = (Arc<str>, Type)>) -> Self {
        Self {
            types: types.into_iter().collect(),
            lower_bound_types: IndexMap::new(),
        }
    }

    fn single(name: &Arc<str>, ty: Type) -> Self {
        Self::new([(name.clone(), ty)])
    }

    pub fn types(&self) -> &IndexMap<Arc<str>, Type> {
        &self.types
    }

    pub fn lower_bound_types(&self) -> &IndexMap<Arc<str>, Type> {
        &self.lower_bound_types
    }

    /// Upper bounds, with lower bounds filling the names that have none.
    pub fn resolved_types(&self) -> IndexMap<Arc<str>, Type> {
        let mut resolved = self.types.clone();
        for (name, ty) in &self.lower_bound_types {
            resolved.entry(name.clone()).or_insert_with(|| ty.clone());
        }
        resolved
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types
            .get(name)
            .or_else(|| self.lower_bound_types.get(name))
    }

    pub fn get_lower_bound_type(&self, name: &str) -> Option<&Type> {
        self.lower_bound_types.get(name)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.get_type(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
            + self
                .lower_bound_types
                .keys()
                .filter(|name| !self.types.contains_key(*name))
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Either map may hold: union the bindings, intersect the lower bounds.
    #[must_use]
    pub fn union(&self, other: &Self, engine: &TypeEngine<'_>) -> Self {
        Self {
            types: merge(&self.types, &other.types, |a, b| Some(engine.union(vec![a, b]))),
            lower_bound_types: merge(&self.lower_bound_types, &other.lower_bound_types, |a, b| {
                let intersection = engine.intersect(vec![a, b]);
                (!intersection.is_never()).then_some(intersection)
            }),
        }
    }

    /// Both maps hold: intersect the bindings, union the lower bounds.
    #[must_use]
    pub fn intersect(&self, other: &Self, engine: &TypeEngine<'_>) -> Self {
        Self {
            types: merge(&self.types, &other.types, |a, b| Some(engine.intersect(vec![a, b]))),
            lower_bound_types: merge(&self.lower_bound_types, &other.lower_bound_types, |a, b| {
                Some(engine.union(vec![a, b]))
            }),
        }
    }

    /// Turn every binding into a lower bound (bindings found in
    /// contravariant positions).
    #[must_use]
    pub fn convert_to_lower_bound_types(&self, engine: &TypeEngine<'_>) -> Self {
        let lower_bound_types = merge(&self.types, &self.lower_bound_types, |a, b| {
            let intersection = engine.intersect(vec![a.clone(), b.clone()]);
            Some(if intersection.is_never() { a } else { intersection })
        });
        Self {
            types: IndexMap::new(),
            lower_bound_types,
        }
    }
}

/// Entries of both maps, in first-seen order; `combine` decides names
/// present in both (`None` drops the name).
fn merge(
    left: &IndexMap<Arc<str>, Type>,
    right: &IndexMap<Arc<str>, Type>,
    combine: impl Fn(Type, Type) -> Option<Type>,
) -> IndexMap<Arc<str>, Type> {
    let mut result = left.clone();
    for (name, ty) in right {
        match result.get(name).cloned() {
            Some(existing) => match combine(existing, ty.clone()) {
                Some(combined) => {
                    result.insert(name.clone(), combined);
                }
                None => {
                    result.shift_remove(name);
                }
            },
            None => {
                result.insert(name.clone(), ty.clone());
            }
        }
    }
    result
}

// =============================================================================
// Referenced templates
// =============================================================================

/// A template occurring in a type, with the variance of its position.
#[derive(Debug, Clone)]
pub struct TemplateTypeReference {
    pub template: TemplateType,
    pub position_variance: Variance,
}

impl TypeEngine<'_> {
    // =========================================================================
    // Inference
    // =========================================================================

    /// What `received` says about the templates mentioned in `pattern`.
    pub fn infer_template_types(&self, pattern: &Type, received: &Type) -> TemplateTypeMap {
        self.guarded_inference("infer_template_types", TemplateTypeMap::empty, || {
            self.infer(pattern, received)
        })
    }

    /// `infer_template_types` from the received side: a received union
    /// unions the per-member maps, a received intersection intersects them.
    pub fn infer_template_types_on(&self, received: &Type, pattern: &Type) -> TemplateTypeMap {
        match received.data() {
            TypeData::Union(union) => union.types().iter().fold(TemplateTypeMap::empty(), |map, member| {
                map.union(&self.infer_template_types_on(member, pattern), self)
            }),
            TypeData::Intersection(intersection) => {
                intersection.types().iter().fold(TemplateTypeMap::empty(), |map, member| {
                    map.intersect(&self.infer_template_types_on(member, pattern), self)
                })
            }
            _ => self.infer_template_types(pattern, received),
        }
    }

    fn infer(&self, pattern: &Type, received: &Type) -> TemplateTypeMap {
        match pattern.data() {
            TypeData::Template(template) => return self.infer_template(template, received),
            TypeData::Union(union) => return self.infer_union_pattern(union, received),
            TypeData::Intersection(intersection) => {
                return intersection.types().iter().fold(TemplateTypeMap::empty(), |map, member| {
                    map.intersect(&self.infer_template_types(member, received), self)
                });
            }
            TypeData::Array(_)
            | TypeData::ConstantArray(_)
            | TypeData::Iterable(_)
            | TypeData::GenericObject(_)
            | TypeData::Closure(_) => {}
            _ => return TemplateTypeMap::empty(),
        }

        // Structured patterns match each alternative of a composite
        // received type on its own.
        match received.data() {
            TypeData::Union(union) => {
                return union.types().iter().fold(TemplateTypeMap::empty(), |map, member| {
                    map.union(&self.infer_template_types(pattern, member), self)
                });
            }
            TypeData::Intersection(intersection) => {
                return intersection.types().iter().fold(TemplateTypeMap::empty(), |map, member| {
                    map.intersect(&self.infer_template_types(pattern, member), self)
                });
            }
            _ => {}
        }

        match pattern.data() {
            TypeData::ConstantArray(array) if received.as_constant_array().is_some() => {
                self.infer_constant_array(array, received)
            }
            TypeData::Array(array) => {
                if !received.is_array().is_yes() {
                    return TemplateTypeMap::empty();
                }
                self.infer_key_value(&array.key, &array.item, received)
            }
            TypeData::ConstantArray(array) => {
                if !received.is_array().is_yes() {
                    return TemplateTypeMap::empty();
                }
                let key = self.get_iterable_key_type(pattern);
                let item = self.union(array.values().to_vec());
                self.infer_key_value(&key, &item, received)
            }
            TypeData::Iterable(iterable) => {
                if !self.is_iterable(received).is_yes() {
                    return TemplateTypeMap::empty();
                }
                self.infer_key_value(&iterable.key, &iterable.item, received)
            }
            TypeData::GenericObject(object) => {
                let (class_name, type_args): (&str, &[Type]) = match received.data() {
                    TypeData::GenericObject(other) => (&other.class_name, &other.type_args),
                    TypeData::Object(other) => (&other.class_name, &[]),
                    _ => return TemplateTypeMap::empty(),
                };
                let Some(received_args) =
                    self.ancestor_type_args(class_name, type_args, &object.class_name)
                else {
                    return TemplateTypeMap::empty();
                };
                let declared: Vec<Variance> = match self.class(&object.class_name) {
                    Some(class) => class.template_types.iter().map(|t| t.variance).collect(),
                    None => Vec::new(),
                };
                object.type_args.iter().zip(&received_args).enumerate().fold(
                    TemplateTypeMap::empty(),
                    |map, (index, (pattern_arg, received_arg))| {
                        let mut inferred = self.infer_template_types(pattern_arg, received_arg);
                        if declared.get(index) == Some(&Variance::Contravariant) {
                            inferred = inferred.convert_to_lower_bound_types(self);
                        }
                        map.union(&inferred, self)
                    },
                )
            }
            TypeData::Closure(closure) => match received.data() {
                TypeData::Closure(other) => {
                    let parameters = closure.parameters.iter().zip(&other.parameters).fold(
                        TemplateTypeMap::empty(),
                        |map, (pattern_parameter, received_parameter)| {
                            let inferred = self
                                .infer_template_types(pattern_parameter, received_parameter)
                                .convert_to_lower_bound_types(self);
                            map.union(&inferred, self)
                        },
                    );
                    parameters.union(
                        &self.infer_template_types(&closure.return_type, &other.return_type),
                        self,
                    )
                }
                _ => TemplateTypeMap::empty(),
            },
            _ => TemplateTypeMap::empty(),
        }
    }

    fn infer_key_value(&self, key: &Type, item: &Type, received: &Type) -> TemplateTypeMap {
        let key_map = self.infer_template_types(key, &self.get_iterable_key_type(received));
        let item_map = self.infer_template_types(item, &self.get_iterable_value_type(received));
        key_map.union(&item_map, self)
    }

    fn infer_constant_array(&self, array: &ConstantArrayType, received: &Type) -> TemplateTypeMap {
        array
            .entries()
            .fold(TemplateTypeMap::empty(), |map, (key, value)| {
                let offset = key.to_type();
                if self.has_offset_value_type(received, &offset).is_no() {
                    return map;
                }
                let received_value = self.get_offset_value_type(received, &offset);
                map.union(&self.infer_template_types(value, &received_value), self)
            })
    }

    fn infer_template(&self, template: &TemplateType, received: &Type) -> TemplateTypeMap {
        if let TypeData::Template(other) = received.data()
            && !template.is_argument()
            && self.is_super_type_of(&template.bound, &other.bound).is_yes()
        {
            return TemplateTypeMap::single(&template.name, received.clone());
        }

        let map = self.infer_template_types(&template.bound, received);
        if template.is_argument() {
            return map;
        }
        let resolved_bound = self.resolve_template_types(&template.bound, &map);
        if self.is_super_type_of(&resolved_bound, received).is_yes() {
            return TemplateTypeMap::single(&template.name, received.clone()).union(&map, self);
        }
        map
    }

    /// Received members go to the branch that fully covers them. What is
    /// left is matched against the non-template branches first, and only
    /// when those say nothing against every branch.
    fn infer_union_pattern(&self, union: &UnionType, received: &Type) -> TemplateTypeMap {
        let mut map = TemplateTypeMap::empty();
        let mut remaining = received.clone();
        if let TypeData::Union(received_union) = received.data() {
            let mut unmatched = Vec::new();
            for received_member in received_union.types() {
                let covering = union
                    .types()
                    .iter()
                    .find(|branch| self.is_super_type_of(branch, received_member).is_yes());
                match covering {
                    Some(branch) => {
                        map = map.union(&self.infer_template_types(branch, received_member), self);
                    }
                    None => unmatched.push(received_member.clone()),
                }
            }
            if unmatched.is_empty() {
                return map;
            }
            remaining = self.union(unmatched);
        }

        for branch in union.types().iter().filter(|branch| branch.as_template().is_none()) {
            map = map.union(&self.infer_template_types(branch, &remaining), self);
        }
        if !map.is_empty() {
            return map;
        }
        for branch in union.types() {
            map = map.union(&self.infer_template_types(branch, &remaining), self);
        }
        map
    }

    // =========================================================================
    // Substitution
    // =========================================================================

    /// Replace every parameter template bound in `map` by its binding.
    pub fn resolve_template_types(&self, ty: &Type, map: &TemplateTypeMap) -> Type {
        if map.is_empty() {
            return ty.clone();
        }
        self.guarded("resolve_template_types", || ty.clone(), || {
            if let TypeData::Template(template) = ty.data()
                && !template.is_argument()
                && let Some(bound) = map.get_type(&template.name)
            {
                return bound.clone();
            }
            self.traverse(ty, &mut |child| self.resolve_template_types(child, map))
        })
    }

    /// Bindings of a class's declared templates to the arguments of a
    /// generic instance. Missing arguments bind to the template bound.
    pub(crate) fn class_template_map(
        &self,
        class: &ClassReflection,
        type_args: &[Type],
    ) -> TemplateTypeMap {
        TemplateTypeMap::new(class.template_types.iter().enumerate().map(|(index, template)| {
            let argument = type_args
                .get(index)
                .cloned()
                .unwrap_or_else(|| template.bound.clone());
            (template.name.clone(), argument)
        }))
    }

    /// The arguments an instance of `class_name<type_args>` passes to the
    /// templates of `ancestor`, following declared generic parents.
    /// `None` when `ancestor` is not reachable through known classes.
    pub(crate) fn ancestor_type_args(
        &self,
        class_name: &str,
        type_args: &[Type],
        ancestor: &str,
    ) -> Option<Vec<Type>> {
        if class_name.eq_ignore_ascii_case(ancestor) {
            return Some(type_args.to_vec());
        }
        let class = self.class(class_name)?;
        self.guarded("ancestor_type_args", || None, || {
            let map = self.class_template_map(&class, type_args);
            class.parents().iter().find_map(|parent| {
                let parent_args: Vec<Type> = class
                    .parent_type_args(parent)
                    .unwrap_or_default()
                    .iter()
                    .map(|argument| self.resolve_template_types(argument, &map))
                    .collect();
                self.ancestor_type_args(parent, &parent_args, ancestor)
            })
        })
    }

    /// Rebuild `ty` with `f` applied to each direct child. Unions and
    /// intersections are normalized again.
    pub fn traverse(&self, ty: &Type, f: &mut dyn FnMut(&Type) -> Type) -> Type {
        match ty.data() {
            TypeData::Array(array) => Type::array(f(&array.key), f(&array.item)),
            TypeData::Iterable(iterable) => Type::iterable(f(&iterable.key), f(&iterable.item)),
            TypeData::ConstantArray(array) => Type::constant_array(ConstantArrayType::new(
                array
                    .entries()
                    .map(|(key, value)| (key.clone(), f(value)))
                    .collect::<Vec<_>>(),
            )),
            TypeData::GenericObject(object) => Type::generic_object(
                &*object.class_name,
                object.type_args.iter().map(|arg| f(arg)).collect(),
            ),
            TypeData::Closure(closure) => Type::closure(
                closure.parameters.iter().map(|parameter| f(parameter)).collect(),
                f(&closure.return_type),
            ),
            TypeData::Template(template) => {
                let bound = f(&template.bound);
                if bound.equals(&template.bound) {
                    return ty.clone();
                }
                Type::template(template.with_bound(bound))
            }
            TypeData::Union(union) => {
                let members: Vec<Type> = union.types().iter().map(|member| f(member)).collect();
                if union.is_benevolent() {
                    self.benevolent_union(members)
                } else {
                    self.union(members)
                }
            }
            TypeData::Intersection(intersection) => {
                self.intersect(intersection.types().iter().map(|member| f(member)).collect())
            }
            _ => ty.clone(),
        }
    }

    // =========================================================================
    // Referenced templates
    // =========================================================================

    /// Every template occurrence in `ty`, with the variance of the position
    /// it occurs in relative to `position_variance`.
    pub fn get_referenced_template_types(
        &self,
        ty: &Type,
        position_variance: Variance,
    ) -> Vec<TemplateTypeReference> {
        let mut references = Vec::new();
        self.collect_references(ty, position_variance, &mut references);
        references
    }

    fn collect_references(
        &self,
        ty: &Type,
        variance: Variance,
        references: &mut Vec<TemplateTypeReference>,
    ) {
        let covariant = variance.compose(Variance::Covariant);
        match ty.data() {
            TypeData::Template(template) => references.push(TemplateTypeReference {
                template: template.clone(),
                position_variance: variance,
            }),
            TypeData::Array(array) => {
                self.collect_references(&array.key, covariant, references);
                self.collect_references(&array.item, covariant, references);
            }
            TypeData::Iterable(iterable) => {
                self.collect_references(&iterable.key, covariant, references);
                self.collect_references(&iterable.item, covariant, references);
            }
            TypeData::ConstantArray(array) => {
                for value in array.values() {
                    self.collect_references(value, covariant, references);
                }
            }
            TypeData::Closure(closure) => {
                let contravariant = variance.compose(Variance::Contravariant);
                for parameter in &closure.parameters {
                    self.collect_references(parameter, contravariant, references);
                }
                self.collect_references(&closure.return_type, covariant, references);
            }
            TypeData::GenericObject(object) => {
                let declared: Vec<Variance> = match self.class(&object.class_name) {
                    Some(class) => class.template_types.iter().map(|t| t.variance).collect(),
                    None => Vec::new(),
                };
                for (index, argument) in object.type_args.iter().enumerate() {
                    let argument_variance =
                        declared.get(index).copied().unwrap_or(Variance::Invariant);
                    self.collect_references(argument, variance.compose(argument_variance), references);
                }
            }
            TypeData::Union(union) => {
                for member in union.types() {
                    self.collect_references(member, variance, references);
                }
            }
            TypeData::Intersection(intersection) => {
                for member in intersection.types() {
                    self.collect_references(member, variance, references);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
