//! Property, method and constant resolution on types.
//!
//! A member looked up on a union or an intersection can come from several
//! members of the composite. Lookups therefore first build an unresolved
//! prototype tree (one leaf per declaring member) and only then merge it
//! into a single [`ExtendedPropertyReflection`] or
//! [`ExtendedMethodReflection`]:
//!
//! - union prototypes union what is read and intersect what is written
//! - intersection prototypes intersect both, and union parameter types
//!
//! Callers are expected to check `has_property` / `has_method` first. A
//! lookup that finds nothing is an error, never a silent default.

use std::sync::Arc;

use tracing::debug;

use crate::engine::TypeEngine;
use crate::error::TypeError;
use crate::format::VerbosityLevel;
use crate::queries::object_class_name;
use crate::resolver::{ConstantReflection, MemberAccessScope, ParameterReflection, Visibility};
use crate::types::{AccessoryKind, Type, TypeData};

/// A property as seen through a concrete type: generic class templates are
/// already substituted.
#[derive(Debug, Clone)]
pub struct ExtendedPropertyReflection {
    pub name: Arc<str>,
    /// `None` for the placeholder property of `mixed` and `hasProperty`.
    pub declaring_class: Option<Arc<str>>,
    pub readable_type: Type,
    pub writable_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl ExtendedPropertyReflection {
    fn dummy(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            declaring_class: None,
            readable_type: Type::mixed(),
            writable_type: Type::mixed(),
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.declaring_class.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ExtendedMethodReflection {
    pub name: Arc<str>,
    pub declaring_class: Option<Arc<str>>,
    pub parameters: Vec<ParameterReflection>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl ExtendedMethodReflection {
    fn dummy(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            declaring_class: None,
            parameters: Vec::new(),
            return_type: Type::mixed(),
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.declaring_class.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum UnresolvedPropertyPrototype {
    Single(ExtendedPropertyReflection),
    Union(Vec<UnresolvedPropertyPrototype>),
    Intersection(Vec<UnresolvedPropertyPrototype>),
}

impl UnresolvedPropertyPrototype {
    /// The merged property.
    pub fn property(&self, engine: &TypeEngine<'_>) -> ExtendedPropertyReflection {
        match self {
            Self::Single(property) => property.clone(),
            Self::Union(prototypes) => {
                let properties = resolve_all(prototypes, |p| p.property(engine));
                merge_properties(properties, |types| engine.union(types), |types| {
                    engine.intersect(types)
                })
            }
            Self::Intersection(prototypes) => {
                let properties = resolve_all(prototypes, |p| p.property(engine));
                merge_properties(properties, |types| engine.intersect(types), |types| {
                    engine.intersect(types)
                })
            }
        }
    }

    /// Number of declaring members behind this prototype.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Union(prototypes) | Self::Intersection(prototypes) => {
                prototypes.iter().map(Self::len).sum()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub enum UnresolvedMethodPrototype {
    Single(ExtendedMethodReflection),
    Union(Vec<UnresolvedMethodPrototype>),
    Intersection(Vec<UnresolvedMethodPrototype>),
}

impl UnresolvedMethodPrototype {
    pub fn method(&self, engine: &TypeEngine<'_>) -> ExtendedMethodReflection {
        match self {
            Self::Single(method) => method.clone(),
            Self::Union(prototypes) => {
                let methods = resolve_all(prototypes, |p| p.method(engine));
                merge_methods(methods, |types| engine.intersect(types), |types| {
                    engine.union(types)
                })
            }
            Self::Intersection(prototypes) => {
                let methods = resolve_all(prototypes, |p| p.method(engine));
                merge_methods(methods, |types| engine.union(types), |types| {
                    engine.intersect(types)
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Union(prototypes) | Self::Intersection(prototypes) => {
                prototypes.iter().map(Self::len).sum()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn resolve_all<P, T>(prototypes: &[P], resolve: impl Fn(&P) -> T) -> Vec<T> {
    prototypes.iter().map(resolve).collect()
}

fn merge_properties(
    properties: Vec<ExtendedPropertyReflection>,
    readable: impl FnOnce(Vec<Type>) -> Type,
    writable: impl FnOnce(Vec<Type>) -> Type,
) -> ExtendedPropertyReflection {
    let mut merged = properties
        .first()
        .cloned()
        .unwrap_or_else(|| ExtendedPropertyReflection::dummy(""));
    merged.readable_type = readable(properties.iter().map(|p| p.readable_type.clone()).collect());
    merged.writable_type = writable(properties.iter().map(|p| p.writable_type.clone()).collect());
    // Public if any declaration is; static only if all are.
    merged.visibility = properties
        .iter()
        .map(|p| p.visibility)
        .min_by_key(|visibility| visibility_rank(*visibility))
        .unwrap_or(Visibility::Public);
    merged.is_static = properties.iter().all(|p| p.is_static);
    merged
}

fn merge_methods(
    methods: Vec<ExtendedMethodReflection>,
    parameter: impl Fn(Vec<Type>) -> Type,
    return_type: impl FnOnce(Vec<Type>) -> Type,
) -> ExtendedMethodReflection {
    let mut merged = methods
        .first()
        .cloned()
        .unwrap_or_else(|| ExtendedMethodReflection::dummy(""));
    let arity = methods.iter().map(|m| m.parameters.len()).max().unwrap_or(0);
    merged.parameters = (0..arity)
        .map(|index| {
            let declared: Vec<&ParameterReflection> =
                methods.iter().filter_map(|m| m.parameters.get(index)).collect();
            ParameterReflection {
                name: declared
                    .first()
                    .map_or_else(|| Arc::from(format!("arg{index}")), |p| p.name.clone()),
                ty: parameter(declared.iter().map(|p| p.ty.clone()).collect()),
            }
        })
        .collect();
    merged.return_type = return_type(methods.iter().map(|m| m.return_type.clone()).collect());
    merged.visibility = methods
        .iter()
        .map(|m| m.visibility)
        .min_by_key(|visibility| visibility_rank(*visibility))
        .unwrap_or(Visibility::Public);
    merged.is_static = methods.iter().all(|m| m.is_static);
    merged
}

fn visibility_rank(visibility: Visibility) -> u8 {
    match visibility {
        Visibility::Public => 0,
        Visibility::Protected => 1,
        Visibility::Private => 2,
    }
}

impl TypeEngine<'_> {
    // =========================================================================
    // Properties
    // =========================================================================

    pub fn get_property(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<ExtendedPropertyReflection, TypeError> {
        Ok(self
            .get_unresolved_property_prototype(ty, name, scope)?
            .property(self))
    }

    pub fn get_unresolved_property_prototype(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<UnresolvedPropertyPrototype, TypeError> {
        let undefined = || {
            debug!(name, ty = %ty, "property lookup on a type without it");
            TypeError::UndefinedProperty {
                type_description: ty.describe(VerbosityLevel::Value),
                name: name.to_string(),
            }
        };
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Ok(
                UnresolvedPropertyPrototype::Single(ExtendedPropertyReflection::dummy(name)),
            ),
            TypeData::Accessory(AccessoryKind::HasProperty(property)) if &**property == name => Ok(
                UnresolvedPropertyPrototype::Single(ExtendedPropertyReflection::dummy(name)),
            ),
            TypeData::EnumCase(case) if name == "name" => Ok(UnresolvedPropertyPrototype::Single(
                ExtendedPropertyReflection {
                    name: Arc::from(name),
                    declaring_class: Some(case.class_name.clone()),
                    readable_type: Type::constant_string(&*case.case_name),
                    writable_type: Type::never(),
                    visibility: Visibility::Public,
                    is_static: false,
                },
            )),
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => self
                .class_property(ty, name, scope)
                .map(UnresolvedPropertyPrototype::Single)
                .ok_or_else(undefined),
            TypeData::Template(template) => {
                self.get_unresolved_property_prototype(&template.bound, name, scope)
            }
            TypeData::Union(union) => {
                let prototypes = self.collect_property_prototypes(union.types(), name, scope)?;
                wrap(prototypes, UnresolvedPropertyPrototype::Union).ok_or_else(undefined)
            }
            TypeData::Intersection(intersection) => {
                let prototypes =
                    self.collect_property_prototypes(intersection.types(), name, scope)?;
                wrap(prototypes, UnresolvedPropertyPrototype::Intersection).ok_or_else(undefined)
            }
            _ => Err(undefined()),
        }
    }

    fn collect_property_prototypes(
        &self,
        members: &[Type],
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<Vec<UnresolvedPropertyPrototype>, TypeError> {
        members
            .iter()
            .filter(|member| self.has_property(member, name, scope).is_yes())
            .map(|member| self.get_unresolved_property_prototype(member, name, scope))
            .collect()
    }

    /// The declaration visible from `scope`; an inaccessible one counts as
    /// absent.
    fn class_property(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Option<ExtendedPropertyReflection> {
        let class_name = object_class_name(ty)?;
        let property = self
            .resolver()
            .find_property(class_name, name)
            .filter(|property| scope.can_access(&property.declaring_class, property.visibility))?;
        let (readable_type, writable_type) = match ty.data() {
            TypeData::GenericObject(object) => match self.class(&object.class_name) {
                Some(class) => {
                    let map = self.class_template_map(&class, &object.type_args);
                    (
                        self.resolve_template_types(&property.readable_type, &map),
                        self.resolve_template_types(&property.writable_type, &map),
                    )
                }
                None => (property.readable_type.clone(), property.writable_type.clone()),
            },
            _ => (property.readable_type.clone(), property.writable_type.clone()),
        };
        Some(ExtendedPropertyReflection {
            name: property.name,
            declaring_class: Some(property.declaring_class),
            readable_type,
            writable_type,
            visibility: property.visibility,
            is_static: property.is_static,
        })
    }

    // =========================================================================
    // Methods
    // =========================================================================

    pub fn get_method(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<ExtendedMethodReflection, TypeError> {
        Ok(self
            .get_unresolved_method_prototype(ty, name, scope)?
            .method(self))
    }

    pub fn get_unresolved_method_prototype(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<UnresolvedMethodPrototype, TypeError> {
        let undefined = || {
            debug!(name, ty = %ty, "method lookup on a type without it");
            TypeError::UndefinedMethod {
                type_description: ty.describe(VerbosityLevel::Value),
                name: name.to_string(),
            }
        };
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Ok(
                UnresolvedMethodPrototype::Single(ExtendedMethodReflection::dummy(name)),
            ),
            TypeData::Accessory(AccessoryKind::HasMethod(method))
                if method.eq_ignore_ascii_case(name) =>
            {
                Ok(UnresolvedMethodPrototype::Single(ExtendedMethodReflection::dummy(name)))
            }
            TypeData::Closure(closure) if name.eq_ignore_ascii_case("__invoke") => {
                Ok(UnresolvedMethodPrototype::Single(ExtendedMethodReflection {
                    name: Arc::from("__invoke"),
                    declaring_class: Some(Arc::from("Closure")),
                    parameters: closure
                        .parameters
                        .iter()
                        .enumerate()
                        .map(|(index, ty)| ParameterReflection {
                            name: Arc::from(format!("arg{index}")),
                            ty: ty.clone(),
                        })
                        .collect(),
                    return_type: closure.return_type.clone(),
                    visibility: Visibility::Public,
                    is_static: false,
                }))
            }
            TypeData::Closure(_) => self
                .class_method(&Type::object("Closure"), name, scope)
                .map(UnresolvedMethodPrototype::Single)
                .ok_or_else(undefined),
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => self
                .class_method(ty, name, scope)
                .map(UnresolvedMethodPrototype::Single)
                .ok_or_else(undefined),
            TypeData::Template(template) => {
                self.get_unresolved_method_prototype(&template.bound, name, scope)
            }
            TypeData::Union(union) => {
                let prototypes = self.collect_method_prototypes(union.types(), name, scope)?;
                wrap(prototypes, UnresolvedMethodPrototype::Union).ok_or_else(undefined)
            }
            TypeData::Intersection(intersection) => {
                let prototypes =
                    self.collect_method_prototypes(intersection.types(), name, scope)?;
                wrap(prototypes, UnresolvedMethodPrototype::Intersection).ok_or_else(undefined)
            }
            _ => Err(undefined()),
        }
    }

    fn collect_method_prototypes(
        &self,
        members: &[Type],
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Result<Vec<UnresolvedMethodPrototype>, TypeError> {
        members
            .iter()
            .filter(|member| self.has_method(member, name, scope).is_yes())
            .map(|member| self.get_unresolved_method_prototype(member, name, scope))
            .collect()
    }

    fn class_method(
        &self,
        ty: &Type,
        name: &str,
        scope: &dyn MemberAccessScope,
    ) -> Option<ExtendedMethodReflection> {
        let class_name = object_class_name(ty)?;
        let method = self
            .resolver()
            .find_method(class_name, name)
            .filter(|method| scope.can_access(&method.declaring_class, method.visibility))?;
        let map = match ty.data() {
            TypeData::GenericObject(object) => self
                .class(&object.class_name)
                .map(|class| self.class_template_map(&class, &object.type_args)),
            _ => None,
        };
        let resolve = |declared: &Type| match &map {
            Some(map) => self.resolve_template_types(declared, map),
            None => declared.clone(),
        };
        Some(ExtendedMethodReflection {
            name: method.name.clone(),
            declaring_class: Some(method.declaring_class.clone()),
            parameters: method
                .parameters
                .iter()
                .map(|parameter| ParameterReflection {
                    name: parameter.name.clone(),
                    ty: resolve(&parameter.ty),
                })
                .collect(),
            return_type: resolve(&method.return_type),
            visibility: method.visibility,
            is_static: method.is_static,
        })
    }

    // =========================================================================
    // Constants
    // =========================================================================

    pub fn get_constant(&self, ty: &Type, name: &str) -> Result<ConstantReflection, TypeError> {
        let undefined = || {
            debug!(name, ty = %ty, "constant lookup on a type without it");
            TypeError::UndefinedConstant {
                type_description: ty.describe(VerbosityLevel::Value),
                name: name.to_string(),
            }
        };
        match ty.data() {
            TypeData::Mixed { .. } | TypeData::ObjectWithoutClass => Ok(ConstantReflection {
                name: Arc::from(name),
                declaring_class: Arc::from(""),
                ty: Type::mixed(),
                visibility: Visibility::Public,
            }),
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::EnumCase(_) => {
                let class_name = object_class_name(ty).ok_or_else(undefined)?;
                self.resolver()
                    .find_constant(class_name, name)
                    .ok_or_else(undefined)
            }
            TypeData::Template(template) => self.get_constant(&template.bound, name),
            TypeData::Union(union) => {
                let constants = union
                    .types()
                    .iter()
                    .filter(|member| self.has_constant(member, name).is_yes())
                    .map(|member| self.get_constant(member, name))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut merged = constants.first().cloned().ok_or_else(undefined)?;
                merged.ty = self.union(constants.into_iter().map(|constant| constant.ty).collect());
                Ok(merged)
            }
            TypeData::Intersection(intersection) => intersection
                .types()
                .iter()
                .find(|member| self.has_constant(member, name).is_yes())
                .ok_or_else(undefined)
                .and_then(|member| self.get_constant(member, name)),
            _ => Err(undefined()),
        }
    }
}

/// No prototype: `None`. One: itself. More: wrapped in the aggregate.
fn wrap<P>(mut prototypes: Vec<P>, aggregate: impl FnOnce(Vec<P>) -> P) -> Option<P> {
    match prototypes.len() {
        0 => None,
        1 => prototypes.pop(),
        _ => Some(aggregate(prototypes)),
    }
}

#[cfg(test)]
#[path = "../tests/members_tests.rs"]
mod tests;
