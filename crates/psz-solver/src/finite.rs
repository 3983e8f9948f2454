//! Finite value enumeration.
//!
//! `get_finite_types` lists every value a type can hold when that set is
//! small and known; an empty result means "not finitely enumerable".
//! The set size is capped by `SolverOptions::finite_types_limit`.

use tracing::debug;

use crate::engine::TypeEngine;
use crate::types::{ConstantArrayType, Type, TypeData};

impl TypeEngine<'_> {
    pub fn get_finite_types(&self, ty: &Type) -> Vec<Type> {
        self.guarded("get_finite_types", Vec::new, || match ty.data() {
            TypeData::Null
            | TypeData::ConstantBoolean(_)
            | TypeData::ConstantInteger(_)
            | TypeData::ConstantFloat(_)
            | TypeData::ConstantString(_)
            | TypeData::EnumCase(_) => vec![ty.clone()],
            TypeData::Boolean => vec![Type::constant_bool(false), Type::constant_bool(true)],
            TypeData::Object(_) => self.get_enum_cases(ty),
            TypeData::ConstantArray(array) => self.constant_array_finite_types(array),
            TypeData::Union(union) => {
                let mut values: Vec<Type> = Vec::new();
                for member in union.types() {
                    let member_values = self.get_finite_types(member);
                    if member_values.is_empty() {
                        return Vec::new();
                    }
                    for value in member_values {
                        if !values.iter().any(|seen| seen.equals(&value)) {
                            values.push(value);
                        }
                    }
                    if values.len() > self.options().finite_types_limit {
                        return self.over_limit("union", values.len());
                    }
                }
                values
            }
            TypeData::Intersection(intersection) => self.intersection_finite_types(intersection),
            TypeData::Template(template) => self.get_finite_types(&template.bound),
            _ => Vec::new(),
        })
    }

    /// Every case of the enums a type can hold.
    pub fn get_enum_cases(&self, ty: &Type) -> Vec<Type> {
        self.guarded("get_enum_cases", Vec::new, || match ty.data() {
            TypeData::EnumCase(_) => vec![ty.clone()],
            TypeData::Object(object) => match self.class(&object.class_name) {
                Some(class) if class.is_enum() => class
                    .enum_cases
                    .iter()
                    .map(|case| Type::enum_case(&*class.name, &**case))
                    .collect(),
                _ => Vec::new(),
            },
            TypeData::Union(union) => {
                let mut cases: Vec<Type> = Vec::new();
                for case in union.types().iter().flat_map(|member| self.get_enum_cases(member)) {
                    if !cases.iter().any(|seen| seen.equals(&case)) {
                        cases.push(case);
                    }
                }
                cases
            }
            TypeData::Intersection(intersection) => self.intersection_enum_cases(intersection),
            TypeData::Template(template) => self.get_enum_cases(&template.bound),
            _ => Vec::new(),
        })
    }

    /// Every combination of the values' finite types, as shapes with the
    /// same keys.
    fn constant_array_finite_types(&self, array: &ConstantArrayType) -> Vec<Type> {
        let limit = self.options().finite_types_limit;
        let mut combinations: Vec<Vec<Type>> = vec![Vec::new()];
        for value in array.values() {
            let choices = self.get_finite_types(value);
            if choices.is_empty() {
                return Vec::new();
            }
            let size = combinations.len().saturating_mul(choices.len());
            if size > limit {
                return self.over_limit("constant array", size);
            }
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    choices.iter().map(move |choice| {
                        let mut next = prefix.clone();
                        next.push(choice.clone());
                        next
                    })
                })
                .collect();
        }
        combinations
            .into_iter()
            .map(|values| {
                Type::constant_array(ConstantArrayType::new(
                    array.keys().iter().cloned().zip(values),
                ))
            })
            .collect()
    }

    fn over_limit(&self, kind: &'static str, count: usize) -> Vec<Type> {
        debug!(
            kind,
            count,
            limit = self.options().finite_types_limit,
            "finite types over the limit"
        );
        Vec::new()
    }
}

#[cfg(test)]
#[path = "../tests/finite_tests.rs"]
mod tests;
