//! Type descriptions and canonical member order.
//!
//! `describe` renders a type at one of three verbosity levels:
//!
//! - **TypeOnly**: literal values render as their base type (`int`, not `1`)
//! - **Value**: literal values are shown, long strings and shapes truncated,
//!   accessory markers that have no combined token are hidden
//! - **Precise**: everything, including template scopes and casing markers
//!
//! Rendering walks the type once with a depth counter; past
//! `MAX_DESCRIBE_DEPTH` the remaining structure renders as `...`.
//!
//! `sort_types` is the canonical order shared by the combinator and by
//! rendering, so that a description never depends on construction order.

use std::cmp::Ordering;

use psz_common::limits::{
    CONSTANT_ARRAY_DESCRIBE_LIMIT, CONSTANT_STRING_DESCRIBE_LIMIT, MAX_DESCRIBE_DEPTH,
};

use crate::engine::TypeEngine;
use crate::resolver::NoopResolver;
use crate::types::{
    AccessoryKind, ArrayKey, ArrayType, ConstantArrayType, IntersectionType, IterableType,
    TemplateType, Type, TypeData, UnionType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerbosityLevel {
    TypeOnly,
    Value,
    Precise,
}

impl VerbosityLevel {
    pub fn is_type_only(self) -> bool {
        self == Self::TypeOnly
    }

    pub fn is_value(self) -> bool {
        self == Self::Value
    }

    pub fn is_precise(self) -> bool {
        self == Self::Precise
    }

    /// The lowest level at which the two types render differently, so a
    /// message never reads "expected int, got int".
    pub fn recommended_for(accepting: &Type, accepted: &Type) -> Self {
        [Self::TypeOnly, Self::Value]
            .into_iter()
            .find(|level| accepting.describe(*level) != accepted.describe(*level))
            .unwrap_or(Self::Precise)
    }
}

/// Render `ty` at `level`.
pub fn describe(ty: &Type, level: VerbosityLevel) -> String {
    Describer { level }.describe(ty, 0)
}

/// Normalization that needs no class facts: scalars, arrays and their
/// unions. Generalization and TypeOnly rendering go through this.
fn scalar_engine() -> TypeEngine<'static> {
    TypeEngine::new(&NoopResolver)
}

struct Describer {
    level: VerbosityLevel,
}

impl Describer {
    fn describe(&self, ty: &Type, depth: u32) -> String {
        if depth > MAX_DESCRIBE_DEPTH {
            return "...".to_string();
        }
        let nested = |inner: &Type| self.describe(inner, depth + 1);
        match ty.data() {
            TypeData::Never => "never".to_string(),
            TypeData::Mixed { .. } => "mixed".to_string(),
            TypeData::Null => "null".to_string(),
            TypeData::Boolean => "bool".to_string(),
            TypeData::ConstantBoolean(value) => value.to_string(),
            TypeData::Integer => "int".to_string(),
            TypeData::ConstantInteger(value) => self.literal("int", || value.to_string()),
            TypeData::Float => "float".to_string(),
            TypeData::ConstantFloat(value) => self.literal("float", || value.to_string()),
            TypeData::String => "string".to_string(),
            TypeData::ConstantString(value) => match self.level {
                VerbosityLevel::TypeOnly => "string".to_string(),
                VerbosityLevel::Value => export_string(&truncate(value)),
                VerbosityLevel::Precise => export_string(value),
            },
            TypeData::ObjectWithoutClass => "object".to_string(),
            TypeData::Object(object) => object.class_name.to_string(),
            TypeData::GenericObject(object) => format!(
                "{}<{}>",
                object.class_name,
                join(object.type_args.iter().map(nested), ", ")
            ),
            TypeData::EnumCase(case) => format!("{}::{}", case.class_name, case.case_name),
            TypeData::Callable => "callable".to_string(),
            TypeData::Closure(closure) => {
                if self.level.is_type_only() {
                    return "Closure".to_string();
                }
                format!(
                    "Closure({}): {}",
                    join(closure.parameters.iter().map(nested), ", "),
                    nested(&closure.return_type)
                )
            }
            TypeData::Iterable(iterable) => self.describe_iterable(iterable, depth),
            TypeData::Array(array) => self.describe_array(array, depth),
            TypeData::ConstantArray(array) => self.describe_constant_array(array, depth),
            TypeData::Accessory(kind) => kind.describe(),
            TypeData::Template(template) => self.describe_template(template, depth),
            TypeData::Union(union) => self.describe_union(union, depth),
            TypeData::Intersection(intersection) => match self.level {
                VerbosityLevel::TypeOnly => self.describe_intersection_type_only(ty, intersection, depth),
                VerbosityLevel::Value => self.describe_intersection(ty, intersection, true, depth),
                VerbosityLevel::Precise => self.describe_intersection(ty, intersection, false, depth),
            },
        }
    }

    fn literal(&self, type_name: &str, value: impl FnOnce() -> String) -> String {
        if self.level.is_type_only() {
            type_name.to_string()
        } else {
            value()
        }
    }

    fn describe_iterable(&self, iterable: &IterableType, depth: u32) -> String {
        if iterable.key.is_implicit_mixed() {
            if iterable.item.is_implicit_mixed() {
                return "iterable".to_string();
            }
            return format!("iterable<{}>", self.describe(&iterable.item, depth + 1));
        }
        format!(
            "iterable<{}, {}>",
            self.describe(&iterable.key, depth + 1),
            self.describe(&iterable.item, depth + 1)
        )
    }

    fn describe_array(&self, array: &ArrayType, depth: u32) -> String {
        // Outside Precise, `array<never, never>` (the empty general array)
        // renders like the unparameterized one.
        let lenient = !self.level.is_precise();
        let omit_key = array.key.is_implicit_mixed() || (lenient && array.key.is_never());
        let omit_item = array.item.is_implicit_mixed() || (lenient && array.item.is_never());
        if omit_key {
            if omit_item {
                return "array".to_string();
            }
            return format!("array<{}>", self.describe(&array.item, depth + 1));
        }
        format!(
            "array<{}, {}>",
            self.describe(&array.key, depth + 1),
            self.describe(&array.item, depth + 1)
        )
    }

    fn describe_constant_array(&self, array: &ConstantArrayType, depth: u32) -> String {
        let values_only = array.is_list();
        let mut items: Vec<String> = array
            .entries()
            .map(|(key, value)| {
                let value = self.describe(value, depth + 1);
                if values_only {
                    value
                } else {
                    format!("{}: {value}", describe_array_key(key))
                }
            })
            .collect();
        let mut append = "";
        if self.level.is_value() && items.len() > CONSTANT_ARRAY_DESCRIBE_LIMIT {
            items.truncate(CONSTANT_ARRAY_DESCRIBE_LIMIT);
            append = ", ...";
        }
        format!("array{{{}{append}}}", items.join(", "))
    }

    fn describe_template(&self, template: &TemplateType, depth: u32) -> String {
        let basic = if template.bound.is_implicit_mixed() {
            template.name.to_string()
        } else {
            format!("{} of {}", template.name, self.describe(&template.bound, depth + 1))
        };
        if !self.level.is_precise() {
            return basic;
        }
        let strategy = if template.is_argument() { "argument" } else { "parameter" };
        format!("{basic} ({}, {strategy})", template.scope.describe())
    }

    // -------------------------------------------------------------------------
    // Unions
    // -------------------------------------------------------------------------

    fn describe_union(&self, union: &UnionType, depth: u32) -> String {
        let joined = if self.level.is_type_only() {
            let generalized = union
                .types()
                .iter()
                .map(|member| {
                    let is_bool_literal = member.is_constant_value().is_yes()
                        && member.is_true().or(member.is_false()).is_yes();
                    if is_bool_literal {
                        member.clone()
                    } else {
                        member.generalize()
                    }
                })
                .collect();
            let merged = scalar_engine().union(generalized);
            match merged.as_union() {
                Some(merged_union) => self.join_union_members(merged_union.types(), depth),
                None => self.join_union_members(std::slice::from_ref(&merged), depth),
            }
        } else {
            self.join_union_members(&sort_types(union.types().to_vec()), depth)
        };
        if union.is_benevolent() {
            format!("({joined})")
        } else {
            joined
        }
    }

    fn join_union_members(&self, members: &[Type], depth: u32) -> String {
        let last = members.len().saturating_sub(1);
        let mut names: Vec<String> = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let description = self.describe(member, depth + 1);
            let parenthesize = match member.data() {
                TypeData::Closure(_) => !self.level.is_type_only(),
                TypeData::Template(template) => {
                    index < last && !self.level.is_precise() && !template.bound.is_mixed()
                }
                TypeData::Intersection(_) => description.contains('&'),
                _ => false,
            };
            let name = if parenthesize {
                format!("({description})")
            } else {
                description
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.join("|")
    }

    // -------------------------------------------------------------------------
    // Intersections
    // -------------------------------------------------------------------------

    fn describe_intersection_type_only(
        &self,
        ty: &Type,
        intersection: &IntersectionType,
        depth: u32,
    ) -> String {
        let is_list = ty.is_list().is_yes();
        let mut names = Vec::new();
        let mut list_value: Option<Type> = None;
        for member in intersection.sorted_types() {
            if is_list {
                match member.data() {
                    TypeData::Array(array) => {
                        list_value = Some(array.item.clone());
                        continue;
                    }
                    TypeData::ConstantArray(array) => {
                        list_value = Some(scalar_engine().union(array.values().to_vec()));
                        continue;
                    }
                    TypeData::Accessory(AccessoryKind::NonEmptyArray) => continue,
                    _ => {}
                }
            }
            if member.as_accessory().is_some() {
                continue;
            }
            names.push(self.describe(&member.generalize(), depth + 1));
        }

        if is_list {
            let inner = match &list_value {
                Some(value) if !value.is_implicit_mixed() => {
                    format!("<{}>", self.describe(value, depth + 1))
                }
                _ => String::new(),
            };
            names.push(format!("list{inner}"));
        }
        if names.is_empty() {
            // Only markers: name the base type they refine.
            let base = if ty.is_string().is_yes() {
                "string"
            } else if ty.is_array().is_yes() {
                "array"
            } else {
                "object"
            };
            names.push(base.to_string());
        }

        names.sort_by(|a, b| compare_strings(a, b));
        names.join("&")
    }

    /// Value and Precise rendering: array members absorb the list and
    /// non-empty markers, string refinements absorb the `string` base, and a
    /// common callable absorbs an `object` or `string` base.
    fn describe_intersection(
        &self,
        ty: &Type,
        intersection: &IntersectionType,
        skip_accessories: bool,
        depth: u32,
    ) -> String {
        let is_list = ty.is_list().is_yes();
        let is_array = ty.is_array().is_yes();
        let is_non_empty_array = ty.is_iterable_at_least_once().is_yes();

        let mut described: Vec<(usize, String)> = Vec::new();
        let mut bases: Vec<(usize, &Type)> = Vec::new();
        let mut refinements: Vec<(usize, &Type)> = Vec::new();
        let mut skipped_bases: Vec<&str> = Vec::new();
        let mut non_falsy = false;

        for (index, member) in intersection.sorted_types().iter().enumerate() {
            if let TypeData::Accessory(kind) = member.data()
                && kind.is_string_refinement()
            {
                let casing = matches!(
                    kind,
                    AccessoryKind::LowercaseString | AccessoryKind::UppercaseString
                );
                if casing && !self.level.is_precise() {
                    continue;
                }
                non_falsy |= *kind == AccessoryKind::NonFalsyString;
                refinements.push((index, member));
                skipped_bases.push("string");
                continue;
            }

            if is_list || is_array {
                match member.data() {
                    TypeData::Array(array) => {
                        let token = self.array_token(array, is_list, is_non_empty_array, depth);
                        described.push((index, token));
                        continue;
                    }
                    TypeData::ConstantArray(array) => {
                        let description = self.describe_constant_array(array, depth);
                        let shape = description.strip_prefix("array").unwrap_or(&description);
                        let kind = if is_list { "list" } else { "array" };
                        let token = if is_non_empty_array && array.is_empty() {
                            format!("non-empty-{kind}{shape}")
                        } else {
                            format!("{kind}{shape}")
                        };
                        described.push((index, token));
                        continue;
                    }
                    TypeData::Accessory(AccessoryKind::NonEmptyArray | AccessoryKind::ArrayList) => {
                        continue;
                    }
                    _ => {}
                }
            }

            match member.data() {
                TypeData::Callable => {
                    refinements.push((index, member));
                    skipped_bases.extend(["object", "string"]);
                }
                TypeData::Accessory(_) => {
                    if !skip_accessories {
                        refinements.push((index, member));
                    }
                }
                _ => bases.push((index, member)),
            }
        }

        if non_falsy {
            refinements.retain(|(_, member)| {
                member.as_accessory() != Some(&AccessoryKind::NonEmptyString)
            });
        }

        for (index, member) in bases {
            let description = self.describe(member, depth + 1);
            if !skipped_bases.contains(&description.as_str()) {
                described.push((index, description));
                continue;
            }
            if description == "object" || description == "string" {
                let callable = refinements
                    .iter()
                    .position(|(_, refinement)| matches!(refinement.data(), TypeData::Callable));
                if let Some(position) = callable {
                    refinements.remove(position);
                    described.push((index, format!("callable-{description}")));
                }
            }
        }
        for (index, member) in refinements {
            described.push((index, self.describe(member, depth + 1)));
        }

        described.sort_by_key(|(index, _)| *index);
        join(described.into_iter().map(|(_, name)| name), "&")
    }

    fn array_token(&self, array: &ArrayType, is_list: bool, non_empty: bool, depth: u32) -> String {
        if is_list {
            let name = if non_empty { "non-empty-list" } else { "list" };
            if array.item.is_implicit_mixed() {
                return name.to_string();
            }
            return format!("{name}<{}>", self.describe(&array.item, depth + 1));
        }
        let name = if non_empty { "non-empty-array" } else { "array" };
        if !array.key.is_implicit_mixed() {
            format!(
                "{name}<{}, {}>",
                self.describe(&array.key, depth + 1),
                self.describe(&array.item, depth + 1)
            )
        } else if !array.item.is_implicit_mixed() {
            format!("{name}<{}>", self.describe(&array.item, depth + 1))
        } else {
            name.to_string()
        }
    }
}

fn join(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts.collect::<Vec<_>>().join(separator)
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= CONSTANT_STRING_DESCRIBE_LIMIT {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(CONSTANT_STRING_DESCRIBE_LIMIT).collect();
    cut.push_str("...");
    cut
}

/// Single-quoted literal with `\` and `'` escaped.
pub(crate) fn export_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub(crate) fn describe_array_key(key: &ArrayKey) -> String {
    match key {
        ArrayKey::Int(value) => value.to_string(),
        ArrayKey::String(value) => {
            if value.contains('"') {
                format!("'{value}'")
            } else if value.contains('\'') {
                format!("\"{value}\"")
            } else if !is_identifier(value) {
                format!("'{value}'")
            } else {
                value.to_string()
            }
        }
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(first) if first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Case-insensitive first, byte order to break ties.
fn compare_strings(a: &str, b: &str) -> Ordering {
    a.to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| a.cmp(b))
}

// =============================================================================
// Generalization
// =============================================================================

impl Type {
    /// Less specific form of the type: literals widen to their base types,
    /// enum cases to their enum, constant arrays to general arrays that keep
    /// the list and non-empty facts.
    #[must_use]
    pub fn generalize(&self) -> Type {
        match self.data() {
            TypeData::ConstantBoolean(_) => Type::bool(),
            TypeData::ConstantInteger(_) => Type::int(),
            TypeData::ConstantFloat(_) => Type::float(),
            TypeData::ConstantString(_) => Type::string(),
            TypeData::EnumCase(case) => Type::object(&*case.class_name),
            TypeData::ConstantArray(array) if !array.is_empty() => generalize_constant_array(array),
            TypeData::Array(array) => Type::array(array.key.generalize(), array.item.generalize()),
            TypeData::Iterable(iterable) => {
                Type::iterable(iterable.key.generalize(), iterable.item.generalize())
            }
            TypeData::Union(union) => {
                let engine = scalar_engine();
                let members = union.types().iter().map(Type::generalize).collect();
                if union.is_benevolent() {
                    engine.benevolent_union(members)
                } else {
                    engine.union(members)
                }
            }
            _ => self.clone(),
        }
    }
}

fn generalize_constant_array(array: &ConstantArrayType) -> Type {
    let engine = scalar_engine();
    let key = engine
        .union(array.keys().iter().map(ArrayKey::to_type).collect())
        .generalize();
    let item = engine.union(array.values().to_vec()).generalize();
    let mut parts = vec![Type::array(key, item), Type::non_empty_array()];
    if array.is_list() {
        parts.push(Type::array_list());
    }
    engine.intersect(parts)
}

// =============================================================================
// Canonical order
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SortRank {
    Number,
    ConstantString,
    Other,
    ConstantBoolean,
    Accessory,
    Null,
}

/// Constant numbers first by value (an int before an equal float), then
/// constant strings, then every other type by its TypeOnly description,
/// then constant booleans, accessories and finally `null`.
struct SortKey {
    rank: SortRank,
    number: f64,
    is_float: bool,
    folded: String,
    text: String,
    precise: String,
}

impl SortKey {
    fn of(ty: &Type) -> Self {
        let (rank, number, is_float, text) = match ty.data() {
            TypeData::Null => (SortRank::Null, 0.0, false, String::new()),
            TypeData::Accessory(kind) => (SortRank::Accessory, 0.0, false, kind.describe()),
            TypeData::ConstantBoolean(value) => {
                (SortRank::ConstantBoolean, 0.0, false, value.to_string())
            }
            TypeData::ConstantInteger(value) => (SortRank::Number, *value as f64, false, String::new()),
            TypeData::ConstantFloat(value) => (SortRank::Number, value.0, true, String::new()),
            TypeData::ConstantString(value) => {
                (SortRank::ConstantString, 0.0, false, value.to_string())
            }
            // Empty shapes lead the other types.
            TypeData::ConstantArray(array) => (
                SortRank::Other,
                if array.is_empty() { 0.0 } else { 1.0 },
                false,
                describe(ty, VerbosityLevel::TypeOnly),
            ),
            _ => (SortRank::Other, 1.0, false, describe(ty, VerbosityLevel::TypeOnly)),
        };
        Self {
            rank,
            number,
            is_float,
            folded: text.to_ascii_lowercase(),
            text,
            precise: describe(ty, VerbosityLevel::Precise),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.number.total_cmp(&other.number))
            .then_with(|| self.is_float.cmp(&other.is_float))
            .then_with(|| self.folded.cmp(&other.folded))
            .then_with(|| self.text.cmp(&other.text))
            .then_with(|| self.precise.cmp(&other.precise))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Sort members into canonical order. Stable for members with equal keys.
pub(crate) fn sort_types(mut types: Vec<Type>) -> Vec<Type> {
    types.sort_by_cached_key(SortKey::of);
    types
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
