//! Scalar conversions: the type a value has after a cast.
//!
//! Literal inputs convert to literals where the runtime result is known.
//! Casts that fail or only warn at runtime (an array to string, an object
//! to int) answer `never`.

use crate::engine::TypeEngine;
use crate::relations::UnrestrictedScope;
use crate::types::{AccessoryKind, ArrayKey, ConstantArrayType, Type, TypeData};

/// Whether `value` is a numeric string: optional surrounding whitespace, a
/// sign, decimal digits with an optional fraction, and an optional
/// exponent.
pub fn is_numeric_str(value: &str) -> bool {
    let trimmed = value.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
    let body = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(position) => (&body[..position], Some(&body[position + 1..])),
        None => (body, None),
    };
    let (integral, fraction) = match mantissa.split_once('.') {
        Some((integral, fraction)) => (integral, Some(fraction)),
        None => (mantissa, None),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let digit_count = integral.len() + fraction.map_or(0, str::len);
    if digit_count == 0 || !all_digits(integral) || !fraction.is_none_or(all_digits) {
        return false;
    }
    match exponent {
        None => true,
        Some(exponent) => {
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

/// The number a numeric string denotes: an integer when it is written as
/// one and fits, a float otherwise.
fn parse_numeric(value: &str) -> Option<Type> {
    if !is_numeric_str(value) {
        return None;
    }
    let trimmed = value.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Type::constant_int(int));
    }
    trimmed.parse::<f64>().ok().map(Type::constant_float)
}

/// Leading-number semantics of an integer cast: `"12abc"` is 12, `"abc"`
/// is 0.
fn leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    if let Some(number) = parse_numeric(trimmed) {
        return match number.data() {
            TypeData::ConstantInteger(int) => *int,
            TypeData::ConstantFloat(float) => float_to_int(float.0).unwrap_or(0),
            _ => 0,
        };
    }
    let end = trimmed
        .char_indices()
        .find(|(index, c)| !(c.is_ascii_digit() || (*index == 0 && matches!(c, '+' | '-'))))
        .map_or(trimmed.len(), |(index, _)| index);
    trimmed[..end].parse().unwrap_or(0)
}

fn leading_float(value: &str) -> f64 {
    let trimmed = value.trim_start();
    (1..=trimmed.len())
        .rev()
        .filter(|end| trimmed.is_char_boundary(*end))
        .find_map(|end| {
            let prefix = &trimmed[..end];
            is_numeric_str(prefix)
                .then(|| prefix.trim_end().parse::<f64>().ok())
                .flatten()
        })
        .unwrap_or(0.0)
}

fn float_to_int(value: f64) -> Option<i64> {
    if !value.is_finite() || value.abs() >= 9.223_372_036_854_775_807e18 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// How a float prints when cast to string: whole numbers without a
/// fraction.
fn float_to_string(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

impl TypeEngine<'_> {
    pub fn to_boolean(&self, ty: &Type) -> Type {
        self.guarded("to_boolean", Type::bool, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Null => Type::constant_bool(false),
            TypeData::ConstantBoolean(_) => ty.clone(),
            TypeData::ConstantInteger(value) => Type::constant_bool(*value != 0),
            TypeData::ConstantFloat(value) => Type::constant_bool(value.0 != 0.0),
            TypeData::ConstantString(value) => {
                Type::constant_bool(!value.is_empty() && &**value != "0")
            }
            TypeData::ObjectWithoutClass
            | TypeData::Object(_)
            | TypeData::GenericObject(_)
            | TypeData::EnumCase(_)
            | TypeData::Closure(_)
            | TypeData::Callable => Type::constant_bool(true),
            TypeData::ConstantArray(array) => Type::constant_bool(!array.is_empty()),
            TypeData::Array(_) | TypeData::Iterable(_) => Type::bool(),
            TypeData::Accessory(kind) => match kind {
                AccessoryKind::NonFalsyString
                | AccessoryKind::NonEmptyArray
                | AccessoryKind::HasProperty(_)
                | AccessoryKind::HasMethod(_) => Type::constant_bool(true),
                _ => Type::bool(),
            },
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_boolean(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => self.intersection_to_boolean(intersection),
            TypeData::Template(template) => self.to_boolean(&template.bound),
            TypeData::Mixed { .. }
            | TypeData::Boolean
            | TypeData::Integer
            | TypeData::Float
            | TypeData::String => Type::bool(),
        })
    }

    /// The type of a value used in arithmetic.
    pub fn to_number(&self, ty: &Type) -> Type {
        self.guarded("to_number", Type::mixed, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Integer
            | TypeData::ConstantInteger(_)
            | TypeData::Float
            | TypeData::ConstantFloat(_) => ty.clone(),
            TypeData::Null => Type::constant_int(0),
            TypeData::ConstantBoolean(value) => Type::constant_int(i64::from(*value)),
            TypeData::Boolean => self.union(vec![Type::constant_int(0), Type::constant_int(1)]),
            TypeData::ConstantString(value) => parse_numeric(value).unwrap_or_else(Type::never),
            TypeData::String => self.union(vec![Type::int(), Type::float()]),
            TypeData::Accessory(kind) if kind.is_string_refinement() => {
                self.union(vec![Type::int(), Type::float()])
            }
            TypeData::Mixed { .. } | TypeData::Accessory(_) => Type::mixed(),
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_number(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => self.intersect(
                intersection
                    .types()
                    .iter()
                    .map(|member| self.to_number(member))
                    .collect(),
            ),
            TypeData::Template(template) => self.to_number(&template.bound),
            _ => Type::never(),
        })
    }

    pub fn to_integer(&self, ty: &Type) -> Type {
        self.guarded("to_integer", Type::int, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Integer | TypeData::ConstantInteger(_) => ty.clone(),
            TypeData::Null => Type::constant_int(0),
            TypeData::ConstantBoolean(value) => Type::constant_int(i64::from(*value)),
            TypeData::Boolean => self.union(vec![Type::constant_int(0), Type::constant_int(1)]),
            TypeData::ConstantFloat(value) => {
                float_to_int(value.0).map_or_else(Type::int, Type::constant_int)
            }
            TypeData::ConstantString(value) => Type::constant_int(leading_int(value)),
            TypeData::ConstantArray(array) => Type::constant_int(i64::from(!array.is_empty())),
            TypeData::Array(_) => self.union(vec![Type::constant_int(0), Type::constant_int(1)]),
            TypeData::Float | TypeData::String | TypeData::Mixed { .. } => Type::int(),
            TypeData::Accessory(kind) if kind.is_string_refinement() => Type::int(),
            TypeData::Accessory(kind) if kind.is_array_refinement() => {
                self.union(vec![Type::constant_int(0), Type::constant_int(1)])
            }
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_integer(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => self.intersect(
                intersection
                    .types()
                    .iter()
                    .map(|member| self.to_integer(member))
                    .collect(),
            ),
            TypeData::Template(template) => self.to_integer(&template.bound),
            _ => Type::never(),
        })
    }

    pub fn to_float(&self, ty: &Type) -> Type {
        self.guarded("to_float", Type::float, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Float | TypeData::ConstantFloat(_) => ty.clone(),
            TypeData::Null => Type::constant_float(0.0),
            TypeData::ConstantBoolean(value) => Type::constant_float(f64::from(u8::from(*value))),
            TypeData::ConstantInteger(value) => Type::constant_float(*value as f64),
            TypeData::ConstantString(value) => Type::constant_float(leading_float(value)),
            TypeData::ConstantArray(array) => {
                Type::constant_float(if array.is_empty() { 0.0 } else { 1.0 })
            }
            TypeData::Boolean
            | TypeData::Integer
            | TypeData::String
            | TypeData::Array(_)
            | TypeData::Mixed { .. } => Type::float(),
            TypeData::Accessory(kind)
                if kind.is_string_refinement() || kind.is_array_refinement() =>
            {
                Type::float()
            }
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_float(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => self.intersect(
                intersection
                    .types()
                    .iter()
                    .map(|member| self.to_float(member))
                    .collect(),
            ),
            TypeData::Template(template) => self.to_float(&template.bound),
            _ => Type::never(),
        })
    }

    pub fn to_string(&self, ty: &Type) -> Type {
        self.guarded("to_string", Type::string, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::String | TypeData::ConstantString(_) => ty.clone(),
            TypeData::Null => Type::constant_string(""),
            TypeData::ConstantBoolean(value) => Type::constant_string(if *value { "1" } else { "" }),
            TypeData::Boolean => {
                self.union(vec![Type::constant_string("1"), Type::constant_string("")])
            }
            TypeData::ConstantInteger(value) => Type::constant_string(value.to_string()),
            TypeData::ConstantFloat(value) => Type::constant_string(float_to_string(value.0)),
            TypeData::Integer | TypeData::Float => {
                self.intersect(vec![Type::string(), Type::numeric_string()])
            }
            TypeData::Accessory(kind) if kind.is_string_refinement() => ty.clone(),
            TypeData::Mixed { .. } => Type::string(),
            TypeData::Object(_) | TypeData::GenericObject(_) | TypeData::ObjectWithoutClass => {
                let stringable = self.has_method(ty, "__toString", &UnrestrictedScope);
                if stringable.is_no() {
                    Type::never()
                } else {
                    Type::string()
                }
            }
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_string(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => self.intersect(
                intersection
                    .types()
                    .iter()
                    .map(|member| self.to_string(member))
                    .collect(),
            ),
            TypeData::Template(template) => self.to_string(&template.bound),
            _ => Type::never(),
        })
    }

    /// The key a value becomes when used as an array offset.
    pub fn to_array_key(&self, ty: &Type) -> Type {
        self.guarded("to_array_key", Type::mixed, || match ty.data() {
            TypeData::Never => Type::never(),
            TypeData::Integer | TypeData::ConstantInteger(_) => ty.clone(),
            TypeData::Null
            | TypeData::ConstantBoolean(_)
            | TypeData::ConstantFloat(_)
            | TypeData::ConstantString(_) => match ArrayKey::from_type(ty) {
                Some(key) => key.to_type(),
                None => Type::int(),
            },
            TypeData::Boolean => self.union(vec![Type::constant_int(0), Type::constant_int(1)]),
            TypeData::Float => Type::int(),
            TypeData::String => ty.clone(),
            TypeData::Accessory(AccessoryKind::NumericString) => Type::int(),
            TypeData::Accessory(kind) if kind.is_string_refinement() => ty.clone(),
            TypeData::Mixed { .. } | TypeData::Callable => {
                self.benevolent_union(vec![Type::int(), Type::string()])
            }
            TypeData::Union(union) => self.union(
                union
                    .types()
                    .iter()
                    .map(|member| self.to_array_key(member))
                    .collect(),
            ),
            TypeData::Intersection(intersection) => {
                self.intersection_to_array_key(ty, intersection)
            }
            TypeData::Template(template) => self.to_array_key(&template.bound),
            _ => Type::never(),
        })
    }

    pub fn to_array(&self, ty: &Type) -> Type {
        self.guarded("to_array", || Type::array(Type::mixed(), Type::mixed()), || {
            match ty.data() {
                TypeData::Never => Type::never(),
                TypeData::Array(_) | TypeData::ConstantArray(_) => ty.clone(),
                TypeData::Null => Type::empty_array(),
                TypeData::Boolean
                | TypeData::ConstantBoolean(_)
                | TypeData::Integer
                | TypeData::ConstantInteger(_)
                | TypeData::Float
                | TypeData::ConstantFloat(_)
                | TypeData::String
                | TypeData::ConstantString(_)
                | TypeData::Closure(_) => {
                    Type::constant_array(ConstantArrayType::list(vec![ty.clone()]))
                }
                TypeData::Iterable(iterable) => {
                    Type::array(iterable.key.clone(), iterable.item.clone())
                }
                TypeData::ObjectWithoutClass
                | TypeData::Object(_)
                | TypeData::GenericObject(_)
                | TypeData::EnumCase(_) => Type::array(Type::string(), Type::mixed()),
                TypeData::Accessory(kind) if kind.is_array_refinement() => ty.clone(),
                TypeData::Accessory(_) | TypeData::Callable => Type::mixed(),
                TypeData::Mixed { .. } => Type::array(Type::mixed(), Type::mixed()),
                TypeData::Union(union) => self.union(
                    union
                        .types()
                        .iter()
                        .map(|member| self.to_array(member))
                        .collect(),
                ),
                TypeData::Intersection(intersection) => self.intersect(
                    intersection
                        .types()
                        .iter()
                        .map(|member| self.to_array(member))
                        .collect(),
                ),
                TypeData::Template(template) => self.to_array(&template.bound),
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/conversions_tests.rs"]
mod tests;
