//! Type representation.
//!
//! A [`Type`] is a cheap, clonable handle (`Arc`) to an immutable [`TypeData`].
//! Every variant of the algebra is a case of the closed `TypeData` enum, so
//! every query site matches exhaustively and the compiler points at each
//! place a new variant has to be handled.
//!
//! Types are plain values: there is no interner and no shared store. Two
//! types are the same when [`Type::equals`] says so (structural equality,
//! multiset equality for unions and intersections).
//!
//! Unions and intersections must hold at least two members. The checked
//! constructors [`UnionType::new`] and [`IntersectionType::new`] enforce that;
//! the combinator (`TypeEngine::union` / `TypeEngine::intersect`) is the
//! normal way to build them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use smallvec::SmallVec;

use crate::error::TypeError;
use crate::format::{VerbosityLevel, sort_types};

/// Scratch buffer for member lists during normalization.
pub(crate) type TypeListBuffer = SmallVec<[Type; 8]>;

// =============================================================================
// Type handle
// =============================================================================

/// A type value. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Type(Arc<TypeData>);

/// The closed set of type variants.
#[derive(Debug, Clone)]
pub enum TypeData {
    /// The bottom type: no value inhabits it.
    Never,
    /// The top type. `explicit` records whether it was written by the user;
    /// it does not take part in equality.
    Mixed { explicit: bool },
    Null,
    Boolean,
    ConstantBoolean(bool),
    Integer,
    ConstantInteger(i64),
    Float,
    ConstantFloat(OrderedFloat),
    String,
    ConstantString(Arc<str>),
    /// `object`
    ObjectWithoutClass,
    Object(ObjectType),
    GenericObject(GenericObjectType),
    EnumCase(EnumCaseType),
    /// The common `callable` with no known signature.
    Callable,
    Closure(ClosureType),
    Iterable(IterableType),
    Array(ArrayType),
    ConstantArray(ConstantArrayType),
    Accessory(AccessoryKind),
    Template(TemplateType),
    Union(UnionType),
    Intersection(IntersectionType),
}

impl Type {
    pub fn new(data: TypeData) -> Self {
        Self(Arc::new(data))
    }

    #[inline]
    pub fn data(&self) -> &TypeData {
        &self.0
    }

    // -------------------------------------------------------------------------
    // Leaf constructors
    // -------------------------------------------------------------------------

    pub fn never() -> Self {
        Self::new(TypeData::Never)
    }

    pub fn mixed() -> Self {
        Self::new(TypeData::Mixed { explicit: false })
    }

    pub fn explicit_mixed() -> Self {
        Self::new(TypeData::Mixed { explicit: true })
    }

    pub fn null() -> Self {
        Self::new(TypeData::Null)
    }

    pub fn bool() -> Self {
        Self::new(TypeData::Boolean)
    }

    pub fn constant_bool(value: bool) -> Self {
        Self::new(TypeData::ConstantBoolean(value))
    }

    pub fn int() -> Self {
        Self::new(TypeData::Integer)
    }

    pub fn constant_int(value: i64) -> Self {
        Self::new(TypeData::ConstantInteger(value))
    }

    pub fn float() -> Self {
        Self::new(TypeData::Float)
    }

    pub fn constant_float(value: f64) -> Self {
        Self::new(TypeData::ConstantFloat(OrderedFloat(value)))
    }

    pub fn string() -> Self {
        Self::new(TypeData::String)
    }

    pub fn constant_string(value: impl AsRef<str>) -> Self {
        Self::new(TypeData::ConstantString(Arc::from(value.as_ref())))
    }

    pub fn object_without_class() -> Self {
        Self::new(TypeData::ObjectWithoutClass)
    }

    pub fn object(class_name: impl AsRef<str>) -> Self {
        Self::new(TypeData::Object(ObjectType {
            class_name: Arc::from(class_name.as_ref()),
        }))
    }

    pub fn generic_object(class_name: impl AsRef<str>, type_args: Vec<Type>) -> Self {
        Self::new(TypeData::GenericObject(GenericObjectType {
            class_name: Arc::from(class_name.as_ref()),
            type_args,
        }))
    }

    pub fn enum_case(class_name: impl AsRef<str>, case_name: impl AsRef<str>) -> Self {
        Self::new(TypeData::EnumCase(EnumCaseType {
            class_name: Arc::from(class_name.as_ref()),
            case_name: Arc::from(case_name.as_ref()),
        }))
    }

    pub fn callable() -> Self {
        Self::new(TypeData::Callable)
    }

    pub fn closure(parameters: Vec<Type>, return_type: Type) -> Self {
        Self::new(TypeData::Closure(ClosureType {
            parameters,
            return_type,
        }))
    }

    pub fn iterable(key: Type, item: Type) -> Self {
        Self::new(TypeData::Iterable(IterableType { key, item }))
    }

    pub fn array(key: Type, item: Type) -> Self {
        Self::new(TypeData::Array(ArrayType { key, item }))
    }

    pub fn constant_array(array: ConstantArrayType) -> Self {
        Self::new(TypeData::ConstantArray(array))
    }

    /// `array{}`
    pub fn empty_array() -> Self {
        Self::constant_array(ConstantArrayType::empty())
    }

    pub fn accessory(kind: AccessoryKind) -> Self {
        Self::new(TypeData::Accessory(kind))
    }

    pub fn non_empty_string() -> Self {
        Self::accessory(AccessoryKind::NonEmptyString)
    }

    pub fn non_falsy_string() -> Self {
        Self::accessory(AccessoryKind::NonFalsyString)
    }

    pub fn literal_string() -> Self {
        Self::accessory(AccessoryKind::LiteralString)
    }

    pub fn numeric_string() -> Self {
        Self::accessory(AccessoryKind::NumericString)
    }

    pub fn lowercase_string() -> Self {
        Self::accessory(AccessoryKind::LowercaseString)
    }

    pub fn uppercase_string() -> Self {
        Self::accessory(AccessoryKind::UppercaseString)
    }

    /// The "is a list" marker.
    pub fn array_list() -> Self {
        Self::accessory(AccessoryKind::ArrayList)
    }

    pub fn non_empty_array() -> Self {
        Self::accessory(AccessoryKind::NonEmptyArray)
    }

    pub fn oversized_array() -> Self {
        Self::accessory(AccessoryKind::OversizedArray)
    }

    pub fn has_property(name: impl AsRef<str>) -> Self {
        Self::accessory(AccessoryKind::HasProperty(Arc::from(name.as_ref())))
    }

    /// Method names are case-insensitive and stored lowercased.
    pub fn has_method(name: impl AsRef<str>) -> Self {
        Self::accessory(AccessoryKind::HasMethod(Arc::from(
            name.as_ref().to_ascii_lowercase(),
        )))
    }

    pub fn template(template: TemplateType) -> Self {
        Self::new(TypeData::Template(template))
    }

    pub fn from_union(union: UnionType) -> Self {
        Self::new(TypeData::Union(union))
    }

    pub fn from_intersection(intersection: IntersectionType) -> Self {
        Self::new(TypeData::Intersection(intersection))
    }

    // -------------------------------------------------------------------------
    // Shape accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn is_never(&self) -> bool {
        matches!(self.data(), TypeData::Never)
    }

    #[inline]
    pub fn is_mixed(&self) -> bool {
        matches!(self.data(), TypeData::Mixed { .. })
    }

    /// `mixed` that was not written explicitly. Templates bounded by mixed
    /// are not implicit mixed.
    #[inline]
    pub fn is_implicit_mixed(&self) -> bool {
        matches!(self.data(), TypeData::Mixed { explicit: false })
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self.data() {
            TypeData::Union(union) => Some(union),
            _ => None,
        }
    }

    pub fn as_intersection(&self) -> Option<&IntersectionType> {
        match self.data() {
            TypeData::Intersection(intersection) => Some(intersection),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<&TemplateType> {
        match self.data() {
            TypeData::Template(template) => Some(template),
            _ => None,
        }
    }

    pub fn as_constant_array(&self) -> Option<&ConstantArrayType> {
        match self.data() {
            TypeData::ConstantArray(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_accessory(&self) -> Option<&AccessoryKind> {
        match self.data() {
            TypeData::Accessory(kind) => Some(kind),
            _ => None,
        }
    }

    /// Types whose relations are decided from their own side: when one of
    /// these is the candidate of `is_super_type_of`, the query flips to
    /// `is_sub_type_of` on the candidate.
    pub fn is_compound(&self) -> bool {
        matches!(
            self.data(),
            TypeData::Never
                | TypeData::Mixed { .. }
                | TypeData::Callable
                | TypeData::Iterable(_)
                | TypeData::Accessory(_)
                | TypeData::Template(_)
                | TypeData::Union(_)
                | TypeData::Intersection(_)
        )
    }

    // -------------------------------------------------------------------------
    // Equality
    // -------------------------------------------------------------------------

    /// Structural equality.
    ///
    /// Union and intersection members compare as multisets. Class names
    /// compare case-insensitively, floats by bit pattern, and the explicit
    /// flag of `mixed` is ignored.
    pub fn equals(&self, other: &Type) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }

        use TypeData as D;
        match (self.data(), other.data()) {
            (D::Never, D::Never)
            | (D::Mixed { .. }, D::Mixed { .. })
            | (D::Null, D::Null)
            | (D::Boolean, D::Boolean)
            | (D::Integer, D::Integer)
            | (D::Float, D::Float)
            | (D::String, D::String)
            | (D::ObjectWithoutClass, D::ObjectWithoutClass)
            | (D::Callable, D::Callable) => true,
            (D::ConstantBoolean(a), D::ConstantBoolean(b)) => a == b,
            (D::ConstantInteger(a), D::ConstantInteger(b)) => a == b,
            (D::ConstantFloat(a), D::ConstantFloat(b)) => a == b,
            (D::ConstantString(a), D::ConstantString(b)) => a == b,
            (D::Object(a), D::Object(b)) => a.class_name.eq_ignore_ascii_case(&b.class_name),
            (D::GenericObject(a), D::GenericObject(b)) => {
                a.class_name.eq_ignore_ascii_case(&b.class_name)
                    && slice_equals(&a.type_args, &b.type_args)
            }
            (D::EnumCase(a), D::EnumCase(b)) => {
                a.class_name.eq_ignore_ascii_case(&b.class_name) && a.case_name == b.case_name
            }
            (D::Closure(a), D::Closure(b)) => {
                slice_equals(&a.parameters, &b.parameters) && a.return_type.equals(&b.return_type)
            }
            (D::Iterable(a), D::Iterable(b)) => a.key.equals(&b.key) && a.item.equals(&b.item),
            (D::Array(a), D::Array(b)) => a.key.equals(&b.key) && a.item.equals(&b.item),
            (D::ConstantArray(a), D::ConstantArray(b)) => {
                a.keys == b.keys && slice_equals(&a.values, &b.values)
            }
            (D::Accessory(a), D::Accessory(b)) => a == b,
            (D::Template(a), D::Template(b)) => a.equals(b),
            (D::Union(a), D::Union(b)) => {
                a.benevolent == b.benevolent && multiset_equals(&a.types, &b.types)
            }
            (D::Intersection(a), D::Intersection(b)) => multiset_equals(&a.types, &b.types),
            _ => false,
        }
    }

    /// Description at the given verbosity.
    pub fn describe(&self, level: VerbosityLevel) -> String {
        crate::format::describe(self, level)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(VerbosityLevel::Precise))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(VerbosityLevel::Precise))
    }
}

pub(crate) fn slice_equals(left: &[Type], right: &[Type]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| a.equals(b))
}

/// Unordered comparison: same size and a bijection under `equals`.
pub(crate) fn multiset_equals(left: &[Type], right: &[Type]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut remaining: TypeListBuffer = right.iter().cloned().collect();
    for ty in left {
        match remaining.iter().position(|candidate| candidate.equals(ty)) {
            Some(index) => {
                remaining.swap_remove(index);
            }
            None => return false,
        }
    }
    remaining.is_empty()
}

// =============================================================================
// Leaf payloads
// =============================================================================

/// A float compared and hashed by bit pattern, so constant floats can take
/// part in structural equality.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for OrderedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            f.write_str("NAN")
        } else if value.is_infinite() {
            f.write_str(if value > 0.0 { "INF" } else { "-INF" })
        } else if value.fract() == 0.0 && value.abs() < 1e15 {
            write!(f, "{value:.1}")
        } else {
            write!(f, "{value}")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub class_name: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct GenericObjectType {
    pub class_name: Arc<str>,
    pub type_args: Vec<Type>,
}

#[derive(Debug, Clone)]
pub struct EnumCaseType {
    pub class_name: Arc<str>,
    pub case_name: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct ClosureType {
    pub parameters: Vec<Type>,
    pub return_type: Type,
}

#[derive(Debug, Clone)]
pub struct IterableType {
    pub key: Type,
    pub item: Type,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub key: Type,
    pub item: Type,
}

// =============================================================================
// Constant arrays
// =============================================================================

/// A normalized array key, following the language's key coercion: decimal
/// integer strings become integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    String(Arc<str>),
}

impl ArrayKey {
    pub fn from_string(value: &str) -> Self {
        match canonical_decimal_int(value) {
            Some(int) => Self::Int(int),
            None => Self::String(Arc::from(value)),
        }
    }

    /// The key a constant scalar type coerces to, if it is one.
    pub fn from_type(ty: &Type) -> Option<Self> {
        match ty.data() {
            TypeData::ConstantInteger(value) => Some(Self::Int(*value)),
            TypeData::ConstantString(value) => Some(Self::from_string(value)),
            TypeData::ConstantBoolean(value) => Some(Self::Int(i64::from(*value))),
            TypeData::ConstantFloat(value) if value.0.is_finite() => {
                Some(Self::Int(value.0.trunc() as i64))
            }
            TypeData::Null => Some(Self::String(Arc::from(""))),
            _ => None,
        }
    }

    pub fn to_type(&self) -> Type {
        match self {
            Self::Int(value) => Type::constant_int(*value),
            Self::String(value) => Type::constant_string(value),
        }
    }
}

/// `"12"` and `"-3"` are integer keys; `"012"`, `"+1"`, `"-0"` and `"1.0"`
/// stay strings.
fn canonical_decimal_int(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if value == "-0" {
        return None;
    }
    value.parse().ok()
}

/// An array with an exactly known shape. Entries keep insertion order.
#[derive(Debug, Clone)]
pub struct ConstantArrayType {
    keys: Vec<ArrayKey>,
    values: Vec<Type>,
}

impl ConstantArrayType {
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from entries. A repeated key overwrites the earlier value in
    /// place, as an array literal would.
    pub fn new(entries: impl IntoIterator<Item = (ArrayKey, Type)>) -> Self {
        let mut array = Self::empty();
        for (key, value) in entries {
            array.set(key, value);
        }
        array
    }

    /// `array{v0, v1, ...}` with keys `0..n`.
    pub fn list(values: Vec<Type>) -> Self {
        Self {
            keys: (0..values.len() as i64).map(ArrayKey::Int).collect(),
            values,
        }
    }

    pub fn keys(&self) -> &[ArrayKey] {
        &self.keys
    }

    pub fn values(&self) -> &[Type] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ArrayKey, &Type)> {
        self.keys.iter().zip(&self.values)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Type> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .map(|index| &self.values[index])
    }

    /// Keys are exactly `0, 1, ..., n - 1` in order.
    pub fn is_list(&self) -> bool {
        self.keys
            .iter()
            .enumerate()
            .all(|(index, key)| *key == ArrayKey::Int(index as i64))
    }

    /// The key `$array[] = ...` would use.
    pub fn next_auto_index(&self) -> i64 {
        self.keys
            .iter()
            .filter_map(|key| match key {
                ArrayKey::Int(value) => Some(value.saturating_add(1)),
                ArrayKey::String(_) => None,
            })
            .max()
            .unwrap_or(0)
            .max(0)
    }

    pub(crate) fn set(&mut self, key: ArrayKey, value: Type) {
        match self.keys.iter().position(|candidate| *candidate == key) {
            Some(index) => self.values[index] = value,
            None => {
                self.keys.push(key);
                self.values.push(value);
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &ArrayKey) {
        if let Some(index) = self.keys.iter().position(|candidate| candidate == key) {
            self.keys.remove(index);
            self.values.remove(index);
        }
    }

    /// Renumber integer keys from zero, keeping string keys.
    pub(crate) fn reindexed(entries: Vec<(ArrayKey, Type)>) -> Self {
        let mut next = 0;
        Self::new(entries.into_iter().map(|(key, value)| match key {
            ArrayKey::Int(_) => {
                let key = ArrayKey::Int(next);
                next += 1;
                (key, value)
            }
            key @ ArrayKey::String(_) => (key, value),
        }))
    }

    pub(crate) fn owned_entries(&self) -> Vec<(ArrayKey, Type)> {
        self.keys.iter().cloned().zip(self.values.iter().cloned()).collect()
    }
}

// =============================================================================
// Accessories
// =============================================================================

/// Marker refinements. They carry no runtime value on their own and only
/// mean something inside an intersection with a base type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessoryKind {
    NonEmptyString,
    NonFalsyString,
    LiteralString,
    NumericString,
    LowercaseString,
    UppercaseString,
    ArrayList,
    NonEmptyArray,
    OversizedArray,
    HasProperty(Arc<str>),
    HasMethod(Arc<str>),
}

impl AccessoryKind {
    pub fn is_string_refinement(&self) -> bool {
        matches!(
            self,
            Self::NonEmptyString
                | Self::NonFalsyString
                | Self::LiteralString
                | Self::NumericString
                | Self::LowercaseString
                | Self::UppercaseString
        )
    }

    pub fn is_array_refinement(&self) -> bool {
        matches!(
            self,
            Self::ArrayList | Self::NonEmptyArray | Self::OversizedArray
        )
    }

    /// Whether every value carrying `self` also satisfies `other`.
    pub fn implies(&self, other: &AccessoryKind) -> bool {
        self == other
            || matches!(
                (self, other),
                (Self::NonFalsyString, Self::NonEmptyString)
                    | (Self::NumericString, Self::NonEmptyString)
            )
    }

    pub fn describe(&self) -> String {
        match self {
            Self::NonEmptyString => "non-empty-string".to_string(),
            Self::NonFalsyString => "non-falsy-string".to_string(),
            Self::LiteralString => "literal-string".to_string(),
            Self::NumericString => "numeric-string".to_string(),
            Self::LowercaseString => "lowercase-string".to_string(),
            Self::UppercaseString => "uppercase-string".to_string(),
            Self::ArrayList => "list".to_string(),
            Self::NonEmptyArray => "non-empty-array".to_string(),
            Self::OversizedArray => "oversized-array".to_string(),
            Self::HasProperty(name) => format!("hasProperty({name})"),
            Self::HasMethod(name) => format!("hasMethod({name})"),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Declared variance of a template parameter, or the variance of the
/// position a template occurs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
    Bivariant,
}

impl Variance {
    #[must_use]
    pub fn invert(self) -> Self {
        match self {
            Self::Covariant => Self::Contravariant,
            Self::Contravariant => Self::Covariant,
            other => other,
        }
    }

    /// Variance of a position nested at `inner` inside a position of
    /// variance `self`.
    #[must_use]
    pub fn compose(self, inner: Self) -> Self {
        match self {
            Self::Contravariant => inner.invert(),
            Self::Bivariant => Self::Bivariant,
            _ => inner,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Invariant => "invariant",
            Self::Covariant => "covariant",
            Self::Contravariant => "contravariant",
            Self::Bivariant => "bivariant",
        }
    }
}

/// Where a template was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TemplateScope {
    pub class_name: Option<Arc<str>>,
    pub function_name: Option<Arc<str>>,
}

impl TemplateScope {
    pub fn function(name: impl AsRef<str>) -> Self {
        Self {
            class_name: None,
            function_name: Some(Arc::from(name.as_ref())),
        }
    }

    pub fn class(name: impl AsRef<str>) -> Self {
        Self {
            class_name: Some(Arc::from(name.as_ref())),
            function_name: None,
        }
    }

    pub fn method(class_name: impl AsRef<str>, method_name: impl AsRef<str>) -> Self {
        Self {
            class_name: Some(Arc::from(class_name.as_ref())),
            function_name: Some(Arc::from(method_name.as_ref())),
        }
    }

    pub fn describe(&self) -> String {
        match (&self.class_name, &self.function_name) {
            (Some(class), Some(function)) => format!("method {class}::{function}()"),
            (Some(class), None) => format!("class {class}"),
            (None, Some(function)) => format!("function {function}()"),
            (None, None) => "unknown scope".to_string(),
        }
    }
}

/// A template used as a declared parameter binds during inference; one used
/// as an argument (already bound in an outer call) only participates in
/// relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateStrategy {
    Parameter,
    Argument,
}

#[derive(Debug, Clone)]
pub struct TemplateType {
    pub name: Arc<str>,
    pub scope: TemplateScope,
    pub bound: Type,
    pub variance: Variance,
    pub strategy: TemplateStrategy,
}

impl TemplateType {
    /// A parameter template. A missing bound means implicit `mixed`.
    pub fn new(
        scope: TemplateScope,
        name: impl AsRef<str>,
        bound: Option<Type>,
        variance: Variance,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            scope,
            bound: bound.unwrap_or_else(Type::mixed),
            variance,
            strategy: TemplateStrategy::Parameter,
        }
    }

    #[must_use]
    pub fn to_argument(&self) -> Self {
        Self {
            strategy: TemplateStrategy::Argument,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_bound(&self, bound: Type) -> Self {
        Self {
            bound,
            ..self.clone()
        }
    }

    pub fn is_argument(&self) -> bool {
        self.strategy == TemplateStrategy::Argument
    }

    pub fn equals(&self, other: &TemplateType) -> bool {
        self.name == other.name
            && self.scope == other.scope
            && self.variance == other.variance
            && self.strategy == other.strategy
            && self.bound.equals(&other.bound)
    }
}

// =============================================================================
// Union / Intersection
// =============================================================================

/// "Exactly one of" two or more member types.
#[derive(Debug, Clone)]
pub struct UnionType {
    types: Vec<Type>,
    benevolent: bool,
}

impl UnionType {
    /// Checked constructor: fails when given fewer than two members.
    pub fn new(types: Vec<Type>) -> Result<Self, TypeError> {
        if types.len() < 2 {
            return Err(TypeError::UnionArity {
                count: types.len(),
                described: describe_members(&types),
            });
        }
        Ok(Self::from_members(types, false))
    }

    /// A benevolent union: produced where precision was already given up,
    /// and answered with the more lenient folds.
    pub fn new_benevolent(types: Vec<Type>) -> Result<Self, TypeError> {
        let mut union = Self::new(types)?;
        union.benevolent = true;
        Ok(union)
    }

    pub(crate) fn from_members(types: Vec<Type>, benevolent: bool) -> Self {
        debug_assert!(types.len() >= 2, "union needs at least two members");
        Self { types, benevolent }
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn is_benevolent(&self) -> bool {
        self.benevolent
    }
}

/// "Simultaneously all of" two or more member types.
///
/// Member order is construction order. Rendering uses [`sorted_types`],
/// computed on first use and cached.
///
/// [`sorted_types`]: IntersectionType::sorted_types
#[derive(Debug, Clone)]
pub struct IntersectionType {
    types: Vec<Type>,
    sorted: OnceCell<Vec<Type>>,
}

impl IntersectionType {
    /// Checked constructor: fails when given fewer than two members.
    pub fn new(types: Vec<Type>) -> Result<Self, TypeError> {
        if types.len() < 2 {
            return Err(TypeError::IntersectionArity {
                count: types.len(),
                described: describe_members(&types),
            });
        }
        Ok(Self::from_members(types))
    }

    pub(crate) fn from_members(types: Vec<Type>) -> Self {
        debug_assert!(types.len() >= 2, "intersection needs at least two members");
        Self {
            types,
            sorted: OnceCell::new(),
        }
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// Members in canonical order, independent of construction order.
    pub fn sorted_types(&self) -> &[Type] {
        self.sorted.get_or_init(|| sort_types(self.types.clone()))
    }
}

fn describe_members(types: &[Type]) -> String {
    types
        .iter()
        .map(|ty| ty.describe(VerbosityLevel::Value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
