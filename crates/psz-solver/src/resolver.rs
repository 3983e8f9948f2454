//! Class reflection seam.
//!
//! The engine knows nothing about how classes are discovered. Everything it
//! needs about a class name (kind, finality, ancestry, members, declared
//! templates, iteration types) comes through a [`ClassResolver`].
//!
//! [`ClassRegistry`] is the in-memory implementation used by hosts that
//! already have the class data at hand, and by the tests.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::{TemplateType, Type};

/// Supplies class information by name. Names compare case-insensitively.
pub trait ClassResolver {
    fn get_class(&self, name: &str) -> Option<Arc<ClassReflection>>;

    /// `Some(true)` when `class_name` is `ancestor` or inherits from it,
    /// `Some(false)` when the class is known and does not, `None` when the
    /// class is unknown.
    fn is_subclass_of(&self, class_name: &str, ancestor: &str) -> Option<bool> {
        if class_name.eq_ignore_ascii_case(ancestor) {
            return Some(true);
        }
        let class = self.get_class(class_name)?;
        let mut visited = FxHashSet::default();
        let mut pending: Vec<Arc<str>> = class.parents().to_vec();
        while let Some(parent) = pending.pop() {
            if parent.eq_ignore_ascii_case(ancestor) {
                return Some(true);
            }
            if !visited.insert(parent.to_ascii_lowercase()) {
                continue;
            }
            if let Some(reflection) = self.get_class(&parent) {
                pending.extend(reflection.parents().iter().cloned());
            }
        }
        Some(false)
    }

    /// Find a property on the class or the nearest ancestor declaring it.
    fn find_property(&self, class_name: &str, name: &str) -> Option<PropertyReflection> {
        find_member(self, class_name, &|class: &ClassReflection| class.properties.get(name).cloned())
    }

    fn find_method(&self, class_name: &str, name: &str) -> Option<MethodReflection> {
        let key = name.to_ascii_lowercase();
        find_member(self, class_name, &|class: &ClassReflection| class.methods.get(key.as_str()).cloned())
    }

    fn find_constant(&self, class_name: &str, name: &str) -> Option<ConstantReflection> {
        find_member(self, class_name, &|class: &ClassReflection| class.constants.get(name).cloned())
    }
}

/// Breadth-first walk from the class through its parents.
fn find_member<R, T>(
    resolver: &R,
    class_name: &str,
    lookup: &dyn Fn(&ClassReflection) -> Option<T>,
) -> Option<T>
where
    R: ClassResolver + ?Sized,
{
    let mut visited = FxHashSet::default();
    let mut pending = std::collections::VecDeque::from([Arc::<str>::from(class_name)]);
    while let Some(name) = pending.pop_front() {
        if !visited.insert(name.to_ascii_lowercase()) {
            continue;
        }
        let Some(class) = resolver.get_class(&name) else {
            continue;
        };
        if let Some(found) = lookup(&class) {
            return Some(found);
        }
        pending.extend(class.parents().iter().cloned());
    }
    None
}

// ---------------------------------------------------------------------------
// Reflection data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Trait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone)]
pub struct PropertyReflection {
    pub name: Arc<str>,
    pub declaring_class: Arc<str>,
    pub readable_type: Type,
    pub writable_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct ParameterReflection {
    pub name: Arc<str>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct MethodReflection {
    pub name: Arc<str>,
    pub declaring_class: Arc<str>,
    pub parameters: Vec<ParameterReflection>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct ConstantReflection {
    pub name: Arc<str>,
    pub declaring_class: Arc<str>,
    pub ty: Type,
    pub visibility: Visibility,
}

/// Everything the engine asks about one class.
#[derive(Debug, Clone)]
pub struct ClassReflection {
    pub name: Arc<str>,
    pub kind: ClassKind,
    pub is_final: bool,
    /// Parent class first, then directly implemented or extended interfaces.
    parents: Vec<Arc<str>>,
    /// Type arguments given to generic parents, keyed by lowercased parent
    /// name. They may mention this class's templates.
    parent_type_args: FxHashMap<String, Vec<Type>>,
    /// Declared class-level templates, in order.
    pub template_types: Vec<TemplateType>,
    /// Key and value types for classes that iterate (may mention the
    /// class templates).
    pub iterable_types: Option<(Type, Type)>,
    pub properties: IndexMap<Arc<str>, PropertyReflection>,
    /// Keyed by lowercased name.
    pub methods: IndexMap<Arc<str>, MethodReflection>,
    pub constants: IndexMap<Arc<str>, ConstantReflection>,
    pub enum_cases: Vec<Arc<str>>,
}

impl ClassReflection {
    pub fn new(name: impl AsRef<str>, kind: ClassKind) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            kind,
            is_final: kind == ClassKind::Enum,
            parents: Vec::new(),
            parent_type_args: FxHashMap::default(),
            template_types: Vec::new(),
            iterable_types: None,
            properties: IndexMap::new(),
            methods: IndexMap::new(),
            constants: IndexMap::new(),
            enum_cases: Vec::new(),
        }
    }

    pub fn class(name: impl AsRef<str>) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: impl AsRef<str>) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn enumeration(name: impl AsRef<str>) -> Self {
        Self::new(name, ClassKind::Enum)
    }

    pub fn parents(&self) -> &[Arc<str>] {
        &self.parents
    }

    /// What this class passes to the templates of `parent`, if declared.
    pub fn parent_type_args(&self, parent: &str) -> Option<&[Type]> {
        self.parent_type_args
            .get(&parent.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    #[must_use]
    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }

    #[must_use]
    pub fn extends(mut self, parent: impl AsRef<str>) -> Self {
        self.parents.push(Arc::from(parent.as_ref()));
        self
    }

    #[must_use]
    pub fn implements(self, interface: impl AsRef<str>) -> Self {
        self.extends(interface)
    }

    /// `extends Parent<A, B>`.
    #[must_use]
    pub fn extends_generic(mut self, parent: impl AsRef<str>, type_args: Vec<Type>) -> Self {
        self.parent_type_args
            .insert(parent.as_ref().to_ascii_lowercase(), type_args);
        self.extends(parent)
    }

    #[must_use]
    pub fn implements_generic(self, interface: impl AsRef<str>, type_args: Vec<Type>) -> Self {
        self.extends_generic(interface, type_args)
    }

    #[must_use]
    pub fn with_template(mut self, template: TemplateType) -> Self {
        self.template_types.push(template);
        self
    }

    #[must_use]
    pub fn with_iterable_types(mut self, key: Type, value: Type) -> Self {
        self.iterable_types = Some((key, value));
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl AsRef<str>, ty: Type, visibility: Visibility) -> Self {
        let name: Arc<str> = Arc::from(name.as_ref());
        self.properties.insert(
            name.clone(),
            PropertyReflection {
                name,
                declaring_class: self.name.clone(),
                readable_type: ty.clone(),
                writable_type: ty,
                visibility,
                is_static: false,
            },
        );
        self
    }

    #[must_use]
    pub fn with_method(
        mut self,
        name: impl AsRef<str>,
        parameters: Vec<(&str, Type)>,
        return_type: Type,
        visibility: Visibility,
    ) -> Self {
        let name: Arc<str> = Arc::from(name.as_ref());
        self.methods.insert(
            Arc::from(name.to_ascii_lowercase()),
            MethodReflection {
                name,
                declaring_class: self.name.clone(),
                parameters: parameters
                    .into_iter()
                    .map(|(name, ty)| ParameterReflection {
                        name: Arc::from(name),
                        ty,
                    })
                    .collect(),
                return_type,
                visibility,
                is_static: false,
            },
        );
        self
    }

    #[must_use]
    pub fn with_constant(mut self, name: impl AsRef<str>, ty: Type, visibility: Visibility) -> Self {
        let name: Arc<str> = Arc::from(name.as_ref());
        self.constants.insert(
            name.clone(),
            ConstantReflection {
                name,
                declaring_class: self.name.clone(),
                ty,
                visibility,
            },
        );
        self
    }

    #[must_use]
    pub fn with_case(mut self, case_name: impl AsRef<str>) -> Self {
        self.enum_cases.push(Arc::from(case_name.as_ref()));
        self
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// In-memory resolver keyed by lowercased class name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<String, Arc<ClassReflection>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassReflection) {
        self.classes
            .insert(class.name.to_ascii_lowercase(), Arc::new(class));
    }

    #[must_use]
    pub fn with(mut self, class: ClassReflection) -> Self {
        self.insert(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassResolver for ClassRegistry {
    fn get_class(&self, name: &str) -> Option<Arc<ClassReflection>> {
        self.classes.get(&name.to_ascii_lowercase()).cloned()
    }
}

/// Resolver that knows no classes: every class relation answers `Maybe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

impl ClassResolver for NoopResolver {
    fn get_class(&self, _name: &str) -> Option<Arc<ClassReflection>> {
        None
    }
}

// ---------------------------------------------------------------------------
// Member access scope
// ---------------------------------------------------------------------------

/// Decides whether a member of the given visibility, declared on
/// `declaring_class`, is visible from the calling code.
pub trait MemberAccessScope {
    fn can_access(&self, declaring_class: &str, visibility: Visibility) -> bool;
}

/// Code outside any class: only public members.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutOfClassScope;

impl MemberAccessScope for OutOfClassScope {
    fn can_access(&self, _declaring_class: &str, visibility: Visibility) -> bool {
        visibility == Visibility::Public
    }
}

/// Code inside a class body.
#[derive(Debug, Clone)]
pub struct ClassScope {
    pub class_name: Arc<str>,
}

impl ClassScope {
    pub fn new(class_name: impl AsRef<str>) -> Self {
        Self {
            class_name: Arc::from(class_name.as_ref()),
        }
    }
}

impl MemberAccessScope for ClassScope {
    fn can_access(&self, declaring_class: &str, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Protected | Visibility::Private => {
                self.class_name.eq_ignore_ascii_case(declaring_class)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
