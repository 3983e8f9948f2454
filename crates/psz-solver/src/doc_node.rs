//! Doc-comment syntax trees.
//!
//! `Type::to_doc_node` turns a type into the `TypeNode` that would spell it
//! in a doc comment; `Display` prints the node. Markers that doc syntax has
//! no word for (oversized arrays, has-member checks) are dropped.

use std::collections::BTreeMap;
use std::fmt;

use crate::format::{describe_array_key, export_string};
use crate::types::{
    AccessoryKind, ArrayKey, ArrayType, ConstantArrayType, IntersectionType, OrderedFloat, Type,
    TypeData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayShapeKind {
    Array,
    List,
    NonEmptyArray,
    NonEmptyList,
}

impl ArrayShapeKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::NonEmptyArray => "non-empty-array",
            Self::NonEmptyList => "non-empty-list",
        }
    }

    fn is_list(self) -> bool {
        matches!(self, Self::List | Self::NonEmptyList)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstExprNode {
    Integer(i64),
    Float(OrderedFloat),
    String(String),
    /// `Class::CASE`
    ClassConstant { class_name: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShapeItem {
    pub key: Option<ArrayKey>,
    pub value: TypeNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Identifier(String),
    Generic {
        name: String,
        arguments: Vec<TypeNode>,
    },
    ArrayShape {
        kind: ArrayShapeKind,
        items: Vec<ArrayShapeItem>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Callable {
        name: String,
        parameters: Vec<TypeNode>,
        return_type: Box<TypeNode>,
    },
    Const(ConstExprNode),
}

impl TypeNode {
    fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    fn generic(name: impl Into<String>, arguments: Vec<TypeNode>) -> Self {
        Self::Generic {
            name: name.into(),
            arguments,
        }
    }

    fn is_empty_identifier(&self) -> bool {
        matches!(self, Self::Identifier(name) if name.is_empty())
    }
}

// =============================================================================
// Printing
// =============================================================================

impl fmt::Display for ConstExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(&export_string(value)),
            Self::ClassConstant { class_name, name } => write!(f, "{class_name}::{name}"),
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Generic { name, arguments } => {
                write!(f, "{name}<{}>", join(arguments, ", ", |_| false))
            }
            Self::ArrayShape { kind, items } => {
                let items = items
                    .iter()
                    .map(|item| match &item.key {
                        Some(key) if !kind.is_list() => {
                            format!("{}: {}", describe_array_key(key), item.value)
                        }
                        _ => item.value.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}{{{items}}}", kind.as_str())
            }
            Self::Union(members) => f.write_str(&join(members, "|", |member| {
                matches!(member, Self::Intersection(_) | Self::Callable { .. })
            })),
            Self::Intersection(members) => f.write_str(&join(members, "&", |member| {
                matches!(member, Self::Union(_) | Self::Callable { .. })
            })),
            Self::Callable {
                name,
                parameters,
                return_type,
            } => {
                let return_type = if matches!(
                    **return_type,
                    Self::Union(_) | Self::Intersection(_) | Self::Callable { .. }
                ) {
                    format!("({return_type})")
                } else {
                    return_type.to_string()
                };
                write!(
                    f,
                    "{name}({}): {return_type}",
                    join(parameters, ", ", |_| false)
                )
            }
            Self::Const(expr) => write!(f, "{expr}"),
        }
    }
}

fn join(nodes: &[TypeNode], separator: &str, parenthesize: impl Fn(&TypeNode) -> bool) -> String {
    nodes
        .iter()
        .map(|node| {
            if parenthesize(node) {
                format!("({node})")
            } else {
                node.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Conversion
// =============================================================================

impl Type {
    pub fn to_doc_node(&self) -> TypeNode {
        match self.data() {
            TypeData::Never => TypeNode::identifier("never"),
            TypeData::Mixed { .. } => TypeNode::identifier("mixed"),
            TypeData::Null => TypeNode::identifier("null"),
            TypeData::Boolean => TypeNode::identifier("bool"),
            TypeData::ConstantBoolean(value) => {
                TypeNode::identifier(if *value { "true" } else { "false" })
            }
            TypeData::Integer => TypeNode::identifier("int"),
            TypeData::ConstantInteger(value) => TypeNode::Const(ConstExprNode::Integer(*value)),
            TypeData::Float => TypeNode::identifier("float"),
            TypeData::ConstantFloat(value) => TypeNode::Const(ConstExprNode::Float(*value)),
            TypeData::String => TypeNode::identifier("string"),
            TypeData::ConstantString(value) => {
                TypeNode::Const(ConstExprNode::String(value.to_string()))
            }
            TypeData::ObjectWithoutClass => TypeNode::identifier("object"),
            TypeData::Object(object) => TypeNode::identifier(&*object.class_name),
            TypeData::GenericObject(object) => TypeNode::generic(
                &*object.class_name,
                object.type_args.iter().map(Type::to_doc_node).collect(),
            ),
            TypeData::EnumCase(case) => TypeNode::Const(ConstExprNode::ClassConstant {
                class_name: case.class_name.to_string(),
                name: case.case_name.to_string(),
            }),
            TypeData::Callable => TypeNode::identifier("callable"),
            TypeData::Closure(closure) => TypeNode::Callable {
                name: "Closure".to_string(),
                parameters: closure.parameters.iter().map(Type::to_doc_node).collect(),
                return_type: Box::new(closure.return_type.to_doc_node()),
            },
            TypeData::Iterable(iterable) => {
                key_value_node("iterable", &iterable.key, &iterable.item)
            }
            TypeData::Array(array) => array_node(array, "array"),
            TypeData::ConstantArray(array) => shape_node(array, ArrayShapeKind::Array),
            TypeData::Accessory(kind) => accessory_node(kind),
            TypeData::Template(template) => TypeNode::identifier(&*template.name),
            TypeData::Union(union) => {
                let node = TypeNode::Union(union.types().iter().map(Type::to_doc_node).collect());
                if union.is_benevolent() {
                    TypeNode::generic("__benevolent", vec![node])
                } else {
                    node
                }
            }
            TypeData::Intersection(intersection) => intersection_node(self, intersection),
        }
    }
}

fn key_value_node(name: &str, key: &Type, item: &Type) -> TypeNode {
    if !key.is_implicit_mixed() {
        TypeNode::generic(name, vec![key.to_doc_node(), item.to_doc_node()])
    } else if !item.is_implicit_mixed() {
        TypeNode::generic(name, vec![item.to_doc_node()])
    } else {
        TypeNode::identifier(name)
    }
}

fn array_node(array: &ArrayType, name: &str) -> TypeNode {
    key_value_node(name, &array.key, &array.item)
}

fn shape_node(array: &ConstantArrayType, kind: ArrayShapeKind) -> TypeNode {
    TypeNode::ArrayShape {
        kind,
        items: array
            .entries()
            .map(|(key, value)| ArrayShapeItem {
                key: (!array.is_list()).then(|| key.clone()),
                value: value.to_doc_node(),
            })
            .collect(),
    }
}

fn accessory_node(kind: &AccessoryKind) -> TypeNode {
    match kind {
        AccessoryKind::OversizedArray | AccessoryKind::HasProperty(_) | AccessoryKind::HasMethod(_) => {
            TypeNode::identifier("")
        }
        _ => TypeNode::identifier(kind.describe()),
    }
}

/// Array members absorb the list and non-empty markers; string refinements
/// absorb the `string` base.
fn intersection_node(ty: &Type, intersection: &IntersectionType) -> TypeNode {
    let is_list = ty.is_list().is_yes();
    let is_array = ty.is_array().is_yes();
    let is_non_empty_array = ty.is_iterable_at_least_once().is_yes();

    let mut described: BTreeMap<usize, TypeNode> = BTreeMap::new();
    let mut bases: Vec<(usize, &Type)> = Vec::new();
    let mut markers: Vec<(usize, &AccessoryKind)> = Vec::new();
    let mut skipped_names: Vec<&str> = Vec::new();
    let mut non_falsy = false;

    for (index, member) in intersection.sorted_types().iter().enumerate() {
        if let TypeData::Accessory(kind) = member.data()
            && kind.is_string_refinement()
        {
            non_falsy |= *kind == AccessoryKind::NonFalsyString;
            markers.push((index, kind));
            skipped_names.push("string");
            continue;
        }

        if is_list || is_array {
            match member.data() {
                TypeData::Array(array) => {
                    let node = if is_list {
                        let name = if is_non_empty_array { "non-empty-list" } else { "list" };
                        if array.item.is_implicit_mixed() {
                            TypeNode::identifier(name)
                        } else {
                            TypeNode::generic(name, vec![array.item.to_doc_node()])
                        }
                    } else {
                        let name = if is_non_empty_array { "non-empty-array" } else { "array" };
                        array_node(array, name)
                    };
                    described.insert(index, node);
                    continue;
                }
                TypeData::ConstantArray(array) => {
                    let widened = is_non_empty_array && array.is_empty();
                    let kind = match (is_list, widened) {
                        (true, true) => ArrayShapeKind::NonEmptyList,
                        (true, false) => ArrayShapeKind::List,
                        (false, true) => ArrayShapeKind::NonEmptyArray,
                        (false, false) => ArrayShapeKind::Array,
                    };
                    described.insert(index, shape_node(array, kind));
                    continue;
                }
                TypeData::Accessory(AccessoryKind::NonEmptyArray | AccessoryKind::ArrayList) => {
                    continue;
                }
                _ => {}
            }
        }

        match member.data() {
            TypeData::Accessory(kind) => {
                if !accessory_node(kind).is_empty_identifier() {
                    markers.push((index, kind));
                }
            }
            _ => bases.push((index, member)),
        }
    }

    if non_falsy {
        markers.retain(|(_, kind)| **kind != AccessoryKind::NonEmptyString);
    }

    for (index, base) in bases {
        let node = base.to_doc_node();
        if let TypeNode::Generic { name, arguments } = &node
            && name == "array"
        {
            // A general array next to free-standing array markers.
            let mut arguments = arguments.clone();
            let mut list = false;
            let mut non_empty = false;
            markers.retain(|(_, kind)| match kind {
                AccessoryKind::ArrayList => {
                    list = true;
                    false
                }
                AccessoryKind::NonEmptyArray => {
                    non_empty = true;
                    false
                }
                _ => true,
            });
            if list && arguments.len() > 1 {
                arguments.remove(0);
            }
            let name = match (non_empty, list) {
                (true, true) => "non-empty-list",
                (true, false) => "non-empty-array",
                (false, true) => "list",
                (false, false) => "array",
            };
            described.insert(index, TypeNode::generic(name, arguments));
            continue;
        }
        if let TypeNode::Identifier(name) = &node
            && skipped_names.contains(&name.as_str())
        {
            continue;
        }
        described.insert(index, node);
    }
    for (index, kind) in markers {
        described.insert(index, accessory_node(kind));
    }

    let mut nodes: Vec<TypeNode> = described.into_values().collect();
    if nodes.len() == 1 {
        return nodes.remove(0);
    }
    TypeNode::Intersection(nodes)
}

#[cfg(test)]
#[path = "../tests/doc_node_tests.rs"]
mod tests;
