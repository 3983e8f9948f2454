//! Type Representation and Relation Engine
//!
//! This crate implements the type algebra of a static analyser for a
//! dynamically typed language. It uses:
//!
//! - **Value types**: `Type` is an `Arc` handle to a closed `TypeData` enum,
//!   compared structurally
//! - **Three-valued logic**: every relation answers `Yes`, `Maybe` or `No`
//! - **A class resolver seam**: class facts come from a `ClassResolver`
//!
//! The algorithms that combine or relate types (union, intersection,
//! subtyping, acceptance, template inference, array operations) live on
//! [`TypeEngine`], which carries the resolver, the options and the recursion
//! guard. Queries that need no class information are methods on [`Type`].
mod array_ops;
mod combinator;
pub mod conversions;
pub mod doc_node;
mod engine;
pub mod error;
mod finite;
pub mod format;
pub mod infer;
mod intersection;
pub mod members;
mod queries;
pub mod recursion;
mod relations;
pub mod resolver;
pub mod trinary;
pub mod types;

pub use doc_node::TypeNode;
pub use engine::TypeEngine;
pub use error::TypeError;
pub use format::VerbosityLevel;
pub use infer::{TemplateTypeMap, TemplateTypeReference};
pub use members::{
    ExtendedMethodReflection, ExtendedPropertyReflection, UnresolvedMethodPrototype,
    UnresolvedPropertyPrototype,
};
pub use psz_common::SolverOptions;
pub use resolver::{
    ClassKind, ClassReflection, ClassRegistry, ClassResolver, ClassScope, MemberAccessScope,
    NoopResolver, OutOfClassScope, Visibility,
};
pub use trinary::{AcceptsResult, TrinaryLogic};
pub use types::{
    AccessoryKind, ArrayKey, ConstantArrayType, IntersectionType, OrderedFloat, TemplateScope,
    TemplateStrategy, TemplateType, Type, TypeData, UnionType, Variance,
};

// Test modules are loaded by their source files via #[path = "../tests/..."]
// declarations; shared class fixtures live here.
#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
