//! Error type for the few fallible operations of the type engine.
//!
//! Relational queries never fail: "don't know" is `TrinaryLogic::Maybe`.
//! Errors are reserved for invalid construction and for member lookups on a
//! type that does not have the member.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("cannot create an intersection of {count} type(s) [{described}]: at least two are required")]
    IntersectionArity { count: usize, described: String },

    #[error("cannot create a union of {count} type(s) [{described}]: at least two are required")]
    UnionArity { count: usize, described: String },

    #[error("property {name} does not exist on {type_description}")]
    UndefinedProperty {
        type_description: String,
        name: String,
    },

    #[error("method {name}() does not exist on {type_description}")]
    UndefinedMethod {
        type_description: String,
        name: String,
    },

    #[error("constant {name} does not exist on {type_description}")]
    UndefinedConstant {
        type_description: String,
        name: String,
    },
}
