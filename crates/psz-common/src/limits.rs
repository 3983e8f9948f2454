//! Centralized limits and thresholds for the psz type engine.
//!
//! Every recursive algorithm in the solver is bounded by one of the values
//! below. They are hard caps: when a cap is reached the query answers its
//! neutral "unknown" value instead of continuing.
//!
//! # Categories
//!
//! - **Recursion Depths**: nesting limits for relations, combination,
//!   inference and rendering
//! - **Enumeration Limits**: maximum sizes of materialized value sets
//! - **Rendering Limits**: truncation of literal values in descriptions

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for type relation queries.
///
/// Covers `is_super_type_of`, `accepts`, the combinator and template
/// inference, which all recurse into each other. Reflection-backed object
/// types can reach themselves again through declared property or iterable
/// types; the depth cap is what guarantees termination for such graphs.
///
/// When exceeded, relations answer `Maybe`, the combinator returns its
/// input unchanged and inference returns an empty map.
pub const MAX_TYPE_RELATION_DEPTH: u32 = 100;

/// Maximum nesting depth when rendering a type description.
///
/// Past this depth the remaining structure renders as `...`.
pub const MAX_DESCRIBE_DEPTH: u32 = 64;

/// Maximum depth for template inference walks.
pub const MAX_INFERENCE_DEPTH: u32 = 50;

// =============================================================================
// Enumeration Limits
// =============================================================================

/// Maximum number of finite values materialized for a single type.
///
/// `get_finite_types` on unions, intersections and constant arrays gives up
/// (returns an empty set, meaning "not finitely enumerable") instead of
/// building a larger set.
pub const CALCULATE_SCALARS_LIMIT: usize = 128;

/// Maximum number of members a union may distribute over when an
/// intersection contains several unions.
pub const MAX_INTERSECTION_DISTRIBUTION: usize = 256;

// =============================================================================
// Rendering Limits
// =============================================================================

/// Maximum number of characters of a constant string shown at the `Value`
/// verbosity level. Longer values are cut and suffixed with `...`.
pub const CONSTANT_STRING_DESCRIBE_LIMIT: usize = 20;

/// Maximum number of entries of a constant array shown at the `Value`
/// verbosity level. Further entries render as `...`.
pub const CONSTANT_ARRAY_DESCRIBE_LIMIT: usize = 8;
