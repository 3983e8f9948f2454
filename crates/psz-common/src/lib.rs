//! Common limits, configuration and tracing setup for the psz type engine.
//!
//! This crate provides the pieces shared by every psz crate:
//! - Engine limits and thresholds (`limits`)
//! - Engine configuration (`SolverOptions`)
//! - Tracing subscriber bootstrap (`tracing_config`)

// Centralized limits and thresholds
pub mod limits;

// Engine configuration
pub mod options;
pub use options::SolverOptions;

// Opt-in tracing output
pub mod tracing_config;
