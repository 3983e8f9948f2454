//! Tracing configuration for debugging type-engine decisions.
//!
//! Supports two output formats controlled by `PSZ_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `json`: one JSON object per event, machine-readable
//!
//! ## Quick start
//!
//! ```bash
//! # Recursion-limit hits and enumeration cut-offs
//! PSZ_LOG=debug cargo test -p psz-solver
//!
//! # Every combinator result, as JSON lines
//! PSZ_LOG="psz_solver::combinator=trace" PSZ_LOG_FORMAT=json cargo test -p psz-solver
//! ```
//!
//! The subscriber is only installed when `PSZ_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `PSZ_LOG_FORMAT` value. Unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("PSZ_LOG_FORMAT").unwrap_or_default())
    }
}

/// `PSZ_LOG` takes precedence over `RUST_LOG` when both are set.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("PSZ_LOG") {
        return Some(EnvFilter::builder().parse_lossy(val));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    None
}

/// Install the global tracing subscriber.
///
/// Does nothing when neither `PSZ_LOG` nor `RUST_LOG` is set, and does
/// nothing when a subscriber is already installed (tests call this from
/// several places). All output goes to stderr.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };

    // try_init: a second call must not panic.
    let _ = match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
