//! Cadre Engine
//!
//! Expand macro concepts to a fixed point.
//!
//! Responsibilities:
//! - Seed the store in canonical order
//! - Invoke each macro concept's rules exactly once
//! - Defer concepts whose key references are not admitted yet
//! - Re-evaluate model-reading rules until nothing changes
//! - Stop runaway expansion at the depth and expansion ceilings
//! - Check closure and order the result for downstream consumers

mod config;
mod engine;
mod error;
mod model;

pub use config::{ConfigError, EngineConfig};
pub use engine::ExpansionEngine;
pub use error::{ExpansionError, ExpansionResult, Limit};
pub use model::{ExpandedModel, ExpansionStats};

/// Maximum derivation depth (seed = 0).
pub const MAX_DEPTH: usize = 100;

/// Maximum rule invocations per seed concept.
pub const MAX_EXPANSIONS: usize = 10_000;
