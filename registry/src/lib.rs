//! Cadre Registry
//!
//! Macro registry: declared concept kinds plus the expansion rules for each.
//! The registry is immutable after construction via RegistryBuilder, so the
//! rule set is closed before any expansion starts.

mod builder;
mod registry;
mod rule;

pub use builder::{KindBuilder, RegistryBuilder, RegistryError};
pub use registry::Registry;
pub use rule::{rule_fn, ExpansionRule, FnRule, RuleFailure};
