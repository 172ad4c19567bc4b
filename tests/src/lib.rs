//! Cadre Integration Test Framework
//!
//! Provides a fluent API for writing expansion scenarios against Cadre.
//!
//! A scenario names a registry setup (the standard concepts by default), a
//! set of seed concepts and the assertions the expanded model must satisfy.
//!
//! # Example
//!
//! ```ignore
//! use cadre_tests::prelude::*;
//!
//! #[test]
//! fn test_monitored_book() {
//!     let book = entity("Bookstore", "Book");
//!     Scenario::new("monitored_book")
//!         .seed(monitored(&book.key()))
//!         .seed(book)
//!         .expect(|a| a.concepts(9).contains("AuditLog Common"))
//!         .run()
//!         .unwrap();
//! }
//! ```

mod error;
mod scenario;

pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::Scenario;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::init_tracing;
    pub use crate::scenario::Scenario;
    pub use cadre_concepts::kinds::*;
    pub use cadre_core::{Concept, Key, Origin, Value};
    pub use cadre_engine::{EngineConfig, ExpandedModel, ExpansionError, Limit};
    pub use cadre_registry::{rule_fn, RegistryBuilder, RegistryError, RuleFailure};
}

/// Install a test-friendly tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
