//! Error types for the scenario framework.

use cadre_engine::ExpansionError;
use cadre_registry::RegistryError;
use thiserror::Error;

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that can occur when running scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The registry setup was rejected.
    #[error("registry setup failed for scenario '{scenario}': {source}")]
    Registry {
        scenario: String,
        source: RegistryError,
    },

    /// Expansion failed where a model was expected.
    #[error("expansion failed for scenario '{scenario}': {source}")]
    Expansion {
        scenario: String,
        source: ExpansionError,
    },

    /// Assertion failed.
    #[error("assertion failed for scenario '{scenario}': {message}")]
    AssertionFailed { scenario: String, message: String },
}

impl ScenarioError {
    pub fn assertion_failed(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            scenario: scenario.into(),
            message: message.into(),
        }
    }
}
