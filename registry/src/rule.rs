//! Expansion rule interface.

use cadre_core::{Concept, Value};
use cadre_graph::ConceptStore;
use thiserror::Error;

/// A rule reporting that the concept it was given cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleFailure {
    pub message: String,
}

impl RuleFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(format!("missing field '{}'", field))
    }

    pub fn unexpected(field: &str, expected: &str, actual: &Value) -> Self {
        Self::new(format!(
            "field '{}' should be {}, got {}",
            field,
            expected,
            actual.type_name()
        ))
    }
}

/// An expansion rule (macro) for one concept kind.
///
/// Rules must be deterministic and free of side effects: the output may
/// depend only on the concept and the read-only store view.
pub trait ExpansionRule: Send + Sync {
    /// Name used in diagnostics and origins.
    fn name(&self) -> &str;

    /// Produce the concepts this concept expands into, in admission order.
    fn expand(&self, concept: &Concept, model: &ConceptStore)
        -> Result<Vec<Concept>, RuleFailure>;

    /// Whether the output depends on the store beyond the concept's own key
    /// references. Such rules are re-invoked until their output stops
    /// changing the store.
    fn reads_model(&self) -> bool {
        false
    }
}

type ExpandFn = dyn Fn(&Concept, &ConceptStore) -> Result<Vec<Concept>, RuleFailure> + Send + Sync;

/// A rule backed by a closure.
pub struct FnRule {
    name: String,
    reads_model: bool,
    expand: Box<ExpandFn>,
}

impl FnRule {
    /// Mark the rule as reading the model.
    pub fn reading_model(mut self) -> Self {
        self.reads_model = true;
        self
    }
}

impl ExpansionRule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn expand(
        &self,
        concept: &Concept,
        model: &ConceptStore,
    ) -> Result<Vec<Concept>, RuleFailure> {
        (self.expand)(concept, model)
    }

    fn reads_model(&self) -> bool {
        self.reads_model
    }
}

/// Build a rule from a closure.
pub fn rule_fn<F>(name: impl Into<String>, expand: F) -> FnRule
where
    F: Fn(&Concept, &ConceptStore) -> Result<Vec<Concept>, RuleFailure> + Send + Sync + 'static,
{
    FnRule {
        name: name.into(),
        reads_model: false,
        expand: Box::new(expand),
    }
}
