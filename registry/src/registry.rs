//! The Registry - immutable kind and rule lookup.

use crate::ExpansionRule;
use cadre_core::{KindDef, Schema};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The Registry provides lookup of declared kinds and their expansion rules.
/// It is immutable after construction.
pub struct Registry {
    /// Declared kinds, shared with every store built from this registry.
    schema: Arc<Schema>,
    /// Rules by kind, in registration order.
    rules: HashMap<String, Vec<Arc<dyn ExpansionRule>>>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(
        schema: Arc<Schema>,
        rules: HashMap<String, Vec<Arc<dyn ExpansionRule>>>,
    ) -> Self {
        Self { schema, rules }
    }

    // ==================== Kind Lookups ====================

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get a kind definition by name.
    pub fn get_kind(&self, name: &str) -> Option<&KindDef> {
        self.schema.get(name)
    }

    /// Get the number of declared kinds.
    pub fn kind_count(&self) -> usize {
        self.schema.len()
    }

    // ==================== Rule Lookups ====================

    /// Rules registered for a kind, in registration order. Empty for
    /// terminal kinds.
    pub fn rules_for(&self, kind: &str) -> &[Arc<dyn ExpansionRule>] {
        self.rules.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the kind has at least one rule.
    pub fn is_macro(&self, kind: &str) -> bool {
        !self.rules_for(kind).is_empty()
    }

    /// Kinds with at least one model-reading rule, sorted.
    pub fn model_reading_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .rules
            .iter()
            .filter(|(_, rules)| rules.iter().any(|r| r.reads_model()))
            .map(|(kind, _)| kind.as_str())
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Get the total number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<(&String, Vec<&str>)> = self
            .rules
            .iter()
            .map(|(kind, rules)| (kind, rules.iter().map(|r| r.name()).collect()))
            .collect();
        kinds.sort();
        f.debug_struct("Registry")
            .field("kinds", &self.schema.names())
            .field("rules", &kinds)
            .finish()
    }
}
