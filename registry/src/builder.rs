//! RegistryBuilder for constructing an immutable Registry.

use crate::{ExpansionRule, Registry};
use cadre_core::{KindDef, Schema};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during registry construction.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate kind name: {0}")]
    DuplicateKind(String),

    #[error("Rule '{rule}' registered for unknown kind: {kind}")]
    UnknownKind { kind: String, rule: String },

    #[error("Rule '{rule}' registered twice for kind {kind}")]
    DuplicateRule { kind: String, rule: String },
}

/// Builder for constructing an immutable Registry.
#[derive(Default)]
pub struct RegistryBuilder {
    /// Kinds being declared.
    schema: Schema,
    /// Rules in registration order.
    rules: Vec<(String, Arc<dyn ExpansionRule>)>,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a kind.
    pub fn add_kind(&mut self, name: impl Into<String>) -> KindBuilder<'_> {
        KindBuilder {
            builder: self,
            def: KindDef::new(name),
        }
    }

    /// Register a rule for a kind. Several rules may share a kind; they run
    /// in registration order.
    pub fn add_rule(
        &mut self,
        kind: impl Into<String>,
        rule: impl ExpansionRule + 'static,
    ) -> &mut Self {
        self.rules.push((kind.into(), Arc::new(rule)));
        self
    }

    /// Returns true if a kind with this name was declared.
    pub fn has_kind(&self, name: &str) -> bool {
        self.schema.contains(name)
    }

    /// Build the immutable Registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut rules: HashMap<String, Vec<Arc<dyn ExpansionRule>>> = HashMap::new();

        for (kind, rule) in self.rules {
            if !self.schema.contains(&kind) {
                return Err(RegistryError::UnknownKind {
                    kind,
                    rule: rule.name().to_string(),
                });
            }
            let entry = rules.entry(kind.clone()).or_default();
            if entry.iter().any(|r| r.name() == rule.name()) {
                return Err(RegistryError::DuplicateRule {
                    kind,
                    rule: rule.name().to_string(),
                });
            }
            debug!(%kind, rule = rule.name(), "registered rule");
            entry.push(rule);
        }

        Ok(Registry::new(Arc::new(self.schema), rules))
    }
}

/// Builder for a kind declaration.
pub struct KindBuilder<'a> {
    builder: &'a mut RegistryBuilder,
    def: KindDef,
}

impl<'a> KindBuilder<'a> {
    /// Append a key field.
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.def.key_fields.push(name.into());
        self
    }

    /// Mark a payload field as cumulative.
    pub fn cumulative(mut self, name: impl Into<String>) -> Self {
        self.def.cumulative.insert(name.into());
        self
    }

    /// Declare this kind a sink: references to it need no admitted target.
    pub fn sink(mut self) -> Self {
        self.def.sink = true;
        self
    }

    /// Finish building the kind.
    pub fn done(self) -> Result<(), RegistryError> {
        if self.builder.schema.contains(&self.def.name) {
            return Err(RegistryError::DuplicateKind(self.def.name));
        }
        self.builder.schema.insert(self.def);
        Ok(())
    }
}
