//! Scenario definition and builder.

use cadre_core::Concept;
use cadre_engine::{EngineConfig, ExpandedModel, ExpansionEngine, ExpansionResult};
use cadre_registry::{Registry, RegistryBuilder, RegistryError};

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::{ScenarioError, ScenarioResult};

type Setup = dyn Fn(&mut RegistryBuilder) -> Result<(), RegistryError> + Send + Sync;

/// A complete expansion scenario.
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    /// Declares the kinds and rules the scenario runs against.
    setup: Box<Setup>,
    config: EngineConfig,
    /// Seeds, in the order given.
    seeds: Vec<Concept>,
    assertion: Assertion,
}

impl Scenario {
    /// Create a scenario against the standard concepts.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: Box::new(cadre_concepts::register),
            config: EngineConfig::default(),
            seeds: Vec::new(),
            assertion: Assertion::new(),
        }
    }

    /// Replace the registry setup.
    pub fn registry<F>(mut self, setup: F) -> Self
    where
        F: Fn(&mut RegistryBuilder) -> Result<(), RegistryError> + Send + Sync + 'static,
    {
        self.setup = Box::new(setup);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a seed concept.
    pub fn seed(mut self, concept: Concept) -> Self {
        self.seeds.push(concept);
        self
    }

    pub fn seeds(mut self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.seeds.extend(concepts);
        self
    }

    /// Set the assertion the result must satisfy.
    pub fn expect<F>(mut self, assertion_fn: F) -> Self
    where
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        self.assertion = assertion_fn(AssertionBuilder::new()).build();
        self
    }

    /// Get the scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the scenario's registry.
    pub fn build_registry(&self) -> ScenarioResult<Registry> {
        let registry_error = |source| ScenarioError::Registry {
            scenario: self.name.clone(),
            source,
        };
        let mut builder = RegistryBuilder::new();
        (self.setup)(&mut builder).map_err(registry_error)?;
        builder.build().map_err(registry_error)
    }

    /// Expand the seeds without checking any assertion.
    pub fn result(&self) -> ScenarioResult<ExpansionResult<ExpandedModel>> {
        let registry = self.build_registry()?;
        let engine = ExpansionEngine::with_config(&registry, self.config.clone());
        Ok(engine.expand(self.seeds.clone()))
    }

    /// Expand the seeds, failing the scenario if expansion fails.
    pub fn expand(&self) -> ScenarioResult<ExpandedModel> {
        self.result()?.map_err(|source| ScenarioError::Expansion {
            scenario: self.name.clone(),
            source,
        })
    }

    /// Run the scenario and verify its assertion.
    pub fn run(&self) -> ScenarioResult<()> {
        let result = self.result()?;
        self.assertion.verify(&self.name, &result)
    }
}
