//! Fixed-point expansion engine.

use std::sync::Arc;

use cadre_core::{Concept, ConceptId, Key, Origin};
use cadre_graph::{resolver, Admission, ConceptStore, ResolveError, StoreError};
use cadre_registry::{ExpansionRule, Registry, RuleFailure};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{ExpansionError, ExpansionResult, Limit};
use crate::model::{ExpandedModel, ExpansionStats};

/// Lifecycle of an admitted concept. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ConceptState {
    Admitted,
    Expanding,
    FullyExpanded,
}

/// Bookkeeping per admitted concept, indexed like the store's arena.
#[derive(Debug, Clone)]
struct Meta {
    /// Concept whose expansion produced this one.
    parent: Option<ConceptId>,
    /// Length of the derivation chain from a seed.
    depth: usize,
    state: ConceptState,
}

/// A concept waiting for one of its key references to be admitted.
#[derive(Debug, Clone)]
struct Pending {
    concept: Concept,
    origin: Origin,
    parent: Option<ConceptId>,
    depth: usize,
}

/// One rule invocation.
struct Job {
    source: ConceptId,
    rule: Arc<dyn ExpansionRule>,
}

/// Result of absorbing a batch of rule output.
#[derive(Default)]
struct Absorbed {
    /// Newly admitted concepts, in admission order.
    admitted: Vec<ConceptId>,
    /// Whether the store changed at all (including merges).
    changed: bool,
}

/// The expansion engine.
///
/// Holds the closed registry and the run configuration. Each call to
/// [`ExpansionEngine::expand`] is an independent, all-or-nothing run.
pub struct ExpansionEngine<'r> {
    registry: &'r Registry,
    config: EngineConfig,
}

impl<'r> ExpansionEngine<'r> {
    /// Create an engine with the default configuration.
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: &'r Registry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand `seeds` to a fixed point.
    ///
    /// The result depends only on the set of seeds and the registry; seed
    /// order does not matter.
    pub fn expand(&self, seeds: Vec<Concept>) -> ExpansionResult<ExpandedModel> {
        info!(
            seeds = seeds.len(),
            rules = self.registry.rule_count(),
            parallel = self.config.parallel,
            "starting expansion"
        );

        let mut run = Run::new(self.registry, &self.config);
        let result = run.execute(seeds);
        if let Err(e) = &result {
            warn!(error = %e, "expansion failed");
        }
        result
    }
}

/// State of a single expansion run.
struct Run<'a> {
    registry: &'a Registry,
    config: &'a EngineConfig,
    store: ConceptStore,
    meta: Vec<Meta>,
    deferred: Vec<Pending>,
    stats: ExpansionStats,
}

impl<'a> Run<'a> {
    fn new(registry: &'a Registry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            store: ConceptStore::new(Arc::clone(registry.schema())),
            meta: Vec::new(),
            deferred: Vec::new(),
            stats: ExpansionStats::default(),
        }
    }

    fn execute(&mut self, seeds: Vec<Concept>) -> ExpansionResult<ExpandedModel> {
        let wave = self.seed(seeds)?;
        self.drain(wave)?;

        // Model-reading rules run again until a round changes nothing.
        loop {
            let round = self.reevaluate()?;
            if !round.changed {
                break;
            }
            self.drain(round.admitted)?;
        }

        self.finish()
    }

    // ==================== Seeding ====================

    /// Admit the seeds in key order so that their arrival order cannot
    /// influence the run.
    fn seed(&mut self, seeds: Vec<Concept>) -> ExpansionResult<Vec<ConceptId>> {
        self.stats.seeds = seeds.len();

        let mut ordered: Vec<(Key, usize, Concept)> = seeds
            .into_iter()
            .enumerate()
            .map(|(position, concept)| (concept.key(), position, concept))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut absorbed = Absorbed::default();
        for (_, position, concept) in ordered {
            self.offer(concept, Origin::seed(position), None, 0, &mut absorbed)?;
        }
        self.retry_deferred(&mut absorbed)?;

        debug!(admitted = absorbed.admitted.len(), "seeded");
        Ok(absorbed.admitted)
    }

    // ==================== Worklist ====================

    /// Expand waves until the worklist is empty.
    fn drain(&mut self, mut wave: Vec<ConceptId>) -> ExpansionResult<()> {
        let registry = self.registry;

        while !wave.is_empty() {
            self.stats.waves += 1;
            let store = &self.store;
            wave.sort_by(|a, b| {
                let ka = store.get(*a).map(|c| &c.key);
                let kb = store.get(*b).map(|c| &c.key);
                ka.cmp(&kb)
            });
            wave.dedup();

            let mut jobs = Vec::new();
            for &id in &wave {
                self.advance(id, ConceptState::Expanding);
                if let Some(stored) = self.store.get(id) {
                    for rule in registry.rules_for(&stored.concept.kind) {
                        jobs.push(Job {
                            source: id,
                            rule: Arc::clone(rule),
                        });
                    }
                }
            }

            debug!(wave = self.stats.waves, concepts = wave.len(), jobs = jobs.len(), "expanding wave");
            let absorbed = self.run_jobs(&jobs)?;

            for &id in &wave {
                self.advance(id, ConceptState::FullyExpanded);
            }
            wave = absorbed.admitted;
        }

        Ok(())
    }

    /// One round over every concept owning a model-reading rule.
    fn reevaluate(&mut self) -> ExpansionResult<Absorbed> {
        let registry = self.registry;
        let mut jobs = Vec::new();

        for kind in registry.model_reading_kinds() {
            for stored in self.store.of_kind(kind) {
                for rule in registry.rules_for(kind) {
                    if rule.reads_model() {
                        jobs.push(Job {
                            source: stored.id,
                            rule: Arc::clone(rule),
                        });
                    }
                }
            }
        }

        if jobs.is_empty() {
            return Ok(Absorbed::default());
        }

        self.stats.reevaluation_rounds += 1;
        debug!(round = self.stats.reevaluation_rounds, jobs = jobs.len(), "re-evaluating model-reading rules");
        self.run_jobs(&jobs)
    }

    /// Invoke a batch of rules against the current store, then admit their
    /// output in job order.
    fn run_jobs(&mut self, jobs: &[Job]) -> ExpansionResult<Absorbed> {
        self.charge(jobs)?;
        let results = self.invoke(jobs);

        let mut absorbed = Absorbed::default();
        for (job, result) in jobs.iter().zip(results) {
            let Some(source) = self.store.get(job.source) else {
                continue;
            };
            let source_key = source.key.clone();
            let rule = job.rule.name();

            let produced = result
                .map_err(|f| ExpansionError::rule_invocation(rule, source_key.clone(), f.message))?;

            let origin = Origin::rule(rule, source_key);
            let depth = self.depth(job.source) + 1;
            for concept in produced {
                self.offer(concept, origin.clone(), Some(job.source), depth, &mut absorbed)?;
            }
        }
        self.retry_deferred(&mut absorbed)?;

        Ok(absorbed)
    }

    /// Reserve budget for a batch, failing if it would exceed the ceiling.
    fn charge(&mut self, jobs: &[Job]) -> ExpansionResult<()> {
        let budget = self.budget();
        let available = budget.saturating_sub(self.stats.rule_invocations);
        if jobs.len() > available {
            let culprit = jobs[available].source;
            return Err(ExpansionError::non_terminating(
                Limit::Expansions(budget),
                self.chain(culprit),
            ));
        }
        self.stats.rule_invocations += jobs.len();
        Ok(())
    }

    /// Rule invocations allowed for the whole run: `max_expansions` per seed.
    fn budget(&self) -> usize {
        self.config
            .max_expansions
            .saturating_mul(self.stats.seeds.max(1))
    }

    /// Run the rules. Each reads the same immutable store, so the batch may
    /// run in parallel without changing the result.
    fn invoke(&self, jobs: &[Job]) -> Vec<Result<Vec<Concept>, RuleFailure>> {
        let store = &self.store;
        let call = |job: &Job| match store.get(job.source) {
            Some(source) => job.rule.expand(&source.concept, store),
            None => Ok(Vec::new()),
        };

        if self.config.parallel {
            jobs.par_iter().map(call).collect()
        } else {
            jobs.iter().map(call).collect()
        }
    }

    // ==================== Admission ====================

    /// Admit a concept, or defer it if a key reference is not admitted yet.
    fn offer(
        &mut self,
        concept: Concept,
        origin: Origin,
        parent: Option<ConceptId>,
        depth: usize,
        absorbed: &mut Absorbed,
    ) -> ExpansionResult<()> {
        if let Err(e) = self.store.schema().validate(&concept) {
            return Err(invalid_concept(&concept, &origin, e.to_string()));
        }

        if let Err(ResolveError::Unresolved { target, .. }) =
            resolver::resolve_key(&concept, &self.store)
        {
            debug!(concept = %concept, %target, "deferred");
            self.stats.deferrals += 1;
            self.deferred.push(Pending {
                concept,
                origin,
                parent,
                depth,
            });
            return Ok(());
        }

        self.admit(concept, origin, parent, depth, absorbed)
    }

    fn admit(
        &mut self,
        concept: Concept,
        origin: Origin,
        parent: Option<ConceptId>,
        depth: usize,
        absorbed: &mut Absorbed,
    ) -> ExpansionResult<()> {
        let admission = self.store.admit(concept, origin).map_err(store_failure)?;

        match admission {
            Admission::Admitted(id) => {
                self.meta.push(Meta {
                    parent,
                    depth,
                    state: ConceptState::Admitted,
                });
                self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);
                if depth > self.config.max_depth {
                    return Err(ExpansionError::non_terminating(
                        Limit::Depth(self.config.max_depth),
                        self.chain(id),
                    ));
                }
                absorbed.admitted.push(id);
                absorbed.changed = true;
            }
            Admission::Merged(_) => {
                self.stats.merges += 1;
                absorbed.changed = true;
            }
            Admission::AlreadyPresent(_) => {
                self.stats.already_present += 1;
            }
        }

        Ok(())
    }

    /// Retry deferred concepts until a pass admits nothing more.
    fn retry_deferred(&mut self, absorbed: &mut Absorbed) -> ExpansionResult<()> {
        loop {
            let pending = std::mem::take(&mut self.deferred);
            let before = pending.len();

            for p in pending {
                if resolver::resolve_key(&p.concept, &self.store).is_ok() {
                    self.admit(p.concept, p.origin, p.parent, p.depth, absorbed)?;
                } else {
                    self.deferred.push(p);
                }
            }

            if self.deferred.len() == before {
                return Ok(());
            }
        }
    }

    // ==================== Finalization ====================

    /// Fail on anything left unresolved, then order the model.
    fn finish(&mut self) -> ExpansionResult<ExpandedModel> {
        if let Some(pending) = self.deferred.iter().min_by_key(|p| p.concept.key()) {
            let target = match resolver::resolve_key(&pending.concept, &self.store) {
                Err(ResolveError::Unresolved { target, .. }) => target,
                Ok(key) => key,
            };
            return Err(ExpansionError::UnresolvedReference {
                concept: pending.concept.key(),
                origin: pending.origin.clone(),
                target,
            });
        }

        if let Some((id, target)) = resolver::dangling(&self.store).into_iter().next() {
            if let Some(stored) = self.store.get(id) {
                return Err(ExpansionError::UnresolvedReference {
                    concept: stored.key.clone(),
                    origin: stored.origin.clone(),
                    target,
                });
            }
        }

        let order = resolver::topological_order(&self.store);
        self.stats.concepts = self.store.len();
        info!(
            concepts = self.stats.concepts,
            waves = self.stats.waves,
            rule_invocations = self.stats.rule_invocations,
            "fixed point reached"
        );

        let store = std::mem::replace(
            &mut self.store,
            ConceptStore::new(Arc::clone(self.registry.schema())),
        );
        Ok(ExpandedModel::new(store, order, self.stats.clone()))
    }

    // ==================== Helpers ====================

    fn depth(&self, id: ConceptId) -> usize {
        self.meta.get(id.index()).map_or(0, |m| m.depth)
    }

    fn advance(&mut self, id: ConceptId, state: ConceptState) {
        if let Some(meta) = self.meta.get_mut(id.index()) {
            debug_assert!(meta.state <= state, "concept state regressed");
            meta.state = meta.state.max(state);
        }
    }

    /// Derivation chain ending at `id`, seed first.
    fn chain(&self, id: ConceptId) -> Vec<Key> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(stored) = self.store.get(id) else {
                break;
            };
            chain.push(stored.key.clone());
            current = self.meta.get(id.index()).and_then(|m| m.parent);
        }
        chain.reverse();
        chain
    }
}

/// Wrap a schema violation with the concept's origin.
fn invalid_concept(concept: &Concept, origin: &Origin, message: String) -> ExpansionError {
    match origin {
        Origin::Seed { position } => ExpansionError::InvalidSeed {
            position: *position,
            concept: concept.key(),
            message,
        },
        Origin::Rule { rule, source } => ExpansionError::rule_invocation(
            rule,
            source.clone(),
            format!("produced invalid concept {}: {}", concept.key(), message),
        ),
    }
}

/// Map an admission failure. `offer` validates and resolves every concept
/// before it reaches the store, so only conflicts and a full arena remain.
fn store_failure(err: StoreError) -> ExpansionError {
    match err {
        StoreError::Conflict {
            key,
            field,
            existing,
            existing_origin,
            incoming,
            incoming_origin,
        } => ExpansionError::DuplicateKeyConflict {
            key,
            field,
            existing,
            existing_origin,
            incoming,
            incoming_origin,
        },
        StoreError::Capacity { key, limit } => ExpansionError::CapacityExceeded {
            concept: key,
            limit,
        },
        StoreError::Invalid(_)
        | StoreError::Unresolved { .. }
        | StoreError::Poisoned
        | StoreError::StillShared { .. } => {
            unreachable!("admission failed after validation: {err}")
        }
    }
}
