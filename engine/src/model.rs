//! The expanded model handed to downstream generators.

use cadre_core::{Concept, ConceptId, Key, Origin};
use cadre_graph::{resolver, ConceptStore, StoredConcept};
use serde::Serialize;

/// Statistics from an expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionStats {
    /// Number of seed concepts given.
    pub seeds: usize,
    /// Number of concepts in the final model.
    pub concepts: usize,
    /// Number of worklist waves processed.
    pub waves: usize,
    /// Number of rule invocations.
    pub rule_invocations: usize,
    /// Re-evaluation rounds of model-reading rules.
    pub reevaluation_rounds: usize,
    /// Admissions that found an identical concept.
    pub already_present: usize,
    /// Admissions that extended cumulative fields.
    pub merges: usize,
    /// Concepts deferred for an unresolved key reference.
    pub deferrals: usize,
    /// Longest derivation chain.
    pub max_depth_reached: usize,
}

/// A fully expanded, de-duplicated and closed concept graph.
#[derive(Debug, Clone)]
pub struct ExpandedModel {
    store: ConceptStore,
    order: Vec<ConceptId>,
    stats: ExpansionStats,
}

#[derive(Serialize)]
struct Entry<'a> {
    id: ConceptId,
    key: String,
    concept: &'a Concept,
    origin: Provenance<'a>,
    depends_on: Vec<ConceptId>,
}

/// Exported origin. Seed positions are left out so that the export depends
/// only on the seed set, not on the order it was given in.
#[derive(Serialize)]
enum Provenance<'a> {
    Seed,
    Rule { rule: &'a str, source: String },
}

impl<'a> From<&'a Origin> for Provenance<'a> {
    fn from(origin: &'a Origin) -> Self {
        match origin {
            Origin::Seed { .. } => Provenance::Seed,
            Origin::Rule { rule, source } => Provenance::Rule {
                rule,
                source: source.to_string(),
            },
        }
    }
}

impl ExpandedModel {
    pub(crate) fn new(store: ConceptStore, order: Vec<ConceptId>, stats: ExpansionStats) -> Self {
        Self {
            store,
            order,
            stats,
        }
    }

    pub fn store(&self) -> &ConceptStore {
        &self.store
    }

    pub fn into_store(self) -> ConceptStore {
        self.store
    }

    /// Dependency-respecting order of every concept.
    pub fn order(&self) -> &[ConceptId] {
        &self.order
    }

    /// Every concept, dependencies first.
    pub fn concepts(&self) -> impl Iterator<Item = &StoredConcept> {
        self.order.iter().filter_map(|id| self.store.get(*id))
    }

    pub fn stats(&self) -> &ExpansionStats {
        &self.stats
    }

    pub fn get_by_key(&self, key: &Key) -> Option<&StoredConcept> {
        self.store.get_by_key(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.store.contains_key(key)
    }

    /// Concepts of one kind, ordered by key.
    pub fn of_kind<'a>(&'a self, kind: &str) -> impl Iterator<Item = &'a StoredConcept> + 'a {
        self.store.of_kind(kind)
    }

    /// Sorted keys of the whole model.
    pub fn keys(&self) -> Vec<&Key> {
        self.store.keys()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Serialize the model, in dependency order, for external generators.
    ///
    /// Seeded concepts are exported as `"Seed"`; their input position is
    /// diagnostic only and stays available through [`ExpandedModel::store`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        let entries: Vec<Entry<'_>> = self
            .concepts()
            .map(|stored| Entry {
                id: stored.id,
                key: stored.key.to_string(),
                concept: &stored.concept,
                origin: Provenance::from(&stored.origin),
                depends_on: resolver::dependencies(&self.store, stored.id),
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    }
}
