//! Key and dependency resolution.
//!
//! Keys are structural, so resolving a key means checking that every concept
//! its key fields reference is already in the store (or is a declared sink).
//! The same reference walk drives the closure check on a finished store and
//! the dependency order handed to downstream consumers.

use crate::error::StoreError;
use crate::store::ConceptStore;
use cadre_core::{Concept, ConceptId, Key};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors from key resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{referrer} references {target}, which is not in the model")]
    Unresolved { referrer: Key, target: Key },
}

impl From<ResolveError> for StoreError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unresolved { referrer, target } => {
                StoreError::unresolved(referrer, target)
            }
        }
    }
}

/// Compute a concept's structural key, requiring every key reference to
/// resolve against `store`.
pub fn resolve_key(concept: &Concept, store: &ConceptStore) -> Result<Key, ResolveError> {
    for target in concept.key_refs() {
        if !is_resolvable(target, store) {
            return Err(ResolveError::Unresolved {
                referrer: concept.key(),
                target: target.clone(),
            });
        }
    }
    Ok(concept.key())
}

/// A target resolves if it is admitted or belongs to a sink kind.
fn is_resolvable(target: &Key, store: &ConceptStore) -> bool {
    store.contains_key(target) || store.schema().is_sink(&target.kind)
}

/// Every reference a concept holds, key fields first, in field order.
pub fn references(concept: &Concept) -> Vec<&Key> {
    let mut refs = concept.key_refs();
    refs.extend(concept.payload_refs());
    refs
}

/// References (key or payload) that do not resolve within the store.
pub fn unresolved_refs(concept: &Concept, store: &ConceptStore) -> Vec<Key> {
    references(concept)
        .into_iter()
        .filter(|target| !is_resolvable(target, store))
        .cloned()
        .collect()
}

/// Closure check: every dangling reference in the store, as
/// `(referring concept, missing target)`, in admission order.
pub fn dangling(store: &ConceptStore) -> Vec<(ConceptId, Key)> {
    store
        .iter()
        .flat_map(|stored| {
            unresolved_refs(&stored.concept, store)
                .into_iter()
                .map(move |target| (stored.id, target))
        })
        .collect()
}

/// Admitted concepts that `id` references, sorted and without duplicates.
/// Sink targets that were never admitted and self-references are skipped.
pub fn dependencies(store: &ConceptStore, id: ConceptId) -> Vec<ConceptId> {
    let Some(stored) = store.get(id) else {
        return Vec::new();
    };
    let mut deps: Vec<ConceptId> = references(&stored.concept)
        .into_iter()
        .filter_map(|target| store.id_of(target))
        .filter(|dep| *dep != id)
        .collect();
    deps.sort();
    deps.dedup();
    deps
}

/// Dependency-respecting order of the whole store: every concept comes after
/// the concepts it references. Ties are broken by key, so the order depends
/// only on the store's contents.
///
/// Key references can never form a cycle. Payload references can; when one
/// blocks progress, the smallest remaining key whose key dependencies are
/// already placed goes next.
pub fn topological_order(store: &ConceptStore) -> Vec<ConceptId> {
    let n = store.len();
    let mut hard: Vec<Vec<ConceptId>> = vec![Vec::new(); n];
    let mut dependents: Vec<Vec<ConceptId>> = vec![Vec::new(); n];
    let mut pending = vec![0usize; n];

    for stored in store.iter() {
        let id = stored.id;
        hard[id.index()] = stored
            .concept
            .key_refs()
            .into_iter()
            .filter_map(|target| store.id_of(target))
            .collect();
        for dep in dependencies(store, id) {
            dependents[dep.index()].push(id);
            pending[id.index()] += 1;
        }
    }

    let mut ready: BTreeSet<(&Key, ConceptId)> = BTreeSet::new();
    let mut remaining: BTreeMap<&Key, ConceptId> = BTreeMap::new();
    for stored in store.iter() {
        remaining.insert(&stored.key, stored.id);
        if pending[stored.id.index()] == 0 {
            ready.insert((&stored.key, stored.id));
        }
    }

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while !remaining.is_empty() {
        let next = match ready.pop_first() {
            Some((_, id)) => id,
            None => {
                // payload cycle
                let forced = remaining
                    .values()
                    .copied()
                    .find(|id| hard[id.index()].iter().all(|dep| placed[dep.index()]));
                match forced {
                    Some(id) => id,
                    None => break,
                }
            }
        };

        let Some(stored) = store.get(next) else {
            break;
        };
        remaining.remove(&stored.key);
        placed[next.index()] = true;
        order.push(next);

        for &dependent in &dependents[next.index()] {
            let count = &mut pending[dependent.index()];
            *count = count.saturating_sub(1);
            if *count == 0 && !placed[dependent.index()] {
                if let Some(d) = store.get(dependent) {
                    ready.insert((&d.key, dependent));
                }
            }
        }
    }

    order
}
