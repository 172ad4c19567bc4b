//! Concept store implementation.

use crate::error::{StoreError, StoreResult};
use crate::resolver;
use cadre_core::{Attributes, Concept, ConceptId, Key, KindDef, Origin, Schema, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// A concept as held by the store.
#[derive(Debug, Clone)]
pub struct StoredConcept {
    /// Arena index.
    pub id: ConceptId,
    /// Resolved structural key.
    pub key: Key,
    /// The concept, with any cumulative fields merged in.
    pub concept: Concept,
    /// Who first produced this concept.
    pub origin: Origin,
}

/// Outcome of a successful admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The key was new; the concept was inserted.
    Admitted(ConceptId),
    /// An identical concept was already present; nothing changed.
    AlreadyPresent(ConceptId),
    /// The key was present; cumulative payload fields were extended.
    Merged(ConceptId),
}

impl Admission {
    pub fn id(&self) -> ConceptId {
        match self {
            Admission::Admitted(id) | Admission::AlreadyPresent(id) | Admission::Merged(id) => {
                *id
            }
        }
    }

    /// Returns true if a new concept entered the store.
    pub fn is_new(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }

    /// Returns true if the store changed at all.
    pub fn changed(&self) -> bool {
        !matches!(self, Admission::AlreadyPresent(_))
    }
}

/// The owning, append-only concept store.
///
/// All mutation goes through [`ConceptStore::admit`]; everything else is a
/// read. Concepts are never removed and their keys never change.
#[derive(Debug, Clone)]
pub struct ConceptStore {
    /// Declared kinds
    schema: Arc<Schema>,
    /// Arena, in admission order
    concepts: Vec<StoredConcept>,
    /// Key index
    by_key: HashMap<Key, ConceptId>,
    /// Kind index, ordered by key
    by_kind: HashMap<String, BTreeMap<Key, ConceptId>>,
}

impl ConceptStore {
    /// Create an empty store over the given schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            concepts: Vec::new(),
            by_key: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ==================== Admission ====================

    /// Admit a concept.
    ///
    /// Returns `Admitted` for a new key, `AlreadyPresent` for an identical
    /// re-admission and `Merged` when only cumulative fields grew. A key
    /// reference to a concept that is not in the store yields
    /// `StoreError::Unresolved`, which callers may retry later.
    pub fn admit(&mut self, concept: Concept, origin: Origin) -> StoreResult<Admission> {
        let def = self.schema.validate(&concept)?.clone();
        let key = resolver::resolve_key(&concept, self)?;

        if let Some(&id) = self.by_key.get(&key) {
            let existing = &self.concepts[id.index()];
            return match merge_payload(&def, &existing.concept.payload, &concept.payload) {
                Ok(None) => {
                    debug!(%key, %origin, "already present");
                    Ok(Admission::AlreadyPresent(id))
                }
                Ok(Some(merged)) => {
                    debug!(%key, %origin, "merged cumulative payload");
                    self.concepts[id.index()].concept.payload = merged;
                    Ok(Admission::Merged(id))
                }
                Err(field) => Err(StoreError::Conflict {
                    key,
                    field,
                    existing: Box::new(existing.concept.clone()),
                    existing_origin: existing.origin.clone(),
                    incoming: Box::new(concept),
                    incoming_origin: origin,
                }),
            };
        }

        let id = next_id(self.concepts.len(), &key)?;
        let mut concept = concept;
        for field in &def.cumulative {
            if let Some(value) = concept.payload.remove(field) {
                concept
                    .payload
                    .insert(field.clone(), union_values(&Value::Null, &value));
            }
        }

        debug!(%key, %origin, %id, "admitted");
        self.by_key.insert(key.clone(), id);
        self.by_kind
            .entry(key.kind.clone())
            .or_default()
            .insert(key.clone(), id);
        self.concepts.push(StoredConcept {
            id,
            key,
            concept,
            origin,
        });

        Ok(Admission::Admitted(id))
    }

    // ==================== Lookups ====================

    /// Get a stored concept by ID.
    pub fn get(&self, id: ConceptId) -> Option<&StoredConcept> {
        self.concepts.get(id.index())
    }

    /// Get a stored concept by structural key.
    pub fn get_by_key(&self, key: &Key) -> Option<&StoredConcept> {
        self.by_key.get(key).and_then(|id| self.get(*id))
    }

    /// Get the ID of a key, if admitted.
    pub fn id_of(&self, key: &Key) -> Option<ConceptId> {
        self.by_key.get(key).copied()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.by_key.contains_key(key)
    }

    /// Origin of an admitted concept.
    pub fn origin_of(&self, id: ConceptId) -> Option<&Origin> {
        self.get(id).map(|c| &c.origin)
    }

    /// All concepts of a kind, ordered by key.
    pub fn of_kind<'a>(&'a self, kind: &str) -> impl Iterator<Item = &'a StoredConcept> + 'a {
        self.by_kind
            .get(kind)
            .into_iter()
            .flat_map(|index| index.values())
            .map(|id| &self.concepts[id.index()])
    }

    /// Concepts of a kind whose first key field is `first`, ordered by key.
    pub fn with_first_key<'a>(
        &'a self,
        kind: &str,
        first: &Value,
    ) -> impl Iterator<Item = &'a StoredConcept> + 'a {
        let start = Key::new(kind, vec![first.clone()]);
        let first = first.clone();
        self.by_kind
            .get(kind)
            .into_iter()
            .flat_map(move |index| index.range(start.clone()..))
            .take_while(move |(key, _)| key.fields.first() == Some(&first))
            .map(move |(_, id)| &self.concepts[id.index()])
    }

    /// Number of concepts of a kind.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.by_kind.get(kind).map_or(0, BTreeMap::len)
    }

    /// All concepts, in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredConcept> {
        self.concepts.iter()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&Key> {
        let mut keys: Vec<&Key> = self.by_key.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// ID for the concept admitted at arena position `len`.
fn next_id(len: usize, key: &Key) -> StoreResult<ConceptId> {
    u32::try_from(len)
        .map(ConceptId::new)
        .map_err(|_| StoreError::Capacity {
            key: key.clone(),
            limit: u64::from(u32::MAX) + 1,
        })
}

/// Merge an incoming payload into an existing one under the kind's policy.
///
/// Non-cumulative fields must match exactly (absent on both sides counts as a
/// match). Cumulative fields are unioned. Returns `Ok(None)` when nothing
/// changes, `Ok(Some(merged))` when cumulative fields grew, and `Err(field)`
/// naming the first conflicting field.
fn merge_payload(
    def: &KindDef,
    existing: &Attributes,
    incoming: &Attributes,
) -> Result<Option<Attributes>, String> {
    let mut merged = existing.clone();
    let names: std::collections::BTreeSet<&String> =
        existing.keys().chain(incoming.keys()).collect();

    for name in names {
        let old = existing.get(name);
        let new = incoming.get(name);
        if def.is_cumulative(name) {
            let union = union_values(
                old.unwrap_or(&Value::Null),
                new.unwrap_or(&Value::Null),
            );
            merged.insert(name.clone(), union);
        } else if old != new {
            return Err(name.clone());
        }
    }

    if &merged == existing {
        Ok(None)
    } else {
        Ok(Some(merged))
    }
}

/// Sorted, de-duplicated union of two values viewed as sets. A list
/// contributes its items, null contributes nothing, anything else is a
/// singleton.
fn union_values(a: &Value, b: &Value) -> Value {
    let mut items = Vec::new();
    for value in [a, b] {
        match value {
            Value::Null => {}
            Value::List(list) => items.extend(list.iter().cloned()),
            other => items.push(other.clone()),
        }
    }
    items.sort();
    items.dedup();
    Value::List(items)
}
