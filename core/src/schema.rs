//! Declared concept kinds.
//!
//! Every concept kind that may enter a store is declared up front with its key
//! field names. A kind can additionally mark payload fields as cumulative
//! (merged by union across admissions) or declare itself a sink: a primitive
//! kind that references may target without the target ever being admitted.

use crate::{Concept, ConceptError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Definition of one concept kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDef {
    /// Kind tag.
    pub name: String,
    /// Key field names, in order.
    pub key_fields: Vec<String>,
    /// Payload fields merged by set union.
    pub cumulative: BTreeSet<String>,
    /// Whether references to this kind need no admitted target.
    pub sink: bool,
}

impl KindDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_fields: Vec::new(),
            cumulative: BTreeSet::new(),
            sink: false,
        }
    }

    /// Number of key fields.
    pub fn arity(&self) -> usize {
        self.key_fields.len()
    }

    /// Position of a key field by name.
    pub fn key_position(&self, name: &str) -> Option<usize> {
        self.key_fields.iter().position(|f| f == name)
    }

    pub fn is_cumulative(&self, field: &str) -> bool {
        self.cumulative.contains(field)
    }
}

/// The set of declared kinds, looked up by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    kinds: HashMap<String, KindDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a kind. Returns the previous definition if the name was taken.
    pub fn insert(&mut self, kind: KindDef) -> Option<KindDef> {
        self.kinds.insert(kind.name.clone(), kind)
    }

    pub fn get(&self, name: &str) -> Option<&KindDef> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Returns true if `name` is a declared sink kind.
    pub fn is_sink(&self, name: &str) -> bool {
        self.kinds.get(name).is_some_and(|k| k.sink)
    }

    /// Declared kind names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Check that a concept's kind is declared and its key has the declared arity.
    pub fn validate(&self, concept: &Concept) -> Result<&KindDef, ConceptError> {
        let def = self
            .kinds
            .get(&concept.kind)
            .ok_or_else(|| ConceptError::UnknownKind(concept.kind.clone()))?;

        if def.arity() != concept.key.len() {
            return Err(ConceptError::KeyArity {
                kind: def.name.clone(),
                expected: def.arity(),
                actual: concept.key.len(),
            });
        }

        Ok(def)
    }
}
