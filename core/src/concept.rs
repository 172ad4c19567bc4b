//! Concept structures for Cadre.
//!
//! A concept is one declared or derived fact in the model graph. Its kind and
//! key values form its identity; its payload configures behavior.

use crate::{Attributes, Key, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node in the declarative model graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    /// Kind tag (e.g. "Entity", "Property", or a user-defined macro kind).
    pub kind: String,
    /// Key field values, in the order the kind declares them.
    pub key: Vec<Value>,
    /// Non-key attributes.
    pub payload: Attributes,
}

impl Concept {
    /// Create a concept with no key fields and an empty payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: Vec::new(),
            payload: Attributes::new(),
        }
    }

    /// Append a key field value.
    pub fn with_key(mut self, value: impl Into<Value>) -> Self {
        self.key.push(value.into());
        self
    }

    /// Set a payload attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    /// Replace the whole payload.
    pub fn with_payload(mut self, payload: Attributes) -> Self {
        self.payload = payload;
        self
    }

    /// Structural key of this concept.
    pub fn key(&self) -> Key {
        Key::new(self.kind.clone(), self.key.clone())
    }

    /// A reference value pointing at this concept.
    pub fn reference(&self) -> Value {
        Value::Ref(self.key())
    }

    /// Get a payload attribute by name.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Get a key field by position.
    pub fn key_field(&self, position: usize) -> Option<&Value> {
        self.key.get(position)
    }

    /// Keys referenced from the key fields.
    pub fn key_refs(&self) -> Vec<&Key> {
        let mut out = Vec::new();
        for field in &self.key {
            field.collect_refs(&mut out);
        }
        out
    }

    /// Keys referenced from the payload fields.
    pub fn payload_refs(&self) -> Vec<&Key> {
        let mut out = Vec::new();
        for value in self.payload.values() {
            value.collect_refs(&mut out);
        }
        out
    }

    /// Returns true if any field (key or payload) references `key`.
    pub fn references(&self, key: &Key) -> bool {
        self.key_refs().contains(&key) || self.payload_refs().contains(&key)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Where an admitted concept came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Part of the seed input, at this position in the caller's sequence.
    Seed { position: usize },
    /// Produced by `rule` while expanding the concept identified by `source`.
    Rule { rule: String, source: Key },
}

impl Origin {
    pub fn seed(position: usize) -> Self {
        Self::Seed { position }
    }

    pub fn rule(rule: impl Into<String>, source: Key) -> Self {
        Self::Rule {
            rule: rule.into(),
            source,
        }
    }

    /// Returns true if the concept was seeded.
    pub fn is_seed(&self) -> bool {
        matches!(self, Origin::Seed { .. })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Seed { position } => write!(f, "seed #{}", position),
            Origin::Rule { rule, source } => write!(f, "rule '{}' expanding {}", rule, source),
        }
    }
}
