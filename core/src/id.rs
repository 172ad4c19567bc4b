//! Identity types for stored concepts.
//!
//! A `ConceptId` is an index into the store's arena. It is:
//! - Assigned in admission order
//! - Immutable once assigned
//! - Only meaningful for the store that issued it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of an admitted concept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ConceptId(pub u32);

impl ConceptId {
    /// Create a new ConceptId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Position of this concept in the arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
