//! Store error types.

use cadre_core::{Concept, ConceptError, Key, Origin};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while admitting a concept.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The concept does not fit the declared schema.
    #[error(transparent)]
    Invalid(#[from] ConceptError),

    /// A key field references a concept that is not (yet) in the store.
    #[error("{referrer} references {target}, which is not in the model")]
    Unresolved { referrer: Key, target: Key },

    /// Same key, incompatible payload.
    #[error("Conflicting definitions of {key} (field '{field}'): {existing_origin} vs {incoming_origin}")]
    Conflict {
        key: Key,
        field: String,
        existing: Box<Concept>,
        existing_origin: Origin,
        incoming: Box<Concept>,
        incoming_origin: Origin,
    },

    /// A writer panicked while holding the shared store.
    #[error("Concept store lock poisoned")]
    Poisoned,

    /// The shared store cannot be taken back while other handles exist.
    #[error("Concept store is still shared by {handles} handles")]
    StillShared { handles: usize },

    /// The arena ran out of concept IDs.
    #[error("Concept store is full: {key} would exceed {limit} concepts")]
    Capacity { key: Key, limit: u64 },
}

impl StoreError {
    pub fn unresolved(referrer: Key, target: Key) -> Self {
        Self::Unresolved { referrer, target }
    }

    /// Returns true for errors that may clear up once more concepts are admitted.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unresolved { .. })
    }
}
