//! Common error types for Cadre.

use thiserror::Error;

/// A concept that does not fit the declared schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConceptError {
    /// The concept's kind was never declared.
    #[error("Unknown concept kind: {0}")]
    UnknownKind(String),

    /// The concept has the wrong number of key fields.
    #[error("Kind {kind} expects {expected} key field(s), got {actual}")]
    KeyArity {
        kind: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for concept validation.
pub type ConceptResult<T> = Result<T, ConceptError>;
