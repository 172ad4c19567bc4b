//! Expansion error types.

use cadre_core::{Concept, Key, Origin};
use std::fmt;
use thiserror::Error;

/// Result type for expansion runs.
pub type ExpansionResult<T> = Result<T, ExpansionError>;

/// The ceiling a runaway expansion ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Derivation chain longer than allowed.
    Depth(usize),
    /// More rule invocations than allowed.
    Expansions(usize),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Depth(n) => write!(f, "maximum depth ({})", n),
            Limit::Expansions(n) => write!(f, "maximum expansions ({})", n),
        }
    }
}

/// Errors that abort an expansion run. No partial model survives any of them.
#[derive(Debug, Clone, Error)]
pub enum ExpansionError {
    #[error("Conflicting definitions of {key}: field '{field}' differs between {existing_origin} and {incoming_origin}")]
    DuplicateKeyConflict {
        key: Key,
        field: String,
        existing: Box<Concept>,
        existing_origin: Origin,
        incoming: Box<Concept>,
        incoming_origin: Origin,
    },

    #[error("{concept} (from {origin}) references {target}, which is never produced")]
    UnresolvedReference {
        concept: Key,
        origin: Origin,
        target: Key,
    },

    #[error("Expansion did not terminate: {limit} exceeded along {}", render_chain(.chain))]
    NonTerminatingExpansion { limit: Limit, chain: Vec<Key> },

    #[error("Rule '{rule}' failed on {concept}: {message}")]
    RuleInvocation {
        rule: String,
        concept: Key,
        message: String,
    },

    #[error("Model too large: admitting {concept} would exceed {limit} concepts")]
    CapacityExceeded { concept: Key, limit: u64 },

    #[error("Invalid seed #{position} {concept}: {message}")]
    InvalidSeed {
        position: usize,
        concept: Key,
        message: String,
    },
}

impl ExpansionError {
    pub fn rule_invocation(rule: &str, concept: Key, message: impl Into<String>) -> Self {
        Self::RuleInvocation {
            rule: rule.to_string(),
            concept,
            message: message.into(),
        }
    }

    pub fn non_terminating(limit: Limit, chain: Vec<Key>) -> Self {
        Self::NonTerminatingExpansion { limit, chain }
    }

    /// The concept a human should look at first.
    pub fn concept(&self) -> Option<&Key> {
        match self {
            Self::DuplicateKeyConflict { key, .. } => Some(key),
            Self::UnresolvedReference { concept, .. }
            | Self::RuleInvocation { concept, .. }
            | Self::InvalidSeed { concept, .. }
            | Self::CapacityExceeded { concept, .. } => Some(concept),
            Self::NonTerminatingExpansion { chain, .. } => chain.last(),
        }
    }
}

fn render_chain(chain: &[Key]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
