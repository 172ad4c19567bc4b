//! Cadre Concept Graph
//!
//! This crate provides the concept store and the key/dependency resolver:
//! - Arena storage: every concept lives in one owning collection
//! - Key index: structural key -> concept, so identical concepts merge
//! - Kind index: concepts of one kind, ordered by key
//! - Resolver: key resolution, closure checks, dependency ordering

mod error;
pub mod resolver;
mod shared;
mod store;

pub use error::{StoreError, StoreResult};
pub use resolver::ResolveError;
pub use shared::SharedStore;
pub use store::{Admission, ConceptStore, StoredConcept};
