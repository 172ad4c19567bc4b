//! Cadre Core Types
//!
//! This crate provides the foundational types used throughout Cadre:
//! - Identity types (ConceptId)
//! - Values and structural keys (Value, Key)
//! - Concepts and where they came from (Concept, Origin)
//! - Declared concept kinds (KindDef, Schema)
//! - Common error types

mod concept;
mod error;
mod id;
mod schema;
mod value;

pub use concept::*;
pub use error::*;
pub use id::*;
pub use schema::*;
pub use value::*;
