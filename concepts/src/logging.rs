//! Audit logging macros.

use crate::kinds::*;
use crate::ref_field;
use cadre_core::{Concept, Value};
use cadre_graph::ConceptStore;
use cadre_registry::{ExpansionRule, RuleFailure};
use tracing::trace;

/// Routes every `EntityLogging` into the shared `AuditLog`. All entities
/// produce the same `AuditLog Common`, so the model holds it once.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityLoggingRule;

impl ExpansionRule for EntityLoggingRule {
    fn name(&self) -> &str {
        ENTITY_LOGGING
    }

    fn expand(
        &self,
        concept: &Concept,
        _model: &ConceptStore,
    ) -> Result<Vec<Concept>, RuleFailure> {
        ref_field(concept, 0, "entity")?;
        let log = audit_log(COMMON_AUDIT_LOG);
        let target = log_target(&concept.key(), &log.key());
        Ok(vec![log, target])
    }
}

/// Adds every property of the logged entity to the entity log's `audited`
/// list. Properties may appear after this concept does, so the rule reads
/// the model and is re-evaluated until the list stops growing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPropertiesLoggingRule;

impl ExpansionRule for AllPropertiesLoggingRule {
    fn name(&self) -> &str {
        ALL_PROPERTIES_LOGGING
    }

    fn expand(
        &self,
        concept: &Concept,
        model: &ConceptStore,
    ) -> Result<Vec<Concept>, RuleFailure> {
        let logging = ref_field(concept, 0, "logging")?;
        let entity = logging
            .fields
            .first()
            .and_then(Value::as_key)
            .ok_or_else(|| RuleFailure::unexpected("logging", "an entity log", &logging.into()))?;

        let audited: Vec<Value> = model
            .with_first_key(PROPERTY, &Value::from(entity))
            .map(|p| p.concept.reference())
            .collect();
        trace!(%entity, properties = audited.len(), "collected audited properties");

        if audited.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![entity_logging(entity).with_attr(AUDITED, audited)])
    }

    fn reads_model(&self) -> bool {
        true
    }
}
