//! The `Monitored` macro.

use crate::kinds::*;
use crate::ref_field;
use cadre_core::Concept;
use cadre_graph::ConceptStore;
use cadre_registry::{ExpansionRule, RuleFailure};

/// Name of the generated creation timestamp property.
pub const CREATED_AT: &str = "CreatedAt";

/// Expands `Monitored <entity>` into a read-only `CreatedAt` timestamp
/// property and full audit logging for the entity:
///
/// ```text
/// Property <entity>.CreatedAt (DateTime)
/// CreationTime <entity>.CreatedAt
/// DenyUserEdit <entity>.CreatedAt
/// EntityLogging <entity>
/// AllPropertiesLogging <entity>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoredRule;

impl ExpansionRule for MonitoredRule {
    fn name(&self) -> &str {
        MONITORED
    }

    fn expand(
        &self,
        concept: &Concept,
        _model: &ConceptStore,
    ) -> Result<Vec<Concept>, RuleFailure> {
        let entity = ref_field(concept, 0, "entity")?;
        if entity.kind != ENTITY {
            return Err(RuleFailure::new(format!(
                "Monitored applies to entities, got {}",
                entity
            )));
        }

        let created_at = property(entity, CREATED_AT, "DateTime");
        let created_key = created_at.key();
        let logging = entity_logging(entity);
        let logging_key = logging.key();

        Ok(vec![
            created_at,
            creation_time(&created_key),
            deny_user_edit(&created_key),
            logging,
            all_properties_logging(&logging_key),
        ])
    }
}
