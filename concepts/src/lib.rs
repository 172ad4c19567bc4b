//! Cadre standard concepts
//!
//! The built-in concept kinds of a domain model and the macros that expand
//! them:
//! - `Entity`, `Property`, `DataType` (sink)
//! - `CreationTime`, `DenyUserEdit` property markers
//! - `EntityLogging`, `AllPropertiesLogging`, `AuditLog`, `LogTarget`
//! - `Monitored`: creation timestamp plus full audit logging for an entity

pub mod kinds;
mod logging;
mod monitored;

pub use logging::{AllPropertiesLoggingRule, EntityLoggingRule};
pub use monitored::MonitoredRule;

use cadre_core::{Concept, Key};
use cadre_registry::{Registry, RegistryBuilder, RegistryError, RuleFailure};

/// Declare the standard kinds.
pub fn register_kinds(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    use kinds::*;

    builder.add_kind(ENTITY).key("module").key("name").done()?;
    builder.add_kind(DATA_TYPE).key("name").sink().done()?;
    builder.add_kind(PROPERTY).key("entity").key("name").done()?;
    builder.add_kind(CREATION_TIME).key("property").done()?;
    builder.add_kind(DENY_USER_EDIT).key("property").done()?;
    builder
        .add_kind(ENTITY_LOGGING)
        .key("entity")
        .cumulative(AUDITED)
        .done()?;
    builder.add_kind(ALL_PROPERTIES_LOGGING).key("logging").done()?;
    builder.add_kind(AUDIT_LOG).key("name").done()?;
    builder.add_kind(LOG_TARGET).key("logging").key("log").done()?;
    builder.add_kind(MONITORED).key("entity").done()?;
    Ok(())
}

/// Declare the standard kinds and register every standard macro.
pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    register_kinds(builder)?;
    builder
        .add_rule(kinds::MONITORED, MonitoredRule)
        .add_rule(kinds::ENTITY_LOGGING, EntityLoggingRule)
        .add_rule(kinds::ALL_PROPERTIES_LOGGING, AllPropertiesLoggingRule);
    Ok(())
}

/// Registry with the standard kinds and macros.
pub fn standard_registry() -> Result<Registry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    register(&mut builder)?;
    builder.build()
}

/// Key field at `position`, which must be a reference.
pub(crate) fn ref_field<'c>(
    concept: &'c Concept,
    position: usize,
    name: &str,
) -> Result<&'c Key, RuleFailure> {
    let value = concept
        .key_field(position)
        .ok_or_else(|| RuleFailure::missing_field(name))?;
    value
        .as_key()
        .ok_or_else(|| RuleFailure::unexpected(name, "a reference", value))
}
