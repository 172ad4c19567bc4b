//! Standard kind names and concept constructors.

use cadre_core::{Concept, Key};

pub const ENTITY: &str = "Entity";
pub const DATA_TYPE: &str = "DataType";
pub const PROPERTY: &str = "Property";
pub const CREATION_TIME: &str = "CreationTime";
pub const DENY_USER_EDIT: &str = "DenyUserEdit";
pub const ENTITY_LOGGING: &str = "EntityLogging";
pub const ALL_PROPERTIES_LOGGING: &str = "AllPropertiesLogging";
pub const AUDIT_LOG: &str = "AuditLog";
pub const LOG_TARGET: &str = "LogTarget";
pub const MONITORED: &str = "Monitored";

/// Payload field of a property naming its data type.
pub const TYPE: &str = "type";
/// Cumulative payload field of `EntityLogging` listing audited properties.
pub const AUDITED: &str = "audited";

/// Name of the audit log every entity log writes into.
pub const COMMON_AUDIT_LOG: &str = "Common";

pub fn entity(module: &str, name: &str) -> Concept {
    Concept::new(ENTITY).with_key(module).with_key(name)
}

/// Key of a data type sink. Data types are never admitted as concepts.
pub fn data_type(name: &str) -> Key {
    Key::new(DATA_TYPE, vec![name.into()])
}

pub fn property(entity: &Key, name: &str, data_type_name: &str) -> Concept {
    Concept::new(PROPERTY)
        .with_key(entity)
        .with_key(name)
        .with_attr(TYPE, data_type(data_type_name))
}

pub fn creation_time(property: &Key) -> Concept {
    Concept::new(CREATION_TIME).with_key(property)
}

pub fn deny_user_edit(property: &Key) -> Concept {
    Concept::new(DENY_USER_EDIT).with_key(property)
}

pub fn entity_logging(entity: &Key) -> Concept {
    Concept::new(ENTITY_LOGGING).with_key(entity)
}

pub fn all_properties_logging(logging: &Key) -> Concept {
    Concept::new(ALL_PROPERTIES_LOGGING).with_key(logging)
}

pub fn audit_log(name: &str) -> Concept {
    Concept::new(AUDIT_LOG).with_key(name)
}

pub fn log_target(logging: &Key, log: &Key) -> Concept {
    Concept::new(LOG_TARGET).with_key(logging).with_key(log)
}

pub fn monitored(entity: &Key) -> Concept {
    Concept::new(MONITORED).with_key(entity)
}
