//! Standard macro integration tests.
//!
//! These tests cover the `Monitored` macro, the shared audit log and the
//! cumulative `audited` list built by `AllPropertiesLogging`.

use cadre_concepts::{register_kinds, MonitoredRule};
use cadre_tests::prelude::*;

fn book() -> Concept {
    entity("Bookstore", "Book")
}

fn author() -> Concept {
    entity("Bookstore", "Author")
}

mod monitored_entity {
    use super::*;

    /// Standard kinds with only the `Monitored` macro registered.
    fn monitored_only(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
        register_kinds(builder)?;
        builder.add_rule(MONITORED, MonitoredRule);
        Ok(())
    }

    pub fn scenario() -> Scenario {
        Scenario::new("monitored_entity")
            .registry(monitored_only)
            .seed(book())
            .seed(monitored(&book().key()))
    }

    #[test]
    fn test_monitored_expands_into_five_concepts() {
        init_tracing();
        scenario()
            .expect(|a| {
                a.concepts(7)
                    .contains("Entity Bookstore.Book")
                    .contains("Monitored Bookstore.Book")
                    .contains("Property Bookstore.Book.CreatedAt")
                    .contains("CreationTime Bookstore.Book.CreatedAt")
                    .contains("DenyUserEdit Bookstore.Book.CreatedAt")
                    .contains("EntityLogging Bookstore.Book")
                    .contains("AllPropertiesLogging Bookstore.Book")
                    .attr("Property Bookstore.Book.CreatedAt", TYPE, data_type("DateTime"))
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_generated_concepts_reference_the_entity() {
        let model = scenario().expand().unwrap();
        let book = book().key();

        for stored in model.concepts() {
            if stored.key.kind == ENTITY {
                continue;
            }
            let mentions_book = stored.key.to_string().contains("Bookstore.Book");
            assert!(mentions_book, "{} does not mention the entity", stored.key);
        }
        let created_at = model
            .get_by_key(&property(&book, "CreatedAt", "DateTime").key())
            .unwrap();
        assert_eq!(
            created_at.origin,
            Origin::rule(MONITORED, monitored(&book).key())
        );
    }

    #[test]
    fn test_duplicate_monitored_seed_changes_nothing() {
        let once = scenario().expand().unwrap();
        let twice = scenario().seed(monitored(&book().key())).expand().unwrap();

        assert_eq!(once.keys(), twice.keys());
        assert_eq!(twice.stats().seeds, 3);
        assert_eq!(twice.stats().already_present, 1);
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        scenario()
            .expect(|a| {
                a.before("Entity Bookstore.Book", "Monitored Bookstore.Book")
                    .before(
                        "Property Bookstore.Book.CreatedAt",
                        "CreationTime Bookstore.Book.CreatedAt",
                    )
                    .before(
                        "EntityLogging Bookstore.Book",
                        "AllPropertiesLogging Bookstore.Book",
                    )
            })
            .run()
            .unwrap();
    }
}

mod shared_audit_log {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("shared_audit_log").seeds([
            book(),
            author(),
            monitored(&book().key()),
            monitored(&author().key()),
        ])
    }

    #[test]
    fn test_audit_log_appears_once() {
        scenario()
            .expect(|a| {
                a.concepts(17)
                    .kind(AUDIT_LOG, 1)
                    .kind(LOG_TARGET, 2)
                    .kind(ENTITY_LOGGING, 2)
                    .contains("AuditLog Common")
                    .contains("LogTarget Bookstore.Book.Common")
                    .contains("LogTarget Bookstore.Author.Common")
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_second_audit_log_is_already_present() {
        let model = scenario().expand().unwrap();
        let log = model.get_by_key(&audit_log(COMMON_AUDIT_LOG).key()).unwrap();

        // The author's log sorts first and claims the shared concept.
        assert_eq!(
            log.origin,
            Origin::rule(ENTITY_LOGGING, entity_logging(&author().key()).key())
        );
        assert!(model.stats().already_present >= 1);
    }
}

mod cumulative_audit {
    use super::*;

    fn audited(properties: &[&str]) -> Value {
        let book = book().key();
        let mut refs: Vec<Value> = properties
            .iter()
            .map(|name| {
                Key::new(PROPERTY, vec![book.clone().into(), (*name).into()]).into()
            })
            .collect();
        refs.sort();
        Value::List(refs)
    }

    #[test]
    fn test_properties_declared_before_the_macro() {
        let book = book().key();

        Scenario::new("declared_before")
            .seeds([
                property(&book, "Title", "ShortString"),
                property(&book, "Isbn", "ShortString"),
                monitored(&book),
                entity("Bookstore", "Book"),
            ])
            .expect(|a| {
                a.attr(
                    "EntityLogging Bookstore.Book",
                    AUDITED,
                    audited(&["CreatedAt", "Isbn", "Title"]),
                )
            })
            .run()
            .unwrap();
    }

    /// `Stamped <entity>` produces `StampPending <entity>`, which produces the
    /// `Stamp` property one wave after `AllPropertiesLogging` has run.
    fn with_late_property(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
        cadre_concepts::register(builder)?;
        builder.add_kind("Stamped").key("entity").done()?;
        builder.add_kind("StampPending").key("entity").done()?;
        builder
            .add_rule(
                "Stamped",
                rule_fn("Stamped", |concept, _| {
                    Ok(vec![Concept::new("StampPending").with_key(concept.key[0].clone())])
                }),
            )
            .add_rule(
                "StampPending",
                rule_fn("StampPending", |concept, _| {
                    let entity = concept.key[0]
                        .as_key()
                        .ok_or_else(|| RuleFailure::missing_field("entity"))?;
                    Ok(vec![property(entity, "Stamp", "Integer")])
                }),
            );
        Ok(())
    }

    #[test]
    fn test_properties_produced_after_the_macro() {
        let book = book().key();

        Scenario::new("produced_after")
            .registry(with_late_property)
            .seeds([
                entity("Bookstore", "Book"),
                monitored(&book),
                Concept::new("Stamped").with_key(&book),
            ])
            .expect(|a| {
                a.contains("Property Bookstore.Book.Stamp").attr(
                    "EntityLogging Bookstore.Book",
                    AUDITED,
                    audited(&["CreatedAt", "Stamp"]),
                )
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_reevaluation_stops_once_audit_list_is_stable() {
        let book = book().key();

        let model = Scenario::new("reevaluation")
            .seeds([entity("Bookstore", "Book"), monitored(&book)])
            .expand()
            .unwrap();

        // The list grows during the worklist; one round confirms it is stable.
        assert_eq!(model.stats().reevaluation_rounds, 1);
        assert_eq!(model.stats().merges, 1);
    }
}

mod large_model {
    use super::*;

    fn seeds(entities: usize) -> Vec<Concept> {
        (0..entities)
            .flat_map(|i| {
                let entity = entity("Bookstore", &format!("E{:04}", i));
                let monitored = monitored(&entity.key());
                [entity, monitored]
            })
            .collect()
    }

    #[test]
    fn test_thousands_of_monitored_entities_reach_fixed_point() {
        // Eight concepts per entity plus the shared audit log.
        Scenario::new("three_thousand_entities")
            .seeds(seeds(3_000))
            .expect(|a| {
                a.concepts(8 * 3_000 + 1)
                    .kind(AUDIT_LOG, 1)
                    .kind(ENTITY_LOGGING, 3_000)
                    .attr(
                        "EntityLogging Bookstore.E2999",
                        AUDITED,
                        Value::List(vec![property(
                            &entity("Bookstore", "E2999").key(),
                            "CreatedAt",
                            "DateTime",
                        )
                        .reference()]),
                    )
            })
            .run()
            .unwrap();
    }
}
