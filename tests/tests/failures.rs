//! Failure integration tests.
//!
//! Every failure aborts the whole run; these tests check the error kind and
//! the diagnostic it carries.

use cadre_tests::prelude::*;

fn book() -> Key {
    entity("Bookstore", "Book").key()
}

fn echo(n: i64) -> Concept {
    Concept::new("Echo").with_key(n)
}

/// `Echo n` expands into `Echo n+1`, forever.
fn with_echo(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder.add_kind("Echo").key("n").done()?;
    builder.add_rule(
        "Echo",
        rule_fn("Echo", |concept, _| {
            let n = concept.key[0]
                .as_int()
                .ok_or_else(|| RuleFailure::missing_field("n"))?;
            Ok(vec![echo(n + 1)])
        }),
    );
    Ok(())
}

mod non_terminating {
    use super::*;

    #[test]
    fn test_self_reproducing_rule_hits_depth_ceiling() {
        Scenario::new("echo_depth")
            .registry(with_echo)
            .config(EngineConfig::new().with_max_depth(10))
            .seed(echo(0))
            .expect(|a| {
                a.error("Expansion did not terminate").failure(|e| {
                    matches!(
                        e,
                        ExpansionError::NonTerminatingExpansion {
                            limit: Limit::Depth(10),
                            chain,
                        } if chain.len() == 12
                            && chain.first() == Some(&echo(0).key())
                            && chain.last() == Some(&echo(11).key())
                    )
                })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_self_reproducing_rule_hits_expansion_ceiling() {
        Scenario::new("echo_expansions")
            .registry(with_echo)
            .config(EngineConfig::new().with_max_expansions(25))
            .seed(echo(0))
            .expect(|a| {
                a.error("maximum expansions (25)").failure(|e| {
                    matches!(
                        e,
                        ExpansionError::NonTerminatingExpansion {
                            limit: Limit::Expansions(25),
                            ..
                        }
                    )
                })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_default_ceiling_stops_the_run() {
        let err = Scenario::new("echo_default")
            .registry(with_echo)
            .seed(echo(0))
            .expand()
            .unwrap_err();

        assert!(err.to_string().contains("maximum depth (100)"));
    }
}

mod unresolved_reference {
    use super::*;

    #[test]
    fn test_key_reference_to_missing_concept() {
        let ghost = entity("Bookstore", "Ghost").key();

        Scenario::new("missing_entity")
            .seeds([
                entity("Bookstore", "Book"),
                property(&ghost, "Name", "ShortString"),
            ])
            .expect(|a| {
                a.error("which is never produced").failure(|e| {
                    matches!(
                        e,
                        ExpansionError::UnresolvedReference { concept, target, origin }
                            if concept.to_string() == "Property Bookstore.Ghost.Name"
                                && target.to_string() == "Entity Bookstore.Ghost"
                                && *origin == Origin::seed(1)
                    )
                })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_payload_reference_to_missing_concept() {
        let base = entity("Bookstore", "Base").key();

        Scenario::new("missing_base")
            .seed(entity("Bookstore", "Book").with_attr("extends", base))
            .expect(|a| {
                a.failure(|e| {
                    matches!(
                        e,
                        ExpansionError::UnresolvedReference { target, .. }
                            if target.to_string() == "Entity Bookstore.Base"
                    )
                })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_sink_references_need_no_concept() {
        Scenario::new("sink_reference")
            .seeds([
                entity("Bookstore", "Book"),
                property(&book(), "Title", "ShortString"),
            ])
            .expect(|a| a.concepts(2).kind(DATA_TYPE, 0))
            .run()
            .unwrap();
    }
}

mod conflicts {
    use super::*;

    #[test]
    fn test_macro_output_conflicting_with_seed() {
        Scenario::new("created_at_conflict")
            .seeds([
                entity("Bookstore", "Book"),
                property(&book(), "CreatedAt", "Integer"),
                monitored(&book()),
            ])
            .expect(|a| {
                a.error("field 'type' differs").failure(|e| {
                    matches!(
                        e,
                        ExpansionError::DuplicateKeyConflict {
                            field,
                            existing_origin,
                            incoming_origin,
                            ..
                        } if field == TYPE
                            && *existing_origin == Origin::seed(1)
                            && *incoming_origin == Origin::rule(MONITORED, monitored(&book()).key())
                    )
                })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_identical_redeclaration_is_not_a_conflict() {
        Scenario::new("created_at_agrees")
            .seeds([
                entity("Bookstore", "Book"),
                property(&book(), "CreatedAt", "DateTime"),
                monitored(&book()),
            ])
            .expect(|a| a.kind(PROPERTY, 1))
            .run()
            .unwrap();
    }
}

mod invalid_input {
    use super::*;

    #[test]
    fn test_unknown_seed_kind() {
        Scenario::new("unknown_kind")
            .seeds([entity("Bookstore", "Book"), Concept::new("Widget").with_key("x")])
            .expect(|a| {
                a.failure(|e| matches!(e, ExpansionError::InvalidSeed { position: 1, .. }))
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_seed_with_wrong_key_arity() {
        Scenario::new("short_entity")
            .seed(Concept::new(ENTITY).with_key("Book"))
            .expect(|a| a.error("Invalid seed #0"))
            .run()
            .unwrap();
    }

    #[test]
    fn test_rule_failure_names_rule_and_concept() {
        let log = audit_log(COMMON_AUDIT_LOG);

        Scenario::new("monitored_log")
            .seeds([monitored(&log.key()), log])
            .expect(|a| {
                a.error("Rule 'Monitored' failed on Monitored Common").failure(|e| {
                    matches!(e, ExpansionError::RuleInvocation { rule, .. } if rule == MONITORED)
                })
            })
            .run()
            .unwrap();
    }
}
