use datastack::{
    ConfigurationName, DataStack, EntityDescriptor, EntityTypeName, FieldDescriptor, FieldKind,
    Schema, SchemaVersion, StackError, StoreDescriptor, StoreResolution, VersionGraph, VersionId,
};

fn account_v1() -> EntityDescriptor {
    EntityDescriptor::builder("Account")
        .field(FieldDescriptor::required("name", FieldKind::Text))
        .field(FieldDescriptor::required("balance", FieldKind::Int))
        .build()
        .unwrap()
}

fn account_v3() -> EntityDescriptor {
    EntityDescriptor::builder("Account")
        .field(FieldDescriptor::required("name", FieldKind::Text))
        .field(FieldDescriptor::required("balance", FieldKind::Int))
        .field(FieldDescriptor::optional("closed_at", FieldKind::Timestamp))
        .build()
        .unwrap()
}

fn transaction() -> EntityDescriptor {
    EntityDescriptor::builder("Transaction")
        .field(FieldDescriptor::required("amount", FieldKind::Int))
        .field(FieldDescriptor::required("posted_at", FieldKind::Timestamp))
        .build()
        .unwrap()
}

fn audit_entry() -> EntityDescriptor {
    EntityDescriptor::builder("AuditEntry")
        .field(FieldDescriptor::required("message", FieldKind::Text))
        .field(FieldDescriptor::optional("details", FieldKind::Json))
        .build()
        .unwrap()
}

/// Three versions of a small ledger schema. Version 2 introduces the
/// Transaction entity and the "ledger" configuration; version 3 widens
/// Account with an optional closure timestamp.
fn ledger_schema() -> Schema {
    let v1 = SchemaVersion::builder("v1")
        .entity(account_v1())
        .entity(audit_entry())
        .configuration("audit", ["AuditEntry"])
        .build()
        .unwrap();

    let v2 = SchemaVersion::builder("v2")
        .entity(account_v1())
        .entity(audit_entry())
        .entity(transaction())
        .configuration("audit", ["AuditEntry"])
        .configuration("ledger", ["Account", "Transaction"])
        .build()
        .unwrap();

    let v3 = SchemaVersion::builder("v3")
        .entity(account_v3())
        .entity(audit_entry())
        .entity(transaction())
        .configuration("audit", ["AuditEntry"])
        .configuration("ledger", ["Account", "Transaction"])
        .build()
        .unwrap();

    Schema::new(vec![v1, v2, v3]).unwrap()
}

fn ledger_stack() -> DataStack {
    DataStack::new(ledger_schema(), VersionGraph::linear(["v1", "v2", "v3"])).unwrap()
}

#[test]
fn partitioned_stores_route_without_hints() {
    let stack = ledger_stack();

    let audit_store = stack
        .attach_store(StoreDescriptor::url(
            ConfigurationName::named("audit"),
            "file:///var/lib/ledger/audit.db",
        ))
        .unwrap();
    let ledger_store = stack
        .attach_store(StoreDescriptor::url(
            ConfigurationName::named("ledger"),
            "file:///var/lib/ledger/main.db",
        ))
        .unwrap();

    // Each entity type belongs to exactly one attached configuration, so
    // inference finds the store without any hint.
    assert_eq!(
        stack.resolve_store(&EntityTypeName::new("AuditEntry"), None, true),
        StoreResolution::Resolved(audit_store),
    );
    assert_eq!(
        stack.resolve_store(&EntityTypeName::new("Account"), None, true),
        StoreResolution::Resolved(ledger_store.clone()),
    );
    assert_eq!(
        stack
            .require_store(&EntityTypeName::new("Transaction"), None)
            .unwrap(),
        ledger_store,
    );
}

#[test]
fn default_store_spans_every_entity_type() {
    let stack = ledger_stack();
    let store = stack
        .attach_store(StoreDescriptor::memory(ConfigurationName::Default))
        .unwrap();

    for name in ["Account", "AuditEntry", "Transaction"] {
        assert_eq!(
            stack.require_store(&EntityTypeName::new(name), None).unwrap(),
            store,
            "{name} should route to the default store",
        );
    }

    let attached = stack.attached_stores();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].entity_count, 3);
}

#[test]
fn overlapping_stores_need_explicit_configuration() {
    let stack = ledger_stack();
    stack
        .attach_store(StoreDescriptor::memory(ConfigurationName::Default))
        .unwrap();
    let audit_store = stack
        .attach_store(StoreDescriptor::url(
            ConfigurationName::named("audit"),
            "file:///var/lib/ledger/audit.db",
        ))
        .unwrap();

    // AuditEntry is reachable through both the default and the audit
    // configurations.
    let audit_entity = EntityTypeName::new("AuditEntry");
    assert_eq!(
        stack.resolve_store(&audit_entity, None, true),
        StoreResolution::Ambiguous,
    );

    let err = stack.require_store(&audit_entity, None).unwrap_err();
    assert!(err.is_ambiguity());

    let hint = ConfigurationName::named("audit");
    assert_eq!(
        stack.require_store(&audit_entity, Some(&hint)).unwrap(),
        audit_store,
    );
}

#[test]
fn migration_walk_reaches_active_version() {
    let stack = ledger_stack();
    assert_eq!(stack.active_version(), &VersionId::new("v3"));

    let from_oldest: Vec<&VersionId> = stack.migration_steps(&VersionId::new("v1")).collect();
    assert_eq!(
        from_oldest,
        vec![&VersionId::new("v2"), &VersionId::new("v3")],
    );

    let from_middle: Vec<&VersionId> = stack.migration_steps(&VersionId::new("v2")).collect();
    assert_eq!(from_middle, vec![&VersionId::new("v3")]);

    assert_eq!(stack.migration_steps(stack.active_version()).count(), 0);
    assert_eq!(stack.migration_chain().debug_path(), "v1 -> v2 -> v3");
}

#[test]
fn fingerprints_drift_only_when_declarations_change() {
    let schema = ledger_schema();
    let v1 = schema.get(&VersionId::new("v1")).unwrap();
    let v2 = schema.get(&VersionId::new("v2")).unwrap();
    let v3 = schema.get(&VersionId::new("v3")).unwrap();

    // v2 adds an entity and a configuration; v3 widens a field list.
    assert_ne!(v1.fingerprint(), v2.fingerprint());
    assert_ne!(v2.fingerprint(), v3.fingerprint());

    // Redeclaring the same shapes reproduces the same fingerprint.
    let again = ledger_schema();
    assert_eq!(
        v3.fingerprint(),
        again.get(&VersionId::new("v3")).unwrap().fingerprint(),
    );
}

#[test]
fn setup_failures_surface_typed_errors() {
    // Contradictory chain input.
    let conflicted = VersionGraph::from_pairs([("v1", "v2"), ("v1", "v3")]);
    let err = DataStack::new(ledger_schema(), conflicted).unwrap_err();
    assert!(err.is_setup());

    // Chain mentioning a version the schema never declared.
    let stray = VersionGraph::linear(["v0", "v1", "v2", "v3"]);
    let err = DataStack::new(ledger_schema(), stray).unwrap_err();
    assert!(matches!(err, StackError::Setup(_)));

    // Attaching a store for an undeclared configuration.
    let stack = ledger_stack();
    let err = stack
        .attach_store(StoreDescriptor::memory(ConfigurationName::named("ghost")))
        .unwrap_err();
    assert!(err.is_setup());

    // Resolution failures carry their own classification.
    let err = stack
        .require_store(&EntityTypeName::new("Account"), None)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn replacing_a_store_reroutes_existing_entities() {
    let stack = ledger_stack();
    let scratch = stack
        .attach_store(StoreDescriptor::memory(ConfigurationName::Default))
        .unwrap();
    assert_eq!(
        stack.require_store(&EntityTypeName::new("Account"), None).unwrap(),
        scratch,
    );

    let durable = stack
        .attach_store(StoreDescriptor::url(
            ConfigurationName::Default,
            "file:///var/lib/ledger/all.db",
        ))
        .unwrap();
    assert_ne!(scratch.id(), durable.id());

    assert_eq!(
        stack.require_store(&EntityTypeName::new("Account"), None).unwrap(),
        durable,
    );
    assert_eq!(stack.attached_stores().len(), 1);
}

#[test]
fn pinned_stack_runs_behind_latest_schema() {
    // The binary ships v3 but this deployment still runs at v2, with the
    // chain trimmed accordingly.
    let stack = DataStack::with_active_version(
        ledger_schema(),
        VersionGraph::linear(["v1", "v2"]),
        &VersionId::new("v2"),
    )
    .unwrap();

    assert_eq!(stack.active_version(), &VersionId::new("v2"));
    assert!(stack
        .active_schema()
        .contains_entity(&EntityTypeName::new("Transaction")));

    // v2's ledger configuration exists, so its store attaches fine.
    let store = stack
        .attach_store(StoreDescriptor::memory(ConfigurationName::named("ledger")))
        .unwrap();
    assert_eq!(
        stack.require_store(&EntityTypeName::new("Transaction"), None).unwrap(),
        store,
    );
}
