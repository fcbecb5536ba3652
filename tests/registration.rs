//! Purpose: Registry membership flows against the in-memory service.
//! Exports: None (integration test module).
//! Role: Walk a record through schema staging, registration and unregistration.
//! Invariants: The registry id only ever comes from server responses.

mod support;

use benchling_api::api::{
    DnaSequence, ErrorKind, Lookup, Method, NamingStrategy, Query, RegistryAware,
};
use serde_json::{Value, json};
use support::{FakeServer, TestResult, session_for};

const REGISTRY_ID: &str = "src_main";

fn server_with_registry() -> std::sync::Arc<FakeServer> {
    let server = FakeServer::new();
    server.add_registry(
        REGISTRY_ID,
        "Main",
        vec![
            json!({"id": "ts_plasmid", "name": "Plasmid", "type": "dna_sequence", "registryId": REGISTRY_ID}),
            json!({"id": "ts_protein", "name": "Protein", "type": "aa_sequence", "registryId": REGISTRY_ID}),
        ],
    );
    server
}

#[test]
fn valid_schemas_match_the_entity_type() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);

    let valid = session.dna_sequence().valid_schemas()?;
    assert_eq!(valid.len(), 1);
    let (registry, schema) = &valid[0];
    assert_eq!(registry.id(), Some(REGISTRY_ID));
    assert_eq!(schema.name.as_deref(), Some("Plasmid"));
    assert_eq!(schema.registry_id(), Some(REGISTRY_ID));

    assert!(session.oligo().valid_schemas()?.is_empty());
    Ok(())
}

#[test]
fn register_requires_a_staged_schema() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let mut sequence = session.dna_sequence().build(DnaSequence::new("pGFP", "ACGT", true));
    sequence.save()?;
    server.clear_requests();

    let err = sequence
        .register(NamingStrategy::NewIds)
        .expect_err("nothing staged");
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.hint().is_some());
    assert_eq!(server.request_count(), 0);
    Ok(())
}

#[test]
fn unknown_schema_name_is_rejected() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let mut sequence = session.dna_sequence().build(DnaSequence::new("pGFP", "ACGT", true));
    sequence.save()?;

    let err = sequence.set_schema("Vector").expect_err("no such schema");
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(sequence.staged_schema().is_none());
    assert!(sequence.schema_id.is_none());
    Ok(())
}

#[test]
fn register_then_unregister() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let mut sequence = session.dna_sequence().build(DnaSequence::new("pGFP", "ACGT", true));
    sequence.save()?;
    let id = sequence.id().expect("id").to_string();

    sequence.set_schema("Plasmid")?;
    let staged = sequence.staged_schema().expect("staged");
    assert_eq!(staged.registry_id, REGISTRY_ID);
    assert_eq!(staged.schema_id, "ts_plasmid");
    assert_eq!(sequence.schema_id.as_deref(), Some("ts_plasmid"));
    assert!(!sequence.is_registered());
    let stored = server.record("dna-sequences", &id).expect("stored");
    assert_eq!(stored["schemaId"], json!("ts_plasmid"));

    sequence.register(NamingStrategy::NewIds)?;
    assert!(sequence.is_registered());
    assert_eq!(sequence.registry_id(), Some(REGISTRY_ID));
    let entity_registry_id = sequence
        .entity_registry_id()
        .expect("entity registry id")
        .to_string();
    let register_call = server
        .requests()
        .into_iter()
        .find(|request| request.url.path().ends_with(":register-entities"))
        .expect("register call");
    assert_eq!(register_call.method, Method::Post);
    assert_eq!(
        register_call.body,
        Some(json!({"entityIds": [id], "namingStrategy": "NEW_IDS"}))
    );

    let registry = sequence.registry()?.expect("registry");
    assert_eq!(registry.name.as_deref(), Some("Main"));
    let found = session
        .dna_sequence()
        .find_in_registry(&entity_registry_id, Some(Lookup::Id(REGISTRY_ID)))?
        .expect("registered entity");
    assert_eq!(found.id(), Some(id.as_str()));
    let by_registry_id = session.dna_sequence().registry_dict(None, &Query::new())?;
    assert!(by_registry_id.contains_key(&entity_registry_id));

    sequence.unregister("lib_drafts")?;
    assert!(!sequence.is_registered());
    assert_eq!(sequence.registry_id(), None);
    assert!(sequence.staged_schema().is_none());
    assert_eq!(sequence.folder_id.as_deref(), Some("lib_drafts"));

    server.clear_requests();
    sequence.unregister("lib_drafts")?;
    assert_eq!(server.request_count(), 0);
    Ok(())
}

#[test]
fn custom_id_registration_keeps_the_name() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let mut sequence = session.dna_sequence().build(DnaSequence::new("pGFP", "ACGT", true));
    sequence.save()?;
    sequence.set_schema("Plasmid")?;

    sequence.register_with_custom_id("PL-0001")?;

    assert!(sequence.is_registered());
    assert_eq!(sequence.entity_registry_id(), Some("PL-0001"));
    assert_eq!(sequence.name.as_deref(), Some("pGFP"));
    Ok(())
}

#[test]
fn delete_names_keeps_old_name_as_alias() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let mut sequence = session.dna_sequence().build(DnaSequence::new("pGFP", "ACGT", true));
    sequence.save()?;
    sequence.set_schema("Plasmid")?;

    sequence.register_and_save_name_as_alias()?;

    let entity_registry_id = sequence.entity_registry_id().expect("registered").to_string();
    assert_eq!(sequence.name.as_deref(), Some(entity_registry_id.as_str()));
    assert_eq!(sequence.aliases, ["pGFP"]);
    Ok(())
}

#[test]
fn unknown_registry_maps_to_invalid_registry_id() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);

    let err = session
        .registry()
        .register_entities("src_missing", &["seq_1"], NamingStrategy::NewIds)
        .expect_err("unknown registry");
    assert_eq!(err.kind(), ErrorKind::InvalidRegistryId);
    assert_eq!(err.status(), Some(400));
    assert!(matches!(err.body(), Some(Value::Object(_))));
    Ok(())
}

#[test]
fn registries_resolve_by_id_name_or_default() -> TestResult<()> {
    let server = server_with_registry();
    let session = session_for(&server);
    let registries = session.registry();

    assert!(registries.get(REGISTRY_ID)?.is_some());
    assert!(registries.get("src_nope")?.is_none());
    let by_name = registries
        .find_registry(Some(Lookup::Name("Main")))?
        .expect("by name");
    assert_eq!(by_name.id(), Some(REGISTRY_ID));
    assert!(registries.find_registry(None)?.is_some());
    let owner = registries
        .find_from_schema_id("ts_protein")?
        .expect("owner");
    assert_eq!(owner.id(), Some(REGISTRY_ID));
    let schema = owner
        .get_schema(Lookup::Name("Protein"))?
        .expect("schema");
    assert_eq!(schema.schema_type.as_deref(), Some("aa_sequence"));

    server.add_registry("src_second", "Second", Vec::new());
    assert!(registries.find_registry(None)?.is_none());
    Ok(())
}
