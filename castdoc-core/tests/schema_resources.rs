use castdoc_core::schema::{FieldKind, FieldSpec, SchemaRegistry};
use castdoc_core::{embed_one, marshal_many, marshal_one, MarshalError};
use indexmap::IndexMap;
use serde_json::{json, Value};

fn compile(definitions: Value) -> Result<SchemaRegistry, MarshalError> {
    let definitions: IndexMap<String, Vec<FieldSpec>> =
        serde_json::from_value(definitions).expect("Definitions should deserialize");
    SchemaRegistry::compile(&definitions)
}

fn podcast_schemas() -> SchemaRegistry {
    compile(json!({
        "podcast": [
            { "field": "uid", "jsonapi": "primary,podcast" },
            { "field": "draft_id", "jsonapi": "client-id" },
            { "field": "title", "jsonapi": "attr,title" },
            { "field": "tags", "jsonapi": "attr,tags,omit-if-empty" },
            { "field": "published", "jsonapi": "attr,published", "kind": "timestamp" },
            { "field": "updated", "jsonapi": "attr,updated,omit-if-empty", "kind": "optional-timestamp" },
            { "field": "episodes", "jsonapi": "relation,episodes", "target": "episode" },
            { "field": "latest", "jsonapi": "relation,latest_episode", "target": "episode" }
        ],
        "episode": [
            { "field": "uid", "jsonapi": "primary,episode" },
            { "field": "title", "jsonapi": "attr,title" }
        ]
    }))
    .expect("Schemas should compile")
}

#[test]
fn test_field_spec_kind_defaults_to_value() {
    let spec: FieldSpec = serde_json::from_value(json!({ "field": "t", "jsonapi": "attr,t" })).unwrap();
    assert_eq!(spec.kind, FieldKind::Value);
    assert_eq!(spec.target, None);
}

#[test]
fn test_record_marshals_with_sideloaded_relations() {
    let schemas = podcast_schemas();
    let record = json!({
        "uid": 42,
        "title": "Example",
        "tags": "",
        "published": "2023-11-14T22:13:20Z",
        "episodes": [
            { "uid": "7", "title": "Ep1" },
            { "uid": "8", "title": "Ep2" }
        ],
        "latest": { "uid": "8", "title": "Ep2" }
    });

    let resource = schemas.bind("podcast", &record).expect("Record fits schema");
    let payload = marshal_one(&resource).expect("Should marshal");

    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "data": {
                "type": "podcast",
                "id": "42",
                "attributes": { "title": "Example", "published": 1_700_000_000 },
                "relationships": {
                    "episodes": { "data": [
                        { "type": "episode", "id": "7" },
                        { "type": "episode", "id": "8" }
                    ] },
                    "latest_episode": { "data": { "type": "episode", "id": "8" } }
                }
            },
            "included": [
                { "type": "episode", "id": "7", "attributes": { "title": "Ep1" } },
                { "type": "episode", "id": "8", "attributes": { "title": "Ep2" } }
            ]
        })
    );
}

#[test]
fn test_missing_fields_behave_like_empty_values() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "p1", "draft_id": "", "updated": null, "episodes": [] });

    let payload = marshal_one(&schemas.bind("podcast", &record).unwrap()).unwrap();
    let attributes = &payload.data.attributes;

    assert_eq!(attributes.get("title"), Some(&json!("")));
    assert!(!attributes.contains_key("tags"));
    assert!(!attributes.contains_key("published"));
    assert!(!attributes.contains_key("updated"));
    assert!(payload.data.relationships.is_empty());
    assert_eq!(payload.data.client_id, None);
}

#[test]
fn test_client_id_and_epoch_timestamps_are_read_from_record() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "p1", "draft_id": "tmp-9", "updated": 1_700_000_600 });

    let payload = marshal_one(&schemas.bind("podcast", &record).unwrap()).unwrap();
    assert_eq!(payload.data.client_id.as_deref(), Some("tmp-9"));
    assert_eq!(payload.data.attributes.get("updated"), Some(&json!(1_700_000_600)));
}

#[test]
fn test_unix_epoch_in_record_is_kept() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "p1", "published": 0, "updated": 0 });

    let resource = schemas.bind("podcast", &record).unwrap();
    assert_eq!(resource.schema().name(), "podcast");
    assert_eq!(resource.record(), &record);

    let payload = marshal_one(&resource).unwrap();
    assert_eq!(payload.data.attributes.get("published"), Some(&json!(0)));
    assert_eq!(payload.data.attributes.get("updated"), Some(&json!(0)));
}

#[test]
fn test_records_bind_as_collection() {
    let schemas = podcast_schemas();
    let records = json!([
        { "uid": "a", "title": "A", "latest": { "uid": "1", "title": "One" } },
        { "uid": "b", "title": "B", "latest": { "uid": "1", "title": "One again" } }
    ]);

    let resources = schemas.bind_all("podcast", &records).unwrap();
    let payload = marshal_many(&resources).unwrap();

    assert_eq!(payload.data.len(), 2);
    assert_eq!(payload.included.len(), 1);
    assert_eq!(payload.included[0].attributes["title"], json!("One"));
}

#[test]
fn test_single_object_binds_as_one_element_collection() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "a" });
    assert_eq!(schemas.bind_all("podcast", &record).unwrap().len(), 1);
}

#[test]
fn test_record_embeds_related_records() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "42", "title": "Example", "latest": { "uid": "7", "title": "Ep1" } });

    let payload = embed_one(&schemas.bind("podcast", &record).unwrap()).unwrap();
    let encoded = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        encoded["data"]["relationships"]["latest_episode"]["data"],
        json!({ "type": "episode", "id": "7", "attributes": { "title": "Ep1" } })
    );
    assert!(encoded.get("included").is_none());
}

#[test]
fn test_non_integer_primary_value_is_rejected() {
    let schemas = podcast_schemas();
    for uid in [json!(1.5), json!(true), json!(null), json!(["x"])] {
        let record = json!({ "uid": uid });
        let err = marshal_one(&schemas.bind("podcast", &record).unwrap()).unwrap_err();
        assert!(matches!(err, MarshalError::InvalidIdentityType { .. }), "got {err:?}");
    }

    let record = json!({ "title": "no uid" });
    let err = marshal_one(&schemas.bind("podcast", &record).unwrap()).unwrap_err();
    assert!(matches!(err, MarshalError::InvalidIdentityType { ref found } if found == "missing"));
}

#[test]
fn test_bad_nested_primary_fails_whole_document() {
    let schemas = podcast_schemas();
    let record = json!({ "uid": "p", "episodes": [{ "uid": "1" }, { "uid": 2.5 }] });

    let err = marshal_one(&schemas.bind("podcast", &record).unwrap()).unwrap_err();
    assert!(matches!(err, MarshalError::InvalidIdentityType { .. }));
}

#[test]
fn test_malformed_annotation_fails_compilation() {
    let err = compile(json!({
        "podcast": [
            { "field": "uid", "jsonapi": "primary,podcast" },
            { "field": "title", "jsonapi": "attr" }
        ]
    }))
    .unwrap_err();
    assert!(matches!(err, MarshalError::MalformedAnnotation { ref annotation } if annotation == "attr"));
}

#[test]
fn test_schema_without_primary_is_invalid() {
    let err = compile(json!({
        "podcast": [{ "field": "title", "jsonapi": "attr,title" }]
    }))
    .unwrap_err();
    assert!(matches!(err, MarshalError::InvalidSchema { ref schema, .. } if schema == "podcast"));
}

#[test]
fn test_relation_targets_must_exist() {
    let missing_target = compile(json!({
        "podcast": [
            { "field": "uid", "jsonapi": "primary,podcast" },
            { "field": "episodes", "jsonapi": "relation,episodes" }
        ]
    }))
    .unwrap_err();
    assert!(matches!(missing_target, MarshalError::InvalidSchema { .. }));

    let unknown_target = compile(json!({
        "podcast": [
            { "field": "uid", "jsonapi": "primary,podcast" },
            { "field": "episodes", "jsonapi": "relation,episodes", "target": "episode" }
        ]
    }))
    .unwrap_err();
    assert!(matches!(unknown_target, MarshalError::InvalidSchema { ref reason, .. } if reason.contains("episode")));
}

#[test]
fn test_binding_checks_schema_name_and_record_shape() {
    let schemas = podcast_schemas();

    let record = json!({ "uid": "1" });
    assert!(matches!(
        schemas.bind("show", &record),
        Err(MarshalError::UnknownSchema { ref name }) if name == "show"
    ));

    let not_object = json!("podcast");
    assert!(matches!(
        schemas.bind("podcast", &not_object),
        Err(MarshalError::InvalidRecord { .. })
    ));

    let bad_relation = json!({ "uid": "1", "episodes": 3 });
    assert!(matches!(
        schemas.bind("podcast", &bad_relation),
        Err(MarshalError::InvalidRecord { ref field, .. }) if field == "episodes"
    ));

    let bad_timestamp = json!({ "uid": "1", "published": "yesterday" });
    assert!(matches!(
        schemas.bind("podcast", &bad_timestamp),
        Err(MarshalError::InvalidRecord { ref field, .. }) if field == "published"
    ));

    let bad_nested = json!({ "uid": "1", "latest": "7" });
    assert!(matches!(
        schemas.bind("podcast", &bad_nested),
        Err(MarshalError::InvalidRecord { .. })
    ));
}

#[test]
fn test_repeated_identity_along_a_path_is_a_cycle() {
    let schemas = compile(json!({
        "person": [
            { "field": "id", "jsonapi": "primary,person" },
            { "field": "friend", "jsonapi": "relation,friend", "target": "person" }
        ]
    }))
    .unwrap();
    let record = json!({ "id": 1, "friend": { "id": 2, "friend": { "id": 1 } } });

    let err = marshal_one(&schemas.bind("person", &record).unwrap()).unwrap_err();
    assert!(matches!(err, MarshalError::CyclicGraph { ref id, .. } if id == "1"));
}

#[test]
fn test_schema_names_keep_definition_order() {
    let names: Vec<_> = podcast_schemas().names().map(str::to_string).collect();
    assert_eq!(names, vec!["podcast", "episode"]);
}
