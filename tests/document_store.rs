use serde_json::json;

use worldkeeper::{
    Config, DocumentError, DocumentStore, JsonlBackend, KvBackend, KvHandle, LOG_FILE_NAME,
    MemoryBackend, SchemaCatalog, SearchOptions, StoreSettings, ValidateOptions, World,
    WorldError, WorldLocator, WriteMeta, validate_document,
};

fn settings() -> StoreSettings {
    Config::from_yaml_str("core_version: \"12.331\"\nsystem_id: dnd5e\nsystem_version: 3.0.0\n")
        .unwrap()
        .store_settings()
}

#[tokio::test]
async fn bilbo_lifecycle_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());

    let created = store
        .create(
            &world,
            "Actor",
            json!({"name": "Bilbo", "type": "character"}),
            &WriteMeta::by("gm"),
        )
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let id = created.id().unwrap().to_string();
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    let created_time = created.stats().unwrap().created_time;

    let updated = store
        .update(
            &world,
            "Actor",
            &id,
            &json!({"name": "Bilbo Baggins"}),
            &WriteMeta::by("player"),
        )
        .await
        .unwrap();
    assert!(updated.warnings().is_empty());
    let updated = updated.into_result().unwrap();
    assert_eq!(updated.name(), Some("Bilbo Baggins"));
    assert_eq!(updated.id(), Some(id.as_str()));
    assert_eq!(updated.stats().unwrap().created_time, created_time);
    assert_eq!(updated.document_type(), Some("character"));

    // A fresh store over the same directory sees the replayed log.
    let reopened = DocumentStore::new(JsonlBackend::new(), settings());
    let fetched = reopened
        .get(&world, "Actor", &id)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(fetched, updated);
    let stats = fetched.stats().unwrap();
    assert_eq!(stats.core_version.as_deref(), Some("12.331"));
    assert_eq!(stats.system_id.as_deref(), Some("dnd5e"));
    assert_eq!(stats.last_modified_by.as_deref(), Some("player"));

    assert!(
        world
            .collection_path("actors")
            .join(LOG_FILE_NAME)
            .is_file()
    );
}

#[tokio::test]
async fn delete_twice_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "items").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());

    let created = store
        .create(&world, "Item", json!({"name": "Sting"}), &WriteMeta::default())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let id = created.id().unwrap();

    assert!(store.delete(&world, "Item", id).await.unwrap().is_success());
    let second = store.delete(&world, "Item", id).await.unwrap();
    assert_eq!(
        second.error(),
        Some(&DocumentError::NotFound {
            collection: "items".to_string(),
            id: id.to_string(),
        })
    );

    let results = store
        .search(&world, "Item", &SearchOptions::new())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(results.total_found, 0);
}

#[tokio::test]
async fn missing_collection_is_reported() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());

    let result = store
        .get(&world, "JournalEntry", "abcdEFGH12345678")
        .await
        .unwrap();
    assert_eq!(
        result.error(),
        Some(&DocumentError::CollectionNotFound {
            world: "test-world".to_string(),
            collection: "journal".to_string(),
        })
    );
    assert_eq!(
        locator.locate("other-world").await,
        Err(WorldError::NotFound("other-world".to_string()))
    );
}

#[tokio::test]
async fn search_over_replayed_log() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());

    for (name, kind) in [
        ("Testania", "npc"),
        ("MyTestania", "npc"),
        ("Test", "character"),
        ("Teest", "npc"),
    ] {
        store
            .create(&world, "Actor", json!({"name": name, "type": kind}), &WriteMeta::default())
            .await
            .unwrap();
    }

    let reopened = DocumentStore::new(JsonlBackend::new(), settings());
    let results = reopened
        .search(&world, "Actor", &SearchOptions::new().name("T?st*"))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let mut names: Vec<&str> = results.documents.iter().filter_map(|d| d.name()).collect();
    names.sort();
    assert_eq!(names, vec!["Test", "Testania"]);

    let npcs = reopened
        .search(
            &world,
            "Actor",
            &SearchOptions::new().document_type("npc").limit(2),
        )
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(npcs.total_found, 3);
    assert_eq!(npcs.documents.len(), 2);
}

#[tokio::test]
async fn catalog_validation_feeds_the_store() {
    let catalog: SchemaCatalog = SchemaCatalog::from_value(&json!({
        "Actor": {
            "character": {
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "type": {"type": "string"},
                    "system": {
                        "type": "object",
                        "properties": {"hp": {"type": "integer", "minimum": 0, "default": 8}}
                    }
                },
                "required": ["name"]
            }
        }
    }))
    .unwrap();

    let input = json!({"name": "Bilbo", "type": "character", "system": {"hp": "12"}});
    let normalized = validate_document(&catalog, "Actor", &input, &ValidateOptions::default())
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(normalized["system"]["hp"], 12);

    let store = DocumentStore::new(MemoryBackend::new(), settings());
    let world = World::new("test-world", "/worlds/test-world", ["actors"]);
    let created = store
        .create(&world, "Actor", normalized, &WriteMeta::default())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(created.get("system"), Some(&json!({"hp": 12})));

    let rejected = validate_document(
        &catalog,
        "Actor",
        &json!({"type": "character", "system": {"hp": -1}}),
        &ValidateOptions::default(),
    )
    .unwrap();
    assert!(!rejected.valid);
    assert_eq!(rejected.errors.len(), 2);
}

#[tokio::test]
async fn create_after_torn_log_tail_is_durable() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let log = world.collection_path("actors").join(LOG_FILE_NAME);
    std::fs::write(&log, "{\"op\":\"put\",\"key\":\"!actors!x\",\"val").unwrap();

    let store = DocumentStore::new(JsonlBackend::new(), settings());
    let created = store
        .create(&world, "Actor", json!({"name": "Bilbo"}), &WriteMeta::default())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let id = created.id().unwrap();

    let reopened = DocumentStore::new(JsonlBackend::new(), settings());
    let fetched = reopened
        .get(&world, "Actor", id)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn open_reader_does_not_erase_concurrent_create() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());

    let hot = store
        .create(&world, "Actor", json!({"name": "Hot"}), &WriteMeta::default())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let hot_id = hot.id().unwrap().to_string();
    for round in 0..40 {
        store
            .update(&world, "Actor", &hot_id, &json!({"round": round}), &WriteMeta::default())
            .await
            .unwrap();
    }

    let reader = JsonlBackend::new()
        .open(&world.collection_path("actors"))
        .await
        .unwrap();
    let created = store
        .create(&world, "Actor", json!({"name": "Newcomer"}), &WriteMeta::default())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    reader.close().await.unwrap();

    let results = store
        .search(&world, "Actor", &SearchOptions::new())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(results.total_found, 2);
    let fetched = store
        .get(&world, "Actor", created.id().unwrap())
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(fetched.name(), Some("Newcomer"));
    let hot = store
        .get(&world, "Actor", &hot_id)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(hot.get("round"), Some(&json!(39)));
}

#[tokio::test]
async fn missing_collection_for_every_operation_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let locator = WorldLocator::new(root.path());
    let world = locator.provision("test-world", "actors").await.unwrap();
    let store = DocumentStore::new(JsonlBackend::new(), settings());
    let missing = DocumentError::CollectionNotFound {
        world: "test-world".to_string(),
        collection: "items".to_string(),
    };

    let update = store
        .update(
            &world,
            "Item",
            "abcdEFGH12345678",
            &json!({"name": "Sting"}),
            &WriteMeta::default(),
        )
        .await
        .unwrap();
    assert_eq!(update.error(), Some(&missing));
    let delete = store.delete(&world, "Item", "abcdEFGH12345678").await.unwrap();
    assert_eq!(delete.error(), Some(&missing));
    let search = store.search(&world, "Item", &SearchOptions::new()).await.unwrap();
    assert_eq!(search.error(), Some(&missing));
    assert!(!world.collection_path("items").exists());
}
