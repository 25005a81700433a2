use proptest::prelude::*;
use serde_json::{Value, json};

use worldkeeper::{
    DocumentStore, MemoryBackend, ProtectedPaths, SchemaNode, StoreSettings, ValidateOptions,
    WildcardPattern, World, WriteMeta, collection_name_for, decode_key, encode_key, merge,
    validate,
};

mod strategies {
    use super::*;
    use proptest::collection::{hash_map, vec};
    use proptest::string::string_regex;

    /// Strategy for generating arbitrary, possibly nested JSON values
    pub fn json_value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<String>().prop_map(Value::String),
            any::<f64>().prop_map(|f| json!(f)),
            any::<i64>().prop_map(|i| json!(i)),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
            prop_oneof![Just("true"), Just("0"), Just("12"), Just(" 3.5 "), Just("")]
                .prop_map(|s| Value::String(s.to_string())),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                vec(inner.clone(), 0..6).prop_map(Value::Array),
                hash_map(field_name_strategy(), inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    /// Strategy for field names, biased towards the names the schemas declare
    pub fn field_name_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop_oneof![
                Just("name"), Just("hp"), Just("tags"), Just("alive"), Just("type"), Just("_id"),
                Just("_stats"), Just("createdTime"), Just("system")
            ]
            .prop_map(str::to_string),
            1 => string_regex(r"[a-zA-Z_][a-zA-Z0-9_]{0,8}").unwrap(),
        ]
    }

    /// A fixed set of schemas exercising every keyword
    pub fn schemas() -> Vec<SchemaNode> {
        [
            json!({}),
            json!({"type": "number", "minimum": 0, "maximum": 3}),
            json!({"type": "integer", "multipleOf": 2, "default": 4}),
            json!({"type": "boolean", "required": true}),
            json!({"type": ["number", "string"], "nullable": true}),
            json!({"type": "string", "minLength": 1, "maxLength": 5, "pattern": "[a-z]+"}),
            json!({"type": "string", "enum": ["a", "b"]}),
            json!({"type": "array", "items": {"type": "integer"}, "minItems": 1, "maxItems": 3}),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "hp": {"type": "integer", "minimum": 0},
                    "alive": {"type": "boolean", "default": true},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "system": {
                        "type": "object",
                        "properties": {"hp": {"type": "number"}},
                        "additionalProperties": false
                    }
                },
                "required": ["name"]
            }),
            json!({"type": "object", "additionalProperties": true}),
        ]
        .iter()
        .map(|s| SchemaNode::parse(s).unwrap())
        .collect()
    }

    /// Strategy for literal text without wildcard characters
    pub fn literal_strategy() -> impl Strategy<Value = String> {
        string_regex(r"[a-zA-Z0-9 .()+\[\]{}^$|\\-]{0,16}").unwrap()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn validation_is_total_and_consistent(
        value in strategies::json_value_strategy(),
        index in 0usize..10,
        coerce in any::<bool>(),
    ) {
        let schemas = strategies::schemas();
        let schema = &schemas[index % schemas.len()];
        let options = ValidateOptions { coerce_types: coerce };
        let result = validate(&value, schema, &options);
        prop_assert_eq!(result.valid, result.errors.is_empty());
        prop_assert_eq!(result.valid, result.normalized_data.is_some());
    }

    #[test]
    fn validation_is_deterministic(
        value in strategies::json_value_strategy(),
        index in 0usize..10,
    ) {
        let schemas = strategies::schemas();
        let schema = &schemas[index % schemas.len()];
        let first = validate(&value, schema, &ValidateOptions::default());
        let second = validate(&value, schema, &ValidateOptions::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn merge_never_touches_protected_paths(update in strategies::json_value_strategy()) {
        let existing = json!({
            "_id": "aaaaaaaaaaaaaaaa",
            "name": "Bilbo",
            "_stats": {"createdTime": 100, "modifiedTime": 100, "systemId": "dnd5e"}
        });
        let outcome = merge(&existing, &update, &ProtectedPaths::default());
        prop_assert_eq!(&outcome.document["_id"], &json!("aaaaaaaaaaaaaaaa"));
        prop_assert_eq!(&outcome.document["_stats"]["createdTime"], &json!(100));
        prop_assert_eq!(&outcome.document["_stats"]["systemId"], &json!("dnd5e"));
    }

    #[test]
    fn merge_applies_unprotected_fields(name in "[a-zA-Z ]{1,20}", hp in any::<i64>()) {
        let existing = json!({"_id": "aaaaaaaaaaaaaaaa", "name": "Bilbo", "system": {"ac": 12}});
        let update = json!({"name": name.clone(), "system": {"hp": hp}});
        let outcome = merge(&existing, &update, &ProtectedPaths::default());
        prop_assert_eq!(&outcome.document["name"], &json!(name));
        prop_assert_eq!(&outcome.document["system"], &json!({"ac": 12, "hp": hp}));
        prop_assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn literal_patterns_match_themselves(text in strategies::literal_strategy()) {
        let pattern = WildcardPattern::compile(&text).unwrap();
        prop_assert!(pattern.matches(&text));
        prop_assert!(pattern.matches(&text.to_uppercase()));
        let longer = format!("{}x", text);
        prop_assert!(!pattern.matches(&longer));
    }

    #[test]
    fn star_suffix_matches_any_extension(
        prefix in strategies::literal_strategy(),
        rest in any::<String>(),
    ) {
        let pattern = WildcardPattern::compile(&format!("{}*", prefix)).unwrap();
        let candidate = format!("{}{}", prefix, rest);
        prop_assert!(pattern.matches(&candidate));
    }

    #[test]
    fn keys_decode_to_their_parts(
        document_type in "[A-Z][a-zA-Z]{0,12}",
        id in "[a-zA-Z0-9]{16}",
    ) {
        let collection = collection_name_for(&document_type);
        let key = encode_key(&collection, &id);
        prop_assert_eq!(decode_key(&key), Some((collection.as_str(), id.as_str())));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn create_then_get_round_trips(
        name in "[a-zA-Z ]{1,20}",
        extra in strategies::json_value_strategy(),
    ) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let store = DocumentStore::new(MemoryBackend::new(), StoreSettings::default());
            let world = World::new("test-world", "/worlds/test-world", ["actors"]);
            let data = json!({"name": name, "system": {"extra": extra}});

            let created = store
                .create(&world, "Actor", data.clone(), &WriteMeta::default())
                .await
                .unwrap()
                .into_result()
                .unwrap();
            let id = created.id().unwrap().to_string();
            let fetched = store
                .get(&world, "Actor", &id)
                .await
                .unwrap()
                .into_result()
                .unwrap();

            prop_assert_eq!(&fetched, &created);
            prop_assert_eq!(fetched.get("name"), data.get("name"));
            prop_assert_eq!(fetched.get("system"), data.get("system"));
            Ok(())
        })?;
    }
}
