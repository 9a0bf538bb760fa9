//! Shared schema registry used by several updaters.

use std::sync::Arc;

use serde_json::json;

use record_patch::{PatchConfig, PatchError, SchemaRegistry, Updater};

use super::fixtures::{Account, Person};

#[test]
fn test_updaters_share_registered_schema() {
    let registry = SchemaRegistry::new();

    let first = Updater::from_registry(&registry, &Person::default()).unwrap();
    let second = Updater::from_registry(&registry, &Person::default()).unwrap();
    let accounts = Updater::from_registry(&registry, &Account::default()).unwrap();

    assert!(std::ptr::eq(first.schema(), second.schema()));
    assert_eq!(registry.type_names(), vec!["Account", "Person"]);
    assert_eq!(accounts.schema().len(), 3);
}

#[test]
fn test_registry_config_reaches_updater() {
    let config = PatchConfig {
        trace_fallbacks: true,
        ..PatchConfig::legacy()
    };
    let registry = SchemaRegistry::with_config(config);

    let updater = Updater::from_registry(&registry, &Person::default()).unwrap();
    assert_eq!(updater.config(), &config);

    let result = updater
        .apply(&Person::default(), &json!({"name": "Bob", "dob": "2000-01-01"}))
        .unwrap();
    assert_eq!(result.name, "Bob");
    assert_eq!(result.date_of_birth, "2000-01-01");
}

#[test]
fn test_from_schema_rejects_other_record_type() {
    let registry = SchemaRegistry::new();
    let schema = registry.register(&Account::default()).unwrap();

    let err = Updater::<Person>::from_schema(Arc::clone(&schema), PatchConfig::default()).unwrap_err();
    assert!(matches!(err, PatchError::SchemaMismatch { schema: "Account", .. }));

    let updater = Updater::<Account>::from_schema(schema, PatchConfig::default()).unwrap();
    assert_eq!(updater.schema().type_name(), "Account");
}

#[test]
fn test_removed_schema_stays_valid_for_holders() {
    let registry = SchemaRegistry::new();
    let updater = Updater::from_registry(&registry, &Person::default()).unwrap();

    assert!(registry.remove::<Person>());
    assert!(registry.is_empty());

    let result = updater.apply(&Person::default(), &json!({"age": 3})).unwrap();
    assert_eq!(result.age, 3);
}
