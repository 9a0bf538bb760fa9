//! Updater behavior over typed records, JSON documents and foreign records.

use std::collections::HashMap;

use anyhow::Result;
use serde_json::json;

use record_patch::{
    make_updater, CoercionPolicy, FieldOutcome, PatchConfig, PatchError, SkipReason, Updater,
};

use super::fixtures::{bag, person_named, Account, AnotherPerson, Person};

#[test]
fn test_person_all_normal_values() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let values = bag(json!({
        "name": "Bob",
        "age": 25,
        "emails": ["bob@thebuilder.us", "bobby@notan.org"],
        "dob": "1999-02-10",
        "bff": {"name": "Jane"},
        "friends": [{"name": "John"}, {"name": "Doe"}],
        "extra": {"gender": "Robot"},
    }));

    let result = update(&person_named("Bobs"), &values)?;

    assert_eq!(
        result,
        Person {
            name: "Bob".to_string(),
            age: 25,
            emails: vec!["bob@thebuilder.us".to_string(), "bobby@notan.org".to_string()],
            date_of_birth: "1999-02-10".to_string(),
            bff: Some(Box::new(person_named("Jane"))),
            friends: vec![person_named("John"), person_named("Doe")],
            extra: HashMap::from([("gender".to_string(), "Robot".to_string())]),
        }
    );
    Ok(())
}

#[test]
fn test_person_unknown_values_are_ignored() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let values = bag(json!({
        "name": "Bob",
        "age": 25,
        "emails": ["bob@thebuilder.us", "bobby@notan.org"],
        "extra": {"gender": "Class"},
        "invalid": true,
    }));

    let result = update(&Person::default(), &values)?;

    assert_eq!(
        result,
        Person {
            name: "Bob".to_string(),
            age: 25,
            emails: vec!["bob@thebuilder.us".to_string(), "bobby@notan.org".to_string()],
            extra: HashMap::from([("gender".to_string(), "Class".to_string())]),
            ..Default::default()
        }
    );
    Ok(())
}

#[test]
fn test_person_missing_values_keep_existing() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let existing = Person {
        emails: vec!["bobby@oldemail.us".to_string()],
        ..Default::default()
    };
    let values = bag(json!({"name": "Bob", "age": 25, "extra": {"gender": "less"}}));

    let result = update(&existing, &values)?;

    assert_eq!(result.emails, vec!["bobby@oldemail.us".to_string()]);
    assert_eq!(result.name, "Bob");
    assert_eq!(result.extra.get("gender").map(String::as_str), Some("less"));
    Ok(())
}

#[test]
fn test_person_override_values() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let existing = Person {
        emails: vec!["bobby@oldemail.us".to_string()],
        ..Default::default()
    };
    let values = bag(json!({"emails": ["no-reply@lebobby.fr"], "extra": {"gender": "fox"}}));

    let result = update(&existing, &values)?;

    assert_eq!(result.emails, vec!["no-reply@lebobby.fr".to_string()]);
    assert_eq!(existing.emails, vec!["bobby@oldemail.us".to_string()]);
    Ok(())
}

#[test]
fn test_person_field_type_mismatch_falls_back() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let existing = Person {
        emails: vec!["bobby@oldemail.us".to_string()],
        ..Default::default()
    };
    let values = bag(json!({"name": "Bob", "age": "25", "emails": "job@test.he"}));

    let result = update(&existing, &values)?;

    assert_eq!(
        result,
        Person {
            name: "Bob".to_string(),
            emails: vec!["bobby@oldemail.us".to_string()],
            ..Default::default()
        }
    );
    Ok(())
}

#[test]
fn test_existing_of_another_record_type() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let existing = AnotherPerson {
        emails: vec!["bobby@oldemail.us".to_string()],
        other: HashMap::from([("k".to_string(), "v".to_string())]),
        ..Default::default()
    };
    let values = bag(json!({"name": "Bob", "age": 25, "emails": ["somebody@nobody.nb"]}));

    let result = update(&existing, &values)?;

    assert_eq!(
        result,
        Person {
            name: "Bob".to_string(),
            age: 25,
            emails: vec!["somebody@nobody.nb".to_string()],
            ..Default::default()
        }
    );
    Ok(())
}

#[test]
fn test_foreign_record_supplies_shared_fields() -> Result<()> {
    let update = make_updater(&Person::default())?;
    let existing = AnotherPerson {
        name: "Ann".to_string(),
        age: 40,
        ..Default::default()
    };

    let result = update(&existing, &bag(json!({"dob": "1984-01-01"})))?;

    assert_eq!(result.name, "Ann");
    assert_eq!(result.age, 40);
    assert_eq!(result.date_of_birth, "1984-01-01");
    Ok(())
}

#[test]
fn test_json_document_as_existing() -> Result<()> {
    let updater = Updater::new(&Person::default())?;
    let stored = json!({
        "name": "Stored",
        "dob": "1970-01-01",
        "friends": [{"name": "Old"}],
    });

    let result = updater.apply(&stored, &json!({"age": 30}))?;

    assert_eq!(result.name, "Stored");
    assert_eq!(result.age, 30);
    assert_eq!(result.date_of_birth, "1970-01-01");
    assert_eq!(result.friends, vec![person_named("Old")]);
    Ok(())
}

#[test]
fn test_non_record_existing_is_rejected() -> Result<()> {
    let updater = Updater::new(&Person::default())?;

    for existing in [json!(null), json!(7), json!("Bob"), json!(["Bob"])] {
        let err = updater.apply(&existing, &json!({"name": "Bob"})).unwrap_err();
        assert!(matches!(err, PatchError::InvalidRecord { expected: "Person", .. }));
    }
    Ok(())
}

#[test]
fn test_null_and_empty_values() -> Result<()> {
    let updater = Updater::new(&Person::default())?;
    let existing = Person {
        bff: Some(Box::new(person_named("Jane"))),
        emails: vec!["keep@me".to_string()],
        ..Default::default()
    };

    let kept = updater.apply(&existing, &json!({"bff": null}))?;
    assert_eq!(kept.bff, existing.bff);

    let cleared = updater.apply(&existing, &json!({"emails": []}))?;
    assert!(cleared.emails.is_empty());
    Ok(())
}

#[test]
fn test_rejected_nested_record_keeps_existing() -> Result<()> {
    let updater = Updater::new(&Person::default())?;
    let existing = Person {
        friends: vec![person_named("John")],
        ..Default::default()
    };

    let result = updater.apply(&existing, &json!({"friends": [{"name": "Jane"}, {"age": "old"}]}))?;

    assert_eq!(result.friends, vec![person_named("John")]);
    Ok(())
}

#[test]
fn test_excluded_and_private_fields_survive() -> Result<()> {
    let updater = Updater::new(&Account::default())?;
    assert_eq!(updater.schema().external_names().collect::<Vec<_>>(), vec!["owner", "balance", "limit"]);

    let mut existing = Account::with_revision(9);
    existing.password_hash = "hash".to_string();

    let result = updater.apply(
        &existing,
        &json!({"password_hash": "overwritten", "internal_revision": 0, "limit": 500}),
    )?;

    assert_eq!(result.password_hash, "hash");
    assert_eq!(result.revision(), 9);
    assert_eq!(result.limit, Some(500));
    Ok(())
}

#[test]
fn test_strict_coercion_rejects_integer_for_float() -> Result<()> {
    let strict = Updater::with_config(
        &Account::default(),
        PatchConfig {
            coercion: CoercionPolicy::Strict,
            ..Default::default()
        },
    )?;
    let widening = Updater::new(&Account::default())?;
    let mut existing = Account::default();
    existing.balance = 1.5;

    assert_eq!(strict.apply(&existing, &json!({"balance": 10}))?.balance, 1.5);
    assert_eq!(widening.apply(&existing, &json!({"balance": 10}))?.balance, 10.0);
    assert_eq!(strict.apply(&existing, &json!({"balance": 2.25}))?.balance, 2.25);
    Ok(())
}

#[test]
fn test_report_explains_fallbacks() -> Result<()> {
    let updater = Updater::new(&Person::default())?;
    let existing = Person {
        emails: vec!["bobby@oldemail.us".to_string()],
        ..Default::default()
    };

    let (result, report) =
        updater.apply_with_report(&existing, &json!({"age": "25", "emails": "job@test.he", "nmae": "Bob"}))?;

    assert_eq!(result.age, 0);
    assert_eq!(report.rejected().collect::<Vec<_>>(), vec!["age", "emails"]);
    assert_eq!(report.unknown_keys().to_vec(), vec!["nmae".to_string()]);
    assert_eq!(
        report.outcome("name"),
        Some(FieldOutcome::KeptExisting {
            reason: SkipReason::Absent
        })
    );
    assert!(!report.is_clean());
    Ok(())
}

#[test]
fn test_invalid_sample_fails_at_construction() {
    let err = Updater::<Person>::from_schema(
        std::sync::Arc::new(record_patch::build_schema(&Account::default(), &PatchConfig::default()).unwrap()),
        PatchConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PatchError::SchemaMismatch { .. }));

    let err = record_patch::build_schema(&json!({"name": "Bob"}), &PatchConfig::default()).unwrap_err();
    assert!(matches!(err, PatchError::InvalidInstance { .. }));
}
