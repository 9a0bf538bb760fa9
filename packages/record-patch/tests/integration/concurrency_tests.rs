//! One updater shared across threads.

use std::sync::Arc;
use std::thread;

use ntest::timeout;
use serde_json::json;

use record_patch::{make_updater, SchemaRegistry, Updater};

use super::fixtures::{person_named, Person};

#[timeout(5000)]
#[test]
fn test_shared_updater_across_threads() {
    let updater = Arc::new(Updater::new(&Person::default()).unwrap());
    let existing = Arc::new(person_named("Original"));

    let handles: Vec<_> = (0..8i64)
        .map(|worker| {
            let updater = Arc::clone(&updater);
            let existing = Arc::clone(&existing);
            thread::spawn(move || {
                for round in 0..100i64 {
                    let age = worker * 1000 + round;
                    let result = updater.apply(existing.as_ref(), &json!({"age": age})).unwrap();
                    assert_eq!(result.age, age);
                    assert_eq!(result.name, "Original");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(existing.age, 0);
}

#[timeout(5000)]
#[test]
fn test_cloned_callable_across_threads() {
    let update = make_updater(&Person::default()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let update = update.clone();
            thread::spawn(move || {
                let name = format!("worker-{}", worker);
                let values = json!({ "name": name });
                update(&Person::default(), &values).unwrap()
            })
        })
        .collect();

    let mut names: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["worker-0", "worker-1", "worker-2", "worker-3"]);
}

#[timeout(5000)]
#[test]
fn test_concurrent_registration_yields_one_schema() {
    let registry = Arc::new(SchemaRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get_or_register(&Person::default()).unwrap())
        })
        .collect();

    let schemas: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    assert_eq!(registry.len(), 1);
    let registered = registry.get::<Person>().unwrap();
    assert!(schemas.iter().all(|schema| Arc::ptr_eq(schema, &registered)));
}
