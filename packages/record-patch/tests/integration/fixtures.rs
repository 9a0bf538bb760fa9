//! Record types shared by the integration tests.

use std::collections::HashMap;

use record_patch::patch_record;

patch_record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: i64,
        pub emails: Vec<String>,
        pub date_of_birth: String => "dob",
        pub bff: Option<Box<Person>>,
        pub friends: Vec<Person>,
        pub extra: HashMap<String, String>,
    }
}

patch_record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct AnotherPerson {
        pub name: String,
        pub age: i64,
        pub emails: Vec<String>,
        pub other: HashMap<String, String>,
    }
}

patch_record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Account {
        pub owner: String,
        pub balance: f64,
        pub limit: Option<u32>,
        pub password_hash: String => skip,
        internal_revision: u64,
    }
}

impl Account {
    pub fn with_revision(revision: u64) -> Self {
        Self {
            internal_revision: revision,
            ..Default::default()
        }
    }

    pub fn revision(&self) -> u64 {
        self.internal_revision
    }
}

pub fn person_named(name: &str) -> Person {
    Person {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn bag(value: serde_json::Value) -> HashMap<String, serde_json::Value> {
    serde_json::from_value(value).unwrap()
}
