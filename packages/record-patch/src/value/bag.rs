use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

/// Incoming patch payload: values keyed by external field name.
///
/// An absent key and a `null` value are equivalent. Bags are only read.
pub trait ValuesBag {
    /// Looks up the value supplied for an external name.
    fn lookup(&self, key: &str) -> Option<&Value>;

    /// Iterates over every supplied key.
    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Returns the value for `key` unless it is absent or `null`.
    fn supplied(&self, key: &str) -> Option<&Value> {
        self.lookup(key).filter(|value| !value.is_null())
    }
}

impl ValuesBag for HashMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(HashMap::keys(self).map(String::as_str))
    }
}

impl ValuesBag for BTreeMap<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(BTreeMap::keys(self).map(String::as_str))
    }
}

impl ValuesBag for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(Map::keys(self).map(String::as_str))
    }
}

/// A JSON document used as a bag; anything but an object is an empty bag.
impl ValuesBag for Value {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self.as_object() {
            Some(object) => Box::new(object.keys().map(String::as_str)),
            None => Box::new(std::iter::empty()),
        }
    }
}

impl<B: ValuesBag + ?Sized> ValuesBag for &B {
    fn lookup(&self, key: &str) -> Option<&Value> {
        (**self).lookup(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        (**self).keys()
    }
}
