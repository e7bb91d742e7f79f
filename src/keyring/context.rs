//! Context bag keyring.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

/// Key/value bag shared by the handlers of one dispatch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ContextKeyring {
    values: BTreeMap<String, Value>,
}

impl ContextKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl Keyring for ContextKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Context
    }

    fn has_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut bag = ContextKeyring::new();
        assert!(!bag.has_key("user"));

        bag.insert("user", "jane");
        assert!(bag.has_key("user"));
        assert_eq!(bag.get_checked("user").unwrap(), &Value::from("jane"));

        assert_eq!(bag.insert("user", "joe"), Some(Value::from("jane")));
        assert_eq!(bag.remove("user"), Some(Value::from("joe")));
        assert!(bag.is_empty());
    }
}
