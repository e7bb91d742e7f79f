//! JSON body keyring.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

/// Keyring over a JSON body. Only top-level object properties are keys.
#[derive(Debug)]
pub struct JsonKeyring {
    body: Vec<u8>,
    parsed: OnceCell<Option<BTreeMap<String, Value>>>,
}

impl JsonKeyring {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            parsed: OnceCell::new(),
        }
    }

    fn object(&self) -> Option<&BTreeMap<String, Value>> {
        self.parsed
            .get_or_init(|| match serde_json::from_slice::<serde_json::Value>(&self.body) {
                Ok(serde_json::Value::Object(map)) => Some(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect(),
                ),
                Ok(other) => {
                    tracing::debug!(kind = json_kind(&other), "JSON body is not an object");
                    None
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to decode JSON body");
                    None
                }
            })
            .as_ref()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Keyring for JsonKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Body
    }

    fn has_key(&self, name: &str) -> bool {
        self.object().is_some_and(|map| map.contains_key(name))
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        self.object()
            .and_then(|map| map.get(name))
            .unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_properties() {
        let keyring = JsonKeyring::new(br#"{"a":1,"b":null,"c":{"d":true}}"#.to_vec());
        assert!(keyring.has_key("a"));
        assert_eq!(keyring.get_unchecked("a"), &Value::Int(1));
        // explicit null still counts as present
        assert!(keyring.has_key("b"));
        assert!(!keyring.has_key("d"));
    }

    #[test]
    fn non_objects_expose_nothing() {
        assert!(!JsonKeyring::new(b"[1,2]".to_vec()).has_key("0"));
        assert!(!JsonKeyring::new(b"not json".to_vec()).has_key("a"));
        assert!(!JsonKeyring::new(Vec::new()).has_key("a"));
    }
}
