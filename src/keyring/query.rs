//! Query string keyring.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

/// Keyring over the URL query string.
#[derive(Debug)]
pub struct QueryKeyring {
    raw: String,
    parsed: OnceCell<BTreeMap<String, Value>>,
}

impl QueryKeyring {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: OnceCell::new(),
        }
    }

    fn pairs(&self) -> &BTreeMap<String, Value> {
        self.parsed.get_or_init(|| {
            let raw = self.raw.strip_prefix('?').unwrap_or(&self.raw);
            decode_pairs(raw.as_bytes())
        })
    }

    pub fn is_prepared(&self) -> bool {
        self.parsed.get().is_some()
    }
}

impl Keyring for QueryKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Query
    }

    fn has_key(&self, name: &str) -> bool {
        self.pairs().contains_key(name)
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        self.pairs().get(name).unwrap_or(&NULL)
    }
}

/// Decodes `application/x-www-form-urlencoded` pairs.
pub(crate) fn decode_pairs(input: &[u8]) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        if key.is_empty() {
            continue;
        }
        insert_pair(&mut map, &key, Value::String(value.into_owned()));
    }
    map
}

/// Inserts one decoded pair. `name[]` and `name[x]` keys collect into a list
/// under `name`; a repeated plain key keeps the last value.
///
/// Lists are positional: the text between the brackets is dropped, numeric or
/// not, so `a[5]=x` becomes `["x"]` and is read at run index 0.
pub(crate) fn insert_pair(map: &mut BTreeMap<String, Value>, key: &str, value: Value) {
    match key.find('[') {
        Some(open) if open > 0 && key.ends_with(']') => {
            let entry = map
                .entry(key[..open].to_string())
                .or_insert_with(|| Value::List(Vec::new()));
            match entry {
                Value::List(items) => items.push(value),
                other => *other = Value::List(vec![value]),
            }
        }
        _ => {
            map.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lazily_once() {
        let keyring = QueryKeyring::new("?a=1&b=hello%20world&flag");
        assert!(!keyring.is_prepared());

        assert!(keyring.has_key("a"));
        assert!(keyring.is_prepared());
        assert_eq!(keyring.get_unchecked("b"), &Value::from("hello world"));
        assert_eq!(keyring.get_unchecked("flag"), &Value::from(""));
        assert!(!keyring.has_key("c"));
    }

    #[test]
    fn bracket_keys_collect_lists() {
        let keyring = QueryKeyring::new("ids[]=1&ids[]=2&ids[x]=3&last=a&last=b");
        assert_eq!(keyring.get_unchecked("ids"), &Value::from(vec!["1", "2", "3"]));
        assert_eq!(keyring.get_unchecked("last"), &Value::from("b"));
    }

    #[test]
    fn explicit_indices_are_positional() {
        let keyring = QueryKeyring::new("a[5]=x&a[2]=y");
        assert_eq!(keyring.get_unchecked("a"), &Value::from(vec!["x", "y"]));
    }

    #[test]
    fn checked_lookup() {
        let keyring = QueryKeyring::new("a=1");
        assert_eq!(keyring.get_checked("a").unwrap(), &Value::from("1"));
        let err = keyring.get_checked("missing").unwrap_err();
        assert_eq!(err.kind(), "NotFoundError");
        assert_eq!(keyring.get_unchecked("missing"), &Value::Null);
    }
}
