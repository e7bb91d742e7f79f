//! Form body keyring.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::keyring::query::{decode_pairs, insert_pair};
use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

/// Raw form input, by encoding.
#[derive(Debug)]
pub enum FormInput {
    /// URL-encoded body bytes.
    UrlEncoded(Vec<u8>),
    /// Text fields already extracted from a multipart body.
    Multipart(Vec<(String, String)>),
}

/// Keyring over a multipart or URL-encoded form body.
#[derive(Debug)]
pub struct FormKeyring {
    input: FormInput,
    parsed: OnceCell<BTreeMap<String, Value>>,
}

impl FormKeyring {
    pub fn url_encoded(body: impl Into<Vec<u8>>) -> Self {
        Self::new(FormInput::UrlEncoded(body.into()))
    }

    pub fn multipart(fields: Vec<(String, String)>) -> Self {
        Self::new(FormInput::Multipart(fields))
    }

    fn new(input: FormInput) -> Self {
        Self {
            input,
            parsed: OnceCell::new(),
        }
    }

    fn fields(&self) -> &BTreeMap<String, Value> {
        self.parsed.get_or_init(|| match &self.input {
            FormInput::UrlEncoded(body) => decode_pairs(body),
            FormInput::Multipart(fields) => {
                let mut map = BTreeMap::new();
                for (name, value) in fields {
                    insert_pair(&mut map, name, Value::from(value.as_str()));
                }
                map
            }
        })
    }
}

impl Keyring for FormKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Body
    }

    fn has_key(&self, name: &str) -> bool {
        self.fields().contains_key(name)
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        self.fields().get(name).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encoded_body() {
        let keyring = FormKeyring::url_encoded(b"name=Jane+Doe&tags[]=a&tags[]=".to_vec());
        assert_eq!(keyring.get_unchecked("name"), &Value::from("Jane Doe"));
        assert_eq!(keyring.get_unchecked("tags"), &Value::from(vec!["a", ""]));
        assert!(!keyring.has_key("missing"));
    }

    #[test]
    fn multipart_fields() {
        let keyring = FormKeyring::multipart(vec![
            ("title".into(), "Report".into()),
            ("labels[]".into(), "x".into()),
        ]);
        assert_eq!(keyring.get_unchecked("title"), &Value::from("Report"));
        assert_eq!(keyring.get_unchecked("labels"), &Value::from(vec!["x"]));
    }
}
