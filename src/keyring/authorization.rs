//! `Authorization` header keyring.
//!
//! The header is keyed by its scheme: `Bearer abc123` holds key `Bearer`
//! with value `abc123`. Headers that do not split into exactly two
//! space-separated tokens hold no key.

use std::cell::OnceCell;

use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

#[derive(Debug)]
pub struct AuthorizationKeyring {
    header: Option<String>,
    parsed: OnceCell<Option<(String, Value)>>,
}

impl AuthorizationKeyring {
    pub fn new(header: Option<String>) -> Self {
        Self {
            header,
            parsed: OnceCell::new(),
        }
    }

    fn credentials(&self) -> Option<&(String, Value)> {
        self.parsed
            .get_or_init(|| {
                let header = self.header.as_deref()?.trim();
                let mut tokens = header.split(' ');
                match (tokens.next(), tokens.next(), tokens.next()) {
                    (Some(scheme), Some(credential), None) => {
                        Some((scheme.to_string(), Value::from(credential)))
                    }
                    _ => None,
                }
            })
            .as_ref()
    }

    /// Parsed scheme, if the header was well formed.
    pub fn scheme(&self) -> Option<&str> {
        self.credentials().map(|(scheme, _)| scheme.as_str())
    }
}

impl Keyring for AuthorizationKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Authorization
    }

    fn has_key(&self, name: &str) -> bool {
        self.scheme() == Some(name)
    }

    /// The header carries a single credential; it is returned for any key.
    fn get_unchecked(&self, _name: &str) -> &Value {
        self.credentials().map(|(_, value)| value).unwrap_or(&NULL)
    }
}
