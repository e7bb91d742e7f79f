//! Uploaded files keyring.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::keyring::query::insert_pair;
use crate::keyring::snapshot::UploadedFile;
use crate::keyring::Keyring;
use crate::param::value::NULL;
use crate::param::{SourceKind, Value};

/// Exposes upload descriptors by field name.
#[derive(Debug)]
pub struct FilesKeyring {
    files: Vec<UploadedFile>,
    by_field: OnceCell<BTreeMap<String, Value>>,
}

impl FilesKeyring {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self {
            files,
            by_field: OnceCell::new(),
        }
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    fn descriptors(&self) -> &BTreeMap<String, Value> {
        self.by_field.get_or_init(|| {
            let mut map = BTreeMap::new();
            for file in &self.files {
                insert_pair(&mut map, &file.field, file.to_value());
            }
            map
        })
    }
}

impl Keyring for FilesKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Files
    }

    fn has_key(&self, name: &str) -> bool {
        self.descriptors().contains_key(name)
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        self.descriptors().get(name).unwrap_or(&NULL)
    }
}
