//! Immutable request input handed to the keyrings.

use std::collections::BTreeMap;

use crate::param::Value;

/// Body encoding declared by the request's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `multipart/form-data`
    Multipart,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// `application/json`
    Json,
    /// Anything else, or no content type at all.
    Other,
}

impl ContentKind {
    /// Detects the body encoding by substring, form types first.
    pub fn detect(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.contains("multipart/form-data") => ContentKind::Multipart,
            Some(ct) if ct.contains("application/x-www-form-urlencoded") => ContentKind::UrlEncoded,
            Some(ct) if ct.contains("application/json") => ContentKind::Json,
            _ => ContentKind::Other,
        }
    }

    pub fn is_form(self) -> bool {
        matches!(self, ContentKind::Multipart | ContentKind::UrlEncoded)
    }

    /// Whether a body keyring exists for this content kind.
    pub fn has_body(self) -> bool {
        self != ContentKind::Other
    }
}

/// Descriptor of an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Form field the file was sent under.
    pub field: String,
    /// File name supplied by the client.
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
    /// Where the upload was stored, if it was stored.
    pub tmp_name: Option<String>,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, size: u64) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            size,
            tmp_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Map view exposed through the files keyring.
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from(self.file_name.as_str()));
        map.insert("type".to_string(), Value::from(self.content_type.clone()));
        map.insert("size".to_string(), Value::Int(self.size.min(i64::MAX as u64) as i64));
        map.insert("tmp_name".to_string(), Value::from(self.tmp_name.clone()));
        Value::Map(map)
    }
}

/// Everything the keyrings may read about one request.
///
/// Keyrings never touch process state; tests build snapshots directly.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    /// Raw query string, with or without the leading `?`.
    pub query: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
    /// Text fields of a multipart body, extracted at the HTTP boundary.
    pub form_fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl RequestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_fields.push((name.into(), value.into()));
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn content_kind(&self) -> ContentKind {
        ContentKind::detect(self.content_type.as_deref())
    }
}
