//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Convert an HTTP request into a [`RequestSnapshot`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The whole body is read before dispatch; dispatch itself never awaits
//! - Multipart text fields and file descriptors are extracted here

use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::keyring::{ContentKind, RequestSnapshot, UploadedFile};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(X_REQUEST_ID)
}

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of a request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    header_str(headers, X_REQUEST_ID).unwrap_or_else(|| "unknown".to_string())
}

fn header_str(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Failure to read a request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid multipart request: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl ExtractError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::Body(_) => StatusCode::BAD_REQUEST,
            ExtractError::MultipartRejection(e) => e.status(),
            ExtractError::Multipart(e) => e.status(),
        }
    }
}

/// Reads everything the keyrings need from `request`.
pub async fn extract_snapshot(
    request: Request<Body>,
    max_body_size: usize,
) -> Result<RequestSnapshot, ExtractError> {
    let headers = request.headers();
    let mut snapshot = RequestSnapshot {
        query: request.uri().query().unwrap_or_default().to_string(),
        content_type: header_str(headers, CONTENT_TYPE),
        authorization: header_str(headers, AUTHORIZATION),
        ..RequestSnapshot::default()
    };

    if snapshot.content_kind() == ContentKind::Multipart {
        let mut multipart = Multipart::from_request(request, &()).await?;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    let mut file = UploadedFile::new(name, file_name, bytes.len() as u64);
                    if let Some(content_type) = content_type {
                        file = file.with_content_type(content_type);
                    }
                    snapshot.files.push(file);
                }
                None => {
                    let text = field.text().await?;
                    snapshot.form_fields.push((name, text));
                }
            }
        }
    } else {
        let body = axum::body::to_bytes(request.into_body(), max_body_size).await?;
        snapshot.body = body.to_vec();
    }

    tracing::trace!(
        content_kind = ?snapshot.content_kind(),
        body_len = snapshot.body.len(),
        fields = snapshot.form_fields.len(),
        files = snapshot.files.len(),
        "Request snapshot extracted"
    );
    Ok(snapshot)
}
