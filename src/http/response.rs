//! Response handling and transformation.
//!
//! # Responsibilities
//! - Report the outcome of a dispatch as JSON
//! - Map dispatch and extraction failures to HTTP status codes
//!
//! # Design Decisions
//! - 200 when at least one handler ran, 404 when no path matched
//! - Handler failures report the full error chain with 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ErrorDescriptor;
use crate::keyring::ContextKeyring;
use crate::routing::{HandledPath, RequestContext};

/// Body of a successful dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub request_id: String,
    pub passes: u32,
    pub handled: Vec<HandledPath>,
    pub context: ContextKeyring,
}

impl DispatchReport {
    pub fn from_context(request_id: impl Into<String>, ctx: &RequestContext) -> Self {
        Self {
            request_id: request_id.into(),
            passes: ctx.passes(),
            handled: ctx.handled().to_vec(),
            context: ctx.bag().clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.handled.is_empty() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        }
    }
}

impl IntoResponse for DispatchReport {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Body of a failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub request_id: String,
    pub errors: Vec<ErrorDescriptor>,
    #[serde(skip)]
    status: StatusCode,
}

impl ErrorReport {
    pub fn new(request_id: impl Into<String>, status: StatusCode, errors: Vec<ErrorDescriptor>) -> Self {
        Self {
            request_id: request_id.into(),
            errors,
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
