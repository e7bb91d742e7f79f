//! HTTP parameter specification and resolution.
//!
//! Paths declare typed parameters that may be read from the query string,
//! the `Authorization` header, a form or JSON body, uploaded files, or a
//! per-dispatch context bag. The dispatcher runs every path whose parameters
//! are satisfied, in registration order, over as many passes as handlers
//! request.

pub mod config;
pub mod error;
pub mod http;
pub mod keyring;
pub mod lifecycle;
pub mod observability;
pub mod param;
pub mod routing;

pub use config::AppConfig;
pub use error::{error_chain, BoxError, ErrorDescriptor, PathError, PathResult};
pub use http::HttpServer;
pub use keyring::{RequestSnapshot, RequestSources, UploadedFile};
pub use lifecycle::Shutdown;
pub use param::{ComparisonType, ParameterSpec, SourceKind, SourceSet, Value};
pub use routing::{Arguments, DispatchSettings, Dispatcher, PathDefinition, PathTable, RequestContext};
