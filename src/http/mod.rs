//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, RequestSnapshot extraction)
//!     → routing::Dispatcher (synchronous, all passes)
//!     → response.rs (DispatchReport or ErrorReport as JSON)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use request::{extract_snapshot, MakeRequestUuid, X_REQUEST_ID};
pub use response::{DispatchReport, ErrorReport};
pub use routes::default_paths;
pub use server::{spawn_settings_reload, AppState, HttpServer};
