//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and HTTP server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the HTTP spans
//! - Metrics are cheap (atomic increments)
//! - Skipped paths log at debug level only

pub mod logging;
pub mod metrics;
