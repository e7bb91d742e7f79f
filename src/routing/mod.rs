//! Routing subsystem: parameter resolution, path matching and dispatch.
//!
//! # Data Flow
//! ```text
//! Incoming Request (RequestSources + optional RequestContext)
//!     → router.rs (Dispatcher: pass loop over the PathTable)
//!     → resolver.rs (first keyring holding each parameter)
//!     → matcher.rs (validate, coerce, compare; bind Arguments)
//!     → PathHandler (may fill the context bag, may request another pass)
//!     → Return: final RequestContext or PathError
//!
//! Table Construction (at startup):
//!     PathDefinition::new + param(builder)...
//!     → seal every parameter
//!     → PathTable in registration order
//!     → Arc, shared by all requests
//! ```
//!
//! # Design Decisions
//! - Paths declared at startup, immutable at runtime
//! - Every matching path runs, in registration order
//! - Deterministic: same input always runs the same handlers
//! - Query strings can be rebuilt from a path's parameters (query.rs)

pub mod context;
pub mod matcher;
pub mod query;
pub mod resolver;
pub mod router;

pub use context::{HandledPath, RequestContext};
pub use matcher::{Argument, Arguments, PathDefinition, PathHandler};
pub use resolver::{Resolved, Resolver};
pub use router::{DispatchSettings, Dispatcher, PathTable};
