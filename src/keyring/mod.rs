//! Keyrings: named-value lookup within one channel of a request.
//!
//! # Data Flow
//! ```text
//! RequestSnapshot (query, content type, authorization, body, uploads)
//!     → sources.rs (select active keyrings by content kind)
//!     → query.rs / form.rs / json.rs / authorization.rs / files.rs
//!         (lazy one-time parse on first lookup)
//!     → has_key / get_checked / get_unchecked
//!
//! RequestContext bag
//!     → context.rs (no preparation)
//! ```
//!
//! # Design Decisions
//! - Closed set of keyrings behind one trait; no reflection
//! - Keyrings are per request and `!Sync`; parse results live in `OnceCell`
//! - Snapshots are injected, nothing reads process state

pub mod authorization;
pub mod context;
pub mod files;
pub mod form;
pub mod json;
pub mod query;
pub mod snapshot;
pub mod sources;

pub use authorization::AuthorizationKeyring;
pub use context::ContextKeyring;
pub use files::FilesKeyring;
pub use form::FormKeyring;
pub use json::JsonKeyring;
pub use query::QueryKeyring;
pub use snapshot::{ContentKind, RequestSnapshot, UploadedFile};
pub use sources::{BodyKeyring, RequestSources};

use crate::error::{PathError, PathResult};
use crate::param::{SourceKind, Value};

/// Lookup of named values within one request channel.
pub trait Keyring: std::fmt::Debug {
    /// Channel this keyring reads.
    fn kind(&self) -> SourceKind;

    /// Returns true if the channel holds `name`.
    fn has_key(&self, name: &str) -> bool;

    /// Value of `name`, or `Null` if absent. Call [`Keyring::has_key`] first.
    fn get_unchecked(&self, name: &str) -> &Value;

    /// Value of `name`, failing if the channel does not hold it.
    fn get_checked(&self, name: &str) -> PathResult<&Value> {
        if self.has_key(name) {
            Ok(self.get_unchecked(name))
        } else {
            Err(PathError::NotFound {
                channel: self.kind(),
                key: name.to_string(),
            })
        }
    }
}
