//! Parameter model.
//!
//! # Data Flow
//! ```text
//! Handler setup:
//!     ParameterSpec::named / ::expecting
//!     → ParameterBuilder (type, sources, optional, null-tolerant)
//!     → seal()
//!     → ParameterSpec (immutable, shared by every request)
//!
//! Per request:
//!     raw Value from a keyring
//!     → is_valid (comparison type predicate)
//!     → try_convert (coercion)
//!     → matches (strict comparison, value+type mode only)
//! ```
//!
//! # Design Decisions
//! - Builder and sealed spec are separate types; post-seal mutation does not compile
//! - Source sets are bit flags over a closed set of channels
//! - All request data is normalized into `Value` before validation

pub mod source;
pub mod spec;
pub mod types;
pub mod value;

pub use source::{SourceKind, SourceSet};
pub use spec::{ParameterBuilder, ParameterSpec};
pub use types::{ComparisonMode, ComparisonType};
pub use value::{Value, ValueKind};
