//! Error types for parameter specification and dispatch.
//!
//! Matching failures are not errors: a path whose parameters are not
//! satisfied is skipped silently. [`PathError`] covers misuse of the API and
//! failures raised by handlers.

use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;

use crate::param::{ComparisonMode, ComparisonType, SourceKind, ValueKind};

/// Error type handlers may return.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;

#[derive(Debug, Error)]
pub enum PathError {
    /// A parameter could not be sealed.
    #[error("parameter '{name}' cannot be sealed: {reason}")]
    SealedState { name: String, reason: String },

    /// Unsupported comparison type name.
    #[error("unknown comparison type '{0}', expected one of bool/boolean/int/integer/float/string/array/list")]
    UnknownType(String),

    /// Checked lookup of a key the keyring does not hold.
    #[error("key '{key}' does not exist in the {channel} keyring")]
    NotFound { channel: SourceKind, key: String },

    /// Explicitly requested conversion failed.
    #[error("value of parameter '{name}' ({kind}) is not convertible to {target}")]
    Conversion {
        name: String,
        kind: ValueKind,
        target: ComparisonType,
    },

    /// Operation not available in the parameter's comparison mode.
    #[error("parameter '{name}' is compared in {mode:?} mode and has no comparison value")]
    WrongMode { name: String, mode: ComparisonMode },

    /// Two parameters of one path share a name.
    #[error("path '{path}' declares parameter '{name}' more than once")]
    DuplicateParameter { path: String, name: String },

    /// The configured pass limit was exceeded.
    #[error("dispatch did not settle within {0} passes")]
    PassLimit(u32),

    /// A handler failed.
    #[error("an error occurred in path '{path}'")]
    Handler {
        path: String,
        #[source]
        cause: BoxError,
    },
}

impl PathError {
    /// Stable type tag used in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PathError::SealedState { .. } => "SealedStateError",
            PathError::UnknownType(_) => "UnknownTypeError",
            PathError::NotFound { .. } => "NotFoundError",
            PathError::Conversion { .. } => "ConversionError",
            PathError::WrongMode { .. } => "WrongModeError",
            PathError::DuplicateParameter { .. } => "DuplicateParameterError",
            PathError::PassLimit(_) => "PassLimitError",
            PathError::Handler { .. } => "HandlerError",
        }
    }

    /// Name of the path that raised the error, for handler failures.
    pub fn path(&self) -> Option<&str> {
        match self {
            PathError::Handler { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// One entry of an error chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Describes a single error without its causes.
    pub fn describe(error: &(dyn StdError + 'static)) -> Self {
        let kind = error
            .downcast_ref::<PathError>()
            .map(PathError::kind)
            .unwrap_or("Error");
        Self::new(kind, error.to_string())
    }
}

/// Builds the causal chain of `error`, innermost cause first.
///
/// `describe` maps each error to a descriptor; [`ErrorDescriptor::describe`]
/// is used when none is given.
pub fn error_chain(
    error: &(dyn StdError + 'static),
    describe: Option<&dyn Fn(&(dyn StdError + 'static)) -> ErrorDescriptor>,
) -> Vec<ErrorDescriptor> {
    let mut chain = Vec::new();
    let mut current = Some(error);

    while let Some(err) = current {
        chain.push(match describe {
            Some(f) => f(err),
            None => ErrorDescriptor::describe(err),
        });
        current = err.source();
    }

    chain.reverse();
    chain
}
