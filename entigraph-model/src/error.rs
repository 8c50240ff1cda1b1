//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while defining types or touching entity state.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity type already defined: {0}")]
    DuplicateType(String),

    #[error("property '{property}' declared twice on '{type_name}'")]
    DuplicateProperty { type_name: String, property: String },

    #[error("unknown property '{property}' on '{type_name}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("identifier '{property}' is not a property of '{type_name}'")]
    UnknownIdentifier { type_name: String, property: String },
}

/// A string could not be converted by a [`ValueFormat`](crate::ValueFormat).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("format '{format}' cannot convert {text:?}: {reason}")]
pub struct FormatError {
    pub format: String,
    pub text: String,
    pub reason: String,
}

impl FormatError {
    pub fn new(format: impl Into<String>, text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            text: text.into(),
            reason: reason.into(),
        }
    }
}
