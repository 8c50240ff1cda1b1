//! Error types for the serializer.

use entigraph_model::{FormatError, ModelError};
use thiserror::Error;

/// Result type for serializer operations.
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Errors that can occur while serializing or deserializing entities.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Two pairs produced the same output key. Injectors and converters must
    /// agree on distinct keys; this is an authoring error, never recovered.
    #[error("duplicate key '{key}' while serializing '{type_name}'")]
    DuplicateKey { type_name: String, key: String },

    /// An entity was reached again while it was still being serialized.
    #[error("reference cycle through '{type_name}' ({id}) while serializing")]
    Cycle { type_name: String, id: String },

    /// An entity property names a type the model does not define.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// Entity data was expected to be a JSON object.
    #[error("data for '{type_name}' is not an object")]
    NotAnObject { type_name: String },

    /// A converter plugin reported a failure.
    #[error("converter '{converter}' failed: {message}")]
    Converter { converter: String, message: String },

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Config(#[from] toml::de::Error),
}
