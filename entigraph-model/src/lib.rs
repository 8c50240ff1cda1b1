//! Entity model boundary for entigraph.
//!
//! Defines the metadata and instance types the serializer consumes:
//! - [`EntityType`]: a domain type: full name, base type, declared properties,
//!   identifier property and the pool of live instances keyed by identifier
//! - [`PropertyDescriptor`]: one named, typed attribute of an [`EntityType`]
//! - [`Entity`]: an instance of an [`EntityType`] holding [`Value`]s
//! - [`ValueFormat`]: string-to-value conversion for scalar properties
//! - [`Model`]: the registry of types by full name
//!
//! This crate deliberately knows nothing about serialization. It is the
//! contract between application code and `entigraph-serializer`.

mod entity;
mod error;
mod format;
mod model;
mod schema;
mod value;

pub use entity::Entity;
pub use error::{FormatError, ModelError, ModelResult};
pub use format::{BooleanFormat, DateFormat, NumberFormat, ValueFormat, default_format};
pub use model::Model;
pub use schema::{Ancestors, EntityType, EntityTypeBuilder, PropertyDescriptor, PropertyType, ScalarKind};
pub use value::Value;
