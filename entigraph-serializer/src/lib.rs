//! Extensible serializer for entigraph entity graphs.
//!
//! Turns [`Entity`](entigraph_model::Entity) instances into plain JSON
//! objects and rebuilds entities from such objects, preserving identity.
//!
//! # Extension points
//!
//! - **Converters** ([`PropertyConverter`]): intercept, transform or suppress
//!   one property's (de)serialization. The most recently registered converter
//!   is consulted first, so register in order of increasing specificity.
//! - **Injectors** ([`PropertyInjector`]): add key/value pairs to an entity's
//!   output, ahead of its declared properties. Inherited by subtypes.
//! - **Aliases** ([`AliasRegistry`]): per-type external names for properties,
//!   used in both directions.
//! - **Value resolvers** ([`ValueResolver`]): possibly asynchronous hooks that
//!   resolve a property value against outside context. First answer wins.
//!
//! Registration takes `&mut self`; once set up, share the serializer behind
//! an `Arc` and call it from as many threads as needed.
//!
//! # Example
//!
//! ```
//! use entigraph_model::{Entity, EntityType, Model, PropertyDescriptor};
//! use entigraph_serializer::{EntitySerializer, InitializationContext, SerializationSettings};
//!
//! let mut model = Model::new();
//! let person = model
//!     .define(
//!         EntityType::builder("Person")
//!             .property(PropertyDescriptor::string("name"))
//!             .property(PropertyDescriptor::reference("manager", "Person")),
//!     )
//!     .unwrap();
//!
//! let ann = Entity::new(&person, None);
//! ann.set("name", "Ann").unwrap();
//!
//! let serializer = EntitySerializer::new();
//! let json = serializer.serialize(&ann, SerializationSettings::default()).unwrap();
//! assert_eq!(json["name"], "Ann");
//!
//! let mut ctx = InitializationContext::new(&model);
//! let copy = serializer
//!     .deserialize_entity(&person, serde_json::Value::Object(json), &mut ctx)
//!     .unwrap();
//! assert_eq!(copy.get("name").as_str(), Some("Ann"));
//! ```

mod alias;
mod context;
mod converter;
mod error;
mod injector;
mod property;
mod resolver;
mod serializer;
mod settings;

pub use alias::{AliasRegistry, TypeKey};
pub use context::{InitializationContext, SerializeContext};
pub use converter::{
    ConverterChain, DefaultConverter, FnConverter, IgnorePropertiesConverter, PropertyConverter,
};
pub use error::{SerializeError, SerializeResult};
pub use injector::{InjectorRegistry, PropertyInjector};
pub use property::{ConvertedValue, PropertySerialization};
pub use resolver::{BoxValueFuture, Resolution, ResolverChain, ValueResolver};
pub use serializer::EntitySerializer;
pub use settings::SerializationSettings;
