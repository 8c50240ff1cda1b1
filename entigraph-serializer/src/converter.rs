//! Property converters and the chain that orders them.

use crate::{ConvertedValue, PropertySerialization, SerializeContext, SerializeResult, TypeKey};
use entigraph_model::{Entity, PropertyDescriptor, Value};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::Arc;

/// Intercepts the (de)serialization of individual properties.
///
/// `should_convert` is a cheap filter. Both conversion methods default to
/// the built-in behavior, so a converter only overrides the direction it
/// cares about.
pub trait PropertyConverter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn should_convert(&self, entity: &Entity, property: &PropertyDescriptor) -> bool;

    fn serialize_value(
        &self,
        ctx: &SerializeContext<'_>,
        entity: &Entity,
        value: &Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        ctx.serialize_default(entity, value, property)
    }

    fn deserialize_value(
        &self,
        entity: &Entity,
        value: Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<ConvertedValue> {
        let _ = (entity, property);
        Ok(ConvertedValue::Value(value))
    }
}

/// The fallback used when no registered converter accepts a property.
///
/// Entity references are serialized recursively, scalar lists are copied,
/// everything else passes through. The key is the declared property name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl DefaultConverter {
    pub fn serialize(
        &self,
        ctx: &SerializeContext<'_>,
        _entity: &Entity,
        value: &Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        let json = match (property.is_entity(), property.is_list(), value) {
            (_, true, Value::Null) => JsonValue::Array(Vec::new()),
            (true, true, Value::List(items)) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| serialize_reference(ctx, item))
                    .collect::<SerializeResult<Vec<_>>>()?,
            ),
            (true, _, other) => serialize_reference(ctx, other)?,
            (false, _, other) => other.to_json(),
        };
        Ok(PropertySerialization::pair(property.name(), json))
    }
}

fn serialize_reference(ctx: &SerializeContext<'_>, value: &Value) -> SerializeResult<JsonValue> {
    match value {
        Value::Entity(entity) => Ok(JsonValue::Object(ctx.serialize_entity(entity)?)),
        other => Ok(other.to_json()),
    }
}

impl PropertyConverter for DefaultConverter {
    fn name(&self) -> &str {
        "default"
    }

    fn should_convert(&self, _entity: &Entity, _property: &PropertyDescriptor) -> bool {
        true
    }

    fn serialize_value(
        &self,
        ctx: &SerializeContext<'_>,
        entity: &Entity,
        value: &Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        self.serialize(ctx, entity, value, property)
    }
}

type FilterFn = dyn Fn(&Entity, &PropertyDescriptor) -> bool + Send + Sync;
type SerializeFn = dyn Fn(&SerializeContext<'_>, &Entity, &Value, &PropertyDescriptor) -> SerializeResult<PropertySerialization>
    + Send
    + Sync;
type DeserializeFn = dyn Fn(&Entity, Value, &PropertyDescriptor) -> SerializeResult<ConvertedValue> + Send + Sync;

/// A converter assembled from closures.
///
/// ```
/// use entigraph_serializer::{FnConverter, PropertySerialization};
///
/// let upper = FnConverter::new("upper-names", |_, p| p.name() == "name")
///     .on_serialize(|_, _, value, p| {
///         let text = value.as_str().unwrap_or_default().to_uppercase();
///         Ok(PropertySerialization::pair(p.name(), text))
///     });
/// ```
pub struct FnConverter {
    name: String,
    filter: Box<FilterFn>,
    serialize: Option<Box<SerializeFn>>,
    deserialize: Option<Box<DeserializeFn>>,
}

impl FnConverter {
    pub fn new<F>(name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Entity, &PropertyDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            filter: Box::new(filter),
            serialize: None,
            deserialize: None,
        }
    }

    pub fn on_serialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&SerializeContext<'_>, &Entity, &Value, &PropertyDescriptor) -> SerializeResult<PropertySerialization>
            + Send
            + Sync
            + 'static,
    {
        self.serialize = Some(Box::new(f));
        self
    }

    pub fn on_deserialize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Entity, Value, &PropertyDescriptor) -> SerializeResult<ConvertedValue> + Send + Sync + 'static,
    {
        self.deserialize = Some(Box::new(f));
        self
    }
}

impl PropertyConverter for FnConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_convert(&self, entity: &Entity, property: &PropertyDescriptor) -> bool {
        (self.filter)(entity, property)
    }

    fn serialize_value(
        &self,
        ctx: &SerializeContext<'_>,
        entity: &Entity,
        value: &Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        match &self.serialize {
            Some(f) => f(ctx, entity, value, property),
            None => ctx.serialize_default(entity, value, property),
        }
    }

    fn deserialize_value(
        &self,
        entity: &Entity,
        value: Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<ConvertedValue> {
        match &self.deserialize {
            Some(f) => f(entity, value, property),
            None => Ok(ConvertedValue::Value(value)),
        }
    }
}

/// Suppresses the named properties of a type (and its subtypes) in both
/// directions.
#[derive(Debug, Clone)]
pub struct IgnorePropertiesConverter {
    entity_type: TypeKey,
    properties: HashSet<String>,
}

impl IgnorePropertiesConverter {
    pub fn new<I, S>(entity_type: impl Into<TypeKey>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_type: entity_type.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl PropertyConverter for IgnorePropertiesConverter {
    fn name(&self) -> &str {
        "ignore-properties"
    }

    fn should_convert(&self, entity: &Entity, property: &PropertyDescriptor) -> bool {
        self.properties.contains(property.name()) && entity.is_instance_of(self.entity_type.as_str())
    }

    fn serialize_value(
        &self,
        _ctx: &SerializeContext<'_>,
        _entity: &Entity,
        _value: &Value,
        _property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        Ok(PropertySerialization::Ignore)
    }

    fn deserialize_value(
        &self,
        _entity: &Entity,
        _value: Value,
        _property: &PropertyDescriptor,
    ) -> SerializeResult<ConvertedValue> {
        Ok(ConvertedValue::Ignore)
    }
}

/// Registered converters. The most recent registration takes precedence.
#[derive(Default)]
pub struct ConverterChain {
    converters: Vec<Arc<dyn PropertyConverter>>,
}

impl ConverterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn PropertyConverter>) {
        self.converters.push(converter);
    }

    /// Converters in precedence order, most recently registered first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PropertyConverter>> {
        self.converters.iter().rev()
    }

    /// Every converter accepting `property`, in precedence order.
    pub fn candidates(&self, entity: &Entity, property: &PropertyDescriptor) -> Vec<&Arc<dyn PropertyConverter>> {
        self.iter()
            .filter(|c| c.should_convert(entity, property))
            .collect()
    }

    /// The highest-precedence converter accepting `property`.
    pub fn first_match(&self, entity: &Entity, property: &PropertyDescriptor) -> Option<&Arc<dyn PropertyConverter>> {
        self.iter().find(|c| c.should_convert(entity, property))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
