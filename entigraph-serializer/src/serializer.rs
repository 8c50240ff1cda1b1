//! Serialize/deserialize orchestration over the registries.

use crate::{
    AliasRegistry, ConvertedValue, ConverterChain, InitializationContext, InjectorRegistry,
    PropertyConverter, PropertyInjector, PropertySerialization, Resolution, ResolverChain,
    SerializationSettings, SerializeContext, SerializeError, SerializeResult, TypeKey, ValueResolver,
};
use entigraph_model::{Entity, EntityType, PropertyDescriptor, ScalarKind, Value};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Serializes entities to JSON objects and rebuilds them, through the
/// registered converters, injectors, aliases and resolvers.
#[derive(Default)]
pub struct EntitySerializer {
    converters: ConverterChain,
    injectors: InjectorRegistry,
    aliases: AliasRegistry,
    resolvers: ResolverChain,
}

impl EntitySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Adds a converter ahead of every converter registered before it.
    pub fn register_converter(&mut self, converter: impl PropertyConverter + 'static) {
        debug!(converter = %converter.name(), "Registering converter");
        self.converters.register(Arc::new(converter));
    }

    pub fn register_injector(&mut self, entity_type: impl Into<TypeKey>, injector: impl PropertyInjector + 'static) {
        self.injectors.register(entity_type, Arc::new(injector));
    }

    pub fn register_alias(
        &mut self,
        entity_type: impl Into<TypeKey>,
        external_name: impl Into<String>,
        property_name: impl Into<String>,
    ) {
        self.aliases.register(entity_type, external_name, property_name);
    }

    pub fn register_resolver(&mut self, resolver: impl ValueResolver + 'static) {
        self.resolvers.register(Arc::new(resolver));
    }

    pub fn converters(&self) -> &ConverterChain {
        &self.converters
    }

    pub fn injectors(&self) -> &InjectorRegistry {
        &self.injectors
    }

    /// Both directions of every alias registered on `entity_type`.
    pub fn aliases(&self, entity_type: impl Into<TypeKey>) -> HashMap<String, String> {
        self.aliases.aliases(entity_type)
    }

    // ================================================================
    // Value resolution
    // ================================================================

    /// Asks each resolver in registration order; the first answer wins.
    /// `None` when no resolver answered.
    pub fn resolve_value(&self, entity: &Arc<Entity>, property: &PropertyDescriptor, value: &Value) -> Option<Resolution> {
        self.resolvers.resolve(entity, property, value)
    }

    // ================================================================
    // Serialization
    // ================================================================

    /// Serializes `entity` into a flat JSON object.
    ///
    /// Injected pairs come first, then declared properties in declaration
    /// order (inherited ones first). Calculated and constant properties are
    /// skipped. Fails on any duplicate key.
    pub fn serialize(&self, entity: &Entity, settings: SerializationSettings) -> SerializeResult<Map<String, JsonValue>> {
        SerializeContext::new(self, settings, entity).serialize_root()
    }

    /// [`serialize`](Self::serialize) straight to a JSON string.
    pub fn serialize_to_string(&self, entity: &Entity, settings: SerializationSettings) -> SerializeResult<String> {
        let map = self.serialize(entity, settings)?;
        Ok(serde_json::to_string(&JsonValue::Object(map))?)
    }

    pub(crate) fn serialize_in(&self, ctx: &SerializeContext<'_>, entity: &Entity) -> SerializeResult<Map<String, JsonValue>> {
        let entity_type = entity.entity_type();
        let mut pairs = self.injectors.inject(entity);

        for property in entity_type.all_properties() {
            if property.is_calculated() || property.is_constant() {
                continue;
            }
            pairs.push(self.serialize_property(ctx, entity, &property)?);
        }

        let mut output = Map::with_capacity(pairs.len());
        for pair in pairs {
            let PropertySerialization::Pair { key, value } = pair else {
                continue;
            };
            if output.contains_key(&key) {
                error!(entity_type = %entity_type.full_name(), key = %key, "Duplicate key in serialized output");
                return Err(SerializeError::DuplicateKey {
                    type_name: entity_type.full_name().to_string(),
                    key,
                });
            }
            output.insert(key, value);
        }
        Ok(output)
    }

    fn serialize_property(
        &self,
        ctx: &SerializeContext<'_>,
        entity: &Entity,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        let value = property.value(entity);
        let force = ctx.settings().force;

        let mut accepted = None;
        for converter in self.converters.candidates(entity, property) {
            let result = converter.serialize_value(ctx, entity, &value, property)?;
            if force && result.is_ignore() {
                trace!(converter = %converter.name(), property = %property.name(), "Ignore overridden by force");
                continue;
            }
            trace!(converter = %converter.name(), property = %property.name(), "Converter accepted property");
            accepted = Some(result);
            break;
        }

        let result = match accepted {
            Some(result) => result,
            None => ctx.serialize_default(entity, &value, property)?,
        };
        Ok(self.apply_alias(result, property, ctx.settings()))
    }

    fn apply_alias(
        &self,
        result: PropertySerialization,
        property: &PropertyDescriptor,
        settings: &SerializationSettings,
    ) -> PropertySerialization {
        if !settings.use_aliases {
            return result;
        }
        match result {
            PropertySerialization::Pair { key, value } => {
                let key = self
                    .aliases
                    .alias_for(property.containing_type(), property.name())
                    .map(str::to_string)
                    .unwrap_or(key);
                PropertySerialization::Pair { key, value }
            }
            PropertySerialization::Ignore => PropertySerialization::Ignore,
        }
    }

    // ================================================================
    // Deserialization
    // ================================================================

    /// Converts `data` into a value for `property` of `instance`.
    ///
    /// Returns `None` when nothing should be assigned: a converter ignored the
    /// property, a list property received non-list data, or entity-reference
    /// data was neither an entity nor an object.
    /// With `construct_entity == false`, entity-reference data is returned
    /// as-is.
    pub fn deserialize(
        &self,
        instance: &Entity,
        data: Value,
        property: &PropertyDescriptor,
        ctx: &mut InitializationContext<'_>,
        construct_entity: bool,
    ) -> SerializeResult<Option<Value>> {
        let data = match self.converters.first_match(instance, property) {
            Some(converter) => match converter.deserialize_value(instance, data, property)? {
                ConvertedValue::Value(value) => value,
                ConvertedValue::Ignore => {
                    trace!(converter = %converter.name(), property = %property.name(), "Deserialization ignored");
                    return Ok(None);
                }
            },
            None => data,
        };

        let raw_reference = property.is_entity() && !construct_entity;
        if property.is_list() && !raw_reference && !matches!(data, Value::List(_) | Value::Null) {
            warn!(property = %property.name(), "Skipping non-list data for list property: {:?}", data);
            return Ok(None);
        }

        if let Some(type_name) = property.property_type().entity_type_name() {
            if !construct_entity {
                return Ok(Some(data));
            }
            let target = ctx
                .model()
                .get_type(type_name)
                .cloned()
                .ok_or_else(|| SerializeError::UnknownType(type_name.to_string()))?;

            return match data {
                Value::List(items) if property.is_list() => {
                    let mut entities = Vec::with_capacity(items.len());
                    for item in items {
                        if let Some(entity) = self.resolve_reference(&target, item, property, ctx)? {
                            entities.push(Value::Entity(entity));
                        }
                    }
                    Ok(Some(Value::List(entities)))
                }
                Value::Null => Ok(Some(Value::Null)),
                other => Ok(self
                    .resolve_reference(&target, other, property, ctx)?
                    .map(Value::Entity)),
            };
        }

        match data {
            Value::List(items) if property.is_list() => items
                .into_iter()
                .map(|item| convert_scalar(property, item))
                .collect::<SerializeResult<Vec<_>>>()
                .map(|items| Some(Value::List(items))),
            other => convert_scalar(property, other).map(Some),
        }
    }

    /// Rebuilds a whole entity from a JSON object, reusing the live instance
    /// when the data carries a known identifier.
    pub fn deserialize_entity(
        &self,
        entity_type: &Arc<EntityType>,
        data: JsonValue,
        ctx: &mut InitializationContext<'_>,
    ) -> SerializeResult<Arc<Entity>> {
        match data {
            JsonValue::Object(map) => self.resolve_or_construct(entity_type, map, ctx),
            _ => Err(SerializeError::NotAnObject {
                type_name: entity_type.full_name().to_string(),
            }),
        }
    }

    /// [`deserialize_entity`](Self::deserialize_entity) from a JSON string.
    pub fn deserialize_entity_from_str(
        &self,
        entity_type: &Arc<EntityType>,
        json: &str,
        ctx: &mut InitializationContext<'_>,
    ) -> SerializeResult<Arc<Entity>> {
        let data: JsonValue = serde_json::from_str(json)?;
        self.deserialize_entity(entity_type, data, ctx)
    }

    fn resolve_reference(
        &self,
        target: &Arc<EntityType>,
        data: Value,
        property: &PropertyDescriptor,
        ctx: &mut InitializationContext<'_>,
    ) -> SerializeResult<Option<Arc<Entity>>> {
        match data {
            Value::Entity(entity) if entity.is_instance_of(target.full_name()) => Ok(Some(entity)),
            Value::Object(map) => self.resolve_or_construct(target, map, ctx).map(Some),
            other => {
                warn!(
                    property = %property.name(),
                    target = %target.full_name(),
                    "Skipping entity reference that is neither a {} nor an object: {:?}",
                    target.full_name(),
                    other
                );
                Ok(None)
            }
        }
    }

    fn resolve_or_construct(
        &self,
        entity_type: &Arc<EntityType>,
        data: Map<String, JsonValue>,
        ctx: &mut InitializationContext<'_>,
    ) -> SerializeResult<Arc<Entity>> {
        let id = entity_type
            .id_property()
            .and_then(|id_prop| self.field(entity_type, &data, id_prop))
            .and_then(identifier_text);

        if let Some(id) = &id
            && let Some(existing) = entity_type.get(id)
        {
            debug!(entity_type = %entity_type.full_name(), id = %id, "Reusing existing instance");
            return Ok(existing);
        }

        let entity = Entity::new(entity_type, id);
        debug!(entity_type = %entity_type.full_name(), id = ?entity.id(), "Constructing instance");
        ctx.record(Arc::clone(&entity));
        self.populate(&entity, data, ctx)?;
        Ok(entity)
    }

    /// Reads `property_name` from raw data, under its alias if it has one.
    fn field<'d>(&self, entity_type: &EntityType, data: &'d Map<String, JsonValue>, property_name: &str) -> Option<&'d JsonValue> {
        data.get(property_name).or_else(|| {
            let declaring = entity_type
                .property(property_name)
                .map(|p| p.containing_type().to_string())?;
            self.aliases
                .alias_for(&declaring, property_name)
                .and_then(|external| data.get(external))
        })
    }

    fn populate(
        &self,
        entity: &Arc<Entity>,
        data: Map<String, JsonValue>,
        ctx: &mut InitializationContext<'_>,
    ) -> SerializeResult<()> {
        let entity_type = Arc::clone(entity.entity_type());
        for (key, raw) in data {
            let Some(property) = self.property_for_key(&entity_type, &key) else {
                debug!(entity_type = %entity_type.full_name(), key = %key, "Skipping unknown key");
                continue;
            };
            if property.is_calculated() || property.is_constant() {
                trace!(property = %property.name(), "Skipping calculated or constant property");
                continue;
            }
            if let Some(value) = self.deserialize(entity, Value::from(raw), &property, ctx, true)? {
                entity.set(property.name(), value)?;
            }
        }
        Ok(())
    }

    /// Maps a data key to a property: declared name first, then an alias
    /// registered on the type that declares the property.
    fn property_for_key(&self, entity_type: &EntityType, key: &str) -> Option<Arc<PropertyDescriptor>> {
        entity_type.property(key).or_else(|| {
            entity_type.ancestors().find_map(|level| {
                let name = self.aliases.alias_for(level.full_name(), key)?;
                level.properties().iter().find(|p| p.name() == name).cloned()
            })
        })
    }
}

fn identifier_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Applies the property's format to textual data whose native form is not a
/// string. Everything else passes through.
fn convert_scalar(property: &PropertyDescriptor, data: Value) -> SerializeResult<Value> {
    match (&data, property.format()) {
        (Value::String(text), Some(format))
            if property.property_type().scalar_kind() != Some(ScalarKind::String) =>
        {
            Ok(format.convert_from_string(text)?)
        }
        _ => Ok(data),
    }
}
