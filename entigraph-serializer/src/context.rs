use crate::{EntitySerializer, PropertySerialization, SerializationSettings, SerializeError, SerializeResult};
use entigraph_model::{Entity, Model, PropertyDescriptor, Value};
use serde_json::Map;
use std::cell::RefCell;
use std::sync::Arc;

/// State for one `serialize` call, handed to converters.
///
/// Gives converters the active settings and a way to serialize nested
/// entities with them.
pub struct SerializeContext<'a> {
    serializer: &'a EntitySerializer,
    settings: SerializationSettings,
    root: &'a Entity,
    /// Nested entities currently being serialized, outermost first.
    in_progress: RefCell<Vec<Arc<Entity>>>,
}

impl<'a> SerializeContext<'a> {
    pub(crate) fn new(serializer: &'a EntitySerializer, settings: SerializationSettings, root: &'a Entity) -> Self {
        Self {
            serializer,
            settings,
            root,
            in_progress: RefCell::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &SerializationSettings {
        &self.settings
    }

    pub fn serializer(&self) -> &EntitySerializer {
        self.serializer
    }

    pub(crate) fn serialize_root(&self) -> SerializeResult<Map<String, serde_json::Value>> {
        self.serializer.serialize_in(self, self.root)
    }

    /// Serializes a nested entity with the same settings.
    pub fn serialize_entity(&self, entity: &Arc<Entity>) -> SerializeResult<Map<String, serde_json::Value>> {
        let revisits = std::ptr::eq(self.root, entity.as_ref())
            || self.in_progress.borrow().iter().any(|open| Arc::ptr_eq(open, entity));
        if revisits {
            return Err(SerializeError::Cycle {
                type_name: entity.entity_type().full_name().to_string(),
                id: entity.id().unwrap_or("<no id>").to_string(),
            });
        }

        self.in_progress.borrow_mut().push(Arc::clone(entity));
        let result = self.serializer.serialize_in(self, entity);
        self.in_progress.borrow_mut().pop();
        result
    }

    /// What the built-in converter would produce for this property.
    pub fn serialize_default(
        &self,
        entity: &Entity,
        value: &Value,
        property: &PropertyDescriptor,
    ) -> SerializeResult<PropertySerialization> {
        crate::DefaultConverter.serialize(self, entity, value, property)
    }
}

/// State for one deserialization session.
///
/// Resolves entity property types through the [`Model`] and remembers which
/// entities the session constructed, as opposed to reused from a type's
/// instance pool.
pub struct InitializationContext<'m> {
    model: &'m Model,
    constructed: Vec<Arc<Entity>>,
}

impl<'m> InitializationContext<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self {
            model,
            constructed: Vec::new(),
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Entities constructed so far, in construction order.
    pub fn constructed(&self) -> &[Arc<Entity>] {
        &self.constructed
    }

    pub(crate) fn record(&mut self, entity: Arc<Entity>) {
        self.constructed.push(entity);
    }
}
