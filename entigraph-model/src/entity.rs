use crate::{EntityType, ModelError, ModelResult, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// An instance of an [`EntityType`].
///
/// Entities are always shared as `Arc<Entity>`: identity matters, and two
/// references to the same identifier must resolve to the same allocation.
/// Property state sits behind a lock so an entity can be populated after it
/// has been registered in its type's instance pool.
pub struct Entity {
    entity_type: Arc<EntityType>,
    id: Option<String>,
    values: RwLock<HashMap<String, Value>>,
}

impl Entity {
    /// Creates an instance of `entity_type`.
    ///
    /// With an identifier, the instance is registered in the type's pool
    /// (and every base type's pool) and the identifier property is set.
    pub fn new(entity_type: &Arc<EntityType>, id: Option<String>) -> Arc<Self> {
        let mut values = HashMap::new();
        if let (Some(id), Some(id_prop)) = (&id, entity_type.id_property()) {
            values.insert(id_prop.to_string(), Value::String(id.clone()));
        }

        let entity = Arc::new(Self {
            entity_type: Arc::clone(entity_type),
            id,
            values: RwLock::new(values),
        });
        if let Some(id) = &entity.id {
            entity_type.register_instance(id, &entity);
        }
        entity
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True when this entity's type is `type_name` or derives from it.
    pub fn is_instance_of(&self, type_name: &str) -> bool {
        self.entity_type.is_subtype_of(type_name)
    }

    /// Current value of `property`; `Null` when unset.
    pub fn get(&self, property: &str) -> Value {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    /// Sets `property`, which must be declared on the type or a base type.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> ModelResult<()> {
        if self.entity_type.property(property).is_none() {
            return Err(ModelError::UnknownProperty {
                type_name: self.entity_type.full_name().to_string(),
                property: property.to_string(),
            });
        }
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(property.to_string(), value.into());
        Ok(())
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        if let Some(id) = &self.id {
            self.entity_type.release_instance(id);
        }
    }
}

// Entity graphs are cyclic (a manager's reports point back at the manager),
// so Debug stops at the identity.
impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.entity_type.full_name())
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
