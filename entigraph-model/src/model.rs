use crate::{EntityType, EntityTypeBuilder, ModelError, ModelResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of entity types by full name.
///
/// Full names are unique within a model, which is what lets registries
/// elsewhere key on the name and the type object interchangeably.
#[derive(Debug, Default)]
pub struct Model {
    types: HashMap<String, Arc<EntityType>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and registers a type.
    pub fn define(&mut self, builder: EntityTypeBuilder) -> ModelResult<Arc<EntityType>> {
        if self.types.contains_key(builder.full_name()) {
            return Err(ModelError::DuplicateType(builder.full_name().to_string()));
        }
        let entity_type = builder.build()?;
        debug!(entity_type = %entity_type.full_name(), "Defined entity type");
        self.types
            .insert(entity_type.full_name().to_string(), Arc::clone(&entity_type));
        Ok(entity_type)
    }

    pub fn get_type(&self, full_name: &str) -> Option<&Arc<EntityType>> {
        self.types.get(full_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.types.values()
    }
}
