//! Per-type injectors contributing extra pairs to serialized output.

use crate::{PropertySerialization, TypeKey};
use entigraph_model::{Entity, EntityType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Adds key/value pairs to an entity's output that do not come from its
/// declared properties (type discriminators, links, computed summaries).
///
/// Injected pairs are emitted before declared properties and must not
/// collide with them or with each other.
pub trait PropertyInjector: Send + Sync {
    fn inject(&self, entity: &Entity) -> Vec<PropertySerialization>;
}

impl<F> PropertyInjector for F
where
    F: Fn(&Entity) -> Vec<PropertySerialization> + Send + Sync,
{
    fn inject(&self, entity: &Entity) -> Vec<PropertySerialization> {
        self(entity)
    }
}

/// Injector lists keyed by type. Lookups walk the inheritance chain.
#[derive(Default)]
pub struct InjectorRegistry {
    by_type: HashMap<TypeKey, Vec<Arc<dyn PropertyInjector>>>,
}

impl InjectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity_type: impl Into<TypeKey>, injector: Arc<dyn PropertyInjector>) {
        let key = entity_type.into();
        trace!(entity_type = %key, "Registering injector");
        self.by_type.entry(key).or_default().push(injector);
    }

    /// Injectors applying to `entity_type`: its own first, then each base
    /// type's, in registration order within a level.
    pub fn injectors_for(&self, entity_type: &EntityType) -> Vec<Arc<dyn PropertyInjector>> {
        entity_type
            .ancestors()
            .filter_map(|t| self.by_type.get(t.full_name()))
            .flat_map(|level| level.iter().cloned())
            .collect()
    }

    /// Runs every applicable injector against `entity`.
    pub fn inject(&self, entity: &Entity) -> Vec<PropertySerialization> {
        self.injectors_for(entity.entity_type())
            .iter()
            .flat_map(|injector| injector.inject(entity))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
