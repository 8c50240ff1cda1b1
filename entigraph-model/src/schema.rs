use crate::{Entity, ModelError, ModelResult, Value, ValueFormat, default_format};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::trace;

/// The native kind of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    Date,
    /// Arbitrary JSON, stored as-is.
    Json,
}

/// The value type of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarKind),
    /// A reference to an entity of the named type (or a subtype).
    Entity(String),
}

impl PropertyType {
    pub fn is_entity(&self) -> bool {
        matches!(self, PropertyType::Entity(_))
    }

    /// Full name of the referenced type, for entity properties.
    pub fn entity_type_name(&self) -> Option<&str> {
        match self {
            PropertyType::Entity(name) => Some(name),
            PropertyType::Scalar(_) => None,
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            PropertyType::Scalar(kind) => Some(*kind),
            PropertyType::Entity(_) => None,
        }
    }
}

/// Immutable metadata for one property of an [`EntityType`].
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    property_type: PropertyType,
    is_list: bool,
    is_calculated: bool,
    is_constant: bool,
    format: Option<Arc<dyn ValueFormat>>,
    containing_type: String,
}

impl PropertyDescriptor {
    /// A scalar property carrying the default format for `kind`.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::Scalar(kind),
            is_list: false,
            is_calculated: false,
            is_constant: false,
            format: default_format(kind),
            containing_type: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Date)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::Json)
    }

    /// A property referencing an entity of type `type_name`.
    pub fn reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::Entity(type_name.into()),
            is_list: false,
            is_calculated: false,
            is_constant: false,
            format: None,
            containing_type: String::new(),
        }
    }

    /// Marks the property as list-valued.
    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    /// Marks the property as calculated (excluded from default serialization).
    pub fn calculated(mut self) -> Self {
        self.is_calculated = true;
        self
    }

    /// Marks the property as constant (excluded from default serialization).
    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    pub fn with_format(mut self, format: Arc<dyn ValueFormat>) -> Self {
        self.format = Some(format);
        self
    }

    pub fn without_format(mut self) -> Self {
        self.format = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn is_entity(&self) -> bool {
        self.property_type.is_entity()
    }

    pub fn is_calculated(&self) -> bool {
        self.is_calculated
    }

    pub fn is_constant(&self) -> bool {
        self.is_constant
    }

    pub fn format(&self) -> Option<&Arc<dyn ValueFormat>> {
        self.format.as_ref()
    }

    /// Full name of the type that declares this property.
    pub fn containing_type(&self) -> &str {
        &self.containing_type
    }

    /// The property's current value on `entity`.
    pub fn value(&self, entity: &Entity) -> Value {
        entity.get(&self.name)
    }
}

/// Immutable metadata for a domain type, plus its live-instance pool.
pub struct EntityType {
    full_name: String,
    base_type: Option<Arc<EntityType>>,
    properties: Vec<Arc<PropertyDescriptor>>,
    id_property: Option<String>,
    instances: RwLock<HashMap<String, Weak<Entity>>>,
}

impl EntityType {
    pub fn builder(full_name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(full_name)
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn base_type(&self) -> Option<&Arc<EntityType>> {
        self.base_type.as_ref()
    }

    /// Properties declared directly on this type, in declaration order.
    pub fn properties(&self) -> &[Arc<PropertyDescriptor>] {
        &self.properties
    }

    /// Inherited and declared properties, base-most type first.
    pub fn all_properties(&self) -> Vec<Arc<PropertyDescriptor>> {
        let mut chain: Vec<&EntityType> = self.ancestors().collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|t| t.properties.iter().cloned())
            .collect()
    }

    /// Looks up a declared or inherited property by name.
    pub fn property(&self, name: &str) -> Option<Arc<PropertyDescriptor>> {
        self.ancestors()
            .find_map(|t| t.properties.iter().find(|p| p.name == name).cloned())
    }

    /// Name of the identifier property, if the type (or a base) declares one.
    pub fn id_property(&self) -> Option<&str> {
        self.ancestors().find_map(|t| t.id_property.as_deref())
    }

    /// This type followed by each base type, most-derived first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// True when this type is `type_name` or derives from it.
    pub fn is_subtype_of(&self, type_name: &str) -> bool {
        self.ancestors().any(|t| t.full_name == type_name)
    }

    /// Returns the live instance with identifier `id`, if any.
    pub fn get(&self, id: &str) -> Option<Arc<Entity>> {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .and_then(Weak::upgrade)
    }

    /// Number of identifiers held in this type's pool, derived instances
    /// included.
    pub fn pool_len(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Records `entity` under `id` in this type's pool and every base pool,
    /// so lookups through a base type find derived instances.
    pub(crate) fn register_instance(&self, id: &str, entity: &Arc<Entity>) {
        for t in self.ancestors() {
            trace!(entity_type = %t.full_name, id, "Registering instance");
            t.instances
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id.to_string(), Arc::downgrade(entity));
        }
    }

    /// Drops the pool entries for `id` whose instance is gone. An entry
    /// replaced by a newer live instance under the same id stays.
    pub(crate) fn release_instance(&self, id: &str) {
        for t in self.ancestors() {
            let mut pool = t.instances.write().unwrap_or_else(PoisonError::into_inner);
            if pool.get(id).is_some_and(|w| w.strong_count() == 0) {
                trace!(entity_type = %t.full_name, id, "Releasing instance");
                pool.remove(id);
            }
        }
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("full_name", &self.full_name)
            .field("base_type", &self.base_type.as_ref().map(|b| b.full_name()))
            .field("properties", &self.properties.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("id_property", &self.id_property)
            .finish()
    }
}

/// Iterator over a type and its base types.
pub struct Ancestors<'a> {
    next: Option<&'a EntityType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a EntityType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base_type.as_deref();
        Some(current)
    }
}

/// Builds an [`EntityType`]. Register the result with a [`Model`](crate::Model).
#[derive(Debug)]
pub struct EntityTypeBuilder {
    full_name: String,
    base_type: Option<Arc<EntityType>>,
    properties: Vec<PropertyDescriptor>,
    id_property: Option<String>,
}

impl EntityTypeBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            base_type: None,
            properties: Vec::new(),
            id_property: None,
        }
    }

    pub fn base(mut self, base_type: &Arc<EntityType>) -> Self {
        self.base_type = Some(Arc::clone(base_type));
        self
    }

    /// Names the property holding the instance identifier.
    pub fn identifier(mut self, property: impl Into<String>) -> Self {
        self.id_property = Some(property.into());
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn build(self) -> ModelResult<Arc<EntityType>> {
        let mut declared: Vec<Arc<PropertyDescriptor>> = Vec::with_capacity(self.properties.len());
        for mut property in self.properties {
            let inherited = self
                .base_type
                .as_ref()
                .is_some_and(|b| b.property(&property.name).is_some());
            if inherited || declared.iter().any(|p| p.name == property.name) {
                return Err(ModelError::DuplicateProperty {
                    type_name: self.full_name,
                    property: property.name,
                });
            }
            property.containing_type = self.full_name.clone();
            declared.push(Arc::new(property));
        }

        if let Some(id) = &self.id_property {
            let known = declared.iter().any(|p| &p.name == id)
                || self.base_type.as_ref().is_some_and(|b| b.property(id).is_some());
            if !known {
                return Err(ModelError::UnknownIdentifier {
                    type_name: self.full_name,
                    property: id.clone(),
                });
            }
        }

        Ok(Arc::new(EntityType {
            full_name: self.full_name,
            base_type: self.base_type,
            properties: declared,
            id_property: self.id_property,
            instances: RwLock::new(HashMap::new()),
        }))
    }
}
