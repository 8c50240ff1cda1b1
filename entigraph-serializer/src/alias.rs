//! Per-type property aliases and the type key shared by all registries.

use entigraph_model::EntityType;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Registry key for a type.
///
/// Built from either the type object or its full name. Both normalize to the
/// full name, so registrations made through one handle are visible through
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&EntityType> for TypeKey {
    fn from(t: &EntityType) -> Self {
        Self(t.full_name().to_string())
    }
}

impl From<&Arc<EntityType>> for TypeKey {
    fn from(t: &Arc<EntityType>) -> Self {
        Self(t.full_name().to_string())
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Bidirectional property-name aliases, scoped to one exact type.
///
/// Aliases are not inherited: an alias registered on a base type applies to
/// the properties that base type declares, not to its subtypes' own ones.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    by_type: HashMap<TypeKey, HashMap<String, String>>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `external_name <-> property_name` on `entity_type`.
    /// Re-registering either name overwrites only that name's entry.
    pub fn register(
        &mut self,
        entity_type: impl Into<TypeKey>,
        external_name: impl Into<String>,
        property_name: impl Into<String>,
    ) {
        let key = entity_type.into();
        let external_name = external_name.into();
        let property_name = property_name.into();
        debug!(entity_type = %key, external = %external_name, property = %property_name, "Registering alias");

        let aliases = self.by_type.entry(key).or_default();
        aliases.insert(external_name.clone(), property_name.clone());
        aliases.insert(property_name, external_name);
    }

    /// All aliases for `entity_type`, in both directions. Empty when none.
    pub fn aliases(&self, entity_type: impl Into<TypeKey>) -> HashMap<String, String> {
        let key: TypeKey = entity_type.into();
        self.by_type
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// The counterpart of `name` on the type named `type_name`.
    pub fn alias_for(&self, type_name: &str, name: &str) -> Option<&str> {
        self.by_type
            .get(type_name)
            .and_then(|aliases| aliases.get(name))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
