//! # Entity Types
//!
//! An `EntityType` names a kind of record in the target store (a model, a
//! table, a collection). Tokens can only be obtained from an
//! `EntityRegistry`, so a typo in a table definition is caught while the
//! configuration is loaded instead of surfacing as an empty lookup halfway
//! through an import.

use crate::domain::errors::{ImportError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A registered target entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType(Arc<str>);

impl EntityType {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// The closed set of entity types known to one import run.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    types: BTreeMap<String, EntityType>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of names. Duplicates are ignored.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Registers `name` and returns its token.
    pub fn register(&mut self, name: &str) -> Result<EntityType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ImportError::ConfigError(
                "entity type names must not be empty".to_string(),
            ));
        }
        Ok(self
            .types
            .entry(name.to_string())
            .or_insert_with(|| EntityType(Arc::from(name)))
            .clone())
    }

    /// Looks up a previously registered entity type.
    pub fn resolve(&self, name: &str) -> Result<EntityType> {
        self.types
            .get(name.trim())
            .cloned()
            .ok_or_else(|| ImportError::UnknownEntityType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_registered_and_unknown() {
        let registry = EntityRegistry::from_names(["User", "Order", "User"]).unwrap();
        assert_eq!(registry.len(), 2);

        let user = registry.resolve("User").unwrap();
        assert_eq!(user, registry.resolve(" User ").unwrap());
        assert_eq!(user.to_string(), "User");

        assert!(matches!(
            registry.resolve("Usr"),
            Err(ImportError::UnknownEntityType(name)) if name == "Usr"
        ));
    }

    #[test]
    fn test_register_rejects_blank_names() {
        let mut registry = EntityRegistry::new();
        assert!(registry.register("  ").is_err());
    }
}
