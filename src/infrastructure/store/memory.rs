//! In-process target store. Used for dry runs and throughout the tests.

use super::StoreState;
use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::record::Record;
use crate::domain::value::{Attributes, RecordKey, Value};
use crate::ports::target_store::TargetStore;
use std::sync::{Mutex, MutexGuard};

/// `TargetStore` holding every record in memory.
///
/// Identifiers are sequential per entity type, starting at `first_id`.
#[derive(Debug, Default)]
pub struct InMemoryTargetStore {
    state: Mutex<StoreState>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts identifiers at `first_id` so that target ids visibly differ
    /// from small source ids.
    pub fn with_first_id(first_id: i64) -> Self {
        Self {
            state: Mutex::new(StoreState::with_first_id(first_id)),
        }
    }

    /// Deletes a record behind the importer's back.
    pub fn remove(&self, entity_type: &EntityType, id: &RecordKey) -> Result<Option<Record>> {
        Ok(self.lock()?.remove(entity_type, id))
    }

    pub fn count(&self, entity_type: &EntityType) -> Result<usize> {
        Ok(self.lock()?.count(entity_type))
    }

    /// All records of one entity type, in creation order.
    pub fn records(&self, entity_type: &EntityType) -> Result<Vec<Record>> {
        Ok(self.lock()?.records(entity_type))
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|e| ImportError::StoreError(format!("store lock poisoned: {}", e)))
    }
}

impl TargetStore for InMemoryTargetStore {
    fn find_one(
        &self,
        entity_type: &EntityType,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>> {
        Ok(self.lock()?.find_one(entity_type, field, value))
    }

    fn find_by_id(&self, entity_type: &EntityType, id: &RecordKey) -> Result<Option<Record>> {
        Ok(self.lock()?.find_by_id(entity_type, id))
    }

    fn create(&self, entity_type: &EntityType, attributes: Attributes) -> Result<Record> {
        Ok(self.lock()?.create(entity_type, attributes))
    }

    fn update(
        &self,
        entity_type: &EntityType,
        id: &RecordKey,
        attributes: Attributes,
    ) -> Result<Record> {
        self.lock()?.update(entity_type, id, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityRegistry;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_create_find_update() {
        let registry = EntityRegistry::from_names(["User", "Team"]).unwrap();
        let user = registry.resolve("User").unwrap();
        let team = registry.resolve("Team").unwrap();
        let store = InMemoryTargetStore::new();

        let a = store
            .create(&user, attrs(&[("email", "a@x.com".into()), ("name", "A".into())]))
            .unwrap();
        let t = store.create(&team, attrs(&[("name", "T".into())])).unwrap();
        assert_eq!(a.id, RecordKey::Int(1));
        assert_eq!(t.id, RecordKey::Int(1));

        let found = store
            .find_one(&user, "email", &Value::from("a@x.com"))
            .unwrap()
            .unwrap();
        assert_eq!(found, a);
        assert!(store
            .find_one(&team, "email", &Value::from("a@x.com"))
            .unwrap()
            .is_none());

        let updated = store
            .update(&user, &a.id, attrs(&[("name", "B".into())]))
            .unwrap();
        assert_eq!(updated.get("name"), Some(&Value::from("B")));
        assert_eq!(updated.get("email"), Some(&Value::from("a@x.com")));
    }

    #[test]
    fn test_update_missing_record_fails() {
        let registry = EntityRegistry::from_names(["User"]).unwrap();
        let user = registry.resolve("User").unwrap();
        let store = InMemoryTargetStore::new();
        assert!(matches!(
            store.update(&user, &RecordKey::Int(3), Attributes::new()),
            Err(ImportError::StoreError(_))
        ));
    }

    #[test]
    fn test_remove() {
        let registry = EntityRegistry::from_names(["User"]).unwrap();
        let user = registry.resolve("User").unwrap();
        let store = InMemoryTargetStore::with_first_id(50);
        let a = store.create(&user, Attributes::new()).unwrap();
        assert_eq!(a.id, RecordKey::Int(50));

        assert!(store.remove(&user, &a.id).unwrap().is_some());
        assert!(store.find_by_id(&user, &a.id).unwrap().is_none());
        assert_eq!(store.count(&user).unwrap(), 0);
    }
}
