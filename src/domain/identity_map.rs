//! # Identity Mapper
//!
//! Remembers, per target entity type, which target record each source row
//! became. It is the only state shared between tables during a run: the
//! engine writes an entry after every imported row, and foreign keys of later
//! tables are rewritten by reading those entries back.
//!
//! Entries are append-only. Recording the same association twice is a no-op;
//! recording a different target for a source id that is already mapped is an
//! error because it means two target records claim the same source row.

use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::value::RecordKey;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct IdentityMapper {
    mappings: HashMap<EntityType, HashMap<RecordKey, RecordKey>>,
}

impl IdentityMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `source_id -> target_id` for `entity_type`.
    pub fn record(
        &mut self,
        entity_type: &EntityType,
        source_id: RecordKey,
        target_id: RecordKey,
    ) -> Result<()> {
        let ids = self.mappings.entry(entity_type.clone()).or_default();
        match ids.get(&source_id) {
            Some(existing) if *existing == target_id => Ok(()),
            Some(existing) => Err(ImportError::ConflictingMapping {
                entity_type: entity_type.to_string(),
                source_id: source_id.to_string(),
                existing: existing.to_string(),
                attempted: target_id.to_string(),
            }),
            None => {
                ids.insert(source_id, target_id);
                Ok(())
            }
        }
    }

    /// Returns the target id recorded for `source_id`.
    ///
    /// Fails with `MappingNotFound` when nothing of `entity_type` was imported
    /// yet and with `IdentifierNotFound` when only this source id is missing.
    pub fn resolve(&self, entity_type: &EntityType, source_id: &RecordKey) -> Result<&RecordKey> {
        let ids = self
            .mappings
            .get(entity_type)
            .ok_or_else(|| ImportError::MappingNotFound {
                entity_type: entity_type.to_string(),
            })?;

        ids.get(source_id)
            .ok_or_else(|| ImportError::IdentifierNotFound {
                entity_type: entity_type.to_string(),
                source_id: source_id.to_string(),
            })
    }

    /// Total number of recorded associations.
    pub fn len(&self) -> usize {
        self.mappings.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.mappings.keys()
    }

    pub fn mappings_for(&self, entity_type: &EntityType) -> Option<&HashMap<RecordKey, RecordKey>> {
        self.mappings.get(entity_type)
    }

    /// Sorted, serializable copy of every association, keyed by entity type
    /// name and then by source id.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, RecordKey>> {
        self.mappings
            .iter()
            .map(|(entity_type, ids)| {
                let ids = ids
                    .iter()
                    .map(|(source, target)| (source.to_string(), target.clone()))
                    .collect();
                (entity_type.to_string(), ids)
            })
            .collect()
    }
}
