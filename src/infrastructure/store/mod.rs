//! Target store adapters.
//!
//! Both adapters share `StoreState`, a plain in-process table of records per
//! entity type. `memory` keeps it behind a mutex; `json_file` additionally
//! writes it to disk after every change.

pub mod json_file;
pub mod memory;

use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::record::Record;
use crate::domain::value::{Attributes, RecordKey, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub(crate) struct EntityTable {
    next_id: i64,
    records: IndexMap<RecordKey, Attributes>,
}

impl EntityTable {
    fn new(first_id: i64) -> Self {
        Self {
            next_id: first_id,
            records: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StoreState {
    first_id: i64,
    entities: BTreeMap<String, EntityTable>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::with_first_id(1)
    }
}

impl StoreState {
    pub(crate) fn with_first_id(first_id: i64) -> Self {
        Self {
            first_id,
            entities: BTreeMap::new(),
        }
    }

    pub(crate) fn find_one(&self, entity_type: &EntityType, field: &str, value: &Value) -> Option<Record> {
        self.entities
            .get(entity_type.name())?
            .records
            .iter()
            .find(|(_, attributes)| attributes.get(field) == Some(value))
            .map(|(id, attributes)| Record::new(id.clone(), attributes.clone()))
    }

    pub(crate) fn find_by_id(&self, entity_type: &EntityType, id: &RecordKey) -> Option<Record> {
        self.entities
            .get(entity_type.name())?
            .records
            .get(id)
            .map(|attributes| Record::new(id.clone(), attributes.clone()))
    }

    pub(crate) fn create(&mut self, entity_type: &EntityType, attributes: Attributes) -> Record {
        let first_id = self.first_id;
        let table = self
            .entities
            .entry(entity_type.name().to_string())
            .or_insert_with(|| EntityTable::new(first_id));
        let id = RecordKey::Int(table.next_id);
        table.next_id += 1;
        table.records.insert(id.clone(), attributes.clone());
        Record::new(id, attributes)
    }

    pub(crate) fn update(
        &mut self,
        entity_type: &EntityType,
        id: &RecordKey,
        attributes: Attributes,
    ) -> Result<Record> {
        let current = self
            .entities
            .get_mut(entity_type.name())
            .and_then(|table| table.records.get_mut(id))
            .ok_or_else(|| {
                ImportError::StoreError(format!("cannot update {} {}: not found", entity_type, id))
            })?;
        current.extend(attributes);
        Ok(Record::new(id.clone(), current.clone()))
    }

    pub(crate) fn remove(&mut self, entity_type: &EntityType, id: &RecordKey) -> Option<Record> {
        self.entities
            .get_mut(entity_type.name())?
            .records
            .shift_remove(id)
            .map(|attributes| Record::new(id.clone(), attributes))
    }

    pub(crate) fn count(&self, entity_type: &EntityType) -> usize {
        self.entities
            .get(entity_type.name())
            .map_or(0, |table| table.records.len())
    }

    pub(crate) fn records(&self, entity_type: &EntityType) -> Vec<Record> {
        self.entities
            .get(entity_type.name())
            .map(|table| {
                table
                    .records
                    .iter()
                    .map(|(id, attributes)| Record::new(id.clone(), attributes.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// On-disk layout. Records are kept as a list because JSON object keys
/// cannot carry integer identifiers.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    #[serde(default = "default_first_id")]
    first_id: i64,
    #[serde(default)]
    entities: BTreeMap<String, StoredEntity>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntity {
    next_id: i64,
    records: Vec<Record>,
}

fn default_first_id() -> i64 {
    1
}

impl From<&StoreState> for StoreDocument {
    fn from(state: &StoreState) -> Self {
        Self {
            first_id: state.first_id,
            entities: state
                .entities
                .iter()
                .map(|(name, table)| {
                    let records = table
                        .records
                        .iter()
                        .map(|(id, attributes)| Record::new(id.clone(), attributes.clone()))
                        .collect();
                    (
                        name.clone(),
                        StoredEntity {
                            next_id: table.next_id,
                            records,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl From<StoreDocument> for StoreState {
    fn from(doc: StoreDocument) -> Self {
        Self {
            first_id: doc.first_id,
            entities: doc
                .entities
                .into_iter()
                .map(|(name, stored)| {
                    let records = stored
                        .records
                        .into_iter()
                        .map(|record| (record.id, record.attributes))
                        .collect();
                    (
                        name,
                        EntityTable {
                            next_id: stored.next_id,
                            records,
                        },
                    )
                })
                .collect(),
        }
    }
}
