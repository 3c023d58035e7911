//! Records as held by the target store.

use crate::domain::value::{Attributes, RecordKey, Value};
use serde::{Deserialize, Serialize};

/// Snapshot of a target record: its store-assigned id and current attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordKey,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Record {
    pub fn new(id: RecordKey, attributes: Attributes) -> Self {
        Self { id, attributes }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }
}
