//! Port for import notices (created, updated, field changes, key rewrites).
//!
//! Observers are informational only. Every method has an empty default so an
//! observer only implements what it cares about, and the engine behaves the
//! same whichever observer is plugged in.

use crate::domain::entity::EntityType;
use crate::domain::value::{RecordKey, Value};

pub trait ImportObserver: Send + Sync {
    fn record_created(&self, _entity_type: &EntityType, _id: &RecordKey) {}

    fn record_updated(&self, _entity_type: &EntityType, _id: &RecordKey, _changed_fields: usize) {}

    fn record_unchanged(&self, _entity_type: &EntityType, _id: &RecordKey) {}

    fn field_changed(
        &self,
        _entity_type: &EntityType,
        _id: &RecordKey,
        _field: &str,
        _old: &Value,
        _new: &Value,
    ) {
    }

    fn foreign_key_rewritten(
        &self,
        _table: &str,
        _field: &str,
        _entity_type: &EntityType,
        _target_id: &RecordKey,
    ) {
    }

    fn table_skipped(&self, _table: &str) {}
}

/// Observer that ignores every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ImportObserver for NoopObserver {}
