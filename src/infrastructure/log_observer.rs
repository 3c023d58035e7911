//! Observer that forwards import notices to the `log` facade.

use crate::domain::entity::EntityType;
use crate::domain::value::{RecordKey, Value};
use crate::ports::import_observer::ImportObserver;
use log::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ImportObserver for LogObserver {
    fn record_created(&self, entity_type: &EntityType, id: &RecordKey) {
        info!("Created new {} with ID {}", entity_type, id);
    }

    fn record_updated(&self, entity_type: &EntityType, id: &RecordKey, changed_fields: usize) {
        info!(
            "Updated existing {} with ID {} ({} fields changed)",
            entity_type, id, changed_fields
        );
    }

    fn record_unchanged(&self, entity_type: &EntityType, id: &RecordKey) {
        debug!("Existing {} with ID {} is already up to date", entity_type, id);
    }

    fn field_changed(
        &self,
        entity_type: &EntityType,
        id: &RecordKey,
        field: &str,
        old: &Value,
        new: &Value,
    ) {
        info!(
            "Updating {} {} field {}. Previous value: {}, new value: {}",
            entity_type, id, field, old, new
        );
    }

    fn foreign_key_rewritten(
        &self,
        table: &str,
        field: &str,
        entity_type: &EntityType,
        target_id: &RecordKey,
    ) {
        debug!(
            "Changed foreign key {}.{} value to {} {}",
            table, field, entity_type, target_id
        );
    }

    fn table_skipped(&self, table: &str) {
        info!("Skipping {}: no target entity type", table);
    }
}
