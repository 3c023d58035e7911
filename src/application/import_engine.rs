// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Import Engine
//!
//! The engine drives a whole import run. For every table, in the order the
//! caller gives them, and for every row of that table it:
//!
//! 1. Looks for an existing target record through the natural key.
//! 2. Rewrites the row's foreign keys to already-imported target ids.
//! 3. Renames the row's fields into target attributes.
//! 4. Updates the existing record (non-destructively) or creates a new one.
//! 5. Records `source id -> target id` so later tables can reference it.
//!
//! The run is strictly sequential and fail-fast. Tables must be supplied in
//! dependency order; the engine does not sort them. Whatever was written
//! before a failure stays written.

use crate::application::foreign_keys::ForeignKeyResolver;
use crate::application::report::{ImportReport, RowOutcome, TableReport};
use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::identity_map::IdentityMapper;
use crate::domain::record::Record;
use crate::domain::row::{Row, ID_FIELD};
use crate::domain::table_spec::TableSpec;
use crate::domain::value::{Attributes, Value};
use crate::infrastructure::log_observer::LogObserver;
use crate::ports::import_observer::ImportObserver;
use crate::ports::row_source::RowSource;
use crate::ports::target_store::TargetStore;
use log::info;
use std::sync::Arc;
use std::time::Instant;

/// Orchestrates the import of a list of tables into the target store.
pub struct ImportEngine {
    row_source: Arc<dyn RowSource>,
    target_store: Arc<dyn TargetStore>,
    observer: Arc<dyn ImportObserver>,
    identity: IdentityMapper,
}

impl ImportEngine {
    /// Creates an engine that reports through the `log` facade.
    pub fn new(row_source: Arc<dyn RowSource>, target_store: Arc<dyn TargetStore>) -> Self {
        Self {
            row_source,
            target_store,
            observer: Arc::new(LogObserver),
            identity: IdentityMapper::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ImportObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Identity map of the latest run, complete or not.
    pub fn identity_map(&self) -> &IdentityMapper {
        &self.identity
    }

    /// Imports `specs` in order.
    ///
    /// Every spec is validated before the first row is read, so a
    /// configuration error never leaves partial writes behind. Each call starts
    /// from an empty identity map.
    pub fn import(&mut self, specs: &[TableSpec]) -> Result<ImportReport> {
        let start_time = Instant::now();
        info!("Starting import of {} tables...", specs.len());

        self.identity = IdentityMapper::new();
        for spec in specs {
            spec.validate()?;
        }

        let mut tables = Vec::with_capacity(specs.len());

        for spec in specs {
            match spec.target() {
                Some(entity_type) => tables.push(self.import_table(spec, entity_type)?),
                None => {
                    self.observer.table_skipped(spec.name());
                    tables.push(TableReport::skipped(spec));
                }
            }
        }

        let report = ImportReport::new(tables, start_time.elapsed().as_secs_f64(), &self.identity);
        info!(
            "Import finished: {} rows ({} created, {} updated, {} unchanged) in {:.2}s",
            report.total_rows(),
            report.total_created(),
            report.total_updated(),
            report.total_unchanged(),
            report.duration_secs
        );
        Ok(report)
    }

    fn import_table(&mut self, spec: &TableSpec, entity_type: &EntityType) -> Result<TableReport> {
        info!("Importing {} into {}", spec.source(), entity_type);

        let rows = self.row_source.fetch_rows(spec.source())?;
        let mut report = TableReport::new(spec, entity_type);

        for row in &rows {
            let outcome =
                self.import_row(spec, entity_type, row)
                    .map_err(|e| ImportError::RowFailed {
                        table: spec.name().to_string(),
                        row_id: describe_row_id(row),
                        source: Box::new(e),
                    })?;
            report.count(outcome);
        }

        info!(
            "Imported {} rows from {} ({} created, {} updated, {} unchanged)",
            report.rows,
            spec.name(),
            report.created,
            report.updated,
            report.unchanged
        );
        Ok(report)
    }

    fn import_row(&mut self, spec: &TableSpec, entity_type: &EntityType, row: &Row) -> Result<RowOutcome> {
        let source_id = row.id(spec.name())?;

        let existing = match (spec.natural_key_field(), spec.mapped_natural_key_field()) {
            (Some(field), Some(mapped)) => {
                let value = row.get(field).ok_or_else(|| ImportError::MissingField {
                    table: spec.name().to_string(),
                    field: field.to_string(),
                })?;
                self.target_store.find_one(entity_type, mapped, value)?
            }
            _ => None,
        };

        let resolved = ForeignKeyResolver::new(
            &self.identity,
            self.target_store.as_ref(),
            self.observer.as_ref(),
        )
        .resolve(spec, row)?;
        let attributes = spec.map_attributes(&resolved)?;

        let (record, outcome) = match existing {
            Some(current) => self.update_existing(entity_type, current, &attributes)?,
            None => {
                let created = self.target_store.create(entity_type, attributes)?;
                self.observer.record_created(entity_type, &created.id);
                (created, RowOutcome::Created)
            }
        };

        self.identity.record(entity_type, source_id, record.id)?;
        Ok(outcome)
    }

    fn update_existing(
        &self,
        entity_type: &EntityType,
        current: Record,
        incoming: &Attributes,
    ) -> Result<(Record, RowOutcome)> {
        let changes = changed_attributes(&current, incoming);
        if changes.is_empty() {
            self.observer.record_unchanged(entity_type, &current.id);
            return Ok((current, RowOutcome::Unchanged));
        }

        let updated = self
            .target_store
            .update(entity_type, &current.id, changes.clone())?;

        for (field, new) in &changes {
            let old = current.get(field).unwrap_or(&Value::Null);
            self.observer
                .field_changed(entity_type, &current.id, field, old, new);
        }
        self.observer
            .record_updated(entity_type, &updated.id, changes.len());
        Ok((updated, RowOutcome::Updated))
    }
}

/// Attributes of `current` that `incoming` overwrites.
///
/// Only attributes the record already has are considered. An incoming value
/// that is missing or empty never blanks existing data.
pub fn changed_attributes(current: &Record, incoming: &Attributes) -> Attributes {
    current
        .attributes
        .iter()
        .filter_map(|(field, old)| match incoming.get(field) {
            Some(new) if !new.is_empty() && new != old => Some((field.clone(), new.clone())),
            _ => None,
        })
        .collect()
}

fn describe_row_id(row: &Row) -> String {
    match row.get(ID_FIELD) {
        Some(value) => value
            .to_key()
            .map(|key| key.to_string())
            .unwrap_or_else(|_| value.to_string()),
        None => format!("<no {}>", ID_FIELD),
    }
}
