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

//! # Table Specifications
//!
//! A `TableSpec` is the declarative description of one source table:
//!
//! 1. **Where** the rows come from (`SourceLocation`).
//! 2. **What** they become in the target store (`EntityType`), if anything.
//! 3. **How** to recognise a record that was already imported (natural key).
//! 4. **How** source columns are renamed into target attribute names.
//! 5. **Which** columns are foreign keys into other entity types.
//!
//! Everything in here is pure: no I/O, no logging.

use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::row::{Row, ID_FIELD};
use crate::domain::value::Attributes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque pointer to a source table, handed to the `RowSource` as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Name of the source connection / database.
    pub database: String,
    /// Table name inside that database.
    pub table: String,
}

impl SourceLocation {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// Which source value is used to look up the referenced record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyResolution {
    /// Look up the current row's own `id`. Only meaningful for companion
    /// tables that share identifiers one-to-one with the referenced table.
    #[default]
    OwnId,
    /// Look up the value stored in the foreign key column itself.
    FieldValue,
}

/// A foreign key column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: String,
    pub entity_type: EntityType,
    pub resolution: KeyResolution,
}

/// Declarative description of one source table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    source: SourceLocation,
    target: Option<EntityType>,
    natural_key_field: Option<String>,
    field_mapping: IndexMap<String, String>,
    foreign_keys: IndexMap<String, ForeignKey>,
}

impl TableSpec {
    pub fn builder(source: SourceLocation) -> TableSpecBuilder {
        TableSpecBuilder {
            spec: TableSpec {
                source,
                target: None,
                natural_key_field: None,
                field_mapping: IndexMap::new(),
                foreign_keys: IndexMap::new(),
            },
        }
    }

    /// Human-readable name used in logs, reports and errors.
    pub fn name(&self) -> &str {
        &self.source.table
    }

    pub fn source(&self) -> &SourceLocation {
        &self.source
    }

    /// `None` marks a reference-only table that the engine skips.
    pub fn target(&self) -> Option<&EntityType> {
        self.target.as_ref()
    }

    pub fn natural_key_field(&self) -> Option<&str> {
        self.natural_key_field.as_deref()
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.values()
    }

    /// Target-side name of a source field. Unmapped fields keep their name.
    pub fn map_field<'a>(&'a self, field: &'a str) -> &'a str {
        self.field_mapping
            .get(field)
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// The natural key as named in the target store.
    pub fn mapped_natural_key_field(&self) -> Option<&str> {
        self.natural_key_field
            .as_deref()
            .map(|field| self.map_field(field))
    }

    /// Renames every field of `row` into target vocabulary.
    ///
    /// The `id` field is never copied. Two fields landing on the same target
    /// name is a configuration error and is reported, never merged.
    pub fn map_attributes(&self, row: &Row) -> Result<Attributes> {
        let mut attributes = Attributes::with_capacity(row.len());
        let mut origins: IndexMap<&str, &str> = IndexMap::with_capacity(row.len());

        for (field, value) in row.fields() {
            if field == ID_FIELD {
                continue;
            }
            let target = self.map_field(field);
            if target == ID_FIELD {
                return Err(self.id_target_error(field));
            }
            if let Some(first) = origins.insert(target, field) {
                return Err(ImportError::AttributeMappingCollision {
                    table: self.name().to_string(),
                    target_field: target.to_string(),
                    first: first.to_string(),
                    second: field.to_string(),
                });
            }
            attributes.insert(target.to_string(), value.clone());
        }

        Ok(attributes)
    }

    /// Checks the parts of the declaration that do not depend on row data.
    pub fn validate(&self) -> Result<()> {
        let mut origins: IndexMap<&str, &str> = IndexMap::new();
        for (source, target) in &self.field_mapping {
            if source == ID_FIELD {
                continue;
            }
            if target == ID_FIELD {
                return Err(self.id_target_error(source));
            }
            if let Some(first) = origins.insert(target.as_str(), source.as_str()) {
                return Err(ImportError::AttributeMappingCollision {
                    table: self.name().to_string(),
                    target_field: target.clone(),
                    first: first.to_string(),
                    second: source.clone(),
                });
            }
        }

        if let Some(key) = &self.natural_key_field {
            if key.trim().is_empty() || key == ID_FIELD {
                return Err(ImportError::ConfigError(format!(
                    "{}: natural key field must name a business attribute, got {:?}",
                    self.name(),
                    key
                )));
            }
        }

        if self.foreign_keys.contains_key(ID_FIELD) {
            return Err(ImportError::ConfigError(format!(
                "{}: the {} field cannot be declared as a foreign key",
                self.name(),
                ID_FIELD
            )));
        }

        Ok(())
    }

    fn id_target_error(&self, source: &str) -> ImportError {
        ImportError::ConfigError(format!(
            "{}: field {} cannot be mapped onto the reserved {} attribute",
            self.name(),
            source,
            ID_FIELD
        ))
    }
}

/// Builder for `TableSpec`; `build` runs `validate`.
#[derive(Debug, Clone)]
pub struct TableSpecBuilder {
    spec: TableSpec,
}

impl TableSpecBuilder {
    pub fn target(mut self, entity_type: EntityType) -> Self {
        self.spec.target = Some(entity_type);
        self
    }

    pub fn natural_key(mut self, field: impl Into<String>) -> Self {
        self.spec.natural_key_field = Some(field.into());
        self
    }

    pub fn map_field(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.spec.field_mapping.insert(source.into(), target.into());
        self
    }

    /// Declares a foreign key resolved by the row's own id.
    pub fn foreign_key(self, field: impl Into<String>, entity_type: EntityType) -> Self {
        self.foreign_key_with(field, entity_type, KeyResolution::OwnId)
    }

    pub fn foreign_key_with(
        mut self,
        field: impl Into<String>,
        entity_type: EntityType,
        resolution: KeyResolution,
    ) -> Self {
        let field = field.into();
        self.spec.foreign_keys.insert(
            field.clone(),
            ForeignKey {
                field,
                entity_type,
                resolution,
            },
        );
        self
    }

    pub fn build(self) -> Result<TableSpec> {
        self.spec.validate()?;
        Ok(self.spec)
    }

    #[cfg(test)]
    pub(crate) fn build_unchecked(self) -> TableSpec {
        self.spec
    }
}
