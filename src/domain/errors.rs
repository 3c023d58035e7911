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

//! Core error definitions for the Table Importer.
//!
//! This module provides a centralized `ImportError` enum and a `Result` type
//! used throughout the application. The first four variants are the fatal
//! import conditions callers are expected to tell apart; the rest cover
//! configuration and I/O failures in the adapters.

use thiserror::Error;

/// Error types encountered during an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// A foreign key points at an entity type that has not been imported yet.
    /// Usually the tables were added in the wrong order.
    #[error("Mapping not found: no {entity_type} records have been imported in this run")]
    MappingNotFound { entity_type: String },

    /// The entity type was imported, but not the referenced source row.
    #[error("Identifier not found: {entity_type} has no mapping for source id {source_id}")]
    IdentifierNotFound {
        entity_type: String,
        source_id: String,
    },

    /// A mapping exists but the target record it names is gone from the store.
    #[error("Dangling foreign key {field}: {entity_type} with id {target_id} was not found in the target store")]
    DanglingForeignKey {
        field: String,
        entity_type: String,
        target_id: String,
    },

    #[error("Attribute mapping collision in {table}: {first} and {second} both map to {target_field}")]
    AttributeMappingCollision {
        table: String,
        target_field: String,
        first: String,
        second: String,
    },

    #[error("Conflicting mapping for {entity_type} source id {source_id}: already mapped to {existing}, refusing {attempted}")]
    ConflictingMapping {
        entity_type: String,
        source_id: String,
        existing: String,
        attempted: String,
    },

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Missing field {field} in a row of {table}")]
    MissingField { table: String, field: String },

    #[error("Invalid identifier value: {0}")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reading {location} failed: {reason}")]
    SourceError { location: String, reason: String },

    #[error("Target store error: {0}")]
    StoreError(String),

    /// Context wrapper naming the table and row that aborted the run.
    #[error("Import of {table} row {row_id} failed: {source}")]
    RowFailed {
        table: String,
        row_id: String,
        #[source]
        source: Box<ImportError>,
    },

    /// Names the foreign key column whose lookup failed.
    #[error("Foreign key {field}: {source}")]
    ForeignKeyFailed {
        field: String,
        #[source]
        source: Box<ImportError>,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Oracle error: {0}")]
    OracleError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ImportError {
    /// Strips `RowFailed` and `ForeignKeyFailed` context and returns the
    /// error that actually stopped the run.
    pub fn root_cause(&self) -> &ImportError {
        match self {
            ImportError::RowFailed { source, .. } => source.root_cause(),
            ImportError::ForeignKeyFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<oracle::Error> for ImportError {
    fn from(e: oracle::Error) -> Self {
        ImportError::OracleError(e.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::SerializationError(e.to_string())
    }
}

/// A specialized Result type for the Table Importer.
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_row_context() {
        let err = ImportError::RowFailed {
            table: "orders".to_string(),
            row_id: "7".to_string(),
            source: Box::new(ImportError::MappingNotFound {
                entity_type: "Customer".to_string(),
            }),
        };

        assert!(matches!(
            err.root_cause(),
            ImportError::MappingNotFound { entity_type } if entity_type == "Customer"
        ));
        assert!(err.to_string().contains("orders row 7"));
    }

    #[test]
    fn test_root_cause_unwraps_field_context() {
        let err = ImportError::RowFailed {
            table: "orders".to_string(),
            row_id: "7".to_string(),
            source: Box::new(ImportError::ForeignKeyFailed {
                field: "customer_id".to_string(),
                source: Box::new(ImportError::IdentifierNotFound {
                    entity_type: "Customer".to_string(),
                    source_id: "3".to_string(),
                }),
            }),
        };

        assert!(matches!(
            err.root_cause(),
            ImportError::IdentifierNotFound { source_id, .. } if source_id == "3"
        ));
        assert!(err.to_string().contains("Foreign key customer_id"));
    }
}
