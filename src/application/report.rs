//! Run summaries: per-table counters plus the final identity map.

use crate::domain::entity::EntityType;
use crate::domain::errors::Result;
use crate::domain::identity_map::IdentityMapper;
use crate::domain::table_spec::TableSpec;
use crate::domain::value::RecordKey;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What happened to a single imported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    /// An existing record matched and nothing needed changing.
    Unchanged,
}

/// Counters for one table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableReport {
    pub table: String,
    pub source: String,
    pub entity_type: Option<String>,
    pub skipped: bool,
    pub rows: u64,
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
}

impl TableReport {
    pub fn new(spec: &TableSpec, entity_type: &EntityType) -> Self {
        Self {
            table: spec.name().to_string(),
            source: spec.source().to_string(),
            entity_type: Some(entity_type.to_string()),
            skipped: false,
            rows: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
        }
    }

    pub fn skipped(spec: &TableSpec) -> Self {
        Self {
            table: spec.name().to_string(),
            source: spec.source().to_string(),
            entity_type: None,
            skipped: true,
            rows: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
        }
    }

    pub fn count(&mut self, outcome: RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// The "Report Card" of a finished import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub tables: Vec<TableReport>,
    pub duration_secs: f64,
    pub identity_map: BTreeMap<String, BTreeMap<String, RecordKey>>,
}

impl ImportReport {
    pub fn new(tables: Vec<TableReport>, duration_secs: f64, identity: &IdentityMapper) -> Self {
        Self {
            tables,
            duration_secs,
            identity_map: identity.snapshot(),
        }
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn total_created(&self) -> u64 {
        self.tables.iter().map(|t| t.created).sum()
    }

    pub fn total_updated(&self) -> u64 {
        self.tables.iter().map(|t| t.updated).sum()
    }

    pub fn total_unchanged(&self) -> u64 {
        self.tables.iter().map(|t| t.unchanged).sum()
    }

    /// Writes `report_<timestamp>.json` into `dir` and returns its path.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let report = json!({
            "summary": {
                "tables": self.tables.len(),
                "skipped_tables": self.tables.iter().filter(|t| t.skipped).count(),
                "total_rows": self.total_rows(),
                "created": self.total_created(),
                "updated": self.total_updated(),
                "unchanged": self.total_unchanged(),
                "total_duration_seconds": self.duration_secs,
            },
            "details": self.tables,
            "identity_map": self.identity_map,
        });

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        std::fs::create_dir_all(dir)?;
        let report_path = dir.join(format!("report_{}.json", timestamp));
        let file = std::fs::File::create(&report_path)?;
        serde_json::to_writer_pretty(file, &report)?;

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityRegistry;
    use crate::domain::table_spec::SourceLocation;

    #[test]
    fn test_counts_and_report_file() {
        let registry = EntityRegistry::from_names(["User"]).unwrap();
        let user = registry.resolve("User").unwrap();
        let spec = TableSpec::builder(SourceLocation::new("legacy", "users"))
            .target(user.clone())
            .build()
            .unwrap();
        let reference = TableSpec::builder(SourceLocation::new("legacy", "countries"))
            .build()
            .unwrap();

        let mut table = TableReport::new(&spec, &user);
        table.count(RowOutcome::Created);
        table.count(RowOutcome::Created);
        table.count(RowOutcome::Unchanged);

        let mut identity = IdentityMapper::new();
        identity
            .record(&user, RecordKey::Int(1), RecordKey::Int(10))
            .unwrap();

        let report = ImportReport::new(vec![table, TableReport::skipped(&reference)], 0.5, &identity);
        assert_eq!(report.total_rows(), 3);
        assert_eq!(report.total_created(), 2);
        assert_eq!(report.total_unchanged(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = report.write_to_dir(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("report_") && name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["skipped_tables"], 1);
        assert_eq!(written["identity_map"]["User"]["1"], 10);
        assert_eq!(written["details"][0]["source"], "legacy.users");
    }
}
