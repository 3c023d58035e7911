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

use crate::domain::entity::EntityRegistry;
use crate::domain::errors::{ImportError, Result};
use crate::domain::table_spec::{KeyResolution, SourceLocation, TableSpec};
use clap::Parser;
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Entity types known to the target store.
    pub entities: Vec<String>,
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    /// Tables in import order. Referenced tables must come first.
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Exported files under `<data_dir>/<database>/<table>.{json,csv,csv.gz}`.
    Files {
        data_dir: String,
        #[serde(default)]
        delimiter: Option<String>,
    },
    /// Live Oracle databases, keyed by the `database` name tables refer to.
    Oracle {
        connections: HashMap<String, OracleConnectionConfig>,
        #[serde(default)]
        prefetch_rows: Option<u32>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleConnectionConfig {
    pub username: String,
    pub password: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub service: String,
    /// Full connect string; wins over host/port/service when set.
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub pool_size: Option<u32>,
}

impl OracleConnectionConfig {
    pub fn get_connection_string(&self) -> String {
        match &self.connection_string {
            Some(s) => s.clone(),
            None => format!("//{}:{}/{}", self.host, self.port, self.service),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TargetConfig {
    /// JSON store file. Without it the run works against an in-memory
    /// store and nothing is persisted.
    #[serde(default)]
    pub store_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub database: String,
    pub table: String,
    /// Target entity type. Omitted for reference-only tables.
    #[serde(default, alias = "model")]
    pub entity: Option<String>,
    #[serde(default)]
    pub natural_key: Option<String>,
    #[serde(default)]
    pub field_mapping: IndexMap<String, String>,
    #[serde(default)]
    pub foreign_keys: IndexMap<String, ForeignKeyConfig>,
}

/// Either `user_id: User` or `user_id: { entity: User, resolve_by: field_value }`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum ForeignKeyConfig {
    Entity(String),
    Detailed {
        entity: String,
        #[serde(default)]
        resolve_by: KeyResolution,
    },
}

impl ForeignKeyConfig {
    fn entity(&self) -> &str {
        match self {
            ForeignKeyConfig::Entity(entity) => entity,
            ForeignKeyConfig::Detailed { entity, .. } => entity,
        }
    }

    fn resolution(&self) -> KeyResolution {
        match self {
            ForeignKeyConfig::Entity(_) => KeyResolution::default(),
            ForeignKeyConfig::Detailed { resolve_by, .. } => *resolve_by,
        }
    }
}

fn default_report_dir() -> String {
    "./reports".to_string()
}

fn default_port() -> u16 {
    1521
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: String,

    /// Read exported files from this directory instead of the configured source
    #[arg(long)]
    pub data_dir: Option<String>,
    /// JSON store file to import into
    #[arg(short, long)]
    pub target: Option<String>,
    #[arg(long)]
    pub report_dir: Option<String>,
    /// Import into an in-memory store; nothing is persisted
    #[arg(long)]
    pub dry_run: bool,
}

impl AppConfig {
    /// Loads YAML, or JSON when the path ends in `.json`.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ImportError::ConfigError(format!("cannot read {}: {}", path, e)))?;

        let config = if path.ends_with(".json") {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        };

        config.map_err(|e| ImportError::ConfigError(format!("{}: {}", path, e)))
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(dir) = &args.data_dir {
            let delimiter = match &self.source {
                SourceConfig::Files { delimiter, .. } => delimiter.clone(),
                SourceConfig::Oracle { .. } => {
                    info!("--data-dir given: reading exported files instead of Oracle");
                    None
                }
            };
            self.source = SourceConfig::Files {
                data_dir: dir.clone(),
                delimiter,
            };
        }
        if let Some(t) = &args.target {
            self.target.store_path = Some(t.clone());
        }
        if args.dry_run {
            self.target.store_path = None;
        }
        if let Some(r) = &args.report_dir {
            self.report_dir = r.clone();
        }
    }

    /// Checks the document itself. Entity names and table declarations are
    /// checked by `build_table_specs`.
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(ImportError::ConfigError(
                "at least one entity type must be configured".to_string(),
            ));
        }
        if self.tables.is_empty() {
            return Err(ImportError::ConfigError("no tables configured".to_string()));
        }

        match &self.source {
            SourceConfig::Files { data_dir, .. } => {
                if data_dir.trim().is_empty() {
                    return Err(ImportError::ConfigError(
                        "source.data_dir must not be empty".to_string(),
                    ));
                }
                self.delimiter()?;
            }
            SourceConfig::Oracle { connections, .. } => {
                for table in &self.tables {
                    if !connections.contains_key(&table.database) {
                        return Err(ImportError::ConfigError(format!(
                            "table {} refers to unknown Oracle connection {}",
                            table.table, table.database
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// CSV delimiter for file sources; a comma unless configured.
    pub fn delimiter(&self) -> Result<u8> {
        match &self.source {
            SourceConfig::Files {
                delimiter: Some(d), ..
            } => match d.as_bytes() {
                [b] => Ok(*b),
                _ => Err(ImportError::ConfigError(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    d
                ))),
            },
            _ => Ok(b','),
        }
    }

    pub fn build_registry(&self) -> Result<EntityRegistry> {
        EntityRegistry::from_names(&self.entities)
    }

    /// Turns table entries into validated `TableSpec`s, in configured order.
    pub fn build_table_specs(&self, registry: &EntityRegistry) -> Result<Vec<TableSpec>> {
        self.tables
            .iter()
            .map(|table| {
                let mut builder =
                    TableSpec::builder(SourceLocation::new(&table.database, &table.table));

                if let Some(entity) = &table.entity {
                    builder = builder.target(registry.resolve(entity)?);
                }
                if let Some(key) = &table.natural_key {
                    builder = builder.natural_key(key);
                }
                for (source, target) in &table.field_mapping {
                    builder = builder.map_field(source, target);
                }
                for (field, fk) in &table.foreign_keys {
                    builder =
                        builder.foreign_key_with(field, registry.resolve(fk.entity())?, fk.resolution());
                }

                builder.build()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
entities: [User, Profile, Post]
source:
  kind: files
  data_dir: ./export
  delimiter: ";"
target:
  store_path: ./store.json
tables:
  - database: legacy
    table: countries
  - database: legacy
    table: users
    entity: User
    natural_key: mail
    field_mapping:
      mail: email
  - database: legacy
    table: profiles
    model: Profile
    foreign_keys:
      user_id: User
  - database: legacy
    table: posts
    entity: Post
    foreign_keys:
      author_id: { entity: User, resolve_by: field_value }
"#;

    fn write_config(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_config() {
        let file = write_config(YAML, ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).expect("Failed to parse config");

        assert_eq!(config.entities.len(), 3);
        assert_eq!(config.tables.len(), 4);
        assert_eq!(config.target.store_path.as_deref(), Some("./store.json"));
        assert_eq!(config.report_dir, "./reports");
        assert_eq!(config.delimiter().unwrap(), b';');
        config.validate().unwrap();
    }

    #[test]
    fn test_build_table_specs() {
        let file = write_config(YAML, ".yml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        let registry = config.build_registry().unwrap();
        let specs = config.build_table_specs(&registry).unwrap();

        assert!(specs[0].target().is_none());
        assert_eq!(specs[1].mapped_natural_key_field(), Some("email"));
        assert_eq!(specs[2].target().map(|e| e.name()), Some("Profile"));

        let profile_fk: Vec<_> = specs[2].foreign_keys().collect();
        assert_eq!(profile_fk[0].resolution, KeyResolution::OwnId);
        let post_fk: Vec<_> = specs[3].foreign_keys().collect();
        assert_eq!(post_fk[0].field, "author_id");
        assert_eq!(post_fk[0].entity_type.name(), "User");
        assert_eq!(post_fk[0].resolution, KeyResolution::FieldValue);
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let file = write_config(&YAML.replace("entity: Post", "entity: Comment"), ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        let registry = config.build_registry().unwrap();
        assert!(matches!(
            config.build_table_specs(&registry),
            Err(ImportError::UnknownEntityType(name)) if name == "Comment"
        ));
    }

    #[test]
    fn test_json_oracle_config() {
        let json = r#"{
            "entities": ["User"],
            "source": {
                "kind": "oracle",
                "prefetch_rows": 500,
                "connections": {
                    "legacy": {"username": "scott", "host": "db", "service": "ORCL", "schema": "APP"}
                }
            },
            "tables": [
                {"database": "legacy", "table": "USERS", "entity": "User"},
                {"database": "archive", "table": "USERS_OLD"}
            ]
        }"#;
        let file = write_config(json, ".json");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();

        match &config.source {
            SourceConfig::Oracle { connections, prefetch_rows } => {
                assert_eq!(*prefetch_rows, Some(500));
                assert_eq!(connections["legacy"].get_connection_string(), "//db:1521/ORCL");
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert!(config.target.store_path.is_none());
        assert!(matches!(config.validate(), Err(ImportError::ConfigError(msg)) if msg.contains("archive")));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let file = write_config(YAML, ".yaml");
        let mut config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();

        let args = CliArgs::parse_from([
            "table_importer",
            "--config",
            "ignored.yaml",
            "--data-dir",
            "/tmp/dump",
            "--report-dir",
            "/tmp/reports",
            "--dry-run",
        ]);
        config.merge_cli(&args);

        match &config.source {
            SourceConfig::Files { data_dir, delimiter } => {
                assert_eq!(data_dir, "/tmp/dump");
                assert_eq!(delimiter.as_deref(), Some(";"));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert!(config.target.store_path.is_none());
        assert_eq!(config.report_dir, "/tmp/reports");
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let file = write_config(&YAML.replace("delimiter: \";\"", "delimiter: \"::\""), ".yaml");
        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(matches!(config.validate(), Err(ImportError::ConfigError(_))));
    }
}
