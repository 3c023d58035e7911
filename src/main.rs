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

use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process;
use std::sync::Arc;
use table_importer::application::import_engine::ImportEngine;
use table_importer::config::{AppConfig, CliArgs, SourceConfig};
use table_importer::infrastructure::files::file_row_source::FileRowSource;
use table_importer::infrastructure::oracle::oracle_row_source::OracleRowSource;
use table_importer::infrastructure::store::json_file::JsonFileTargetStore;
use table_importer::infrastructure::store::memory::InMemoryTargetStore;
use table_importer::ports::row_source::RowSource;
use table_importer::ports::target_store::TargetStore;

fn main() {
    // 1. Initialize Logging
    env_logger::init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let mut config = match AppConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Resolve entity types and table declarations up front
    let specs = match config
        .build_registry()
        .and_then(|registry| config.build_table_specs(&registry))
    {
        Ok(specs) => specs,
        Err(e) => {
            error!("Invalid table configuration: {}", e);
            process::exit(1);
        }
    };

    // 5. Initialize Hexagonal Components
    let row_source: Arc<dyn RowSource> = match &config.source {
        SourceConfig::Files { data_dir, .. } => {
            let delimiter = match config.delimiter() {
                Ok(d) => d,
                Err(e) => {
                    error!("Invalid configuration: {}", e);
                    process::exit(1);
                }
            };
            Arc::new(FileRowSource::new(data_dir).with_delimiter(delimiter))
        }
        SourceConfig::Oracle {
            connections,
            prefetch_rows,
        } => Arc::new(OracleRowSource::new(
            connections,
            prefetch_rows.unwrap_or(5000),
        )),
    };

    let target_store: Arc<dyn TargetStore> = match &config.target.store_path {
        Some(path) => match JsonFileTargetStore::open(path) {
            Ok(store) => {
                info!("Importing into {}", store.path().display());
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to open target store {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            info!("No target store configured; importing into memory (dry run)");
            Arc::new(InMemoryTargetStore::new())
        }
    };

    // 6. Run
    let mut engine = ImportEngine::new(row_source, target_store);
    let report = match engine.import(&specs) {
        Ok(report) => report,
        Err(e) => {
            error!("Import failed: {}", e);
            error!("Cause: {}", e.root_cause());
            info!(
                "{} identifier mappings were recorded before the failure",
                engine.identity_map().len()
            );
            process::exit(1);
        }
    };

    // 7. Report
    match report.write_to_dir(Path::new(&config.report_dir)) {
        Ok(path) => info!("Report written to {}", path.display()),
        Err(e) => error!("Failed to write report: {}", e),
    }

    info!(
        "Import complete: {} rows across {} tables ({} created, {} updated, {} unchanged) in {:.2}s",
        report.total_rows(),
        report.tables.len(),
        report.total_created(),
        report.total_updated(),
        report.total_unchanged(),
        report.duration_secs
    );
}
