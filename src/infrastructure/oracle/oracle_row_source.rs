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

//! Infrastructure adapter reading source tables from Oracle databases.

use crate::config::OracleConnectionConfig;
use crate::domain::errors::{ImportError, Result};
use crate::domain::row::Row;
use crate::domain::table_spec::SourceLocation;
use crate::domain::value::Value;
use crate::infrastructure::oracle::connection_manager::OracleConnectionManager;
use crate::infrastructure::oracle::sql_utils::build_select_all;
use crate::ports::row_source::RowSource;
use base64::{engine::general_purpose, Engine as _};
use log::{debug, info};
use oracle::sql_type::{OracleType, Timestamp};
use r2d2::Pool;
use std::collections::HashMap;
use std::time::Instant;

struct SourceDatabase {
    pool: Pool<OracleConnectionManager>,
    schema: Option<String>,
}

/// Concrete implementation of `RowSource` for Oracle.
///
/// Each configured database name gets its own connection pool. Pools are
/// built lazily: nothing connects until the first table of that database is
/// read.
pub struct OracleRowSource {
    databases: HashMap<String, SourceDatabase>,
    prefetch_rows: u32,
}

impl OracleRowSource {
    pub fn new(connections: &HashMap<String, OracleConnectionConfig>, prefetch_rows: u32) -> Self {
        let databases = connections
            .iter()
            .map(|(name, config)| {
                let manager = OracleConnectionManager::from_config(config);
                info!("Registering Oracle source {} at {}", name, manager.conn_str());
                let pool = Pool::builder()
                    .max_size(config.pool_size.unwrap_or(2))
                    .min_idle(Some(0))
                    .build_unchecked(manager);
                (
                    name.clone(),
                    SourceDatabase {
                        pool,
                        schema: config.schema.clone(),
                    },
                )
            })
            .collect();

        Self {
            databases,
            prefetch_rows,
        }
    }

    fn oracle_error(location: &SourceLocation, e: impl std::fmt::Display) -> ImportError {
        ImportError::SourceError {
            location: location.to_string(),
            reason: e.to_string(),
        }
    }
}

impl RowSource for OracleRowSource {
    fn fetch_rows(&self, location: &SourceLocation) -> Result<Vec<Row>> {
        let start_time = Instant::now();
        let database = self
            .databases
            .get(&location.database)
            .ok_or_else(|| ImportError::SourceError {
                location: location.to_string(),
                reason: format!("no Oracle connection named {}", location.database),
            })?;

        let conn = database
            .pool
            .get()
            .map_err(|e| Self::oracle_error(location, e))?;

        let sql = build_select_all(database.schema.as_deref(), &location.table);
        debug!("Executing: {}", sql);

        let mut stmt = conn
            .statement(&sql)
            .prefetch_rows(self.prefetch_rows)
            .build()?;
        let result_set = stmt.query(&[])?;

        // Column names are lower-cased so table specs use one vocabulary
        // across Oracle and file sources.
        let columns: Vec<(String, OracleType)> = result_set
            .column_info()
            .iter()
            .map(|c| (c.name().to_lowercase(), c.oracle_type().clone()))
            .collect();

        let mut rows = Vec::new();
        for row_res in result_set {
            let oracle_row = row_res?;
            let mut row = Row::new();
            for (i, (name, otype)) in columns.iter().enumerate() {
                row.set(name.clone(), oracle_value(&oracle_row, i, otype)?);
            }
            rows.push(row);
        }

        info!(
            "Fetched {} rows from {} in {:.2}s",
            rows.len(),
            location,
            start_time.elapsed().as_secs_f64()
        );
        Ok(rows)
    }
}

/// Converts one Oracle column into a `Value`.
fn oracle_value(row: &oracle::Row, i: usize, otype: &OracleType) -> Result<Value> {
    let value = match otype {
        OracleType::Number(_, _)
        | OracleType::Int64
        | OracleType::Float(_)
        | OracleType::BinaryFloat
        | OracleType::BinaryDouble => {
            let v: Option<String> = row.get(i)?;
            v.map(|s| numeric_value(&s)).unwrap_or(Value::Null)
        }
        OracleType::Date
        | OracleType::Timestamp(_)
        | OracleType::TimestampTZ(_)
        | OracleType::TimestampLTZ(_) => {
            let v: Option<Timestamp> = row.get(i)?;
            v.map(|ts| Value::Text(format_timestamp(&ts)))
                .unwrap_or(Value::Null)
        }
        OracleType::Raw(_) | OracleType::BLOB => {
            let v: Option<Vec<u8>> = row.get(i)?;
            v.map(|b| Value::Text(general_purpose::STANDARD.encode(b)))
                .unwrap_or(Value::Null)
        }
        OracleType::Boolean => {
            let v: Option<bool> = row.get(i)?;
            v.map(Value::Bool).unwrap_or(Value::Null)
        }
        _ => {
            let v: Option<String> = row.get(i)?;
            v.map(Value::Text).unwrap_or(Value::Null)
        }
    };
    Ok(value)
}

/// Oracle hands numbers over as text; keep integers integral.
fn numeric_value(s: &str) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    match s.parse::<f64>() {
        Ok(x) => Value::Float(x),
        Err(_) => Value::Text(s.to_string()),
    }
}

fn format_timestamp(ts: &Timestamp) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.nanosecond() / 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("42"), Value::Int(42));
        assert_eq!(numeric_value("-0.25"), Value::Float(-0.25));
        assert_eq!(
            numeric_value("123456789012345678901234567890"),
            Value::Float(1.2345678901234568e29)
        );
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Timestamp::new(2023, 10, 27, 14, 30, 45, 123456000).unwrap();
        assert_eq!(format_timestamp(&ts), "2023-10-27 14:30:45.123456");
    }

    #[test]
    fn test_unknown_database_fails_without_connecting() {
        let mut connections = HashMap::new();
        connections.insert(
            "legacy".to_string(),
            OracleConnectionConfig {
                username: "scott".to_string(),
                password: Some("tiger".to_string()),
                host: "localhost".to_string(),
                port: 1521,
                service: "XE".to_string(),
                connection_string: None,
                schema: Some("LEGACY".to_string()),
                pool_size: None,
            },
        );
        let source = OracleRowSource::new(&connections, 100);

        assert!(matches!(
            source.fetch_rows(&SourceLocation::new("other", "USERS")),
            Err(ImportError::SourceError { reason, .. }) if reason.contains("other")
        ));
    }
}
