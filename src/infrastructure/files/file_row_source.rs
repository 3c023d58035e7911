//! Row source reading exported tables from a local directory tree.
//!
//! Layout: `<root>/<database>/<table>.json`, `<table>.csv` or `<table>.csv.gz`.
//! JSON files hold an array of objects; CSV files have a header line.

use crate::domain::errors::{ImportError, Result};
use crate::domain::row::Row;
use crate::domain::table_spec::SourceLocation;
use crate::domain::value::Value;
use crate::ports::row_source::RowSource;
use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Json,
    Csv,
    CsvGz,
}

impl FileKind {
    const ALL: [FileKind; 3] = [FileKind::Json, FileKind::Csv, FileKind::CsvGz];

    fn extension(self) -> &'static str {
        match self {
            FileKind::Json => "json",
            FileKind::Csv => "csv",
            FileKind::CsvGz => "csv.gz",
        }
    }
}

/// `RowSource` over JSON and (optionally gzipped) CSV files.
pub struct FileRowSource {
    root: PathBuf,
    delimiter: u8,
}

impl FileRowSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn locate(&self, location: &SourceLocation) -> Result<(PathBuf, FileKind)> {
        let dir = self.root.join(&location.database);
        FileKind::ALL
            .iter()
            .map(|kind| {
                (
                    dir.join(format!("{}.{}", location.table, kind.extension())),
                    *kind,
                )
            })
            .find(|(path, _)| path.is_file())
            .ok_or_else(|| ImportError::SourceError {
                location: location.to_string(),
                reason: format!(
                    "no {}.json, {}.csv or {}.csv.gz in {}",
                    location.table,
                    location.table,
                    location.table,
                    dir.display()
                ),
            })
    }

    fn read_json(&self, path: &Path, location: &SourceLocation) -> Result<Vec<Row>> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| ImportError::SourceError {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    fn read_csv<R: Read>(&self, reader: R, location: &SourceLocation) -> Result<Vec<Row>> {
        let source_err = |e: csv::Error| ImportError::SourceError {
            location: location.to_string(),
            reason: e.to_string(),
        };

        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::Headers)
            .from_reader(reader);
        let headers = rdr.headers().map_err(source_err)?.clone();

        let mut rows: Vec<Row> = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(source_err)?;
            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(name, cell)| (name, infer_value(cell)))
                    .collect(),
            );
        }
        Ok(rows)
    }
}

impl RowSource for FileRowSource {
    fn fetch_rows(&self, location: &SourceLocation) -> Result<Vec<Row>> {
        let (path, kind) = self.locate(location)?;
        debug!("Reading {} from {}", location, path.display());

        let rows = match kind {
            FileKind::Json => self.read_json(&path, location)?,
            FileKind::Csv => self.read_csv(BufReader::new(File::open(&path)?), location)?,
            FileKind::CsvGz => {
                let decoder = GzDecoder::new(BufReader::new(File::open(&path)?));
                self.read_csv(decoder, location)?
            }
        };

        info!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

/// Best-effort typing of a CSV cell.
///
/// A cell only becomes a number when the number prints back as the exact
/// same text, so codes like `00501` or `+4712345678` stay text.
pub fn infer_value(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        if i.to_string() == cell {
            return Value::Int(i);
        }
    }
    if let Ok(x) = cell.parse::<f64>() {
        if x.is_finite() && x.to_string() == cell {
            return Value::Float(x);
        }
    }
    match cell {
        "true" | "TRUE" => Value::Bool(true),
        "false" | "FALSE" => Value::Bool(false),
        _ => Value::Text(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value(""), Value::Null);
        assert_eq!(infer_value("12"), Value::Int(12));
        assert_eq!(infer_value("-1.5"), Value::Float(-1.5));
        assert_eq!(infer_value("true"), Value::Bool(true));
        assert_eq!(infer_value("NaN"), Value::from("NaN"));
        assert_eq!(infer_value("a@x.com"), Value::from("a@x.com"));
    }

    #[test]
    fn test_infer_value_keeps_code_like_text() {
        assert_eq!(infer_value("00501"), Value::from("00501"));
        assert_eq!(infer_value("+4712345678"), Value::from("+4712345678"));
        assert_eq!(infer_value("1e3"), Value::from("1e3"));
        assert_eq!(infer_value("1.50"), Value::from("1.50"));
        assert_eq!(infer_value("-0"), Value::from("-0"));
        assert_eq!(infer_value("0"), Value::Int(0));
        assert_eq!(infer_value("0.25"), Value::Float(0.25));
    }

    #[test]
    fn test_csv_codes_survive_reading() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("legacy");
        std::fs::create_dir_all(&db).unwrap();
        std::fs::write(db.join("sites.csv"), "id,zip,phone,code\n1,00501,+4712345678,1e3\n").unwrap();

        let rows = FileRowSource::new(dir.path())
            .fetch_rows(&SourceLocation::new("legacy", "sites"))
            .unwrap();
        assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("zip"), Some(&Value::from("00501")));
        assert_eq!(rows[0].get("phone"), Some(&Value::from("+4712345678")));
        assert_eq!(rows[0].get("code"), Some(&Value::from("1e3")));
    }

    #[test]
    fn test_reads_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("legacy");
        std::fs::create_dir_all(&db).unwrap();
        std::fs::write(
            db.join("users.json"),
            r#"[{"id": 1, "email": "a@x.com", "name": "A", "active": true}]"#,
        )
        .unwrap();
        std::fs::write(db.join("posts.csv"), "id, user_id ,title\n1,1,Hello\n2,1,\n").unwrap();

        let source = FileRowSource::new(dir.path());

        let users = source
            .fetch_rows(&SourceLocation::new("legacy", "users"))
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].get("email"), Some(&Value::from("a@x.com")));
        assert_eq!(users[0].get("active"), Some(&Value::Bool(true)));

        let posts = source
            .fetch_rows(&SourceLocation::new("legacy", "posts"))
            .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].get("user_id"), Some(&Value::Int(1)));
        assert_eq!(posts[1].get("title"), Some(&Value::Null));
    }

    #[test]
    fn test_reads_gzipped_csv_with_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("legacy");
        std::fs::create_dir_all(&db).unwrap();

        let file = File::create(db.join("tags.csv.gz")).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::fast());
        encoder.write_all(b"id;slug\n7;rust\n").unwrap();
        encoder.finish().unwrap();

        let source = FileRowSource::new(dir.path()).with_delimiter(b';');
        let rows = source
            .fetch_rows(&SourceLocation::new("legacy", "tags"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("slug"), Some(&Value::from("rust")));
    }

    #[test]
    fn test_missing_table_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileRowSource::new(dir.path());
        assert!(matches!(
            source.fetch_rows(&SourceLocation::new("legacy", "nope")),
            Err(ImportError::SourceError { .. })
        ));
    }
}
