//! Target store persisted as a single JSON document on local disk.

use super::{StoreDocument, StoreState};
use crate::domain::entity::EntityType;
use crate::domain::errors::{ImportError, Result};
use crate::domain::record::Record;
use crate::domain::value::{Attributes, RecordKey, Value};
use crate::ports::target_store::TargetStore;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// `TargetStore` that rewrites its JSON file after every create or update.
///
/// Each write is durable on its own; there is no run-level transaction, so a
/// failed import leaves every record written before the failure in place.
#[derive(Debug)]
pub struct JsonFileTargetStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileTargetStore {
    /// Opens `path`, or starts an empty store if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let doc: StoreDocument = serde_json::from_reader(reader)?;
            info!("Loaded target store from {}", path.display());
            StoreState::from(doc)
        } else {
            info!("Target store {} not found, starting empty", path.display());
            StoreState::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|e| ImportError::StoreError(format!("store lock poisoned: {}", e)))
    }

    /// Writes to a sibling temp file first so a crash mid-write never leaves
    /// a truncated store behind.
    fn persist(&self, state: &StoreState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &StoreDocument::from(state))?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("Persisted target store to {}", self.path.display());
        Ok(())
    }
}

impl TargetStore for JsonFileTargetStore {
    fn find_one(
        &self,
        entity_type: &EntityType,
        field: &str,
        value: &Value,
    ) -> Result<Option<Record>> {
        Ok(self.lock()?.find_one(entity_type, field, value))
    }

    fn find_by_id(&self, entity_type: &EntityType, id: &RecordKey) -> Result<Option<Record>> {
        Ok(self.lock()?.find_by_id(entity_type, id))
    }

    fn create(&self, entity_type: &EntityType, attributes: Attributes) -> Result<Record> {
        let mut state = self.lock()?;
        let record = state.create(entity_type, attributes);
        self.persist(&state)?;
        Ok(record)
    }

    fn update(
        &self,
        entity_type: &EntityType,
        id: &RecordKey,
        attributes: Attributes,
    ) -> Result<Record> {
        let mut state = self.lock()?;
        let record = state.update(entity_type, id, attributes)?;
        self.persist(&state)?;
        Ok(record)
    }
}
