//! Keyed stores of animal records.
//!
//! The reconciler only talks to an [`AnimalStore`]. Which implementation backs
//! it is decided once by the caller: [`MemoryStore`] for tests and one-shot
//! computations, [`JsonFileStore`] for a herd persisted between runs.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use herd_model::{AnimalRecord, CattleId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Keyed access to animal records.
pub trait AnimalStore {
    fn get(&self, id: &CattleId) -> Result<Option<AnimalRecord>>;

    /// Insert or replace the record keyed by its cattle id.
    fn upsert(&mut self, record: AnimalRecord) -> Result<()>;

    /// Returns `false` if no record existed.
    fn delete(&mut self, id: &CattleId) -> Result<bool>;

    /// All records, ordered by cattle id.
    fn list(&self) -> Result<Vec<AnimalRecord>>;
}

/// In-memory store keyed by cattle id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<CattleId, AnimalRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records; a later duplicate id replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = AnimalRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.cattle_id.clone(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AnimalRecord> {
        self.records.values()
    }
}

impl AnimalStore for MemoryStore {
    fn get(&self, id: &CattleId) -> Result<Option<AnimalRecord>> {
        Ok(self.records.get(id).cloned())
    }

    fn upsert(&mut self, record: AnimalRecord) -> Result<()> {
        self.records.insert(record.cattle_id.clone(), record);
        Ok(())
    }

    fn delete(&mut self, id: &CattleId) -> Result<bool> {
        Ok(self.records.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<AnimalRecord>> {
        Ok(self.records.values().cloned().collect())
    }
}

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of a [`JsonFileStore`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HerdSnapshot {
    version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    animals: Vec<AnimalRecord>,
}

/// Memory store loaded from and saved to a JSON snapshot.
///
/// Changes stay in memory until [`JsonFileStore::save`] is called.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the snapshot at `path`; a missing file yields an empty herd.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "store file missing, starting empty");
            return Ok(Self {
                path,
                memory: MemoryStore::new(),
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            operation: "read",
            path: path.clone(),
            source,
        })?;
        let snapshot: HerdSnapshot =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;
        if snapshot.version > SNAPSHOT_VERSION {
            tracing::warn!(
                path = %path.display(),
                version = snapshot.version,
                "store file written by a newer version"
            );
        }
        tracing::debug!(path = %path.display(), animals = snapshot.animals.len(), "store loaded");
        Ok(Self {
            path,
            memory: MemoryStore::from_records(snapshot.animals),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Write the snapshot via a temp file and rename.
    pub fn save(&self) -> Result<()> {
        let snapshot = HerdSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Some(Utc::now()),
            animals: self.memory.records().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|source| StoreError::Serialize { source })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|source| StoreError::Io {
                operation: "write",
                path: temp_path.clone(),
                source,
            })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), animals = self.memory.len(), "herd saved");
        Ok(())
    }
}

impl AnimalStore for JsonFileStore {
    fn get(&self, id: &CattleId) -> Result<Option<AnimalRecord>> {
        self.memory.get(id)
    }

    fn upsert(&mut self, record: AnimalRecord) -> Result<()> {
        self.memory.upsert(record)
    }

    fn delete(&mut self, id: &CattleId) -> Result<bool> {
        self.memory.delete(id)
    }

    fn list(&self) -> Result<Vec<AnimalRecord>> {
        self.memory.list()
    }
}
