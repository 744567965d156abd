//! Repository for persisting and reusing column mappings.
//!
//! Farms export the same herd book layout month after month, so a mapping
//! declared once can be saved under a name and loaded for later imports.
//!
//! # Storage Format
//!
//! Each mapping is a pretty-printed JSON file named `{NAME}.json`, where the
//! name is upper-cased and every non-alphanumeric character becomes `_`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herd_model::ColumnMapping;

/// Directory-backed store of named mappings.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

/// Summary of a stored mapping, as returned by [`MappingRepository::list`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMetadata {
    pub name: String,
    pub file_path: PathBuf,
    /// Mapped columns, not counting the cattle id column.
    pub column_count: usize,
    pub description: Option<String>,
}

/// A mapping together with repository metadata.
///
/// The mapping is nested rather than flattened so its integer-keyed column
/// map survives a JSON round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMapping {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
    pub mapping: ColumnMapping,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredMapping {
    pub fn new(name: impl Into<String>, mapping: ColumnMapping) -> Self {
        Self {
            name: name.into(),
            description: None,
            saved_at: Some(Utc::now()),
            version: default_version(),
            mapping,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MappingRepository {
    /// Open a repository, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create mapping repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save a mapping under `name`, replacing any previous one.
    pub fn save(&self, name: &str, mapping: &ColumnMapping) -> Result<PathBuf> {
        self.save_stored(&StoredMapping::new(name, mapping.clone()))
    }

    pub fn save_stored(&self, stored: &StoredMapping) -> Result<PathBuf> {
        let path = self.mapping_path(&stored.name);
        let json = serde_json::to_string_pretty(stored)
            .with_context(|| format!("Failed to serialize mapping '{}'", stored.name))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write mapping to {}", path.display()))?;
        tracing::debug!(name = %stored.name, path = %path.display(), "mapping saved");
        Ok(path)
    }

    /// Load a mapping by name. Returns `None` if no mapping exists.
    pub fn load(&self, name: &str) -> Result<Option<ColumnMapping>> {
        Ok(self.load_stored(name)?.map(|stored| stored.mapping))
    }

    pub fn load_stored(&self, name: &str) -> Result<Option<StoredMapping>> {
        let path = self.mapping_path(name);
        if !path.exists() {
            return Ok(None);
        }
        read_stored(&path).map(Some)
    }

    /// List every readable mapping, sorted by name.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<MappingMetadata>> {
        let mut metadata = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?
        {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_stored(&path) {
                Ok(stored) => metadata.push(MappingMetadata {
                    name: stored.name,
                    column_count: stored.mapping.field_columns().count(),
                    description: stored.description,
                    file_path: path,
                }),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable mapping");
                }
            }
        }
        metadata.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metadata)
    }

    /// Delete a mapping. Returns `false` if it did not exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.mapping_path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete mapping: {}", path.display()))?;
        Ok(true)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.mapping_path(name).exists()
    }

    fn mapping_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_name(name)))
    }
}

/// Read a mapping file.
///
/// Accepts either a stored mapping or a bare [`ColumnMapping`] object, so
/// hand-written mapping files work without repository metadata.
pub fn read_mapping_file(path: &Path) -> Result<ColumnMapping> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping from {}", path.display()))?;
    if let Ok(stored) = serde_json::from_str::<StoredMapping>(&contents) {
        return Ok(stored.mapping);
    }
    serde_json::from_str::<ColumnMapping>(&contents)
        .with_context(|| format!("Failed to parse mapping from {}", path.display()))
}

fn read_stored(path: &Path) -> Result<StoredMapping> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse mapping from {}", path.display()))
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
