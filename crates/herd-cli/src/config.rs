//! `herd.toml` configuration.
//!
//! ```toml
//! [store]
//! path = "herd.json"
//!
//! [import]
//! user_id = "zootech"
//! expected_check_offset_days = 32
//! has_header = true
//! mapping_dir = "mappings"
//!
//! [kpi]
//! pdo = 50
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use herd_core::DEFAULT_EXPECTED_CHECK_OFFSET_DAYS;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "herd.toml";

/// Voluntary waiting period used when neither config nor flags give one.
pub const DEFAULT_PDO_DAYS: i64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub kpi: KpiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("herd.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub user_id: Option<String>,
    pub expected_check_offset_days: i64,
    pub has_header: bool,
    /// Directory of saved mapping templates.
    pub mapping_dir: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            expected_check_offset_days: DEFAULT_EXPECTED_CHECK_OFFSET_DAYS,
            has_header: true,
            mapping_dir: PathBuf::from("mappings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    pub pdo: i64,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            pdo: DEFAULT_PDO_DAYS,
        }
    }
}

pub fn parse_config(text: &str) -> Result<HerdConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, `./herd.toml` is used
/// when present; an unreadable implicit file falls back to defaults with a
/// warning.
pub fn load_config(explicit: Option<&Path>) -> Result<HerdConfig> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = parse_config(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        return Ok(config);
    }

    let path = Path::new(CONFIG_FILENAME);
    match fs::read_to_string(path) {
        Ok(text) => match parse_config(&text) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "config loaded");
                Ok(config)
            }
            Err(error) => {
                tracing::warn!(%error, "failed to parse {CONFIG_FILENAME}, using defaults");
                Ok(HerdConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(HerdConfig::default()),
        Err(error) => {
            tracing::warn!(%error, "failed to read {CONFIG_FILENAME}, using defaults");
            Ok(HerdConfig::default())
        }
    }
}
