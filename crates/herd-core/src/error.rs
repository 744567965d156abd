//! Error types for stores and reconciliation.

use std::path::PathBuf;

use herd_model::CattleId;
use thiserror::Error;

/// Failure reading or writing animal records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} store file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON for a herd.
    #[error("Failed to parse store file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize herd snapshot")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    /// Temp file couldn't be renamed over the snapshot.
    #[error("Failed to complete save to {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure merging one animal. Collected per id, never aborts an import.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("store returned record '{found}' for id '{expected}'")]
    IdMismatch { expected: CattleId, found: CattleId },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
