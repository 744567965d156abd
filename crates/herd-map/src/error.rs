//! Error types for mapping operations.

use herd_model::FieldKey;
use thiserror::Error;

/// Problems with a column mapping, detected before any row is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The cattle id column is beyond the last source column.
    #[error("cattle id column {column} is out of range ({column_count} columns)")]
    CattleIdColumnOutOfRange { column: usize, column_count: usize },
    /// The cattle id column is also mapped to another field.
    #[error("cattle id column {column} is also mapped to '{field}'")]
    CattleIdColumnRemapped { column: usize, field: FieldKey },
    /// A mapped column is beyond the last source column.
    #[error("column {column} mapped to '{field}' is out of range ({column_count} columns)")]
    ColumnOutOfRange {
        column: usize,
        field: FieldKey,
        column_count: usize,
    },
    /// A scalar field is mapped from more than one column.
    #[error("field '{field}' is mapped from several columns: {columns:?}")]
    DuplicateField { field: FieldKey, columns: Vec<usize> },
}

/// Why a row was dropped during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The id cell is empty or absent.
    MissingCattleId,
    /// The id cell holds a total/header label or punctuation only.
    GarbageCattleId(String),
}

/// A row that did not produce a row object. Counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSkipped {
    pub row_index: usize,
    pub reason: SkipReason,
}

impl std::fmt::Display for RowSkipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SkipReason::MissingCattleId => write!(f, "row {}: missing cattle id", self.row_index),
            SkipReason::GarbageCattleId(value) => {
                write!(f, "row {}: not a cattle id: {value:?}", self.row_index)
            }
        }
    }
}
