#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Identifier of one animal (ear tag / herd book number).
///
/// Always trimmed and non-empty. Whether an id is a spreadsheet artefact
/// (a "total" row, a repeated header) is decided by the normalizer before
/// a `CattleId` is built.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CattleId(String);

impl CattleId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidCattleId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CattleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
