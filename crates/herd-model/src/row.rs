#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CattleId, FieldKey};

/// Insemination date/bull pair read from one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InseminationPair {
    pub date: String,
    pub bull: String,
    /// 1-based position of the pair among the row's date columns.
    pub attempt_number: u32,
}

impl InseminationPair {
    pub fn is_empty(&self) -> bool {
        self.date.trim().is_empty() && self.bull.trim().is_empty()
    }
}

/// One source row after column mapping and cell normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowObject {
    /// 0-based position of the row in the source.
    pub row_index: usize,
    pub cattle_id: CattleId,
    #[serde(default)]
    pub insemination_pairs: Vec<InseminationPair>,
    #[serde(default)]
    pub fields: BTreeMap<FieldKey, String>,
}

impl RowObject {
    pub fn new(row_index: usize, cattle_id: CattleId) -> Self {
        Self {
            row_index,
            cattle_id,
            insemination_pairs: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn with_pair(mut self, date: impl Into<String>, bull: impl Into<String>) -> Self {
        let attempt_number = self.insemination_pairs.len() as u32 + 1;
        self.insemination_pairs.push(InseminationPair {
            date: date.into(),
            bull: bull.into(),
            attempt_number,
        });
        self
    }

    /// Non-empty, trimmed value of a mapped field.
    pub fn field(&self, key: FieldKey) -> Option<&str> {
        self.fields
            .get(&key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}
