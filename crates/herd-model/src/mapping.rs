//! Column mapping types for source-to-record field mapping.
//!
//! A farm spreadsheet is described by which column carries the cattle id and
//! which canonical [`FieldKey`] every other column feeds. Several columns may
//! map to `inseminationDate` and `bull`; those are paired positionally to read
//! wide layouts with repeated date/bull column groups.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Canonical field a source column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Nickname,
    Group,
    BirthDate,
    Lactation,
    CalvingDate,
    InseminationDate,
    AttemptNumber,
    Bull,
    Inseminator,
    Code,
    Status,
    ExitDate,
    DryStartDate,
    ProtocolName,
    ProtocolStartDate,
    Note,
    PregnancyCheckResult,
    PregnancyCheckDate,
    PregnancyCheckSpecialist,
}

/// How the resolver normalizes a mapped cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Integer,
    Status,
    PregnancyResult,
}

impl FieldKey {
    pub const ALL: [FieldKey; 19] = [
        Self::Nickname,
        Self::Group,
        Self::BirthDate,
        Self::Lactation,
        Self::CalvingDate,
        Self::InseminationDate,
        Self::AttemptNumber,
        Self::Bull,
        Self::Inseminator,
        Self::Code,
        Self::Status,
        Self::ExitDate,
        Self::DryStartDate,
        Self::ProtocolName,
        Self::ProtocolStartDate,
        Self::Note,
        Self::PregnancyCheckResult,
        Self::PregnancyCheckDate,
        Self::PregnancyCheckSpecialist,
    ];

    /// Fields merged into the animal profile with last-row-wins semantics.
    pub const PROFILE: [FieldKey; 11] = [
        Self::Nickname,
        Self::Group,
        Self::BirthDate,
        Self::Lactation,
        Self::CalvingDate,
        Self::Status,
        Self::ExitDate,
        Self::DryStartDate,
        Self::Note,
        Self::ProtocolName,
        Self::ProtocolStartDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nickname => "nickname",
            Self::Group => "group",
            Self::BirthDate => "birthDate",
            Self::Lactation => "lactation",
            Self::CalvingDate => "calvingDate",
            Self::InseminationDate => "inseminationDate",
            Self::AttemptNumber => "attemptNumber",
            Self::Bull => "bull",
            Self::Inseminator => "inseminator",
            Self::Code => "code",
            Self::Status => "status",
            Self::ExitDate => "exitDate",
            Self::DryStartDate => "dryStartDate",
            Self::ProtocolName => "protocolName",
            Self::ProtocolStartDate => "protocolStartDate",
            Self::Note => "note",
            Self::PregnancyCheckResult => "pregnancyCheckResult",
            Self::PregnancyCheckDate => "pregnancyCheckDate",
            Self::PregnancyCheckSpecialist => "pregnancyCheckSpecialist",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::BirthDate
            | Self::CalvingDate
            | Self::InseminationDate
            | Self::ExitDate
            | Self::DryStartDate
            | Self::ProtocolStartDate
            | Self::PregnancyCheckDate => FieldKind::Date,
            Self::Lactation | Self::AttemptNumber => FieldKind::Integer,
            Self::Status => FieldKind::Status,
            Self::PregnancyCheckResult => FieldKind::PregnancyResult,
            Self::Nickname
            | Self::Group
            | Self::Bull
            | Self::Inseminator
            | Self::Code
            | Self::Note
            | Self::ProtocolName
            | Self::PregnancyCheckSpecialist => FieldKind::Text,
        }
    }

    pub fn is_profile(&self) -> bool {
        Self::PROFILE.contains(self)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownFieldKey(wanted.to_string()))
    }
}

/// User-declared mapping of source columns (0-based) to canonical fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub cattle_id_column_index: usize,
    #[serde(default)]
    pub columns: BTreeMap<usize, FieldKey>,
}

impl ColumnMapping {
    pub fn new(cattle_id_column_index: usize) -> Self {
        Self {
            cattle_id_column_index,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, index: usize, key: FieldKey) -> Self {
        self.columns.insert(index, key);
        self
    }

    /// Column indexes mapped to `key`, ascending.
    pub fn columns_for(&self, key: FieldKey) -> Vec<usize> {
        self.columns
            .iter()
            .filter(|(_, mapped)| **mapped == key)
            .map(|(index, _)| *index)
            .collect()
    }

    /// Mapped columns other than the cattle id column, ascending.
    pub fn field_columns(&self) -> impl Iterator<Item = (usize, FieldKey)> + '_ {
        self.columns
            .iter()
            .filter(|(index, _)| **index != self.cattle_id_column_index)
            .map(|(index, key)| (*index, *key))
    }
}
