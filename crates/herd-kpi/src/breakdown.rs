//! KPI reports per sub-population.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use herd_model::{AnimalRecord, KpiReport, ModelError, NO_DATA, TimeWindow};
use serde::Serialize;

use crate::engine::compute_kpis;

/// Attribute the population is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownKey {
    Group,
    Lactation,
    /// Inseminator of the animal's last insemination.
    Inseminator,
    /// Bull of the animal's last insemination.
    Bull,
}

impl BreakdownKey {
    pub const ALL: [BreakdownKey; 4] = [Self::Group, Self::Lactation, Self::Inseminator, Self::Bull];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Lactation => "lactation",
            Self::Inseminator => "inseminator",
            Self::Bull => "bull",
        }
    }

    /// Partition value of one animal; blank values become the no-data label.
    pub fn value_of(&self, record: &AnimalRecord) -> String {
        let value = match self {
            Self::Group => record.group.trim().to_string(),
            Self::Lactation => record
                .lactation
                .map(|lactation| lactation.to_string())
                .unwrap_or_default(),
            Self::Inseminator => record.inseminator.trim().to_string(),
            Self::Bull => record.bull.trim().to_string(),
        };
        if value.is_empty() {
            NO_DATA.to_string()
        } else {
            value
        }
    }
}

impl fmt::Display for BreakdownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakdownKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownBreakdownKey(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub value: String,
    pub animals: usize,
    pub report: KpiReport,
}

/// Numeric values in numeric order, text after numbers, no-data last.
fn compare_values(a: &str, b: &str) -> Ordering {
    let rank = |value: &str| (value == NO_DATA, value.parse::<u64>().ok());
    let (a_missing, a_number) = rank(a);
    let (b_missing, b_number) = rank(b);
    a_missing.cmp(&b_missing).then_with(|| match (a_number, b_number) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    })
}

/// One KPI report per distinct value of `key`.
pub fn breakdown<R: Borrow<AnimalRecord>>(
    population: &[R],
    window: &TimeWindow,
    pdo: i64,
    key: BreakdownKey,
) -> Vec<BreakdownRow> {
    let mut partitions: BTreeMap<String, Vec<&AnimalRecord>> = BTreeMap::new();
    for record in population {
        let record: &AnimalRecord = record.borrow();
        partitions.entry(key.value_of(record)).or_default().push(record);
    }

    let mut rows: Vec<BreakdownRow> = partitions
        .into_iter()
        .map(|(value, members)| BreakdownRow {
            report: compute_kpis(&members, window, pdo),
            animals: members.len(),
            value,
        })
        .collect();
    rows.sort_by(|a, b| compare_values(&a.value, &b.value));
    rows
}
