//! Inputs and outputs of the import and KPI operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Inclusive date interval a KPI report is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Intersection with another window, if any.
    pub fn intersect(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(TimeWindow { start, end })
    }
}

/// Reproduction indicators for one population and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport {
    /// Conception rate, percent.
    pub cr: f64,
    /// Heat-detection rate, percent.
    pub hdr: f64,
    /// Pregnancy rate, percent (derived from `hdr` and `cr`).
    pub pr: f64,
    pub service_period_days: Option<f64>,
    pub inseminated_count: usize,
    pub pregnant_count: usize,
    pub total_inseminations: usize,
}

impl KpiReport {
    pub fn empty() -> Self {
        Self {
            cr: 0.0,
            hdr: 0.0,
            pr: 0.0,
            service_period_days: None,
            inseminated_count: 0,
            pregnant_count: 0,
            total_inseminations: 0,
        }
    }

    pub fn summary(&self) -> String {
        let service_period = self
            .service_period_days
            .map_or_else(|| crate::NO_DATA.to_string(), |days| format!("{days:.1}"));
        format!(
            "CR {:.1}% | HDR {:.1}% | PR {:.1}% | SP {} d | inseminated {} | pregnant {} | inseminations {}",
            self.cr,
            self.hdr,
            self.pr,
            service_period,
            self.inseminated_count,
            self.pregnant_count,
            self.total_inseminations
        )
    }
}

impl Default for KpiReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// Counts reported back after reconciling an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub new_count: usize,
    pub update_count: usize,
    pub skipped_rows: usize,
    /// One `"<cattle id>: <message>"` entry per animal that failed to merge.
    pub errors: Vec<String>,
}

impl ImportOutcome {
    pub fn affected(&self) -> usize {
        self.new_count + self.update_count
    }

    pub fn is_empty(&self) -> bool {
        self.affected() == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Single aggregate message for an import that changed nothing.
    pub fn summary_message(&self) -> Option<String> {
        if !self.is_empty() {
            return None;
        }
        let mut message = String::from("no records were created or updated");
        if self.skipped_rows > 0 {
            message.push_str(&format!(" ({} rows skipped)", self.skipped_rows));
        }
        if self.has_errors() {
            message.push_str(&format!(", {} animals failed", self.errors.len()));
        }
        Some(message)
    }
}
