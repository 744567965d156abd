//! Selecting the animals a KPI report is computed over.

use herd_model::AnimalRecord;

/// Which animals count toward reproduction KPIs.
#[derive(Debug, Clone, Default)]
pub struct PopulationFilter {
    /// Keep animals with an exit date or a culled status.
    pub include_exited: bool,
    /// Keep only these groups; empty keeps every group.
    pub groups: Vec<String>,
}

impl PopulationFilter {
    /// Animals still in the herd.
    pub fn active() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, record: &AnimalRecord) -> bool {
        if !self.include_exited && record.has_exited() {
            return false;
        }
        self.groups.is_empty()
            || self
                .groups
                .iter()
                .any(|group| group.trim() == record.group.trim())
    }

    pub fn apply<'a>(&self, records: &'a [AnimalRecord]) -> Vec<&'a AnimalRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}
