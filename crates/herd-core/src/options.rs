use chrono::{DateTime, Utc};

/// Days between an insemination and the pregnancy check that follows it,
/// used when a check row carries no date and no later insemination exists.
pub const DEFAULT_EXPECTED_CHECK_OFFSET_DAYS: i64 = 32;

/// Caller-supplied settings for one reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Written to `userId` on new records and `lastModifiedBy` on every touched one.
    pub user_id: Option<String>,
    /// Timestamp stored as `dateAdded` on new records.
    pub now: DateTime<Utc>,
    pub expected_check_offset_days: i64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            user_id: None,
            now: Utc::now(),
            expected_check_offset_days: DEFAULT_EXPECTED_CHECK_OFFSET_DAYS,
        }
    }
}

impl ReconcileOptions {
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_expected_check_offset_days(mut self, days: i64) -> Self {
        self.expected_check_offset_days = days;
        self
    }
}
