//! Per-animal breeding aggregate.
//!
//! An [`AnimalRecord`] owns the canonical insemination timeline and the list of
//! pregnancy checks for one animal. Derived event fields (lactation, interval
//! to the previous insemination) are recomputed by the reconciler whenever the
//! timeline changes; they are never merged directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CattleId;

/// Rendered in place of a value that cannot be derived.
pub const NO_DATA: &str = "—";

/// Canonical animal status values produced by the status normalizer.
pub mod status {
    pub const INSEMINATED: &str = "Inseminated";
    pub const OPEN: &str = "Open";
    pub const PREGNANT: &str = "Pregnant";
    pub const CULLED: &str = "Culled";
}

/// Outcome of a pregnancy check (ultrasound or rectal palpation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PregnancyResult {
    Pregnant,
    NotPregnant,
}

impl PregnancyResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pregnant => "Pregnant",
            Self::NotPregnant => "NotPregnant",
        }
    }

    /// Accepts only the canonical values emitted by the normalizer.
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "Pregnant" => Some(Self::Pregnant),
            "NotPregnant" => Some(Self::NotPregnant),
            _ => None,
        }
    }

    /// Animal status implied by this result.
    pub fn implied_status(&self) -> &'static str {
        match self {
            Self::Pregnant => status::PREGNANT,
            Self::NotPregnant => status::OPEN,
        }
    }
}

/// One insemination on the timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreedingEvent {
    /// Canonical `YYYY-MM-DD`, or the raw source text when it could not be parsed.
    pub date: String,
    pub attempt_number: Option<u32>,
    /// `attempt_number` was filled from the event's position in its lactation
    /// rather than read from the source, and is recomputed on every rebuild.
    #[serde(default)]
    pub attempt_inferred: bool,
    pub bull: String,
    pub inseminator: String,
    pub code: String,
    /// Inferred lactation; `None` when neither an explicit lactation nor a
    /// calving date is available.
    pub lactation: Option<u32>,
    /// Whole days since the previous insemination of the same lactation.
    pub days_from_previous: Option<i64>,
}

impl BreedingEvent {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn with_bull(mut self, bull: impl Into<String>) -> Self {
        self.bull = bull.into();
        self
    }

    pub fn with_inseminator(mut self, inseminator: impl Into<String>) -> Self {
        self.inseminator = inseminator.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_attempt_number(mut self, attempt: u32) -> Self {
        self.attempt_number = Some(attempt);
        self.attempt_inferred = false;
        self
    }

    /// Identity used when unioning timelines.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.date.trim(), self.bull.trim())
    }

    pub fn days_from_previous_label(&self) -> String {
        self.days_from_previous
            .map_or_else(|| NO_DATA.to_string(), |days| days.to_string())
    }
}

/// One pregnancy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PregnancyCheck {
    pub date: String,
    pub result: PregnancyResult,
    #[serde(default)]
    pub specialist: String,
    /// Days since the nearest insemination strictly before `date`.
    #[serde(default)]
    pub days_from_insemination: Option<i64>,
}

impl PregnancyCheck {
    pub fn new(date: impl Into<String>, result: PregnancyResult) -> Self {
        Self {
            date: date.into(),
            result,
            specialist: String::new(),
            days_from_insemination: None,
        }
    }

    pub fn dedup_key(&self) -> (&str, PregnancyResult) {
        (self.date.trim(), self.result)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub name: String,
    pub start_date: String,
}

impl Protocol {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.start_date.trim().is_empty()
    }
}

/// Canonical per-animal aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    pub cattle_id: CattleId,

    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub lactation: Option<u32>,
    #[serde(default)]
    pub calving_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub exit_date: String,
    #[serde(default)]
    pub dry_start_date: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub protocol: Protocol,

    // Mirrors of the last insemination in `insemination_history`.
    #[serde(default)]
    pub insemination_date: String,
    #[serde(default)]
    pub attempt_number: Option<u32>,
    #[serde(default)]
    pub bull: String,
    #[serde(default)]
    pub inseminator: String,
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub insemination_history: Vec<BreedingEvent>,
    #[serde(default)]
    pub uzi_history: Vec<PregnancyCheck>,

    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

impl AnimalRecord {
    pub fn new(cattle_id: CattleId) -> Self {
        Self {
            cattle_id,
            nickname: String::new(),
            group: String::new(),
            birth_date: String::new(),
            lactation: None,
            calving_date: String::new(),
            status: String::new(),
            exit_date: String::new(),
            dry_start_date: String::new(),
            note: String::new(),
            protocol: Protocol::default(),
            insemination_date: String::new(),
            attempt_number: None,
            bull: String::new(),
            inseminator: String::new(),
            code: String::new(),
            insemination_history: Vec::new(),
            uzi_history: Vec::new(),
            date_added: None,
            user_id: None,
            last_modified_by: None,
            synced: false,
        }
    }

    pub fn is_pregnant(&self) -> bool {
        self.status.trim() == status::PREGNANT
    }

    pub fn has_exited(&self) -> bool {
        !self.exit_date.trim().is_empty() || self.status.trim() == status::CULLED
    }

    pub fn last_insemination(&self) -> Option<&BreedingEvent> {
        self.insemination_history.last()
    }

    /// Copies the last insemination into the convenience fields.
    ///
    /// Leaves the fields untouched when the history is empty.
    pub fn mirror_last_insemination(&mut self) {
        let Some(last) = self.insemination_history.last() else {
            return;
        };
        self.insemination_date = last.date.clone();
        self.attempt_number = last.attempt_number;
        self.bull = last.bull.clone();
        self.inseminator = last.inseminator.clone();
        self.code = last.code.clone();
    }
}
