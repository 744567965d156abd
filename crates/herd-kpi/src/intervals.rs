//! Distribution of days between consecutive inseminations.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use herd_model::{AnimalRecord, BreedingEvent, ModelError};
use serde::Serialize;

/// Inclusive day ranges of the interval buckets; `None` is open-ended.
pub const INTERVAL_BUCKETS: [(i64, Option<i64>); 6] = [
    (1, Some(3)),
    (4, Some(17)),
    (18, Some(24)),
    (25, Some(35)),
    (36, Some(48)),
    (49, None),
];

/// Which events take part, by their inferred lactation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LactationFilter {
    #[default]
    All,
    /// Lactation 0.
    Heifers,
    /// Lactation 1.
    First,
    /// Lactation 2 and above.
    SecondPlus,
    /// Lactation 1 and above.
    Lactating,
}

impl LactationFilter {
    pub fn matches(&self, lactation: Option<u32>) -> bool {
        match (self, lactation) {
            (Self::All, _) => true,
            (Self::Heifers, Some(0)) | (Self::First, Some(1)) => true,
            (Self::SecondPlus, Some(n)) => n >= 2,
            (Self::Lactating, Some(n)) => n >= 1,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Heifers => "0",
            Self::First => "1",
            Self::SecondPlus => "2+",
            Self::Lactating => "1+2+",
        }
    }
}

impl fmt::Display for LactationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LactationFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "0" | "heifers" => Ok(Self::Heifers),
            "1" | "first" => Ok(Self::First),
            "2+" | "second-plus" => Ok(Self::SecondPlus),
            "1+2+" | "lactating" => Ok(Self::Lactating),
            other => Err(ModelError::UnknownLactationFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalBucket {
    pub min_days: i64,
    pub max_days: Option<i64>,
    pub count: usize,
}

impl IntervalBucket {
    pub fn label(&self) -> String {
        match self.max_days {
            Some(max) => format!("{}–{}", self.min_days, max),
            None => format!("{}+", self.min_days),
        }
    }

    fn contains(&self, days: i64) -> bool {
        days >= self.min_days && self.max_days.is_none_or(|max| days <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalDistribution {
    pub buckets: Vec<IntervalBucket>,
    pub no_data: usize,
}

impl IntervalDistribution {
    fn empty() -> Self {
        Self {
            buckets: INTERVAL_BUCKETS
                .iter()
                .map(|(min_days, max_days)| IntervalBucket {
                    min_days: *min_days,
                    max_days: *max_days,
                    count: 0,
                })
                .collect(),
            no_data: 0,
        }
    }

    /// Events tallied, including no-data.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum::<usize>() + self.no_data
    }

    fn tally(&mut self, event: &BreedingEvent) {
        let bucket = event
            .days_from_previous
            .and_then(|days| self.buckets.iter_mut().find(|bucket| bucket.contains(days)));
        match bucket {
            Some(bucket) => bucket.count += 1,
            None => self.no_data += 1,
        }
    }
}

/// Tally `daysFromPrevious` over every animal's entire history.
///
/// Events outside the lactation filter are ignored. An animal with fewer than
/// two matching events contributes all of them to no-data.
pub fn interval_distribution<R: Borrow<AnimalRecord>>(
    population: &[R],
    filter: LactationFilter,
) -> IntervalDistribution {
    let mut distribution = IntervalDistribution::empty();
    for record in population {
        let record: &AnimalRecord = record.borrow();
        let events: Vec<&BreedingEvent> = record
            .insemination_history
            .iter()
            .filter(|event| filter.matches(event.lactation))
            .collect();
        if events.len() < 2 {
            distribution.no_data += events.len();
            continue;
        }
        for event in events {
            distribution.tally(event);
        }
    }
    distribution
}
