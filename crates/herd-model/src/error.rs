use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid cattle id: {0:?}")]
    InvalidCattleId(String),
    #[error("invalid time window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("unknown field key: {0}")]
    UnknownFieldKey(String),
    #[error("unknown breakdown key: {0}")]
    UnknownBreakdownKey(String),
    #[error("unknown lactation filter: {0} (expected all, 0, 1, 2+ or 1+2+)")]
    UnknownLactationFilter(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
