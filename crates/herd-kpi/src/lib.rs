#![deny(unsafe_code)]

//! Reproduction KPIs over a herd.
//!
//! All functions are pure: they read a population of [`herd_model::AnimalRecord`]s
//! and return reports, never mutating the records.

pub mod breakdown;
pub mod engine;
pub mod intervals;
pub mod population;
pub mod trend;

pub use breakdown::{BreakdownKey, BreakdownRow, breakdown};
pub use engine::{
    ESTROUS_CYCLE_DAYS, compute_kpis, qualifying_inseminations, round1, service_period,
    waiting_period_end,
};
pub use intervals::{
    INTERVAL_BUCKETS, IntervalBucket, IntervalDistribution, LactationFilter,
    interval_distribution,
};
pub use population::PopulationFilter;
pub use trend::{TrendPoint, month_windows, monthly_trend};
