//! Herd data normalization utilities.
//!
//! - **datetime**: date parsing with lenient passthrough of unrecognized text
//! - **status**: animal status and pregnancy-result terminology
//! - **numeric**: integer cells written by spreadsheets
//! - **identifier**: cattle id cleanup and garbage-row detection

pub mod datetime;
pub mod identifier;
pub mod numeric;
pub mod status;

pub use datetime::{
    DateValue, add_days, classify_date, days_between, format_date, from_serial, normalize_date,
    parse_date,
};
pub use identifier::{is_garbage_cattle_id, normalize_cattle_id};
pub use numeric::{normalize_integer, parse_count, parse_integer};
pub use status::{normalize_pregnancy_result, normalize_status, parse_pregnancy_result};
