//! Breeding-record date parsing and formatting.
//!
//! Farm spreadsheets carry dates as `YYYY-MM-DD`, `DD.MM.YYYY`, `DD/MM/YYYY`,
//! two-digit-year `DD.MM.YY`, `YYYY.MM.DD` or as spreadsheet serial day
//! numbers. Everything parseable is normalized to `YYYY-MM-DD`; anything else
//! is returned unchanged so the caller can still display it.

use chrono::{Duration, NaiveDate};

/// Two-digit years up to this value belong to the 2000s, the rest to the 1900s.
const TWO_DIGIT_YEAR_PIVOT: i32 = 30;
const SERIAL_MIN_YEAR: i32 = 1900;
const SERIAL_MAX_YEAR: i32 = 2100;
/// Serial 60 is 1900-02-29 in the 1900 date system, a day that never existed.
const SERIAL_PHANTOM_LEAP_DAY: i64 = 60;

/// Result of classifying a raw date cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// Recognized calendar date.
    Parsed(NaiveDate),
    /// Unrecognized text, preserved as given.
    Passthrough(String),
}

impl DateValue {
    /// Canonical `YYYY-MM-DD` for parsed dates, the original text otherwise.
    pub fn to_canonical(&self) -> String {
        match self {
            DateValue::Parsed(date) => format_date(*date),
            DateValue::Passthrough(raw) => raw.clone(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Parsed(date) => Some(*date),
            DateValue::Passthrough(_) => None,
        }
    }
}

/// Classify a raw cell as a date or passthrough text.
pub fn classify_date(raw: &str) -> DateValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateValue::Passthrough(raw.to_string());
    }

    if let Some(date) = parse_calendar(strip_time(trimmed)) {
        return DateValue::Parsed(date);
    }

    if let Some(date) = parse_serial(trimmed) {
        return DateValue::Parsed(date);
    }

    DateValue::Passthrough(raw.to_string())
}

/// Parse a raw cell to a date, `None` when it is not recognized.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    classify_date(raw).date()
}

/// Normalize a raw cell to `YYYY-MM-DD`, returning unparsable input unchanged.
pub fn normalize_date(raw: &str) -> String {
    classify_date(raw).to_canonical()
}

/// Format a date in canonical `YYYY-MM-DD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole days from `from` to `to`; `None` if either side is not a date.
pub fn days_between(from: &str, to: &str) -> Option<i64> {
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    Some((to - from).num_days())
}

/// Shift a date string by `days`, returning the canonical form.
pub fn add_days(raw: &str, days: i64) -> Option<String> {
    let date = parse_date(raw)?;
    date.checked_add_signed(Duration::days(days)).map(format_date)
}

/// Decode a spreadsheet serial day number (1900 date system).
///
/// The fractional part (time of day) is ignored. Returns `None` for the
/// phantom 1900-02-29 and for results outside 1900–2100.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let date = match days {
        SERIAL_PHANTOM_LEAP_DAY => return None,
        d if d < SERIAL_PHANTOM_LEAP_DAY => {
            NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(d))?
        }
        d => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(d))?,
    };
    let year = chrono::Datelike::year(&date);
    (SERIAL_MIN_YEAR..=SERIAL_MAX_YEAR)
        .contains(&year)
        .then_some(date)
}

/// Drop a trailing time component (`2024-01-15 08:30`, `2024-01-15T08:30:00`).
fn strip_time(value: &str) -> &str {
    value
        .split([' ', 'T'])
        .next()
        .unwrap_or(value)
}

/// Parse three numeric parts separated by `.`, `/` or `-`.
///
/// A four-digit first part is read as year-month-day; otherwise the parts are
/// day-month-year with a four- or two-digit year.
fn parse_calendar(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['.', '/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    if !parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = match (parts[0].len(), parts[1].len(), parts[2].len()) {
        (4, 1..=2, 1..=2) => (parts[0].parse::<i32>().ok()?, parts[1], parts[2]),
        (1..=2, 1..=2, 4) => (parts[2].parse::<i32>().ok()?, parts[1], parts[0]),
        (1..=2, 1..=2, 2) => (expand_two_digit_year(parts[2].parse().ok()?), parts[1], parts[0]),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn expand_two_digit_year(year: i32) -> i32 {
    if year <= TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

fn parse_serial(value: &str) -> Option<NaiveDate> {
    let mut dots = 0;
    for ch in value.chars() {
        match ch {
            '0'..='9' => {}
            '.' | ',' => dots += 1,
            _ => return None,
        }
    }
    if dots > 1 {
        return None;
    }
    let serial: f64 = value.replace(',', ".").parse().ok()?;
    from_serial(serial)
}
