//! Numeric normalization utilities.

/// Parses a string as i64, returning None for invalid or empty strings.
///
/// Whole floats written by spreadsheets (`"3.0"`, `"3,0"`) are accepted.
pub fn parse_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let float = trimmed.replace(',', ".").parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

/// Parses a non-negative count (lactation number, attempt number).
pub fn parse_count(value: &str) -> Option<u32> {
    parse_integer(value).and_then(|parsed| u32::try_from(parsed).ok())
}

/// Normalizes an integer cell: canonical digits, or empty when not a number.
pub fn normalize_integer(value: &str) -> String {
    parse_integer(value)
        .map(|parsed| parsed.to_string())
        .unwrap_or_default()
}
