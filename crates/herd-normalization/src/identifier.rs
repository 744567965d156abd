//! Cattle id cleanup.

/// Labels that show up in the id column of exported herd books but never
/// identify an animal (totals, repeated headers).
const GARBAGE_LABELS: [&str; 12] = [
    "итого",
    "всего",
    "сумма",
    "total",
    "sum",
    "№",
    "номер",
    "инв. №",
    "инв.№",
    "id",
    "cattle id",
    "n/a",
];

/// Trim a cattle id and drop a spreadsheet float suffix (`"1234.0"` -> `"1234"`).
pub fn normalize_cattle_id(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}').trim();
    if let Some((whole, fraction)) = trimmed.split_once('.') {
        let is_float_suffix = !whole.is_empty()
            && whole.chars().all(|ch| ch.is_ascii_digit())
            && !fraction.is_empty()
            && fraction.chars().all(|ch| ch == '0');
        if is_float_suffix {
            return whole.to_string();
        }
    }
    trimmed.to_string()
}

/// True when the value cannot be a cattle id.
pub fn is_garbage_cattle_id(raw: &str) -> bool {
    let value = normalize_cattle_id(raw);
    if value.is_empty() {
        return true;
    }
    if !value.chars().any(char::is_alphanumeric) {
        return true;
    }
    let label = value.trim_end_matches(':').trim().to_lowercase();
    GARBAGE_LABELS.contains(&label.as_str())
}
