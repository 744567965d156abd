//! Status and pregnancy-result terminology.
//!
//! Herd books are kept in free text with local abbreviations. These functions
//! map the common spellings onto the canonical values of [`herd_model::status`]
//! and [`PregnancyResult`]; unrecognized text is returned trimmed.

use herd_model::{PregnancyResult, status};

const OPEN_PREFIXES: [&str; 4] = ["не стел", "нестел", "яловая", "ялов"];
const PREGNANT_PREFIXES: [&str; 1] = ["стел"];
const PREGNANT_EXACT: [&str; 2] = ["ст", "ст."];
const INSEMINATED_PREFIXES: [&str; 1] = ["осем"];
const CULLED_PREFIXES: [&str; 1] = ["выб"];

const RESULT_NEGATIVE: [&str; 9] = [
    "-",
    "нет",
    "no",
    "neg",
    "negative",
    "not pregnant",
    "notpregnant",
    "open",
    "пустая",
];
const RESULT_POSITIVE: [&str; 7] = ["+", "да", "yes", "pos", "positive", "pregnant", "ст"];

fn lowered(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn starts_with_any(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix))
}

/// Map a status cell to `Inseminated`, `Open`, `Pregnant` or `Culled`.
pub fn normalize_status(raw: &str) -> String {
    let trimmed = raw.trim();
    let value = lowered(trimmed);
    if value.is_empty() {
        return String::new();
    }

    for canonical in [
        status::INSEMINATED,
        status::OPEN,
        status::PREGNANT,
        status::CULLED,
    ] {
        if value.eq_ignore_ascii_case(canonical) {
            return canonical.to_string();
        }
    }

    // Negated forms first: "не стельная" also contains "стел".
    if starts_with_any(&value, &OPEN_PREFIXES) {
        return status::OPEN.to_string();
    }
    if starts_with_any(&value, &INSEMINATED_PREFIXES) {
        return status::INSEMINATED.to_string();
    }
    if PREGNANT_EXACT.contains(&value.as_str()) || starts_with_any(&value, &PREGNANT_PREFIXES) {
        return status::PREGNANT.to_string();
    }
    if starts_with_any(&value, &CULLED_PREFIXES) {
        return status::CULLED.to_string();
    }

    trimmed.to_string()
}

/// Map a pregnancy-check cell to exactly `Pregnant` or `NotPregnant`.
///
/// Anything else is returned trimmed; use [`PregnancyResult::from_normalized`]
/// to decide whether the value is a usable result.
pub fn normalize_pregnancy_result(raw: &str) -> String {
    let trimmed = raw.trim();
    let value = lowered(trimmed);
    if value.is_empty() {
        return String::new();
    }

    if RESULT_NEGATIVE.contains(&value.as_str()) || starts_with_any(&value, &OPEN_PREFIXES) {
        return PregnancyResult::NotPregnant.as_str().to_string();
    }
    if RESULT_POSITIVE.contains(&value.as_str()) || starts_with_any(&value, &PREGNANT_PREFIXES) {
        return PregnancyResult::Pregnant.as_str().to_string();
    }

    trimmed.to_string()
}

/// Normalize and decode a pregnancy-check cell in one step.
pub fn parse_pregnancy_result(raw: &str) -> Option<PregnancyResult> {
    PregnancyResult::from_normalized(&normalize_pregnancy_result(raw))
}
