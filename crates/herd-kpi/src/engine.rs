//! Reproduction KPI engine.
//!
//! An insemination *qualifies* for a window when its date parses, lies in the
//! window and is on or after `calvingDate + pdo`. Animals without a parseable
//! calving date cannot be held to the waiting period, so their inseminations
//! qualify on the window alone; they are left out of HDR.
//!
//! | KPI | Formula |
//! |-----|---------|
//! | CR  | pregnant animals / qualifying inseminations × 100 |
//! | HDR | mean of `min(1, (last qualifying − (calving + pdo)) / 21)` × 100 |
//! | PR  | HDR × CR / 100, from the rounded HDR and CR |
//! | SP  | mean days from calving to the first insemination after it |
//!
//! Empty denominators give 0 (or `None` for SP).

use std::borrow::Borrow;

use chrono::{Days, NaiveDate};
use herd_model::{AnimalRecord, KpiReport, TimeWindow};
use herd_normalization::parse_date;

/// Length of the bovine estrous cycle in days.
pub const ESTROUS_CYCLE_DAYS: f64 = 21.0;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// End of the voluntary waiting period.
pub fn waiting_period_end(calving: NaiveDate, pdo: i64) -> Option<NaiveDate> {
    let days = Days::new(pdo.unsigned_abs());
    if pdo >= 0 {
        calving.checked_add_days(days)
    } else {
        calving.checked_sub_days(days)
    }
}

/// Qualifying insemination dates of one animal, in history order.
pub fn qualifying_inseminations(
    record: &AnimalRecord,
    window: &TimeWindow,
    pdo: i64,
) -> Vec<NaiveDate> {
    let pdo_end =
        parse_date(&record.calving_date).and_then(|calving| waiting_period_end(calving, pdo));
    record
        .insemination_history
        .iter()
        .filter_map(|event| parse_date(&event.date))
        .filter(|date| window.contains(*date))
        .filter(|date| pdo_end.is_none_or(|end| *date >= end))
        .collect()
}

/// Days from calving to the first insemination on or after it, over the
/// whole history.
pub fn service_period(record: &AnimalRecord) -> Option<i64> {
    let calving = parse_date(&record.calving_date)?;
    let first = record
        .insemination_history
        .iter()
        .filter_map(|event| parse_date(&event.date))
        .filter(|date| *date >= calving)
        .min()?;
    Some((first - calving).num_days())
}

/// Compute the KPI report for a population over `window` with waiting period `pdo`.
pub fn compute_kpis<R: Borrow<AnimalRecord>>(
    population: &[R],
    window: &TimeWindow,
    pdo: i64,
) -> KpiReport {
    let mut report = KpiReport::empty();
    let mut hdr_sum = 0.0;
    let mut hdr_animals = 0usize;
    let mut service_sum = 0i64;
    let mut service_animals = 0usize;

    for record in population {
        let record: &AnimalRecord = record.borrow();
        if let Some(days) = service_period(record) {
            service_sum += days;
            service_animals += 1;
        }

        let qualifying = qualifying_inseminations(record, window, pdo);
        let Some(last) = qualifying.iter().max().copied() else {
            continue;
        };
        report.total_inseminations += qualifying.len();
        report.inseminated_count += 1;
        if record.is_pregnant() {
            report.pregnant_count += 1;
        }

        if let Some(pdo_end) =
            parse_date(&record.calving_date).and_then(|calving| waiting_period_end(calving, pdo))
        {
            let days = (last - pdo_end).num_days() as f64;
            hdr_sum += (days / ESTROUS_CYCLE_DAYS).min(1.0);
            hdr_animals += 1;
        }
    }

    report.cr = round1(ratio_percent(
        report.pregnant_count as f64,
        report.total_inseminations as f64,
    ));
    report.hdr = if hdr_animals > 0 {
        round1((hdr_sum / hdr_animals as f64 * 100.0).min(100.0))
    } else {
        0.0
    };
    report.pr = round1(report.hdr / 100.0 * report.cr / 100.0 * 100.0);
    report.service_period_days =
        (service_animals > 0).then(|| round1(service_sum as f64 / service_animals as f64));

    tracing::debug!(
        start = %window.start(),
        end = %window.end(),
        pdo,
        animals = population.len(),
        summary = %report.summary(),
        "kpis computed"
    );
    report
}
