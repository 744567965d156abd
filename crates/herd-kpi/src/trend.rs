//! Monthly KPI trend.

use std::borrow::Borrow;

use chrono::{Datelike, Months, NaiveDate};
use herd_model::{AnimalRecord, KpiReport, TimeWindow};
use serde::Serialize;

use crate::engine::compute_kpis;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `YYYY-MM`.
    pub month: String,
    /// Part of the month inside the requested window.
    pub window: TimeWindow,
    pub report: KpiReport,
}

/// Calendar months touched by `window`, each clipped to the window.
pub fn month_windows(window: &TimeWindow) -> Vec<TimeWindow> {
    let mut months = Vec::new();
    let mut first = window.start().with_day(1);
    while let Some(month_start) = first
        && month_start <= window.end()
    {
        let next = month_start.checked_add_months(Months::new(1));
        let month_end = next
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        if let Ok(month) = TimeWindow::new(month_start, month_end)
            && let Some(clipped) = month.intersect(window)
        {
            months.push(clipped);
        }
        first = next;
    }
    months
}

/// One report per calendar month touched by `window`.
pub fn monthly_trend<R: Borrow<AnimalRecord>>(
    population: &[R],
    window: &TimeWindow,
    pdo: i64,
) -> Vec<TrendPoint> {
    month_windows(window)
        .into_iter()
        .map(|month| TrendPoint {
            month: month.start().format("%Y-%m").to_string(),
            report: compute_kpis(population, &month, pdo),
            window: month,
        })
        .collect()
}
