use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use herd_kpi::{BreakdownKey, BreakdownRow, IntervalDistribution, LactationFilter, TrendPoint};
use herd_map::MappingMetadata;
use herd_model::{AnimalRecord, KpiReport, NO_DATA};

use crate::commands::{ImportResult, KpiResult};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_import(result: &ImportResult) {
    let outcome = &result.outcome;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("New animals"), count_cell(outcome.new_count, Color::Green)]);
    table.add_row(vec![
        Cell::new("Updated animals"),
        count_cell(outcome.update_count, Color::Blue),
    ]);
    table.add_row(vec![
        Cell::new("Skipped rows"),
        count_cell(outcome.skipped_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Failed animals"),
        count_cell(outcome.errors.len(), Color::Red),
    ]);
    println!("{table}");

    if let Some(path) = &result.template_path {
        println!("Template saved: {}", path.display());
    }
    if result.dry_run {
        println!("Dry run: {} not written", result.store_path.display());
    } else if result.saved {
        println!("Store: {}", result.store_path.display());
    }
    if let Some(message) = outcome.summary_message() {
        eprintln!("{message}");
    }
    if outcome.has_errors() {
        eprintln!("Errors:");
        for error in &outcome.errors {
            eprintln!("- {error}");
        }
    }
}

pub fn print_kpi(result: &KpiResult) {
    println!(
        "Window: {} .. {} | PDO {} d | {} animals",
        result.window.start(),
        result.window.end(),
        result.pdo,
        result.animals
    );
    let mut table = Table::new();
    table.set_header(vec![header_cell("Indicator"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let report = &result.report;
    table.add_row(vec![Cell::new("Conception rate (CR)"), percent_cell(report.cr)]);
    table.add_row(vec![Cell::new("Heat detection rate (HDR)"), percent_cell(report.hdr)]);
    table.add_row(vec![Cell::new("Pregnancy rate (PR)"), percent_cell(report.pr)]);
    table.add_row(vec![
        Cell::new("Service period, days"),
        service_period_cell(report),
    ]);
    table.add_row(vec![
        Cell::new("Inseminated animals"),
        Cell::new(report.inseminated_count),
    ]);
    table.add_row(vec![
        Cell::new("Pregnant animals"),
        Cell::new(report.pregnant_count),
    ]);
    table.add_row(vec![
        Cell::new("Inseminations"),
        Cell::new(report.total_inseminations),
    ]);
    println!("{table}");
}

pub fn print_breakdown(key: BreakdownKey, rows: &[BreakdownRow]) {
    let mut table = Table::new();
    table.set_header(report_header(key.as_str(), "Animals"));
    apply_table_style(&mut table);
    for index in 1..table.column_count() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        let value = if row.value == NO_DATA {
            dim_cell(&row.value)
        } else {
            Cell::new(&row.value).add_attribute(Attribute::Bold)
        };
        table.add_row(report_row(value, Cell::new(row.animals), &row.report));
    }
    println!("{table}");
}

pub fn print_trend(points: &[TrendPoint]) {
    let mut table = Table::new();
    table.set_header(report_header("Month", "Days"));
    apply_table_style(&mut table);
    for index in 1..table.column_count() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for point in points {
        let days = (point.window.end() - point.window.start()).num_days() + 1;
        table.add_row(report_row(
            Cell::new(&point.month),
            dim_cell(days),
            &point.report,
        ));
    }
    println!("{table}");
}

pub fn print_intervals(distribution: &IntervalDistribution, filter: LactationFilter) {
    println!("Lactation: {filter}");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Days"),
        header_cell("Inseminations"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let total = distribution.total();
    for bucket in &distribution.buckets {
        table.add_row(vec![
            Cell::new(bucket.label()),
            Cell::new(bucket.count),
            share_cell(bucket.count, total),
        ]);
    }
    table.add_row(vec![
        dim_cell(NO_DATA),
        Cell::new(distribution.no_data),
        share_cell(distribution.no_data, total),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
}

pub fn print_animal(record: &AnimalRecord) {
    println!(
        "{} {} | group {} | lactation {} | calved {} | status {}",
        record.cattle_id,
        record.nickname,
        text_or_no_data(&record.group),
        record
            .lactation
            .map_or_else(|| NO_DATA.to_string(), |lactation| lactation.to_string()),
        text_or_no_data(&record.calving_date),
        text_or_no_data(&record.status),
    );
    if let Some(last) = record.last_insemination() {
        let attempt = last
            .attempt_number
            .map_or_else(|| NO_DATA.to_string(), |attempt| attempt.to_string());
        println!(
            "Last insemination: {} {} (attempt {attempt})",
            text_or_no_data(&last.date),
            text_or_no_data(&last.bull),
        );
    }
    if !record.protocol.is_empty() {
        println!(
            "Protocol: {} from {}",
            text_or_no_data(&record.protocol.name),
            text_or_no_data(&record.protocol.start_date),
        );
    }

    let mut inseminations = Table::new();
    inseminations.set_header(vec![
        header_cell("#"),
        header_cell("Date"),
        header_cell("Bull"),
        header_cell("Inseminator"),
        header_cell("Code"),
        header_cell("Lactation"),
        header_cell("Days since previous"),
    ]);
    apply_table_style(&mut inseminations);
    align_column(&mut inseminations, 0, CellAlignment::Right);
    align_column(&mut inseminations, 5, CellAlignment::Right);
    align_column(&mut inseminations, 6, CellAlignment::Right);
    for event in &record.insemination_history {
        inseminations.add_row(vec![
            optional_cell(event.attempt_number),
            Cell::new(&event.date),
            Cell::new(&event.bull),
            Cell::new(&event.inseminator),
            Cell::new(&event.code),
            optional_cell(event.lactation),
            optional_cell(event.days_from_previous),
        ]);
    }
    println!("{inseminations}");

    if record.uzi_history.is_empty() {
        return;
    }
    let mut checks = Table::new();
    checks.set_header(vec![
        header_cell("Check date"),
        header_cell("Result"),
        header_cell("Specialist"),
        header_cell("Days from insemination"),
    ]);
    apply_table_style(&mut checks);
    align_column(&mut checks, 3, CellAlignment::Right);
    for check in &record.uzi_history {
        checks.add_row(vec![
            Cell::new(&check.date),
            Cell::new(check.result.as_str()),
            Cell::new(&check.specialist),
            optional_cell(check.days_from_insemination),
        ]);
    }
    println!("{checks}");
}

pub fn print_templates(templates: &[MappingMetadata]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Columns"),
        header_cell("Description"),
        header_cell("File"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for template in templates {
        table.add_row(vec![
            Cell::new(&template.name).add_attribute(Attribute::Bold),
            Cell::new(template.column_count),
            template
                .description
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            dim_cell(template.file_path.display()),
        ]);
    }
    println!("{table}");
}

fn report_header(first: &str, second: &str) -> Vec<Cell> {
    vec![
        header_cell(first),
        header_cell(second),
        header_cell("CR %"),
        header_cell("HDR %"),
        header_cell("PR %"),
        header_cell("SP d"),
        header_cell("Inseminated"),
        header_cell("Pregnant"),
        header_cell("Inseminations"),
    ]
}

fn report_row(first: Cell, second: Cell, report: &KpiReport) -> Vec<Cell> {
    vec![
        first,
        second,
        percent_cell(report.cr),
        percent_cell(report.hdr),
        percent_cell(report.pr),
        service_period_cell(report),
        Cell::new(report.inseminated_count),
        Cell::new(report.pregnant_count),
        Cell::new(report.total_inseminations),
    ]
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn percent_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.1}"))
}

fn share_cell(count: usize, total: usize) -> Cell {
    if total == 0 {
        return dim_cell("-");
    }
    let share = herd_kpi::round1(count as f64 / total as f64 * 100.0);
    Cell::new(format!("{share:.1}%"))
}

fn service_period_cell(report: &KpiReport) -> Cell {
    match report.service_period_days {
        Some(days) => Cell::new(format!("{days:.1}")),
        None => dim_cell(NO_DATA),
    }
}

fn optional_cell<T: ToString>(value: Option<T>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell(NO_DATA),
    }
}

fn text_or_no_data(value: &str) -> &str {
    if value.trim().is_empty() {
        NO_DATA
    } else {
        value
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
