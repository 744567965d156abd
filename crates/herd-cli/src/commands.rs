//! Subcommand implementations. Printing is left to [`crate::summary`].

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Local, NaiveDate};
use herd_core::{AnimalStore, JsonFileStore, ReconcileOptions, Reconciler};
use herd_kpi::{
    BreakdownRow, IntervalDistribution, PopulationFilter, TrendPoint, breakdown, compute_kpis,
    interval_distribution, monthly_trend,
};
use herd_map::{
    MappingMetadata, MappingRepository, read_mapping_file, resolve_rows, validate_mapping,
};
use herd_model::{AnimalRecord, CattleId, ColumnMapping, ImportOutcome, KpiReport, TimeWindow};
use serde::Serialize;
use tracing::info;

use crate::cli::{BreakdownArgs, ImportArgs, IntervalArgs, PopulationArgs, ShowArgs, WindowArgs};
use herd_cli::config::HerdConfig;
use herd_cli::source::read_table;

/// Settings shared by every subcommand.
pub struct RunContext {
    pub config: HerdConfig,
    pub store_path: PathBuf,
}

impl RunContext {
    pub fn new(config: HerdConfig, store_override: Option<PathBuf>) -> Self {
        let store_path = store_override.unwrap_or_else(|| config.store.path.clone());
        Self { config, store_path }
    }

    fn open_store(&self) -> Result<JsonFileStore> {
        JsonFileStore::open(&self.store_path)
            .with_context(|| format!("Failed to open store {}", self.store_path.display()))
    }

    fn mapping_repository(&self) -> Result<MappingRepository> {
        MappingRepository::new(&self.config.import.mapping_dir)
    }

    fn population(&self, args: &PopulationArgs) -> Result<Vec<AnimalRecord>> {
        let filter = PopulationFilter {
            include_exited: args.include_exited,
            groups: args.groups.clone(),
        };
        let records = self.open_store()?.list()?;
        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn pdo(&self, args: &WindowArgs) -> i64 {
        args.pdo.unwrap_or(self.config.kpi.pdo)
    }
}

pub struct ImportResult {
    pub outcome: ImportOutcome,
    pub store_path: PathBuf,
    pub dry_run: bool,
    /// Whether the store file was rewritten.
    pub saved: bool,
    pub template_path: Option<PathBuf>,
}

pub fn run_import(context: &RunContext, args: &ImportArgs) -> Result<ImportResult> {
    let (mapping, template_path) = resolve_mapping(context, args)?;

    let has_header = context.config.import.has_header && !args.no_header;
    let table = read_table(&args.file, has_header, args.delimiter)?;
    let problems = validate_mapping(&mapping, table.column_count());
    if !problems.is_empty() {
        let details: Vec<String> = problems.iter().map(ToString::to_string).collect();
        bail!("Invalid column mapping: {}", details.join("; "));
    }

    let resolved = resolve_rows(&table.rows, &mapping);
    let check_offset = args
        .check_offset
        .unwrap_or(context.config.import.expected_check_offset_days);
    let mut options = ReconcileOptions::default().with_expected_check_offset_days(check_offset);
    if let Some(user_id) = args.user.clone().or_else(|| context.config.import.user_id.clone()) {
        options = options.with_user_id(user_id);
    }

    let mut store = context.open_store()?;
    let outcome = Reconciler::new(options).import(&resolved, &mut store);

    let saved = !args.dry_run && !outcome.is_empty();
    if saved {
        store
            .save()
            .with_context(|| format!("Failed to save store {}", context.store_path.display()))?;
    }
    info!(
        new = outcome.new_count,
        updated = outcome.update_count,
        skipped = outcome.skipped_rows,
        errors = outcome.errors.len(),
        saved,
        "import finished"
    );
    Ok(ImportResult {
        outcome,
        store_path: context.store_path.clone(),
        dry_run: args.dry_run,
        saved,
        template_path,
    })
}

fn resolve_mapping(
    context: &RunContext,
    args: &ImportArgs,
) -> Result<(ColumnMapping, Option<PathBuf>)> {
    if let Some(path) = &args.mapping {
        let mapping = read_mapping_file(path)?;
        let template_path = match &args.save_template {
            Some(name) => Some(context.mapping_repository()?.save(name, &mapping)?),
            None => None,
        };
        return Ok((mapping, template_path));
    }
    if let Some(name) = &args.template {
        let mapping = context
            .mapping_repository()?
            .load(name)?
            .ok_or_else(|| anyhow!("No mapping template named {name}"))?;
        return Ok((mapping, None));
    }
    bail!("Either --mapping or --template is required")
}

/// Window from the flags, defaulting to January 1 of the end year through `today`.
pub fn resolve_window(args: &WindowArgs, today: NaiveDate) -> Result<TimeWindow> {
    let end = args.end.unwrap_or(today);
    let start = match args.start {
        Some(start) => start,
        None => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .ok_or_else(|| anyhow!("No January 1 in year {}", end.year()))?,
    };
    Ok(TimeWindow::new(start, end)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResult {
    pub window: TimeWindow,
    pub pdo: i64,
    pub animals: usize,
    pub report: KpiReport,
}

pub fn run_kpi(context: &RunContext, args: &WindowArgs) -> Result<KpiResult> {
    let window = resolve_window(args, today())?;
    let pdo = context.pdo(args);
    let population = context.population(&args.population)?;
    let report = compute_kpis(&population, &window, pdo);
    Ok(KpiResult {
        window,
        pdo,
        animals: population.len(),
        report,
    })
}

pub fn run_breakdown(context: &RunContext, args: &BreakdownArgs) -> Result<Vec<BreakdownRow>> {
    let window = resolve_window(&args.window, today())?;
    let population = context.population(&args.window.population)?;
    Ok(breakdown(
        &population,
        &window,
        context.pdo(&args.window),
        args.by,
    ))
}

pub fn run_trend(context: &RunContext, args: &WindowArgs) -> Result<Vec<TrendPoint>> {
    let window = resolve_window(args, today())?;
    let population = context.population(&args.population)?;
    Ok(monthly_trend(&population, &window, context.pdo(args)))
}

pub fn run_intervals(context: &RunContext, args: &IntervalArgs) -> Result<IntervalDistribution> {
    let population = context.population(&args.population)?;
    Ok(interval_distribution(&population, args.lactation))
}

pub fn run_show(context: &RunContext, args: &ShowArgs) -> Result<AnimalRecord> {
    let id = CattleId::new(args.id.as_str())?;
    context
        .open_store()?
        .get(&id)?
        .ok_or_else(|| anyhow!("No animal with id {id} in {}", context.store_path.display()))
}

pub fn run_templates(context: &RunContext) -> Result<(PathBuf, Vec<MappingMetadata>)> {
    let repository = context.mapping_repository()?;
    let templates = repository.list()?;
    Ok((repository.base_dir().to_path_buf(), templates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_args(start: Option<NaiveDate>, end: Option<NaiveDate>) -> WindowArgs {
        WindowArgs {
            start,
            end,
            pdo: None,
            population: PopulationArgs {
                include_exited: false,
                groups: Vec::new(),
            },
            json: false,
        }
    }

    #[test]
    fn window_defaults_to_year_to_date() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let window = resolve_window(&window_args(None, None), today).unwrap();
        assert_eq!(window.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(window.end(), today);
    }

    #[test]
    fn reversed_window_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1);
        let end = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(resolve_window(&window_args(start, end), end.unwrap()).is_err());
    }
}
