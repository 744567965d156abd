//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use herd_kpi::{BreakdownKey, LactationFilter};

#[derive(Parser)]
#[command(
    name = "herd",
    version,
    about = "Dairy herd breeding records - import herd books and report reproduction KPIs",
    long_about = "Import herd book exports into a per-animal breeding timeline and report\n\
                  conception rate, heat detection rate, pregnancy rate and service period."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (default: ./herd.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Herd store file (overrides the configured path).
    #[arg(long = "store", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a herd book export into the store.
    Import(ImportArgs),

    /// Reproduction KPIs for the herd over a date window.
    Kpi(WindowArgs),

    /// KPIs per group, lactation, inseminator or bull.
    Breakdown(BreakdownArgs),

    /// KPIs month by month.
    Trend(WindowArgs),

    /// Distribution of days between consecutive inseminations.
    Intervals(IntervalArgs),

    /// Print one animal's breeding timeline.
    Show(ShowArgs),

    /// List saved column mapping templates.
    Templates,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV export to import.
    #[arg(value_name = "CSV")]
    pub file: PathBuf,

    /// Column mapping JSON file.
    #[arg(long = "mapping", value_name = "JSON", conflicts_with = "template")]
    pub mapping: Option<PathBuf>,

    /// Saved mapping template to use.
    #[arg(long = "template", value_name = "NAME")]
    pub template: Option<String>,

    /// Save the mapping given with --mapping as a named template.
    #[arg(long = "save-template", value_name = "NAME", requires = "mapping")]
    pub save_template: Option<String>,

    /// Treat the first row as data.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Field delimiter (sniffed from the first line by default; "tab" for tabs).
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// User recorded in audit fields.
    #[arg(long = "user", value_name = "ID")]
    pub user: Option<String>,

    /// Days after the latest insemination assumed for undated pregnancy checks.
    #[arg(long = "check-offset", value_name = "DAYS")]
    pub check_offset: Option<i64>,

    /// Reconcile and report without writing the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args, Clone)]
pub struct WindowArgs {
    /// First day of the window (default: January 1 of the end year).
    #[arg(long = "start", value_name = "DATE", value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last day of the window (default: today).
    #[arg(long = "end", value_name = "DATE", value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Voluntary waiting period after calving, in days.
    #[arg(long = "pdo", value_name = "DAYS")]
    pub pdo: Option<i64>,

    #[command(flatten)]
    pub population: PopulationArgs,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct PopulationArgs {
    /// Include animals that left the herd.
    #[arg(long = "include-exited")]
    pub include_exited: bool,

    /// Restrict to these groups (repeatable).
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,
}

#[derive(Args)]
pub struct BreakdownArgs {
    /// Attribute to split the herd by.
    #[arg(long = "by", value_name = "KEY", default_value = "group")]
    pub by: BreakdownKey,

    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Args)]
pub struct IntervalArgs {
    /// Lactation filter: all, 0, 1, 2+ or 1+2+.
    #[arg(long = "lactation", value_name = "FILTER", default_value = "all")]
    pub lactation: LactationFilter,

    #[command(flatten)]
    pub population: PopulationArgs,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Cattle id.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Print the stored record as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    herd_normalization::parse_date(raw).ok_or_else(|| format!("unrecognized date: {raw}"))
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character: {raw}")),
        },
    }
}
