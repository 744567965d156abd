//! Herd breeding records CLI.

use clap::{ColorChoice, Parser};
use herd_cli::config::load_config;
use herd_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    RunContext, run_breakdown, run_import, run_intervals, run_kpi, run_show, run_templates,
    run_trend,
};
use crate::summary::{
    print_animal, print_breakdown, print_import, print_intervals, print_json, print_kpi,
    print_templates, print_trend,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    let context = RunContext::new(config, cli.store);
    match cli.command {
        Command::Import(args) => {
            let result = run_import(&context, &args)?;
            print_import(&result);
            let failed = result.outcome.has_errors() || result.outcome.is_empty();
            Ok(if failed { 1 } else { 0 })
        }
        Command::Kpi(args) => {
            let result = run_kpi(&context, &args)?;
            if args.json {
                print_json(&result)?;
            } else {
                print_kpi(&result);
            }
            Ok(0)
        }
        Command::Breakdown(args) => {
            let rows = run_breakdown(&context, &args)?;
            if args.window.json {
                print_json(&rows)?;
            } else {
                print_breakdown(args.by, &rows);
            }
            Ok(0)
        }
        Command::Trend(args) => {
            let points = run_trend(&context, &args)?;
            if args.json {
                print_json(&points)?;
            } else {
                print_trend(&points);
            }
            Ok(0)
        }
        Command::Intervals(args) => {
            let distribution = run_intervals(&context, &args)?;
            if args.json {
                print_json(&distribution)?;
            } else {
                print_intervals(&distribution, args.lactation);
            }
            Ok(0)
        }
        Command::Show(args) => {
            let record = run_show(&context, &args)?;
            if args.json {
                print_json(&record)?;
            } else {
                print_animal(&record);
            }
            Ok(0)
        }
        Command::Templates => {
            let (directory, templates) = run_templates(&context)?;
            if templates.is_empty() {
                println!("No templates in {}", directory.display());
            } else {
                print_templates(&templates);
            }
            Ok(0)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
