//! Nightly build status checker CLI
//!
//! Main entry point for checking nightly build slots and producing
//! status reports.

use std::path::Path;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nightly_checker::{Config, StatusChecker, CONFIG_FILE_NAME};
use nightly_client::{ClientOptions, NightlyClient};
use nightly_report::{HtmlGenerator, StatusReport, TextGenerator, DATE_FORMAT};

/// Default number of days covered by the DQCS report.
const DEFAULT_REPORT_DAYS: u32 = 7;

/// Default output path for the DQCS report.
const DEFAULT_REPORT_FILEPATH: &str = "output.html";

/// Nightly Build Status Checker
///
/// Polls the nightly build system for the configured slots and reports
/// per-project build and test results.
#[derive(Parser, Debug)]
#[command(name = "nightly-status")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current status of all slots for one day
    CurrentStatus(CheckArgs),

    /// Prepare the DQCS report covering a range of days
    DqcsReport(ReportArgs),

    /// Write a config file seeded from the slots observed in live data
    Mkconfig(CheckArgs),
}

/// Options shared by every subcommand.
#[derive(ClapArgs, Debug)]
struct CheckArgs {
    /// Date to check, YYYY-MM-DD (default: today)
    #[arg(short, long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Slot to check (repeatable; overrides the config file)
    #[arg(short, long = "slot", value_name = "SLOT")]
    slots: Vec<String>,

    /// Platform to include (repeatable; overrides the config file)
    #[arg(short, long = "platform", value_name = "PLATFORM")]
    platforms: Vec<String>,

    /// Project to include (repeatable; overrides the config file)
    #[arg(long = "project", value_name = "PROJECT")]
    projects: Vec<String>,

    /// Path to configuration file (default: nightly-status.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    #[command(flatten)]
    check: CheckArgs,

    /// Number of days to cover, counting back from the date
    #[arg(long, default_value_t = DEFAULT_REPORT_DAYS)]
    days: u32,

    /// Render HTML (pass `--html false` for plain text)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    html: bool,

    /// File the report is written to
    #[arg(short, long, default_value = DEFAULT_REPORT_FILEPATH)]
    filepath: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("expected {DATE_FORMAT}: {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::CurrentStatus(check) => current_status(check).await,
        Command::DqcsReport(report) => dqcs_report(report).await,
        Command::Mkconfig(check) => mkconfig(check).await,
    }
}

/// Checks one day and prints the plain-text status.
async fn current_status(args: CheckArgs) -> anyhow::Result<()> {
    let date = resolve_date(args.date);
    let checker = build_checker(&args)?;

    let report = checker.check_status(&[date]).await?;
    let text = TextGenerator::new(&report).generate();
    println!("{text}");

    log_totals(&report);
    Ok(())
}

/// Checks a range of days and writes the DQCS report to a file.
async fn dqcs_report(args: ReportArgs) -> anyhow::Result<()> {
    let date = resolve_date(args.check.date);
    let dates = report_dates(date, args.days);
    let checker = build_checker(&args.check)?;

    let report = checker.check_status(&dates).await?;
    let rendered = if args.html {
        HtmlGenerator::new(&report, &checker.config().main_page).generate()
    } else {
        TextGenerator::new(&report).generate()
    };

    std::fs::write(&args.filepath, rendered).map_err(|e| {
        anyhow::anyhow!(
            "Failed to write report to '{}': {e}\n\nSuggestion: Check the path is writable or pass a different --filepath",
            args.filepath
        )
    })?;
    tracing::info!(filepath = %args.filepath, days = args.days, "report written");

    log_totals(&report);
    Ok(())
}

/// Writes a config file listing the slots, platforms and projects seen
/// in live build data.
async fn mkconfig(args: CheckArgs) -> anyhow::Result<()> {
    let checker = build_checker(&args)?;
    let observed = checker.observed_names().await?;

    let config = Config {
        slots: observed.slots,
        platforms: observed.platforms,
        projects: observed.projects,
        main_page: checker.config().main_page.clone(),
        api_page: checker.config().api_page.clone(),
    };
    std::fs::write(CONFIG_FILE_NAME, config.to_json()?).map_err(|e| {
        anyhow::anyhow!("Failed to write '{CONFIG_FILE_NAME}': {e}")
    })?;

    tracing::info!(
        "'{CONFIG_FILE_NAME}' file written to disk. \
         Edit accordingly and run again for desired function."
    );
    Ok(())
}

/// Builds a checker from the config file plus command-line overrides.
fn build_checker(args: &CheckArgs) -> anyhow::Result<StatusChecker<NightlyClient>> {
    let mut config = load_config(args.config.as_deref())?;

    if !args.slots.is_empty() {
        config.slots.clone_from(&args.slots);
    }
    if !args.platforms.is_empty() {
        config.platforms.clone_from(&args.platforms);
    }
    if !args.projects.is_empty() {
        config.projects.clone_from(&args.projects);
    }

    // Re-validate after overrides
    config.validate()?;

    let client = NightlyClient::new(ClientOptions::from_config(&config))?;
    Ok(StatusChecker::new(client, config))
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Returns the requested date, defaulting to today.
fn resolve_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Returns the dates a report covers, oldest first, ending at `date`.
fn report_dates(date: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days.max(1))
        .rev()
        .map(|delta| date - chrono::Duration::days(i64::from(delta)))
        .collect()
}

/// Logs cumulative per-project error and failure counts as warnings.
fn log_totals(report: &StatusReport) {
    for (project, totals) in report.totals.iter() {
        if totals.build_errors > 0 {
            tracing::warn!(
                "Found in total {} ERRORs in BUILDING the project '{project}'. \
                 Verify this and report if this is not known.",
                totals.build_errors
            );
        }
        if totals.test_failures > 0 {
            tracing::warn!(
                "Found in total {} FAILED TESTs in the project '{project}'. \
                 Verify this and report if this is not known.",
                totals.test_failures
            );
        }
    }
}
