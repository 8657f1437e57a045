use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use tax_core::schedules::singapore_resident;
use tax_core::{TaxEngine, TaxSchedule};
use tax_data::ScheduleLoader;
use tax_ui::app::{self, CalculatorForm};
use tax_ui::config::{OutputFormat, Overrides, UiConfig};
use tax_ui::utils::format_percent;
use tax_ui::{chart, csv_loader, logging, report};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tax savings calculator.
///
/// Shows how much income tax a planned deduction (such as a CPF or SRS cash
/// top-up) saves at your tax bracket, and plots tax payable against income.
#[derive(Debug, Parser)]
#[command(name = "tax-savings", version, about)]
struct Cli {
    /// Assessable income, after all automatically included deductions.
    #[arg(short, long)]
    income: Option<String>,

    /// Planned new deductibles.
    #[arg(short, long)]
    deduction: Option<String>,

    /// CSV file with a custom tax schedule (`threshold` plus `rate` or
    /// `marginal_rate`). Defaults to the built-in resident schedule.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the SVG chart.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Do not write a chart.
    #[arg(long, default_value_t = false)]
    no_chart: bool,

    /// CSV file of `income,deduction` rows to calculate in one run.
    #[arg(long, conflicts_with_all = ["income", "deduction"])]
    batch: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log filter, e.g. `debug`. Takes precedence over the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = logging::init_logging("info", cli.log_file.as_deref())?;

    let mut config =
        UiConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply(Overrides {
        chart_path: cli.chart.clone(),
        no_chart: cli.no_chart,
        format: cli.format,
        log_level: cli.log_level.clone(),
    });
    if let Some(level) = config.log_level.as_deref() {
        log.set_level(level)?;
    }

    let schedule = load_schedule(cli.schedule.as_deref())?;
    let engine = TaxEngine::new(&schedule);

    let output = match &cli.batch {
        Some(path) => run_batch(&engine, &config, path)?,
        None => run_single(&engine, &config, &cli)?,
    };
    print!("{output}");

    Ok(())
}

// ─── commands ────────────────────────────────────────────────────────────────

fn load_schedule(path: Option<&Path>) -> Result<TaxSchedule> {
    let schedule = match path {
        Some(path) => ScheduleLoader::load_file(path)
            .with_context(|| format!("Failed to load schedule: {}", path.display()))?,
        None => singapore_resident(),
    };

    info!(
        schedule = schedule.name(),
        brackets = schedule.brackets().len(),
        "using tax schedule"
    );
    for (threshold, rate) in schedule.marginal_rates() {
        debug!(%threshold, rate = %format_percent(rate), "marginal rate");
    }

    Ok(schedule)
}

fn run_single(
    engine: &TaxEngine<'_>,
    config: &UiConfig,
    cli: &Cli,
) -> Result<String> {
    let form = CalculatorForm::new(
        cli.income.clone().unwrap_or_default(),
        cli.deduction.clone().unwrap_or_default(),
    );
    let query = form.validate(&config.bounds)?;
    let calculation = app::calculate(engine, &config.chart, &query)?;

    if config.chart.enabled {
        chart::write_svg(&calculation, &config.chart, &config.chart.path)
            .context("Failed to write chart")?;
    }

    report::render_single(
        &calculation.result,
        config.output.format,
        config.output.decimal_places,
    )
    .context("Failed to serialize result")
}

fn run_batch(
    engine: &TaxEngine<'_>,
    config: &UiConfig,
    path: &Path,
) -> Result<String> {
    let rows = csv_loader::load_from_file(path, &config.bounds)
        .with_context(|| format!("Failed to load batch file: {}", path.display()))?;
    let results = app::calculate_batch(engine, &rows);

    report::render_batch(&results, config.output.format, config.output.decimal_places)
        .context("Failed to serialize results")
}
