use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tax_core::TaxSchedule;
use tax_core::schedules::singapore_resident;
use tax_data::ScheduleLoader;

/// Validate a tax schedule and print its marginal rates.
///
/// The CSV file should have a `threshold` column plus either:
/// - rate: the increment over the previous bracket's rate (e.g. 0.015)
/// - marginal_rate: the bracket's total marginal rate (e.g. 0.035)
///
/// Without --file the built-in resident schedule is printed.
#[derive(Parser, Debug)]
#[command(name = "tax-schedule")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV file containing a tax schedule
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let schedule = match &args.file {
        Some(path) => {
            println!("Loading tax schedule from: {}", path.display());
            ScheduleLoader::load_file(path)
                .with_context(|| format!("Failed to load schedule: {}", path.display()))?
        }
        None => singapore_resident(),
    };

    print_schedule(&schedule);

    Ok(())
}

fn print_schedule(schedule: &TaxSchedule) {
    println!("Schedule: {}", schedule.name());
    println!("{:>14}  {:>9}  {:>9}", "Threshold", "Increment", "Marginal");

    for (bracket, (_, marginal)) in schedule
        .brackets()
        .iter()
        .zip(schedule.marginal_rates())
    {
        println!(
            "{:>14}  {:>8.2}%  {:>8.2}%",
            bracket.threshold,
            bracket.rate * Decimal::ONE_HUNDRED,
            marginal * Decimal::ONE_HUNDRED,
        );
    }
}
