//! # ridership-forecast
//!
//! Command-line entry point: load a ridership table, forecast each service
//! and write the records under the output directory.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use ridership_forecast::data::RawTable;
use ridership_forecast::pipeline::{ForecastPipeline, HoldoutWindow, PipelineConfig, ServiceOutcome};
use ridership_forecast::sink::JsonFileSink;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ridership-forecast")]
#[command(about = "Per-service 7-day ridership forecasts with hold-out accuracy", long_about = None)]
struct Cli {
    /// Input CSV with a date column and one column per service
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory; records go to <output>/<run-date>/
    #[arg(short, long, default_value = "reports/forecast")]
    output: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service to forecast (repeatable); defaults to the configured set
    #[arg(short, long = "service")]
    services: Vec<String>,

    /// Run date used to key the output (YYYY-MM-DD, default: today)
    #[arg(long)]
    run_date: Option<NaiveDate>,

    /// Fixed hold-out length in days instead of the configured split
    #[arg(long)]
    holdout_days: Option<usize>,

    /// Process services in parallel
    #[arg(long)]
    parallel: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ridership_forecast={}", cli.log_level).into()),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if !cli.services.is_empty() {
        config.services = cli.services.clone();
    }
    if let Some(days) = cli.holdout_days {
        config.holdout = HoldoutWindow::Days(days);
    }
    config.parallel |= cli.parallel;

    let run_date = cli.run_date.unwrap_or_else(|| Local::now().date_naive());

    let table = RawTable::from_csv_path(&cli.input, &config.date_column)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    info!(input = %cli.input.display(), rows = table.num_rows(), "loaded table");

    let mut sink = JsonFileSink::new(&cli.output);
    let report = ForecastPipeline::new(config)
        .run(&table, run_date, &mut sink)
        .context("forecast run failed")?;

    for outcome in &report.outcomes {
        match outcome {
            ServiceOutcome::Forecast(record) => {
                let mape = record
                    .mape
                    .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v));
                println!(
                    "{:<14} {:<26} MAE {:>10.2}  RMSE {:>10.2}  MAPE {:>8}",
                    record.service,
                    record.order.to_string(),
                    record.mae,
                    record.rmse,
                    mape
                );
            }
            ServiceOutcome::Skipped(record) => {
                println!(
                    "{:<14} skipped ({}): {}",
                    record.service, record.error_kind, record.reason
                );
            }
        }
    }
    println!("records written to {}", sink.run_dir(run_date).display());

    Ok(())
}
