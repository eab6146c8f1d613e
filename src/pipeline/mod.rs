//! End-to-end forecasting run over the services of a raw table.
//!
//! # Example
//!
//! ```no_run
//! use ridership_forecast::data::RawTable;
//! use ridership_forecast::pipeline::{ForecastPipeline, PipelineConfig};
//! use ridership_forecast::sink::JsonFileSink;
//! use chrono::NaiveDate;
//!
//! let config = PipelineConfig::from_toml_file("forecast.toml")?;
//! let table = RawTable::from_csv_path("ridership.csv", &config.date_column)?;
//! let mut sink = JsonFileSink::new("reports/forecast");
//!
//! let run_date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
//! let report = ForecastPipeline::new(config).run(&table, run_date, &mut sink)?;
//! for record in report.forecasts() {
//!     println!("{}: {:?}", record.service, record.forecast_values);
//! }
//! # Ok::<(), ridership_forecast::ForecastError>(())
//! ```

mod config;
mod outcome;
mod runner;

pub use config::{HoldoutWindow, PipelineConfig, DEFAULT_SERVICES};
pub use outcome::{ForecastRecord, ServiceOutcome, SkipRecord};
pub use runner::{ForecastPipeline, RunReport};
