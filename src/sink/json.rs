//! Flat-file sink: one pretty JSON document per service and a CSV summary.

use super::{ensure_same_service, service_slug, ResultSink};
use crate::error::{ForecastError, Result};
use crate::pipeline::ServiceOutcome;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the per-run summary table.
pub const SUMMARY_FILE: &str = "forecast_summary.csv";

/// Writes `<root>/<run_date>/<service-slug>.json` and
/// `<root>/<run_date>/forecast_summary.csv`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    root: PathBuf,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    service: &'a str,
    status: &'static str,
    order: Option<String>,
    mae: Option<f64>,
    rmse: Option<f64>,
    mape: Option<String>,
    error_kind: Option<&'static str>,
}

impl<'a> From<&'a ServiceOutcome> for SummaryRow<'a> {
    fn from(outcome: &'a ServiceOutcome) -> Self {
        match outcome {
            ServiceOutcome::Forecast(record) => Self {
                service: &record.service,
                status: outcome.status(),
                order: Some(record.order.to_string()),
                mae: Some(record.mae),
                rmse: Some(record.rmse),
                mape: Some(
                    record
                        .mape
                        .map_or_else(|| "n/a".to_string(), |v| v.to_string()),
                ),
                error_kind: None,
            },
            ServiceOutcome::Skipped(record) => Self {
                service: &record.service,
                status: outcome.status(),
                order: None,
                mae: None,
                rmse: None,
                mape: None,
                error_kind: Some(record.error_kind.as_str()),
            },
        }
    }
}

impl JsonFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all records of one run.
    pub fn run_dir(&self, run_date: NaiveDate) -> PathBuf {
        self.root.join(run_date.format("%Y-%m-%d").to_string())
    }

    pub fn record_path(&self, run_date: NaiveDate, service: &str) -> PathBuf {
        self.run_dir(run_date)
            .join(format!("{}.json", service_slug(service)))
    }

    pub fn summary_path(&self, run_date: NaiveDate) -> PathBuf {
        self.run_dir(run_date).join(SUMMARY_FILE)
    }

    /// Read back the record written for `service` on `run_date`.
    ///
    /// A record stored under the same slug for a different service is an
    /// `InvalidParameter` error, never returned in its place.
    pub fn read(&self, run_date: NaiveDate, service: &str) -> Result<ServiceOutcome> {
        let path = self.record_path(run_date, service);
        let raw = fs::read_to_string(&path)
            .map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))?;
        let outcome: ServiceOutcome = serde_json::from_str(&raw)?;
        ensure_same_service(outcome.service(), service)?;
        Ok(outcome)
    }

    fn stored_service(&self, path: &Path) -> Option<String> {
        let raw = fs::read_to_string(path).ok()?;
        let outcome: ServiceOutcome = serde_json::from_str(&raw).ok()?;
        Some(outcome.service().to_string())
    }

    fn ensure_run_dir(&self, run_date: NaiveDate) -> Result<PathBuf> {
        let dir = self.run_dir(run_date);
        fs::create_dir_all(&dir)
            .map_err(|e| ForecastError::Io(format!("{}: {}", dir.display(), e)))?;
        Ok(dir)
    }
}

impl ResultSink for JsonFileSink {
    fn write(&mut self, run_date: NaiveDate, outcome: &ServiceOutcome) -> Result<()> {
        self.ensure_run_dir(run_date)?;
        let path = self.record_path(run_date, outcome.service());
        if let Some(stored) = self.stored_service(&path) {
            ensure_same_service(&stored, outcome.service())?;
        }
        let body = serde_json::to_string_pretty(outcome)?;
        fs::write(&path, body).map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(service = %outcome.service(), path = %path.display(), "wrote record");
        Ok(())
    }

    fn write_summary(&mut self, run_date: NaiveDate, outcomes: &[ServiceOutcome]) -> Result<()> {
        self.ensure_run_dir(run_date)?;
        let path = self.summary_path(run_date);
        let io_err = |e: csv::Error| ForecastError::Io(format!("{}: {}", path.display(), e));

        let mut writer = csv::Writer::from_path(&path).map_err(io_err)?;
        for outcome in outcomes {
            writer.serialize(SummaryRow::from(outcome)).map_err(io_err)?;
        }
        writer
            .flush()
            .map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), rows = outcomes.len(), "wrote summary");
        Ok(())
    }
}
