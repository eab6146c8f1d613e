//! Per-service forecasting run.

use super::config::PipelineConfig;
use super::outcome::{ForecastRecord, ServiceOutcome};
use crate::core::{TimeSeries, FORECAST_HORIZON};
use crate::data::{extract_series, RawTable};
use crate::error::Result;
use crate::models::arima::{
    select_order, select_order_by_aic, SarimaFitter, SeasonalOrder, SelectionStrategy,
};
use crate::sink::ResultSink;
use crate::utils::evaluate;
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Outcomes of one run, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_date: NaiveDate,
    pub outcomes: Vec<ServiceOutcome>,
}

impl RunReport {
    pub fn forecasts(&self) -> impl Iterator<Item = &ForecastRecord> {
        self.outcomes.iter().filter_map(ServiceOutcome::as_forecast)
    }

    pub fn num_skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.as_skipped().is_some())
            .count()
    }

    pub fn get(&self, service: &str) -> Option<&ServiceOutcome> {
        self.outcomes.iter().find(|o| o.service() == service)
    }
}

/// Extract, select, fit, evaluate and forecast every requested service.
///
/// Each service is evaluated on a trailing hold-out window, then refit on
/// its full history for the published forecast. Failures are confined to
/// the service that raised them.
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: PipelineConfig,
    fitter: SarimaFitter,
}

impl ForecastPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let fitter = SarimaFitter::new(config.fit.clone());
        Self { config, fitter }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process all configured services and write their outcomes to `sink`.
    ///
    /// # Errors
    /// Invalid configuration, an unusable date column, and sink failures
    /// abort the run. Per-service failures become skip records.
    pub fn run<S: ResultSink + ?Sized>(
        &self,
        table: &RawTable,
        run_date: NaiveDate,
        sink: &mut S,
    ) -> Result<RunReport> {
        self.config.validate()?;
        let dates = table.date_index()?;

        info!(
            %run_date,
            services = self.config.services.len(),
            rows = dates.len(),
            parallel = self.config.parallel,
            "starting forecast run"
        );

        let outcomes: Vec<ServiceOutcome> = if self.config.parallel {
            self.config
                .services
                .par_iter()
                .map(|service| self.process(table, service, run_date))
                .collect()
        } else {
            self.config
                .services
                .iter()
                .map(|service| self.process(table, service, run_date))
                .collect()
        };

        for outcome in &outcomes {
            sink.write(run_date, outcome)?;
        }
        sink.write_summary(run_date, &outcomes)?;

        let report = RunReport { run_date, outcomes };
        info!(
            %run_date,
            forecasts = report.forecasts().count(),
            skipped = report.num_skipped(),
            "forecast run finished"
        );
        Ok(report)
    }

    /// Forecast a single service; errors are returned, not recorded.
    pub fn forecast_service(
        &self,
        table: &RawTable,
        service: &str,
        run_date: NaiveDate,
    ) -> Result<ForecastRecord> {
        let series = extract_series(table, service)?;
        let holdout = self.config.holdout.holdout_len(series.len())?;
        let (train, test) = series.split_tail(holdout)?;

        let train_order = self.select(&train)?;
        let model = self.fitter.fit_with_fallback(&train, train_order)?;
        let retrospective = model.forecast(test.len())?;
        let metrics = evaluate(&retrospective, &test)?;
        debug!(
            service,
            order = %model.order(),
            holdout,
            mae = metrics.mae,
            rmse = metrics.rmse,
            "hold-out evaluation"
        );

        let full_order = self.select(&series)?;
        let full_model = self.fitter.fit_with_fallback(&series, full_order)?;
        let forecast = match self.config.interval_level {
            Some(level) => full_model.forecast_with_intervals(FORECAST_HORIZON, level)?,
            None => full_model.forecast(FORECAST_HORIZON)?,
        };

        Ok(ForecastRecord::new(
            service,
            run_date,
            full_model.order(),
            &forecast,
            metrics,
            holdout,
        ))
    }

    fn process(&self, table: &RawTable, service: &str, run_date: NaiveDate) -> ServiceOutcome {
        match self.forecast_service(table, service, run_date) {
            Ok(record) => {
                info!(
                    service,
                    order = %record.order,
                    mae = record.mae,
                    rmse = record.rmse,
                    "forecast complete"
                );
                ServiceOutcome::Forecast(record)
            }
            Err(err) => {
                warn!(service, error_kind = %err.kind(), error = %err, "service skipped");
                ServiceOutcome::skipped(service, run_date, &err)
            }
        }
    }

    fn select(&self, series: &TimeSeries) -> Result<SeasonalOrder> {
        match self.config.selection.strategy {
            SelectionStrategy::Heuristic => select_order(series, &self.config.selection),
            SelectionStrategy::InformationCriterion => {
                select_order_by_aic(series, &self.config.selection, &self.fitter)
            }
        }
    }
}
