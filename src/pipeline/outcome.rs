//! Per-service result records.

use crate::core::Forecast;
use crate::error::{ErrorKind, ForecastError};
use crate::models::arima::SeasonalOrder;
use crate::utils::EvaluationResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Terminal record for one service in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceOutcome {
    Forecast(ForecastRecord),
    Skipped(SkipRecord),
}

/// Published forecast with hold-out accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub service: String,
    pub run_date: NaiveDate,
    /// Order of the model refit on the full series.
    pub order: SeasonalOrder,
    pub forecast_dates: Vec<NaiveDate>,
    pub forecast_values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_lower: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_upper: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_level: Option<f64>,
    /// Days in the evaluation window.
    pub holdout_days: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Percent; `"n/a"` when every true value was zero.
    #[serde(with = "mape_format")]
    pub mape: Option<f64>,
}

/// A service that could not be forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub service: String,
    pub run_date: NaiveDate,
    pub error_kind: ErrorKind,
    pub reason: String,
}

impl ForecastRecord {
    pub fn new(
        service: impl Into<String>,
        run_date: NaiveDate,
        order: SeasonalOrder,
        forecast: &Forecast,
        metrics: EvaluationResult,
        holdout_days: usize,
    ) -> Self {
        let interval = forecast.interval();
        Self {
            service: service.into(),
            run_date,
            order,
            forecast_dates: forecast.dates().to_vec(),
            forecast_values: forecast.values().to_vec(),
            forecast_lower: interval.map(|i| i.lower.clone()),
            forecast_upper: interval.map(|i| i.upper.clone()),
            interval_level: interval.map(|i| i.level),
            holdout_days,
            mae: metrics.mae,
            rmse: metrics.rmse,
            mape: metrics.mape,
        }
    }

    pub fn metrics(&self) -> EvaluationResult {
        EvaluationResult {
            mae: self.mae,
            rmse: self.rmse,
            mape: self.mape,
        }
    }
}

impl ServiceOutcome {
    pub fn skipped(service: impl Into<String>, run_date: NaiveDate, err: &ForecastError) -> Self {
        ServiceOutcome::Skipped(SkipRecord {
            service: service.into(),
            run_date,
            error_kind: err.kind(),
            reason: err.to_string(),
        })
    }

    pub fn service(&self) -> &str {
        match self {
            ServiceOutcome::Forecast(record) => &record.service,
            ServiceOutcome::Skipped(record) => &record.service,
        }
    }

    pub fn run_date(&self) -> NaiveDate {
        match self {
            ServiceOutcome::Forecast(record) => record.run_date,
            ServiceOutcome::Skipped(record) => record.run_date,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ServiceOutcome::Forecast(_) => "forecast",
            ServiceOutcome::Skipped(_) => "skipped",
        }
    }

    pub fn as_forecast(&self) -> Option<&ForecastRecord> {
        match self {
            ServiceOutcome::Forecast(record) => Some(record),
            ServiceOutcome::Skipped(_) => None,
        }
    }

    pub fn as_skipped(&self) -> Option<&SkipRecord> {
        match self {
            ServiceOutcome::Forecast(_) => None,
            ServiceOutcome::Skipped(record) => Some(record),
        }
    }
}

/// MAPE as a number, or the string `"n/a"` when undefined.
mod mape_format {
    use serde::de;
    use serde::{Deserialize, Deserializer, Serializer};

    const NOT_APPLICABLE: &str = "n/a";

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str(NOT_APPLICABLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Some(v)),
            Raw::Text(text) if text == NOT_APPLICABLE => Ok(None),
            Raw::Text(text) => Err(de::Error::custom(format!(
                "expected a number or \"{}\" for mape, got {:?}",
                NOT_APPLICABLE, text
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::consecutive_dates;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(mape: Option<f64>) -> ForecastRecord {
        let dates = consecutive_dates(date(2024, 5, 1), 7);
        let forecast = Forecast::new(dates, vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]).unwrap();
        ForecastRecord::new(
            "Light Rail",
            date(2024, 4, 30),
            SeasonalOrder::arima(1, 1, 0),
            &forecast,
            EvaluationResult {
                mae: 1.25,
                rmse: 1.5,
                mape,
            },
            24,
        )
    }

    #[test]
    fn forecast_outcome_is_tagged() {
        let outcome = ServiceOutcome::Forecast(record(Some(3.5)));
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "forecast");
        assert_eq!(json["service"], "Light Rail");
        assert_eq!(json["forecast_dates"][0], "2024-05-01");
        assert_eq!(json["mape"], 3.5);
        assert!(json.get("forecast_lower").is_none());
    }

    #[test]
    fn undefined_mape_round_trips_as_na() {
        let outcome = ServiceOutcome::Forecast(record(None));
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(text.contains(r#""mape":"n/a""#));

        let back: ServiceOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(back, outcome);
        assert_eq!(back.as_forecast().unwrap().metrics().mape, None);
    }

    #[test]
    fn numeric_mape_round_trips() {
        let outcome = ServiceOutcome::Forecast(record(Some(12.345678901234)));
        let text = serde_json::to_string_pretty(&outcome).unwrap();
        let back: ServiceOutcome = serde_json::from_str(&text).unwrap();
        let mape = back.as_forecast().unwrap().mape.unwrap();
        assert_relative_eq!(mape, 12.345678901234, epsilon = 1e-12);
    }

    #[test]
    fn rejects_unknown_mape_text() {
        let mut json = serde_json::to_value(ServiceOutcome::Forecast(record(None))).unwrap();
        json["mape"] = serde_json::Value::from("unknown");
        assert!(serde_json::from_value::<ServiceOutcome>(json).is_err());
    }

    #[test]
    fn skip_outcome_records_error_kind() {
        let err = ForecastError::Data("column 'Ferry' not found".to_string());
        let outcome = ServiceOutcome::skipped("Ferry", date(2024, 4, 30), &err);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "skipped");
        assert_eq!(json["error_kind"], "data_error");
        assert_eq!(outcome.service(), "Ferry");
        assert_eq!(outcome.status(), "skipped");
        assert!(outcome.as_forecast().is_none());
    }
}
