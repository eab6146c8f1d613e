//! Forecast result structure holding dated predictions.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Number of days in the published forecast.
pub const FORECAST_HORIZON: usize = 7;

/// Symmetric prediction interval around the point forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInterval {
    /// Confidence level, e.g. 0.95.
    pub level: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Dated point predictions with an optional interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    interval: Option<PredictionInterval>,
}

impl Forecast {
    /// Create a forecast from dates and point predictions.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::Alignment(format!(
                "forecast has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            dates,
            values,
            interval: None,
        })
    }

    /// Attach a prediction interval.
    pub fn with_interval(mut self, interval: PredictionInterval) -> Result<Self> {
        if interval.lower.len() != self.values.len() || interval.upper.len() != self.values.len() {
            return Err(ForecastError::Alignment(format!(
                "interval bounds ({}, {}) do not match horizon {}",
                interval.lower.len(),
                interval.upper.len(),
                self.values.len()
            )));
        }
        self.interval = Some(interval);
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn interval(&self) -> Option<&PredictionInterval> {
        self.interval.as_ref()
    }

    /// Iterate over (date, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time_series::consecutive_dates;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn forecast_pairs_dates_and_values() {
        let dates = consecutive_dates(start(), 3);
        let fc = Forecast::new(dates, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(fc.horizon(), 3);
        let pairs: Vec<_> = fc.iter().collect();
        assert_eq!(pairs[2], (NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(), 3.0));
        assert!(fc.interval().is_none());
    }

    #[test]
    fn forecast_length_mismatch() {
        let dates = consecutive_dates(start(), 2);
        assert!(matches!(
            Forecast::new(dates, vec![1.0]),
            Err(ForecastError::Alignment(_))
        ));
    }

    #[test]
    fn interval_must_match_horizon() {
        let dates = consecutive_dates(start(), 2);
        let fc = Forecast::new(dates, vec![1.0, 2.0]).unwrap();
        let bad = PredictionInterval {
            level: 0.95,
            lower: vec![0.0],
            upper: vec![2.0, 3.0],
        };
        assert!(fc.clone().with_interval(bad).is_err());

        let good = PredictionInterval {
            level: 0.95,
            lower: vec![0.5, 1.0],
            upper: vec![1.5, 3.0],
        };
        let fc = fc.with_interval(good).unwrap();
        assert_eq!(fc.interval().unwrap().level, 0.95);
    }

    #[test]
    fn empty_forecast() {
        let fc = Forecast::new(vec![], vec![]).unwrap();
        assert!(fc.is_empty());
        assert_eq!(fc.horizon(), 0);
    }
}
