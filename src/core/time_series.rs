//! Daily time series with a contiguous calendar index.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// A named daily series with exactly one observation per calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series, validating that dates are strictly increasing and contiguous.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();

        if dates.len() != values.len() {
            return Err(ForecastError::Data(format!(
                "series '{}': {} dates but {} values",
                name,
                dates.len(),
                values.len()
            )));
        }

        for w in dates.windows(2) {
            if w[1] <= w[0] {
                return Err(ForecastError::Data(format!(
                    "series '{}': dates must be strictly increasing ({} then {})",
                    name, w[0], w[1]
                )));
            }
            if w[1] - w[0] != Duration::days(1) {
                return Err(ForecastError::Data(format!(
                    "series '{}': gap between {} and {}",
                    name, w[0], w[1]
                )));
            }
        }

        if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ForecastError::Data(format!(
                "series '{}': counts must be finite and non-negative, got {}",
                name, v
            )));
        }

        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Create a series of consecutive days starting at `start`.
    pub fn from_start(name: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = consecutive_dates(start, values.len());
        Self::new(name, dates, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// The `horizon` calendar days immediately after the last observation.
    pub fn future_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date().ok_or(ForecastError::InsufficientData {
            needed: 1,
            got: 0,
        })?;
        Ok(consecutive_dates(last + Duration::days(1), horizon))
    }

    /// Split into the first `at` observations and the remainder.
    pub fn split_at(&self, at: usize) -> Result<(TimeSeries, TimeSeries)> {
        if at > self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "split index {} beyond series length {}",
                at,
                self.len()
            )));
        }
        let head = Self {
            name: self.name.clone(),
            dates: self.dates[..at].to_vec(),
            values: self.values[..at].to_vec(),
        };
        let tail = Self {
            name: self.name.clone(),
            dates: self.dates[at..].to_vec(),
            values: self.values[at..].to_vec(),
        };
        Ok((head, tail))
    }

    /// Split off the last `holdout` observations.
    pub fn split_tail(&self, holdout: usize) -> Result<(TimeSeries, TimeSeries)> {
        if holdout > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: holdout,
                got: self.len(),
            });
        }
        self.split_at(self.len() - holdout)
    }
}

/// `n` consecutive calendar days starting at `start`.
pub fn consecutive_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    start.iter_days().take(n).collect()
}
