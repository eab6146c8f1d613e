//! Accuracy metrics for forecast evaluation.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Accuracy of a forecast over a hold-out window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error in percent, over days with nonzero actuals.
    /// `None` when every actual value is zero.
    pub mape: Option<f64>,
}

/// Evaluate a forecast against the ground truth covering the same dates.
pub fn evaluate(forecast: &Forecast, truth: &TimeSeries) -> Result<EvaluationResult> {
    if forecast.horizon() != truth.len() {
        return Err(ForecastError::Alignment(format!(
            "forecast covers {} days but ground truth has {}",
            forecast.horizon(),
            truth.len()
        )));
    }

    if let Some((f, t)) = forecast
        .dates()
        .iter()
        .zip(truth.dates())
        .find(|(f, t)| f != t)
    {
        return Err(ForecastError::Alignment(format!(
            "forecast date {} does not match ground-truth date {}",
            f, t
        )));
    }

    calculate_metrics(truth.values(), forecast.values())
}

/// Calculate MAE, RMSE and MAPE between actual and predicted values.
///
/// # Arguments
/// * `actual` - Observed values
/// * `predicted` - Forecast values, aligned with `actual`
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<EvaluationResult> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::Alignment(format!(
            "{} actual values vs {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(ForecastError::Alignment(
            "cannot evaluate an empty window".to_string(),
        ));
    }

    Ok(EvaluationResult {
        mae: mae(actual, predicted),
        rmse: rmse(actual, predicted),
        mape: mape(actual, predicted),
    })
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

/// MAPE in percent over the days where the actual value is nonzero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let (sum, count) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(100.0 * sum / count as f64)
    }
}
