//! Seasonal ARIMA estimation by conditional maximum likelihood.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, seasonal_difference};
use crate::models::arima::order::SeasonalOrder;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{is_constant, mean};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bound on every AR and MA coefficient.
const COEFFICIENT_BOUND: f64 = 0.99;
/// Bound on the standardized intercept.
const INTERCEPT_BOUND: f64 = 10.0;

/// Optimizer settings for [`SarimaFitter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Nelder-Mead iteration budget.
    pub max_iterations: usize,
    /// Relative tolerance on the concentrated log-likelihood.
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-8,
        }
    }
}

/// Fits seasonal ARIMA models of a given order.
///
/// # Example
/// ```
/// use ridership_forecast::core::TimeSeries;
/// use ridership_forecast::models::arima::{SarimaFitter, SeasonalOrder};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
/// let values: Vec<f64> = (0..60).map(|i| 100.0 + [5.0, 3.0, -2.0, 0.0, 1.0, -4.0, -3.0][i % 7]).collect();
/// let series = TimeSeries::from_start("Light Rail", start, values).unwrap();
///
/// let order = SeasonalOrder::new(0, 0, 0, 0, 1, 0, 7).unwrap();
/// let model = SarimaFitter::default().fit(&series, order).unwrap();
/// let forecast = model.forecast(7).unwrap();
/// assert!((forecast.values()[0] - 101.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SarimaFitter {
    config: FitConfig,
}

/// A SARIMA model estimated on a borrowed training series.
#[derive(Debug, Clone)]
pub struct FittedModel<'a> {
    order: SeasonalOrder,
    series: &'a TimeSeries,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    intercept: f64,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    iterations: usize,
    /// Series after ordinary and seasonal differencing.
    pub(crate) differenced: Vec<f64>,
    /// Conditional residuals on the differenced scale, zero before the AR span.
    pub(crate) residuals: Vec<f64>,
}

/// Coefficients unpacked from an optimizer parameter vector.
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn zeros(order: &SeasonalOrder, intercept: f64) -> Self {
        Self {
            intercept,
            ar: vec![0.0; order.p],
            ma: vec![0.0; order.q],
            seasonal_ar: vec![0.0; order.cap_p],
            seasonal_ma: vec![0.0; order.cap_q],
        }
    }

    fn unpack(params: &[f64], order: &SeasonalOrder) -> Self {
        let mut rest = params;
        let intercept = if order.includes_constant() {
            let c = rest[0];
            rest = &rest[1..];
            c
        } else {
            0.0
        };
        let (ar, rest) = rest.split_at(order.p);
        let (ma, rest) = rest.split_at(order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(order.cap_p);
        Self {
            intercept,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma.to_vec(),
        }
    }

    fn ar_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, period, -1.0),
        )
    }

    fn ma_polynomial(&self, period: usize) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, period, 1.0),
        )
    }
}

impl SarimaFitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Estimate a model of the given order on `series`.
    ///
    /// # Errors
    /// `InsufficientData` when the series is shorter than
    /// [`SeasonalOrder::min_observations`], `Convergence` when the optimizer
    /// exhausts its budget, `InvalidParameter` for an invalid order.
    pub fn fit<'a>(&self, series: &'a TimeSeries, order: SeasonalOrder) -> Result<FittedModel<'a>> {
        order.validate()?;

        let needed = order.min_observations();
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        let w = seasonal_difference(&difference(series.values(), order.d), order.cap_d, order.m);
        let start = order.ar_span();
        let n_eff = w.len() - start;

        let (coefficients, iterations) = if is_constant(&w) {
            let level = if order.includes_constant() {
                w.first().copied().unwrap_or(0.0)
            } else {
                0.0
            };
            debug!(series = %series.name(), %order, "differenced series is constant, exact fit");
            (Coefficients::zeros(&order, level), 0)
        } else {
            self.estimate(&w, &order)?
        };

        let ar_poly = coefficients.ar_polynomial(order.m);
        let ma_poly = coefficients.ma_polynomial(order.m);
        let residuals = conditional_residuals(&w, coefficients.intercept, &ar_poly, &ma_poly);
        let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
        let sigma2 = css / n_eff as f64;

        let n = n_eff as f64;
        let log_likelihood =
            -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2.max(f64::MIN_POSITIVE)).ln() + 1.0);
        let k = (order.num_params() + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n.ln();

        debug!(
            series = %series.name(),
            %order,
            iterations,
            sigma2,
            aic,
            "fitted model"
        );

        Ok(FittedModel {
            order,
            series,
            ar: coefficients.ar,
            ma: coefficients.ma,
            seasonal_ar: coefficients.seasonal_ar,
            seasonal_ma: coefficients.seasonal_ma,
            intercept: coefficients.intercept,
            sigma2,
            log_likelihood,
            aic,
            bic,
            iterations,
            differenced: w,
            residuals,
        })
    }

    /// Fit `order`, then progressively simpler orders on failure: seasonal
    /// terms dropped, then seasonal terms and differencing dropped.
    ///
    /// Returns the first model that fits, or the error of the last attempt.
    pub fn fit_with_fallback<'a>(
        &self,
        series: &'a TimeSeries,
        order: SeasonalOrder,
    ) -> Result<FittedModel<'a>> {
        let mut candidates = vec![order];
        let plain = order.without_seasonal();
        for next in [plain, plain.without_differencing()] {
            if !candidates.contains(&next) {
                candidates.push(next);
            }
        }

        let mut last_error = None;
        for (attempt, candidate) in candidates.iter().enumerate() {
            if attempt > 0 {
                warn!(
                    series = %series.name(),
                    from = %candidates[attempt - 1],
                    to = %candidate,
                    "falling back to a simpler order"
                );
            }
            match self.fit(series, *candidate) {
                Ok(model) => return Ok(model),
                Err(err) => {
                    debug!(series = %series.name(), order = %candidate, error = %err, "fit failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ForecastError::InvalidParameter("no candidate orders to fit".to_string())
        }))
    }

    /// Minimize `ln(CSS / n)` over the standardized differenced series.
    fn estimate(&self, w: &[f64], order: &SeasonalOrder) -> Result<(Coefficients, usize)> {
        let with_constant = order.includes_constant();
        let center = if with_constant { mean(w) } else { 0.0 };
        let scale = (w.iter().map(|v| (v - center).powi(2)).sum::<f64>() / w.len() as f64).sqrt();
        let z: Vec<f64> = w.iter().map(|v| (v - center) / scale).collect();

        let mut initial = Vec::with_capacity(order.num_params());
        let mut bounds = Vec::with_capacity(order.num_params());
        if with_constant {
            initial.push(0.0);
            bounds.push((-INTERCEPT_BOUND, INTERCEPT_BOUND));
        }
        for count in [order.p, order.q, order.cap_p, order.cap_q] {
            for i in 0..count {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        if initial.is_empty() {
            return Ok((Coefficients::zeros(order, 0.0), 0));
        }

        let start = order.ar_span();
        let n_eff = (z.len() - start) as f64;
        let objective = |params: &[f64]| {
            let c = Coefficients::unpack(params, order);
            let residuals = conditional_residuals(
                &z,
                c.intercept,
                &c.ar_polynomial(order.m),
                &c.ma_polynomial(order.m),
            );
            let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
            (css / n_eff).max(f64::MIN_POSITIVE).ln()
        };

        let nm_config = NelderMeadConfig {
            max_iter: self.config.max_iterations,
            tolerance: self.config.tolerance,
            ..Default::default()
        };
        let result = nelder_mead(objective, &initial, Some(&bounds), &nm_config);

        if !result.converged || !result.optimal_value.is_finite() {
            return Err(ForecastError::Convergence {
                iterations: result.iterations,
            });
        }

        let mut coefficients = Coefficients::unpack(&result.optimal_point, order);
        coefficients.intercept = center + scale * coefficients.intercept;
        Ok((coefficients, result.iterations))
    }
}

impl<'a> FittedModel<'a> {
    pub fn order(&self) -> SeasonalOrder {
        self.order
    }

    /// The training series.
    pub fn series(&self) -> &'a TimeSeries {
        self.series
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Mean (or drift) of the differenced series; zero when `d + D >= 2`.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Innovation variance on the differenced scale.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Optimizer iterations; zero for exact fits.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Residuals from the end of the AR span onward.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals[self.order.ar_span().min(self.residuals.len())..]
    }

    /// Expanded `φ(B)Φ(B^m)` with leading coefficient 1.
    pub(crate) fn ar_polynomial(&self) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, self.order.m, -1.0),
        )
    }

    /// Expanded `θ(B)Θ(B^m)` with leading coefficient 1.
    pub(crate) fn ma_polynomial(&self) -> Vec<f64> {
        poly_mul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, self.order.m, 1.0),
        )
    }
}

/// `1 + sign * (c_1 B^step + c_2 B^{2 step} + ...)` as a coefficient vector.
pub(crate) fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if *x == 0.0 {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// One-step residuals of `ar(B)(w_t - c) = ma(B) e_t`, conditioning on zero
/// pre-sample shocks. Entries before the AR span are zero.
fn conditional_residuals(w: &[f64], c: f64, ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let start = ar_poly.len().saturating_sub(1);
    let mut residuals = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = c;
        for (k, a) in ar_poly.iter().enumerate().skip(1) {
            if *a != 0.0 {
                pred -= a * (w[t - k] - c);
            }
        }
        for (k, b) in ma_poly.iter().enumerate().skip(1).take(t) {
            if *b != 0.0 {
                pred += b * residuals[t - k];
            }
        }
        residuals[t] = w[t] - pred;
    }
    residuals
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64 - 0.5
            })
            .collect()
    }

    fn series(values: Vec<f64>) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        TimeSeries::from_start("Rapid Route", start, values).unwrap()
    }

    #[test]
    fn polynomial_expansion() {
        // (1 - 0.5B)(1 - 0.3B^3) = 1 - 0.5B - 0.3B^3 + 0.15B^4
        let poly = poly_mul(&lag_polynomial(&[0.5], 1, -1.0), &lag_polynomial(&[0.3], 3, -1.0));
        let expected = [1.0, -0.5, 0.0, -0.3, 0.15];
        assert_eq!(poly.len(), expected.len());
        for (a, b) in poly.iter().zip(expected.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let noise = lcg_noise(600, 3);
        let mut values = vec![100.0; 600];
        for t in 1..600 {
            values[t] = 100.0 + 0.6 * (values[t - 1] - 100.0) + noise[t];
        }
        let ts = series(values);

        let model = SarimaFitter::default()
            .fit(&ts, SeasonalOrder::arima(1, 0, 0))
            .unwrap();

        assert!((model.ar_coefficients()[0] - 0.6).abs() < 0.1);
        assert!((model.intercept() - 100.0).abs() < 0.5);
        assert!(model.sigma2() > 0.0);
        assert!(model.iterations() > 0);
        assert!(model.aic().is_finite());
        assert!(model.bic() > model.aic());
    }

    #[test]
    fn constant_series_is_fit_exactly() {
        let ts = series(vec![42.0; 30]);
        let model = SarimaFitter::default()
            .fit(&ts, SeasonalOrder::arima(1, 0, 1))
            .unwrap();

        assert_eq!(model.iterations(), 0);
        assert_eq!(model.intercept(), 42.0);
        assert_eq!(model.sigma2(), 0.0);
        assert_eq!(model.ar_coefficients(), &[0.0]);
        assert!(model.residuals().iter().all(|r| *r == 0.0));
    }

    #[test]
    fn short_series_is_insufficient() {
        let ts = series(vec![1.0, 2.0, 3.0]);
        let err = SarimaFitter::default()
            .fit(&ts, SeasonalOrder::arima(2, 1, 0))
            .unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 5, got: 3 });
    }

    #[test]
    fn exhausted_budget_is_convergence_error() {
        let values: Vec<f64> = lcg_noise(80, 5).iter().map(|e| 50.0 + 10.0 * e).collect();
        let ts = series(values);
        let fitter = SarimaFitter::new(FitConfig {
            max_iterations: 1,
            ..Default::default()
        });

        let err = fitter.fit(&ts, SeasonalOrder::arima(1, 0, 1)).unwrap_err();
        assert_eq!(err, ForecastError::Convergence { iterations: 1 });

        let err = fitter
            .fit_with_fallback(&ts, SeasonalOrder::arima(1, 0, 1))
            .unwrap_err();
        assert!(matches!(err, ForecastError::Convergence { .. }));
    }

    #[test]
    fn fallback_drops_seasonal_terms() {
        let values: Vec<f64> = lcg_noise(20, 9).iter().map(|e| 200.0 + 20.0 * e).collect();
        let ts = series(values);
        let order = SeasonalOrder::new(1, 0, 0, 1, 1, 0, 12).unwrap();

        assert!(matches!(
            SarimaFitter::default().fit(&ts, order),
            Err(ForecastError::InsufficientData { .. })
        ));

        let model = SarimaFitter::default().fit_with_fallback(&ts, order).unwrap();
        assert_eq!(model.order(), order.without_seasonal());
    }

    #[test]
    fn seasonal_model_fits_weekly_pattern() {
        let pattern = [120.0, 135.0, 130.0, 128.0, 140.0, 60.0, 45.0];
        let noise = lcg_noise(140, 21);
        let values: Vec<f64> = (0..140).map(|t| pattern[t % 7] + 4.0 * noise[t]).collect();
        let ts = series(values);
        let order = SeasonalOrder::new(0, 0, 0, 0, 1, 1, 7).unwrap();

        let model = SarimaFitter::default().fit(&ts, order).unwrap();
        assert_eq!(model.seasonal_ma_coefficients().len(), 1);
        assert!(model.seasonal_ma_coefficients()[0] < 0.0);
        assert!(model.sigma2() < 16.0 * 2.0);
    }
}
