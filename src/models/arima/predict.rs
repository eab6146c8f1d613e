//! Forecast generation from a fitted SARIMA model.

use crate::core::{Forecast, PredictionInterval};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate, integrate_seasonal};
use crate::models::arima::model::{lag_polynomial, poly_mul, FittedModel};
use crate::utils::stats::quantile_normal;

impl<'a> FittedModel<'a> {
    /// Point forecast for the `horizon` days after the training series.
    ///
    /// Values are clipped at zero.
    pub fn forecast(&self, horizon: usize) -> Result<Forecast> {
        check_horizon(horizon)?;
        let values = self
            .forecast_unclipped(horizon)
            .into_iter()
            .map(|v| v.max(0.0))
            .collect();
        Forecast::new(self.series().future_dates(horizon)?, values)
    }

    /// Point forecast with symmetric normal intervals at `level` (e.g. 0.95).
    ///
    /// Interval widths come from the ψ-weights of the model including its
    /// differencing operators. Lower bounds are clipped at zero.
    pub fn forecast_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        check_horizon(horizon)?;
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {}",
                level
            )));
        }

        let raw = self.forecast_unclipped(horizon);
        let z = quantile_normal(0.5 + level / 2.0);
        let psi = self.psi_weights(horizon);

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (point, weight) in raw.iter().zip(psi.iter()) {
            cumulative += weight * weight;
            let half_width = z * (self.sigma2() * cumulative).sqrt();
            lower.push((point - half_width).max(0.0));
            upper.push((point + half_width).max(0.0));
        }

        let values = raw.iter().map(|v| v.max(0.0)).collect();
        Forecast::new(self.series().future_dates(horizon)?, values)?.with_interval(
            PredictionInterval {
                level,
                lower,
                upper,
            },
        )
    }

    /// The first `n` MA(∞) weights of the integrated model, `ψ_0 = 1`.
    pub fn psi_weights(&self, n: usize) -> Vec<f64> {
        let order = self.order();
        let mut full_ar = self.ar_polynomial();
        for _ in 0..order.d {
            full_ar = poly_mul(&full_ar, &lag_polynomial(&[1.0], 1, -1.0));
        }
        for _ in 0..order.cap_d {
            full_ar = poly_mul(&full_ar, &lag_polynomial(&[1.0], order.m, -1.0));
        }
        let ma = self.ma_polynomial();

        let mut psi = Vec::with_capacity(n);
        for j in 0..n {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = ma.get(j).copied().unwrap_or(0.0);
            for k in 1..=j.min(full_ar.len().saturating_sub(1)) {
                value -= full_ar[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }

    /// Recurse the ARMA equation forward with zero future shocks, then undo
    /// seasonal and ordinary differencing.
    fn forecast_unclipped(&self, horizon: usize) -> Vec<f64> {
        let order = self.order();
        let c = self.intercept();
        let ar = self.ar_polynomial();
        let ma = self.ma_polynomial();

        let observed = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        w.reserve(horizon);
        shocks.reserve(horizon);

        for _ in 0..horizon {
            let t = w.len();
            let mut pred = c;
            for (k, a) in ar.iter().enumerate().skip(1).take(t) {
                pred -= a * (w[t - k] - c);
            }
            for (k, b) in ma.iter().enumerate().skip(1).take(t) {
                pred += b * shocks[t - k];
            }
            w.push(pred);
            shocks.push(0.0);
        }

        let history = self.series().values();
        let x_history = difference(history, order.d);
        let x_future = integrate_seasonal(&w[observed..], &x_history, order.cap_d, order.m);
        integrate(&x_future, history, order.d)
    }
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be positive".to_string(),
        ));
    }
    Ok(())
}
