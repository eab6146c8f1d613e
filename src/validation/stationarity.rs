//! Augmented Dickey-Fuller unit-root test.

use crate::utils::ols::ols_fit;
use serde::{Deserialize, Serialize};

/// Significance level for hypothesis tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Significance {
    #[serde(rename = "0.01")]
    OnePercent,
    #[default]
    #[serde(rename = "0.05")]
    FivePercent,
    #[serde(rename = "0.10")]
    TenPercent,
}

impl Significance {
    pub fn alpha(&self) -> f64 {
        match self {
            Significance::OnePercent => 0.01,
            Significance::FivePercent => 0.05,
            Significance::TenPercent => 0.10,
        }
    }
}

/// Critical values for the ADF test with a constant.
#[derive(Debug, Clone, Default)]
pub struct CriticalValues {
    pub cv_1pct: f64,
    pub cv_5pct: f64,
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) response-surface values for `nobs` observations.
    fn for_sample(nobs: usize) -> Self {
        let t = nobs as f64;
        let surface = |b0: f64, b1: f64, b2: f64| b0 + b1 / t + b2 / (t * t);
        Self {
            cv_1pct: surface(-3.43035, -6.5393, -16.786),
            cv_5pct: surface(-2.86154, -2.8903, -4.234),
            cv_10pct: surface(-2.56677, -1.5384, -2.809),
        }
    }

    pub fn at(&self, significance: Significance) -> f64 {
        match significance {
            Significance::OnePercent => self.cv_1pct,
            Significance::FivePercent => self.cv_5pct,
            Significance::TenPercent => self.cv_10pct,
        }
    }
}

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value (approximate)
    pub p_value: f64,
    /// Number of lagged differences used
    pub lags: usize,
    /// Whether the unit root was rejected at the requested significance
    pub is_stationary: bool,
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undetermined(lags: usize) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            is_stationary: false,
            critical_values: CriticalValues::default(),
        }
    }
}

/// Augmented Dickey-Fuller test with constant.
///
/// Regresses `Δy_t = α + β y_{t-1} + Σ γ_i Δy_{t-i} + ε_t` and tests `β = 0`
/// (unit root). The lag order is chosen by AIC over `0..=max_lags` on a common
/// sample; the default maximum is `(n-1)^(1/3)`.
///
/// Returns a NaN statistic (not stationary) when the regression is degenerate,
/// e.g. for very short or constant series.
pub fn adf_test(
    series: &[f64],
    max_lags: Option<usize>,
    significance: Significance,
) -> StationarityResult {
    let n = series.len();
    if n < 6 {
        return StationarityResult::undetermined(0);
    }

    let default_lags = ((n - 1) as f64).powf(1.0 / 3.0).floor() as usize;
    let max_lags = max_lags.unwrap_or(default_lags).min((n - 4) / 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let best_lag = (0..=max_lags)
        .filter_map(|lag| {
            adf_regression(series, &diff, lag, max_lags)
                .map(|fit| (lag, fit.aic()))
                .filter(|(_, aic)| aic.is_finite())
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(lag, _)| lag);

    let Some(lag) = best_lag else {
        return StationarityResult::undetermined(0);
    };

    // Re-estimate on the largest sample available for the chosen lag.
    let Some(fit) = adf_regression(series, &diff, lag, lag) else {
        return StationarityResult::undetermined(lag);
    };

    let statistic = fit.t_stat(1);
    if !statistic.is_finite() {
        return StationarityResult::undetermined(lag);
    }

    let critical_values = CriticalValues::for_sample(fit.n);
    let is_stationary = statistic < critical_values.at(significance);

    StationarityResult {
        statistic,
        p_value: adf_p_value(statistic),
        lags: lag,
        is_stationary,
        critical_values,
    }
}

/// ADF regression using observations from `start` onward (`start >= lag`).
fn adf_regression(
    level: &[f64],
    diff: &[f64],
    lag: usize,
    start: usize,
) -> Option<crate::utils::ols::OlsFit> {
    let rows = diff.len().checked_sub(start)?;
    if rows < lag + 4 {
        return None;
    }

    let y: Vec<f64> = diff[start..].to_vec();
    let mut columns = vec![vec![1.0; rows], level[start..start + rows].to_vec()];
    for i in 1..=lag {
        columns.push(diff[start - i..start - i + rows].to_vec());
    }

    ols_fit(&y, &columns).ok()
}

/// Approximate p-value by interpolating the asymptotic distribution.
fn adf_p_value(t_stat: f64) -> f64 {
    const TABLE: &[(f64, f64)] = &[
        (-4.38, 0.001),
        (-3.96, 0.0025),
        (-3.43, 0.01),
        (-2.86, 0.05),
        (-2.57, 0.10),
        (-2.18, 0.20),
        (-1.94, 0.30),
        (-1.62, 0.40),
        (-1.28, 0.50),
        (-0.84, 0.60),
        (-0.44, 0.80),
        (0.0, 0.90),
        (0.7, 0.99),
    ];

    if t_stat <= TABLE[0].0 {
        return TABLE[0].1;
    }
    for w in TABLE.windows(2) {
        let (x0, p0) = w[0];
        let (x1, p1) = w[1];
        if t_stat <= x1 {
            return p0 + (p1 - p0) * (t_stat - x0) / (x1 - x0);
        }
    }
    0.999
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn white_noise_is_stationary() {
        let series = lcg_noise(300, 7);
        let result = adf_test(&series, None, Significance::FivePercent);

        assert!(result.statistic < -5.0);
        assert!(result.is_stationary);
        assert!(result.p_value <= 0.01);
    }

    #[test]
    fn random_walk_is_not_stationary() {
        let mut walk = vec![0.0; 300];
        for (t, e) in lcg_noise(300, 11).into_iter().enumerate().skip(1) {
            walk[t] = walk[t - 1] + e;
        }
        let result = adf_test(&walk, None, Significance::FivePercent);

        assert!(!result.statistic.is_nan());
        assert!(!result.is_stationary);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn differenced_random_walk_is_stationary() {
        let mut walk = vec![0.0; 300];
        for (t, e) in lcg_noise(300, 11).into_iter().enumerate().skip(1) {
            walk[t] = walk[t - 1] + e;
        }
        let diff: Vec<f64> = walk.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(adf_test(&diff, None, Significance::FivePercent).is_stationary);
    }

    #[test]
    fn short_and_constant_series_are_undetermined() {
        let short = adf_test(&[1.0, 2.0, 3.0], Some(1), Significance::FivePercent);
        assert!(short.statistic.is_nan());
        assert!(!short.is_stationary);

        let constant = adf_test(&[4.0; 50], None, Significance::FivePercent);
        assert!(constant.statistic.is_nan());
    }

    #[test]
    fn critical_values_are_ordered() {
        let cv = CriticalValues::for_sample(100);
        assert!(cv.cv_1pct < cv.cv_5pct);
        assert!(cv.cv_5pct < cv.cv_10pct);
        assert!((cv.cv_5pct + 2.89).abs() < 0.01);
    }

    #[test]
    fn p_value_is_monotone() {
        let mut prev = 0.0;
        for t in [-5.0, -3.5, -2.9, -2.0, -1.0, 0.0, 1.0] {
            let p = adf_p_value(t);
            assert!(p >= prev);
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn significance_alpha() {
        assert_eq!(Significance::default(), Significance::FivePercent);
        assert_eq!(Significance::TenPercent.alpha(), 0.10);
    }
}
