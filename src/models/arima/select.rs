//! Order selection from stationarity tests and autocorrelation diagnostics.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, seasonal_difference};
use crate::models::arima::model::SarimaFitter;
use crate::models::arima::order::SeasonalOrder;
use crate::utils::stats::{autocorrelation, is_constant, partial_autocorrelations, quantile_normal};
use crate::validation::{adf_test, Significance};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How AR and MA orders are chosen once differencing is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Leading significant ACF/PACF lags.
    #[default]
    Heuristic,
    /// Lowest AIC over a bounded grid.
    InformationCriterion,
}

/// Thresholds for order selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub strategy: SelectionStrategy,
    /// Level for the ADF test and the ACF/PACF significance bound.
    pub significance: Significance,
    /// Series shorter than this are rejected.
    pub min_observations: usize,
    pub max_d: usize,
    /// Upper bound for p, q, P and Q.
    pub max_order: usize,
    /// Seasonal periods considered, in order of preference on ties.
    pub candidate_periods: Vec<usize>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Heuristic,
            significance: Significance::FivePercent,
            min_observations: 10,
            max_d: 2,
            max_order: 2,
            candidate_periods: vec![7, 12],
        }
    }
}

/// Differencing decisions shared by both strategies.
#[derive(Debug, Clone)]
struct DifferencingPlan {
    d: usize,
    cap_d: usize,
    m: usize,
    seasonal: bool,
    /// Series after ordinary and seasonal differencing.
    stationary: Vec<f64>,
}

/// Choose a seasonal ARIMA order from ACF/PACF diagnostics.
///
/// Deterministic for a given series and configuration:
/// 1. `d`: difference until the ADF test rejects a unit root, up to `max_d`;
/// 2. `m`: the candidate period with the largest `|ACF(m)|`;
/// 3. `D = 1` when `ACF(m)` exceeds the significance bound; seasonal terms
///    are dropped when the series covers fewer than two periods;
/// 4. `p`/`q` (and `P`/`Q`) count leading significant PACF/ACF lags at
///    `1, 2` (and `m, 2m`).
///
/// # Errors
/// `InsufficientData` when the series is shorter than `min_observations`.
pub fn select_order(series: &TimeSeries, config: &SelectionConfig) -> Result<SeasonalOrder> {
    let plan = plan_differencing(series, config)?;
    let w = &plan.stationary;
    let bound = significance_bound(config.significance, w.len());

    let max_lag = if plan.seasonal {
        (2 * plan.m).max(config.max_order)
    } else {
        config.max_order
    };
    let pacf = partial_autocorrelations(w, max_lag.min(w.len().saturating_sub(1)));
    let pacf_at = |lag: usize| pacf.get(lag - 1).copied().unwrap_or(f64::NAN);
    let acf_at = |lag: usize| autocorrelation(w, lag);

    let low_lags: Vec<usize> = (1..=config.max_order).collect();
    let p = leading_significant(low_lags.iter().map(|&k| pacf_at(k)), bound);
    let q = leading_significant(low_lags.iter().map(|&k| acf_at(k)), bound);

    let (cap_p, cap_q) = if plan.seasonal {
        let seasonal_lags: Vec<usize> = (1..=config.max_order).map(|k| k * plan.m).collect();
        (
            leading_significant(seasonal_lags.iter().map(|&k| pacf_at(k)), bound),
            leading_significant(seasonal_lags.iter().map(|&k| acf_at(k)), bound),
        )
    } else {
        (0, 0)
    };

    let order = SeasonalOrder::new(p, plan.d, q, cap_p, plan.cap_d, cap_q, plan.m)?;
    debug!(series = %series.name(), %order, "selected order from ACF/PACF");
    Ok(order)
}

/// Choose the lowest-AIC order over `p, q ∈ 0..=max_order` and
/// `P, Q ∈ 0..=1`, keeping `d`, `D` and `m` from the differencing rules of
/// [`select_order`].
///
/// Candidates that fail to fit are skipped; if none fits, the last error is
/// returned.
pub fn select_order_by_aic(
    series: &TimeSeries,
    config: &SelectionConfig,
    fitter: &SarimaFitter,
) -> Result<SeasonalOrder> {
    let plan = plan_differencing(series, config)?;
    let seasonal_max = if plan.seasonal { 1 } else { 0 };

    let mut best: Option<(SeasonalOrder, f64)> = None;
    let mut last_error = None;

    for p in 0..=config.max_order {
        for q in 0..=config.max_order {
            for cap_p in 0..=seasonal_max {
                for cap_q in 0..=seasonal_max {
                    let order = SeasonalOrder::new(p, plan.d, q, cap_p, plan.cap_d, cap_q, plan.m)?;
                    match fitter.fit(series, order) {
                        Ok(model) => {
                            let aic = model.aic();
                            if best.map_or(true, |(_, current)| aic < current) {
                                best = Some((order, aic));
                            }
                        }
                        Err(err) => {
                            debug!(series = %series.name(), %order, error = %err, "candidate skipped");
                            last_error = Some(err);
                        }
                    }
                }
            }
        }
    }

    match (best, last_error) {
        (Some((order, aic)), _) => {
            debug!(series = %series.name(), %order, aic, "selected order by AIC");
            Ok(order)
        }
        (None, Some(err)) => Err(err),
        (None, None) => Err(ForecastError::InvalidParameter(
            "empty candidate grid".to_string(),
        )),
    }
}

fn plan_differencing(series: &TimeSeries, config: &SelectionConfig) -> Result<DifferencingPlan> {
    let n = series.len();
    if n < config.min_observations {
        return Err(ForecastError::InsufficientData {
            needed: config.min_observations,
            got: n,
        });
    }

    let mut w = series.values().to_vec();
    let mut d = 0;
    while d < config.max_d {
        if is_constant(&w) {
            break;
        }
        let adf = adf_test(&w, None, config.significance);
        // An undetermined test gives no evidence for further differencing.
        if adf.statistic.is_nan() || adf.is_stationary {
            break;
        }
        w = difference(&w, 1);
        d += 1;
    }

    let mut best_period: Option<(usize, f64)> = None;
    for &m in config.candidate_periods.iter().filter(|&&m| m > 1) {
        let strength = autocorrelation(&w, m).abs();
        if strength.is_nan() {
            continue;
        }
        if best_period.map_or(true, |(_, best)| strength > best) {
            best_period = Some((m, strength));
        }
    }

    let fallback_period = config
        .candidate_periods
        .iter()
        .copied()
        .find(|&m| m > 1)
        .unwrap_or(7);
    let m = best_period.map_or(fallback_period, |(m, _)| m);
    let seasonal = best_period.is_some() && n >= 2 * m;

    let cap_d = if seasonal
        && autocorrelation(&w, m).abs() > significance_bound(config.significance, w.len())
    {
        1
    } else {
        0
    };
    let stationary = seasonal_difference(&w, cap_d, m);

    debug!(
        series = %series.name(),
        d,
        seasonal_d = cap_d,
        period = m,
        seasonal,
        "differencing plan"
    );

    Ok(DifferencingPlan {
        d,
        cap_d,
        m,
        seasonal,
        stationary,
    })
}

/// Two-sided `z / sqrt(n)` bound for sample autocorrelations.
fn significance_bound(significance: Significance, n: usize) -> f64 {
    quantile_normal(1.0 - significance.alpha() / 2.0) / (n.max(1) as f64).sqrt()
}

fn leading_significant(values: impl Iterator<Item = f64>, bound: f64) -> usize {
    values.take_while(|v| v.abs() > bound).count()
}
