//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Quantile function of the standard normal distribution.
///
/// # Example
/// ```
/// use ridership_forecast::utils::quantile_normal;
///
/// // 95% two-sided level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Whether a series is numerically constant.
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        None => true,
        Some(&first) => {
            let scale = first.abs().max(1.0);
            values.iter().all(|v| (v - first).abs() <= 1e-12 * scale)
        }
    }
}

/// Calculate the autocorrelation at a given lag.
///
/// Returns 0 for a constant series and NaN when the series is not longer than the lag.
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    if values.len() <= lag {
        return f64::NAN;
    }
    let m = mean(values);
    let n = values.len();

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for i in 0..n {
        denominator += (values[i] - m).powi(2);
        if i >= lag {
            numerator += (values[i] - m) * (values[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return 0.0;
    }
    numerator / denominator
}

/// Partial autocorrelations for lags `1..=max_lag` (Durbin-Levinson).
///
/// Entries that cannot be computed are NaN.
pub fn partial_autocorrelations(values: &[f64], max_lag: usize) -> Vec<f64> {
    if max_lag == 0 {
        return vec![];
    }
    if values.len() <= max_lag {
        return vec![f64::NAN; max_lag];
    }

    let acf: Vec<f64> = (0..=max_lag).map(|k| autocorrelation(values, k)).collect();
    let mut pacf = vec![f64::NAN; max_lag];
    let mut phi_prev: Vec<f64> = vec![0.0; max_lag + 1];

    for k in 1..=max_lag {
        let mut num = acf[k];
        let mut denom = 1.0;
        for j in 1..k {
            num -= phi_prev[j] * acf[k - j];
            denom -= phi_prev[j] * acf[j];
        }
        if denom.abs() < 1e-10 {
            break;
        }
        let phi_kk = num / denom;

        let mut phi = phi_prev.clone();
        phi[k] = phi_kk;
        for j in 1..k {
            phi[j] = phi_prev[j] - phi_kk * phi_prev[k - j];
        }

        pacf[k - 1] = phi_kk;
        phi_prev = phi;
    }

    pacf
}
