//! Differencing and integration utilities for SARIMA models.

/// Apply ordinary differencing `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing `d` times at the given period.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Undo `d` ordinary differences for values following `history`.
///
/// `differenced` continues `difference(history, d)`; the result continues `history`.
pub fn integrate(differenced: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let base = difference(history, level);
        let mut acc = base.last().copied().unwrap_or(0.0);
        for v in result.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    result
}

/// Undo `d` seasonal differences at `period` for values following `history`.
///
/// `differenced` continues `seasonal_difference(history, d, period)`.
pub fn integrate_seasonal(differenced: &[f64], history: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let base = seasonal_difference(history, level, period);
        let mut extended = base.clone();
        for v in result.iter_mut() {
            let t = extended.len();
            let lagged = if t >= period { extended[t - period] } else { 0.0 };
            *v += lagged;
            extended.push(*v);
        }
    }
    result
}
