//! Ordinary Least Squares regression for small dense designs.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression `y = X @ beta + e`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// One coefficient per design column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations.
    pub n: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_stat(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian AIC: `n ln(RSS / n) + 2k`.
    pub fn aic(&self) -> f64 {
        let n = self.n as f64;
        n * (self.rss / n).ln() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit OLS with the given design columns (include a column of ones for an intercept).
///
/// Solves the normal equations with a Cholesky decomposition.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    let k = columns.len();

    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    if let Some(col) = columns.iter().find(|c| c.len() != n) {
        return Err(ForecastError::Alignment(format!(
            "design column has {} rows, response has {}",
            col.len(),
            n
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::InvalidParameter("OLS design matrix is not positive definite".into())
    })?;
    let coefficients = cholesky_solve(&chol, &xty);

    let rss: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|j| columns[j][t] * coefficients[j]).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();
    let sigma_sq = rss / (n - k) as f64;

    // diag((X'X)^-1) via unit-vector solves
    let std_errors = (0..k)
        .map(|j| {
            let mut e = vec![0.0; k];
            e[j] = 1.0;
            let col = cholesky_solve(&chol, &e);
            (sigma_sq * col[j]).max(0.0).sqrt()
        })
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        rss,
        n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 1e-12 * a[i][i].abs().max(1e-300) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}
