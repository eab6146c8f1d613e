//! Seasonal ARIMA order `(p, d, q)(P, D, Q)[m]`.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model order (p, d, q, P, D, Q, m).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    #[serde(rename = "P")]
    pub cap_p: usize,
    /// Seasonal differencing order.
    #[serde(rename = "D")]
    pub cap_d: usize,
    /// Seasonal MA order.
    #[serde(rename = "Q")]
    pub cap_q: usize,
    /// Seasonal period.
    pub m: usize,
}

impl SeasonalOrder {
    /// Create a validated order. `m` must be positive, and greater than one
    /// whenever any seasonal component is nonzero.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        m: usize,
    ) -> Result<Self> {
        let order = Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            m,
        };
        order.validate()?;
        Ok(order)
    }

    /// Non-seasonal ARIMA(p, d, q), stored with a weekly period.
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            cap_p: 0,
            cap_d: 0,
            cap_q: 0,
            m: 7,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        if self.m == 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0) {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal terms in {} need a period greater than 1",
                self
            )));
        }
        Ok(())
    }

    /// Check if this is a seasonal model.
    pub fn is_seasonal(&self) -> bool {
        self.m > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Same order with the seasonal part dropped.
    pub fn without_seasonal(&self) -> Self {
        Self {
            cap_p: 0,
            cap_d: 0,
            cap_q: 0,
            ..*self
        }
    }

    /// Same order with ordinary and seasonal differencing dropped.
    pub fn without_differencing(&self) -> Self {
        Self {
            d: 0,
            cap_d: 0,
            ..*self
        }
    }

    /// Degree of the expanded AR polynomial `φ(B)Φ(B^m)`.
    pub fn ar_span(&self) -> usize {
        self.p + self.cap_p * self.m
    }

    /// Degree of the expanded MA polynomial `θ(B)Θ(B^m)`.
    pub fn ma_span(&self) -> usize {
        self.q + self.cap_q * self.m
    }

    /// Observations lost to differencing.
    pub fn differencing_loss(&self) -> usize {
        self.d + self.cap_d * self.m
    }

    /// An intercept (mean or drift) is estimated when `d + D < 2`.
    pub fn includes_constant(&self) -> bool {
        self.d + self.cap_d < 2
    }

    /// Number of estimated coefficients excluding the innovation variance.
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q + usize::from(self.includes_constant())
    }

    /// Minimum series length required to fit this order.
    pub fn min_observations(&self) -> usize {
        self.differencing_loss() + self.ar_span().max(self.ma_span()) + 2
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p, self.d, self.q, self.cap_p, self.cap_d, self.cap_q, self.m
        )
    }
}
