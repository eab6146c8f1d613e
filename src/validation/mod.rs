//! Statistical tests used to choose differencing orders.
//!
//! # Example
//!
//! ```
//! use ridership_forecast::validation::{adf_test, Significance};
//!
//! let series: Vec<f64> = (0..120).map(|i| ((i * 37 % 23) as f64) - 11.0).collect();
//! let adf = adf_test(&series, None, Significance::FivePercent);
//! println!("ADF statistic: {} (stationary: {})", adf.statistic, adf.is_stationary);
//! ```

pub mod stationarity;

pub use stationarity::{adf_test, CriticalValues, Significance, StationarityResult};
