//! Forecasting models.

pub mod arima;

pub use arima::{FittedModel, SarimaFitter, SeasonalOrder};
