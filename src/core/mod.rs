//! Core data structures for daily ridership forecasting.

mod forecast;
mod time_series;

pub use forecast::{Forecast, PredictionInterval, FORECAST_HORIZON};
pub use time_series::{consecutive_dates, TimeSeries};
