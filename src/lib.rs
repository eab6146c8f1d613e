//! # ridership-forecast
//!
//! Short-horizon forecasting of daily passenger counts per service.
//!
//! For each service column of a raw table the pipeline extracts a contiguous
//! daily series, selects a seasonal ARIMA order, fits it on a training window,
//! scores a retrospective forecast on the hold-out window, refits on the full
//! history and publishes a 7-day forecast to a [`sink::ResultSink`].

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sink;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, TimeSeries, FORECAST_HORIZON};
    pub use crate::data::{extract_series, RawTable};
    pub use crate::error::{ErrorKind, ForecastError, Result};
    pub use crate::models::arima::{
        select_order, FittedModel, SarimaFitter, SeasonalOrder, SelectionConfig,
    };
    pub use crate::pipeline::{ForecastPipeline, PipelineConfig, ServiceOutcome};
    pub use crate::sink::{JsonFileSink, ResultSink};
    pub use crate::utils::{calculate_metrics, evaluate, EvaluationResult};
}
