//! Seasonal ARIMA (SARIMA) models.
//!
//! This module provides:
//! - [`SeasonalOrder`], the `(p, d, q)(P, D, Q)[m]` model order
//! - [`select_order`] and [`select_order_by_aic`] for order selection
//! - [`SarimaFitter`], conditional maximum-likelihood estimation with an
//!   order fallback ladder
//! - [`FittedModel::forecast`] and [`FittedModel::forecast_with_intervals`]

mod diff;
mod model;
mod order;
mod predict;
mod select;

pub use diff::{difference, integrate, integrate_seasonal, seasonal_difference};
pub use model::{FitConfig, FittedModel, SarimaFitter};
pub use order::SeasonalOrder;
pub use select::{select_order, select_order_by_aic, SelectionConfig, SelectionStrategy};
