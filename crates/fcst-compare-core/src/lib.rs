//! Core library for comparing time series forecasting methods.
//!
//! This crate fits additive Holt-Winters, ARIMA and a moving-average
//! baseline on the same history and scores their forecasts against a
//! held-out tail.

pub mod arima;
pub mod compare;
pub mod error;
pub mod forecast;
pub mod holt_winters;
pub mod metrics;
pub mod moving_average;
mod optimize;
pub mod params;
pub mod series;

// Re-exports for convenience
pub use arima::forecast_arima;
pub use compare::{
    compare, ComparisonConfig, ComparisonResult, FailurePolicy, ModelReport,
};
pub use error::{FitWarning, ForecastError, Result};
pub use forecast::Forecast;
pub use holt_winters::forecast_holt_winters;
pub use metrics::{evaluate, mae, mape, rmse, EvaluationResult};
pub use moving_average::forecast_moving_average;
pub use params::{
    ArimaOrder, ExponentialSmoothingParams, ModelKind, ModelParameters, MovingAverageParams,
};
pub use series::{Holdout, Series};
