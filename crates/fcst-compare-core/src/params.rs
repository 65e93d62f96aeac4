//! Model hyperparameters.
//!
//! Every parameter struct can be built two ways: `Default::default()` gives
//! the reference settings (α=0.3, β=0.1, period 12, ARIMA(1,1,1), window 3)
//! and `new(..)` validates explicit values. Both produce the same type, so
//! anything holding one of these structs holds a valid configuration.

use crate::arima::forecast_arima;
use crate::error::{ForecastError, Result};
use crate::forecast::Forecast;
use crate::holt_winters::forecast_holt_winters;
use crate::moving_average::forecast_moving_average;

/// The three models the engine compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelKind {
    HoltWinters,
    Arima,
    MovingAverage,
}

impl ModelKind {
    /// All models, in reporting order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::HoltWinters,
        ModelKind::Arima,
        ModelKind::MovingAverage,
    ];

    /// Returns the canonical model name.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::HoltWinters => "HoltWinters",
            ModelKind::Arima => "ARIMA",
            ModelKind::MovingAverage => "SMA",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "holtwinters" | "holt_winters" | "hw" | "exponential_smoothing" | "ets" => {
                Ok(ModelKind::HoltWinters)
            }
            "arima" => Ok(ModelKind::Arima),
            "sma" | "moving_average" | "ma" => Ok(ModelKind::MovingAverage),
            _ => Err(ForecastError::InvalidInput(format!("Unknown model: {}", s))),
        }
    }
}

/// Additive Holt-Winters settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoothingParams {
    level_coefficient: f64,
    trend_coefficient: f64,
    seasonal_period: usize,
}

impl ExponentialSmoothingParams {
    /// Validated constructor.
    ///
    /// # Errors
    /// [`ForecastError::InvalidParameter`] unless `0 < level < 1`,
    /// `0 < trend < 1` and `seasonal_period >= 2`.
    pub fn new(
        level_coefficient: f64,
        trend_coefficient: f64,
        seasonal_period: usize,
    ) -> Result<Self> {
        validate_smoothing(level_coefficient, trend_coefficient, seasonal_period)?;
        Ok(Self {
            level_coefficient,
            trend_coefficient,
            seasonal_period,
        })
    }

    /// Level smoothing coefficient (α).
    pub fn level_coefficient(&self) -> f64 {
        self.level_coefficient
    }

    /// Trend smoothing coefficient (β).
    pub fn trend_coefficient(&self) -> f64 {
        self.trend_coefficient
    }

    /// Seasonal period (number of observations per cycle).
    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }
}

impl Default for ExponentialSmoothingParams {
    fn default() -> Self {
        Self {
            level_coefficient: 0.3,
            trend_coefficient: 0.1,
            seasonal_period: 12,
        }
    }
}

pub(crate) fn validate_smoothing(alpha: f64, beta: f64, period: usize) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ForecastError::invalid_parameter(
            "level_coefficient",
            alpha,
            "must be in (0, 1)",
        ));
    }
    if !(beta > 0.0 && beta < 1.0) {
        return Err(ForecastError::invalid_parameter(
            "trend_coefficient",
            beta,
            "must be in (0, 1)",
        ));
    }
    if period < 2 {
        return Err(ForecastError::invalid_parameter(
            "seasonal_period",
            period,
            "must be at least 2",
        ));
    }
    Ok(())
}

/// ARIMA(p, d, q) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Smallest history length that can identify this order.
    pub fn min_history(&self) -> usize {
        self.p
            .saturating_add(self.d)
            .saturating_add(self.q)
            .saturating_add(1)
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

impl TryFrom<(i64, i64, i64)> for ArimaOrder {
    type Error = ForecastError;

    fn try_from((p, d, q): (i64, i64, i64)) -> Result<Self> {
        let order = |name: &str, value: i64| {
            usize::try_from(value)
                .map_err(|_| ForecastError::invalid_parameter(name, value, "must be non-negative"))
        };
        Ok(Self::new(order("p", p)?, order("d", d)?, order("q", q)?))
    }
}

/// Trailing moving-average settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageParams {
    window: usize,
}

impl MovingAverageParams {
    /// Validated constructor.
    ///
    /// The upper bound (window ≤ history) depends on the data and is
    /// checked when forecasting.
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::invalid_parameter(
                "window",
                window,
                "must be positive",
            ));
        }
        Ok(Self { window })
    }

    /// Number of trailing observations averaged.
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverageParams {
    fn default() -> Self {
        Self { window: 3 }
    }
}

/// Parameters for one model run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelParameters {
    ExponentialSmoothing(ExponentialSmoothingParams),
    Arima(ArimaOrder),
    MovingAverage(MovingAverageParams),
}

impl ModelParameters {
    /// The model these parameters configure.
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParameters::ExponentialSmoothing(_) => ModelKind::HoltWinters,
            ModelParameters::Arima(_) => ModelKind::Arima,
            ModelParameters::MovingAverage(_) => ModelKind::MovingAverage,
        }
    }

    /// Fit the configured model on `history` and forecast `horizon` steps.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Forecast> {
        match self {
            ModelParameters::ExponentialSmoothing(es) => forecast_holt_winters(
                history,
                es.level_coefficient,
                es.trend_coefficient,
                es.seasonal_period,
                horizon,
            ),
            ModelParameters::Arima(order) => {
                forecast_arima(history, order.p, order.d, order.q, horizon)
            }
            ModelParameters::MovingAverage(ma) => {
                forecast_moving_average(history, ma.window, horizon)
            }
        }
    }
}

impl From<ExponentialSmoothingParams> for ModelParameters {
    fn from(params: ExponentialSmoothingParams) -> Self {
        ModelParameters::ExponentialSmoothing(params)
    }
}

impl From<ArimaOrder> for ModelParameters {
    fn from(order: ArimaOrder) -> Self {
        ModelParameters::Arima(order)
    }
}

impl From<MovingAverageParams> for ModelParameters {
    fn from(params: MovingAverageParams) -> Self {
        ModelParameters::MovingAverage(params)
    }
}
