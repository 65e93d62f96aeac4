//! Forecast output shared by all models.

use crate::error::FitWarning;
use crate::params::ModelKind;

/// Point forecast produced by one model.
///
/// Carries no prediction intervals; the fit diagnostics are informational.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Model that produced the forecast
    pub model: ModelKind,
    /// Human-readable model label, e.g. `ARIMA(1,1,1)`
    pub label: String,
    /// Point forecasts, one per horizon step
    pub values: Vec<f64>,
    /// Fitted or fixed parameter values, by name
    pub parameters: Vec<(String, f64)>,
    /// In-sample one-step-ahead MSE
    pub mse: Option<f64>,
    /// AIC if the model has a likelihood
    pub aic: Option<f64>,
    /// BIC if the model has a likelihood
    pub bic: Option<f64>,
    /// Recoverable issues found while fitting
    pub warnings: Vec<FitWarning>,
}

impl Forecast {
    pub(crate) fn new(model: ModelKind, label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            model,
            label: label.into(),
            values,
            parameters: Vec::new(),
            mse: None,
            aic: None,
            bic: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}
