//! Error types for the forecast comparison engine.

use thiserror::Error;

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for forecast comparison operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Shape mismatch: actual has {actual} values, forecast has {forecast}")]
    ShapeMismatch { actual: usize, forecast: usize },

    #[error("Insufficient history for {model}: need at least {needed} observations, got {got}")]
    InsufficientHistory {
        model: String,
        needed: usize,
        got: usize,
    },

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Convergence error: {0}")]
    Convergence(String),

    #[error("Undefined metric: ground truth is zero at index {index}, MAPE is undefined")]
    UndefinedMetric { index: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ForecastError {
    /// Shorthand for an [`ForecastError::InvalidParameter`] error.
    pub fn invalid_parameter(
        param: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Convert to an error code for FFI.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::ShapeMismatch { .. } => 1,
            ForecastError::InsufficientHistory { .. } => 2,
            ForecastError::InsufficientData { .. } => 3,
            ForecastError::InvalidParameter { .. } => 4,
            ForecastError::Convergence(_) => 5,
            ForecastError::UndefinedMetric { .. } => 6,
            ForecastError::InvalidInput(_) => 7,
        }
    }
}

/// Recoverable condition found while fitting a model.
///
/// The forecast is still produced; the warning travels with it so callers
/// can decide how much to trust the result.
#[derive(Debug, Clone, PartialEq)]
pub enum FitWarning {
    /// The differenced series still looks non-stationary
    /// (Dickey-Fuller statistic above the 5% critical value).
    NonStationary { statistic: f64, critical_value: f64 },
}

impl std::fmt::Display for FitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitWarning::NonStationary {
                statistic,
                critical_value,
            } => write!(
                f,
                "differenced series looks non-stationary (DF statistic {:.3} > {:.2})",
                statistic, critical_value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(
            ForecastError::ShapeMismatch {
                actual: 3,
                forecast: 2
            }
            .to_code(),
            1
        );
        assert_eq!(
            ForecastError::InsufficientHistory {
                model: "SMA".into(),
                needed: 3,
                got: 2
            }
            .to_code(),
            2
        );
        assert_eq!(
            ForecastError::InsufficientData {
                needed: 15,
                got: 10
            }
            .to_code(),
            3
        );
        assert_eq!(
            ForecastError::invalid_parameter("alpha", 1.5, "must be in (0, 1)").to_code(),
            4
        );
        assert_eq!(ForecastError::Convergence("test".into()).to_code(), 5);
        assert_eq!(ForecastError::UndefinedMetric { index: 0 }.to_code(), 6);
        assert_eq!(ForecastError::InvalidInput("test".into()).to_code(), 7);
    }

    #[test]
    fn test_error_display() {
        let err = ForecastError::InsufficientHistory {
            model: "HoltWinters".into(),
            needed: 24,
            got: 20,
        };
        assert_eq!(
            format!("{}", err),
            "Insufficient history for HoltWinters: need at least 24 observations, got 20"
        );

        let err = ForecastError::invalid_parameter("alpha", 1.5, "must be in (0, 1)");
        assert_eq!(
            format!("{}", err),
            "Invalid parameter 'alpha' = '1.5': must be in (0, 1)"
        );

        let err = ForecastError::UndefinedMetric { index: 4 };
        assert_eq!(
            format!("{}", err),
            "Undefined metric: ground truth is zero at index 4, MAPE is undefined"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = FitWarning::NonStationary {
            statistic: -1.2,
            critical_value: -2.86,
        };
        assert_eq!(
            warning.to_string(),
            "differenced series looks non-stationary (DF statistic -1.200 > -2.86)"
        );
    }
}
