//! C-compatible type definitions for the FFI boundary.

use fcst_compare_core::ForecastError;
use libc::{c_char, c_double, c_int, size_t};

/// Error codes for the FFI boundary.
///
/// Codes 1-7 match [`ForecastError::to_code`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    ShapeMismatch = 1,
    InsufficientHistory = 2,
    InsufficientData = 3,
    InvalidParameter = 4,
    Convergence = 5,
    UndefinedMetric = 6,
    InvalidInput = 7,
    NullPointer = 8,
    AllocationError = 9,
    PanicCaught = 10,
}

impl From<&ForecastError> for ErrorCode {
    fn from(err: &ForecastError) -> Self {
        match err.to_code() {
            1 => ErrorCode::ShapeMismatch,
            2 => ErrorCode::InsufficientHistory,
            3 => ErrorCode::InsufficientData,
            4 => ErrorCode::InvalidParameter,
            5 => ErrorCode::Convergence,
            6 => ErrorCode::UndefinedMetric,
            _ => ErrorCode::InvalidInput,
        }
    }
}

/// Error structure with message buffer for FFI.
#[repr(C)]
pub struct FcstError {
    pub code: ErrorCode,
    pub message: [c_char; 256],
}

impl FcstError {
    /// Create a success error (no error).
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: [0; 256],
        }
    }

    /// Set an error with code and message.
    pub fn set_error(&mut self, code: ErrorCode, msg: &str) {
        self.code = code;
        copy_message(msg, &mut self.message);
    }
}

impl Default for FcstError {
    fn default() -> Self {
        Self::success()
    }
}

fn copy_message(msg: &str, buffer: &mut [c_char; 256]) {
    let bytes = msg.as_bytes();
    let len = bytes.len().min(255);
    for (i, &b) in bytes[..len].iter().enumerate() {
        buffer[i] = b as c_char;
    }
    buffer[len] = 0; // Null terminator
}

/// Accuracy metrics for one forecast.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MetricsResult {
    pub mae: c_double,
    /// Fraction, not percent
    pub mape: c_double,
    pub rmse: c_double,
}

impl Default for MetricsResult {
    fn default() -> Self {
        Self {
            mae: f64::NAN,
            mape: f64::NAN,
            rmse: f64::NAN,
        }
    }
}

/// Point forecast of one model. Free with `fcst_free_forecast_result`.
#[repr(C)]
pub struct ForecastResult {
    /// Point forecasts array
    pub values: *mut c_double,
    /// Number of forecast points
    pub n_values: size_t,
    /// Model label, e.g. `ARIMA(1,1,1)`
    pub model_name: [c_char; 64],
    /// In-sample one-step MSE (NaN if unavailable)
    pub mse: c_double,
    /// AIC (NaN if the model has no likelihood)
    pub aic: c_double,
    /// BIC (NaN if the model has no likelihood)
    pub bic: c_double,
    /// Number of soft warnings raised while fitting
    pub n_warnings: size_t,
}

impl Default for ForecastResult {
    fn default() -> Self {
        Self {
            values: std::ptr::null_mut(),
            n_values: 0,
            model_name: [0; 64],
            mse: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            n_warnings: 0,
        }
    }
}

/// Options for `fcst_compare`. Defaults match the core defaults.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ComparisonOptions {
    /// Number of trailing observations held out
    pub horizon: c_int,
    /// Holt-Winters level coefficient (α)
    pub level_coefficient: c_double,
    /// Holt-Winters trend coefficient (β)
    pub trend_coefficient: c_double,
    pub seasonal_period: c_int,
    pub arima_p: c_int,
    pub arima_d: c_int,
    pub arima_q: c_int,
    pub ma_window: c_int,
    /// Abort on the first model failure instead of recording it
    pub fail_fast: bool,
    pub parallel: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            horizon: 12,
            level_coefficient: 0.3,
            trend_coefficient: 0.1,
            seasonal_period: 12,
            arima_p: 1,
            arima_d: 1,
            arima_q: 1,
            ma_window: 3,
            fail_fast: false,
            parallel: true,
        }
    }
}

/// Outcome for one model inside a [`ComparisonResult`].
///
/// `status` is the forecast outcome. When it is `Success`, `forecast` is
/// populated and `evaluation_status` tells whether `metrics` is valid.
#[repr(C)]
pub struct ModelComparison {
    pub status: ErrorCode,
    pub evaluation_status: ErrorCode,
    pub forecast: ForecastResult,
    pub metrics: MetricsResult,
    /// Message of whichever step failed
    pub message: [c_char; 256],
}

impl ModelComparison {
    pub(crate) fn set_message(&mut self, msg: &str) {
        copy_message(msg, &mut self.message);
    }
}

impl Default for ModelComparison {
    fn default() -> Self {
        Self {
            status: ErrorCode::Success,
            evaluation_status: ErrorCode::Success,
            forecast: ForecastResult::default(),
            metrics: MetricsResult::default(),
            message: [0; 256],
        }
    }
}

/// Result of `fcst_compare`. Free with `fcst_free_comparison_result`.
#[repr(C)]
pub struct ComparisonResult {
    pub holt_winters: ModelComparison,
    pub arima: ModelComparison,
    pub moving_average: ModelComparison,
    /// Held-out observations
    pub ground_truth: *mut c_double,
    pub n_ground_truth: size_t,
    /// Number of observations the models were fitted on
    pub history_length: size_t,
}

impl Default for ComparisonResult {
    fn default() -> Self {
        Self {
            holt_winters: ModelComparison::default(),
            arima: ModelComparison::default(),
            moving_average: ModelComparison::default(),
            ground_truth: std::ptr::null_mut(),
            n_ground_truth: 0,
            history_length: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_error_code_matches_core_codes() {
        let err = ForecastError::UndefinedMetric { index: 2 };
        assert_eq!(ErrorCode::from(&err) as i32, err.to_code());
        let err = ForecastError::invalid_parameter("d", -1, "must be non-negative");
        assert_eq!(ErrorCode::from(&err), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_set_error_truncates() {
        let mut error = FcstError::default();
        let long = "x".repeat(400);
        error.set_error(ErrorCode::Convergence, &long);
        assert_eq!(error.code, ErrorCode::Convergence);
        let msg = unsafe { CStr::from_ptr(error.message.as_ptr()) };
        assert_eq!(msg.to_bytes().len(), 255);
    }

    #[test]
    fn test_default_options_match_core() {
        let opts = ComparisonOptions::default();
        assert_eq!(opts.horizon, 12);
        assert_eq!((opts.arima_p, opts.arima_d, opts.arima_q), (1, 1, 1));
        assert_eq!(opts.ma_window, 3);
        assert!(!opts.fail_fast);
    }
}
