//! FFI boundary layer for the fcst-compare forecasting engine.
//!
//! This crate provides C-compatible functions over `fcst-compare-core`.
//! Every function returns `true` on success and reports failures through an
//! optional `FcstError` out parameter. Arrays in results are allocated with
//! `malloc` and owned by the caller until passed to the matching
//! `fcst_free_*` function.

pub mod allocation;
pub mod conversion;
pub mod error_handling;
pub mod types;

use libc::{c_double, c_int, size_t};
use std::ffi::c_void;

use fcst_compare_core::{
    ComparisonConfig, ExponentialSmoothingParams, FailurePolicy, Forecast, ModelKind, ModelReport,
    MovingAverageParams,
};

use allocation::{copy_to_c_doubles, free_double_array};
use conversion::{build_series, copy_string_to_buffer, to_arima_order, to_usize};
use error_handling::{check_null_pointers, ffi_try, init_error, set_error};
pub use types::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Write a forecast into a caller-provided result.
///
/// Returns false (with `AllocationError`) if the values cannot be copied.
unsafe fn write_forecast(
    forecast: &Forecast,
    out_result: &mut ForecastResult,
    out_error: *mut FcstError,
) -> bool {
    *out_result = ForecastResult::default();
    let Some(values) = copy_to_c_doubles(&forecast.values) else {
        set_error(
            out_error,
            ErrorCode::AllocationError,
            "Memory allocation failed",
        );
        return false;
    };
    out_result.values = values;
    out_result.n_values = forecast.values.len();
    copy_string_to_buffer(&forecast.label, &mut out_result.model_name);
    out_result.mse = forecast.mse.unwrap_or(f64::NAN);
    out_result.aic = forecast.aic.unwrap_or(f64::NAN);
    out_result.bic = forecast.bic.unwrap_or(f64::NAN);
    out_result.n_warnings = forecast.warnings.len();
    true
}

unsafe fn write_model_comparison(
    report: &fcst_compare_core::Result<ModelReport>,
    out: &mut ModelComparison,
    out_error: *mut FcstError,
) -> bool {
    *out = ModelComparison::default();
    match report {
        Err(e) => {
            out.status = ErrorCode::from(e);
            out.set_message(&e.to_string());
            true
        }
        Ok(report) => {
            if !write_forecast(&report.forecast, &mut out.forecast, out_error) {
                return false;
            }
            match &report.evaluation {
                Ok(eval) => {
                    out.metrics = MetricsResult {
                        mae: eval.mae,
                        mape: eval.mape,
                        rmse: eval.rmse,
                    };
                }
                Err(e) => {
                    out.evaluation_status = ErrorCode::from(e);
                    out.set_message(&e.to_string());
                }
            }
            true
        }
    }
}

/// Shared body of the single-model forecast functions.
unsafe fn forecast_entry<F>(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    out_result: *mut ForecastResult,
    out_error: *mut FcstError,
    model: F,
) -> bool
where
    F: FnOnce(&[f64]) -> fcst_compare_core::Result<Forecast>,
{
    init_error(out_error);
    if check_null_pointers(
        out_error,
        &[values as *const c_void, out_result as *const c_void],
    ) {
        return false;
    }

    let forecast = ffi_try(out_error, || {
        let series = build_series(values, validity, length)?;
        model(series.values())
    });

    match forecast {
        Some(forecast) => write_forecast(&forecast, &mut *out_result, out_error),
        None => false,
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Compute MAE, MAPE and RMSE of `forecast` against `actual`.
///
/// # Safety
/// All pointer arguments must be valid and non-null. Arrays must have the specified lengths.
#[no_mangle]
pub unsafe extern "C" fn fcst_evaluate(
    actual: *const c_double,
    actual_len: size_t,
    forecast: *const c_double,
    forecast_len: size_t,
    out_result: *mut MetricsResult,
    out_error: *mut FcstError,
) -> bool {
    init_error(out_error);
    if check_null_pointers(
        out_error,
        &[
            actual as *const c_void,
            forecast as *const c_void,
            out_result as *const c_void,
        ],
    ) {
        return false;
    }

    let result = ffi_try(out_error, || {
        let actual = std::slice::from_raw_parts(actual, actual_len);
        let forecast = std::slice::from_raw_parts(forecast, forecast_len);
        fcst_compare_core::evaluate(actual, forecast)
    });

    match result {
        Some(eval) => {
            *out_result = MetricsResult {
                mae: eval.mae,
                mape: eval.mape,
                rmse: eval.rmse,
            };
            true
        }
        None => false,
    }
}

// ============================================================================
// Forecasting Functions
// ============================================================================

/// Forecast the mean of the last `window` observations.
///
/// # Safety
/// All pointer arguments must be valid and non-null, except `validity` which may be null.
#[no_mangle]
pub unsafe extern "C" fn fcst_forecast_moving_average(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    window: c_int,
    horizon: c_int,
    out_result: *mut ForecastResult,
    out_error: *mut FcstError,
) -> bool {
    forecast_entry(values, validity, length, out_result, out_error, |history| {
        fcst_compare_core::forecast_moving_average(
            history,
            to_usize("window", window)?,
            to_usize("horizon", horizon)?,
        )
    })
}

/// Additive Holt-Winters forecast.
///
/// # Safety
/// All pointer arguments must be valid and non-null, except `validity` which may be null.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn fcst_forecast_holt_winters(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    level_coefficient: c_double,
    trend_coefficient: c_double,
    seasonal_period: c_int,
    horizon: c_int,
    out_result: *mut ForecastResult,
    out_error: *mut FcstError,
) -> bool {
    forecast_entry(values, validity, length, out_result, out_error, |history| {
        fcst_compare_core::forecast_holt_winters(
            history,
            level_coefficient,
            trend_coefficient,
            to_usize("seasonal_period", seasonal_period)?,
            to_usize("horizon", horizon)?,
        )
    })
}

/// ARIMA(p, d, q) forecast.
///
/// # Safety
/// All pointer arguments must be valid and non-null, except `validity` which may be null.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn fcst_forecast_arima(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    p: c_int,
    d: c_int,
    q: c_int,
    horizon: c_int,
    out_result: *mut ForecastResult,
    out_error: *mut FcstError,
) -> bool {
    forecast_entry(values, validity, length, out_result, out_error, |history| {
        let order = to_arima_order(p, d, q)?;
        fcst_compare_core::forecast_arima(
            history,
            order.p,
            order.d,
            order.q,
            to_usize("horizon", horizon)?,
        )
    })
}

// ============================================================================
// Comparison
// ============================================================================

fn comparison_config(opts: &ComparisonOptions) -> fcst_compare_core::Result<ComparisonConfig> {
    let config = ComparisonConfig::new(to_usize("horizon", opts.horizon)?)?
        .with_exponential_smoothing(ExponentialSmoothingParams::new(
            opts.level_coefficient,
            opts.trend_coefficient,
            to_usize("seasonal_period", opts.seasonal_period)?,
        )?)
        .with_arima(to_arima_order(opts.arima_p, opts.arima_d, opts.arima_q)?)
        .with_moving_average(MovingAverageParams::new(to_usize(
            "ma_window",
            opts.ma_window,
        )?)?)
        .with_failure_policy(if opts.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::BestEffort
        })
        .with_parallel(opts.parallel);
    Ok(config)
}

/// Hold out the last `options.horizon` values and compare all three models.
///
/// Per-model failures are reported in the result unless `fail_fast` is set.
///
/// # Safety
/// All pointer arguments must be valid and non-null, except `validity` which may be null.
#[no_mangle]
pub unsafe extern "C" fn fcst_compare(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    options: *const ComparisonOptions,
    out_result: *mut ComparisonResult,
    out_error: *mut FcstError,
) -> bool {
    init_error(out_error);
    if check_null_pointers(
        out_error,
        &[
            values as *const c_void,
            options as *const c_void,
            out_result as *const c_void,
        ],
    ) {
        return false;
    }

    let comparison = ffi_try(out_error, || {
        let series = build_series(values, validity, length)?;
        let config = comparison_config(&*options)?;
        fcst_compare_core::compare(&series, &config)
    });
    let Some(comparison) = comparison else {
        return false;
    };

    let out = &mut *out_result;
    *out = ComparisonResult::default();
    out.history_length = comparison.history_len;

    let mut ok = match copy_to_c_doubles(&comparison.ground_truth) {
        Some(ptr) => {
            out.ground_truth = ptr;
            out.n_ground_truth = comparison.ground_truth.len();
            true
        }
        None => {
            set_error(
                out_error,
                ErrorCode::AllocationError,
                "Memory allocation failed",
            );
            false
        }
    };

    for kind in ModelKind::ALL {
        if !ok {
            break;
        }
        let slot = match kind {
            ModelKind::HoltWinters => &mut out.holt_winters,
            ModelKind::Arima => &mut out.arima,
            ModelKind::MovingAverage => &mut out.moving_average,
        };
        if let Some(report) = comparison.get(kind) {
            ok = write_model_comparison(report, slot, out_error);
        }
    }

    if !ok {
        fcst_free_comparison_result(out_result);
    }
    ok
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a ForecastResult.
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fcst_free_forecast_result(result: *mut ForecastResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    free_double_array(&mut r.values);
    r.n_values = 0;
}

/// Free a ComparisonResult.
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fcst_free_comparison_result(result: *mut ComparisonResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    free_double_array(&mut r.ground_truth);
    r.n_ground_truth = 0;
    fcst_free_forecast_result(&mut r.holt_winters.forecast);
    fcst_free_forecast_result(&mut r.arima.forecast);
    fcst_free_forecast_result(&mut r.moving_average.forecast);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn trend_season(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.5 * t + 10.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
            })
            .collect()
    }

    #[test]
    fn test_evaluate() {
        let actual = [2.0, 4.0];
        let forecast = [1.0, 5.0];
        let mut result = MetricsResult::default();
        let mut error = FcstError::default();
        let ok = unsafe {
            fcst_evaluate(
                actual.as_ptr(),
                2,
                forecast.as_ptr(),
                2,
                &mut result,
                &mut error,
            )
        };
        assert!(ok);
        assert_eq!(result.mae, 1.0);
        assert_eq!(result.mape, 0.375);
        assert_eq!(error.code, ErrorCode::Success);
    }

    #[test]
    fn test_evaluate_shape_mismatch() {
        let actual = [2.0, 4.0];
        let mut result = MetricsResult::default();
        let mut error = FcstError::default();
        let ok = unsafe {
            fcst_evaluate(
                actual.as_ptr(),
                2,
                actual.as_ptr(),
                1,
                &mut result,
                &mut error,
            )
        };
        assert!(!ok);
        assert_eq!(error.code, ErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_moving_average() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut result = ForecastResult::default();
        let mut error = FcstError::default();
        unsafe {
            let ok = fcst_forecast_moving_average(
                values.as_ptr(),
                ptr::null(),
                values.len(),
                3,
                2,
                &mut result,
                &mut error,
            );
            assert!(ok);
            assert_eq!(std::slice::from_raw_parts(result.values, 2), &[5.0, 5.0]);
            let name = CStr::from_ptr(result.model_name.as_ptr());
            assert_eq!(name.to_str().unwrap(), "SMA(3)");
            assert!(result.aic.is_nan());
            fcst_free_forecast_result(&mut result);
            assert!(result.values.is_null());
        }
    }

    #[test]
    fn test_negative_order_rejected() {
        let values = trend_season(30);
        let mut result = ForecastResult::default();
        let mut error = FcstError::default();
        let ok = unsafe {
            fcst_forecast_arima(
                values.as_ptr(),
                ptr::null(),
                values.len(),
                1,
                -1,
                1,
                3,
                &mut result,
                &mut error,
            )
        };
        assert!(!ok);
        assert_eq!(error.code, ErrorCode::InvalidParameter);
        assert!(result.values.is_null());
    }

    #[test]
    fn test_null_pointers() {
        let mut error = FcstError::default();
        let ok = unsafe {
            fcst_forecast_moving_average(
                ptr::null(),
                ptr::null(),
                0,
                3,
                2,
                ptr::null_mut(),
                &mut error,
            )
        };
        assert!(!ok);
        assert_eq!(error.code, ErrorCode::NullPointer);

        // A null error pointer is tolerated.
        let ok = unsafe {
            fcst_compare(
                ptr::null(),
                ptr::null(),
                0,
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        assert!(!ok);
    }

    #[test]
    fn test_compare_best_effort() {
        let values = trend_season(20);
        let options = ComparisonOptions {
            horizon: 4,
            ..ComparisonOptions::default()
        };
        let mut result = ComparisonResult::default();
        let mut error = FcstError::default();
        unsafe {
            let ok = fcst_compare(
                values.as_ptr(),
                ptr::null(),
                values.len(),
                &options,
                &mut result,
                &mut error,
            );
            assert!(ok);
            assert_eq!(result.history_length, 16);
            assert_eq!(result.n_ground_truth, 4);
            assert_eq!(result.holt_winters.status, ErrorCode::InsufficientHistory);
            assert!(result.holt_winters.forecast.values.is_null());
            assert_eq!(result.moving_average.status, ErrorCode::Success);
            assert_eq!(result.moving_average.forecast.n_values, 4);
            assert!(result.moving_average.metrics.mae >= 0.0);
            fcst_free_comparison_result(&mut result);
            assert!(result.ground_truth.is_null());
            assert!(result.moving_average.forecast.values.is_null());
        }
    }

    #[test]
    fn test_compare_fail_fast() {
        let values = trend_season(20);
        let options = ComparisonOptions {
            horizon: 4,
            fail_fast: true,
            ..ComparisonOptions::default()
        };
        let mut result = ComparisonResult::default();
        let mut error = FcstError::default();
        let ok = unsafe {
            fcst_compare(
                values.as_ptr(),
                ptr::null(),
                values.len(),
                &options,
                &mut result,
                &mut error,
            )
        };
        assert!(!ok);
        assert_eq!(error.code, ErrorCode::InsufficientHistory);
    }
}
