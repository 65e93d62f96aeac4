//! Trailing moving-average baseline.

use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::forecast::Forecast;
use crate::params::ModelKind;

/// Forecast the mean of the last `window` observations, repeated `horizon` times.
///
/// This is the naive baseline: it ignores trend and seasonality.
///
/// # Errors
/// * [`ForecastError::InvalidParameter`] if `window` or `horizon` is zero
/// * [`ForecastError::InsufficientHistory`] if `window > history.len()`
///
/// # Example
/// ```
/// use fcst_compare_core::moving_average::forecast_moving_average;
/// let forecast = forecast_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
/// assert_eq!(forecast.values, vec![5.0, 5.0]);
/// ```
pub fn forecast_moving_average(
    history: &[f64],
    window: usize,
    horizon: usize,
) -> Result<Forecast> {
    if window == 0 {
        return Err(ForecastError::invalid_parameter(
            "window",
            window,
            "must be positive",
        ));
    }
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be positive",
        ));
    }
    if window > history.len() {
        return Err(ForecastError::InsufficientHistory {
            model: ModelKind::MovingAverage.name().to_string(),
            needed: window,
            got: history.len(),
        });
    }

    let level = history[history.len() - window..].iter().sum::<f64>() / window as f64;

    debug!(
        window,
        horizon,
        history_length = history.len(),
        level,
        "SMA forecast"
    );

    let mut forecast = Forecast::new(
        ModelKind::MovingAverage,
        format!("SMA({})", window),
        vec![level; horizon],
    )
    .with_parameter("window", window as f64);
    forecast.mse = in_sample_mse(history, window);
    Ok(forecast)
}

/// One-step-ahead MSE of the rolling mean over the history.
fn in_sample_mse(history: &[f64], window: usize) -> Option<f64> {
    if history.len() <= window {
        return None;
    }
    let mut rolling: f64 = history[..window].iter().sum();
    let mut sse = 0.0;
    for t in window..history.len() {
        let err = history[t] - rolling / window as f64;
        sse += err * err;
        rolling += history[t] - history[t - window];
    }
    Some(sse / (history.len() - window) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_of_last_window() {
        let history = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let forecast = forecast_moving_average(&history, 3, 2).unwrap();
        assert_eq!(forecast.values, vec![5.0, 5.0]);
        assert_eq!(forecast.model, ModelKind::MovingAverage);
        assert_eq!(forecast.label, "SMA(3)");
    }

    #[test]
    fn test_forecast_is_flat() {
        let history: Vec<f64> = (0..40)
            .map(|i| (i as f64 * 0.7).sin() * 10.0 + i as f64)
            .collect();
        for window in [1, 4, 17, 40] {
            let forecast = forecast_moving_average(&history, window, 9).unwrap();
            let expected = history[40 - window..].iter().sum::<f64>() / window as f64;
            assert_eq!(forecast.horizon(), 9);
            for v in &forecast.values {
                assert_relative_eq!(*v, expected, epsilon = 1e-12);
                assert_eq!(*v, forecast.values[0]);
            }
        }
    }

    #[test]
    fn test_window_larger_than_history() {
        assert_eq!(
            forecast_moving_average(&[1.0, 2.0], 3, 1).unwrap_err(),
            ForecastError::InsufficientHistory {
                model: "SMA".into(),
                needed: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_zero_window_and_horizon() {
        assert!(matches!(
            forecast_moving_average(&[1.0, 2.0], 0, 1),
            Err(ForecastError::InvalidParameter { .. })
        ));
        assert!(matches!(
            forecast_moving_average(&[1.0, 2.0], 1, 0),
            Err(ForecastError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_in_sample_mse() {
        // Rolling mean of 2 over [1, 3, 5]: predicts 2.0 for 5.0 -> error 3
        let forecast = forecast_moving_average(&[1.0, 3.0, 5.0], 2, 1).unwrap();
        assert_relative_eq!(forecast.mse.unwrap(), 9.0, epsilon = 1e-12);

        let forecast = forecast_moving_average(&[1.0, 3.0], 2, 1).unwrap();
        assert!(forecast.mse.is_none());
    }

    #[test]
    fn test_idempotent() {
        let history = [3.2, 4.1, 5.9, 2.2, 8.7];
        let a = forecast_moving_average(&history, 4, 3).unwrap();
        let b = forecast_moving_average(&history, 4, 3).unwrap();
        assert_eq!(a, b);
    }
}
