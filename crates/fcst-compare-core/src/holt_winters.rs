//! Additive Holt-Winters (triple exponential smoothing).
//!
//! Model equations:
//! - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
//! - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
//! - Forecast: `ŷ_{n+h} = l_n + h·b_n + s_{(n+h-1) mod m}`
//!
//! α and β are supplied by the caller and held fixed. γ is fitted by
//! minimizing the one-step-ahead sum of squared errors over `[0, 1-α]`.
//!
//! Initial states come from a classical decomposition of the complete
//! seasonal cycles in the history: trend from an OLS line through the cycle
//! means, seasonal indices from period-over-period averages of the
//! detrended values, and level from the deseasonalized first observation.

use anofox_regression::prelude::*;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::forecast::Forecast;
use crate::optimize::{minimize, SimplexConfig};
use crate::params::{validate_smoothing, ModelKind};

/// Initial state before the first smoothing update.
#[derive(Debug, Clone, PartialEq)]
struct InitialState {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Final state after smoothing over the whole history.
#[derive(Debug, Clone)]
struct SmoothedState {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    sse: f64,
}

/// Fit additive Holt-Winters and forecast `horizon` steps ahead.
///
/// # Errors
/// * [`ForecastError::InvalidParameter`] unless `0 < level_coefficient < 1`,
///   `0 < trend_coefficient < 1`, `seasonal_period >= 2` and `horizon > 0`
/// * [`ForecastError::InsufficientHistory`] if the history has fewer than
///   two full seasonal cycles
/// * [`ForecastError::Convergence`] on a constant history or if the
///   seasonal coefficient cannot be fitted
pub fn forecast_holt_winters(
    history: &[f64],
    level_coefficient: f64,
    trend_coefficient: f64,
    seasonal_period: usize,
    horizon: usize,
) -> Result<Forecast> {
    validate_smoothing(level_coefficient, trend_coefficient, seasonal_period)?;
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be positive",
        ));
    }

    let n = history.len();
    let needed = seasonal_period.saturating_mul(2);
    if n < needed {
        return Err(ForecastError::InsufficientHistory {
            model: ModelKind::HoltWinters.name().to_string(),
            needed,
            got: n,
        });
    }

    let variance = history.variance();
    if !variance.is_finite() || variance <= 0.0 {
        return Err(ForecastError::Convergence(
            "Holt-Winters decomposition is singular on a constant history".to_string(),
        ));
    }

    debug!(
        alpha = level_coefficient,
        beta = trend_coefficient,
        seasonal_period,
        horizon,
        history_length = n,
        "HoltWinters fitting"
    );

    let init = initial_state(history, seasonal_period)?;
    let alpha = level_coefficient;
    let beta = trend_coefficient;
    let gamma_max = 1.0 - alpha;

    // γ = (1-α)·σ(x) keeps the search unconstrained.
    let gamma_of = |x: f64| gamma_max / (1.0 + (-x).exp());
    let start = (0.1 / gamma_max).min(0.5);
    let scale = (n - 1) as f64 * variance;

    let min = minimize(
        |x| smooth(history, alpha, beta, gamma_of(x[0]), &init).sse / scale,
        &[(start / (1.0 - start)).ln()],
        SimplexConfig::default(),
    )?;
    let gamma = gamma_of(min.point[0]);
    let fit = smooth(history, alpha, beta, gamma, &init);
    if !fit.sse.is_finite() {
        return Err(ForecastError::Convergence(
            "Holt-Winters smoothing diverged".to_string(),
        ));
    }

    debug!(
        gamma,
        sse = fit.sse,
        objective = min.value,
        iterations = min.iterations,
        "HoltWinters fitted"
    );

    let values = (1..=horizon)
        .map(|h| {
            fit.level + h as f64 * fit.trend + fit.seasonals[(n + h - 1) % seasonal_period]
        })
        .collect();

    let mut forecast = Forecast::new(ModelKind::HoltWinters, "HoltWinters(additive)", values)
        .with_parameter("alpha", alpha)
        .with_parameter("beta", beta)
        .with_parameter("gamma", gamma)
        .with_parameter("seasonal_period", seasonal_period as f64)
        .with_parameter("initial_trend", init.trend);
    forecast.mse = Some(fit.sse / (n - 1) as f64);
    Ok(forecast)
}

/// Decompose the complete cycles of `history` into initial states.
fn initial_state(history: &[f64], period: usize) -> Result<InitialState> {
    let cycles = history.len() / period;
    let span = &history[..cycles * period];

    // Trend: OLS line through the cycle means, placed at the cycle centres.
    let centres: Vec<f64> = (0..cycles)
        .map(|j| (j * period) as f64 + (period - 1) as f64 / 2.0)
        .collect();
    let cycle_means: Vec<f64> = span
        .chunks(period)
        .map(|c| c.iter().sum::<f64>() / period as f64)
        .collect();
    let trend = linear_slope(&centres, &cycle_means)?;

    // Seasonal: period-over-period average of the detrended values.
    let mut seasonals: Vec<f64> = (0..period)
        .map(|i| {
            (0..cycles)
                .map(|j| {
                    let t = j * period + i;
                    span[t] - trend * t as f64
                })
                .sum::<f64>()
                / cycles as f64
        })
        .collect();
    let offset = seasonals.iter().sum::<f64>() / period as f64;
    for s in seasonals.iter_mut() {
        *s -= offset;
    }

    Ok(InitialState {
        level: history[0] - seasonals[0],
        trend,
        seasonals,
    })
}

/// Slope of the OLS line `y = a + b·x`.
fn linear_slope(x: &[f64], y: &[f64]) -> Result<f64> {
    let n = x.len();
    let x_mat = faer::Mat::from_fn(n, 1, |i, _| x[i]);
    let y_col = faer::Col::from_fn(n, |i| y[i]);

    let fitted = OlsRegressor::builder()
        .with_intercept(true)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(|_| {
            ForecastError::Convergence("Trend initialization regression failed".to_string())
        })?;

    let coeffs = fitted.coefficients();
    if coeffs.nrows() == 0 || !coeffs[0].is_finite() {
        return Err(ForecastError::Convergence(
            "Trend initialization produced no finite slope".to_string(),
        ));
    }
    Ok(coeffs[0])
}

/// Run the smoothing recursions over the whole history.
fn smooth(
    history: &[f64],
    alpha: f64,
    beta: f64,
    gamma: f64,
    init: &InitialState,
) -> SmoothedState {
    let period = init.seasonals.len();
    let mut level = init.level;
    let mut trend = init.trend;
    let mut seasonals = init.seasonals.clone();
    let mut sse = 0.0;

    for (t, &y) in history.iter().enumerate().skip(1) {
        let idx = t % period;
        let s = seasonals[idx];
        let error = y - (level + trend + s);
        sse += error * error;

        let prev_level = level;
        level = alpha * (y - s) + (1.0 - alpha) * (prev_level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
    }

    SmoothedState {
        level,
        trend,
        seasonals,
        sse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn seasonal_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50.0 + 0.8 * i as f64 + 6.0 * (2.0 * PI * i as f64 / 12.0).sin())
            .collect()
    }

    #[test]
    fn test_insufficient_history() {
        let history: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert_eq!(
            forecast_holt_winters(&history, 0.3, 0.1, 12, 6).unwrap_err(),
            ForecastError::InsufficientHistory {
                model: "HoltWinters".into(),
                needed: 24,
                got: 20
            }
        );
    }

    #[test]
    fn test_huge_period_is_insufficient_history() {
        let history = seasonal_series(30);
        assert_eq!(
            forecast_holt_winters(&history, 0.3, 0.1, usize::MAX, 3).unwrap_err(),
            ForecastError::InsufficientHistory {
                model: "HoltWinters".into(),
                needed: usize::MAX,
                got: 30
            }
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let history = seasonal_series(48);
        for (alpha, beta, period, horizon) in [
            (0.0, 0.1, 12, 6),
            (0.3, 1.0, 12, 6),
            (0.3, 0.1, 1, 6),
            (0.3, 0.1, 12, 0),
        ] {
            assert!(matches!(
                forecast_holt_winters(&history, alpha, beta, period, horizon),
                Err(ForecastError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_parameters_checked_before_history() {
        assert!(matches!(
            forecast_holt_winters(&[1.0, 2.0], 1.5, 0.1, 12, 3),
            Err(ForecastError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_constant_history_is_convergence_error() {
        let history = vec![7.0; 36];
        assert!(matches!(
            forecast_holt_winters(&history, 0.3, 0.1, 12, 3),
            Err(ForecastError::Convergence(_))
        ));
    }

    #[test]
    fn test_initial_state_decomposition() {
        // Exact linear trend plus a period-4 pattern summing to zero.
        let pattern = [3.0, -1.0, -4.0, 2.0];
        let history: Vec<f64> = (0..12)
            .map(|i| 10.0 + 2.0 * i as f64 + pattern[i % 4])
            .collect();
        let init = initial_state(&history, 4).unwrap();
        assert_relative_eq!(init.trend, 2.0, epsilon = 1e-9);
        for i in 0..4 {
            assert_relative_eq!(init.seasonals[i], pattern[i], epsilon = 1e-9);
        }
        assert_relative_eq!(init.level, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tracks_trend_and_season() {
        let series = seasonal_series(60);
        let (history, truth) = series.split_at(54);
        let forecast = forecast_holt_winters(history, 0.3, 0.1, 12, 6).unwrap();

        assert_eq!(forecast.horizon(), 6);
        assert_eq!(forecast.model, ModelKind::HoltWinters);
        for (f, a) in forecast.values.iter().zip(truth) {
            assert!((f - a).abs() < 3.0, "forecast {} too far from {}", f, a);
        }

        let gamma = forecast.parameter("gamma").unwrap();
        assert!((0.0..=0.7).contains(&gamma));
        assert_eq!(forecast.parameter("alpha"), Some(0.3));
        assert!(forecast.mse.unwrap() >= 0.0);
    }

    #[test]
    fn test_forecast_uses_season_phase() {
        // Pure season with no trend: steps one period apart match.
        let history: Vec<f64> = (0..48)
            .map(|i| 100.0 + 10.0 * (2.0 * PI * i as f64 / 12.0).cos())
            .collect();
        let forecast = forecast_holt_winters(&history, 0.2, 0.05, 12, 24).unwrap();
        for h in 0..12 {
            let diff = forecast.values[h + 12] - forecast.values[h];
            let trend = forecast.values[1] - forecast.values[0]
                - (forecast.values[13] - forecast.values[12]);
            assert!(trend.abs() < 1e-9);
            assert!(diff.abs() < 1.0, "phase drift {} at step {}", diff, h);
        }
    }

    #[test]
    fn test_idempotent() {
        let history = seasonal_series(48);
        let a = forecast_holt_winters(&history, 0.3, 0.1, 12, 6).unwrap();
        let b = forecast_holt_winters(&history, 0.3, 0.1, 12, 6).unwrap();
        assert_eq!(a.values, b.values);
        assert_eq!(a.parameters, b.parameters);
    }
}
