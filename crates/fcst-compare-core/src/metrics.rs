//! Accuracy metrics for holdout evaluation.
//!
//! | Metric | Use When |
//! |--------|----------|
//! | MAE | Need interpretable error in original units |
//! | MAPE | Need a scale-free comparison across series |
//! | RMSE | Want to penalize large errors more heavily |
//!
//! MAPE is reported as a fraction (`0.1` means 10%). A zero in the ground
//! truth makes MAPE undefined; this module raises
//! [`ForecastError::UndefinedMetric`] instead of dropping the term or
//! propagating infinity.

use crate::error::{ForecastError, Result};

/// MAE, MAPE and RMSE for one (ground truth, forecast) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult {
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error, as a fraction
    pub mape: f64,
    /// Root mean squared error
    pub rmse: f64,
}

/// Evaluate a forecast against the held-out ground truth.
///
/// # Errors
/// * [`ForecastError::ShapeMismatch`] if the lengths differ or both are empty
/// * [`ForecastError::UndefinedMetric`] if any ground-truth value is zero
///
/// # Example
/// ```
/// use fcst_compare_core::metrics::evaluate;
/// let result = evaluate(&[100.0, 200.0], &[110.0, 180.0]).unwrap();
/// assert!((result.mae - 15.0).abs() < 1e-12);
/// assert!((result.mape - 0.1).abs() < 1e-12);
/// ```
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<EvaluationResult> {
    Ok(EvaluationResult {
        mae: mae(y_true, y_pred)?,
        mape: mape(y_true, y_pred)?,
        rmse: rmse(y_true, y_pred)?,
    })
}

/// Calculates Mean Absolute Error between actual and predicted values.
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - forecast_i|
pub fn mae(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Mean Absolute Percentage Error as a fraction.
///
/// # Formula
/// MAPE = (1/n) * Σ|actual_i - forecast_i| / |actual_i|
pub fn mape(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;
    if let Some(index) = actual.iter().position(|a| *a == 0.0) {
        return Err(ForecastError::UndefinedMetric { index });
    }
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| ((a - f) / a).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Root Mean Squared Error between actual and predicted values.
///
/// # Formula
/// RMSE = √[(1/n) * Σ(actual_i - forecast_i)²]
pub fn rmse(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

fn validate_inputs(actual: &[f64], forecast: &[f64]) -> Result<()> {
    if actual.len() != forecast.len() || actual.is_empty() {
        return Err(ForecastError::ShapeMismatch {
            actual: actual.len(),
            forecast: forecast.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mae() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let forecast = vec![1.1, 2.2, 2.9, 4.1, 4.8];
        let result = mae(&actual, &forecast).unwrap();
        assert_relative_eq!(result, 0.14, epsilon = 1e-9);
    }

    #[test]
    fn test_mape() {
        let actual = vec![100.0, 200.0, 300.0];
        let forecast = vec![110.0, 180.0, 330.0];
        // Errors: 10%, 10%, 10%
        let result = mape(&actual, &forecast).unwrap();
        assert_relative_eq!(result, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_mape_uses_absolute_denominator() {
        let actual = vec![-50.0, 50.0];
        let forecast = vec![-45.0, 55.0];
        let result = mape(&actual, &forecast).unwrap();
        assert_relative_eq!(result, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_mape_with_zero_truth_is_undefined() {
        let actual = vec![10.0, 0.0, 20.0];
        let forecast = vec![11.0, 1.0, 19.0];
        assert_eq!(
            mape(&actual, &forecast),
            Err(ForecastError::UndefinedMetric { index: 1 })
        );
        assert!(matches!(
            evaluate(&actual, &forecast),
            Err(ForecastError::UndefinedMetric { index: 1 })
        ));
    }

    #[test]
    fn test_rmse() {
        let actual = vec![1.0, 2.0, 3.0];
        let forecast = vec![1.0, 2.0, 4.0];
        let result = rmse(&actual, &forecast).unwrap();
        assert_relative_eq!(result, (1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_identical_sequences_score_zero() {
        let actual = vec![3.0, -1.5, 8.25, 12.0];
        let result = evaluate(&actual, &actual).unwrap();
        assert_eq!(result.mae, 0.0);
        assert_eq!(result.mape, 0.0);
        assert_eq!(result.rmse, 0.0);
    }

    #[test]
    fn test_different_sequences_score_positive() {
        let actual = vec![3.0, -1.5, 8.25, 12.0];
        let mut forecast = actual.clone();
        forecast[2] += 1e-6;
        let result = evaluate(&actual, &forecast).unwrap();
        assert!(result.mae > 0.0);
        assert!(result.mape > 0.0);
        assert!(result.rmse > 0.0);
    }

    #[test]
    fn test_shape_mismatch_for_all_differing_lengths() {
        for n in 0..6 {
            for m in 0..6 {
                if n == m {
                    continue;
                }
                let actual = vec![1.0; n];
                let forecast = vec![1.0; m];
                assert_eq!(
                    evaluate(&actual, &forecast),
                    Err(ForecastError::ShapeMismatch {
                        actual: n,
                        forecast: m
                    })
                );
            }
        }
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(matches!(
            mae(&[], &[]),
            Err(ForecastError::ShapeMismatch { .. })
        ));
    }
}
