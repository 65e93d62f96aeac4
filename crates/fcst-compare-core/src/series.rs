//! Univariate series type and holdout split.

use chrono::NaiveDateTime;

use crate::error::{ForecastError, Result};

/// An immutable, ordered sequence of finite observations.
///
/// Timestamps are optional; when present there is one per observation and
/// they are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    timestamps: Option<Vec<NaiveDateTime>>,
}

/// A series split into the history used for fitting and the held-out tail.
#[derive(Debug, Clone, Copy)]
pub struct Holdout<'a> {
    /// Observations the models are fitted on
    pub history: &'a [f64],
    /// Held-out tail the forecasts are scored against
    pub ground_truth: &'a [f64],
    /// Timestamps of the held-out tail, if the series carries them
    pub ground_truth_timestamps: Option<&'a [NaiveDateTime]>,
}

impl Series {
    /// Create a position-indexed series.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        validate_values(&values)?;
        Ok(Self {
            values,
            timestamps: None,
        })
    }

    /// Create a timestamp-indexed series.
    pub fn with_timestamps(values: Vec<f64>, timestamps: Vec<NaiveDateTime>) -> Result<Self> {
        validate_values(&values)?;
        if timestamps.len() != values.len() {
            return Err(ForecastError::InvalidInput(format!(
                "Series has {} values but {} timestamps",
                values.len(),
                timestamps.len()
            )));
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidInput(format!(
                "Timestamps must be strictly increasing (index {} -> {})",
                i,
                i + 1
            )));
        }
        Ok(Self {
            values,
            timestamps: Some(timestamps),
        })
    }

    /// Create a series from nullable observations.
    ///
    /// Interior gaps are filled by linear interpolation; leading and trailing
    /// gaps take the nearest observed value.
    pub fn from_optional(values: &[Option<f64>]) -> Result<Self> {
        if values.iter().all(|v| v.is_none()) {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }
        Self::new(fill_nulls_interpolate(values))
    }

    /// Observed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Observation timestamps, if any.
    pub fn timestamps(&self) -> Option<&[NaiveDateTime]> {
        self.timestamps.as_deref()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty series.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split off the last `horizon` observations as ground truth.
    ///
    /// # Errors
    /// * [`ForecastError::InvalidParameter`] if `horizon` is zero
    /// * [`ForecastError::InsufficientData`] if `horizon` exceeds the series length
    pub fn split_holdout(&self, horizon: usize) -> Result<Holdout<'_>> {
        if horizon == 0 {
            return Err(ForecastError::invalid_parameter(
                "horizon",
                horizon,
                "must be positive",
            ));
        }
        if horizon > self.values.len() {
            return Err(ForecastError::InsufficientData {
                needed: horizon,
                got: self.values.len(),
            });
        }

        let cut = self.values.len() - horizon;
        let (history, ground_truth) = self.values.split_at(cut);
        Ok(Holdout {
            history,
            ground_truth,
            ground_truth_timestamps: self.timestamps.as_deref().map(|ts| &ts[cut..]),
        })
    }
}

fn validate_values(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ForecastError::InvalidInput("Series is empty".to_string()));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "Series value at index {} is not finite: {}",
            i, values[i]
        )));
    }
    Ok(())
}

/// Fill NULL values with linear interpolation.
fn fill_nulls_interpolate(values: &[Option<f64>]) -> Vec<f64> {
    let mut result: Vec<f64> = vec![f64::NAN; values.len()];

    let (first, last) = match (
        values.iter().position(|v| v.is_some()),
        values.iter().rposition(|v| v.is_some()),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return result,
    };

    let mut prev: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate().take(last + 1).skip(first) {
        if let Some(v) = *v {
            if let Some((prev_idx, prev_val)) = prev {
                let gap = i - prev_idx;
                let slope = (v - prev_val) / gap as f64;
                for j in 1..gap {
                    result[prev_idx + j] = prev_val + slope * j as f64;
                }
            }
            result[i] = v;
            prev = Some((i, v));
        }
    }

    let head = result[first];
    let tail = result[last];
    for item in result.iter_mut().take(first) {
        *item = head;
    }
    for item in result.iter_mut().skip(last + 1) {
        *item = tail;
    }

    result
}
