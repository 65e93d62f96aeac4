//! Side-by-side comparison of the three forecasters on a held-out tail.
//!
//! The last `horizon` observations of the series are held out as ground
//! truth. Each model is fitted on the remaining history, forecasts
//! `horizon` steps, and is scored against the held-out values.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
#[cfg(feature = "native")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::forecast::Forecast;
use crate::metrics::{evaluate, EvaluationResult};
use crate::params::{
    ArimaOrder, ExponentialSmoothingParams, ModelKind, ModelParameters, MovingAverageParams,
};
use crate::series::Series;

/// What to do when one of the models fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record each model's error in its slot and keep going.
    #[default]
    BestEffort,
    /// Abort on the first error, in [`ModelKind`] order.
    FailFast,
}

/// Settings for one comparison run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonConfig {
    /// Number of trailing observations held out and forecast
    pub horizon: usize,
    pub es: ExponentialSmoothingParams,
    pub arima: ArimaOrder,
    pub ma: MovingAverageParams,
    pub failure_policy: FailurePolicy,
    /// Run the models on the rayon pool (ignored without the `native` feature)
    pub parallel: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            es: ExponentialSmoothingParams::default(),
            arima: ArimaOrder::default(),
            ma: MovingAverageParams::default(),
            failure_policy: FailurePolicy::default(),
            parallel: true,
        }
    }
}

impl ComparisonConfig {
    /// Default model settings with the given horizon.
    ///
    /// # Errors
    /// [`ForecastError::InvalidParameter`] if `horizon` is zero.
    pub fn new(horizon: usize) -> Result<Self> {
        validate_horizon(horizon)?;
        Ok(Self {
            horizon,
            ..Self::default()
        })
    }

    pub fn with_exponential_smoothing(mut self, es: ExponentialSmoothingParams) -> Self {
        self.es = es;
        self
    }

    pub fn with_arima(mut self, arima: ArimaOrder) -> Self {
        self.arima = arima;
        self
    }

    pub fn with_moving_average(mut self, ma: MovingAverageParams) -> Self {
        self.ma = ma;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parameters of every model, in [`ModelKind`] order.
    pub fn model_parameters(&self) -> [ModelParameters; 3] {
        [self.es.into(), self.arima.into(), self.ma.into()]
    }
}

fn validate_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be positive",
        ));
    }
    Ok(())
}

/// One model's forecast and its score against the held-out values.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub forecast: Forecast,
    /// Fails on its own when a metric is undefined for this ground truth
    pub evaluation: Result<EvaluationResult>,
}

/// Outcome of [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Number of observations the models were fitted on
    pub history_len: usize,
    /// Held-out observations
    pub ground_truth: Vec<f64>,
    /// Timestamps of the held-out observations, if the series had any
    pub ground_truth_timestamps: Option<Vec<NaiveDateTime>>,
    /// Per-model report, or the error that prevented a forecast
    pub models: BTreeMap<ModelKind, Result<ModelReport>>,
}

impl ComparisonResult {
    pub fn get(&self, kind: ModelKind) -> Option<&Result<ModelReport>> {
        self.models.get(&kind)
    }

    /// Model with the lowest MAE among those that forecast and scored.
    pub fn best_by_mae(&self) -> Option<(ModelKind, &ModelReport)> {
        self.best_by(|e| e.mae)
    }

    /// Model with the lowest MAPE among those that forecast and scored.
    pub fn best_by_mape(&self) -> Option<(ModelKind, &ModelReport)> {
        self.best_by(|e| e.mape)
    }

    fn best_by(
        &self,
        metric: impl Fn(&EvaluationResult) -> f64,
    ) -> Option<(ModelKind, &ModelReport)> {
        self.models
            .iter()
            .filter_map(|(kind, report)| {
                let report = report.as_ref().ok()?;
                let score = metric(report.evaluation.as_ref().ok()?);
                Some((*kind, report, score))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(kind, report, _)| (kind, report))
    }
}

/// Hold out the tail of `series`, run all three models and score them.
///
/// # Errors
/// * [`ForecastError::InvalidParameter`] if `config.horizon` is zero
/// * [`ForecastError::InsufficientData`] if `config.horizon > series.len()`
/// * under [`FailurePolicy::FailFast`], the first model or evaluation error
///
/// Under [`FailurePolicy::BestEffort`] model errors are recorded in
/// [`ComparisonResult::models`] instead.
pub fn compare(series: &Series, config: &ComparisonConfig) -> Result<ComparisonResult> {
    validate_horizon(config.horizon)?;
    let holdout = series.split_holdout(config.horizon)?;

    debug!(
        series_length = series.len(),
        horizon = config.horizon,
        parallel = config.parallel,
        policy = ?config.failure_policy,
        "Comparing forecasters"
    );

    let runs = config.model_parameters();
    let run = |params: &ModelParameters| -> (ModelKind, Result<ModelReport>) {
        let report = params
            .forecast(holdout.history, config.horizon)
            .map(|forecast| ModelReport {
                evaluation: evaluate(holdout.ground_truth, &forecast.values),
                forecast,
            });
        (params.kind(), report)
    };

    #[cfg(feature = "native")]
    let results: Vec<(ModelKind, Result<ModelReport>)> = if config.parallel {
        runs.par_iter().map(run).collect()
    } else {
        runs.iter().map(run).collect()
    };
    #[cfg(not(feature = "native"))]
    let results: Vec<(ModelKind, Result<ModelReport>)> = runs.iter().map(run).collect();

    let mut models = BTreeMap::new();
    for (kind, report) in results {
        let failure = match &report {
            Err(e) => Some(e),
            Ok(ModelReport {
                evaluation: Err(e), ..
            }) => Some(e),
            Ok(_) => None,
        };
        if let Some(e) = failure {
            if config.failure_policy == FailurePolicy::FailFast {
                return Err(e.clone());
            }
            warn!(model = %kind, error = %e, "Model failed during comparison");
        }
        models.insert(kind, report);
    }

    Ok(ComparisonResult {
        history_len: holdout.history.len(),
        ground_truth: holdout.ground_truth.to_vec(),
        ground_truth_timestamps: holdout.ground_truth_timestamps.map(<[_]>::to_vec),
        models,
    })
}
