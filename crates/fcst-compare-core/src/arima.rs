//! ARIMA(p, d, q) by exact Gaussian maximum likelihood.
//!
//! The series is differenced `d` times and an ARMA(p, q) model is fitted to
//! the result. The likelihood is evaluated with a Kalman filter over the
//! Harvey state-space form:
//!
//! - state dimension `r = max(p, q + 1)`
//! - transition `T`: AR coefficients in the first column, identity on the
//!   super-diagonal
//! - disturbance loading `R = [1, θ_1, ..., θ_{r-1}]`
//! - observation `y_t = α_t[0]`
//!
//! The innovation variance σ² is concentrated out of the likelihood.
//! Coefficients are searched in an unconstrained space and mapped through
//! partial autocorrelations, so every candidate is stationary and
//! invertible. A mean is estimated only when `d == 0`.

use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::error::{FitWarning, ForecastError, Result};
use crate::forecast::Forecast;
use crate::optimize::{minimize, SimplexConfig};
use crate::params::{ArimaOrder, ModelKind};

/// 5% critical value of the Dickey-Fuller test with constant.
const DF_CRITICAL_5PCT: f64 = -2.86;

/// Shortest differenced series the Dickey-Fuller check runs on.
const DF_MIN_LENGTH: usize = 10;

const LYAPUNOV_MAX_ITERS: usize = 200;
const LYAPUNOV_TOLERANCE: f64 = 1e-12;

/// ARMA coefficients with an optional mean.
#[derive(Debug, Clone, PartialEq)]
struct ArmaCoefficients {
    phi: Vec<f64>,
    theta: Vec<f64>,
    mean: f64,
}

/// Output of one Kalman pass with unit innovation variance.
#[derive(Debug, Clone)]
struct FilterOutput {
    /// Σ v_t² / F_t
    weighted_sse: f64,
    /// Σ ln F_t
    log_det: f64,
    /// Σ v_t²
    raw_sse: f64,
    /// One-step prediction of the state after the last observation
    state: Vec<f64>,
}

impl FilterOutput {
    fn sigma2(&self, n: usize) -> f64 {
        self.weighted_sse / n as f64
    }

    /// Concentrated negative log-likelihood divided by `n`, constants dropped.
    fn scaled_objective(&self, n: usize) -> f64 {
        0.5 * (self.sigma2(n).ln() + self.log_det / n as f64)
    }

    /// Full Gaussian log-likelihood at the concentrated σ².
    fn log_likelihood(&self, n: usize) -> f64 {
        let n_f = n as f64;
        -0.5 * (n_f * (2.0 * std::f64::consts::PI * self.sigma2(n)).ln() + n_f + self.log_det)
    }
}

/// Fit ARIMA(p, d, q) and forecast `horizon` steps ahead.
///
/// # Errors
/// * [`ForecastError::InvalidParameter`] if `horizon` is zero
/// * [`ForecastError::InsufficientHistory`] if `history.len() <= p + d + q`
/// * [`ForecastError::Convergence`] if the likelihood cannot be maximized or
///   the differenced series has no variation
///
/// A differenced series that still looks non-stationary is not an error:
/// the forecast carries a [`FitWarning::NonStationary`].
pub fn forecast_arima(
    history: &[f64],
    p: usize,
    d: usize,
    q: usize,
    horizon: usize,
) -> Result<Forecast> {
    if horizon == 0 {
        return Err(ForecastError::invalid_parameter(
            "horizon",
            horizon,
            "must be positive",
        ));
    }

    let order = ArimaOrder::new(p, d, q);
    let n = history.len();
    if n < order.min_history() {
        return Err(ForecastError::InsufficientHistory {
            model: ModelKind::Arima.name().to_string(),
            needed: order.min_history(),
            got: n,
        });
    }

    debug!(
        order = %order,
        horizon,
        history_length = n,
        "ARIMA fitting"
    );

    let work = difference_n(history, d);
    let m = work.len();
    let with_mean = d == 0;

    let mut warnings = Vec::new();
    if let Some(statistic) = dickey_fuller_statistic(&work) {
        if statistic > DF_CRITICAL_5PCT {
            warn!(
                order = %order,
                statistic,
                critical_value = DF_CRITICAL_5PCT,
                "ARIMA differenced series looks non-stationary"
            );
            warnings.push(FitWarning::NonStationary {
                statistic,
                critical_value: DF_CRITICAL_5PCT,
            });
        }
    }

    let sample_mean = if with_mean { work.iter().mean() } else { 0.0 };
    let sample_sd = if with_mean {
        let var = work.iter().variance();
        if var.is_finite() && var > 0.0 {
            var.sqrt()
        } else {
            1.0
        }
    } else {
        1.0
    };

    let unpack = |x: &[f64]| ArmaCoefficients {
        phi: constrain(&x[..p]),
        theta: constrain(&x[p..p + q]).into_iter().map(|c| -c).collect(),
        mean: if with_mean {
            sample_mean + sample_sd * x[p + q]
        } else {
            0.0
        },
    };

    let n_free = p + q + usize::from(with_mean);
    let (coefficients, objective, iterations) = if n_free == 0 {
        (unpack(&[]), None, 0)
    } else {
        let min = minimize(
            |x| match kalman_filter(&work, &unpack(x)) {
                Some(out) => out.scaled_objective(m),
                None => f64::NAN,
            },
            &vec![0.0; n_free],
            SimplexConfig::default(),
        )?;
        (unpack(&min.point), Some(min.value), min.iterations)
    };

    let fit = kalman_filter(&work, &coefficients).ok_or_else(|| {
        ForecastError::Convergence(format!("{} likelihood is not finite", order))
    })?;
    let sigma2 = fit.sigma2(m);
    if !sigma2.is_finite() || sigma2 <= 0.0 {
        return Err(ForecastError::Convergence(format!(
            "{} innovation variance is degenerate",
            order
        )));
    }

    let log_lik = fit.log_likelihood(m);
    let k = (n_free + 1) as f64;
    let aic = -2.0 * log_lik + 2.0 * k;
    let bic = -2.0 * log_lik + k * (m as f64).ln();

    debug!(
        order = %order,
        phi = ?coefficients.phi,
        theta = ?coefficients.theta,
        sigma2,
        aic,
        objective = ?objective,
        iterations,
        "ARIMA fitted"
    );

    let transition = transition_matrix(&coefficients.phi, state_dim(p, q));
    let mut state = fit.state.clone();
    let mut differenced = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        differenced.push(state[0] + coefficients.mean);
        state = mat_vec(&transition, &state);
    }
    let values = integrate(history, &differenced, d);

    let mut forecast = Forecast::new(ModelKind::Arima, order.to_string(), values);
    for (i, phi) in coefficients.phi.iter().enumerate() {
        forecast = forecast.with_parameter(format!("phi_{}", i + 1), *phi);
    }
    for (i, theta) in coefficients.theta.iter().enumerate() {
        forecast = forecast.with_parameter(format!("theta_{}", i + 1), *theta);
    }
    if with_mean {
        forecast = forecast.with_parameter("mean", coefficients.mean);
    }
    forecast = forecast.with_parameter("sigma2", sigma2);
    forecast.mse = Some(fit.raw_sse / m as f64);
    forecast.aic = Some(aic);
    forecast.bic = Some(bic);
    forecast.warnings = warnings;
    Ok(forecast)
}

fn state_dim(p: usize, q: usize) -> usize {
    p.max(q + 1)
}

/// Apply first differences `d` times.
fn difference_n(values: &[f64], d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `d` rounds of differencing on forecasts of the differenced series.
fn integrate(history: &[f64], forecasts: &[f64], d: usize) -> Vec<f64> {
    let mut out = forecasts.to_vec();
    for k in (0..d).rev() {
        let mut last = difference_n(history, k).last().copied().unwrap_or(0.0);
        for v in out.iter_mut() {
            last += *v;
            *v = last;
        }
    }
    out
}

/// Map unconstrained values to the coefficients of a stationary AR
/// polynomial via partial autocorrelations (Durbin-Levinson).
fn constrain(raw: &[f64]) -> Vec<f64> {
    let mut coeffs: Vec<f64> = Vec::with_capacity(raw.len());
    for (k, &u) in raw.iter().enumerate() {
        let pacf = u.tanh();
        let prev = coeffs.clone();
        for j in 0..k {
            coeffs[j] = prev[j] - pacf * prev[k - 1 - j];
        }
        coeffs.push(pacf);
    }
    coeffs
}

fn transition_matrix(phi: &[f64], r: usize) -> Vec<Vec<f64>> {
    let mut t = vec![vec![0.0; r]; r];
    for (i, row) in t.iter_mut().enumerate() {
        if let Some(&c) = phi.get(i) {
            row[0] = c;
        }
        if i + 1 < r {
            row[i + 1] = 1.0;
        }
    }
    t
}

fn mat_vec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|row| row.iter().zip(x).map(|(a, b)| a * b).sum())
        .collect()
}

fn mat_mul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = b.first().map_or(0, Vec::len);
    a.iter()
        .map(|row| {
            (0..n)
                .map(|j| row.iter().zip(b).map(|(a, b_row)| a * b_row[j]).sum())
                .collect()
        })
        .collect()
}

fn transpose(a: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.first().map_or(0, Vec::len);
    (0..n)
        .map(|j| a.iter().map(|row| row[j]).collect())
        .collect()
}

/// `A · P · Aᵀ`
fn sandwich(a: &[Vec<f64>], p: &[Vec<f64>]) -> Vec<Vec<f64>> {
    mat_mul(&mat_mul(a, p), &transpose(a))
}

/// Stationary state covariance: solve `P = T P Tᵀ + R Rᵀ` by doubling.
fn stationary_covariance(transition: &[Vec<f64>], loading: &[f64]) -> Option<Vec<Vec<f64>>> {
    let mut p: Vec<Vec<f64>> = loading
        .iter()
        .map(|a| loading.iter().map(|b| a * b).collect())
        .collect();
    let mut a = transition.to_vec();

    for _ in 0..LYAPUNOV_MAX_ITERS {
        let step = sandwich(&a, &p);
        let change = step
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        for (row, step_row) in p.iter_mut().zip(&step) {
            for (v, s) in row.iter_mut().zip(step_row) {
                *v += s;
            }
        }
        if !change.is_finite() {
            return None;
        }
        if change < LYAPUNOV_TOLERANCE {
            return Some(p);
        }
        a = mat_mul(&a, &a);
    }
    None
}

/// Run the Kalman filter with unit innovation variance.
///
/// Returns `None` when the model is numerically degenerate.
fn kalman_filter(series: &[f64], coeffs: &ArmaCoefficients) -> Option<FilterOutput> {
    let r = state_dim(coeffs.phi.len(), coeffs.theta.len());
    let transition = transition_matrix(&coeffs.phi, r);
    let mut loading = vec![0.0; r];
    loading[0] = 1.0;
    for (i, theta) in coeffs.theta.iter().enumerate() {
        loading[i + 1] = *theta;
    }
    let rrt: Vec<Vec<f64>> = loading
        .iter()
        .map(|a| loading.iter().map(|b| a * b).collect())
        .collect();

    let mut p = stationary_covariance(&transition, &loading)?;
    let mut a = vec![0.0; r];
    let mut out = FilterOutput {
        weighted_sse: 0.0,
        log_det: 0.0,
        raw_sse: 0.0,
        state: Vec::new(),
    };

    for &y in series {
        let v = y - coeffs.mean - a[0];
        let f = p[0][0];
        if !(f.is_finite() && f > 0.0) {
            return None;
        }
        out.weighted_sse += v * v / f;
        out.log_det += f.ln();
        out.raw_sse += v * v;

        // Measurement update against the first state component.
        let gain: Vec<f64> = p.iter().map(|row| row[0] / f).collect();
        for (ai, g) in a.iter_mut().zip(&gain) {
            *ai += g * v;
        }
        let col0: Vec<f64> = p.iter().map(|row| row[0]).collect();
        for (i, row) in p.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v -= gain[i] * col0[j];
            }
        }

        a = mat_vec(&transition, &a);
        p = sandwich(&transition, &p);
        for (row, q_row) in p.iter_mut().zip(&rrt) {
            for (v, q) in row.iter_mut().zip(q_row) {
                *v += q;
            }
        }
    }

    if !out.weighted_sse.is_finite() || !out.log_det.is_finite() {
        return None;
    }
    out.state = a;
    Some(out)
}

/// t-statistic of ρ in the regression `Δw_t = c + ρ·w_{t-1}`.
///
/// `None` when the series is too short or the regression is degenerate.
fn dickey_fuller_statistic(series: &[f64]) -> Option<f64> {
    if series.len() < DF_MIN_LENGTH {
        return None;
    }
    let level = &series[..series.len() - 1];
    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let n = diff.len() as f64;

    let x_mean = level.iter().sum::<f64>() / n;
    let y_mean = diff.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in level.iter().zip(&diff) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }
    if sxx <= 0.0 {
        return None;
    }

    let rho = sxy / sxx;
    let intercept = y_mean - rho * x_mean;
    let rss: f64 = level
        .iter()
        .zip(&diff)
        .map(|(x, y)| {
            let e = y - intercept - rho * x;
            e * e
        })
        .sum();
    let se = (rss / (n - 2.0) / sxx).sqrt();
    if !(se.is_finite() && se > 0.0) {
        return None;
    }
    Some(rho / se)
}
