//! Holt-Winters exponential smoothing with additive trend and optional
//! additive seasonality.
//!
//! Recursions, for observation `y[t]` and seasonal period `m`:
//!
//! ```text
//! level[t]  = alpha * (y[t] - s[t-m]) + (1 - alpha) * (level[t-1] + trend[t-1])
//! trend[t]  = beta  * (level[t] - level[t-1]) + (1 - beta) * trend[t-1]
//! s[t]      = gamma * (y[t] - level[t-1] - trend[t-1]) + (1 - gamma) * s[t-m]
//! ```
//!
//! The one-step fitted value for `y[t]` is `level[t-1] + trend[t-1] + s[t-m]`.
//! The smoothing parameters and the initial level and trend are fitted
//! together by minimising the in-sample sum of squared one-step errors. The
//! smoothing parameters stay in `[0, 1]`; the initial states are unbounded.
//!
//! The search starts from the simple heuristic states, which also supply the
//! initial seasonals:
//! - trend only: `level = y[0]`, `trend = y[1] - y[0]`
//! - seasonal: `level = mean(y[..m])`,
//!   `trend = (mean(y[m..2m]) - mean(y[..m])) / m`, `s[i] = y[i] - level`

use serde::{Deserialize, Serialize};

use super::optimize::NelderMead;
use crate::error::ForecastFailure;

const START_ALPHA: f64 = 0.5;
const START_BETA: f64 = 0.1;
const START_GAMMA: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Seasonality {
    None,
    Additive { period: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
}

impl SmoothingParams {
    fn from_point(point: &[f64]) -> Self {
        Self {
            alpha: point[0],
            beta: point[1],
            gamma: point.get(2).copied(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoltWinters {
    seasonality: Seasonality,
    optimizer: NelderMead,
}

impl HoltWinters {
    pub fn new(seasonality: Seasonality, optimizer: NelderMead) -> Self {
        Self {
            seasonality,
            optimizer,
        }
    }

    pub fn seasonality(&self) -> Seasonality {
        self.seasonality
    }

    /// Minimum series length this model can be fitted to.
    pub fn min_observations(&self) -> usize {
        match self.seasonality {
            Seasonality::None => 2,
            Seasonality::Additive { period } => 2 * period.max(1),
        }
    }

    pub fn fit(&self, y: &[f64]) -> Result<FittedModel, ForecastFailure> {
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ForecastFailure::NonFinite);
        }
        let required = self.min_observations();
        if y.len() < required {
            return Err(ForecastFailure::InsufficientData {
                len: y.len(),
                required,
            });
        }

        // Search vector: [alpha, beta, (gamma), level0, trend0].
        let init = InitialState::estimate(y, self.seasonality);
        let mut start = match self.seasonality {
            Seasonality::None => vec![START_ALPHA, START_BETA],
            Seasonality::Additive { .. } => vec![START_ALPHA, START_BETA, START_GAMMA],
        };
        let n_params = start.len();
        start.extend([init.level, init.trend]);

        let open = (f64::NEG_INFINITY, f64::INFINITY);
        let mut bounds = vec![(self.optimizer.lower, self.optimizer.upper); n_params];
        bounds.extend([open, open]);

        let min = self.optimizer.minimize_within(
            |point| {
                let params = SmoothingParams::from_point(&point[..n_params]);
                smooth(y, &init.starting_at(point[n_params], point[n_params + 1]), params).sse
            },
            &start,
            &bounds,
        );
        if !min.value.is_finite() {
            return Err(ForecastFailure::Diverged {
                reason: "no finite sum of squared errors in parameter space".into(),
            });
        }

        let params = SmoothingParams::from_point(&min.point[..n_params]);
        let init = init.starting_at(min.point[n_params], min.point[n_params + 1]);
        let run = smooth(y, &init, params);
        if !(run.sse.is_finite() && run.level.is_finite() && run.trend.is_finite()) {
            return Err(ForecastFailure::Diverged {
                reason: "smoothed states are not finite".into(),
            });
        }

        Ok(FittedModel {
            seasonality: self.seasonality,
            params,
            initial_level: init.level,
            initial_trend: init.trend,
            level: run.level,
            trend: run.trend,
            seasonals: run.seasonals,
            n_obs: y.len(),
            sse: run.sse,
            iterations: min.iterations,
            converged: min.converged,
        })
    }
}

/// A fitted model: smoothing parameters plus the final states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    pub seasonality: Seasonality,
    pub params: SmoothingParams,
    /// Fitted state before the first observation.
    pub initial_level: f64,
    pub initial_trend: f64,
    pub level: f64,
    pub trend: f64,
    /// Seasonal ring buffer; slot `t % m` holds the state used for `y[t]`.
    #[serde(skip)]
    seasonals: Vec<f64>,
    pub n_obs: usize,
    pub sse: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl FittedModel {
    /// In-sample mean squared one-step error.
    pub fn mse(&self) -> f64 {
        self.sse / self.n_obs as f64
    }

    /// Point forecasts for horizons `1..=steps`.
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>, ForecastFailure> {
        if steps == 0 {
            return Err(ForecastFailure::ZeroHorizon);
        }
        let m = self.seasonals.len();
        let values: Vec<f64> = (1..=steps)
            .map(|h| {
                let season = if m > 0 {
                    self.seasonals[(self.n_obs + h - 1) % m]
                } else {
                    0.0
                };
                self.level + h as f64 * self.trend + season
            })
            .collect();

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastFailure::Diverged {
                reason: "forecast is not finite".into(),
            });
        }
        Ok(values)
    }
}

#[derive(Debug, Clone)]
struct InitialState {
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

impl InitialState {
    /// Callers guarantee `y` is long enough for `seasonality`.
    fn estimate(y: &[f64], seasonality: Seasonality) -> Self {
        match seasonality {
            Seasonality::None => Self {
                level: y[0],
                trend: y[1] - y[0],
                seasonals: Vec::new(),
            },
            Seasonality::Additive { period } => {
                let m = period.max(1);
                let first = mean(&y[..m]);
                let second = mean(&y[m..2 * m]);
                Self {
                    level: first,
                    trend: (second - first) / m as f64,
                    seasonals: y[..m].iter().map(|v| v - first).collect(),
                }
            }
        }
    }

    /// The same seasonals with a different starting level and trend.
    fn starting_at(&self, level: f64, trend: f64) -> Self {
        Self {
            level,
            trend,
            seasonals: self.seasonals.clone(),
        }
    }
}

struct Smoothed {
    sse: f64,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

fn smooth(y: &[f64], init: &InitialState, params: SmoothingParams) -> Smoothed {
    let SmoothingParams { alpha, beta, gamma } = params;
    let gamma = gamma.unwrap_or(0.0);
    let m = init.seasonals.len();

    let mut level = init.level;
    let mut trend = init.trend;
    let mut seasonals = init.seasonals.clone();
    let mut sse = 0.0;

    for (t, &obs) in y.iter().enumerate() {
        let season = if m > 0 { seasonals[t % m] } else { 0.0 };
        let err = obs - (level + trend + season);
        sse += err * err;

        let prev_level = level;
        let prev_trend = trend;
        level = alpha * (obs - season) + (1.0 - alpha) * (prev_level + prev_trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * prev_trend;
        if m > 0 {
            seasonals[t % m] = gamma * (obs - prev_level - prev_trend) + (1.0 - gamma) * season;
        }
    }

    Smoothed {
        sse,
        level,
        trend,
        seasonals,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
