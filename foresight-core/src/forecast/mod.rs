//! One-step-ahead price forecasting.
//!
//! `TrendSmoothing` is the fixed model heuristic: an additive-trend Holt model
//! for short histories, switching to additive Holt-Winters with an annual
//! period once two full cycles of data exist.

pub mod holt_winters;
pub mod optimize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ForecastFailure;

pub use holt_winters::{FittedModel, HoltWinters, Seasonality, SmoothingParams};
pub use optimize::NelderMead;

pub const SEASONAL_PERIOD: usize = 365;
pub const SEASONAL_THRESHOLD: usize = 2 * SEASONAL_PERIOD;
pub const DEFAULT_TOLERANCE: f64 = 1e-10;
pub const DEFAULT_MAX_ITERATIONS: usize = 2000;

/// Trait for forecast models.
///
/// Implementations must not panic on degenerate input; every failure is
/// reported as a `ForecastFailure`.
pub trait ForecastModel: Send + Sync {
    /// Human-readable name (e.g., "trend_smoothing").
    fn name(&self) -> &str;

    /// Forecast `steps` periods past the end of `prices` and return the first
    /// forecasted value.
    fn forecast(&self, prices: &[f64], steps: usize) -> Result<f64, ForecastFailure>;
}

/// Forecast, mapping any failure to NaN.
///
/// NaN compares false against every price, so a caller doing
/// `forecast > current` treats a failure as "not above".
pub fn forecast_or_nan(model: &dyn ForecastModel, prices: &[f64], steps: usize) -> f64 {
    model.forecast(prices, steps).unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub seasonal_period: usize,
    /// Series at least this long get the seasonal model.
    pub seasonal_threshold: usize,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            seasonal_period: SEASONAL_PERIOD,
            seasonal_threshold: SEASONAL_THRESHOLD,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ModelSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.seasonal_period == 0 {
            return Err(SettingsError::ZeroPeriod);
        }
        if self.seasonal_threshold < 2 * self.seasonal_period {
            return Err(SettingsError::ThresholdTooSmall {
                threshold: self.seasonal_threshold,
                period: self.seasonal_period,
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SettingsError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(SettingsError::ZeroIterations);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("seasonal_period must be at least 1")]
    ZeroPeriod,

    #[error("seasonal_threshold {threshold} must cover two seasonal periods of {period}")]
    ThresholdTooSmall { threshold: usize, period: usize },

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("max_iterations must be at least 1")]
    ZeroIterations,
}

/// Holt / Holt-Winters chosen by history length.
#[derive(Debug, Clone, Default)]
pub struct TrendSmoothing {
    settings: ModelSettings,
}

impl TrendSmoothing {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// The model used for a series of `len` observations.
    pub fn model_for(&self, len: usize) -> HoltWinters {
        let seasonality = if len < self.settings.seasonal_threshold {
            Seasonality::None
        } else {
            Seasonality::Additive {
                period: self.settings.seasonal_period,
            }
        };
        HoltWinters::new(
            seasonality,
            NelderMead::new(self.settings.tolerance, self.settings.max_iterations),
        )
    }

    pub fn fit(&self, prices: &[f64]) -> Result<FittedModel, ForecastFailure> {
        self.model_for(prices.len()).fit(prices)
    }
}

impl ForecastModel for TrendSmoothing {
    fn name(&self) -> &str {
        "trend_smoothing"
    }

    fn forecast(&self, prices: &[f64], steps: usize) -> Result<f64, ForecastFailure> {
        if steps == 0 {
            return Err(ForecastFailure::ZeroHorizon);
        }
        let fitted = self.fit(prices)?;
        let values = fitted.forecast(steps)?;
        values.first().copied().ok_or(ForecastFailure::ZeroHorizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_uses_trend_only_model() {
        let model = TrendSmoothing::default();
        assert_eq!(model.model_for(10).seasonality(), Seasonality::None);
        assert_eq!(model.model_for(729).seasonality(), Seasonality::None);
    }

    #[test]
    fn two_years_of_history_uses_seasonal_model() {
        let model = TrendSmoothing::default();
        assert_eq!(
            model.model_for(730).seasonality(),
            Seasonality::Additive { period: 365 }
        );
    }

    #[test]
    fn forecast_returns_first_step() {
        let model = TrendSmoothing::default();
        let one = model.forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 1).unwrap();
        let three = model.forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(one, three);
        assert!(one > 5.0);
    }

    #[test]
    fn zero_steps_fails() {
        let model = TrendSmoothing::default();
        assert_eq!(
            model.forecast(&[1.0, 2.0], 0),
            Err(ForecastFailure::ZeroHorizon)
        );
    }

    #[test]
    fn forecast_or_nan_maps_failure_to_nan() {
        let model = TrendSmoothing::default();
        assert!(forecast_or_nan(&model, &[3.0], 1).is_nan());
        assert!(forecast_or_nan(&model, &[], 1).is_nan());
        assert!(!forecast_or_nan(&model, &[1.0, 2.0, 3.0], 1).is_nan());
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(ModelSettings::default().validate().is_ok());
    }

    #[test]
    fn settings_validation() {
        let bad_threshold = ModelSettings {
            seasonal_threshold: 400,
            ..ModelSettings::default()
        };
        assert!(matches!(
            bad_threshold.validate(),
            Err(SettingsError::ThresholdTooSmall { .. })
        ));

        let zero_period = ModelSettings {
            seasonal_period: 0,
            ..ModelSettings::default()
        };
        assert_eq!(zero_period.validate(), Err(SettingsError::ZeroPeriod));

        let bad_tol = ModelSettings {
            tolerance: 0.0,
            ..ModelSettings::default()
        };
        assert!(bad_tol.validate().is_err());

        let no_iter = ModelSettings {
            max_iterations: 0,
            ..ModelSettings::default()
        };
        assert_eq!(no_iter.validate(), Err(SettingsError::ZeroIterations));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let s: ModelSettings = serde_json::from_str(r#"{"seasonal_period": 7}"#).unwrap();
        assert_eq!(s.seasonal_period, 7);
        assert_eq!(s.seasonal_threshold, SEASONAL_THRESHOLD);
    }
}
