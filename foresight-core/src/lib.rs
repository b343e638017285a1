//! Foresight Core: per-instrument forecasting signal engine.
//!
//! This crate contains:
//! - Domain types (instrument universe, position limits, desired positions)
//! - Price history store and price sources (in-memory, headerless CSV)
//! - Holt / Holt-Winters additive smoothing with bounded Nelder-Mead fitting
//! - Decision mapping from forecast to a full-size signed position
//! - The `SignalEngine` that runs the pipeline over every limited instrument

pub mod data;
pub mod decision;
pub mod domain;
pub mod engine;
pub mod error;
pub mod forecast;

pub use data::{CsvPriceSource, PriceHistoryStore, PriceSource};
pub use decision::{Decision, DecisionMapper, DecisionReason, Direction, FailurePolicy};
pub use domain::{CurrentPositions, DesiredPositions, PositionLimits, Universe, INSTRUMENT_UNIVERSE};
pub use engine::{ForecastOutcome, SignalEngine, SignalRecord, DECISION_HORIZON};
pub use error::{DataError, ForecastFailure, FormatError};
pub use forecast::{ForecastModel, ModelSettings, TrendSmoothing};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<SignalEngine>();
        require_sync::<SignalEngine>();
        require_send::<PriceHistoryStore>();
        require_sync::<PriceHistoryStore>();
        require_send::<PositionLimits>();
        require_sync::<PositionLimits>();
        require_send::<Universe>();
        require_sync::<Universe>();
        require_send::<SignalRecord>();
        require_sync::<SignalRecord>();
        require_send::<TrendSmoothing>();
        require_sync::<TrendSmoothing>();
        require_send::<forecast::FittedModel>();
        require_sync::<forecast::FittedModel>();
        require_send::<DataError>();
        require_sync::<DataError>();
    }

    /// Architecture contract: forecast models see prices only.
    ///
    /// `ForecastModel::forecast` takes a price slice and a horizon, with no
    /// access to limits, positions, or the universe.
    #[test]
    fn forecast_model_sees_prices_only() {
        fn _check_trait_object_builds(
            model: &dyn ForecastModel,
            prices: &[f64],
        ) -> Result<f64, ForecastFailure> {
            model.forecast(prices, DECISION_HORIZON)
        }
    }
}
