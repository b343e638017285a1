//! Error taxonomy for the signal engine.
//!
//! Data errors (parse failures, missing or empty history) propagate to the
//! caller as hard failures. Forecast failures are absorbed by the engine and
//! handed to the decision mapper instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price source could not be parsed into a numeric sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },

    #[error("{0}")]
    Read(String),
}

/// Errors from loading price history and looking up prices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("cannot parse price data for '{instrument}': {source}")]
    DataFormat {
        instrument: String,
        #[source]
        source: FormatError,
    },

    #[error("no price history loaded for '{instrument}'")]
    MissingData { instrument: String },

    #[error("price history for '{instrument}' is empty")]
    EmptySeries { instrument: String },
}

/// Why a forecast could not be produced.
///
/// Never surfaced by `SignalEngine::desired_positions`; the decision mapper
/// resolves it according to the configured `FailurePolicy`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastFailure {
    #[error("need at least {required} observations, got {len}")]
    InsufficientData { len: usize, required: usize },

    #[error("price series contains non-finite values")]
    NonFinite,

    #[error("forecast horizon must be at least 1")]
    ZeroHorizon,

    #[error("model fit diverged: {reason}")]
    Diverged { reason: String },
}
