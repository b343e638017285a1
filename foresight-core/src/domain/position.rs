use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Signed position per instrument, keyed by name in sorted order.
pub type DesiredPositions = BTreeMap<String, f64>;

/// Positions currently held by the caller, keyed by instrument name.
pub type CurrentPositions = BTreeMap<String, f64>;

/// Per-instrument maximum absolute exposure, fixed for the engine's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PositionLimits {
    limits: BTreeMap<String, f64>,
}

impl PositionLimits {
    /// Validate and wrap a limit map. Limits must be finite and non-negative.
    pub fn new(limits: BTreeMap<String, f64>) -> Result<Self, LimitError> {
        for (instrument, &limit) in &limits {
            if !limit.is_finite() || limit < 0.0 {
                return Err(LimitError::Invalid {
                    instrument: instrument.clone(),
                    limit,
                });
            }
        }
        Ok(Self { limits })
    }

    pub fn get(&self, instrument: &str) -> Option<f64> {
        self.limits.get(instrument).copied()
    }

    /// Limits in sorted instrument order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.limits.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.limits.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f64>> for PositionLimits {
    type Error = LimitError;

    fn try_from(limits: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(limits)
    }
}

impl From<PositionLimits> for BTreeMap<String, f64> {
    fn from(limits: PositionLimits) -> Self {
        limits.limits
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitError {
    #[error("position limit for '{instrument}' must be finite and non-negative, got {limit}")]
    Invalid { instrument: String, limit: f64 },
}
