//! Decision mapping: forecast and latest price in, signed position out.
//!
//! Positions are always at full size: `+limit`, `-limit`, or flat.

use serde::{Deserialize, Serialize};

use crate::error::ForecastFailure;

/// What to do when no forecast could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the failure like a forecast that is not above the latest price.
    #[default]
    Short,
    /// Stand aside.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
    Flat,
}

impl Direction {
    /// Position of this direction at `limit`.
    pub fn position(self, limit: f64) -> f64 {
        match self {
            Direction::Long => limit,
            Direction::Short => -limit,
            Direction::Flat => 0.0,
        }
    }
}

/// Why a direction was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    ForecastAbove,
    ForecastNotAbove,
    ForecastFailed,
    OutsideUniverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub direction: Direction,
    pub reason: DecisionReason,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionMapper {
    policy: FailurePolicy,
}

impl DecisionMapper {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Map a forecast for an instrument in the universe.
    pub fn decide(
        &self,
        forecast: &Result<f64, ForecastFailure>,
        current: f64,
        limit: f64,
    ) -> Decision {
        let (direction, reason) = match forecast {
            Ok(f) if *f > current => (Direction::Long, DecisionReason::ForecastAbove),
            Ok(_) => (Direction::Short, DecisionReason::ForecastNotAbove),
            Err(_) => {
                let direction = match self.policy {
                    FailurePolicy::Short => Direction::Short,
                    FailurePolicy::Flat => Direction::Flat,
                };
                (direction, DecisionReason::ForecastFailed)
            }
        };
        Decision {
            direction,
            reason,
            position: direction.position(limit),
        }
    }

    /// Instruments outside the universe are always flat.
    pub fn outside_universe(&self) -> Decision {
        Decision {
            direction: Direction::Flat,
            reason: DecisionReason::OutsideUniverse,
            position: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> Result<f64, ForecastFailure> {
        Err(ForecastFailure::InsufficientData { len: 1, required: 2 })
    }

    #[test]
    fn forecast_above_goes_long() {
        let d = DecisionMapper::default().decide(&Ok(10.5), 10.0, 25.0);
        assert_eq!(d.direction, Direction::Long);
        assert_eq!(d.position, 25.0);
    }

    #[test]
    fn forecast_below_goes_short() {
        let d = DecisionMapper::default().decide(&Ok(9.5), 10.0, 25.0);
        assert_eq!(d.direction, Direction::Short);
        assert_eq!(d.position, -25.0);
    }

    #[test]
    fn forecast_equal_goes_short() {
        let d = DecisionMapper::default().decide(&Ok(10.0), 10.0, 25.0);
        assert_eq!(d.position, -25.0);
        assert_eq!(d.reason, DecisionReason::ForecastNotAbove);
    }

    #[test]
    fn failure_defaults_to_short() {
        let d = DecisionMapper::default().decide(&failed(), 10.0, 25.0);
        assert_eq!(d.direction, Direction::Short);
        assert_eq!(d.reason, DecisionReason::ForecastFailed);
        assert_eq!(d.position, -25.0);
    }

    #[test]
    fn failure_with_flat_policy_stands_aside() {
        let d = DecisionMapper::new(FailurePolicy::Flat).decide(&failed(), 10.0, 25.0);
        assert_eq!(d.direction, Direction::Flat);
        assert_eq!(d.position, 0.0);
    }

    #[test]
    fn nan_forecast_value_is_not_above() {
        let d = DecisionMapper::default().decide(&Ok(f64::NAN), 10.0, 25.0);
        assert_eq!(d.position, -25.0);
    }

    #[test]
    fn outside_universe_is_flat() {
        let d = DecisionMapper::default().outside_universe();
        assert_eq!(d.position, 0.0);
        assert_eq!(d.reason, DecisionReason::OutsideUniverse);
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let p: FailurePolicy = serde_json::from_str("\"flat\"").unwrap();
        assert_eq!(p, FailurePolicy::Flat);
    }
}
