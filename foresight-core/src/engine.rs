//! Signal engine: per-instrument price history, position limits, and the
//! forecast → decision pipeline.
//!
//! The engine is an explicit value owned by the caller. Limits, universe, and
//! model are fixed at construction; only price history can be (re)loaded.
//! Every evaluation is a fresh, sequential pass over the limits in sorted
//! instrument order, so repeated calls on unchanged data give identical
//! results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{PriceHistoryStore, PriceSource};
use crate::decision::{DecisionMapper, DecisionReason, Direction, FailurePolicy};
use crate::domain::{CurrentPositions, DesiredPositions, PositionLimits, Universe};
use crate::error::{DataError, ForecastFailure};
use crate::forecast::{ForecastModel, TrendSmoothing};

/// Horizon used for trading decisions.
pub const DECISION_HORIZON: usize = 1;

/// Result of forecasting one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Forecast { value: f64 },
    Failed { failure: ForecastFailure },
}

impl ForecastOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            ForecastOutcome::Forecast { value } => Some(*value),
            ForecastOutcome::Failed { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<f64, ForecastFailure> {
        match self {
            ForecastOutcome::Forecast { value } => Ok(value),
            ForecastOutcome::Failed { failure } => Err(failure),
        }
    }
}

impl From<Result<f64, ForecastFailure>> for ForecastOutcome {
    fn from(result: Result<f64, ForecastFailure>) -> Self {
        match result {
            Ok(value) => ForecastOutcome::Forecast { value },
            Err(failure) => ForecastOutcome::Failed { failure },
        }
    }
}

/// Full trace of one instrument's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub instrument: String,
    pub limit: f64,
    /// Absent for instruments outside the universe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastOutcome>,
    pub direction: Direction,
    pub reason: DecisionReason,
    pub position: f64,
}

pub struct SignalEngine {
    history: PriceHistoryStore,
    limits: PositionLimits,
    current_positions: CurrentPositions,
    universe: Universe,
    model: Box<dyn ForecastModel>,
    mapper: DecisionMapper,
}

impl SignalEngine {
    /// Engine over the standard universe with the default trend-smoothing model.
    pub fn new(limits: PositionLimits) -> Self {
        Self {
            history: PriceHistoryStore::new(),
            limits,
            current_positions: CurrentPositions::new(),
            universe: Universe::standard(),
            model: Box::new(TrendSmoothing::default()),
            mapper: DecisionMapper::default(),
        }
    }

    pub fn with_universe(mut self, universe: Universe) -> Self {
        self.universe = universe;
        self
    }

    pub fn with_model<M: ForecastModel + 'static>(mut self, model: M) -> Self {
        self.model = Box::new(model);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.mapper = DecisionMapper::new(policy);
        self
    }

    pub fn with_current_positions(mut self, positions: CurrentPositions) -> Self {
        self.current_positions = positions;
        self
    }

    /// Replace the price history of `instrument`.
    pub fn load<S: PriceSource>(&mut self, instrument: &str, source: S) -> Result<usize, DataError> {
        let n = self.history.load(instrument, source)?;
        debug!(instrument, prices = n, "loaded price history");
        Ok(n)
    }

    pub fn history(&self) -> &PriceHistoryStore {
        &self.history
    }

    pub fn limits(&self) -> &PositionLimits {
        &self.limits
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn current_positions(&self) -> &CurrentPositions {
        &self.current_positions
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.mapper.policy()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn latest_price(&self, instrument: &str) -> Result<f64, DataError> {
        self.history.latest_price(instrument)
    }

    /// Forecast `steps` ahead for a loaded instrument.
    ///
    /// Only a missing history is an error; model failures come back as
    /// `ForecastOutcome::Failed`.
    pub fn forecast(&self, instrument: &str, steps: usize) -> Result<ForecastOutcome, DataError> {
        let series = self.history.series(instrument)?;
        let result = self.model.forecast(series, steps);
        if let Err(failure) = &result {
            warn!(instrument, error = %failure, "forecast failed");
        }
        Ok(result.into())
    }

    /// Evaluate every instrument with a position limit.
    ///
    /// Fails on the first universe instrument whose history is missing or
    /// empty.
    pub fn evaluate(&self) -> Result<Vec<SignalRecord>, DataError> {
        for name in self.universe.names() {
            if self.limits.get(name).is_none() {
                debug!(instrument = name, "no position limit configured, skipping");
            }
        }

        let mut records = Vec::with_capacity(self.limits.len());
        for (instrument, limit) in self.limits.iter() {
            let record = if self.universe.contains(instrument) {
                let current = self.latest_price(instrument)?;
                let outcome = self.forecast(instrument, DECISION_HORIZON)?;
                let decision = self.mapper.decide(&outcome.clone().into_result(), current, limit);
                SignalRecord {
                    instrument: instrument.to_string(),
                    limit,
                    latest_price: Some(current),
                    forecast: Some(outcome),
                    direction: decision.direction,
                    reason: decision.reason,
                    position: decision.position,
                }
            } else {
                let decision = self.mapper.outside_universe();
                SignalRecord {
                    instrument: instrument.to_string(),
                    limit,
                    latest_price: None,
                    forecast: None,
                    direction: decision.direction,
                    reason: decision.reason,
                    position: decision.position,
                }
            };
            debug!(
                instrument,
                direction = ?record.direction,
                position = record.position,
                "signal"
            );
            records.push(record);
        }
        Ok(records)
    }

    /// Desired position per instrument with a configured limit.
    pub fn desired_positions(&self) -> Result<DesiredPositions, DataError> {
        Ok(self
            .evaluate()?
            .into_iter()
            .map(|r| (r.instrument, r.position))
            .collect())
    }

    /// Trade needed to move each instrument from its current to its desired
    /// position. Instruments with no current position start from zero.
    pub fn required_trades(&self, desired: &DesiredPositions) -> BTreeMap<String, f64> {
        desired
            .iter()
            .map(|(instrument, &target)| {
                let held = self.current_positions.get(instrument).copied().unwrap_or(0.0);
                (instrument.clone(), target - held)
            })
            .collect()
    }
}

impl fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEngine")
            .field("history", &self.history)
            .field("limits", &self.limits)
            .field("current_positions", &self.current_positions)
            .field("universe", &self.universe)
            .field("model", &self.model.name())
            .field("mapper", &self.mapper)
            .finish()
    }
}
