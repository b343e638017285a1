//! Signal run orchestration: config in, report out.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use foresight_core::{DataError, DesiredPositions, FailurePolicy, SignalEngine, SignalRecord};

use crate::config::{ConfigError, SignalConfig};
use crate::data_loader::{load_prices, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one signal run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub failure_policy: FailurePolicy,
    pub config_hash: String,
    pub dataset_hash: String,
    pub records: Vec<SignalRecord>,
    pub positions: DesiredPositions,
    /// Desired minus current, per instrument.
    pub trades: BTreeMap<String, f64>,
    /// Instruments whose price file was not found.
    #[serde(default)]
    pub missing_files: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SignalReport {
    /// Instruments whose desired position differs from the current one.
    pub fn pending_trades(&self) -> impl Iterator<Item = (&str, f64)> {
        self.trades
            .iter()
            .filter(|(_, qty)| **qty != 0.0)
            .map(|(name, qty)| (name.as_str(), *qty))
    }
}

/// Run the full pipeline from a config.
///
/// This is the high-level entry point used by the CLI. Price file paths in
/// the config resolve against `base_dir`, normally the config file's
/// directory.
pub fn run_signals(config: &SignalConfig, base_dir: &Path) -> Result<SignalReport, RunError> {
    config.validate()?;
    let config_hash = config.config_hash()?;

    let mut engine = config.build_engine()?;
    let loaded = load_prices(&mut engine, config, base_dir)?;

    let mut report = build_report(&engine, config_hash, loaded.dataset_hash)?;
    report.missing_files = loaded.missing;
    Ok(report)
}

/// Evaluate an already-loaded engine into a report.
pub fn build_report(
    engine: &SignalEngine,
    config_hash: String,
    dataset_hash: String,
) -> Result<SignalReport, DataError> {
    let records = engine.evaluate()?;
    let positions: DesiredPositions = records
        .iter()
        .map(|r| (r.instrument.clone(), r.position))
        .collect();
    let trades = engine.required_trades(&positions);

    info!(
        instruments = records.len(),
        long = positions.values().filter(|p| **p > 0.0).count(),
        short = positions.values().filter(|p| **p < 0.0).count(),
        "signal run complete"
    );

    Ok(SignalReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        model: engine.model_name().to_string(),
        failure_policy: engine.failure_policy(),
        config_hash,
        dataset_hash,
        records,
        positions,
        trades,
        missing_files: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use foresight_core::PositionLimits;

    fn engine() -> SignalEngine {
        let mut limits = BTreeMap::new();
        limits.insert("Milk".to_string(), 10.0);
        limits.insert("Pixel Dust".to_string(), 4.0);
        let mut current = BTreeMap::new();
        current.insert("Milk".to_string(), 3.0);
        let mut engine = SignalEngine::new(PositionLimits::new(limits).unwrap())
            .with_current_positions(current);
        engine.load("Milk", vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        engine
    }

    #[test]
    fn report_positions_match_records() {
        let report = build_report(&engine(), "c".into(), "d".into()).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.positions["Milk"], 10.0);
        assert_eq!(report.positions["Pixel Dust"], 0.0);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.model, "trend_smoothing");
    }

    #[test]
    fn trades_are_desired_minus_current() {
        let report = build_report(&engine(), "c".into(), "d".into()).unwrap();
        assert_eq!(report.trades["Milk"], 7.0);
        assert_eq!(report.trades["Pixel Dust"], 0.0);
        let pending: Vec<_> = report.pending_trades().collect();
        assert_eq!(pending, vec![("Milk", 7.0)]);
    }

    #[test]
    fn data_errors_propagate() {
        let mut limits = BTreeMap::new();
        limits.insert("Milk".to_string(), 10.0);
        let engine = SignalEngine::new(PositionLimits::new(limits).unwrap());
        assert!(matches!(
            build_report(&engine, String::new(), String::new()),
            Err(DataError::MissingData { .. })
        ));
    }

    #[test]
    fn report_json_without_schema_version_defaults() {
        let report = build_report(&engine(), "c".into(), "d".into()).unwrap();
        let mut value = serde_json::to_value(&report).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let restored: SignalReport = serde_json::from_value(value).unwrap();
        assert_eq!(restored.schema_version, SCHEMA_VERSION);
        assert_eq!(restored.positions, report.positions);
        assert_eq!(restored.config_hash, "c");
    }
}
