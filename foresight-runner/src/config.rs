//! Serializable signal-run configuration, loaded from TOML.
//!
//! ```toml
//! data_dir = "prices"
//! failure_policy = "short"
//!
//! [limits]
//! "Fintech Token" = 100
//! "Milk" = 50
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use foresight_core::domain::LimitError;
use foresight_core::forecast::SettingsError;
use foresight_core::{
    CurrentPositions, FailurePolicy, ModelSettings, PositionLimits, SignalEngine, TrendSmoothing,
    Universe,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Limit(#[from] LimitError),

    #[error("invalid model settings: {0}")]
    Model(#[from] SettingsError),

    #[error("current position for '{instrument}' must be finite, got {value}")]
    InvalidPosition { instrument: String, value: f64 },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to reproduce a signal run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SignalConfig {
    /// Directory holding `<instrument>.csv` files, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Replaces the standard instrument universe when present.
    ///
    /// An extension over the fixed universe of the trading rules. Leave it
    /// unset to trade the standard list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universe: Option<Vec<String>>,

    #[serde(default)]
    pub model: ModelSettings,

    pub limits: BTreeMap<String, f64>,

    #[serde(default)]
    pub current_positions: BTreeMap<String, f64>,

    /// Per-instrument price file overrides, relative to the config file.
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
}

impl SignalConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.position_limits()?;
        self.model.validate()?;
        for (instrument, &value) in &self.current_positions {
            if !value.is_finite() {
                return Err(ConfigError::InvalidPosition {
                    instrument: instrument.clone(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn position_limits(&self) -> Result<PositionLimits, ConfigError> {
        Ok(PositionLimits::new(self.limits.clone())?)
    }

    pub fn universe(&self) -> Universe {
        match &self.universe {
            Some(names) => Universe::from_names(names.iter().cloned()),
            None => Universe::standard(),
        }
    }

    /// Whether the configured universe differs from the standard one.
    pub fn has_custom_universe(&self) -> bool {
        self.universe() != Universe::standard()
    }

    /// An engine with this config's limits, universe, model, and policy, and
    /// no price history loaded yet.
    pub fn build_engine(&self) -> Result<SignalEngine, ConfigError> {
        self.model.validate()?;
        let universe = self.universe();
        if self.has_custom_universe() {
            info!(
                instruments = universe.len(),
                names = ?universe.names().collect::<Vec<_>>(),
                "using a non-standard instrument universe"
            );
        }
        let current: CurrentPositions = self.current_positions.clone();
        Ok(SignalEngine::new(self.position_limits()?)
            .with_universe(universe)
            .with_model(TrendSmoothing::new(self.model))
            .with_failure_policy(self.failure_policy)
            .with_current_positions(current))
    }

    /// Where the price file for `instrument` lives.
    pub fn price_path(&self, instrument: &str, base_dir: &Path) -> PathBuf {
        if let Some(file) = self.files.get(instrument) {
            return base_dir.join(file);
        }
        let dir = match &self.data_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        dir.join(format!("{instrument}.csv"))
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// All maps are `BTreeMap`, so key order is stable.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
