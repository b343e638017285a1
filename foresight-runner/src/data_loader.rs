//! Price file loading for the runner.
//!
//! For every instrument with a position limit, resolves its CSV file from the
//! config and loads it into the engine. Missing files are skipped with a
//! warning; the engine reports `MissingData` later if the instrument is one
//! it actually needs.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use foresight_core::{CsvPriceSource, DataError, PriceHistoryStore, SignalEngine};

use crate::config::SignalConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open price file {} for '{instrument}': {source}", path.display())]
    Io {
        instrument: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// What was loaded, for provenance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedData {
    /// Row count per loaded instrument.
    pub rows: BTreeMap<String, usize>,
    /// Instruments whose price file did not exist.
    pub missing: Vec<String>,
    /// BLAKE3 over every loaded series.
    pub dataset_hash: String,
}

/// Load every limited instrument's price file into `engine`.
///
/// Relative paths in the config resolve against `base_dir`.
pub fn load_prices(
    engine: &mut SignalEngine,
    config: &SignalConfig,
    base_dir: &Path,
) -> Result<LoadedData, LoadError> {
    let mut rows = BTreeMap::new();
    let mut missing = Vec::new();

    for instrument in config.limits.keys() {
        let path = config.price_path(instrument, base_dir);
        let source = match CsvPriceSource::from_path(&path) {
            Ok(source) => source,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(instrument = %instrument, path = %path.display(), "price file not found, skipping");
                missing.push(instrument.clone());
                continue;
            }
            Err(source) => {
                return Err(LoadError::Io {
                    instrument: instrument.clone(),
                    path,
                    source,
                })
            }
        };

        let count = engine.load(instrument, source)?;
        debug!(instrument = %instrument, rows = count, "loaded prices");
        rows.insert(instrument.clone(), count);
    }

    let dataset_hash = compute_dataset_hash(engine.history());
    info!(
        loaded = rows.len(),
        missing = missing.len(),
        dataset_hash = %dataset_hash,
        "price data loaded"
    );

    Ok(LoadedData {
        rows,
        missing,
        dataset_hash,
    })
}

/// Deterministic BLAKE3 hash over every series in the store.
///
/// Covers instrument names, series lengths, and the exact bits of each
/// price, in sorted instrument order.
pub fn compute_dataset_hash(history: &PriceHistoryStore) -> String {
    let mut hasher = blake3::Hasher::new();

    for instrument in history.instruments() {
        hasher.update(instrument.as_bytes());
        if let Ok(series) = history.series(instrument) {
            hasher.update(&(series.len() as u64).to_le_bytes());
            for price in series {
                hasher.update(&price.to_le_bytes());
            }
        } else {
            hasher.update(&0u64.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}
