//! Price history store holding the most recently loaded series per instrument.

use std::collections::BTreeMap;

use super::source::PriceSource;
use crate::error::DataError;

#[derive(Debug, Clone, Default)]
pub struct PriceHistoryStore {
    series: BTreeMap<String, Vec<f64>>,
}

impl PriceHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored series for `instrument` with the parsed source.
    ///
    /// Returns the number of prices loaded. On a parse failure the previous
    /// series (if any) is left untouched.
    pub fn load<S: PriceSource>(&mut self, instrument: &str, source: S) -> Result<usize, DataError> {
        let prices = source
            .read_prices()
            .map_err(|source| DataError::DataFormat {
                instrument: instrument.to_string(),
                source,
            })?;
        let len = prices.len();
        self.series.insert(instrument.to_string(), prices);
        Ok(len)
    }

    pub fn series(&self, instrument: &str) -> Result<&[f64], DataError> {
        self.series
            .get(instrument)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::MissingData {
                instrument: instrument.to_string(),
            })
    }

    pub fn latest_price(&self, instrument: &str) -> Result<f64, DataError> {
        self.series(instrument)?
            .last()
            .copied()
            .ok_or_else(|| DataError::EmptySeries {
                instrument: instrument.to_string(),
            })
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.series.contains_key(instrument)
    }

    /// Loaded instruments in sorted order.
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
