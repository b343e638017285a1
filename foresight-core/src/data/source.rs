//! Price sources: anything that can be parsed into a numeric price sequence.
//!
//! The CSV format is two columns, `day,price`, with no header row. The day
//! column is never read, so integer indices, float indices and dates all
//! load the same way. Rows are taken in file order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::FormatError;

/// A one-shot source of prices for a single instrument.
pub trait PriceSource {
    /// Consume the source and parse it into prices, oldest first.
    fn read_prices(self) -> Result<Vec<f64>, FormatError>;
}

impl PriceSource for Vec<f64> {
    fn read_prices(self) -> Result<Vec<f64>, FormatError> {
        Ok(self)
    }
}

impl PriceSource for &[f64] {
    fn read_prices(self) -> Result<Vec<f64>, FormatError> {
        Ok(self.to_vec())
    }
}

/// Headerless `day,price` CSV.
pub struct CsvPriceSource<R> {
    reader: R,
}

impl<R: Read> CsvPriceSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl CsvPriceSource<File> {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> PriceSource for CsvPriceSource<R> {
    fn read_prices(self) -> Result<Vec<f64>, FormatError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(self.reader);

        let mut prices = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let fallback_line = i as u64 + 1;
            let record = result.map_err(|e| match e.position() {
                Some(pos) => FormatError::Row {
                    line: pos.line(),
                    reason: e.to_string(),
                },
                None => FormatError::Read(e.to_string()),
            })?;
            let line = record.position().map_or(fallback_line, |p| p.line());

            if record.len() != 2 {
                return Err(FormatError::Row {
                    line,
                    reason: format!("expected 2 columns (day,price), found {}", record.len()),
                });
            }

            let raw = &record[1];
            let price = raw.parse::<f64>().map_err(|_| FormatError::Row {
                line,
                reason: format!("price '{raw}' is not a number"),
            })?;
            if !price.is_finite() {
                return Err(FormatError::Row {
                    line,
                    reason: format!("price '{raw}' is not finite"),
                });
            }

            prices.push(price);
        }

        Ok(prices)
    }
}
