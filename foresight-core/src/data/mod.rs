//! Price data: sources and the per-instrument history store

pub mod history;
pub mod source;

pub use history::PriceHistoryStore;
pub use source::{CsvPriceSource, PriceSource};
