//! Foresight Runner: config-driven signal runs.
//!
//! This crate builds on `foresight-core` to provide:
//! - TOML run configuration with validation and a BLAKE3 config hash
//! - Price file discovery and loading, with a BLAKE3 dataset hash
//! - The `run_signals` entry point producing a versioned `SignalReport`
//! - JSON and CSV export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigError, SignalConfig};
pub use data_loader::{compute_dataset_hash, load_prices, LoadError, LoadedData};
pub use export::{export_json, export_positions_csv, import_json, load_report, save_report};
pub use runner::{build_report, run_signals, RunError, SignalReport, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn signal_config_is_send_sync() {
        assert_send::<SignalConfig>();
        assert_sync::<SignalConfig>();
    }

    #[test]
    fn signal_report_is_send_sync() {
        assert_send::<SignalReport>();
        assert_sync::<SignalReport>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
