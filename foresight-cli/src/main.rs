//! Foresight CLI: position signals and one-off forecasts.
//!
//! Commands:
//! - `positions`: run the signal engine from a TOML config and print the report
//! - `forecast`: fit the smoothing model to a single price CSV and print the forecast

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use foresight_core::{CsvPriceSource, FailurePolicy, PriceSource, TrendSmoothing};
use foresight_runner::{export_json, run_signals, save_report, SignalConfig};

#[derive(Parser)]
#[command(
    name = "foresight",
    about = "Foresight CLI: forecast-driven position signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute desired positions for every instrument in a config file.
    Positions {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Price directory, overriding `data_dir` in the config.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Stay flat instead of short when a forecast cannot be produced.
        #[arg(long, default_value_t = false)]
        flat_on_failure: bool,

        /// Write the report here (`.csv` for CSV, JSON otherwise) instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Forecast a single headerless `day,price` CSV file.
    Forecast {
        /// Price file.
        csv: PathBuf,

        /// Forecast horizon.
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Positions {
            config,
            data_dir,
            flat_on_failure,
            output,
        } => run_positions(&config, data_dir, flat_on_failure, output.as_deref()),
        Commands::Forecast { csv, steps } => run_forecast(&csv, steps),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Stdout carries the report.
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .init()
}

fn run_positions(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    flat_on_failure: bool,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = SignalConfig::from_file(config_path)?;
    if let Some(dir) = data_dir {
        // Relative to the working directory, not the config file.
        let dir = if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir()
                .context("cannot resolve working directory")?
                .join(dir)
        };
        config.data_dir = Some(dir);
    }
    if flat_on_failure {
        config.failure_policy = FailurePolicy::Flat;
    }

    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let report = run_signals(&config, base_dir)
        .with_context(|| format!("signal run failed for {}", config_path.display()))?;

    match output {
        Some(path) => {
            save_report(&report, path)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", export_json(&report)?),
    }
    Ok(())
}

fn run_forecast(csv: &Path, steps: usize) -> Result<()> {
    let source = CsvPriceSource::from_path(csv)
        .with_context(|| format!("cannot open {}", csv.display()))?;
    let prices = source
        .read_prices()
        .with_context(|| format!("cannot parse {}", csv.display()))?;

    let model = TrendSmoothing::default();
    let fitted = model
        .fit(&prices)
        .with_context(|| format!("cannot fit {} prices from {}", prices.len(), csv.display()))?;
    let path = fitted.forecast(steps)?;
    let mse = fitted.mse();

    let summary = serde_json::json!({
        "observations": prices.len(),
        "latest_price": prices.last(),
        "forecast": path.first(),
        "path": path,
        "model": fitted,
        "mse": mse,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
