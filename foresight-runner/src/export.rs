//! Report export: JSON for round-tripping, CSV for spreadsheets.
//!
//! Persisted JSON carries a `schema_version`. Newer versions are rejected on
//! load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use foresight_core::ForecastOutcome;

use crate::runner::{SignalReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SignalReport` to pretty JSON.
pub fn export_json(report: &SignalReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SignalReport to JSON")
}

/// Deserialize a `SignalReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SignalReport> {
    let report: SignalReport =
        serde_json::from_str(json).context("failed to deserialize SignalReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per instrument.
///
/// Columns: instrument, limit, latest_price, forecast, direction, reason,
/// position, trade. Absent prices and failed forecasts are empty cells.
pub fn export_positions_csv(report: &SignalReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "instrument",
        "limit",
        "latest_price",
        "forecast",
        "direction",
        "reason",
        "position",
        "trade",
    ])?;

    for record in &report.records {
        let latest = record
            .latest_price
            .map(|p| p.to_string())
            .unwrap_or_default();
        let forecast = record
            .forecast
            .as_ref()
            .and_then(ForecastOutcome::value)
            .map(|f| format!("{f:.6}"))
            .unwrap_or_default();
        let trade = report
            .trades
            .get(&record.instrument)
            .copied()
            .unwrap_or(0.0);

        let limit = record.limit.to_string();
        let direction = enum_label(&record.direction)?;
        let reason = enum_label(&record.reason)?;
        let position = record.position.to_string();
        let trade = trade.to_string();

        wtr.write_record([
            record.instrument.as_str(),
            limit.as_str(),
            latest.as_str(),
            forecast.as_str(),
            direction.as_str(),
            reason.as_str(),
            position.as_str(),
            trade.as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// The serde name of a unit enum variant.
fn enum_label<T: serde::Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => bail!("expected a unit variant, got {other}"),
    }
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write the report to `path`, as CSV when the extension is `.csv` and as
/// JSON otherwise.
pub fn save_report(report: &SignalReport, path: &Path) -> Result<()> {
    let body = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => export_positions_csv(report)?,
        _ => export_json(report)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a JSON report written by `save_report`.
pub fn load_report(path: &Path) -> Result<SignalReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
