//! Structured (JSON) artifact: a pretty printed list of rows.

use crate::monitor::UtilizationRecord;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Render all records as a JSON array of nine-cell arrays.
pub fn render_json(records: &[UtilizationRecord]) -> Result<String> {
    let rows: Vec<Vec<Value>> = records.iter().map(UtilizationRecord::to_row).collect();
    serde_json::to_string_pretty(&rows).context("Error serializing records to JSON")
}

/// Write the structured artifact to `path`.
pub fn write_json(path: &Path, records: &[UtilizationRecord]) -> Result<()> {
    let json = render_json(records)?;
    std::fs::write(path, json)
        .with_context(|| format!("Error writing JSON file {}", path.display()))?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}
