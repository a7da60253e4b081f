//! Tabular (CSV) artifact.

use crate::monitor::{UtilizationRecord, HEADER};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Quote a field when it contains a delimiter, quote or line break,
/// doubling any embedded quotes.
pub fn escape_csv_field(input: &str) -> String {
    if input.contains([',', '"', '\r', '\n']) {
        let escaped = input.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        input.to_string()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn csv_line<I: IntoIterator<Item = String>>(fields: I) -> String {
    let mut line = fields
        .into_iter()
        .map(|f| escape_csv_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// Render the header and one line per record.
pub fn render_csv(records: &[UtilizationRecord]) -> String {
    let mut out = csv_line(HEADER.iter().map(|h| h.to_string()));
    for record in records {
        out.push_str(&csv_line(record.to_row().iter().map(cell_text)));
    }
    out
}

/// Write the tabular artifact to `path`.
pub fn write_csv(path: &Path, records: &[UtilizationRecord]) -> Result<()> {
    std::fs::write(path, render_csv(records))
        .with_context(|| format!("Error writing CSV file {}", path.display()))?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}
