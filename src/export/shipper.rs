//! Cloud Logging forwarder.
//!
//! Turns report rows into structured log entries keyed by [`LOG_FIELDS`] so
//! that log-based metrics and alerts can pick them up.

use crate::gcp::client::GcpClient;
use crate::gcp::http::{api_error, format_gcp_error};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Payload field names, in row order.
pub const LOG_FIELDS: [&str; 9] = [
    "folder_path",
    "project_id",
    "self_link",
    "subnet_name",
    "ip_range",
    "min_num_ips",
    "allocated_ips",
    "reserved_ips",
    "utilized_percent",
];

pub const DEFAULT_RESOURCE_TYPE: &str = "gce_service_attachment";
pub const DEFAULT_LOG_TAG: &str = "psc-subnet-monitor";
pub const DEFAULT_LOG_NAME: &str = "psc-subnet-monitoring";

#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("invalid log entry format or length/key mismatch with keys: {0}")]
    FormatMismatch(Value),
}

/// Build the structured payload for one entry.
///
/// Accepts either a nine-element array (zipped with [`LOG_FIELDS`]) or an
/// object that already holds every field name.
pub fn payload_from_entry(entry: &Value) -> Result<Map<String, Value>, ShipError> {
    match entry {
        Value::Array(values) if values.len() == LOG_FIELDS.len() => Ok(LOG_FIELDS
            .iter()
            .zip(values)
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()),
        Value::Object(map) if LOG_FIELDS.iter().all(|key| map.contains_key(*key)) => {
            Ok(map.clone())
        }
        other => Err(ShipError::FormatMismatch(other.clone())),
    }
}

/// Read the entries of a structured artifact (a JSON array).
pub fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading log file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Error parsing log file {}", path.display()))?;
    match value {
        Value::Array(entries) => {
            tracing::debug!("Loaded {} log entries from {}", entries.len(), path.display());
            Ok(entries)
        }
        _ => Err(anyhow::anyhow!(
            "Expected a JSON array of log entries in {}",
            path.display()
        )),
    }
}

/// Where entries are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkTarget {
    pub project: String,
    pub log_name: String,
    pub resource_type: String,
    pub log_tag: String,
}

impl SinkTarget {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            log_name: DEFAULT_LOG_NAME.to_string(),
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            log_tag: DEFAULT_LOG_TAG.to_string(),
        }
    }

    /// Full log name, `projects/<project>/logs/<log>`
    pub fn log_name_path(&self) -> String {
        format!(
            "projects/{}/logs/{}",
            self.project,
            urlencoding::encode(&self.log_name)
        )
    }
}

/// What to do with an entry when the sink rejects our credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkFallback {
    /// Count the entry as failed
    #[default]
    Skip,
    /// Write the payload to the local log instead
    LocalLog,
}

/// Outcome of a shipping pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShipReport {
    pub shipped: usize,
    pub rejected: usize,
    pub failed: usize,
    pub logged_locally: usize,
}

enum WriteFailure {
    Auth(anyhow::Error),
    Other(anyhow::Error),
}

/// Forwards entries to Cloud Logging, one write per entry
pub struct LogShipper<'a> {
    client: &'a GcpClient,
    target: SinkTarget,
    fallback: SinkFallback,
}

impl<'a> LogShipper<'a> {
    pub fn new(client: &'a GcpClient, target: SinkTarget, fallback: SinkFallback) -> Self {
        Self {
            client,
            target,
            fallback,
        }
    }

    /// Request body of an `entries:write` call for one payload
    pub fn write_request(&self, payload: Map<String, Value>) -> Value {
        json!({
            "logName": self.target.log_name_path(),
            "resource": {
                "type": self.target.resource_type,
                "labels": { "logtag": self.target.log_tag },
            },
            "entries": [{
                "severity": "INFO",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "jsonPayload": Value::Object(payload),
            }],
        })
    }

    async fn write(&self, payload: Map<String, Value>) -> Result<(), WriteFailure> {
        let token = self
            .client
            .get_token()
            .await
            .map_err(WriteFailure::Auth)?;

        let body = self.write_request(payload);
        match self
            .client
            .http
            .post_json(&self.client.logging_write_url(), &token, &body)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => match api_error(&e) {
                Some(api) if api.is_unauthenticated() || api.is_permission_denied() => {
                    Err(WriteFailure::Auth(e))
                }
                _ => Err(WriteFailure::Other(e)),
            },
        }
    }

    /// Ship every entry; malformed entries are logged and skipped.
    pub async fn ship(&self, entries: &[Value]) -> ShipReport {
        let mut report = ShipReport::default();

        for entry in entries {
            let payload = match payload_from_entry(entry) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("{}. Skipping this entry.", e);
                    report.rejected += 1;
                    continue;
                }
            };
            let source_project = payload
                .get("project_id")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown Source Project")
                .to_string();

            match self.write(payload.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        "Successfully shipped log from project {} to project: {}",
                        source_project,
                        self.target.project
                    );
                    report.shipped += 1;
                }
                Err(WriteFailure::Auth(e)) if self.fallback == SinkFallback::LocalLog => {
                    let entry = Value::Object(payload);
                    tracing::error!(
                        "Authentication error ({}). Logging entry locally: {}",
                        format_gcp_error(&e),
                        entry
                    );
                    report.logged_locally += 1;
                }
                Err(WriteFailure::Auth(e)) | Err(WriteFailure::Other(e)) => {
                    tracing::error!(
                        "Failed to ship log from project {}: {}",
                        source_project,
                        format_gcp_error(&e)
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Finished processing logs for project '{}': shipped={}, rejected={}, failed={}, logged locally={}",
            self.target.project,
            report.shipped,
            report.rejected,
            report.failed,
            report.logged_locally
        );
        report
    }
}
