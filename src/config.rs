//! Configuration Management
//!
//! Optional JSON configuration for psc-subnet-monitor. Every key can also be
//! given on the command line or through the environment, which take
//! precedence over the file.

use crate::export::shipper::{SinkTarget, DEFAULT_LOG_NAME, DEFAULT_LOG_TAG, DEFAULT_RESOURCE_TYPE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CSV_FILE: &str = "service_attachments.csv";
pub const DEFAULT_JSON_FILE: &str = "service_attachments.json";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Root folder ids to inventory
    #[serde(default)]
    pub folder_ids: Vec<String>,
    #[serde(default)]
    pub csv_file: Option<PathBuf>,
    #[serde(default)]
    pub json_file: Option<PathBuf>,
    /// Bucket receiving copies of the artifacts
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub archive_prefix: Option<String>,
    /// Project hosting the log sink
    #[serde(default)]
    pub log_project: Option<String>,
    #[serde(default)]
    pub log_name: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub log_tag: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("psc-subnet-monitor").join("config.json"))
    }

    /// Load configuration from disk.
    ///
    /// An explicit path must exist and parse. The default path is optional
    /// and a broken default file is ignored with a warning.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        match Self::read(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Root folders (CLI > config). Blank ids are dropped.
    pub fn effective_folders(&self, cli: &[String]) -> Vec<String> {
        let source = if cli.is_empty() { &self.folder_ids } else { cli };
        source
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn effective_csv_file(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.csv_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_FILE))
    }

    pub fn effective_json_file(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.json_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_FILE))
    }

    pub fn effective_bucket(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.bucket.clone())
            .filter(|b| !b.trim().is_empty())
    }

    pub fn effective_archive_prefix(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.archive_prefix.clone())
    }

    /// Get effective sink project (CLI > config > gcloud default)
    pub fn effective_log_project(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.log_project.clone())
            .filter(|p| !p.trim().is_empty())
            .or_else(crate::gcp::auth::get_default_project)
    }

    /// Sink settings for `project`, with the log name overridable from the CLI
    pub fn sink_target(&self, project: &str, log_name: Option<String>) -> SinkTarget {
        SinkTarget {
            project: project.to_string(),
            log_name: log_name
                .or_else(|| self.log_name.clone())
                .unwrap_or_else(|| DEFAULT_LOG_NAME.to_string()),
            resource_type: self
                .resource_type
                .clone()
                .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
            log_tag: self
                .log_tag
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_TAG.to_string()),
        }
    }
}
