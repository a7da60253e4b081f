//! Artifact output and forwarding.
//!
//! - [`csv`] - Tabular artifact
//! - [`json`] - Structured artifact (list of rows)
//! - [`archive`] - Copies of the artifacts in Cloud Storage
//! - [`shipper`] - Structured log entries in Cloud Logging

pub mod archive;
pub mod csv;
pub mod json;
pub mod shipper;

pub use archive::{upload_artifacts, UploadReport};
pub use csv::write_csv;
pub use json::write_json;
pub use shipper::{LogShipper, ShipReport, SinkFallback, SinkTarget, LOG_FIELDS};
