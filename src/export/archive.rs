//! Upload of the local artifacts to a Cloud Storage bucket.

use crate::gcp::client::GcpClient;
use crate::gcp::http::format_gcp_error;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// What happened to each artifact
#[derive(Debug, Default)]
pub struct UploadReport {
    /// `gs://` URIs written
    pub uploaded: Vec<String>,
    /// Local files that could not be uploaded
    pub failed: Vec<PathBuf>,
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Object name for a local file: its file name, under `prefix` if given
pub fn object_name(prefix: Option<&str>, path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}", prefix, file_name),
        None => file_name,
    }
}

/// Upload one local file to `gs://bucket/object`
pub async fn upload_file(
    client: &GcpClient,
    bucket: &str,
    object: &str,
    path: &Path,
) -> Result<String> {
    let body = std::fs::read(path).with_context(|| format!("Error reading {}", path.display()))?;
    let url = client.storage_upload_url(bucket, object);
    client
        .post_bytes(&url, content_type(path), body)
        .await
        .with_context(|| format!("Failed to upload {} to bucket {}", path.display(), bucket))?;
    Ok(format!("gs://{}/{}", bucket, object))
}

/// Upload each artifact independently; a failed upload never affects the
/// local files or the other uploads.
pub async fn upload_artifacts(
    client: &GcpClient,
    bucket: &str,
    prefix: Option<&str>,
    paths: &[PathBuf],
) -> UploadReport {
    let mut report = UploadReport::default();

    for path in paths {
        let object = object_name(prefix, path);
        match upload_file(client, bucket, &object, path).await {
            Ok(uri) => {
                tracing::info!("Uploaded {} to {}", path.display(), uri);
                report.uploaded.push(uri);
            }
            Err(e) => {
                tracing::error!(
                    "Upload of {} failed: {}",
                    path.display(),
                    format_gcp_error(&e)
                );
                report.failed.push(path.clone());
            }
        }
    }

    report
}
