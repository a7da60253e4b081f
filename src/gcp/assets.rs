//! Cloud Asset Inventory search for service attachments.

use super::client::GcpClient;
use super::fetch::{list_all, segment_after};
use anyhow::{Context, Result};

/// Asset type of a Private Service Connect producer attachment
pub const SERVICE_ATTACHMENT_ASSET_TYPE: &str = "compute.googleapis.com/ServiceAttachment";

/// A service attachment found by the asset search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Full asset name, e.g.
    /// `//compute.googleapis.com/projects/p/regions/r/serviceAttachments/sa`
    pub asset_name: String,
    pub project: String,
    pub region: String,
    pub name: String,
}

impl AttachmentRef {
    /// Parse an asset name; `None` if it is not a regional service attachment
    pub fn parse(asset_name: &str) -> Option<Self> {
        let project = segment_after(asset_name, "projects")?;
        let region = segment_after(asset_name, "regions")?;
        let name = segment_after(asset_name, "serviceAttachments")?;
        Some(Self {
            asset_name: asset_name.to_string(),
            project: project.to_string(),
            region: region.to_string(),
            name: name.to_string(),
        })
    }
}

/// Search a project for service attachments
///
/// Asset names that do not look like a regional service attachment are
/// logged and dropped.
pub async fn search_service_attachments(
    client: &GcpClient,
    project_id: &str,
) -> Result<Vec<AttachmentRef>> {
    let scope = format!("projects/{}", project_id);
    let url = client.asset_search_url(&scope);
    let results = list_all(
        client,
        &url,
        &[("assetTypes", SERVICE_ATTACHMENT_ASSET_TYPE)],
        "results",
    )
    .await
    .with_context(|| format!("Failed to search service attachments in {}", scope))?;

    let mut attachments = Vec::with_capacity(results.len());
    for result in &results {
        let Some(asset_name) = result.get("name").and_then(|v| v.as_str()) else {
            tracing::warn!("Asset search result without a name in {}", scope);
            continue;
        };
        match AttachmentRef::parse(asset_name) {
            Some(attachment) => attachments.push(attachment),
            None => tracing::warn!("Unrecognised service attachment name: {}", asset_name),
        }
    }

    Ok(attachments)
}
