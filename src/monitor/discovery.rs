//! Per-project attachment discovery and NAT subnet resolution.

use super::record::UtilizationRecord;
use super::utilization::{format_percent, SubnetCapacity, SubnetUsage};
use crate::gcp::assets::{search_service_attachments, AttachmentRef};
use crate::gcp::client::GcpClient;
use crate::gcp::compute::{get_service_attachment, get_subnetwork};
use crate::gcp::fetch::{extract_short_name, segment_after};
use crate::gcp::hierarchy::Project;
use crate::gcp::http::format_gcp_error;
use anyhow::Result;

/// A NAT subnet reference taken from an attachment's `natSubnets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetRef {
    pub link: String,
    pub name: String,
    pub region: Option<String>,
    pub project: Option<String>,
}

impl SubnetRef {
    /// Split a subnetwork link; the name is always available.
    pub fn parse(link: &str) -> Self {
        Self {
            link: link.to_string(),
            name: extract_short_name(link),
            region: segment_after(link, "regions").map(str::to_string),
            project: segment_after(link, "projects").map(str::to_string),
        }
    }
}

/// Outcome of scanning one project
#[derive(Debug, Default)]
pub struct ProjectScan {
    pub records: Vec<UtilizationRecord>,
    pub attachments_found: usize,
    pub attachments_failed: usize,
    pub subnets_failed: usize,
}

/// Resolve one NAT subnet and compute its capacity.
///
/// A bare subnet name is looked up in the attachment's project and region.
/// Any failure, including an unusable CIDR range, yields an unavailable
/// entry that still carries the subnet name.
pub async fn resolve_subnet(
    client: &GcpClient,
    subnet: &SubnetRef,
    attachment: &AttachmentRef,
    rule_count: u64,
) -> SubnetUsage {
    let region = subnet.region.as_deref().unwrap_or(&attachment.region);
    let project = subnet.project.as_deref().unwrap_or(&attachment.project);

    let detail = match get_subnetwork(client, project, region, &subnet.name).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(
                "  - Error retrieving subnet details for {}: {}",
                subnet.name,
                format_gcp_error(&e)
            );
            return SubnetUsage::unavailable(&subnet.name);
        }
    };

    match SubnetCapacity::compute(&detail.ip_cidr_range, rule_count) {
        Ok(capacity) => {
            tracing::info!(
                "   NAT Subnet Name: {}, Range: {}, Total IPs: {}, Reserved IPs: {}, Available IPs: {}, Utilization: {}%",
                subnet.name,
                capacity.range,
                capacity.ip_count,
                capacity.reserved_ips,
                capacity.available,
                format_percent(capacity.utilization)
            );
            SubnetUsage::resolved(&subnet.name, capacity)
        }
        Err(e) => {
            tracing::warn!(
                "  - Error retrieving subnet details for {}: range '{}': {}",
                subnet.name,
                detail.ip_cidr_range,
                e
            );
            SubnetUsage::unavailable(&subnet.name)
        }
    }
}

/// Fetch an attachment's live detail and build its record.
///
/// Returns the record and the number of subnets that could not be resolved.
pub async fn assess_attachment(
    client: &GcpClient,
    project: &Project,
    attachment: &AttachmentRef,
) -> Result<(UtilizationRecord, usize)> {
    let detail = get_service_attachment(
        client,
        &attachment.project,
        &attachment.region,
        &attachment.name,
    )
    .await?;

    let rule_count = detail.rule_count();
    if rule_count > 0 {
        tracing::info!(
            "  - Found {} forwarding rule(s) for service attachment: {}",
            rule_count,
            attachment.asset_name
        );
    } else {
        tracing::info!(
            "  - No forwarding rules found for service attachment: {}",
            attachment.asset_name
        );
    }

    let mut subnets = Vec::with_capacity(detail.nat_subnets.len());
    let mut failed = 0;
    for link in &detail.nat_subnets {
        let usage = resolve_subnet(
            client,
            &SubnetRef::parse(link),
            attachment,
            rule_count,
        )
        .await;
        if usage.capacity.is_unavailable() {
            failed += 1;
        }
        subnets.push(usage);
    }

    let record = UtilizationRecord::new(
        &project.parent,
        &project.project_id,
        &attachment.asset_name,
        rule_count,
        subnets,
    );
    tracing::info!("   Average Utilization: {}", record.avg_utilization_cell());

    Ok((record, failed))
}

/// Find a project's service attachments and assess each of them.
///
/// Fails only when the attachment search itself fails; an attachment whose
/// detail cannot be fetched is logged and left out.
pub async fn scan_project(client: &GcpClient, project: &Project) -> Result<ProjectScan> {
    tracing::info!("Processing project: {}", project.project_id);

    let attachments = search_service_attachments(client, &project.project_id).await?;
    let mut scan = ProjectScan {
        attachments_found: attachments.len(),
        ..Default::default()
    };

    for attachment in &attachments {
        match assess_attachment(client, project, attachment).await {
            Ok((record, failed_subnets)) => {
                scan.subnets_failed += failed_subnets;
                scan.records.push(record);
            }
            Err(e) => {
                tracing::warn!(
                    "  - Error getting service attachment details for {}: {}",
                    attachment.name,
                    format_gcp_error(&e)
                );
                scan.attachments_failed += 1;
            }
        }
    }

    if scan.records.iter().all(|r| r.forwarding_rule_count == 0) {
        tracing::info!(
            "  - No forwarding rules found in project: {}",
            project.project_id
        );
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_ref_parse_full_link() {
        let r = SubnetRef::parse(
            "https://www.googleapis.com/compute/v1/projects/proj-a/regions/us-central1/subnetworks/psc-nat-1",
        );
        assert_eq!(r.name, "psc-nat-1");
        assert_eq!(r.region.as_deref(), Some("us-central1"));
        assert_eq!(r.project.as_deref(), Some("proj-a"));
    }

    #[test]
    fn test_subnet_ref_parse_bare_name() {
        let r = SubnetRef::parse("psc-nat-1");
        assert_eq!(r.name, "psc-nat-1");
        assert_eq!(r.region, None);
        assert_eq!(r.project, None);
    }
}
