//! Compute Engine detail lookups for service attachments and subnetworks.

use super::client::GcpClient;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Live detail of a service attachment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAttachmentDetail {
    /// Consumer endpoints (forwarding rules) connected to the attachment
    #[serde(default)]
    pub connected_endpoints: Vec<Value>,
    /// NAT subnet references, in the order they are configured
    #[serde(default)]
    pub nat_subnets: Vec<String>,
}

impl ServiceAttachmentDetail {
    /// Number of connected forwarding rules
    pub fn rule_count(&self) -> u64 {
        self.connected_endpoints.len() as u64
    }
}

/// Subnetwork detail needed for capacity calculations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetworkDetail {
    #[serde(default)]
    pub ip_cidr_range: String,
}

/// Get a service attachment by project, region and name
pub async fn get_service_attachment(
    client: &GcpClient,
    project: &str,
    region: &str,
    name: &str,
) -> Result<ServiceAttachmentDetail> {
    let url = client.compute_regional_url(
        project,
        region,
        &format!("serviceAttachments/{}", urlencoding::encode(name)),
    );
    let response = client.get(&url).await?;
    serde_json::from_value(response)
        .with_context(|| format!("Unexpected service attachment payload for {}", name))
}

/// Get a subnetwork by project, region and name
pub async fn get_subnetwork(
    client: &GcpClient,
    project: &str,
    region: &str,
    name: &str,
) -> Result<SubnetworkDetail> {
    let url = client.compute_regional_url(
        project,
        region,
        &format!("subnetworks/{}", urlencoding::encode(name)),
    );
    let response = client.get(&url).await?;
    serde_json::from_value(response)
        .with_context(|| format!("Unexpected subnetwork payload for {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_attachment_detail_rule_count() {
        let detail: ServiceAttachmentDetail = serde_json::from_value(json!({
            "name": "sa-1",
            "connectedEndpoints": [
                {"endpoint": "https://www.googleapis.com/compute/v1/projects/c/regions/r/forwardingRules/fr1", "status": "ACCEPTED"},
                {"endpoint": "https://www.googleapis.com/compute/v1/projects/c/regions/r/forwardingRules/fr2", "status": "ACCEPTED"}
            ],
            "natSubnets": ["https://www.googleapis.com/compute/v1/projects/p/regions/r/subnetworks/nat-1"]
        }))
        .unwrap();
        assert_eq!(detail.rule_count(), 2);
        assert_eq!(detail.nat_subnets.len(), 1);
    }

    #[test]
    fn test_service_attachment_detail_defaults() {
        let detail: ServiceAttachmentDetail = serde_json::from_value(json!({"name": "sa"})).unwrap();
        assert_eq!(detail.rule_count(), 0);
        assert!(detail.nat_subnets.is_empty());
    }

    #[test]
    fn test_subnetwork_detail() {
        let subnet: SubnetworkDetail = serde_json::from_value(json!({
            "name": "nat-1",
            "ipCidrRange": "10.0.0.0/28",
            "purpose": "PRIVATE_SERVICE_CONNECT"
        }))
        .unwrap();
        assert_eq!(subnet.ip_cidr_range, "10.0.0.0/28");
    }
}
