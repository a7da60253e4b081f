//! The exported unit: one utilization record per service attachment.

use super::utilization::{average_utilization, format_percent, Measure, SubnetUsage};
use serde_json::Value;

/// Column names of the tabular artifact, in order.
pub const HEADER: [&str; 9] = [
    "Folder",
    "Project",
    "ServiceAttachment",
    "NATSubnets",
    "NATSubnetRanges",
    "NATSubnetIPCount",
    "ForwardingRuleCount",
    "AvailableIPs",
    "AvgUtilization%",
];

/// Utilization summary of one service attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationRecord {
    /// Folder the project belongs to, e.g. `folders/123`
    pub folder_path: String,
    pub project_id: String,
    /// Full asset name of the attachment
    pub service_attachment: String,
    pub forwarding_rule_count: u64,
    /// NAT subnets in the order the attachment lists them
    pub subnets: Vec<SubnetUsage>,
    pub avg_utilization: Measure<f64>,
}

fn join<T, F: Fn(&SubnetUsage) -> T>(subnets: &[SubnetUsage], cell: F) -> String
where
    T: ToString,
{
    subnets
        .iter()
        .map(|s| cell(s).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl UtilizationRecord {
    pub fn new(
        folder_path: impl Into<String>,
        project_id: impl Into<String>,
        service_attachment: impl Into<String>,
        forwarding_rule_count: u64,
        subnets: Vec<SubnetUsage>,
    ) -> Self {
        let avg_utilization = average_utilization(&subnets);
        Self {
            folder_path: folder_path.into(),
            project_id: project_id.into(),
            service_attachment: service_attachment.into(),
            forwarding_rule_count,
            subnets,
            avg_utilization,
        }
    }

    pub fn nat_subnets(&self) -> String {
        join(&self.subnets, |s| s.name.clone())
    }

    pub fn nat_subnet_ranges(&self) -> String {
        join(&self.subnets, SubnetUsage::range)
    }

    pub fn nat_subnet_ip_counts(&self) -> String {
        join(&self.subnets, SubnetUsage::ip_count)
    }

    pub fn available_ips(&self) -> String {
        join(&self.subnets, SubnetUsage::available)
    }

    /// Average utilization as `37.50%`, or `N/A` without subnets
    pub fn avg_utilization_cell(&self) -> String {
        self.avg_utilization
            .map(|v| format!("{}%", format_percent(v)))
            .to_string()
    }

    /// The nine cells of this record, in [`HEADER`] order.
    ///
    /// Both output artifacts are rendered from this row.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::String(self.folder_path.clone()),
            Value::String(self.project_id.clone()),
            Value::String(self.service_attachment.clone()),
            Value::String(self.nat_subnets()),
            Value::String(self.nat_subnet_ranges()),
            Value::String(self.nat_subnet_ip_counts()),
            Value::from(self.forwarding_rule_count),
            Value::String(self.available_ips()),
            Value::String(self.avg_utilization_cell()),
        ]
    }
}
