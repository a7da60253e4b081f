//! Sequential inventory run: hierarchy walk, discovery, utilization.

use super::discovery::scan_project;
use super::record::UtilizationRecord;
use crate::gcp::client::GcpClient;
use crate::gcp::hierarchy::walk_folders;
use crate::gcp::http::format_gcp_error;
use std::fmt;

/// Counters describing how much of the hierarchy was covered
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub folders_visited: usize,
    pub folders_failed: usize,
    pub projects_scanned: usize,
    pub projects_failed: usize,
    pub attachments_found: usize,
    pub attachments_failed: usize,
    pub subnets_failed: usize,
    pub records: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "folders={} (failed {}), projects={} (failed {}), attachments={} (failed {}), unresolved subnets={}, records={}",
            self.folders_visited,
            self.folders_failed,
            self.projects_scanned,
            self.projects_failed,
            self.attachments_found,
            self.attachments_failed,
            self.subnets_failed,
            self.records
        )
    }
}

/// Records of one run, in discovery order
#[derive(Debug, Default)]
pub struct Report {
    pub records: Vec<UtilizationRecord>,
    pub summary: RunSummary,
}

/// Inventory every service attachment below `folder_ids`.
///
/// Each folder branch, project, attachment and subnet fails on its own; the
/// run always completes with whatever could be collected.
pub async fn run(client: &GcpClient, folder_ids: &[String]) -> Report {
    let walk = walk_folders(client, folder_ids).await;

    let mut report = Report {
        summary: RunSummary {
            folders_visited: walk.folders_visited,
            folders_failed: walk.failed_folders.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    for project in &walk.projects {
        report.summary.projects_scanned += 1;
        match scan_project(client, project).await {
            Ok(scan) => {
                report.summary.attachments_found += scan.attachments_found;
                report.summary.attachments_failed += scan.attachments_failed;
                report.summary.subnets_failed += scan.subnets_failed;
                report.records.extend(scan.records);
            }
            Err(e) => {
                tracing::warn!(
                    "  - Error processing project {}: {}",
                    project.project_id,
                    format_gcp_error(&e)
                );
                report.summary.projects_failed += 1;
            }
        }
    }

    report.summary.records = report.records.len();
    tracing::info!("Inventory complete: {}", report.summary);
    report
}
