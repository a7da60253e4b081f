//! GCP resource hierarchy
//!
//! Lists folders and projects through Resource Manager v3 and walks a folder
//! tree down to every project it contains.

use super::client::GcpClient;
use super::fetch::list_all;
use super::http::format_gcp_error;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;

/// Project information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub project_id: String,
    /// Parent reference, e.g. `folders/123`
    pub parent: String,
}

impl From<&Value> for Project {
    fn from(value: &Value) -> Self {
        let field = |key: &str, default: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            project_id: field("projectId", "-"),
            parent: field("parent", "-"),
        }
    }
}

/// Folder information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Resource name, `folders/<id>`
    pub name: String,
}

impl From<&Value> for Folder {
    fn from(value: &Value) -> Self {
        Self {
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
        }
    }
}

/// Accept both `123` and `folders/123`
pub fn folder_resource_name(folder_id: &str) -> String {
    let id = folder_id.trim().trim_matches('/');
    if id.starts_with("folders/") {
        id.to_string()
    } else {
        format!("folders/{}", id)
    }
}

fn is_active(value: &Value) -> bool {
    // Older API responses may omit the state entirely
    value
        .get("state")
        .and_then(|v| v.as_str())
        .map(|s| s == "ACTIVE")
        .unwrap_or(true)
}

/// List the active projects directly under a folder
pub async fn list_child_projects(client: &GcpClient, folder: &str) -> Result<Vec<Project>> {
    let url = client.resourcemanager_url("projects");
    let items = list_all(client, &url, &[("parent", folder)], "projects")
        .await
        .with_context(|| format!("Failed to list projects of {}", folder))?;

    Ok(items
        .iter()
        .filter(|p| is_active(p))
        .map(Project::from)
        .collect())
}

/// List the active folders directly under a folder
pub async fn list_child_folders(client: &GcpClient, folder: &str) -> Result<Vec<Folder>> {
    let url = client.resourcemanager_url("folders");
    let items = list_all(client, &url, &[("parent", folder)], "folders")
        .await
        .with_context(|| format!("Failed to list folders of {}", folder))?;

    Ok(items
        .iter()
        .filter(|f| is_active(f))
        .map(Folder::from)
        .collect())
}

/// Outcome of a hierarchy walk
#[derive(Debug, Default)]
pub struct Walk {
    /// Projects in depth-first preorder, each at most once
    pub projects: Vec<Project>,
    /// Folders visited (including ones that failed)
    pub folders_visited: usize,
    /// Folders whose listing failed
    pub failed_folders: Vec<String>,
}

/// Collect every project below `roots`.
///
/// A folder's projects come before those of its sub-folders, and sub-folders
/// are visited in listing order. A folder reached twice is walked once and a
/// project reached twice is reported once. If the projects of a folder cannot
/// be listed, nothing below that folder is reported; the walk carries on with
/// the remaining folders.
pub async fn walk_folders(client: &GcpClient, roots: &[String]) -> Walk {
    let mut walk = Walk::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen_projects: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = roots
        .iter()
        .rev()
        .map(|id| folder_resource_name(id))
        .collect();

    while let Some(folder) = stack.pop() {
        if !visited.insert(folder.clone()) {
            tracing::debug!("Folder {} already visited, skipping", folder);
            continue;
        }
        walk.folders_visited += 1;

        let projects = match list_child_projects(client, &folder).await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(
                    "Skipping folder {} and its sub-folders: {}",
                    folder,
                    format_gcp_error(&e)
                );
                walk.failed_folders.push(folder);
                continue;
            }
        };

        for project in projects {
            if seen_projects.insert(project.project_id.clone()) {
                tracing::info!("Found project: {}", project.project_id);
                walk.projects.push(project);
            } else {
                tracing::debug!("Project {} already found, skipping", project.project_id);
            }
        }

        match list_child_folders(client, &folder).await {
            Ok(children) => {
                for child in &children {
                    tracing::info!("Found folder: {}", child.name);
                }
                stack.extend(children.into_iter().rev().map(|f| f.name));
            }
            Err(e) => {
                tracing::warn!(
                    "Could not list sub-folders of {}: {}",
                    folder,
                    format_gcp_error(&e)
                );
                walk.failed_folders.push(folder);
            }
        }
    }

    tracing::info!(
        "Total projects found: {} ({} folders visited, {} failed)",
        walk.projects.len(),
        walk.folders_visited,
        walk.failed_folders.len()
    );

    walk
}
