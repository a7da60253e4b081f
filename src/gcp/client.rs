//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication,
//! HTTP functionality and the per-service base URLs.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Base URLs of the APIs this tool talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub resource_manager: String,
    pub cloud_asset: String,
    pub compute: String,
    pub storage: String,
    pub logging: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            resource_manager: "https://cloudresourcemanager.googleapis.com".to_string(),
            cloud_asset: "https://cloudasset.googleapis.com".to_string(),
            compute: "https://compute.googleapis.com".to_string(),
            storage: "https://storage.googleapis.com".to_string(),
            logging: "https://logging.googleapis.com".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Point every API at one root (emulators, mock servers)
    pub fn rooted_at(root: &str) -> Self {
        let root = root.trim_end_matches('/').to_string();
        Self {
            resource_manager: root.clone(),
            cloud_asset: root.clone(),
            compute: root.clone(),
            storage: root.clone(),
            logging: root,
        }
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: ApiEndpoints,
}

impl GcpClient {
    pub fn new(credentials: GcpCredentials, endpoints: ApiEndpoints) -> Result<Self> {
        let http = GcpHttpClient::new().context("Failed to initialize GCP HTTP client")?;

        Ok(Self {
            credentials,
            http,
            endpoints,
        })
    }

    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request with a JSON body
    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post_json(url, &token, body).await
    }

    /// Make a POST request with a raw body
    pub async fn post_bytes(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post_bytes(url, &token, content_type, body).await
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager v3 URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.endpoints.resource_manager, path)
    }

    // =========================================================================
    // Cloud Asset API helpers
    // =========================================================================

    /// Build Cloud Asset `searchAllResources` URL for a scope like `projects/my-project`
    pub fn asset_search_url(&self, scope: &str) -> String {
        format!("{}/v1/{}:searchAllResources", self.endpoints.cloud_asset, scope)
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build regional Compute Engine API URL
    pub fn compute_regional_url(&self, project: &str, region: &str, resource: &str) -> String {
        format!(
            "{}/compute/v1/projects/{}/regions/{}/{}",
            self.endpoints.compute, project, region, resource
        )
    }

    // =========================================================================
    // Cloud Storage API helpers
    // =========================================================================

    /// Build Cloud Storage simple media upload URL
    pub fn storage_upload_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoints.storage,
            urlencoding::encode(bucket),
            urlencoding::encode(object)
        )
    }

    // =========================================================================
    // Cloud Logging API helpers
    // =========================================================================

    /// Build Cloud Logging `entries:write` URL
    pub fn logging_write_url(&self) -> String {
        format!("{}/v2/entries:write", self.endpoints.logging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GcpClient {
        GcpClient::new(
            GcpCredentials::from_token("t"),
            ApiEndpoints::rooted_at("http://localhost:9999/"),
        )
        .unwrap()
    }

    #[test]
    fn test_default_endpoints_are_google_apis() {
        let endpoints = ApiEndpoints::default();
        assert_eq!(endpoints.compute, "https://compute.googleapis.com");
        assert!(endpoints.logging.starts_with("https://logging."));
    }

    #[test]
    fn test_url_builders() {
        let c = client();
        assert_eq!(
            c.resourcemanager_url("folders"),
            "http://localhost:9999/v3/folders"
        );
        assert_eq!(
            c.asset_search_url("projects/p1"),
            "http://localhost:9999/v1/projects/p1:searchAllResources"
        );
        assert_eq!(
            c.compute_regional_url("p1", "us-east1", "subnetworks/s1"),
            "http://localhost:9999/compute/v1/projects/p1/regions/us-east1/subnetworks/s1"
        );
        assert_eq!(
            c.storage_upload_url("bkt", "reports/a.csv"),
            "http://localhost:9999/upload/storage/v1/b/bkt/o?uploadType=media&name=reports%2Fa.csv"
        );
        assert_eq!(
            c.logging_write_url(),
            "http://localhost:9999/v2/entries:write"
        );
    }
}
