//! Integration tests for the GCP HTTP client using wiremock
//!
//! These tests verify the HTTP client behavior against mocked endpoints,
//! ensuring proper handling of various response codes and edge cases.

use psc_subnet_monitor::gcp::auth::GcpCredentials;
use psc_subnet_monitor::gcp::client::{ApiEndpoints, GcpClient};
use psc_subnet_monitor::gcp::fetch::list_all;
use psc_subnet_monitor::gcp::http::{api_error, format_gcp_error, GcpHttpClient};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn error_body(code: u16, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Test module for HTTP client integration tests
mod http_client_tests {
    use super::*;

    /// Test successful GET request returns parsed JSON
    #[tokio::test]
    async fn test_get_success_returns_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(
                "/compute/v1/projects/test-project/regions/us-central1/subnetworks/nat-1",
            ))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "nat-1",
                "ipCidrRange": "10.0.0.0/28",
                "purpose": "PRIVATE_SERVICE_CONNECT"
            })))
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let url = format!(
            "{}/compute/v1/projects/test-project/regions/us-central1/subnetworks/nat-1",
            server.uri()
        );

        let response = client
            .get(&url, "test-token")
            .await
            .expect("Request should succeed");

        assert_eq!(response["ipCidrRange"], "10.0.0.0/28");
    }

    /// Test 401 response indicates authentication failure
    #[tokio::test]
    async fn test_401_is_unauthenticated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/projects"))
            .respond_with(ResponseTemplate::new(401).set_body_json(error_body(401, "Invalid credentials")))
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let err = client
            .get(&format!("{}/v3/projects", server.uri()), "expired")
            .await
            .unwrap_err();

        let api = api_error(&err).expect("should be an API error");
        assert!(api.is_unauthenticated());
        assert!(!api.is_permission_denied());
    }

    /// Test 403 response indicates permission denied
    #[tokio::test]
    async fn test_403_is_permission_denied() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/folders"))
            .respond_with(ResponseTemplate::new(403).set_body_json(error_body(403, "Permission denied")))
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let err = client
            .get(&format!("{}/v3/folders", server.uri()), "valid-token")
            .await
            .unwrap_err();

        assert!(api_error(&err).unwrap().is_permission_denied());
        assert!(format_gcp_error(&err).starts_with("Permission denied."));
    }

    /// Test 404 response for non-existent resources
    #[tokio::test]
    async fn test_404_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(
                "/compute/v1/projects/test-project/regions/us-east1/serviceAttachments/gone",
            ))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(error_body(404, "Attachment not found")),
            )
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let url = format!(
            "{}/compute/v1/projects/test-project/regions/us-east1/serviceAttachments/gone",
            server.uri()
        );
        let err = client.get(&url, "test-token").await.unwrap_err();

        assert!(api_error(&err).unwrap().is_not_found());
        assert_eq!(
            format_gcp_error(&err),
            "Resource not found. (Attachment not found)"
        );
    }

    /// Test POST request with JSON body
    #[tokio::test]
    async fn test_post_json_with_body() {
        let server = MockServer::start().await;

        let body = json!({"logName": "projects/p/logs/l", "entries": []});

        Mock::given(method("POST"))
            .and(path("/v2/entries:write"))
            .and(bearer_token("test-token"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let response = client
            .post_json(&format!("{}/v2/entries:write", server.uri()), "test-token", &body)
            .await
            .expect("Request should succeed");

        assert_eq!(response, json!({}));
    }

    /// Test raw upload carries the content type
    #[tokio::test]
    async fn test_post_bytes_sets_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/bkt/o"))
            .and(query_param("uploadType", "media"))
            .and(header("content-type", "text/csv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "a.csv"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let url = format!("{}/upload/storage/v1/b/bkt/o?uploadType=media&name=a.csv", server.uri());
        let response = client
            .post_bytes(&url, "test-token", "text/csv", b"a,b\r\n".to_vec())
            .await
            .expect("Upload should succeed");

        assert_eq!(response["name"], "a.csv");
    }

    /// Test empty response handling
    #[tokio::test]
    async fn test_empty_response_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/some/endpoint"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let response = client
            .post_json(&format!("{}/some/endpoint", server.uri()), "t", &json!({}))
            .await
            .expect("Request should succeed");

        assert!(response.is_null());
    }

    /// Test rate limiting (429) response
    #[tokio::test]
    async fn test_rate_limit_429() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rate-limited"))
            .respond_with(ResponseTemplate::new(429).set_body_json(error_body(429, "Rate limit exceeded")))
            .mount(&server)
            .await;

        let client = GcpHttpClient::new().unwrap();
        let err = client
            .get(&format!("{}/rate-limited", server.uri()), "t")
            .await
            .unwrap_err();

        assert_eq!(api_error(&err).unwrap().status().as_u16(), 429);
        assert!(format_gcp_error(&err).starts_with("Rate limit exceeded."));
    }

    /// Test pagination with nextPageToken
    #[tokio::test]
    async fn test_pagination_with_next_page_token() {
        let server = MockServer::start().await;

        // Second page
        Mock::given(method("GET"))
            .and(path("/v3/projects"))
            .and(query_param("pageToken", "token-page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"projectId": "p-3"},
                    {"projectId": "p-4"}
                ]
            })))
            .mount(&server)
            .await;

        // First page
        Mock::given(method("GET"))
            .and(path("/v3/projects"))
            .and(query_param("parent", "folders/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"projectId": "p-1"},
                    {"projectId": "p-2"}
                ],
                "nextPageToken": "token-page-2"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let client = GcpClient::new(
            GcpCredentials::from_token("test-token"),
            ApiEndpoints::rooted_at(&server.uri()),
        )
        .unwrap();

        let items = list_all(
            &client,
            &client.resourcemanager_url("projects"),
            &[("parent", "folders/1")],
            "projects",
        )
        .await
        .expect("Listing should succeed");

        let ids: Vec<&str> = items
            .iter()
            .filter_map(|p| p["projectId"].as_str())
            .collect();
        assert_eq!(ids, vec!["p-1", "p-2", "p-3", "p-4"]);
    }

    /// Test a repeated page token is reported instead of looping forever
    #[tokio::test]
    async fn test_repeated_page_token_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/folders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "folders": [{"name": "folders/2"}],
                "nextPageToken": "same"
            })))
            .mount(&server)
            .await;

        let client = GcpClient::new(
            GcpCredentials::from_token("test-token"),
            ApiEndpoints::rooted_at(&server.uri()),
        )
        .unwrap();

        let err = list_all(&client, &client.resourcemanager_url("folders"), &[], "folders")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Page token not unique"));
    }
}
