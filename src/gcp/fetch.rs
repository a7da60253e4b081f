//! Paginated list calls and resource-name helpers.

use super::client::GcpClient;
use anyhow::Result;
use serde_json::Value;

/// One page of a list call
pub struct Page {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// Append `key=value` pairs to a URL, URL-encoding the values
pub fn add_query_params(url: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}

/// Fetch one page of a list call
pub async fn fetch_page(
    client: &GcpClient,
    url: &str,
    params: &[(&str, &str)],
    items_key: &str,
    page_token: Option<&str>,
) -> Result<Page> {
    let mut params = params.to_vec();
    if let Some(token) = page_token {
        params.push(("pageToken", token));
    }

    let response = client.get(&add_query_params(url, &params)).await?;

    let items = response
        .get(items_key)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let next_token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(Page { items, next_token })
}

/// Fetch all items of a list call (auto-paginate)
pub async fn list_all(
    client: &GcpClient,
    url: &str,
    params: &[(&str, &str)],
    items_key: &str,
) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(client, url, params, items_key, page_token.as_deref()).await?;
        all_items.extend(page.items);

        match page.next_token {
            Some(token) if page_token.as_deref() != Some(token.as_str()) => {
                page_token = Some(token)
            }
            Some(token) => {
                return Err(anyhow::anyhow!(
                    "Page token not unique ({}) - possible infinite loop",
                    token
                ))
            }
            None => break,
        }
    }

    Ok(all_items)
}

/// Extract short name from GCP resource URL
/// e.g., "https://www.googleapis.com/compute/v1/projects/p/regions/us-east1/subnetworks/s1" -> "s1"
pub fn extract_short_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Value of the path segment following `key`
/// e.g., `segment_after(".../projects/p/regions/r/...", "regions")` -> `Some("r")`
pub fn segment_after<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    let mut parts = path.split('/');
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next().filter(|s| !s.is_empty());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_query_params() {
        assert_eq!(add_query_params("http://x/a", &[]), "http://x/a");
        assert_eq!(
            add_query_params("http://x/a", &[("parent", "folders/1"), ("pageToken", "t")]),
            "http://x/a?parent=folders%2F1&pageToken=t"
        );
        assert_eq!(
            add_query_params("http://x/a?uploadType=media", &[("name", "b")]),
            "http://x/a?uploadType=media&name=b"
        );
    }

    #[test]
    fn test_extract_short_name() {
        assert_eq!(
            extract_short_name(
                "https://www.googleapis.com/compute/v1/projects/p/regions/us-east1/subnetworks/nat-1"
            ),
            "nat-1"
        );
        assert_eq!(extract_short_name("plain"), "plain");
    }

    #[test]
    fn test_segment_after() {
        let link = "projects/p1/regions/europe-west1/subnetworks/s1";
        assert_eq!(segment_after(link, "projects"), Some("p1"));
        assert_eq!(segment_after(link, "regions"), Some("europe-west1"));
        assert_eq!(segment_after(link, "zones"), None);
        assert_eq!(segment_after("projects/", "projects"), None);
    }
}
