//! site_fetch tool implementation.
//!
//! Sends one request through the cache manager, exactly as a page on the
//! site would, and reports how it was routed and what came back.

use hedgerow_client::{CacheManager, LifecycleState, Route};
use hedgerow_core::{Destination, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the site_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteFetchParams {
    /// Root-relative path (e.g. "/animals.html") or absolute URL.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// What the page would use the response for: "document" for a
    /// navigation, "image", "script", "style", and so on.
    #[serde(default)]
    pub destination: Option<Destination>,
}

/// Output from the site_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SiteFetchOutput {
    pub url: String,
    pub method: String,
    /// Lifecycle state when the request was handled.
    pub state: LifecycleState,
    pub route: Route,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub size: usize,
    /// Body as text, when it is valid UTF-8.
    pub body: Option<String>,
}

/// Implementation of the site_fetch tool.
pub async fn fetch_impl(manager: &CacheManager, params: SiteFetchParams) -> Result<CallToolResult, McpError> {
    let input = params.url.trim();
    if input.is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".to_string()).into());
    }

    let mut request = Request::get(manager.config().resolve(input)?);
    if let Some(method) = params.method.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        request = request.with_method(method);
    }
    if let Some(destination) = params.destination {
        request = request.with_destination(destination);
    }

    let state = manager.state().await;
    let route = if state == LifecycleState::Active { manager.route(&request) } else { Route::Network };

    let response = manager.on_fetch(&request).await?;

    let output = SiteFetchOutput {
        url: request.url.to_string(),
        method: request.method.clone(),
        state,
        route,
        status: response.status,
        content_type: response.content_type().map(str::to_owned),
        headers: response.headers.clone(),
        size: response.body.len(),
        body: std::str::from_utf8(&response.body).ok().map(str::to_owned),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_fixture, fixture, output_json};
    use hedgerow_core::BlobStore;

    fn params(url: &str) -> SiteFetchParams {
        SiteFetchParams { url: url.to_string(), method: None, destination: None }
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let f = fixture().await;
        let err = fetch_impl(&f.manager, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_fetch_before_install_is_network_route() {
        let f = fixture().await;
        let out = output_json(&fetch_impl(&f.manager, params("/css/base.css")).await.unwrap());
        assert_eq!(out["state"], "installing");
        assert_eq!(out["route"]["route"], "network");
        assert_eq!(out["status"], 200);
        assert!(f.store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_static_served_offline() {
        let f = active_fixture().await;
        f.fetcher.set_offline(true);

        let out = output_json(&fetch_impl(&f.manager, params("/css/base.css")).await.unwrap());
        assert_eq!(out["route"]["route"], "cache_first");
        assert_eq!(out["route"]["class"], "static");
        assert_eq!(out["route"]["partition"], "wildlife-v1.0.0-static");
        assert_eq!(out["url"], "http://localhost:8080/css/base.css");
    }

    #[tokio::test]
    async fn test_fetch_offline_navigation_gets_shell() {
        let f = active_fixture().await;
        f.fetcher.set_offline(true);

        let p = SiteFetchParams { destination: Some(Destination::Document), ..params("/map.html") };
        let out = output_json(&fetch_impl(&f.manager, p).await.unwrap());
        assert_eq!(out["route"]["route"], "network_first");
        assert!(out["body"].as_str().unwrap().contains("British Wildlife Centre"));
    }

    #[tokio::test]
    async fn test_fetch_offline_image_placeholder() {
        let f = active_fixture().await;
        f.fetcher.set_offline(true);

        let out = output_json(&fetch_impl(&f.manager, params("/images/otter.webp")).await.unwrap());
        assert_eq!(out["content_type"], "image/svg+xml");
        assert!(out["body"].as_str().unwrap().contains("Offline"));
    }

    #[tokio::test]
    async fn test_fetch_offline_dynamic_miss_is_error() {
        let f = active_fixture().await;
        f.fetcher.set_offline(true);

        let err = fetch_impl(&f.manager, params("/api/visits")).await.unwrap_err();
        assert_eq!(err.code.0, -32008);
    }

    #[tokio::test]
    async fn test_fetch_post_not_cached() {
        let f = active_fixture().await;
        f.fetcher.serve("/feedback", "thanks");

        let p = SiteFetchParams { method: Some("post".into()), ..params("/feedback") };
        let out = output_json(&fetch_impl(&f.manager, p).await.unwrap());
        assert_eq!(out["method"], "POST");
        assert_eq!(out["route"]["route"], "network");
        assert!(f.store.entries("wildlife-v1.0.0-dynamic").await.unwrap().is_empty());
    }
}
