//! cache_get tool implementation.
//!
//! Retrieves one stored response by URL.

use hedgerow_core::{BlobStore, Error, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL of the stored GET request.
    pub url: String,

    /// Partition to look in. Omit to search all partitions, oldest first.
    #[serde(default)]
    pub partition: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheGetOutput {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub size: usize,
    /// Body as text, when it is valid UTF-8.
    pub body: Option<String>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(store: &dyn BlobStore, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".to_string()).into());
    }
    let url = Url::parse(params.url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let request = Request::get(url);

    let found = match &params.partition {
        Some(partition) => store.match_in(partition, &request).await?,
        None => store.match_any(&request).await?,
    };
    let response = found.ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    let output = CacheGetOutput {
        url: request.url.to_string(),
        status: response.status,
        headers: response.headers.clone(),
        size: response.body.len(),
        body: std::str::from_utf8(&response.body).ok().map(str::to_owned),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_fixture, output_json};
    use hedgerow_core::{CacheDb, Response};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { url: "http://localhost:8080/nope.html".to_string(), partition: None };

        let err = get_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let request = Request::parse_get("http://localhost:8080/data/events.json").unwrap();
        let response = Response::new(200, r#"[{"name":"Otter feeding"}]"#).with_header("content-type", "application/json");
        cache.put("wildlife-v1.0.0-static", &request, &response).await.unwrap();

        let params = CacheGetParams { url: "http://localhost:8080/data/events.json".to_string(), partition: None };
        let out = output_json(&get_impl(&cache, params).await.unwrap());
        assert_eq!(out["status"], 200);
        assert_eq!(out["body"], r#"[{"name":"Otter feeding"}]"#);
    }

    #[tokio::test]
    async fn test_get_impl_partition_scoped() {
        let f = active_fixture().await;
        let url = "http://localhost:8080/index.html".to_string();

        let params = CacheGetParams { url: url.clone(), partition: Some("wildlife-v1.0.0-static".into()) };
        assert!(get_impl(f.store.as_ref(), params).await.is_ok());

        let params = CacheGetParams { url, partition: Some("wildlife-v1.0.0-dynamic".into()) };
        assert!(get_impl(f.store.as_ref(), params).await.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_invalid_url() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { url: "not a url".to_string(), partition: None };
        let err = get_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }
}
