//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to
//! the cache manager and the partition store.
use std::sync::Arc;

use crate::tools::{
    CacheGetParams, CacheListParams, SiteFetchParams, WorkerMessageParams, WorkerNotificationClickParams,
    WorkerPushParams, WorkerSyncParams, cache, events, fetch, lifecycle,
};

use hedgerow_client::CacheManager;
use hedgerow_core::BlobStore;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for hedgerow.
#[derive(Clone)]
pub struct HedgerowServer {
    tool_router: ToolRouter<Self>,
    manager: Arc<CacheManager>,
    store: Arc<dyn BlobStore>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl HedgerowServer {
    /// Create a new server handler around a manager and the store it writes to.
    pub fn new(manager: Arc<CacheManager>, store: Arc<dyn BlobStore>) -> Self {
        Self { tool_router: Self::tool_router(), manager, store }
    }

    #[tool(description = "Fetch a site path or URL through the offline cache, as a page would. \
                          Reports the route taken (cache-first, network-first, or network) and the response.")]
    async fn site_fetch(&self, params: Parameters<SiteFetchParams>) -> Result<CallToolResult, McpError> {
        fetch::fetch_impl(&self.manager, params.0).await
    }

    #[tool(description = "Run install: fetch every manifest asset into the static partition (all or nothing).")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.manager).await
    }

    #[tool(description = "Run activate: delete partitions from older cache versions and start serving from cache.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.manager).await
    }

    #[tool(description = "Post a control message, e.g. {\"action\": \"skipWaiting\"} or {\"action\": \"clearCache\"}.")]
    async fn worker_message(&self, params: Parameters<WorkerMessageParams>) -> Result<CallToolResult, McpError> {
        events::message_impl(&self.manager, params.0).await
    }

    #[tool(description = "Deliver a push event. Shows a notification built from the optional JSON payload.")]
    async fn worker_push(&self, params: Parameters<WorkerPushParams>) -> Result<CallToolResult, McpError> {
        events::push_impl(&self.manager, params.0).await
    }

    #[tool(description = "Click a notification. The \"view\" action opens the site root.")]
    async fn worker_notification_click(
        &self, params: Parameters<WorkerNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        events::notification_click_impl(&self.manager, params.0).await
    }

    #[tool(description = "Deliver a background sync event by tag (e.g. \"sync-favourites\").")]
    async fn worker_sync(&self, params: Parameters<WorkerSyncParams>) -> Result<CallToolResult, McpError> {
        events::sync_impl(&self.manager, params.0).await
    }

    #[tool(description = "List cache partitions, or the entries stored in one partition.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        cache::list_impl(self.store.as_ref(), params.0).await
    }

    #[tool(description = "Read one stored response by URL, optionally from a single partition.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(self.store.as_ref(), params.0).await
    }
}

impl ServerHandler for HedgerowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "hedgerow".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
