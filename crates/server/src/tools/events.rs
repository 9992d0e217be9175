//! Side-channel tools: worker_message, worker_push,
//! worker_notification_click, worker_sync.

use hedgerow_client::{CacheManager, MessageOutcome, Notification};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageParams {
    /// Message as a page would post it, e.g. {"action": "clearCache"}.
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    SkipWaiting,
    ClearCache,
    Ignored,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerMessageOutput {
    pub outcome: MessageKind,
    /// Partitions removed by a clear-cache message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Vec<String>>,
}

/// Parameters for the worker_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerPushParams {
    /// Raw push data. Expected to be JSON with optional "title", "body",
    /// and "tag" strings; anything else falls back to the defaults.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the worker_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerNotificationClickParams {
    /// Tag of the clicked notification.
    pub tag: String,

    /// Action button pressed ("view" or "close"); omit for a body click.
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerNotificationClickOutput {
    pub tag: String,
    pub opened_window: bool,
}

/// Parameters for the worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncParams {
    /// Background sync tag, e.g. "sync-favourites".
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerSyncOutput {
    pub tag: String,
    pub completed: bool,
}

/// Implementation of the worker_message tool.
///
/// A clear-cache message runs on a background task; the tool waits for it
/// so the caller sees which partitions went away.
pub async fn message_impl(manager: &CacheManager, params: WorkerMessageParams) -> Result<CallToolResult, McpError> {
    let output = match manager.on_message(&params.message).await {
        MessageOutcome::SkipWaiting => WorkerMessageOutput { outcome: MessageKind::SkipWaiting, deleted: None },
        MessageOutcome::ClearCache(handle) => {
            let deleted = handle
                .await
                .map_err(|e| McpError::internal_error(e.to_string(), None))??;
            WorkerMessageOutput { outcome: MessageKind::ClearCache, deleted: Some(deleted) }
        }
        MessageOutcome::Ignored => WorkerMessageOutput { outcome: MessageKind::Ignored, deleted: None },
    };
    json_result(&output)
}

/// Implementation of the worker_push tool.
pub async fn push_impl(manager: &CacheManager, params: WorkerPushParams) -> Result<CallToolResult, McpError> {
    let notification: Notification = manager.on_push(params.payload.as_deref().map(str::as_bytes)).await?;
    json_result(&notification)
}

/// Implementation of the worker_notification_click tool.
pub async fn notification_click_impl(
    manager: &CacheManager, params: WorkerNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let opened_window = manager
        .on_notification_click(&params.tag, params.action.as_deref())
        .await?;
    json_result(&WorkerNotificationClickOutput { tag: params.tag, opened_window })
}

/// Implementation of the worker_sync tool.
pub async fn sync_impl(manager: &CacheManager, params: WorkerSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.trim();
    if tag.is_empty() {
        return Err(ToolError::InvalidInput("tag cannot be empty".to_string()).into());
    }
    manager.on_sync(tag).await?;
    json_result(&WorkerSyncOutput { tag: tag.to_string(), completed: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_fixture, fixture, output_json};
    use hedgerow_core::BlobStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_message_clear_cache_reports_deleted() {
        let f = active_fixture().await;
        f.store.open("leaflet-tiles").await.unwrap();

        let params = WorkerMessageParams { message: json!({"action": "clearCache"}) };
        let out = output_json(&message_impl(&f.manager, params).await.unwrap());
        assert_eq!(out["outcome"], "clear_cache");
        assert_eq!(out["deleted"], json!(["wildlife-v1.0.0-static", "leaflet-tiles"]));
        assert!(f.store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_message_skip_waiting_and_ignored() {
        let f = fixture().await;

        let params = WorkerMessageParams { message: json!({"action": "skipWaiting"}) };
        let out = output_json(&message_impl(&f.manager, params).await.unwrap());
        assert_eq!(out["outcome"], "skip_waiting");
        assert!(out.get("deleted").is_none());

        let params = WorkerMessageParams { message: json!({"type": "ping"}) };
        let out = output_json(&message_impl(&f.manager, params).await.unwrap());
        assert_eq!(out["outcome"], "ignored");
    }

    #[tokio::test]
    async fn test_push_defaults_and_payload() {
        let f = fixture().await;

        let out = output_json(&push_impl(&f.manager, WorkerPushParams { payload: None }).await.unwrap());
        assert_eq!(out["title"], "British Wildlife Centre");
        assert_eq!(out["body"], "New wildlife content available!");

        let payload = Some(r#"{"title":"Bird of prey display","tag":"events"}"#.to_string());
        let out = output_json(&push_impl(&f.manager, WorkerPushParams { payload }).await.unwrap());
        assert_eq!(out["title"], "Bird of prey display");
        assert_eq!(out["body"], "New wildlife content available!");
        assert_eq!(out["tag"], "events");
    }

    #[tokio::test]
    async fn test_notification_click() {
        let f = fixture().await;

        let params = WorkerNotificationClickParams { tag: "events".into(), action: Some("view".into()) };
        let out = output_json(&notification_click_impl(&f.manager, params).await.unwrap());
        assert_eq!(out["opened_window"], true);

        let params = WorkerNotificationClickParams { tag: "events".into(), action: Some("close".into()) };
        let out = output_json(&notification_click_impl(&f.manager, params).await.unwrap());
        assert_eq!(out["opened_window"], false);
    }

    #[tokio::test]
    async fn test_sync() {
        let f = fixture().await;
        let out = output_json(&sync_impl(&f.manager, WorkerSyncParams { tag: "sync-favourites".into() }).await.unwrap());
        assert_eq!(out["completed"], true);

        let err = sync_impl(&f.manager, WorkerSyncParams { tag: " ".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
