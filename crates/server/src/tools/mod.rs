//! MCP tool implementations.
//!
//! Each tool drives one cache manager handler (or reads the store) and
//! returns its outcome as pretty-printed JSON text.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub use cache::{CacheGetParams, CacheListParams};
pub use events::{WorkerMessageParams, WorkerNotificationClickParams, WorkerPushParams, WorkerSyncParams};
pub use fetch::SiteFetchParams;

/// Render a tool output as a single JSON text block.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::OutputFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
