//! worker_install and worker_activate tool implementations.

use hedgerow_client::{ActivateReport, CacheManager, InstallReport, LifecycleState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use super::json_result;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerInstallOutput {
    pub version: String,
    pub state: LifecycleState,
    #[serde(flatten)]
    pub report: InstallReport,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerActivateOutput {
    pub version: String,
    pub state: LifecycleState,
    #[serde(flatten)]
    pub report: ActivateReport,
}

/// Re-run install: fetch the whole manifest into the static partition.
pub async fn install_impl(manager: &CacheManager) -> Result<CallToolResult, McpError> {
    let report = manager.on_install().await?;
    let output = WorkerInstallOutput {
        version: manager.config().version.clone(),
        state: manager.state().await,
        report,
    };
    json_result(&output)
}

/// Activate: delete stale versions' partitions and start intercepting.
pub async fn activate_impl(manager: &CacheManager) -> Result<CallToolResult, McpError> {
    let report = manager.on_activate().await?;
    let output = WorkerActivateOutput {
        version: manager.config().version.clone(),
        state: manager.state().await,
        report,
    };
    json_result(&output)
}
