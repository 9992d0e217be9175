//! cache_list tool implementation.
//!
//! Lists partitions, or the entries of one partition.

use hedgerow_core::{BlobStore, EntryMeta};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Partition to list entries for. Omit to list every partition.
    #[serde(default)]
    pub partition: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PartitionSummary {
    pub name: String,
    pub entries: usize,
    pub bytes: usize,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheListOutput {
    Partitions { partitions: Vec<PartitionSummary> },
    Entries { partition: String, entries: Vec<EntryMeta> },
}

/// Implementation of the cache_list tool.
pub async fn list_impl(store: &dyn BlobStore, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let output = match params.partition {
        Some(partition) => {
            let entries = store.entries(&partition).await?;
            CacheListOutput::Entries { partition, entries }
        }
        None => {
            let mut partitions = Vec::new();
            for name in store.keys().await? {
                let entries = store.entries(&name).await?;
                let bytes = entries.iter().map(|e| e.size).sum();
                partitions.push(PartitionSummary { name, entries: entries.len(), bytes });
            }
            CacheListOutput::Partitions { partitions }
        }
    };

    json_result(&output)
}
