//! The blob store capability the cache manager writes through.
//!
//! A store holds any number of named partitions. Each partition maps a
//! request key (see [`super::hash::request_key`]) to a response snapshot.
//! Partitions are created on first `open` or `put` and only ever removed
//! whole.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::request::{Request, Response};

/// Summary of a stored entry, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryMeta {
    pub partition: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub size: usize,
    pub stored_at: String,
}

/// Named-partition key/value storage for request/response pairs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Create the partition if it does not exist.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    /// Look the request up in one partition.
    async fn match_in(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Look the request up across all partitions, oldest partition first.
    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Store a response, replacing any previous entry for the same key.
    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Delete a partition and everything in it. Returns false if it did not exist.
    async fn delete(&self, partition: &str) -> Result<bool, Error>;

    /// Partition names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Entries in a partition, in insertion order.
    async fn entries(&self, partition: &str) -> Result<Vec<EntryMeta>, Error>;
}
