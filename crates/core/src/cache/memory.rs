//! In-memory partition store.
//!
//! Used by tests and by hosts that do not need the cache to survive a
//! restart. Partition and entry order is insertion order, matching
//! [`CacheDb`](super::CacheDb).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::hash::request_key;
use super::store::{BlobStore, EntryMeta};
use crate::Error;
use crate::request::{Request, Response};

#[derive(Debug, Clone)]
struct StoredEntry {
    key: String,
    method: String,
    url: String,
    response: Response,
    stored_at: String,
}

#[derive(Debug, Default)]
struct Partition {
    name: String,
    entries: Vec<StoredEntry>,
}

impl Partition {
    fn find(&self, key: &str) -> Option<&StoredEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// A [`BlobStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    partitions: Arc<RwLock<Vec<Partition>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let mut partitions = self.partitions.write().await;
        if !partitions.iter().any(|p| p.name == partition) {
            partitions.push(Partition { name: partition.to_string(), entries: Vec::new() });
        }
        Ok(())
    }

    async fn match_in(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|p| p.name == partition)
            .and_then(|p| p.find(&key))
            .map(|e| e.response.clone()))
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find_map(|p| p.find(&key))
            .map(|e| e.response.clone()))
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let entry = StoredEntry {
            key: request_key(request),
            method: request.method.clone(),
            url: request.normalized_url(),
            response: response.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };

        let mut partitions = self.partitions.write().await;
        let idx = match partitions.iter().position(|p| p.name == partition) {
            Some(idx) => idx,
            None => {
                partitions.push(Partition { name: partition.to_string(), entries: Vec::new() });
                partitions.len() - 1
            }
        };

        let target = &mut partitions[idx];
        match target.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => target.entries.push(entry),
        }
        Ok(())
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let mut partitions = self.partitions.write().await;
        let before = partitions.len();
        partitions.retain(|p| p.name != partition);
        Ok(partitions.len() < before)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions.iter().map(|p| p.name.clone()).collect())
    }

    async fn entries(&self, partition: &str) -> Result<Vec<EntryMeta>, Error> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .iter()
            .find(|p| p.name == partition)
            .map(|p| {
                p.entries
                    .iter()
                    .map(|e| EntryMeta {
                        partition: p.name.clone(),
                        method: e.method.clone(),
                        url: e.url.clone(),
                        status: e.response.status,
                        content_type: e.response.content_type().map(str::to_string),
                        size: e.response.body.len(),
                        stored_at: e.stored_at.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
