//! Test doubles for the fetch and host capabilities.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hedgerow_core::{BlobStore, EntryMeta, Error, MemoryStore, Request, Response};
use url::Url;

use super::events::Notification;
use super::host::WorkerHost;
use super::{CacheManager, WorkerConfig};
use crate::fetch::Fetcher;

pub const ORIGIN: &str = "http://localhost:8080";

/// Small manifest used by most manager tests.
pub const HARNESS_MANIFEST: &[&str] = &["/", "/index.html", "/css/base.css", "/data/animals.json", "/images/logo.svg"];

fn absolute(path_or_url: &str) -> String {
    if path_or_url.starts_with('/') { format!("{ORIGIN}{path_or_url}") } else { path_or_url.to_string() }
}

/// Serves canned responses by URL; unknown URLs get a 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn serve(&self, path: &str, content_type: &str, body: &str) {
        let response = Response::new(200, body.to_string()).with_header("Content-Type", content_type);
        self.routes.lock().unwrap().insert(absolute(path), response);
    }

    pub fn unserve(&self, path: &str) {
        self.routes.lock().unwrap().remove(&absolute(path));
    }

    /// Make one URL fail at the network level.
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(absolute(path));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.normalized_url();
        self.calls.lock().unwrap().push(url.clone());

        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
            return Err(Error::Network(format!("{url}: connection refused")));
        }

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "not found").with_header("Content-Type", "text/plain")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SkipWaiting,
    ClaimClients,
    Shown(Notification),
    Closed(String),
    Opened(String),
}

#[derive(Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) {
        self.record(HostEvent::SkipWaiting);
    }

    async fn claim_clients(&self) {
        self.record(HostEvent::ClaimClients);
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.record(HostEvent::Shown(notification.clone()));
        Ok(())
    }

    async fn close_notification(&self, tag: &str) {
        self.record(HostEvent::Closed(tag.to_string()));
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostEvent::Opened(url.to_string()));
        Ok(())
    }
}

/// A memory store whose `open` and `keys` calls take `delay` to answer.
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

#[async_trait]
impl BlobStore for SlowStore {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.open(partition).await
    }

    async fn match_in(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_in(partition, request).await
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_any(request).await
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.inner.put(partition, request, response).await
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        self.inner.delete(partition).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.keys().await
    }

    async fn entries(&self, partition: &str) -> Result<Vec<EntryMeta>, Error> {
        self.inner.entries(partition).await
    }
}

pub struct Harness {
    pub manager: CacheManager,
    pub store: MemoryStore,
    pub fetcher: Arc<ScriptedFetcher>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    /// A GET request for a path on the harness origin.
    pub fn get(&self, path: &str) -> Request {
        Request::parse_get(&absolute(path)).unwrap()
    }
}

/// Manager on a fresh store, with every manifest path served.
pub fn harness() -> Harness {
    harness_with(MemoryStore::new(), "wildlife-v1.0.0")
}

pub fn harness_with(store: MemoryStore, version: &str) -> Harness {
    build(store.clone(), Arc::new(store), version)
}

/// Like [`harness`], but the manager's store is slow to open partitions and
/// list them. `Harness::store` reads the same partitions without delay.
pub fn slow_harness(delay: Duration) -> Harness {
    let store = MemoryStore::new();
    build(store.clone(), Arc::new(SlowStore { inner: store, delay }), "wildlife-v1.0.0")
}

fn build(store: MemoryStore, backing: Arc<dyn BlobStore>, version: &str) -> Harness {
    let mut config = WorkerConfig::new(Url::parse(ORIGIN).unwrap(), version);
    config.static_assets = HARNESS_MANIFEST.iter().map(|s| s.to_string()).collect();

    let fetcher = Arc::new(ScriptedFetcher::default());
    for path in HARNESS_MANIFEST {
        let content_type = if path.ends_with(".css") {
            "text/css"
        } else if path.ends_with(".json") {
            "application/json"
        } else if path.ends_with(".svg") {
            "image/svg+xml"
        } else {
            "text/html"
        };
        fetcher.serve(path, content_type, path);
    }

    let host = Arc::new(RecordingHost::default());
    let manager = CacheManager::new(config, backing, fetcher.clone(), host.clone());

    Harness { manager, store, fetcher, host }
}
