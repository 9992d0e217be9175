//! Fixtures shared by the tool tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hedgerow_client::{CacheManager, Fetcher, WorkerConfig};
use hedgerow_core::{BlobStore, CacheDb, Error, Request, Response};
use rmcp::model::CallToolResult;
use url::Url;

use crate::host::LoggingHost;

pub const ORIGIN: &str = "http://localhost:8080";
pub const MANIFEST: [&str; 4] = ["/", "/index.html", "/css/base.css", "/images/logo.svg"];

/// Serves a fixed set of same-origin pages; everything else is a 404.
#[derive(Default)]
pub struct PageFetcher {
    pages: Mutex<HashMap<String, &'static str>>,
    offline: AtomicBool,
}

impl PageFetcher {
    pub fn serve(&self, path: &str, body: &'static str) {
        self.pages.lock().unwrap().insert(path.to_string(), body);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }
        match self.pages.lock().unwrap().get(request.url.path()) {
            Some(body) => Ok(Response::new(200, *body).with_header("content-type", "text/html")),
            None => Ok(Response::new(404, "not found")),
        }
    }
}

pub struct Fixture {
    pub manager: Arc<CacheManager>,
    pub store: Arc<CacheDb>,
    pub fetcher: Arc<PageFetcher>,
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let fetcher = Arc::new(PageFetcher::default());
    for path in MANIFEST {
        fetcher.serve(path, "<!doctype html><title>British Wildlife Centre</title>");
    }

    let mut config = WorkerConfig::new(Url::parse(ORIGIN).unwrap(), "wildlife-v1.0.0");
    config.static_assets = MANIFEST.iter().map(|s| s.to_string()).collect();

    let manager = CacheManager::new(
        config,
        Arc::clone(&store) as Arc<dyn BlobStore>,
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        Arc::new(LoggingHost::default()),
    );
    Fixture { manager: Arc::new(manager), store, fetcher }
}

pub async fn active_fixture() -> Fixture {
    let f = fixture().await;
    f.manager.on_install().await.unwrap();
    f.manager.on_activate().await.unwrap();
    f
}

/// The JSON text block of a successful tool result.
pub fn output_json(result: &CallToolResult) -> serde_json::Value {
    let text = result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .unwrap();
    serde_json::from_str(&text).unwrap()
}
