//! Cache-first and network-first retrieval strategies.
//!
//! Both strategies only write exact-200 responses, and a failed cache write
//! never fails the request. Lookups check the target partition first and
//! then every other partition, so assets cached at install time are still
//! found after a request starts classifying into a different partition.

use hedgerow_core::{Error, Request, Response};

use super::CacheManager;
use super::classify::is_image_request;

/// 400x300 dark-green SVG labelled "Offline", served for images that are
/// neither cached nor reachable.
pub const OFFLINE_IMAGE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300"><rect fill="#2d5016" width="400" height="300"/><text fill="#fff" x="50%" y="50%" text-anchor="middle">Offline</text></svg>"##;

pub fn offline_image() -> Response {
    Response::new(200, OFFLINE_IMAGE_SVG).with_header("Content-Type", "image/svg+xml")
}

impl CacheManager {
    /// Serve from cache if present; otherwise fetch and cache.
    ///
    /// On network failure, navigations get the shell document and image
    /// requests get [`offline_image`]; everything else sees the error.
    pub async fn cache_first(&self, request: &Request, partition: &str) -> Result<Response, Error> {
        if let Some(cached) = self.lookup(request, partition).await {
            tracing::debug!("serving from cache: {}", request.url);
            return Ok(cached);
        }

        tracing::debug!("fetching from network: {}", request.url);
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.remember(partition, request, &response).await;
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(error = %err, "fetch failed: {}", request.url);
                if request.is_navigation() {
                    return self.shell_or(err).await;
                }
                if is_image_request(request) {
                    return Ok(offline_image());
                }
                Err(err)
            }
        }
    }

    /// Always try the network; fall back to cache, then the shell for navigations.
    pub async fn network_first(&self, request: &Request, partition: &str) -> Result<Response, Error> {
        tracing::debug!("fetching from network: {}", request.url);
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.remember(partition, request, &response).await;
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(error = %err, "network failed, trying cache: {}", request.url);
                if let Some(cached) = self.lookup(request, partition).await {
                    return Ok(cached);
                }
                if request.is_navigation() {
                    return self.shell_or(err).await;
                }
                Err(err)
            }
        }
    }

    /// Target partition first, then any partition. Read errors count as a miss.
    async fn lookup(&self, request: &Request, partition: &str) -> Option<Response> {
        match self.store.match_in(partition, request).await {
            Ok(Some(hit)) => return Some(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, partition, "cache read failed"),
        }
        match self.store.match_any(request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed");
                None
            }
        }
    }

    async fn remember(&self, partition: &str, request: &Request, response: &Response) {
        if !response.is_cacheable() {
            return;
        }
        if let Err(e) = self.store.put(partition, request, response).await {
            tracing::warn!(error = %e, partition, "failed to cache {}", request.url);
        }
    }

    /// The cached shell document, or the original failure if there is none.
    async fn shell_or(&self, err: Error) -> Result<Response, Error> {
        let shell = Request::get(self.config.shell_url()?);
        match self.store.match_any(&shell).await {
            Ok(Some(page)) => {
                tracing::debug!("serving offline shell {}", shell.url);
                Ok(page)
            }
            Ok(None) => Err(err),
            Err(e) => {
                tracing::warn!(error = %e, "shell lookup failed");
                Err(err)
            }
        }
    }
}
