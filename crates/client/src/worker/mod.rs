//! Offline cache manager.
//!
//! ### Lifecycle
//! `Installing → Installed → Activating → Active`. Install fetches every
//! manifest path into the static partition, all or nothing. Activate deletes
//! partitions from older cache versions and claims open clients. Until the
//! manager is active, fetches pass straight through to the network.
//!
//! ### Routing
//! - non-GET: not intercepted
//! - other origin: network only, no caching
//! - image: cache-first on the image partition
//! - static: cache-first on the static partition
//! - anything else: network-first on the dynamic partition
//!
//! ### Side channels
//! Control messages, push, notification clicks, and background sync are in
//! [`events`].

pub mod classify;
pub mod events;
pub mod host;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use hedgerow_core::config::DEFAULT_STATIC_ASSETS;
use hedgerow_core::{AppConfig, BlobStore, CacheNames, Error, Request, Response};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::fetch::{Fetcher, resolve, same_origin};

pub use classify::{RequestClass, classify, is_image_request, is_static_asset};
pub use events::{ControlMessage, MessageOutcome, Notification, NotificationAction, PushPayload};
pub use host::WorkerHost;
pub use strategy::{OFFLINE_IMAGE_SVG, offline_image};

/// Everything a manager instance needs to know about its cache version.
///
/// Two managers with different versions can share one store; activating
/// the newer one garbage-collects the older one's partitions.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Requests to any other origin bypass the cache.
    pub origin: Url,
    pub version: String,
    /// Partitions whose names start with this belong to the application.
    pub prefix: String,
    /// Root document served to offline navigations.
    pub shell_path: String,
    /// Root-relative paths cached at install time, in order.
    pub static_assets: Vec<String>,
}

impl WorkerConfig {
    /// Default prefix, shell, and manifest for the given origin and version.
    pub fn new(origin: Url, version: impl Into<String>) -> Self {
        Self {
            origin,
            version: version.into(),
            prefix: "wildlife-".into(),
            shell_path: "/index.html".into(),
            static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        Ok(Self {
            origin,
            version: config.cache_version.clone(),
            prefix: config.cache_prefix.clone(),
            shell_path: config.shell_path.clone(),
            static_assets: config.static_assets.clone(),
        })
    }

    pub fn cache_names(&self) -> CacheNames {
        CacheNames::for_version(&self.version)
    }

    /// A root-relative path or absolute URL as an absolute URL on this origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        resolve(&self.origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
    }

    pub fn shell_url(&self) -> Result<Url, Error> {
        self.resolve(&self.shell_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Installing,
    /// Installed and waiting to be activated.
    Installed,
    Activating,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
        };
        f.write_str(s)
    }
}

/// How a request will be handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// Not intercepted: non-GET, or the manager is not active yet.
    Network,
    /// Another origin; forwarded without caching.
    CrossOrigin,
    CacheFirst { class: RequestClass, partition: String },
    NetworkFirst { partition: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct InstallReport {
    pub partition: String,
    pub cached: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
}

/// The offline cache manager.
///
/// Handlers take `&self` and may run concurrently; each request is handled
/// as a straight sequence of awaited store and network calls.
pub struct CacheManager {
    config: WorkerConfig,
    names: CacheNames,
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn WorkerHost>,
    state: RwLock<LifecycleState>,
    install_lock: Mutex<()>,
}

impl CacheManager {
    pub fn new(
        config: WorkerConfig, store: Arc<dyn BlobStore>, fetcher: Arc<dyn Fetcher>, host: Arc<dyn WorkerHost>,
    ) -> Self {
        let names = config.cache_names();
        Self {
            config,
            names,
            store,
            fetcher,
            host,
            state: RwLock::new(LifecycleState::Installing),
            install_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    async fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.write().await;
        self.transition(&mut state, next);
    }

    fn transition(&self, state: &mut LifecycleState, next: LifecycleState) {
        let from = *state;
        if from != next {
            tracing::info!(version = %self.config.version, %from, to = %next, "lifecycle transition");
            *state = next;
        }
    }

    /// Fetch the manifest into the static partition.
    ///
    /// Nothing is written unless every asset fetched with a 2xx status. On
    /// success the host is asked to skip the waiting phase; on failure the
    /// manager returns to the state it was in. Only one install runs at a time.
    pub async fn on_install(&self) -> Result<InstallReport, Error> {
        let Ok(_running) = self.install_lock.try_lock() else {
            return Err(Error::InvalidState("install already running".to_string()));
        };
        let previous = {
            let mut state = self.state.write().await;
            let previous = *state;
            if matches!(previous, LifecycleState::Activating | LifecycleState::Active) {
                return Err(Error::InvalidState(format!("cannot install while {previous}")));
            }
            self.transition(&mut state, LifecycleState::Installing);
            previous
        };

        tracing::info!(version = %self.config.version, assets = self.config.static_assets.len(), "installing");

        match self.cache_manifest().await {
            Ok(report) => {
                self.set_state(LifecycleState::Installed).await;
                self.host.skip_waiting().await;
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, version = %self.config.version, "install failed");
                self.set_state(previous).await;
                Err(e)
            }
        }
    }

    async fn cache_manifest(&self) -> Result<InstallReport, Error> {
        let partition = self.names.static_assets.clone();
        self.store.open(&partition).await?;

        let mut fetched: Vec<(Request, Response)> = Vec::with_capacity(self.config.static_assets.len());
        for path in &self.config.static_assets {
            let url = self
                .config
                .resolve(path)
                .map_err(|e| Error::InstallFailed { url: path.clone(), reason: e.to_string() })?;
            let request = Request::get(url);

            let response = self
                .fetcher
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed { url: request.url.to_string(), reason: e.to_string() })?;

            if !response.is_success() {
                return Err(Error::InstallFailed {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((request, response));
        }

        let mut cached = Vec::with_capacity(fetched.len());
        for (request, response) in &fetched {
            self.store.put(&partition, request, response).await?;
            cached.push(request.url.to_string());
        }

        Ok(InstallReport { partition, cached })
    }

    /// Drop partitions from other versions and take control of open clients.
    ///
    /// Safe to run again once active; the surviving partition set is the
    /// same, and the manager keeps serving from cache while it runs.
    pub async fn on_activate(&self) -> Result<ActivateReport, Error> {
        let previous = {
            let mut state = self.state.write().await;
            let previous = *state;
            match previous {
                LifecycleState::Installed => self.transition(&mut state, LifecycleState::Activating),
                LifecycleState::Active => {}
                _ => return Err(Error::InvalidState(format!("cannot activate while {previous}"))),
            }
            previous
        };

        match self.delete_stale_partitions().await {
            Ok(deleted) => {
                self.host.claim_clients().await;
                self.set_state(LifecycleState::Active).await;
                Ok(ActivateReport { deleted })
            }
            Err(e) => {
                tracing::warn!(error = %e, "activate failed");
                self.set_state(previous).await;
                Err(e)
            }
        }
    }

    async fn delete_stale_partitions(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.store.keys().await? {
            if name.starts_with(&self.config.prefix) && !self.names.contains(&name) {
                tracing::info!(partition = %name, "deleting old cache");
                self.store.delete(&name).await?;
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Decide how a request would be handled by an active manager.
    pub fn route(&self, request: &Request) -> Route {
        if !request.is_get() {
            return Route::Network;
        }
        if !same_origin(&request.url, &self.config.origin) {
            return Route::CrossOrigin;
        }
        match classify(request, &self.config.static_assets) {
            RequestClass::Image => {
                Route::CacheFirst { class: RequestClass::Image, partition: self.names.images.clone() }
            }
            RequestClass::Static => {
                Route::CacheFirst { class: RequestClass::Static, partition: self.names.static_assets.clone() }
            }
            RequestClass::Dynamic => Route::NetworkFirst { partition: self.names.dynamic.clone() },
        }
    }

    /// Handle an intercepted request.
    pub async fn on_fetch(&self, request: &Request) -> Result<Response, Error> {
        if self.state().await != LifecycleState::Active {
            tracing::debug!("not active, passing through: {}", request.url);
            return self.fetcher.fetch(request).await;
        }

        match self.route(request) {
            Route::Network | Route::CrossOrigin => self.fetcher.fetch(request).await,
            Route::CacheFirst { partition, .. } => self.cache_first(request, &partition).await,
            Route::NetworkFirst { partition } => self.network_first(request, &partition).await,
        }
    }
}
