//! Effects the cache manager asks its host to perform.

use async_trait::async_trait;
use hedgerow_core::Error;
use url::Url;

use super::events::Notification;

/// The environment a [`CacheManager`](super::CacheManager) runs inside.
///
/// Skip-waiting and client claiming are fire-and-forget: the host decides
/// when and how the handoff actually happens.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate this worker without waiting for old clients to go away.
    async fn skip_waiting(&self);

    /// Take control of every open client page.
    async fn claim_clients(&self);

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, tag: &str);

    /// Open (or focus) a window on `url`.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}
