//! Worker host for the stdio server.
//!
//! There are no browser tabs behind this process, so host effects are logged
//! and notifications are kept in memory until closed.

use async_trait::async_trait;
use hedgerow_client::{Notification, WorkerHost};
use hedgerow_core::Error;
use tokio::sync::Mutex;
use url::Url;

#[derive(Default)]
pub struct LoggingHost {
    open: Mutex<Vec<Notification>>,
}

#[async_trait]
impl WorkerHost for LoggingHost {
    async fn skip_waiting(&self) {
        tracing::info!("skip waiting requested");
    }

    async fn claim_clients(&self) {
        tracing::info!("claiming clients");
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, body = %notification.body, tag = %notification.tag, "notification");
        let mut open = self.open.lock().await;
        open.retain(|n| n.tag != notification.tag);
        open.push(notification.clone());
        tracing::debug!(open = open.len(), "notifications on screen");
        Ok(())
    }

    async fn close_notification(&self, tag: &str) {
        self.open.lock().await.retain(|n| n.tag != tag);
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(%url, "open window requested");
        Ok(())
    }
}
