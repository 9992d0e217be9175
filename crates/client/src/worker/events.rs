//! Side-channel events: control messages, push, notification clicks, sync.
//!
//! None of these touch the fetch path. Control messages are best effort:
//! anything that does not parse is logged and ignored.

use std::sync::Arc;

use hedgerow_core::{BlobStore, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::CacheManager;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "British Wildlife Centre";
pub const DEFAULT_NOTIFICATION_BODY: &str = "New wildlife content available!";
pub const DEFAULT_NOTIFICATION_TAG: &str = "wildlife-notification";
pub const NOTIFICATION_ICON: &str = "/images/icons/icon-192.png";
pub const NOTIFICATION_BADGE: &str = "/images/icons/icon-72.png";

/// Background sync tag reserved for pushing favourites to a server.
pub const SYNC_FAVOURITES_TAG: &str = "sync-favourites";

/// Client-to-worker control message, e.g. `{"action": "clearCache"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    SkipWaiting,
    ClearCache,
}

/// What a control message set in motion.
#[derive(Debug)]
pub enum MessageOutcome {
    SkipWaiting,
    /// The partitions are being deleted on a background task; the handle
    /// resolves to the names that were removed.
    ClearCache(JoinHandle<Result<Vec<String>, Error>>),
    Ignored,
}

/// Optional JSON carried by a push event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag: Option<String>,
}

impl PushPayload {
    /// Parse raw push data; absent or unparseable data yields an empty payload.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::default();
        };
        match serde_json::from_slice(bytes) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "push payload is not valid JSON, using defaults");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification as handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

fn non_empty(value: Option<String>, fallback: &str) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or_else(|| fallback.to_string())
}

impl From<PushPayload> for Notification {
    fn from(payload: PushPayload) -> Self {
        Self {
            title: non_empty(payload.title, DEFAULT_NOTIFICATION_TITLE),
            body: non_empty(payload.body, DEFAULT_NOTIFICATION_BODY),
            icon: NOTIFICATION_ICON.into(),
            badge: NOTIFICATION_BADGE.into(),
            tag: non_empty(payload.tag, DEFAULT_NOTIFICATION_TAG),
            require_interaction: false,
            actions: vec![
                NotificationAction { action: "view".into(), title: "View".into() },
                NotificationAction { action: "close".into(), title: "Close".into() },
            ],
        }
    }
}

/// Delete every partition in the store, whatever its name.
pub async fn clear_all(store: &dyn BlobStore) -> Result<Vec<String>, Error> {
    let mut deleted = Vec::new();
    for name in store.keys().await? {
        if store.delete(&name).await? {
            deleted.push(name);
        }
    }
    tracing::info!(count = deleted.len(), "cleared all cache partitions");
    Ok(deleted)
}

impl CacheManager {
    /// Handle a control message posted by a client page.
    pub async fn on_message(&self, data: &serde_json::Value) -> MessageOutcome {
        let message: ControlMessage = match serde_json::from_value(data.clone()) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, %data, "ignoring unrecognised message");
                return MessageOutcome::Ignored;
            }
        };

        tracing::debug!(?message, "message received");

        match message {
            ControlMessage::SkipWaiting => {
                self.host.skip_waiting().await;
                MessageOutcome::SkipWaiting
            }
            ControlMessage::ClearCache => {
                let store = Arc::clone(&self.store);
                MessageOutcome::ClearCache(tokio::spawn(async move { clear_all(store.as_ref()).await }))
            }
        }
    }

    /// Handle a push event, showing a notification built from its payload.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<Notification, Error> {
        let notification = Notification::from(PushPayload::parse(data));
        tracing::debug!(title = %notification.title, tag = %notification.tag, "push received");
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    /// Handle a click on a notification. Returns true if a window was opened.
    pub async fn on_notification_click(&self, tag: &str, action: Option<&str>) -> Result<bool, Error> {
        tracing::debug!(tag, ?action, "notification clicked");
        self.host.close_notification(tag).await;

        if action == Some("view") {
            self.host.open_window(&self.config.origin).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Handle a background sync event.
    pub async fn on_sync(&self, tag: &str) -> Result<(), Error> {
        if tag == SYNC_FAVOURITES_TAG {
            self.sync_favourites().await
        } else {
            tracing::debug!(tag, "ignoring sync for unknown tag");
            Ok(())
        }
    }

    // TODO: push favourites to the visitor-guide API once it exists; until
    // then there is nothing to send.
    async fn sync_favourites(&self) -> Result<(), Error> {
        tracing::debug!("syncing favourites");
        Ok(())
    }
}
