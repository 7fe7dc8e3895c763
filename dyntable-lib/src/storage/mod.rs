//! Key-value storage with webhook notification
//!
//! Collections of rows live under string keys in a [`StorageProvider`].
//! The [`Storage`] façade pairs a provider with an optional webhook
//! notifier: every mutation triggers a best-effort `POST` that is logged
//! and swallowed on failure, never retried.

mod curl;
mod memory;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;

pub use curl::CurlPreview;
pub use memory::MemoryStorage;
pub use webhook::WebhookNotifier;

/// The key-value storage capability.
///
/// Providers are process-wide and not scoped to a single table; callers
/// sharing a key across instances must coordinate themselves.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the value under `key`.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Write the value under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: serde_json::Value);

    /// Delete the value under `key`.
    async fn remove(&self, key: &str);

    /// Delete everything.
    async fn clear(&self);

    /// Returns `true` if a value exists under `key`.
    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

/// Storage façade: a provider plus optional webhook notification.
#[derive(Clone)]
pub struct Storage {
    provider: Arc<dyn StorageProvider>,
    webhook: Option<WebhookNotifier>,
}

impl Storage {
    /// Creates a façade over the given provider, without notification.
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            provider,
            webhook: None,
        }
    }

    /// Attaches a webhook notifier.
    pub fn with_webhook(mut self, webhook: WebhookNotifier) -> Self {
        self.webhook = Some(webhook);
        self
    }

    /// Store rows under `key`, wrapping a non-array value in an array.
    /// Notifies `insert`.
    pub async fn set(&self, key: &str, value: serde_json::Value) {
        let data = ensure_array(value);
        self.provider.set(key, data.clone()).await;
        self.notify("insert", key, Some(&data)).await;
    }

    /// Replace rows under `key`. Notifies `update`.
    pub async fn update(&self, key: &str, value: serde_json::Value) {
        let data = ensure_array(value);
        self.provider.set(key, data.clone()).await;
        self.notify("update", key, Some(&data)).await;
    }

    /// Read the value under `key`.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.provider.get(key).await
    }

    /// Delete the value under `key`. Notifies `delete`.
    pub async fn remove(&self, key: &str) {
        self.provider.remove(key).await;
        self.notify("delete", key, None).await;
    }

    /// Delete everything. Notifies `clear`.
    pub async fn clear(&self) {
        self.provider.clear().await;
        self.notify("clear", "collection", None).await;
    }

    /// Returns `true` if a value exists under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        self.provider.exists(key).await
    }

    async fn notify(&self, operation: &str, key: &str, data: Option<&serde_json::Value>) {
        if let Some(webhook) = &self.webhook {
            webhook.notify(operation, key, data).await;
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("webhook", &self.webhook.is_some())
            .finish()
    }
}

fn ensure_array(value: serde_json::Value) -> serde_json::Value {
    match value {
        array @ serde_json::Value::Array(_) => array,
        other => serde_json::Value::Array(vec![other]),
    }
}
