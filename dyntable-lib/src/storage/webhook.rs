//! Best-effort webhook notification for storage mutations.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::http::HttpRequest;
use crate::http::HttpTransport;
use crate::http::Method;

#[derive(Serialize)]
struct WebhookBody<'a> {
    operation: &'a str,
    key: &'a str,
    data: Option<&'a serde_json::Value>,
    timestamp: String,
}

/// Posts `{operation, key, data, timestamp}` to a configured URL after
/// each storage mutation. Failures are logged and swallowed; the storage
/// operation itself has already succeeded and is never rolled back or
/// retried on notification failure.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    transport: Arc<dyn HttpTransport>,
}

impl WebhookNotifier {
    /// Creates a notifier for the given URL.
    pub fn new(url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            url: url.into(),
            transport,
        }
    }

    /// The configured webhook URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one notification, best-effort.
    pub async fn notify(&self, operation: &str, key: &str, data: Option<&serde_json::Value>) {
        let body = WebhookBody {
            operation,
            key,
            data,
            timestamp: Utc::now().to_rfc3339(),
        };
        let payload = match serde_json::to_string(&body) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("webhook payload serialization failed: {e}");
                return;
            }
        };

        let request = HttpRequest::new(Method::Post, &self.url).json_body(payload);
        match self.transport.send(request).await {
            Ok(response) if !response.is_success() => {
                log::warn!(
                    "webhook {} returned HTTP {} for {operation} {key}",
                    self.url,
                    response.status
                );
            }
            Ok(_) => {
                log::debug!("webhook {} notified: {operation} {key}", self.url);
            }
            Err(e) => {
                log::warn!("webhook {} failed for {operation} {key}: {e}", self.url);
            }
        }
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url)
            .finish()
    }
}
