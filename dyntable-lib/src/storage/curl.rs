//! Ready-to-paste curl previews of webhook payloads.

use chrono::Utc;
use serde_json::json;

/// Renders the webhook body each storage operation would send as a `curl`
/// command, for pasting into a terminal or documentation.
#[derive(Debug, Clone)]
pub struct CurlPreview {
    url: String,
}

impl CurlPreview {
    /// Creates a preview builder for the given webhook URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The `insert` operation for `key` with the given rows.
    pub fn insert(&self, key: &str, data: &serde_json::Value) -> String {
        self.build("insert", key, Some(data))
    }

    /// The `update` operation for `key` with the given rows.
    pub fn update(&self, key: &str, data: &serde_json::Value) -> String {
        self.build("update", key, Some(data))
    }

    /// The `delete` operation for `key`.
    pub fn delete(&self, key: &str) -> String {
        self.build("delete", key, None)
    }

    /// The `clear` operation.
    pub fn clear(&self) -> String {
        self.build("clear", "collection", None)
    }

    fn build(&self, operation: &str, key: &str, data: Option<&serde_json::Value>) -> String {
        let payload = json!({
            "operation": operation,
            "key": key,
            "data": data,
            "timestamp": Utc::now().to_rfc3339(),
        });
        let body = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        format!(
            "curl -X POST {} \\\n  -H \"Content-Type: application/json\" \\\n  -d '{}'",
            self.url, body
        )
    }
}
