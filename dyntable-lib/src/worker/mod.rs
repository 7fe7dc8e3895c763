//! Event-triggered workers
//!
//! A worker is a configured action bound to a set of table events: either
//! an API call pair (a CRUD-performing handler request, optionally followed
//! by a verifying controller request with retry and validation) or a
//! key-value storage write. Enabled workers are subscribed on the table's
//! event bus; each firing executes fire-and-forget in its own task.

mod executor;
mod registry;
mod template;
mod validation;

use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

pub use executor::{ExecutionReport, WorkerExecutor};
pub use registry::WorkerRegistry;
pub use template::substitute;
pub use validation::{validate, ValidationOutcome};

use crate::event::EventKind;
use crate::event::TableEvent;
use crate::http::Method;

/// How a handler request authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", content = "value", rename_all = "snake_case")]
pub enum AuthMethod {
    /// No authentication header.
    #[default]
    None,
    /// `Authorization: Bearer <value>`.
    Bearer(String),
    /// `Authorization: Basic <value>`.
    Basic(String),
    /// `X-API-Key: <value>`.
    ApiKey(String),
}

impl AuthMethod {
    /// The header this method contributes, if any.
    pub fn header(&self) -> Option<(&'static str, String)> {
        match self {
            AuthMethod::None => None,
            AuthMethod::Bearer(token) => Some(("Authorization", format!("Bearer {token}"))),
            AuthMethod::Basic(credentials) => {
                Some(("Authorization", format!("Basic {credentials}")))
            }
            AuthMethod::ApiKey(key) => Some(("X-API-Key", key.clone())),
        }
    }
}

/// The CRUD-performing request a worker issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// HTTP method.
    #[serde(default)]
    pub method: Method,
    /// Endpoint URL.
    pub url: String,
    /// Authentication.
    #[serde(default)]
    pub auth: AuthMethod,
    /// JSON body template with `{{placeholder}}` substitution.
    #[serde(default)]
    pub body_template: Option<String>,
}

impl HandlerConfig {
    /// Creates a handler for the given endpoint.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            auth: AuthMethod::None,
            body_template: None,
        }
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the body template.
    pub fn body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }
}

/// The verification request a worker issues after its handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// HTTP method; `GET` sends the templated query string, `POST` the
    /// templated body.
    #[serde(default)]
    pub method: Method,
    /// Endpoint URL.
    pub url: String,
    /// Query template appended to the URL for `GET`.
    #[serde(default)]
    pub query_template: Option<String>,
    /// Body template for `POST`.
    #[serde(default)]
    pub body_template: Option<String>,
    /// Total attempts (including the first).
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay before the first attempt, letting the server settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Whether the controller phase runs at all.
    #[serde(default)]
    pub validation_enabled: bool,
}

fn default_retry_count() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_settle_delay_ms() -> u64 {
    500
}

impl ControllerConfig {
    /// Creates an enabled controller for the given endpoint with default
    /// retry settings.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query_template: None,
            body_template: None,
            retry_count: default_retry_count(),
            timeout_secs: default_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            validation_enabled: true,
        }
    }

    /// Sets the query template.
    pub fn query_template(mut self, template: impl Into<String>) -> Self {
        self.query_template = Some(template.into());
        self
    }

    /// Sets the body template.
    pub fn body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    /// Sets the attempt budget.
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Sets the per-attempt timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the settle delay in milliseconds.
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Enables or disables the controller phase.
    pub fn validation_enabled(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }
}

/// What a worker does when triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerKind {
    /// Issue the handler request, then optionally verify via the
    /// controller.
    Api {
        #[serde(default)]
        handler: Option<HandlerConfig>,
        #[serde(default)]
        controller: Option<ControllerConfig>,
    },
    /// Write the event payload to key-value storage.
    Storage {
        /// Collection key to write; empty falls back to the event's
        /// collection.
        #[serde(default)]
        storage_key: String,
        /// Stored format; only `json` is currently produced.
        #[serde(default = "default_format")]
        format: String,
    },
}

fn default_format() -> String {
    "json".to_string()
}

/// A configured event-triggered action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Stable worker id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// What the worker does.
    pub kind: WorkerKind,
    /// Event kinds that trigger the worker.
    pub triggers: HashSet<EventKind>,
    /// Whether the worker is subscribed while saved.
    pub enabled: bool,
}

impl Worker {
    /// Creates an enabled worker with a fresh id and no triggers.
    pub fn new(name: impl Into<String>, kind: WorkerKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            triggers: HashSet::new(),
            enabled: true,
        }
    }

    /// Adds a trigger.
    pub fn trigger(mut self, kind: EventKind) -> Self {
        self.triggers.insert(kind);
        self
    }

    /// Sets the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Owned snapshot of an event, captured at publish time for template
/// substitution and async execution.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// The published event name.
    pub event_type: String,
    /// The event payload as JSON.
    pub event_data: serde_json::Value,
    /// The owning table's mount key.
    pub table_id: String,
    /// The effective collection name.
    pub collection_name: String,
    /// When the event was captured.
    pub timestamp: DateTime<Utc>,
}

impl EventContext {
    /// Capture an event, preferring the payload's collection over the
    /// table default.
    pub fn capture(event: &TableEvent, table_id: &str, default_collection: &str) -> Self {
        let collection_name = event
            .collection()
            .unwrap_or(default_collection)
            .to_string();
        Self {
            event_type: event.kind().as_str().to_string(),
            event_data: event.to_json(),
            table_id: table_id.to_string(),
            collection_name,
            timestamp: Utc::now(),
        }
    }
}
