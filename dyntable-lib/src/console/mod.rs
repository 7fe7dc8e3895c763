//! Console log and task history
//!
//! Observability sinks: the console log subscribes to every event the bus
//! publishes, and the task history records worker executions. Both are
//! append-only and never authoritative.

mod task;

use std::sync::Arc;
use std::sync::RwLock;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::event::EventBus;
use crate::event::EventKind;
use crate::event::SubscriptionId;

pub use task::*;

/// One recorded event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// When the event was observed.
    pub timestamp: DateTime<Utc>,
    /// The event kind.
    pub event: EventKind,
    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

/// Append-only structured log of everything the bus publishes.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl ConsoleLog {
    /// Creates an empty log behind an `Arc` so it can be shared with the
    /// bus subscription.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribe this log to every event kind on the bus.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) -> Vec<SubscriptionId> {
        let log = Arc::clone(self);
        bus.subscribe_all(move |event| {
            log.record(LogEntry {
                timestamp: Utc::now(),
                event: event.kind(),
                payload: event.to_json(),
            });
        })
    }

    fn record(&self, entry: LogEntry) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(entry);
    }

    /// A snapshot of all recorded entries, in order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
