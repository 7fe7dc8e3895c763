//! Worker lifecycle and event-bus wiring.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use indexmap::IndexMap;
use url::Url;
use uuid::Uuid;

use crate::error::WorkerError;
use crate::event::EventBus;
use crate::event::EventKind;
use crate::event::SubscriptionId;
use crate::event::TableEvent;
use crate::event::TableId;

use super::EventContext;
use super::Worker;
use super::WorkerExecutor;
use super::WorkerKind;

#[derive(Default)]
struct RegistryInner {
    workers: IndexMap<Uuid, Worker>,
    subscriptions: HashMap<Uuid, Vec<SubscriptionId>>,
}

/// Holds a table's workers and keeps enabled ones subscribed.
///
/// State machine per worker: `Disabled -> Enabled(subscribed) ->
/// Disabled(unsubscribed)`, driven by [`save`](Self::save),
/// [`set_enabled`](Self::set_enabled) and [`delete`](Self::delete).
/// Saving re-subscribes an enabled worker, so trigger edits take effect
/// immediately; a disabled worker receives nothing until re-enabled, and
/// re-enabling applies to subsequent publishes only.
pub struct WorkerRegistry {
    bus: Arc<EventBus>,
    executor: Arc<WorkerExecutor>,
    table: TableId,
    table_key: String,
    collection: Arc<RwLock<String>>,
    inner: RwLock<RegistryInner>,
}

impl WorkerRegistry {
    /// Creates a registry wired to a table's bus.
    ///
    /// The registry tracks the table's collection name (updated from
    /// `collectionNameChange` events) so worker templates always see the
    /// current value.
    pub fn new(
        bus: Arc<EventBus>,
        executor: Arc<WorkerExecutor>,
        table: TableId,
        table_key: impl Into<String>,
        collection: Option<String>,
    ) -> Self {
        let collection = Arc::new(RwLock::new(collection.unwrap_or_default()));

        let tracked = Arc::clone(&collection);
        bus.subscribe(EventKind::CollectionNameChange, move |event| {
            if let TableEvent::CollectionNameChange { name, .. } = event {
                *tracked.write().unwrap_or_else(|e| e.into_inner()) = name.clone();
            }
        });

        Self {
            bus,
            executor,
            table,
            table_key: table_key.into(),
            collection,
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Create or update a worker. Endpoint URLs are validated before
    /// anything is stored; an enabled worker is (re-)subscribed for each
    /// of its triggers. Emits `workerSaved`.
    pub fn save(&self, worker: Worker) -> Result<(), WorkerError> {
        validate_endpoints(&worker)?;

        let id = worker.id;
        let name = worker.name.clone();
        {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            if let Some(old) = inner.subscriptions.remove(&id) {
                for sub in old {
                    self.bus.unsubscribe(sub);
                }
            }
            let subs = if worker.enabled {
                self.subscribe_worker(&worker)
            } else {
                Vec::new()
            };
            inner.subscriptions.insert(id, subs);
            inner.workers.insert(id, worker);
        }

        self.bus.publish(&TableEvent::WorkerSaved {
            table: self.table,
            worker: id,
            name,
        });
        Ok(())
    }

    /// Enable or disable a worker. Returns `false` for unknown ids.
    /// Emits `workerToggled` when the flag changes.
    pub fn set_enabled(&self, id: Uuid, enabled: bool) -> bool {
        let changed = {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            let Some(worker) = inner.workers.get_mut(&id) else {
                return false;
            };
            if worker.enabled == enabled {
                false
            } else {
                worker.enabled = enabled;
                let worker = worker.clone();
                if enabled {
                    let subs = self.subscribe_worker(&worker);
                    inner.subscriptions.insert(id, subs);
                } else if let Some(old) = inner.subscriptions.remove(&id) {
                    for sub in old {
                        self.bus.unsubscribe(sub);
                    }
                }
                true
            }
        };

        if changed {
            self.bus.publish(&TableEvent::WorkerToggled {
                table: self.table,
                worker: id,
                enabled,
            });
        }
        true
    }

    /// Delete a worker, unsubscribing it. Returns `false` for unknown
    /// ids. Emits `workerDeleted`.
    pub fn delete(&self, id: Uuid) -> bool {
        let existed = {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            if let Some(old) = inner.subscriptions.remove(&id) {
                for sub in old {
                    self.bus.unsubscribe(sub);
                }
            }
            inner.workers.shift_remove(&id).is_some()
        };

        if existed {
            self.bus.publish(&TableEvent::WorkerDeleted {
                table: self.table,
                worker: id,
            });
        }
        existed
    }

    /// A worker by id.
    pub fn get(&self, id: Uuid) -> Option<Worker> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .workers
            .get(&id)
            .cloned()
    }

    /// All workers, in save order.
    pub fn workers(&self) -> Vec<Worker> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .workers
            .values()
            .cloned()
            .collect()
    }

    /// Subscribe a worker for each of its triggers. Each firing captures
    /// an owned event snapshot and executes in its own task, so a slow or
    /// failing worker never blocks the publisher or its peers.
    fn subscribe_worker(&self, worker: &Worker) -> Vec<SubscriptionId> {
        worker
            .triggers
            .iter()
            .map(|kind| {
                let executor = Arc::clone(&self.executor);
                let worker = worker.clone();
                let table_key = self.table_key.clone();
                let collection = Arc::clone(&self.collection);
                self.bus.subscribe(*kind, move |event| {
                    let default_collection = collection
                        .read()
                        .unwrap_or_else(|e| e.into_inner())
                        .clone();
                    let cx = EventContext::capture(event, &table_key, &default_collection);
                    let executor = Arc::clone(&executor);
                    let worker = worker.clone();
                    match tokio::runtime::Handle::try_current() {
                        Ok(handle) => {
                            handle.spawn(async move {
                                // Errors are recorded on the task history
                                // inside execute; nothing to surface here.
                                let _ = executor.execute(&worker, &cx).await;
                            });
                        }
                        Err(_) => {
                            log::warn!(
                                "worker '{}' skipped: no async runtime available",
                                worker.name
                            );
                        }
                    }
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("WorkerRegistry")
            .field("table", &self.table)
            .field("workers", &inner.workers.len())
            .finish()
    }
}

fn validate_endpoints(worker: &Worker) -> Result<(), WorkerError> {
    if let WorkerKind::Api {
        handler,
        controller,
    } = &worker.kind
    {
        for url in handler
            .iter()
            .map(|h| h.url.as_str())
            .chain(controller.iter().map(|c| c.url.as_str()))
        {
            Url::parse(url).map_err(|e| WorkerError::InvalidUrl(format!("{url}: {e}")))?;
        }
    }
    Ok(())
}
