//! Task history.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::Weak;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::event::EventBus;
use crate::event::TableEvent;
use crate::event::TableId;

/// Lifecycle of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// One observability record. Informational only.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Task id.
    pub id: Uuid,
    /// Free-form category, e.g. `worker`.
    pub task_type: String,
    /// Short description.
    pub description: String,
    /// Outcome details, updated on completion.
    pub details: String,
    /// Current status.
    pub status: TaskStatus,
    /// When the task was created.
    pub timestamp: DateTime<Utc>,
}

/// Append-only task history with status transitions.
///
/// Holds the bus weakly: the bus owns worker closures which own the
/// executor which owns this log, and a strong reference back would pin
/// the whole cycle in memory.
pub struct TaskLog {
    table: TableId,
    bus: Weak<EventBus>,
    tasks: RwLock<Vec<Task>>,
}

impl TaskLog {
    /// Creates a task history publishing onto the given bus.
    pub fn new(bus: &Arc<EventBus>, table: TableId) -> Arc<Self> {
        Arc::new(Self {
            table,
            bus: Arc::downgrade(bus),
            tasks: RwLock::new(Vec::new()),
        })
    }

    /// Append a pending task. Emits `taskAdded`.
    pub fn add(
        &self,
        task_type: impl Into<String>,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Uuid {
        let task = Task {
            id: Uuid::new_v4(),
            task_type: task_type.into(),
            description: description.into(),
            details: details.into(),
            status: TaskStatus::Pending,
            timestamp: Utc::now(),
        };
        let id = task.id;

        {
            let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
            tasks.push(task.clone());
        }
        self.publish(TableEvent::TaskAdded {
            table: self.table,
            task,
        });
        id
    }

    /// Change a task's status. Emits `taskStatusChanged` when the task
    /// exists.
    pub fn set_status(&self, id: Uuid, status: TaskStatus) -> bool {
        let changed = {
            let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.status = status;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.publish(TableEvent::TaskStatusChanged {
                table: self.table,
                task: id,
                status,
            });
        }
        changed
    }

    /// Mark a task completed with outcome details.
    pub fn complete(&self, id: Uuid, details: impl Into<String>) -> bool {
        {
            let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
            match tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => task.details = details.into(),
                None => return false,
            }
        }
        self.set_status(id, TaskStatus::Completed)
    }

    /// A task by id.
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// A snapshot of the full history, in creation order.
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn publish(&self, event: TableEvent) {
        if let Some(bus) = self.bus.upgrade() {
            bus.publish(&event);
        }
    }
}

impl std::fmt::Debug for TaskLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskLog")
            .field("table", &self.table)
            .field("tasks", &self.tasks.read().unwrap_or_else(|e| e.into_inner()).len())
            .finish()
    }
}
