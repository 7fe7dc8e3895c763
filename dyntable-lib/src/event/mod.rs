//! Table events
//!
//! Every table instance owns an [`EventBus`]; mutations publish a
//! [`TableEvent`] that fans out synchronously to subscribers in
//! subscription order. Payloads carry a [`TableId`] back-reference to the
//! owning table: a lookup key, never an owning handle.

mod bus;
mod kind;

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

pub use bus::{EventBus, SubscriptionId};
pub use kind::{EventKind, UnknownEventKind};

use crate::console::{Task, TaskStatus};
use crate::model::Row;

/// Unique identifier for a table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TableId(usize);

impl TableId {
    /// Allocate the next table id.
    pub fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table-{}", self.0)
    }
}

/// Explicit row correlation handle: positional index plus stable identity.
///
/// Threaded through render output and event payloads so consumers never
/// have to round-trip row positions through string attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowHandle {
    /// Position in the row sequence at emission time.
    pub index: usize,
    /// Stable row identity (upper-case normalized).
    pub id: String,
}

/// Where a wholesale data replacement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Programmatic `load`.
    #[serde(rename = "load")]
    Load,
    /// Strict JSON import.
    #[serde(rename = "json")]
    Json,
    /// JSON import that needed lenient repair.
    #[serde(rename = "json-converted")]
    JsonRepaired,
    /// Loaded back from key-value storage.
    #[serde(rename = "storage")]
    Storage,
}

/// A table event with its kind-specific payload.
///
/// One variant per published event name; [`TableEvent::kind`] maps a value
/// back to its [`EventKind`]. Serialization renders just the payload
/// fields, which is what worker templates receive as `{{eventData}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TableEvent {
    /// The table was (re-)rendered.
    TableRender {
        table: TableId,
        headers: Vec<String>,
        rows: usize,
    },
    /// The row set was replaced wholesale.
    DataChange {
        table: TableId,
        rows: Vec<Row>,
        source: DataSource,
    },
    /// A cell edit is in progress.
    CellChange {
        table: TableId,
        row: RowHandle,
        key: String,
        value: String,
        collection: Option<String>,
    },
    /// A cell edit was committed (focus left the cell).
    CellBlur {
        table: TableId,
        row: RowHandle,
        key: String,
        value: String,
        collection: Option<String>,
    },
    /// A row was appended.
    RowAdded {
        table: TableId,
        row: RowHandle,
        collection: Option<String>,
    },
    /// A row was deleted. The handle was captured before removal.
    RowDeleted {
        table: TableId,
        row: RowHandle,
        collection: Option<String>,
    },
    /// A row detail sheet was opened.
    RowSheetOpened { table: TableId, row: RowHandle },
    /// A row detail sheet was closed.
    RowSheetClosed { table: TableId, row: RowHandle },
    /// A field edit was auto-saved into the model.
    RowFieldAutoSaved {
        table: TableId,
        row: RowHandle,
        key: String,
        value: String,
    },
    /// The selection set changed.
    SelectionChanged {
        table: TableId,
        selected: Vec<String>,
    },
    /// A row was selected or deselected in multi-select mode.
    RowSelected {
        table: TableId,
        row: RowHandle,
        selected: bool,
    },
    /// A row became the single selection.
    SingleRowSelected { table: TableId, row: RowHandle },
    /// A row's checked flag changed.
    RowChecked {
        table: TableId,
        row: RowHandle,
        checked: bool,
    },
    /// The active tab changed.
    TabChanged { table: TableId, tab: String },
    /// The collection name changed.
    CollectionNameChange { table: TableId, name: String },
    /// A worker was created or updated.
    WorkerSaved {
        table: TableId,
        worker: Uuid,
        name: String,
    },
    /// A worker was enabled or disabled.
    WorkerToggled {
        table: TableId,
        worker: Uuid,
        enabled: bool,
    },
    /// A worker was deleted.
    WorkerDeleted { table: TableId, worker: Uuid },
    /// A task was appended to the history.
    TaskAdded { table: TableId, task: Task },
    /// A task's status changed.
    TaskStatusChanged {
        table: TableId,
        task: Uuid,
        status: TaskStatus,
    },
}

impl TableEvent {
    /// The event kind this payload belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::TableRender { .. } => EventKind::TableRender,
            Self::DataChange { .. } => EventKind::DataChange,
            Self::CellChange { .. } => EventKind::CellChange,
            Self::CellBlur { .. } => EventKind::CellBlur,
            Self::RowAdded { .. } => EventKind::RowAdded,
            Self::RowDeleted { .. } => EventKind::RowDeleted,
            Self::RowSheetOpened { .. } => EventKind::RowSheetOpened,
            Self::RowSheetClosed { .. } => EventKind::RowSheetClosed,
            Self::RowFieldAutoSaved { .. } => EventKind::RowFieldAutoSaved,
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::RowSelected { .. } => EventKind::RowSelected,
            Self::SingleRowSelected { .. } => EventKind::SingleRowSelected,
            Self::RowChecked { .. } => EventKind::RowChecked,
            Self::TabChanged { .. } => EventKind::TabChanged,
            Self::CollectionNameChange { .. } => EventKind::CollectionNameChange,
            Self::WorkerSaved { .. } => EventKind::WorkerSaved,
            Self::WorkerToggled { .. } => EventKind::WorkerToggled,
            Self::WorkerDeleted { .. } => EventKind::WorkerDeleted,
            Self::TaskAdded { .. } => EventKind::TaskAdded,
            Self::TaskStatusChanged { .. } => EventKind::TaskStatusChanged,
        }
    }

    /// The owning table.
    pub fn table(&self) -> TableId {
        match self {
            Self::TableRender { table, .. }
            | Self::DataChange { table, .. }
            | Self::CellChange { table, .. }
            | Self::CellBlur { table, .. }
            | Self::RowAdded { table, .. }
            | Self::RowDeleted { table, .. }
            | Self::RowSheetOpened { table, .. }
            | Self::RowSheetClosed { table, .. }
            | Self::RowFieldAutoSaved { table, .. }
            | Self::SelectionChanged { table, .. }
            | Self::RowSelected { table, .. }
            | Self::SingleRowSelected { table, .. }
            | Self::RowChecked { table, .. }
            | Self::TabChanged { table, .. }
            | Self::CollectionNameChange { table, .. }
            | Self::WorkerSaved { table, .. }
            | Self::WorkerToggled { table, .. }
            | Self::WorkerDeleted { table, .. }
            | Self::TaskAdded { table, .. }
            | Self::TaskStatusChanged { table, .. } => *table,
        }
    }

    /// The collection this event refers to, when the payload carries one.
    pub fn collection(&self) -> Option<&str> {
        match self {
            Self::CellChange { collection, .. }
            | Self::CellBlur { collection, .. }
            | Self::RowAdded { collection, .. }
            | Self::RowDeleted { collection, .. } => collection.as_deref(),
            Self::CollectionNameChange { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// The row handle, when the payload carries one.
    pub fn row(&self) -> Option<&RowHandle> {
        match self {
            Self::CellChange { row, .. }
            | Self::CellBlur { row, .. }
            | Self::RowAdded { row, .. }
            | Self::RowDeleted { row, .. }
            | Self::RowSheetOpened { row, .. }
            | Self::RowSheetClosed { row, .. }
            | Self::RowFieldAutoSaved { row, .. }
            | Self::RowSelected { row, .. }
            | Self::SingleRowSelected { row, .. }
            | Self::RowChecked { row, .. } => Some(row),
            _ => None,
        }
    }

    /// Payload as JSON, for templates and log sinks.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
