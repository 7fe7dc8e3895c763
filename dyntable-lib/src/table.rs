//! The dynamic table façade.

use std::sync::Arc;

use tabledom::Document;
use tabledom::Element;

use crate::error::Error;
use crate::event::DataSource;
use crate::event::EventBus;
use crate::event::RowHandle;
use crate::event::TableEvent;
use crate::event::TableId;
use crate::model::parse_rows;
use crate::model::ImportStatus;
use crate::model::Row;
use crate::model::TableModel;
use crate::model::TableOptions;
use crate::model::Value;
use crate::render::extract_table_data;
use crate::render::Renderer;
use crate::storage::Storage;
use crate::worker::WorkerExecutor;
use crate::worker::WorkerRegistry;

/// An editable table bound to a document mount point.
///
/// Owns the model, the rendered element tree and the per-instance event
/// bus. Every mutating operation re-renders the `thead`/`tbody` sections
/// and publishes its event; rendering is idempotent for identical model
/// state.
///
/// # Example
///
/// ```
/// use dyntable_lib::DynamicTable;
/// use dyntable_lib::model::TableOptions;
/// use tabledom::{Document, Element};
///
/// let mut doc = Document::new();
/// doc.insert("data_table", Element::new("table"));
///
/// let mut table = DynamicTable::attach(
///     &doc,
///     "data_table",
///     Vec::new(),
///     TableOptions::default(),
/// )
/// .unwrap();
///
/// let status = table.load_json(r#"[{"name":"Alice"}]"#);
/// assert!(status.ok);
/// assert_eq!(table.model().len(), 1);
/// ```
pub struct DynamicTable {
    id: TableId,
    key: String,
    root: Element,
    model: TableModel,
    bus: Arc<EventBus>,
    active_tab: Option<String>,
}

impl DynamicTable {
    /// Attach a table to the mount point `table_id` in `document`.
    ///
    /// Fails with [`Error::MissingElement`] when the mount point does not
    /// exist and with [`Error::Identity`] when row identities cannot be
    /// allocated. Both are structural preconditions; there is no degraded
    /// construction.
    pub fn attach(
        document: &Document,
        table_id: &str,
        rows: Vec<Row>,
        options: TableOptions,
    ) -> Result<Self, Error> {
        let root = document
            .get(table_id)
            .cloned()
            .ok_or_else(|| Error::MissingElement(table_id.to_string()))?;
        let model = TableModel::new(rows, options)?;

        let mut table = Self {
            id: TableId::next(),
            key: table_id.to_string(),
            root,
            model,
            bus: Arc::new(EventBus::new()),
            active_tab: None,
        };
        table.rerender();
        Ok(table)
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// The table's instance id, carried in every event payload.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// The mount point key the table is attached to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The event bus for this instance.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The table model.
    pub fn model(&self) -> &TableModel {
        &self.model
    }

    /// The rendered element tree.
    pub fn element(&self) -> &Element {
        &self.root
    }

    /// The rendered tree as HTML.
    pub fn html(&self) -> String {
        tabledom::to_html(&self.root)
    }

    /// Build a worker registry wired to this table's bus.
    pub fn workers(&self, executor: Arc<WorkerExecutor>) -> WorkerRegistry {
        WorkerRegistry::new(
            Arc::clone(&self.bus),
            executor,
            self.id,
            self.key.clone(),
            self.model.options().collection_name.clone(),
        )
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Re-render the table from current model state.
    ///
    /// Replaces only the `thead`/`tbody` sections; sibling children of the
    /// table element survive. Emits `tableRender`.
    pub fn render(&mut self) {
        self.rerender();
    }

    fn rerender(&mut self) {
        Renderer::render(&self.model, &mut self.root);
        self.bus.publish(&TableEvent::TableRender {
            table: self.id,
            headers: self.model.headers().to_vec(),
            rows: self.model.len(),
        });
    }

    /// Read the current table contents back out of the rendered tree.
    pub fn extract_table_data(&self) -> Vec<Row> {
        extract_table_data(&self.model, &self.root)
    }

    /// The extracted table contents as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, Error> {
        let rows = self.extract_table_data();
        serde_json::to_string_pretty(&rows)
            .map_err(|e| crate::error::StorageError::Serialize(e.to_string()).into())
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replace all rows programmatically. Emits `tableRender` then
    /// `dataChange`.
    pub fn load(&mut self, rows: Vec<Row>) -> Result<(), Error> {
        self.load_with_source(rows, DataSource::Load)
    }

    /// Import raw JSON text, leniently.
    ///
    /// On success the row set is replaced wholesale (prior selection is
    /// discarded) and `dataChange` is emitted; on failure the model is
    /// untouched and only the failed status is returned.
    pub fn load_json(&mut self, raw: &str) -> ImportStatus {
        match parse_rows(raw) {
            Ok((rows, source)) => match self.load_with_source(rows, source) {
                Ok(()) => ImportStatus::parsed(self.model.rows().to_vec(), source),
                Err(e) => {
                    log::error!("import aborted: {e}");
                    ImportStatus::failed()
                }
            },
            Err(e) => {
                log::debug!("import rejected: {e}");
                ImportStatus::failed()
            }
        }
    }

    fn load_with_source(&mut self, rows: Vec<Row>, source: DataSource) -> Result<(), Error> {
        self.model.load(rows)?;
        self.rerender();
        self.bus.publish(&TableEvent::DataChange {
            table: self.id,
            rows: self.model.rows().to_vec(),
            source,
        });
        Ok(())
    }

    /// Replace all rows from a stored collection.
    ///
    /// `key` falls back to the table's collection name. Fails with
    /// [`StorageError::Missing`](crate::error::StorageError::Missing) when
    /// nothing is stored under the key.
    pub async fn load_from_storage(
        &mut self,
        storage: &Storage,
        key: Option<&str>,
    ) -> Result<usize, Error> {
        let key = key
            .map(str::to_string)
            .or_else(|| self.model.options().collection_name.clone())
            .unwrap_or_else(|| "defaultCollection".to_string());

        let value = storage
            .get(&key)
            .await
            .ok_or_else(|| crate::error::StorageError::Missing(key.clone()))?;
        let rows = crate::model::rows_from_array(value)?;
        let count = rows.len();
        self.load_with_source(rows, DataSource::Storage)?;
        Ok(count)
    }

    /// Append a row. Emits `tableRender` then `rowAdded`.
    pub fn add_row(&mut self, row: Row) -> Result<RowHandle, Error> {
        let handle = self.model.add_row(row)?;
        let collection = self
            .model
            .row_identity(handle.index)
            .and_then(|ri| ri.collection);
        self.rerender();
        self.bus.publish(&TableEvent::RowAdded {
            table: self.id,
            row: handle.clone(),
            collection,
        });
        Ok(handle)
    }

    /// Delete the row at `index` by position.
    ///
    /// The handle and collection are captured before removal; remaining
    /// identities are untouched. Unsaved in-flight cell edits for the row
    /// are lost; edits must be committed via blur before deletion. Emits
    /// `tableRender` then `rowDeleted`; out-of-bounds indices return
    /// `None` silently.
    pub fn delete_row(&mut self, index: usize) -> Option<RowHandle> {
        let (handle, collection) = self.model.delete_row(index)?;
        self.rerender();
        self.bus.publish(&TableEvent::RowDeleted {
            table: self.id,
            row: handle.clone(),
            collection,
        });
        Some(handle)
    }

    /// Auto-save a field edit into the model. Emits `rowFieldAutoSaved`.
    ///
    /// The rendered tree is left alone: the edit originated there.
    pub fn update_field(
        &mut self,
        index: usize,
        key: &str,
        value: impl Into<Value>,
    ) -> Option<RowHandle> {
        let value = value.into();
        let text = value.display_string();
        let handle = self.model.update_field(index, key, value)?;
        self.bus.publish(&TableEvent::RowFieldAutoSaved {
            table: self.id,
            row: handle.clone(),
            key: key.to_string(),
            value: text,
        });
        Some(handle)
    }

    // =========================================================================
    // Cell notifications
    // =========================================================================

    /// Report an in-progress cell edit. Emits `cellChange`.
    pub fn notify_cell_change(&self, index: usize, key: &str, value: &str) {
        self.notify_cell(index, key, value, false);
    }

    /// Report a committed cell edit. Emits `cellBlur`.
    pub fn notify_cell_blur(&self, index: usize, key: &str, value: &str) {
        self.notify_cell(index, key, value, true);
    }

    fn notify_cell(&self, index: usize, key: &str, value: &str, blur: bool) {
        let Some(row) = self.model.row_handle(index) else {
            return;
        };
        let collection = self.model.row_identity(index).and_then(|ri| ri.collection);
        let event = if blur {
            TableEvent::CellBlur {
                table: self.id,
                row,
                key: key.to_string(),
                value: value.to_string(),
                collection,
            }
        } else {
            TableEvent::CellChange {
                table: self.id,
                row,
                key: key.to_string(),
                value: value.to_string(),
                collection,
            }
        };
        self.bus.publish(&event);
    }

    // =========================================================================
    // Selection and checked state
    // =========================================================================

    /// Set a row's checked flag. Emits `tableRender` then `rowChecked`.
    pub fn toggle_checked(&mut self, index: usize, checked: bool) -> Option<RowHandle> {
        let handle = self.model.toggle_checked(index, checked)?;
        self.rerender();
        self.bus.publish(&TableEvent::RowChecked {
            table: self.id,
            row: handle.clone(),
            checked,
        });
        Some(handle)
    }

    /// Set a row's selected state. Emits `rowSelected` then
    /// `selectionChanged`.
    pub fn toggle_select(&mut self, index: usize, selected: bool) -> Option<RowHandle> {
        let handle = self.model.toggle_select(index, selected)?;
        self.rerender();
        self.bus.publish(&TableEvent::RowSelected {
            table: self.id,
            row: handle.clone(),
            selected,
        });
        self.publish_selection();
        Some(handle)
    }

    /// Make the row at `index` the single selection. Emits
    /// `singleRowSelected` then `selectionChanged`.
    pub fn select_single(&mut self, index: usize) -> Option<RowHandle> {
        let handle = self.model.select_single(index)?;
        self.rerender();
        self.bus.publish(&TableEvent::SingleRowSelected {
            table: self.id,
            row: handle.clone(),
        });
        self.publish_selection();
        Some(handle)
    }

    /// Select or deselect every row. Emits `selectionChanged`.
    pub fn toggle_select_all(&mut self, selected: bool) {
        self.model.toggle_select_all(selected);
        self.rerender();
        self.publish_selection();
    }

    /// Identities of all selected rows, in row order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.model.selected_ids()
    }

    fn publish_selection(&self) {
        self.bus.publish(&TableEvent::SelectionChanged {
            table: self.id,
            selected: self.model.selected_ids(),
        });
    }

    // =========================================================================
    // Row sheets, tabs, collection
    // =========================================================================

    /// Open the detail sheet for the row at `index`. At most one sheet is
    /// open; any other sheet is closed first. Emits `rowSheetClosed` for
    /// the displaced sheet, then `rowSheetOpened`.
    pub fn open_row_sheet(&mut self, index: usize) -> Option<RowHandle> {
        let (closed, opened) = self.model.open_sheet_for(index)?;
        if let Some(closed) = closed {
            self.bus.publish(&TableEvent::RowSheetClosed {
                table: self.id,
                row: closed,
            });
        }
        self.bus.publish(&TableEvent::RowSheetOpened {
            table: self.id,
            row: opened.clone(),
        });
        Some(opened)
    }

    /// Close the open detail sheet, if any. Emits `rowSheetClosed`.
    pub fn close_row_sheet(&mut self) -> Option<RowHandle> {
        let closed = self.model.close_sheet()?;
        self.bus.publish(&TableEvent::RowSheetClosed {
            table: self.id,
            row: closed.clone(),
        });
        Some(closed)
    }

    /// The active tab, if one was set.
    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    /// Switch the active tab. Emits `tabChanged`.
    pub fn change_tab(&mut self, tab: impl Into<String>) {
        let tab = tab.into();
        self.active_tab = Some(tab.clone());
        self.bus
            .publish(&TableEvent::TabChanged { table: self.id, tab });
    }

    /// Rename the table's collection. Emits `collectionNameChange`.
    pub fn set_collection_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.model.set_collection_name(name.clone());
        self.bus.publish(&TableEvent::CollectionNameChange {
            table: self.id,
            name,
        });
    }
}

impl std::fmt::Debug for DynamicTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicTable")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("rows", &self.model.len())
            .finish()
    }
}
