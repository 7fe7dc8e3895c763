//! Table model: authoritative row storage and bookkeeping.

use std::collections::HashSet;

use crate::error::IdentityError;
use crate::event::RowHandle;
use crate::identity;
use crate::identity::IdentityConfig;
use crate::render::RenderOptions;

use super::Row;
use super::Selection;
use super::SelectionMode;
use super::CHECKED_KEY;

/// Default identity key stamped onto rows.
pub const DEFAULT_ID_KEY: &str = "_rid";

/// Configuration for a table instance.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Field name holding the hidden row identity.
    pub id_key: String,
    /// Field name holding a per-row collection override.
    pub collection_key: Option<String>,
    /// Default collection name for rows without an override.
    pub collection_name: Option<String>,
    /// Identity generation settings.
    pub identity: IdentityConfig,
    /// Selection mode.
    pub select_mode: SelectionMode,
    /// Renderer settings.
    pub render: RenderOptions,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_ID_KEY.to_string(),
            collection_key: None,
            collection_name: None,
            identity: IdentityConfig::default(),
            select_mode: SelectionMode::default(),
            render: RenderOptions::default(),
        }
    }
}

impl TableOptions {
    /// Sets the identity key.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Sets the per-row collection key.
    pub fn collection_key(mut self, key: impl Into<String>) -> Self {
        self.collection_key = Some(key.into());
        self
    }

    /// Sets the default collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Sets the identity generation settings.
    pub fn identity(mut self, config: IdentityConfig) -> Self {
        self.identity = config;
        self
    }

    /// Sets the selection mode.
    pub fn select_mode(mut self, mode: SelectionMode) -> Self {
        self.select_mode = mode;
        self
    }

    /// Sets the renderer settings.
    pub fn render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

/// Identity attributes of one row: hidden id plus collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdentity {
    /// The stable row id, if stamped.
    pub id: Option<String>,
    /// The row's collection: per-row override, else the table default.
    pub collection: Option<String>,
}

/// Authoritative row storage with derived headers and view state.
///
/// All mutation runs synchronously on the caller; every structural change
/// re-derives the header set and keeps identities unique. Event emission
/// lives one level up, on the table façade.
#[derive(Debug)]
pub struct TableModel {
    options: TableOptions,
    rows: Vec<Row>,
    headers: Vec<String>,
    selection: Selection,
    /// Identity of the row whose detail sheet is open; at most one.
    open_sheet: Option<String>,
}

impl TableModel {
    /// Build a model from raw rows, stamping identities and deriving
    /// headers.
    pub fn new(rows: Vec<Row>, options: TableOptions) -> Result<Self, IdentityError> {
        let selection = Selection::new(options.select_mode);
        let mut model = Self {
            options,
            rows,
            headers: Vec::new(),
            selection,
            open_sheet: None,
        };
        model.ensure_row_ids()?;
        model.derive_headers();
        Ok(model)
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// The table options.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A row by position.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Derived visible headers, in first-seen key order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Identity of the row with an open detail sheet.
    pub fn open_sheet(&self) -> Option<&str> {
        self.open_sheet.as_deref()
    }

    /// A correlation handle for the row at `index`.
    pub fn row_handle(&self, index: usize) -> Option<RowHandle> {
        let row = self.rows.get(index)?;
        let id = row.id(&self.options.id_key)?.to_string();
        Some(RowHandle { index, id })
    }

    /// Identity attributes for the row at `index`.
    pub fn row_identity(&self, index: usize) -> Option<RowIdentity> {
        let row = self.rows.get(index)?;
        let id = row.id(&self.options.id_key).map(str::to_uppercase);
        let collection = self
            .options
            .collection_key
            .as_deref()
            .and_then(|key| row.get(key))
            .map(|v| v.display_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.options.collection_name.clone());
        Some(RowIdentity { id, collection })
    }

    /// Sets the default collection name.
    pub fn set_collection_name(&mut self, name: impl Into<String>) {
        self.options.collection_name = Some(name.into());
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Stamp an identity onto every row lacking one and normalize the rest
    /// to upper case. Previously assigned identities are never regenerated.
    pub fn ensure_row_ids(&mut self) -> Result<(), IdentityError> {
        let id_key = self.options.id_key.clone();
        let config = self.options.identity.clone();
        stamp_ids(&mut self.rows, &id_key, &config)
    }

    /// Re-derive the visible header set: the union of row keys in
    /// first-seen order, reserved keys excluded.
    pub fn derive_headers(&mut self) {
        let mut headers: Vec<String> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if key == self.options.id_key || key == CHECKED_KEY {
                    continue;
                }
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.to_string());
                }
            }
        }
        self.headers = headers;
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace all rows. Prior selection and sheet state is discarded.
    ///
    /// Identities are stamped before the swap, so an allocation failure
    /// leaves the model untouched.
    pub fn load(&mut self, rows: Vec<Row>) -> Result<(), IdentityError> {
        let mut staged = rows;
        stamp_ids(&mut staged, &self.options.id_key, &self.options.identity)?;
        self.rows = staged;
        self.selection.clear();
        self.open_sheet = None;
        self.derive_headers();
        Ok(())
    }

    /// Append a row, stamping an identity if absent.
    pub fn add_row(&mut self, row: Row) -> Result<RowHandle, IdentityError> {
        let mut staged = vec![row];
        let existing: HashSet<String> = self
            .rows
            .iter()
            .filter_map(|r| r.id(&self.options.id_key))
            .map(str::to_uppercase)
            .collect();
        stamp_ids_against(
            &mut staged,
            existing,
            &self.options.id_key,
            &self.options.identity,
        )?;
        let row = staged.remove(0);
        self.rows.push(row);
        self.derive_headers();
        let index = self.rows.len() - 1;
        Ok(self
            .row_handle(index)
            .expect("identity stamped before append"))
    }

    /// Remove the row at `index`, returning its pre-removal handle and
    /// collection. Returns `None` when the index is out of bounds.
    pub fn delete_row(&mut self, index: usize) -> Option<(RowHandle, Option<String>)> {
        if index >= self.rows.len() {
            return None;
        }
        let handle = self.row_handle(index)?;
        let collection = self.row_identity(index).and_then(|ri| ri.collection);
        if self.open_sheet.as_deref() == Some(handle.id.as_str()) {
            self.open_sheet = None;
        }
        self.selection.set(&handle.id, false);
        self.rows.remove(index);
        self.derive_headers();
        Some((handle, collection))
    }

    /// Mutate a field in place. Returns the row handle, or `None` when the
    /// index is out of bounds.
    pub fn update_field(
        &mut self,
        index: usize,
        key: &str,
        value: impl Into<super::Value>,
    ) -> Option<RowHandle> {
        let handle = self.row_handle(index)?;
        self.rows[index].insert(key, value);
        Some(handle)
    }

    // =========================================================================
    // Selection and checked state
    // =========================================================================

    /// Set a row's checked flag. The flag lives on the row itself.
    pub fn toggle_checked(&mut self, index: usize, checked: bool) -> Option<RowHandle> {
        let handle = self.row_handle(index)?;
        self.rows[index].set_checked(checked);
        Some(handle)
    }

    /// Set a row's selected state.
    pub fn toggle_select(&mut self, index: usize, selected: bool) -> Option<RowHandle> {
        let handle = self.row_handle(index)?;
        self.selection.set(&handle.id, selected);
        Some(handle)
    }

    /// Make the row at `index` the single selection, clearing any prior.
    pub fn select_single(&mut self, index: usize) -> Option<RowHandle> {
        let handle = self.row_handle(index)?;
        self.selection.select_only(&handle.id);
        Some(handle)
    }

    /// Select or deselect every row.
    pub fn toggle_select_all(&mut self, selected: bool) {
        if !selected {
            self.selection.clear();
            return;
        }
        let ids: Vec<String> = (0..self.rows.len())
            .filter_map(|i| self.row_handle(i))
            .map(|h| h.id)
            .collect();
        for id in ids {
            self.selection.set(&id, true);
        }
    }

    /// Identities of all selected rows, in row order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.id(&self.options.id_key))
            .filter(|id| self.selection.is_selected(id))
            .map(str::to_string)
            .collect()
    }

    // =========================================================================
    // Row sheets
    // =========================================================================

    /// Open the detail sheet for the row at `index`, closing any other.
    /// Returns `(closed, opened)` handles.
    pub fn open_sheet_for(&mut self, index: usize) -> Option<(Option<RowHandle>, RowHandle)> {
        let handle = self.row_handle(index)?;
        let closed = self.close_sheet();
        self.open_sheet = Some(handle.id.clone());
        Some((closed, handle))
    }

    /// Close the open detail sheet, if any, returning its handle.
    pub fn close_sheet(&mut self) -> Option<RowHandle> {
        let id = self.open_sheet.take()?;
        let index = self
            .rows
            .iter()
            .position(|row| row.id(&self.options.id_key) == Some(id.as_str()))?;
        Some(RowHandle { index, id })
    }
}

/// Stamp identities across `rows`, seeding the collision set from the rows
/// themselves.
fn stamp_ids(rows: &mut [Row], id_key: &str, config: &IdentityConfig) -> Result<(), IdentityError> {
    let existing: HashSet<String> = rows
        .iter()
        .filter_map(|row| row.id(id_key))
        .map(str::to_uppercase)
        .collect();
    stamp_ids_against(rows, existing, id_key, config)
}

/// Stamp identities across `rows` against an externally supplied collision
/// set. Rows that already carry an identity are only case-normalized.
fn stamp_ids_against(
    rows: &mut [Row],
    mut existing: HashSet<String>,
    id_key: &str,
    config: &IdentityConfig,
) -> Result<(), IdentityError> {
    for row in rows.iter_mut() {
        match row.id(id_key) {
            Some(id) => {
                let normalized = id.to_uppercase();
                row.set_id(id_key, normalized);
            }
            None => {
                let id = identity::allocate(&existing, config)?;
                existing.insert(id.clone());
                row.set_id(id_key, id);
            }
        }
    }
    Ok(())
}
