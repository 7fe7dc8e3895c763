//! Table projection
//!
//! Projects a [`TableModel`](crate::model::TableModel) into a `tabledom`
//! element tree. Rendering is a pure function of model state: identical
//! state produces an identical tree, and re-rendering replaces only the
//! `thead`/`tbody` sections, leaving sibling children of the table element
//! (toolbars, console panels) alone.

mod extract;

use std::sync::Arc;

use tabledom::Element;

use crate::model::Row;
use crate::model::TableModel;
use crate::model::Value;

pub use extract::extract_table_data;

/// How cells accept edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditableMode {
    /// Content-editable cells; edited values are read from cell text.
    #[default]
    Cell,
    /// A text input per cell; edited values are read from the input value.
    Input,
}

/// Formats a cell for display; receives the column key and raw value.
pub type CellFormatter = Arc<dyn Fn(&str, &Value) -> String + Send + Sync>;

/// CSS class hooks for the rendered structure.
///
/// Styling is the embedder's concern; the renderer only attaches whatever
/// classes it is given.
#[derive(Debug, Clone, Default)]
pub struct ClassHooks {
    pub table: Option<String>,
    pub thead: Option<String>,
    pub tbody: Option<String>,
    pub tr: Option<String>,
    pub th: Option<String>,
    pub td: Option<String>,
    pub input: Option<String>,
}

/// Renderer settings.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Cell editing mode.
    pub editable_mode: EditableMode,
    /// Prepend a 1-based index column.
    pub show_index: bool,
    /// Prepend a selection checkbox column.
    pub show_select: bool,
    /// Prepend a checked checkbox column.
    pub show_checked: bool,
    /// CSS class hooks.
    pub classes: ClassHooks,
    /// Optional display formatter for cell values.
    pub cell_formatter: Option<CellFormatter>,
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("editable_mode", &self.editable_mode)
            .field("show_index", &self.show_index)
            .field("show_select", &self.show_select)
            .field("show_checked", &self.show_checked)
            .field("classes", &self.classes)
            .field(
                "cell_formatter",
                &self.cell_formatter.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

impl RenderOptions {
    /// Sets the cell editing mode.
    pub fn editable_mode(mut self, mode: EditableMode) -> Self {
        self.editable_mode = mode;
        self
    }

    /// Enables the index column.
    pub fn show_index(mut self, show: bool) -> Self {
        self.show_index = show;
        self
    }

    /// Enables the selection column.
    pub fn show_select(mut self, show: bool) -> Self {
        self.show_select = show;
        self
    }

    /// Enables the checked column.
    pub fn show_checked(mut self, show: bool) -> Self {
        self.show_checked = show;
        self
    }

    /// Sets the CSS class hooks.
    pub fn classes(mut self, classes: ClassHooks) -> Self {
        self.classes = classes;
        self
    }

    /// Sets the cell formatter.
    pub fn cell_formatter(
        mut self,
        formatter: impl Fn(&str, &Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.cell_formatter = Some(Arc::new(formatter));
        self
    }
}

/// Stateless projection of a model into a table element.
pub struct Renderer;

impl Renderer {
    /// Render the model into the table element, replacing the `thead` and
    /// `tbody` sections only.
    pub fn render(model: &TableModel, table: &mut Element) {
        let options = &model.options().render;
        table.set_attr("data-dynamic", "true");
        if let Some(class) = &options.classes.table {
            table.set_attr("class", class.clone());
        }
        table.replace_section("thead", Self::render_header(model));
        table.replace_section("tbody", Self::render_body(model));
    }

    fn render_header(model: &TableModel) -> Element {
        let options = &model.options().render;
        let mut thead = Element::new("thead");
        if let Some(class) = &options.classes.thead {
            thead.set_attr("class", class.clone());
        }

        let mut tr = Element::new("tr");
        if let Some(class) = &options.classes.tr {
            tr.set_attr("class", class.clone());
        }

        for label in Self::global_columns(model) {
            tr.push_child(Self::header_cell(options, label).attr("data-global", label));
        }

        for key in model.headers() {
            let mut th = Self::header_cell(options, "");
            match options.editable_mode {
                EditableMode::Input => {
                    let mut input = Element::new("input")
                        .attr("name", key.clone())
                        .attr("value", key.clone())
                        .attr("data-key", key.clone());
                    if let Some(class) = &options.classes.input {
                        input.set_attr("class", class.clone());
                    }
                    th.push_child(input);
                }
                EditableMode::Cell => {
                    th.set_attr("contenteditable", "true");
                    th.set_attr("data-key", key.clone());
                    th = th.text(key.clone());
                }
            }
            tr.push_child(th);
        }

        tr.push_child(Self::header_cell(options, "Action"));
        thead.push_child(tr);
        thead
    }

    fn header_cell(options: &RenderOptions, label: &str) -> Element {
        let mut th = Element::new("th");
        if let Some(class) = &options.classes.th {
            th.set_attr("class", class.clone());
        }
        if !label.is_empty() {
            th = th.text(label);
        }
        th
    }

    fn render_body(model: &TableModel) -> Element {
        let options = &model.options().render;
        let mut tbody = Element::new("tbody");
        if let Some(class) = &options.classes.tbody {
            tbody.set_attr("class", class.clone());
        }

        for (index, row) in model.rows().iter().enumerate() {
            tbody.push_child(Self::render_row(model, index, row));
        }
        tbody
    }

    fn render_row(model: &TableModel, index: usize, row: &Row) -> Element {
        let options = &model.options().render;
        let mut tr = Element::new("tr").attr("data-row", index.to_string());
        if let Some(class) = &options.classes.tr {
            tr.set_attr("class", class.clone());
        }

        // Row identity travels on the element for event correlation.
        if let Some(identity) = model.row_identity(index) {
            if let Some(id) = &identity.id {
                tr.set_attr("data-id", id.clone());
            }
            if let Some(collection) = &identity.collection {
                tr.set_attr("data-collection", collection.clone());
            }
        }

        if options.show_index {
            tr.push_child(
                Self::data_cell(options)
                    .attr("data-global", "#")
                    .text((index + 1).to_string()),
            );
        }
        if options.show_select {
            let selected = model
                .row_handle(index)
                .is_some_and(|h| model.selection().is_selected(&h.id));
            tr.push_child(
                Self::data_cell(options).child(Self::checkbox("data-select", index, selected)),
            );
        }
        if options.show_checked {
            tr.push_child(
                Self::data_cell(options).child(Self::checkbox("data-check", index, row.checked())),
            );
        }

        for key in model.headers() {
            let raw = row.get(key).cloned().unwrap_or(Value::Null);
            let display = match &options.cell_formatter {
                Some(formatter) => formatter(key, &raw),
                None => raw.display_string(),
            };

            let mut td = Self::data_cell(options);
            match options.editable_mode {
                EditableMode::Input => {
                    let mut input = Element::new("input")
                        .attr("name", key.clone())
                        .attr("value", display)
                        .attr("data-key", key.clone())
                        .attr("data-row", index.to_string());
                    if let Some(class) = &options.classes.input {
                        input.set_attr("class", class.clone());
                    }
                    td.push_child(input);
                }
                EditableMode::Cell => {
                    td.set_attr("contenteditable", "true");
                    td.set_attr("data-key", key.clone());
                    td.set_attr("data-row", index.to_string());
                    td = td.text(display);
                }
            }
            tr.push_child(td);
        }

        // Trailing action cell.
        tr.push_child(
            Self::data_cell(options).child(
                Element::with_text("button", "Delete")
                    .attr("data-row", index.to_string())
                    .attr("data-action", "delete"),
            ),
        );

        tr
    }

    fn data_cell(options: &RenderOptions) -> Element {
        let mut td = Element::new("td");
        if let Some(class) = &options.classes.td {
            td.set_attr("class", class.clone());
        }
        td
    }

    fn checkbox(marker: &str, index: usize, checked: bool) -> Element {
        let mut input = Element::new("input")
            .attr("type", "checkbox")
            .attr(marker, "true")
            .attr("data-row", index.to_string());
        if checked {
            input.set_attr("checked", "checked");
        }
        input
    }

    fn global_columns(model: &TableModel) -> Vec<&'static str> {
        let options = &model.options().render;
        let mut labels = Vec::new();
        if options.show_index {
            labels.push("#");
        }
        if options.show_select {
            labels.push("Select");
        }
        if options.show_checked {
            labels.push("Checked");
        }
        labels
    }
}
