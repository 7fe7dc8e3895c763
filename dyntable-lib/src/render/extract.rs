//! Reading edited values back out of the rendered tree.

use tabledom::Element;

use crate::model::Row;
use crate::model::TableModel;
use crate::model::Value;

/// Extract the current table contents from the rendered element.
///
/// Walks `tbody` rows in order; for each visible header the value is read
/// from the cell's `input` value when present (input editing mode), else
/// from the cell's text content (content-editable mode). Both are trimmed.
/// The hidden identity is restored from the row's `data-id` attribute, so
/// a render/extract round trip reproduces the loaded data with identity
/// fields added.
pub fn extract_table_data(model: &TableModel, table: &Element) -> Vec<Row> {
    let id_key = &model.options().id_key;
    let Some(tbody) = table.find_by_tag("tbody") else {
        return Vec::new();
    };

    let mut extracted = Vec::new();
    for tr in tbody.child_elements().iter().filter(|el| el.tag == "tr") {
        let mut row = Row::new();
        if let Some(id) = tr.get_attr("data-id") {
            row.set_id(id_key, id);
        }

        for key in model.headers() {
            let value = cell_value(tr, key).unwrap_or_default();
            row.insert(key.clone(), Value::String(value));
        }
        extracted.push(row);
    }
    extracted
}

fn cell_value(tr: &Element, key: &str) -> Option<String> {
    let cell = tr.find_by_attr("data-key", key)?;
    let value = if cell.tag == "input" {
        cell.get_attr("value").unwrap_or_default().to_string()
    } else {
        cell.text_content()
    };
    Some(value.trim().to_string())
}
