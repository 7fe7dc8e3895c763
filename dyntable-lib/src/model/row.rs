//! Dynamic row

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Reserved key for the per-row checked flag.
pub const CHECKED_KEY: &str = "_checked";

/// A flat mapping from field names to scalar values.
///
/// Field order is preserved; header derivation depends on first-seen key
/// order across rows. The identity key (configured on the table, default
/// `_rid`) and the reserved [`CHECKED_KEY`] live in the same map but are
/// never exposed as visible columns.
///
/// # Example
///
/// ```
/// use dyntable_lib::model::Row;
///
/// let row = Row::new().set("name", "Alice").set("age", 39i64);
/// assert_eq!(row.get("name").unwrap().display_string(), "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from a parsed JSON object.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut row = Self::new();
        for (key, value) in object {
            row.insert(key, Value::from_json(value));
        }
        row
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Number of fields, reserved keys included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // =========================================================================
    // Reserved keys
    // =========================================================================

    /// The row identity under the given id key, if present and non-empty.
    pub fn id(&self, id_key: &str) -> Option<&str> {
        match self.fields.get(id_key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Stamps the row identity.
    pub fn set_id(&mut self, id_key: &str, id: impl Into<String>) {
        self.fields
            .insert(id_key.to_string(), Value::String(id.into()));
    }

    /// The reserved checked flag; absent counts as unchecked.
    pub fn checked(&self) -> bool {
        matches!(self.fields.get(CHECKED_KEY), Some(Value::Bool(true)))
    }

    /// Sets the reserved checked flag.
    pub fn set_checked(&mut self, checked: bool) {
        self.fields
            .insert(CHECKED_KEY.to_string(), Value::Bool(checked));
    }

    /// The row as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
