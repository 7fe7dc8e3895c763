//! JSON import with lenient repair.
//!
//! Import expects a strict JSON array of flat objects. When strict parsing
//! fails, a best-effort repair quotes bare identifier keys and rewrites
//! single-quoted string literals, then parses again. The repair is exactly
//! two regex passes, not a JSON5 parser, and gives up on nested quotes
//! or exotic key names.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ImportError;
use crate::event::DataSource;

use super::Row;

/// Pass 1: `{key:` / `,key:` becomes `{"key":` / `,"key":`.
static UNQUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)(\w+)\s*:").expect("valid key regex"));

/// Pass 2: `'text'` becomes `"text"` (no escaping support).
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("valid quote regex"));

/// Outcome of a [`parse_rows`] call, in the shape import callers report.
#[derive(Debug, Clone)]
pub struct ImportStatus {
    /// Whether rows were produced.
    pub ok: bool,
    /// Human-readable status: `(parsed)`, `(converted, parsed)` or `(failed)`.
    pub message: &'static str,
    /// The parsed rows on success.
    pub rows: Option<Vec<Row>>,
}

impl ImportStatus {
    pub(crate) fn parsed(rows: Vec<Row>, source: DataSource) -> Self {
        Self {
            ok: true,
            message: match source {
                DataSource::JsonRepaired => "(converted, parsed)",
                _ => "(parsed)",
            },
            rows: Some(rows),
        }
    }

    pub(crate) fn failed() -> Self {
        Self {
            ok: false,
            message: "(failed)",
            rows: None,
        }
    }
}

/// Apply the two documented repair passes to raw import text.
pub fn lenient_repair(raw: &str) -> String {
    let keyed = UNQUOTED_KEY.replace_all(raw, "${1}\"${2}\":");
    SINGLE_QUOTED.replace_all(&keyed, "\"${1}\"").into_owned()
}

/// Parse import text into rows, strictly first, leniently second.
///
/// Returns the rows together with the [`DataSource`] describing which pass
/// succeeded. Fails with [`ImportError`] when neither pass produces an
/// array of objects.
pub fn parse_rows(raw: &str) -> Result<(Vec<Row>, DataSource), ImportError> {
    match parse_strict(raw) {
        Ok(rows) => Ok((rows, DataSource::Json)),
        Err(first) => {
            let repaired = lenient_repair(raw);
            match parse_strict(&repaired) {
                Ok(rows) => Ok((rows, DataSource::JsonRepaired)),
                Err(second) => {
                    log::debug!("import failed strict ({first}) and repaired ({second})");
                    Err(second)
                }
            }
        }
    }
}

fn parse_strict(raw: &str) -> Result<Vec<Row>, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ImportError::Parse(e.to_string()))?;
    rows_from_array(value)
}

/// Convert a parsed JSON value into rows. The value must be an array of
/// objects.
pub fn rows_from_array(value: serde_json::Value) -> Result<Vec<Row>, ImportError> {
    let serde_json::Value::Array(items) = value else {
        return Err(ImportError::NotRowArray(format!(
            "got {}",
            json_type_name(&value)
        )));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let serde_json::Value::Object(object) = item else {
            return Err(ImportError::NotRowArray(format!(
                "element {index} is {}",
                json_type_name(&item)
            )));
        };
        rows.push(Row::from_json_object(object));
    }
    Ok(rows)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn test_strict_array_parses() {
        let (rows, source) = parse_rows(r#"[{"a":1}]"#).unwrap();
        assert_eq!(source, DataSource::Json);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_lenient_repair_quotes_keys_and_strings() {
        let (rows, source) = parse_rows("[{a:1,b:'x'}]").unwrap();
        assert_eq!(source, DataSource::JsonRepaired);
        assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("b"), Some(&Value::String("x".into())));
    }

    #[test]
    fn test_repair_passes_verbatim() {
        assert_eq!(
            lenient_repair("[{a: 1, b:'x y'}]"),
            r#"[{"a": 1, "b":"x y"}]"#
        );
    }

    #[test]
    fn test_garbage_fails() {
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn test_non_array_fails() {
        assert!(matches!(
            parse_rows(r#"{"a":1}"#),
            Err(ImportError::NotRowArray(_))
        ));
    }

    #[test]
    fn test_non_object_element_fails() {
        assert!(matches!(
            parse_rows("[1,2]"),
            Err(ImportError::NotRowArray(_))
        ));
    }
}
