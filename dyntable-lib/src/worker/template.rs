//! Template placeholder substitution.

use super::EventContext;

/// Substitute the supported placeholders into a request template.
///
/// Supported: `{{eventType}}`, `{{eventData}}`, `{{timestamp}}`,
/// `{{tableId}}`, `{{collectionName}}`. `{{eventData}}` expands to the
/// event payload's JSON text, so it belongs in value position of a JSON
/// template unquoted. Unknown placeholders pass through untouched.
pub fn substitute(template: &str, cx: &EventContext) -> String {
    template
        .replace("{{eventType}}", &cx.event_type)
        .replace("{{eventData}}", &cx.event_data.to_string())
        .replace("{{timestamp}}", &cx.timestamp.to_rfc3339())
        .replace("{{tableId}}", &cx.table_id)
        .replace("{{collectionName}}", &cx.collection_name)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn context() -> EventContext {
        EventContext {
            event_type: "cellChange".to_string(),
            event_data: json!({"key": "name", "value": "Alice"}),
            table_id: "data_table".to_string(),
            collection_name: "people".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_substitutes_all_placeholders() {
        let cx = context();
        let out = substitute(
            r#"{"event":"{{eventType}}","data":{{eventData}},"table":"{{tableId}}","collection":"{{collectionName}}","at":"{{timestamp}}"}"#,
            &cx,
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["event"], "cellChange");
        assert_eq!(parsed["data"]["value"], "Alice");
        assert_eq!(parsed["table"], "data_table");
        assert_eq!(parsed["collection"], "people");
        assert_eq!(parsed["at"], cx.timestamp.to_rfc3339());
    }

    #[test]
    fn test_unknown_placeholders_pass_through() {
        let out = substitute("{{mystery}} {{eventType}}", &context());
        assert_eq!(out, "{{mystery}} cellChange");
    }
}
