//! Agreement check between local and remote state.

use serde_json::Value;

/// Fields probed when comparing row data against a controller response.
const VALIDATION_FIELDS: [&str; 3] = ["id", "name", "email"];

/// Result of the post-controller validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Local and remote state agree (or nothing was comparable).
    Valid,
    /// A comparable field disagreed. Reported, never rolled back.
    Mismatch {
        /// The field that disagreed.
        field: String,
        /// The local value, as text.
        local: String,
        /// The remote value, as text.
        remote: String,
    },
    /// No controller ran, so nothing was validated.
    Skipped,
}

impl ValidationOutcome {
    /// Returns `true` unless a mismatch was found.
    pub fn is_valid(&self) -> bool {
        !matches!(self, ValidationOutcome::Mismatch { .. })
    }
}

/// Compare the controller response against local state.
///
/// This is a deliberate heuristic, not a deep diff:
/// 1. When both the handler result and the controller result carry an
///    `id`, equality of those ids decides the outcome.
/// 2. Otherwise, when the event payload carries row data and the
///    controller result carries a `data` object, any probed field
///    (`id`, `name`, `email`) present on both sides and equal validates;
///    probed fields present on both sides but all unequal is a mismatch.
/// 3. Otherwise the outcome defaults to valid.
pub fn validate(
    event_data: &Value,
    handler: Option<&Value>,
    controller: Option<&Value>,
) -> ValidationOutcome {
    let Some(controller) = controller else {
        return ValidationOutcome::Skipped;
    };

    if let (Some(handler_id), Some(controller_id)) = (
        handler.and_then(|h| h.get("id")),
        controller.get("id"),
    ) {
        return if scalar_eq(handler_id, controller_id) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Mismatch {
                field: "id".to_string(),
                local: scalar_text(handler_id),
                remote: scalar_text(controller_id),
            }
        };
    }

    let local = local_row(event_data);
    let remote = controller.get("data").and_then(Value::as_object);
    if let (Some(local), Some(remote)) = (local, remote) {
        let mut first_mismatch: Option<ValidationOutcome> = None;
        for field in VALIDATION_FIELDS {
            let (Some(local_value), Some(remote_value)) = (local.get(field), remote.get(field))
            else {
                continue;
            };
            if scalar_eq(local_value, remote_value) {
                return ValidationOutcome::Valid;
            }
            first_mismatch.get_or_insert_with(|| ValidationOutcome::Mismatch {
                field: field.to_string(),
                local: scalar_text(local_value),
                remote: scalar_text(remote_value),
            });
        }
        if let Some(mismatch) = first_mismatch {
            return mismatch;
        }
    }

    ValidationOutcome::Valid
}

/// The row-shaped object inside an event payload, when one exists.
fn local_row(event_data: &Value) -> Option<&serde_json::Map<String, Value>> {
    if let Some(rows) = event_data.get("rows").and_then(Value::as_array) {
        return rows.first().and_then(Value::as_object);
    }
    if let Some(row) = event_data.get("row").and_then(Value::as_object) {
        return Some(row);
    }
    event_data.as_object()
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    // Tolerate string/number representation drift across services.
    a == b || scalar_text(a) == scalar_text(b)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
