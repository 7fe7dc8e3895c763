//! JSON import errors

/// Errors from parsing imported JSON.
///
/// Import errors are recoverable: the table model is left untouched and
/// the failure is reported through the import status.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    /// The text did not parse as JSON, even after lenient repair.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// The text parsed, but not to an array of objects.
    #[error("expected a JSON array of objects: {0}")]
    NotRowArray(String),
}
