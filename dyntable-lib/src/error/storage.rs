//! Storage errors

/// Errors from the key-value storage façade.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// No data is stored under the given collection key.
    #[error("no data stored under collection: {0}")]
    Missing(String),

    /// Stored data could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialize(String),
}
