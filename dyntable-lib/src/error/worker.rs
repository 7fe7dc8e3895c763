//! Worker execution errors

use std::time::Duration;

use super::TransportError;

/// Errors from worker execution.
///
/// Worker errors never escape a single execution: they are logged,
/// recorded on the task history, and other workers are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A non-success HTTP response.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The handler phase failed; the controller phase was skipped.
    #[error("handler request failed: {0}")]
    Handler(#[source] Box<WorkerError>),

    /// The controller phase exhausted its retry budget.
    #[error("controller failed after {attempts} attempt(s): {last}")]
    Controller {
        /// Attempts made before giving up.
        attempts: u32,
        /// The error from the final attempt.
        last: Box<WorkerError>,
    },

    /// Transport-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A single attempt exceeded its timeout and was aborted.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// A configured endpoint is not a valid URL.
    #[error("invalid worker endpoint: {0}")]
    InvalidUrl(String),

    /// Storage-kind execution had no storage backend configured.
    #[error("no storage backend configured for storage worker")]
    NoStorage,
}
