//! Top-level error type

use super::IdentityError;
use super::ImportError;
use super::StorageError;
use super::WorkerError;

/// Errors surfaced by the table façade.
///
/// Structural preconditions (a missing mount point, an exhausted identity
/// allocator) fail construction outright. Everything else is recoverable
/// and scoped to the operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The named mount point does not exist in the document.
    #[error("no element found with id: {0}")]
    MissingElement(String),

    /// Row identity allocation failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// JSON import failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A worker operation failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
