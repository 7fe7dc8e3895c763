//! HTTP transport errors

/// Errors from the HTTP transport layer.
///
/// Transports carry their own error detail as text so that alternative
/// implementations (including test doubles) can produce them freely.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The request was malformed before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
