//! HTTP transport abstraction
//!
//! Worker execution talks to endpoints through the [`HttpTransport`]
//! trait instead of a concrete client, so the whole pipeline runs headless
//! in tests. [`ReqwestTransport`] is the production implementation.

mod transport;

pub use transport::*;
