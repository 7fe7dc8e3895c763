//! Error types

mod engine;
mod identity;
mod import;
mod storage;
mod transport;
mod worker;

pub use engine::*;
pub use identity::*;
pub use import::*;
pub use storage::*;
pub use transport::*;
pub use worker::*;
