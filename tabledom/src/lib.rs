//! Headless DOM for table-shaped UIs.
//!
//! `tabledom` models an HTML-like element tree without a browser: elements
//! carry a tag name, attributes and either text or child content. The tree
//! can be queried, mutated section-by-section and serialized to HTML. It is
//! the projection target for the dynamic-table renderer.

pub mod document;
pub mod element;
pub mod render;

pub use document::Document;
pub use element::{find_node, Content, Element};
pub use render::to_html;
