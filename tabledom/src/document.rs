//! Mount-point registry.

use std::collections::HashMap;

use crate::element::Element;

/// A registry of top-level mount points, keyed by their `id` attribute.
///
/// Components that attach to a named element consult the document first and
/// fail construction when the mount point is missing, instead of assuming
/// it exists.
#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mount point under the given id. The element's `id`
    /// attribute is set to match. Replacing an existing mount point is
    /// allowed but logged.
    pub fn insert(&mut self, id: impl Into<String>, mut element: Element) {
        let id = id.into();
        element.set_attr("id", id.clone());
        if self.elements.insert(id.clone(), element).is_some() {
            log::warn!("document: replaced existing mount point '{id}'");
        }
    }

    /// Look up a mount point by id.
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Look up a mount point mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Remove a mount point, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.elements.remove(id)
    }

    /// Returns `true` if a mount point with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of registered mount points.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no mount points are registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
