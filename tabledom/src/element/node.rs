use std::sync::atomic::{AtomicU64, Ordering};

use super::Content;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_node_id(tag: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{tag}-{id}")
}

/// A node in the headless DOM tree.
///
/// Elements are plain data: a tag name, an ordered attribute list and
/// either text or child content. The `node_id` is an internal handle for
/// debugging and tree lookup; it is never serialized. HTML identity lives
/// in the regular `id` attribute like everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Internal node handle, unique per process.
    pub node_id: String,
    /// Tag name, e.g. `table`, `tr`, `input`.
    pub tag: String,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    /// Text or child content.
    pub content: Content,
}

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            node_id: generate_node_id(&tag),
            tag,
            attributes: Vec::new(),
            content: Content::None,
        }
    }

    /// Create an element holding a text run.
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).text(text)
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Set an attribute, replacing any existing value for the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set the text content, discarding any children.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }

    /// Append several child elements.
    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        for child in new_children {
            self.push_child(child);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Set an attribute in place, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Append a child in place. Text content is replaced by child content.
    pub fn push_child(&mut self, child: Element) {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => self.content = Content::Children(vec![child]),
        }
    }

    /// Replace the first direct child with the given tag, or append the new
    /// node when no such child exists. Siblings are left untouched.
    pub fn replace_section(&mut self, tag: &str, new_node: Element) {
        if let Content::Children(children) = &mut self.content {
            if let Some(slot) = children.iter_mut().find(|c| c.tag == tag) {
                *slot = new_node;
                return;
            }
            children.push(new_node);
        } else {
            self.content = Content::Children(vec![new_node]);
        }
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Get an attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Direct children, or an empty slice for text/empty content.
    pub fn child_elements(&self) -> &[Element] {
        match &self.content {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        match &self.content {
            Content::None => String::new(),
            Content::Text(text) => text.clone(),
            Content::Children(children) => {
                children.iter().map(Element::text_content).collect()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Depth-first iterator over this element and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First descendant (excluding self) with the given tag, depth-first.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Element> {
        self.descendants().skip(1).find(|el| el.tag == tag)
    }

    /// All descendants (excluding self) with the given tag, in tree order.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Element> {
        self.descendants()
            .skip(1)
            .filter(|el| el.tag == tag)
            .collect()
    }

    /// First element in the subtree (including self) carrying the given
    /// attribute value.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Element> {
        self.descendants()
            .find(|el| el.get_attr(name) == Some(value))
    }
}

/// Depth-first traversal over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        if let Content::Children(children) = &next.content {
            // Reverse so the first child is visited first.
            for child in children.iter().rev() {
                self.stack.push(child);
            }
        }
        Some(next)
    }
}
