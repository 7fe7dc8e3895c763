//! HTML serialization.
//!
//! Projects an element tree into an HTML string. Output is a pure function
//! of the tree: identical trees serialize identically, which is what the
//! render-idempotency contract of consumers leans on.

use crate::element::{Content, Element};

/// Tags serialized without a closing tag.
const VOID_TAGS: [&str; 5] = ["input", "br", "hr", "img", "meta"];

/// Serialize an element subtree to HTML.
pub fn to_html(element: &Element) -> String {
    let mut out = String::new();
    write_element(element, &mut out);
    out
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    if VOID_TAGS.contains(&element.tag.as_str()) {
        out.push_str(" />");
        return;
    }

    out.push('>');
    match &element.content {
        Content::None => {}
        Content::Text(text) => out.push_str(&escape_text(text)),
        Content::Children(children) => {
            for child in children {
                write_element(child, out);
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() {
        let el = Element::new("td")
            .attr("data-key", "a\"b")
            .text("1 < 2 & 3");
        let html = to_html(&el);
        assert_eq!(html, "<td data-key=\"a&quot;b\">1 &lt; 2 &amp; 3</td>");
    }

    #[test]
    fn test_void_elements_self_close() {
        let el = Element::new("input").attr("value", "x");
        assert_eq!(to_html(&el), "<input value=\"x\" />");
    }
}
