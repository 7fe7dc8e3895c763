use tabledom::{to_html, Element};

#[test]
fn test_serialization_is_stable() {
    let build = || {
        Element::new("table")
            .attr("data-dynamic", "true")
            .child(Element::new("tbody").child(
                Element::new("tr").child(Element::with_text("td", "x")),
            ))
    };
    // Node ids differ between the two trees; the HTML must not.
    assert_eq!(to_html(&build()), to_html(&build()));
}

#[test]
fn test_nested_structure() {
    let el = Element::new("td")
        .attr("data-key", "name")
        .child(Element::new("input").attr("value", "Alice"));
    assert_eq!(
        to_html(&el),
        "<td data-key=\"name\"><input value=\"Alice\" /></td>"
    );
}

#[test]
fn test_empty_element() {
    assert_eq!(to_html(&Element::new("tbody")), "<tbody></tbody>");
}
