use tabledom::{Content, Element};

fn sample_table() -> Element {
    Element::new("table")
        .attr("id", "t1")
        .child(
            Element::new("thead").child(
                Element::new("tr")
                    .child(Element::with_text("th", "name").attr("data-key", "name")),
            ),
        )
        .child(
            Element::new("tbody").child(
                Element::new("tr")
                    .attr("data-row", "0")
                    .child(Element::with_text("td", "Alice").attr("data-key", "name")),
            ),
        )
}

#[test]
fn test_attr_replaces_existing_value() {
    let mut el = Element::new("td").attr("class", "a");
    el.set_attr("class", "b");
    assert_eq!(el.get_attr("class"), Some("b"));
    assert_eq!(el.attributes.len(), 1);
}

#[test]
fn test_child_replaces_text_content() {
    let el = Element::with_text("td", "x").child(Element::new("input"));
    assert_eq!(el.child_elements().len(), 1);
    assert!(matches!(el.content, Content::Children(_)));
}

#[test]
fn test_find_by_tag_depth_first() {
    let table = sample_table();
    let tr = table.find_by_tag("tr").unwrap();
    // The thead row comes first in tree order.
    assert!(!tr.has_attr("data-row"));
    assert_eq!(table.find_all_by_tag("tr").len(), 2);
}

#[test]
fn test_find_by_attr() {
    let table = sample_table();
    let row = table.find_by_attr("data-row", "0").unwrap();
    assert_eq!(row.tag, "tr");
}

#[test]
fn test_text_content_concatenates_descendants() {
    let table = sample_table();
    assert_eq!(table.text_content(), "nameAlice");
}

#[test]
fn test_replace_section_swaps_only_target() {
    let mut table = sample_table();
    let before_thead = table.find_by_tag("thead").unwrap().clone();

    let new_body = Element::new("tbody").child(
        Element::new("tr")
            .attr("data-row", "0")
            .child(Element::with_text("td", "Bob").attr("data-key", "name")),
    );
    table.replace_section("tbody", new_body);

    assert_eq!(table.find_by_tag("thead").unwrap(), &before_thead);
    assert_eq!(
        table.find_by_tag("tbody").unwrap().text_content(),
        "Bob"
    );
    assert_eq!(table.child_elements().len(), 2);
}

#[test]
fn test_replace_section_appends_when_missing() {
    let mut el = Element::new("table");
    el.replace_section("tbody", Element::new("tbody"));
    assert_eq!(el.child_elements().len(), 1);
    assert_eq!(el.child_elements()[0].tag, "tbody");
}

#[test]
fn test_descendants_order() {
    let table = sample_table();
    let tags: Vec<&str> = table.descendants().map(|el| el.tag.as_str()).collect();
    assert_eq!(tags, ["table", "thead", "tr", "th", "tbody", "tr", "td"]);
}
