use dyntable_lib::model::{Row, SelectionMode, TableOptions, Value};
use dyntable_lib::render::{EditableMode, RenderOptions};
use dyntable_lib::DynamicTable;
use tabledom::{Document, Element};

fn document() -> Document {
    let mut doc = Document::new();
    doc.insert("data_table", Element::new("table"));
    doc
}

fn attach(rows: Vec<Row>, options: TableOptions) -> DynamicTable {
    DynamicTable::attach(&document(), "data_table", rows, options).unwrap()
}

fn people() -> Vec<Row> {
    vec![
        Row::new().set("name", "Alice").set("status", "active"),
        Row::new().set("name", "Bob").set("status", "waiting"),
    ]
}

#[test]
fn test_missing_mount_point_fails_construction() {
    let doc = Document::new();
    let err = DynamicTable::attach(&doc, "data_table", Vec::new(), TableOptions::default())
        .err()
        .expect("construction must fail");
    assert!(err.to_string().contains("data_table"));
}

#[test]
fn test_render_is_idempotent() {
    let mut table = attach(people(), TableOptions::default());
    let first = table.html();
    table.render();
    table.render();
    assert_eq!(table.html(), first);
}

#[test]
fn test_rerender_preserves_sibling_children() {
    let mut doc = document();
    doc.get_mut("data_table")
        .unwrap()
        .push_child(Element::new("caption").text("toolbar"));

    let mut table =
        DynamicTable::attach(&doc, "data_table", people(), TableOptions::default()).unwrap();
    table.render();

    let root = table.element();
    assert!(root.find_by_tag("caption").is_some());
    // Exactly one thead and one tbody regardless of render count.
    assert_eq!(root.find_all_by_tag("thead").len(), 1);
    assert_eq!(root.find_all_by_tag("tbody").len(), 1);
}

#[test]
fn test_identity_column_is_hidden_but_carried_on_rows() {
    let table = attach(people(), TableOptions::default());
    let html = table.html();
    assert!(!html.contains("_rid"));

    let tbody = table.element().find_by_tag("tbody").unwrap();
    for tr in tbody.child_elements() {
        let id = tr.get_attr("data-id").expect("row identity attribute");
        assert!(!id.is_empty());
    }
}

#[test]
fn test_action_column_is_last() {
    let table = attach(people(), TableOptions::default());
    let header_row = table
        .element()
        .find_by_tag("thead")
        .unwrap()
        .find_by_tag("tr")
        .unwrap();
    let last = header_row.child_elements().last().unwrap();
    assert_eq!(last.text_content(), "Action");

    let first_row = table
        .element()
        .find_by_tag("tbody")
        .unwrap()
        .child_elements()
        .first()
        .cloned()
        .unwrap();
    let action_cell = first_row.child_elements().last().unwrap();
    let button = action_cell.find_by_tag("button").unwrap();
    assert_eq!(button.get_attr("data-action"), Some("delete"));
}

#[test]
fn test_global_columns_prepended() {
    let options = TableOptions::default()
        .select_mode(SelectionMode::Multi)
        .render(
            RenderOptions::default()
                .show_index(true)
                .show_select(true)
                .show_checked(true),
        );
    let table = attach(people(), options);

    let header_row = table
        .element()
        .find_by_tag("thead")
        .unwrap()
        .find_by_tag("tr")
        .unwrap();
    let labels: Vec<String> = header_row
        .child_elements()
        .iter()
        .take(3)
        .map(Element::text_content)
        .collect();
    assert_eq!(labels, ["#", "Select", "Checked"]);
}

#[test]
fn test_checked_state_renders_checkbox() {
    let options =
        TableOptions::default().render(RenderOptions::default().show_checked(true));
    let mut table = attach(people(), options);
    table.toggle_checked(0, true).unwrap();

    let tbody = table.element().find_by_tag("tbody").unwrap();
    let first_row = &tbody.child_elements()[0];
    let checkbox = first_row.find_by_attr("data-check", "true").unwrap();
    assert_eq!(checkbox.get_attr("checked"), Some("checked"));

    let second_row = &tbody.child_elements()[1];
    let checkbox = second_row.find_by_attr("data-check", "true").unwrap();
    assert!(checkbox.get_attr("checked").is_none());
}

#[test]
fn test_input_mode_renders_inputs() {
    let options = TableOptions::default()
        .render(RenderOptions::default().editable_mode(EditableMode::Input));
    let table = attach(people(), options);

    let tbody = table.element().find_by_tag("tbody").unwrap();
    let inputs = tbody.find_all_by_tag("input");
    // Two data columns per row, two rows.
    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs[0].get_attr("value"), Some("Alice"));
    assert_eq!(inputs[0].get_attr("data-key"), Some("name"));
}

#[test]
fn test_cell_formatter_applies() {
    let options = TableOptions::default().render(
        RenderOptions::default().cell_formatter(|key, value| {
            if key == "status" {
                value.display_string().to_uppercase()
            } else {
                value.display_string()
            }
        }),
    );
    let table = attach(people(), options);
    assert!(table.html().contains("ACTIVE"));
    assert!(table.html().contains("Alice"));
}

#[test]
fn test_extract_round_trips_loaded_data() {
    for mode in [EditableMode::Cell, EditableMode::Input] {
        let options = TableOptions::default()
            .render(RenderOptions::default().editable_mode(mode));
        let mut table = attach(Vec::new(), options);
        let status = table.load_json(r#"[{"name":"Alice","status":"active"},{"name":"Bob","status":"waiting"}]"#);
        assert!(status.ok);

        let extracted = table.extract_table_data();
        assert_eq!(extracted.len(), 2);
        for (extracted_row, original) in extracted.iter().zip(table.model().rows()) {
            assert_eq!(
                extracted_row.id("_rid"),
                original.id("_rid"),
                "identity must survive the round trip"
            );
            for key in ["name", "status"] {
                assert_eq!(
                    extracted_row.get(key).unwrap().display_string(),
                    original.get(key).unwrap().display_string()
                );
            }
        }
    }
}

#[test]
fn test_extracted_values_are_trimmed_strings() {
    let mut table = attach(Vec::new(), TableOptions::default());
    table.load_json(r#"[{"count": 7}]"#);
    let extracted = table.extract_table_data();
    assert_eq!(extracted[0].get("count"), Some(&Value::String("7".into())));
}
