use std::sync::Arc;
use std::sync::Mutex;

use dyntable_lib::console::ConsoleLog;
use dyntable_lib::event::{EventBus, EventKind, TableEvent, TableId};
use dyntable_lib::model::{Row, SelectionMode, TableOptions};
use dyntable_lib::DynamicTable;
use tabledom::{Document, Element};

fn attach(rows: Vec<Row>, options: TableOptions) -> DynamicTable {
    let mut doc = Document::new();
    doc.insert("data_table", Element::new("table"));
    DynamicTable::attach(&doc, "data_table", rows, options).unwrap()
}

fn people() -> Vec<Row> {
    vec![
        Row::new().set("name", "Alice"),
        Row::new().set("name", "Bob"),
    ]
}

#[test]
fn test_publish_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let order = order.clone();
        bus.subscribe(EventKind::TabChanged, move |_| {
            order.lock().unwrap().push(label);
        });
    }

    bus.publish(&TableEvent::TabChanged {
        table: TableId::next(),
        tab: "main".to_string(),
    });
    assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let bus = EventBus::new();
    let count = Arc::new(Mutex::new(0));

    let sub = {
        let count = count.clone();
        bus.subscribe(EventKind::TabChanged, move |_| {
            *count.lock().unwrap() += 1;
        })
    };

    let event = TableEvent::TabChanged {
        table: TableId::next(),
        tab: "main".to_string(),
    };
    bus.publish(&event);
    assert!(bus.unsubscribe(sub));
    assert!(!bus.unsubscribe(sub));
    bus.publish(&event);

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn test_subscribers_only_see_their_kind() {
    let bus = EventBus::new();
    let count = Arc::new(Mutex::new(0));
    {
        let count = count.clone();
        bus.subscribe(EventKind::CellChange, move |_| {
            *count.lock().unwrap() += 1;
        });
    }

    bus.publish(&TableEvent::TabChanged {
        table: TableId::next(),
        tab: "main".to_string(),
    });
    assert_eq!(*count.lock().unwrap(), 0);
}

#[test]
fn test_import_emits_data_change_with_source() {
    let mut table = attach(Vec::new(), TableOptions::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        table.bus().subscribe(EventKind::DataChange, move |event| {
            seen.lock().unwrap().push(event.to_json());
        });
    }

    assert_eq!(table.load_json(r#"[{"a":1}]"#).message, "(parsed)");
    assert_eq!(
        table.load_json("[{a:1,b:'x'}]").message,
        "(converted, parsed)"
    );
    let failed = table.load_json("not json");
    assert_eq!(failed.message, "(failed)");
    assert!(!failed.ok);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2, "failed import must not emit dataChange");
    assert_eq!(seen[0]["source"], "json");
    assert_eq!(seen[1]["source"], "json-converted");
}

#[test]
fn test_failed_import_leaves_model_unchanged() {
    let mut table = attach(people(), TableOptions::default());
    table.load_json("not json");
    assert_eq!(table.model().len(), 2);
    assert_eq!(table.model().headers(), ["name"]);
}

#[test]
fn test_delete_emits_captured_identity() {
    let mut table = attach(people(), TableOptions::default());
    let deleted_id = table.model().rows()[0].id("_rid").unwrap().to_string();

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        table.bus().subscribe(EventKind::RowDeleted, move |event| {
            seen.lock().unwrap().push(event.to_json());
        });
    }

    table.delete_row(0).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["row"]["id"], deleted_id.as_str());
    assert_eq!(seen[0]["row"]["index"], 0);
}

#[test]
fn test_selection_events() {
    let mut table = attach(
        people(),
        TableOptions::default().select_mode(SelectionMode::Multi),
    );
    let kinds = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::RowSelected, EventKind::SelectionChanged] {
        let kinds = kinds.clone();
        table.bus().subscribe(kind, move |event| {
            kinds.lock().unwrap().push(event.kind());
        });
    }

    table.toggle_select(0, true).unwrap();
    assert_eq!(
        *kinds.lock().unwrap(),
        [EventKind::RowSelected, EventKind::SelectionChanged]
    );
    assert_eq!(table.selected_ids().len(), 1);
}

#[test]
fn test_row_sheet_events_keep_single_sheet() {
    let mut table = attach(people(), TableOptions::default());
    let kinds = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::RowSheetOpened, EventKind::RowSheetClosed] {
        let kinds = kinds.clone();
        table.bus().subscribe(kind, move |event| {
            kinds.lock().unwrap().push(event.kind());
        });
    }

    table.open_row_sheet(0).unwrap();
    table.open_row_sheet(1).unwrap();
    assert_eq!(
        *kinds.lock().unwrap(),
        [
            EventKind::RowSheetOpened,
            EventKind::RowSheetClosed,
            EventKind::RowSheetOpened
        ]
    );
}

#[test]
fn test_console_log_records_every_event() {
    let mut table = attach(Vec::new(), TableOptions::default());
    let console = ConsoleLog::new();
    console.attach(table.bus());

    table.load_json(r#"[{"name":"Alice"}]"#);
    table.set_collection_name("people");
    table.change_tab("workers");

    let events: Vec<EventKind> = console.entries().iter().map(|e| e.event).collect();
    assert!(events.contains(&EventKind::TableRender));
    assert!(events.contains(&EventKind::DataChange));
    assert!(events.contains(&EventKind::CollectionNameChange));
    assert!(events.contains(&EventKind::TabChanged));
}

#[test]
fn test_cell_notifications_carry_row_handles() {
    let table = attach(people(), TableOptions::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::CellChange, EventKind::CellBlur] {
        let seen = seen.clone();
        table.bus().subscribe(kind, move |event| {
            seen.lock().unwrap().push(event.to_json());
        });
    }

    table.notify_cell_change(1, "name", "Bobby");
    table.notify_cell_blur(1, "name", "Bobby");
    // Out-of-bounds notifications are dropped.
    table.notify_cell_change(9, "name", "ghost");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["row"]["index"], 1);
    assert_eq!(seen[0]["value"], "Bobby");
}
