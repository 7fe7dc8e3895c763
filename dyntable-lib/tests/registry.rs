mod common;

use std::sync::Arc;
use std::time::Duration;

use dyntable_lib::console::TaskLog;
use dyntable_lib::error::WorkerError;
use dyntable_lib::event::EventKind;
use dyntable_lib::http::Method;
use dyntable_lib::model::{Row, TableOptions};
use dyntable_lib::worker::{
    ControllerConfig, HandlerConfig, Worker, WorkerExecutor, WorkerKind,
};
use dyntable_lib::DynamicTable;
use tabledom::{Document, Element};

use common::MockTransport;

fn attach() -> DynamicTable {
    let mut doc = Document::new();
    doc.insert("data_table", Element::new("table"));
    DynamicTable::attach(
        &doc,
        "data_table",
        vec![Row::new().set("name", "Alice")],
        TableOptions::default().collection_name("people"),
    )
    .unwrap()
}

fn api_worker() -> Worker {
    Worker::new(
        "sync",
        WorkerKind::Api {
            handler: Some(HandlerConfig::new(Method::Post, "https://api.example/rows")),
            controller: None,
        },
    )
    .trigger(EventKind::CellChange)
}

/// Let spawned worker executions finish under the paused clock.
async fn drain() {
    tokio::time::sleep(Duration::from_secs(60)).await;
}

#[tokio::test(start_paused = true)]
async fn test_disabled_worker_never_fires() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    registry.save(api_worker().enabled(false)).unwrap();
    table.notify_cell_change(0, "name", "Alicia");
    drain().await;

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_enabled_worker_fires_on_trigger_only() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    registry.save(api_worker()).unwrap();
    table.notify_cell_blur(0, "name", "Alicia"); // not a trigger
    table.notify_cell_change(0, "name", "Alicia"); // trigger
    drain().await;

    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reenabling_applies_to_subsequent_publishes_only() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    let worker = api_worker();
    let id = worker.id;
    registry.save(worker).unwrap();

    assert!(registry.set_enabled(id, false));
    table.notify_cell_change(0, "name", "one");
    drain().await;
    assert_eq!(transport.request_count(), 0);

    assert!(registry.set_enabled(id, true));
    table.notify_cell_change(0, "name", "two");
    drain().await;
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deleted_worker_is_unsubscribed() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    let worker = api_worker();
    let id = worker.id;
    registry.save(worker).unwrap();
    assert!(registry.delete(id));
    assert!(!registry.delete(id));

    table.notify_cell_change(0, "name", "Alicia");
    drain().await;
    assert_eq!(transport.request_count(), 0);
    assert!(registry.workers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_save_rejects_invalid_endpoint() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    let worker = Worker::new(
        "broken",
        WorkerKind::Api {
            handler: Some(HandlerConfig::new(Method::Post, "not a url")),
            controller: Some(ControllerConfig::new(Method::Get, "https://api.example/v")),
        },
    )
    .trigger(EventKind::CellChange);

    let err = registry.save(worker).unwrap_err();
    assert!(matches!(err, WorkerError::InvalidUrl(_)));
    assert!(registry.workers().is_empty());

    table.notify_cell_change(0, "name", "Alicia");
    drain().await;
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_worker_templates_see_renamed_collection() {
    let mut table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    let worker = Worker::new(
        "sync",
        WorkerKind::Api {
            handler: Some(
                HandlerConfig::new(Method::Post, "https://api.example/rows")
                    .body_template(r#"{"collection":"{{collectionName}}"}"#),
            ),
            controller: None,
        },
    )
    .trigger(EventKind::TabChanged);
    registry.save(worker).unwrap();

    table.set_collection_name("renamed");
    table.change_tab("workers");
    drain().await;

    let body: serde_json::Value =
        serde_json::from_str(transport.request(0).body.as_deref().unwrap()).unwrap();
    assert_eq!(body["collection"], "renamed");
}

#[tokio::test(start_paused = true)]
async fn test_save_emits_worker_events() {
    let table = attach();
    let transport = MockTransport::ok();
    let tasks = TaskLog::new(table.bus(), table.id());
    let registry = table.workers(Arc::new(WorkerExecutor::new(transport.clone(), tasks)));

    let kinds = Arc::new(std::sync::Mutex::new(Vec::new()));
    for kind in [
        EventKind::WorkerSaved,
        EventKind::WorkerToggled,
        EventKind::WorkerDeleted,
    ] {
        let kinds = kinds.clone();
        table.bus().subscribe(kind, move |event| {
            kinds.lock().unwrap().push(event.kind());
        });
    }

    let worker = api_worker();
    let id = worker.id;
    registry.save(worker).unwrap();
    registry.set_enabled(id, false);
    registry.delete(id);

    assert_eq!(
        *kinds.lock().unwrap(),
        [
            EventKind::WorkerSaved,
            EventKind::WorkerToggled,
            EventKind::WorkerDeleted
        ]
    );
}
