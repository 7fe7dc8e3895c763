//! End-to-end wiring: table, console log, storage worker.
//!
//! Run with: cargo run --example table_demo

use std::sync::Arc;
use std::time::Duration;

use dyntable_lib::console::{ConsoleLog, TaskLog};
use dyntable_lib::event::EventKind;
use dyntable_lib::http::ReqwestTransport;
use dyntable_lib::model::TableOptions;
use dyntable_lib::storage::{MemoryStorage, Storage};
use dyntable_lib::worker::{Worker, WorkerExecutor, WorkerKind};
use dyntable_lib::DynamicTable;
use tabledom::{Document, Element};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut doc = Document::new();
    doc.insert("data_table", Element::new("table"));

    let mut table = DynamicTable::attach(
        &doc,
        "data_table",
        Vec::new(),
        TableOptions::default().collection_name("people"),
    )
    .expect("mount point registered above");

    let console = ConsoleLog::new();
    console.attach(table.bus());

    let storage = Storage::new(Arc::new(MemoryStorage::new()));
    let tasks = TaskLog::new(table.bus(), table.id());
    let executor = Arc::new(
        WorkerExecutor::new(Arc::new(ReqwestTransport::new()), tasks)
            .with_storage(storage.clone()),
    );

    let registry = table.workers(executor);
    registry
        .save(
            Worker::new(
                "persist",
                WorkerKind::Storage {
                    storage_key: "people".to_string(),
                    format: "json".to_string(),
                },
            )
            .trigger(EventKind::DataChange),
        )
        .expect("storage worker has no endpoints to validate");

    // Lenient import: bare keys and single quotes get repaired.
    let status = table.load_json("[{name:'Alice', status:'active'}, {name:'Bob', status:'waiting'}]");
    println!("import: {}", status.message);
    println!("{}", table.html());

    // Let the fire-and-forget worker land its write.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "stored rows: {}",
        storage
            .get("people")
            .await
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );

    for entry in console.entries() {
        println!("[{}] {}", entry.timestamp.to_rfc3339(), entry.event);
    }
}
