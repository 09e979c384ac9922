#![forbid(unsafe_code)]

use schema_storage::table::{AttributeValue, Condition, Item, KeyTable, PutItem, SqliteTable};
use schema_storage::{ListRowsRequest, RowStore, StoreConfig};
use std::path::Path;
use std::sync::Barrier;

const HANDLES: usize = 6;

fn config() -> StoreConfig {
    StoreConfig::new("rows", "key/test")
}

fn open_handle(dir: &Path) -> RowStore<SqliteTable> {
    let table = SqliteTable::open(dir).expect("sqlite table opens");
    RowStore::open(table, config()).expect("store opens")
}

#[test]
fn handles_on_one_file_create_distinct_roots_without_failing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let first = open_handle(dir.path());
    let barrier = Barrier::new(HANDLES);

    let failures: Vec<String> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..HANDLES)
            .map(|handle| {
                let barrier = &barrier;
                let dir = dir.path();
                scope.spawn(move || {
                    let store = open_handle(dir);
                    barrier.wait();
                    let mut failures = Vec::new();
                    for i in 0..25 {
                        let label = format!("org-{handle}-{i}");
                        if let Err(err) = store.create_row("organization", &label) {
                            failures.push(format!("{label}: {}: {err}", err.code()));
                        }
                    }
                    failures
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().expect("worker thread"))
            .collect()
    });

    assert!(failures.is_empty(), "creates failed: {failures:?}");
    let rows = first
        .list_rows(ListRowsRequest::all("organization"))
        .expect("list");
    assert_eq!(rows.len(), HANDLES * 25);
}

#[test]
fn racing_puts_on_one_key_lose_on_the_condition() {
    let dir = tempfile::tempdir().expect("temp dir");
    open_handle(dir.path());
    let barrier = Barrier::new(HANDLES);

    let results: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..HANDLES)
            .map(|handle| {
                let barrier = &barrier;
                let dir = dir.path();
                scope.spawn(move || {
                    let table = SqliteTable::open(dir).expect("sqlite table opens");
                    let mut item = Item::new();
                    item.insert("type".to_string(), AttributeValue::S("organization".into()));
                    item.insert("id".to_string(), AttributeValue::S("organization_same".into()));
                    item.insert("label".to_string(), AttributeValue::S(format!("org-{handle}")));
                    barrier.wait();
                    table.put_item(PutItem {
                        table_name: "rows".to_string(),
                        item,
                        condition: Some(Condition::KeyAbsent),
                    })
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker thread"))
            .collect()
    });

    let won = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(won, 1);
    for result in results {
        if let Err(err) = result {
            assert!(err.is_conditional_check_failed(), "unexpected error: {err}");
        }
    }
}
