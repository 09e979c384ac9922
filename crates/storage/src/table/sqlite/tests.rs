use super::*;
use crate::table::{
    AttributePath, AttributeValue, BillingMode, Condition, Filter, IndexDefinition, IndexScope,
    Key, KeyCondition, KeySchema, Projection, SetAction, SseSpecification,
};

const TABLE: &str = "things";

fn definition() -> CreateTableRequest {
    CreateTableRequest {
        table_name: TABLE.to_string(),
        attribute_definitions: vec!["pk".to_string(), "sk".to_string(), "tag".to_string()],
        key: KeySchema::composite("pk", "sk"),
        indexes: vec![
            IndexDefinition {
                name: "ByTag".to_string(),
                scope: IndexScope::Global,
                key: KeySchema::hash("tag"),
                projection: Projection::All,
            },
            IndexDefinition {
                name: "ByPkAndTag".to_string(),
                scope: IndexScope::Local,
                key: KeySchema::composite("pk", "tag"),
                projection: Projection::KeysOnly,
            },
        ],
        billing_mode: BillingMode::PayPerRequest,
        sse: SseSpecification {
            enabled: true,
            key_ref: Some("key/local".to_string()),
        },
    }
}

fn table() -> SqliteTable {
    let table = SqliteTable::open_in_memory().expect("in-memory table opens");
    table
        .create_table(&definition())
        .expect("table definition is valid");
    table
}

fn item(pk: &str, sk: &str, tag: Option<&str>) -> Item {
    let mut item = Item::new();
    item.insert("pk".to_string(), AttributeValue::S(pk.to_string()));
    item.insert("sk".to_string(), AttributeValue::S(sk.to_string()));
    if let Some(tag) = tag {
        item.insert("tag".to_string(), AttributeValue::S(tag.to_string()));
    }
    item
}

fn put(table: &SqliteTable, item: Item, condition: Option<Condition>) -> Result<(), TableError> {
    table.put_item(PutItem {
        table_name: TABLE.to_string(),
        item,
        condition,
    })
}

#[test]
fn describe_reports_missing_table_as_not_found() {
    let table = SqliteTable::open_in_memory().expect("in-memory table opens");
    let err = table.describe_table(TABLE).unwrap_err();
    assert!(err.is_table_not_found());
}

#[test]
fn create_table_records_definition_and_rejects_recreate() {
    let table = table();
    let description = table.describe_table(TABLE).expect("table exists");
    assert_eq!(description.definition, definition());
    assert_eq!(description.definition.billing_mode, BillingMode::PayPerRequest);
    assert_eq!(
        description.definition.sse.key_ref.as_deref(),
        Some("key/local")
    );

    let err = table.create_table(&definition()).unwrap_err();
    assert!(matches!(err, TableError::ResourceInUse(name) if name == TABLE));
}

#[test]
fn local_index_must_share_table_hash_key() {
    let table = SqliteTable::open_in_memory().expect("in-memory table opens");
    let mut request = definition();
    request.indexes[1].key = KeySchema::composite("tag", "sk");
    let err = table.create_table(&request).unwrap_err();
    assert!(matches!(err, TableError::Validation(message) if message.contains("local index")));
}

#[test]
fn key_absent_condition_rejects_second_put() {
    let table = table();
    put(&table, item("a", "1", None), Some(Condition::KeyAbsent)).expect("first put succeeds");
    let err = put(&table, item("a", "1", Some("x")), Some(Condition::KeyAbsent)).unwrap_err();
    assert!(err.is_conditional_check_failed());

    let stored = table
        .get_item(GetItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            consistent_read: true,
        })
        .expect("get succeeds")
        .item
        .expect("item exists");
    assert!(!stored.contains_key("tag"));
}

#[test]
fn key_exists_condition_blocks_upsert_and_delete_of_missing_item() {
    let table = table();
    let err = table
        .update_item(UpdateItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            set: vec![SetAction {
                path: AttributePath::top("note"),
                value: AttributeValue::S("hello".to_string()),
            }],
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::AllNew,
        })
        .unwrap_err();
    assert!(err.is_conditional_check_failed());

    let err = table
        .delete_item(DeleteItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            condition: Some(Condition::KeyExists),
        })
        .unwrap_err();
    assert!(err.is_conditional_check_failed());

    let output = table
        .get_item(GetItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            consistent_read: true,
        })
        .expect("get succeeds");
    assert_eq!(output.item, None);
}

#[test]
fn indexes_are_sparse_and_follow_updates() {
    let table = table();
    put(&table, item("a", "1", Some("red")), None).expect("put");
    put(&table, item("a", "2", None), None).expect("put");

    let query = Query::on_index(TABLE, "ByTag", KeyCondition::hash("red"));
    let output = table.query(query.clone()).expect("query");
    assert_eq!(output.items.expect("items").len(), 1);

    table
        .update_item(UpdateItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            set: vec![SetAction {
                path: AttributePath::top("tag"),
                value: AttributeValue::S("blue".to_string()),
            }],
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::None,
        })
        .expect("update");

    let output = table.query(query).expect("query");
    assert!(output.items.expect("items").is_empty());
    let output = table
        .query(Query::on_index(TABLE, "ByTag", KeyCondition::hash("blue")))
        .expect("query");
    assert_eq!(output.items.expect("items").len(), 1);
}

#[test]
fn keys_only_projection_drops_other_attributes() {
    let table = table();
    let mut stored = item("a", "1", Some("red"));
    stored.insert("note".to_string(), AttributeValue::S("hi".to_string()));
    put(&table, stored, None).expect("put");

    let output = table
        .query(Query::on_index(
            TABLE,
            "ByPkAndTag",
            KeyCondition::hash_and_range("a", "red"),
        ))
        .expect("query");
    let items = output.items.expect("items");
    assert_eq!(items.len(), 1);
    assert!(!items[0].contains_key("note"));
    assert!(items[0].contains_key("tag"));
}

#[test]
fn query_pages_through_every_item() {
    let table = table().with_page_size(2);
    for sk in ["1", "2", "3", "4", "5"] {
        put(&table, item("a", sk, Some("red")), None).expect("put");
    }

    let mut query = Query::on_index(TABLE, "ByTag", KeyCondition::hash("red"));
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let output = table.query(query.clone()).expect("query");
        pages += 1;
        for item in output.items.expect("items") {
            seen.push(item["sk"].as_s().expect("sk is S").to_string());
        }
        match output.last_evaluated_key {
            Some(key) => query.exclusive_start_key = Some(key),
            None => break,
        }
    }
    assert_eq!(seen, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(pages, 3);
}

#[test]
fn filters_apply_after_the_page_is_read() {
    let table = table();
    for sk in ["apple", "banana", "grape"] {
        let mut stored = item("a", sk, Some("fruit"));
        stored.insert("name".to_string(), AttributeValue::S(sk.to_string()));
        put(&table, stored, None).expect("put");
    }

    let output = table
        .query(
            Query::on_index(TABLE, "ByTag", KeyCondition::hash("fruit"))
                .with_filter(Filter::Contains {
                    attribute: "name".to_string(),
                    value: "ap".to_string(),
                })
                .with_limit(2),
        )
        .expect("query");
    assert_eq!(output.scanned_count, 2);
    assert_eq!(output.items.expect("items").len(), 1);
    assert!(output.last_evaluated_key.is_some());
}

#[test]
fn nested_set_requires_an_existing_map() {
    let table = table();
    put(&table, item("a", "1", None), None).expect("put");
    let err = table
        .update_item(UpdateItem {
            table_name: TABLE.to_string(),
            key: Key::new("a", "1"),
            set: vec![SetAction {
                path: AttributePath::nested("columns", "x"),
                value: AttributeValue::S("y".to_string()),
            }],
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::AllNew,
        })
        .unwrap_err();
    assert!(matches!(err, TableError::Validation(message) if message.contains("document path")));
}

#[test]
fn empty_sets_and_empty_key_strings_are_rejected() {
    let table = table();
    let mut stored = item("a", "1", None);
    stored.insert("set".to_string(), AttributeValue::SS(Vec::new()));
    let err = put(&table, stored, None).unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));

    let err = put(&table, item("a", "1", Some("")), None).unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));

    let err = table
        .query(Query::on_index(TABLE, "ByTag", KeyCondition::hash("")))
        .unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));
}

#[test]
fn unknown_index_is_reported() {
    let table = table();
    let err = table
        .query(Query::on_index(TABLE, "Missing", KeyCondition::hash("x")))
        .unwrap_err();
    assert!(matches!(err, TableError::IndexNotFound { index, .. } if index == "Missing"));
}

#[test]
fn file_backed_table_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let table = SqliteTable::open(dir.path()).expect("open");
        table.create_table(&definition()).expect("create");
        put(&table, item("a", "1", Some("red")), None).expect("put");
    }
    let table = SqliteTable::open(dir.path()).expect("reopen");
    assert_eq!(table.storage_dir(), Some(dir.path()));
    let output = table
        .query(Query::on_index(TABLE, "ByTag", KeyCondition::hash("red")))
        .expect("query");
    assert_eq!(output.items.expect("items").len(), 1);
}
