#![forbid(unsafe_code)]

use crate::table::{
    AttributeValue, Condition, CreateTableRequest, IndexDefinition, Item, Key, Projection,
    SetAction, TableError,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(super) fn key_of(definition: &CreateTableRequest, item: &Item) -> Result<Key, TableError> {
    let hash = required_key_value(item, &definition.key.hash)?;
    let range = match definition.key.range.as_deref() {
        Some(attribute) => required_key_value(item, attribute)?,
        None => String::new(),
    };
    Ok(Key { hash, range })
}

pub(super) fn validate_key(definition: &CreateTableRequest, key: &Key) -> Result<(), TableError> {
    if key.hash.is_empty() {
        return Err(invalid(format!(
            "key attribute {} must not be empty",
            definition.key.hash
        )));
    }
    match definition.key.range.as_deref() {
        Some(attribute) if key.range.is_empty() => Err(invalid(format!(
            "key attribute {attribute} must not be empty"
        ))),
        None if !key.range.is_empty() => Err(invalid("table has no range key")),
        _ => Ok(()),
    }
}

pub(super) fn key_item(definition: &CreateTableRequest, key: &Key) -> Item {
    let mut item = Item::new();
    item.insert(
        definition.key.hash.clone(),
        AttributeValue::S(key.hash.clone()),
    );
    if let Some(range) = definition.key.range.as_deref() {
        item.insert(range.to_string(), AttributeValue::S(key.range.clone()));
    }
    item
}

/// Key attributes must be non-empty strings wherever they appear, and sets
/// must be non-empty and duplicate-free.
pub(super) fn validate_item(
    definition: &CreateTableRequest,
    item: &Item,
) -> Result<(), TableError> {
    for attribute in &definition.attribute_definitions {
        match item.get(attribute) {
            None => {}
            Some(AttributeValue::S(value)) if !value.is_empty() => {}
            Some(AttributeValue::S(_)) => {
                return Err(invalid(format!(
                    "key attribute {attribute} must not be an empty string"
                )));
            }
            Some(other) => {
                return Err(invalid(format!(
                    "key attribute {attribute} must be S, got {}",
                    other.kind()
                )));
            }
        }
    }
    for value in item.values() {
        validate_value(value)?;
    }
    Ok(())
}

fn validate_value(value: &AttributeValue) -> Result<(), TableError> {
    match value {
        AttributeValue::SS(members) => {
            if members.is_empty() {
                return Err(invalid("string set must not be empty"));
            }
            let distinct: BTreeSet<&String> = members.iter().collect();
            if distinct.len() != members.len() {
                return Err(invalid("string set contains duplicates"));
            }
            Ok(())
        }
        AttributeValue::L(values) => values.iter().try_for_each(validate_value),
        AttributeValue::M(map) => map.values().try_for_each(validate_value),
        _ => Ok(()),
    }
}

pub(super) fn check_condition(
    condition: Option<Condition>,
    exists: bool,
    table_name: &str,
    key: &Key,
) -> Result<(), TableError> {
    let passed = match condition {
        None => true,
        Some(Condition::KeyAbsent) => !exists,
        Some(Condition::KeyExists) => exists,
    };
    if passed {
        Ok(())
    } else {
        Err(TableError::ConditionalCheckFailed {
            table: table_name.to_string(),
            hash: key.hash.clone(),
            range: key.range.clone(),
        })
    }
}

pub(super) fn apply_set(
    definition: &CreateTableRequest,
    item: &mut Item,
    action: SetAction,
) -> Result<(), TableError> {
    match action.path.segments() {
        [attribute] => {
            if definition.key.attributes().any(|key| key == attribute.as_str()) {
                return Err(invalid(format!("cannot update key attribute {attribute}")));
            }
            item.insert(attribute.clone(), action.value);
            Ok(())
        }
        [attribute, member] => match item.get_mut(attribute) {
            Some(AttributeValue::M(map)) => {
                map.insert(member.clone(), action.value);
                Ok(())
            }
            _ => Err(invalid(format!(
                "document path {attribute}.{member} is invalid for update"
            ))),
        },
        _ => Err(invalid("unsupported attribute path")),
    }
}

pub(super) fn load_item(
    conn: &Connection,
    table_name: &str,
    key: &Key,
) -> Result<Option<Item>, TableError> {
    let raw = conn
        .query_row(
            "SELECT item_json FROM items WHERE table_name=?1 AND hash_key=?2 AND range_key=?3",
            params![table_name, key.hash, key.range],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Writes the item and rebuilds its index entries. Callers hold a transaction
/// so the item and its entries change together.
pub(super) fn write_item(
    conn: &Connection,
    definition: &CreateTableRequest,
    key: &Key,
    item: &Item,
) -> Result<(), TableError> {
    conn.execute(
        "INSERT INTO items(table_name, hash_key, range_key, item_json) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(table_name, hash_key, range_key) DO UPDATE SET item_json=excluded.item_json",
        params![
            definition.table_name,
            key.hash,
            key.range,
            serde_json::to_string(item)?,
        ],
    )?;

    delete_index_entries(conn, &definition.table_name, key)?;
    for index in &definition.indexes {
        let Some((hash_value, range_value)) = index_key(index, item) else {
            continue;
        };
        conn.execute(
            "INSERT INTO index_entries(table_name, index_name, hash_value, range_value, item_hash, item_range) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                definition.table_name,
                index.name,
                hash_value,
                range_value,
                key.hash,
                key.range,
            ],
        )?;
    }
    Ok(())
}

pub(super) fn delete_item(
    conn: &Connection,
    table_name: &str,
    key: &Key,
) -> Result<(), TableError> {
    delete_index_entries(conn, table_name, key)?;
    conn.execute(
        "DELETE FROM items WHERE table_name=?1 AND hash_key=?2 AND range_key=?3",
        params![table_name, key.hash, key.range],
    )?;
    Ok(())
}

fn delete_index_entries(conn: &Connection, table_name: &str, key: &Key) -> Result<(), TableError> {
    conn.execute(
        "DELETE FROM index_entries WHERE table_name=?1 AND item_hash=?2 AND item_range=?3",
        params![table_name, key.hash, key.range],
    )?;
    Ok(())
}

/// Items lacking any index key attribute are left out of that index.
pub(super) fn index_key<'a>(index: &IndexDefinition, item: &'a Item) -> Option<(&'a str, &'a str)> {
    let hash = item.get(&index.key.hash)?.as_s()?;
    let range = match index.key.range.as_deref() {
        Some(attribute) => item.get(attribute)?.as_s()?,
        None => "",
    };
    Some((hash, range))
}

pub(super) fn project(
    definition: &CreateTableRequest,
    index: &IndexDefinition,
    item: Item,
) -> Item {
    match index.projection {
        Projection::All => item,
        Projection::KeysOnly => {
            let keys: BTreeSet<&str> = definition
                .key
                .attributes()
                .chain(index.key.attributes())
                .collect();
            item.into_iter()
                .filter(|(name, _)| keys.contains(name.as_str()))
                .collect()
        }
    }
}

/// The continuation key carries the table key and the index key of the last
/// evaluated item.
pub(super) fn continuation_key(
    definition: &CreateTableRequest,
    index: &IndexDefinition,
    item: &Item,
) -> Item {
    definition
        .key
        .attributes()
        .chain(index.key.attributes())
        .filter_map(|name| item.get(name).map(|value| (name.to_string(), value.clone())))
        .collect()
}

pub(super) fn continuation_position(
    definition: &CreateTableRequest,
    index: &IndexDefinition,
    start: &Item,
) -> Result<(String, String, String), TableError> {
    let range_value = match index.key.range.as_deref() {
        Some(attribute) => required_key_value(start, attribute)?,
        None => String::new(),
    };
    let key = key_of(definition, start)?;
    Ok((range_value, key.hash, key.range))
}

fn required_key_value(item: &Item, attribute: &str) -> Result<String, TableError> {
    match item.get(attribute) {
        Some(AttributeValue::S(value)) if !value.is_empty() => Ok(value.clone()),
        Some(AttributeValue::S(_)) => Err(invalid(format!(
            "key attribute {attribute} must not be empty"
        ))),
        Some(other) => Err(invalid(format!(
            "key attribute {attribute} must be S, got {}",
            other.kind()
        ))),
        None => Err(invalid(format!("missing key attribute {attribute}"))),
    }
}

fn invalid(message: impl Into<String>) -> TableError {
    TableError::Validation(message.into())
}
