#![forbid(unsafe_code)]

use crate::StoreError;
use crate::layout::{ATTR_COLUMNS, ATTR_ID, ATTR_LABEL, ATTR_PARENT_ID, ATTR_TYPE};
use crate::table::{AttributeValue, Item, Key};
use schema_core::{ColumnValue, Columns, Row};
use std::collections::BTreeMap;

pub(crate) fn row_key(row_type: &str, id: &str) -> Key {
    Key::new(row_type, id)
}

pub(crate) fn row_to_item(row: &Row) -> Result<Item, StoreError> {
    let mut item = Item::new();
    item.insert(ATTR_TYPE.to_string(), AttributeValue::S(row.row_type().to_string()));
    item.insert(ATTR_ID.to_string(), AttributeValue::S(row.id().to_string()));
    item.insert(ATTR_LABEL.to_string(), AttributeValue::S(row.label().to_string()));
    if let Some(parent_id) = row.parent_id() {
        item.insert(
            ATTR_PARENT_ID.to_string(),
            AttributeValue::S(parent_id.to_string()),
        );
    }
    item.insert(ATTR_COLUMNS.to_string(), columns_to_attribute(row.columns())?);
    Ok(item)
}

pub(crate) fn item_to_row(mut item: Item) -> Result<Row, StoreError> {
    let row_type = take_string(&mut item, ATTR_TYPE)?
        .ok_or_else(|| StoreError::MalformedItem("item has no type".to_string()))?;
    let id = take_string(&mut item, ATTR_ID)?
        .ok_or_else(|| StoreError::MalformedItem(format!("{row_type} item has no id")))?;
    let label = take_string(&mut item, ATTR_LABEL)?
        .ok_or_else(|| StoreError::MalformedItem(format!("{row_type} {id} has no label")))?;
    let parent_id = take_string(&mut item, ATTR_PARENT_ID)?;

    let columns = match item.remove(ATTR_COLUMNS) {
        None => Columns::new(),
        Some(AttributeValue::M(map)) => attribute_to_columns(map)?,
        Some(other) => {
            return Err(StoreError::MalformedItem(format!(
                "{row_type} {id} has columns of kind {}",
                other.kind()
            )));
        }
    };

    Ok(Row::new(row_type, id, label, parent_id, columns))
}

pub(crate) fn column_to_attribute(
    column: &str,
    value: &ColumnValue,
) -> Result<AttributeValue, StoreError> {
    match value {
        ColumnValue::String(value) => Ok(AttributeValue::S(value.clone())),
        ColumnValue::StringSet(values) if values.is_empty() => Err(StoreError::InvalidColumnValue {
            column: column.to_string(),
            reason: "string set must not be empty",
        }),
        ColumnValue::StringSet(values) => Ok(AttributeValue::SS(values.iter().cloned().collect())),
    }
}

pub(crate) fn columns_to_attribute(columns: &Columns) -> Result<AttributeValue, StoreError> {
    let mut map = BTreeMap::new();
    for (column, value) in columns {
        if column.is_empty() {
            return Err(StoreError::InvalidInput("column name must not be empty"));
        }
        map.insert(column.clone(), column_to_attribute(column, value)?);
    }
    Ok(AttributeValue::M(map))
}

fn attribute_to_columns(map: BTreeMap<String, AttributeValue>) -> Result<Columns, StoreError> {
    let mut columns = Columns::new();
    for (column, value) in map {
        let value = match value {
            AttributeValue::S(value) => ColumnValue::String(value),
            AttributeValue::SS(values) => ColumnValue::StringSet(values.into_iter().collect()),
            other => {
                return Err(StoreError::UnsupportedColumnValue {
                    column,
                    kind: other.kind(),
                });
            }
        };
        columns.insert(column, value);
    }
    Ok(columns)
}

fn take_string(item: &mut Item, attribute: &str) -> Result<Option<String>, StoreError> {
    match item.remove(attribute) {
        None => Ok(None),
        Some(AttributeValue::S(value)) => Ok(Some(value)),
        Some(other) => Err(StoreError::MalformedItem(format!(
            "attribute {attribute} has kind {}, expected S",
            other.kind()
        ))),
    }
}
