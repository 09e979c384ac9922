#![forbid(unsafe_code)]

use crate::table::{CreateTableRequest, IndexScope, TableDescription, TableError};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(super) fn install_schema(conn: &Connection) -> Result<(), TableError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS table_catalog (
          table_name TEXT PRIMARY KEY,
          table_id TEXT NOT NULL,
          definition_json TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS items (
          table_name TEXT NOT NULL,
          hash_key TEXT NOT NULL,
          range_key TEXT NOT NULL,
          item_json TEXT NOT NULL,
          PRIMARY KEY(table_name, hash_key, range_key),
          FOREIGN KEY(table_name)
            REFERENCES table_catalog(table_name)
            ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS index_entries (
          table_name TEXT NOT NULL,
          index_name TEXT NOT NULL,
          hash_value TEXT NOT NULL,
          range_value TEXT NOT NULL,
          item_hash TEXT NOT NULL,
          item_range TEXT NOT NULL,
          PRIMARY KEY(table_name, index_name, item_hash, item_range),
          FOREIGN KEY(table_name, item_hash, item_range)
            REFERENCES items(table_name, hash_key, range_key)
            ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_index_entries_lookup
          ON index_entries(table_name, index_name, hash_value, range_value, item_hash, item_range);
        "#,
    )?;
    Ok(())
}

pub(super) fn load_description(
    conn: &Connection,
    table_name: &str,
) -> Result<Option<TableDescription>, TableError> {
    let row = conn
        .query_row(
            "SELECT table_id, definition_json, created_at_ms FROM table_catalog WHERE table_name=?1",
            params![table_name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((table_id, definition_json, created_at_ms)) => Ok(Some(TableDescription {
            table_id,
            created_at_ms,
            definition: serde_json::from_str(&definition_json)?,
        })),
        None => Ok(None),
    }
}

pub(super) fn load_definition(
    conn: &Connection,
    table_name: &str,
) -> Result<CreateTableRequest, TableError> {
    load_description(conn, table_name)?
        .map(|description| description.definition)
        .ok_or_else(|| TableError::TableNotFound(table_name.to_string()))
}

pub(super) fn insert_description(
    conn: &Connection,
    description: &TableDescription,
) -> Result<(), TableError> {
    conn.execute(
        "INSERT INTO table_catalog(table_name, table_id, definition_json, created_at_ms) \
         VALUES (?1, ?2, ?3, ?4)",
        params![
            description.definition.table_name,
            description.table_id,
            serde_json::to_string(&description.definition)?,
            description.created_at_ms,
        ],
    )?;
    Ok(())
}

pub(super) fn validate_definition(request: &CreateTableRequest) -> Result<(), TableError> {
    if request.table_name.trim().is_empty() {
        return Err(invalid("table name must not be empty"));
    }

    let defined: BTreeSet<&str> = request
        .attribute_definitions
        .iter()
        .map(String::as_str)
        .collect();
    if defined.len() != request.attribute_definitions.len() {
        return Err(invalid("attribute definitions contain duplicates"));
    }

    let mut used = BTreeSet::new();
    for attribute in request.key.attributes() {
        if !defined.contains(attribute) {
            return Err(invalid(format!(
                "key attribute {attribute} has no attribute definition"
            )));
        }
        used.insert(attribute);
    }

    let mut names = BTreeSet::new();
    for index in &request.indexes {
        if !names.insert(index.name.as_str()) {
            return Err(invalid(format!("duplicate index name {}", index.name)));
        }
        for attribute in index.key.attributes() {
            if !defined.contains(attribute) {
                return Err(invalid(format!(
                    "index {} uses undefined attribute {attribute}",
                    index.name
                )));
            }
            used.insert(attribute);
        }
        if index.scope == IndexScope::Local {
            if index.key.hash != request.key.hash {
                return Err(invalid(format!(
                    "local index {} must share the table hash key {}",
                    index.name, request.key.hash
                )));
            }
            if index.key.range.is_none() {
                return Err(invalid(format!(
                    "local index {} requires a range key",
                    index.name
                )));
            }
        }
    }

    if let Some(unused) = defined.difference(&used).next() {
        return Err(invalid(format!(
            "attribute definition {unused} is not used by any key"
        )));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> TableError {
    TableError::Validation(message.into())
}
