#![forbid(unsafe_code)]

use crate::StoreError;
use crate::config::StoreConfig;
use crate::layout;
use crate::table::{KeyTable, TableDescription, TableError};

/// Makes sure the backing table exists with the row index layout.
///
/// An existing table is returned as-is after its key layout is checked. A
/// missing table is created; losing a creation race to another process counts
/// as success. Any other backend failure aborts.
pub fn ensure_table<T: KeyTable + ?Sized>(
    table: &T,
    config: &StoreConfig,
) -> Result<TableDescription, StoreError> {
    let table_name = config.table_name();
    match table.describe_table(table_name) {
        Ok(description) => {
            tracing::debug!(table = table_name, table_id = %description.table_id, "table exists");
            check_layout(config, &description)?;
            return Ok(description);
        }
        Err(err) if err.is_table_not_found() => {
            tracing::debug!(table = table_name, "table not found, creating");
        }
        Err(err) => {
            tracing::warn!(table = table_name, error = %err, "describe table failed");
            return Err(err.into());
        }
    }

    let request = layout::table_request(config);
    match table.create_table(&request) {
        Ok(description) => {
            tracing::info!(table = table_name, table_id = %description.table_id, "created table");
            Ok(description)
        }
        Err(TableError::ResourceInUse(_)) => {
            tracing::debug!(table = table_name, "table created concurrently");
            let description = table.describe_table(table_name)?;
            check_layout(config, &description)?;
            Ok(description)
        }
        Err(err) => {
            tracing::warn!(table = table_name, error = %err, "create table failed");
            Err(err.into())
        }
    }
}

fn check_layout(config: &StoreConfig, description: &TableDescription) -> Result<(), StoreError> {
    let expected = layout::table_request(config);
    let actual = &description.definition;
    if actual.key != expected.key {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: table primary key does not match the row layout",
        ));
    }
    for index in &expected.indexes {
        if actual.index(&index.name) != Some(index) {
            return Err(StoreError::InvalidInput(
                "RESET_REQUIRED: table indexes do not match the row layout",
            ));
        }
    }
    Ok(())
}
