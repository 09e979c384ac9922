#![forbid(unsafe_code)]

use super::{RowStore, require};
use crate::StoreError;
use crate::codec;
use crate::layout::INDEX_BY_TYPE_AND_PARENT;
use crate::table::{Condition, DeleteItem, KeyCondition, KeyTable, Query};
use schema_core::ids::IdGenerator;

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    /// Deletes a row that exists.
    ///
    /// With a non-empty `child_type`, fails with `CannotDeleteRow` while any
    /// row of that type names this row as its parent. Children of other types
    /// are not looked at and are left dangling; callers pass the child type
    /// their tree shape defines.
    pub fn delete_row(&self, row_type: &str, child_type: &str, id: &str) -> Result<(), StoreError> {
        tracing::debug!(row_type, child_type, id, "delete_row");
        require(row_type, "row type must not be empty")?;
        require(id, "row id must not be empty")?;

        if !child_type.is_empty() {
            let output = self.table.query(
                Query::on_index(
                    self.table_name(),
                    INDEX_BY_TYPE_AND_PARENT,
                    KeyCondition::hash_and_range(child_type, id),
                )
                .with_limit(1),
            )?;
            let children = output
                .items
                .ok_or(StoreError::MalformedResponse("query output has no items"))?;
            if !children.is_empty() {
                return Err(StoreError::CannotDeleteRow {
                    row_type: row_type.to_string(),
                    id: id.to_string(),
                    child_type: child_type.to_string(),
                });
            }
        }

        self.table.delete_item(DeleteItem {
            table_name: self.table_name().to_string(),
            key: codec::row_key(row_type, id),
            condition: Some(Condition::KeyExists),
        })?;
        Ok(())
    }
}
