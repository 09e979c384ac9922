#![forbid(unsafe_code)]

use super::{LabelScope, RowStore, exactly_one, require};
use crate::codec;
use crate::table::{GetItem, KeyTable};
use crate::{Lookup, StoreError};
use schema_core::Row;
use schema_core::ids::IdGenerator;

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    pub fn get_row_by_id(&self, row_type: &str, id: &str) -> Result<Row, StoreError> {
        tracing::debug!(row_type, id, "get_row_by_id");
        require(row_type, "row type must not be empty")?;
        require(id, "row id must not be empty")?;

        let output = self.table.get_item(GetItem {
            table_name: self.table_name().to_string(),
            key: codec::row_key(row_type, id),
            consistent_read: true,
        })?;
        match output.item {
            Some(item) => codec::item_to_row(item),
            None => Err(StoreError::NotFound(Lookup::id(row_type, id))),
        }
    }

    /// Looks up the root row of `row_type` labelled `label`.
    pub fn get_row(&self, row_type: &str, label: &str) -> Result<Row, StoreError> {
        tracing::debug!(row_type, label, "get_row");
        require(row_type, "row type must not be empty")?;
        require(label, "label must not be empty")?;

        let rows = self.rows_with_label(&LabelScope::Type(row_type.to_string()), label)?;
        exactly_one(rows, Lookup::type_label(row_type, label))
    }

    pub fn get_child(&self, label: &str, parent_id: &str) -> Result<Row, StoreError> {
        tracing::debug!(label, parent_id, "get_child");
        require(label, "label must not be empty")?;
        require(parent_id, "parent id must not be empty")?;

        let rows = self.rows_with_label(&LabelScope::Parent(parent_id.to_string()), label)?;
        exactly_one(rows, Lookup::parent_label(parent_id, label))
    }
}
