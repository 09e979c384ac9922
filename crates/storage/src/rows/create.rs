#![forbid(unsafe_code)]

use super::{CreateChildRequest, LabelScope, RowStore, require};
use crate::StoreError;
use crate::codec;
use crate::table::{Condition, KeyTable, PutItem};
use schema_core::ids::IdGenerator;
use schema_core::{Columns, Row};

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    /// Creates a root row. Fails with `CollisionTypeLabel` when a root row of
    /// the same type already carries `label`.
    pub fn create_row(&self, row_type: &str, label: &str) -> Result<Row, StoreError> {
        tracing::debug!(row_type, label, "create_row");
        require(row_type, "row type must not be empty")?;
        require(label, "label must not be empty")?;

        self.ensure_label_free(&LabelScope::Type(row_type.to_string()), label, None)?;

        let id = self.ids.generate(row_type);
        let row = Row::new(row_type, id, label, None, Columns::new());
        self.put_new(&row)?;
        Ok(row)
    }

    /// Creates a child row under an existing parent. Fails with `NotFound`
    /// when the parent is missing and `CollisionParentLabel` when a sibling of
    /// any type already carries `label`.
    pub fn create_child(&self, request: CreateChildRequest) -> Result<Row, StoreError> {
        tracing::debug!(
            row_type = %request.row_type,
            label = %request.label,
            parent_type = %request.parent_type,
            parent_id = %request.parent_id,
            "create_child"
        );
        require(&request.row_type, "row type must not be empty")?;
        require(&request.label, "label must not be empty")?;

        let parent = self.get_row_by_id(&request.parent_type, &request.parent_id)?;
        let id = self.ids.generate(&request.row_type);

        self.ensure_label_free(
            &LabelScope::Parent(parent.id().to_string()),
            &request.label,
            None,
        )?;

        let row = Row::new(
            request.row_type,
            id,
            request.label,
            Some(parent.id().to_string()),
            request.columns,
        );
        self.put_new(&row)?;
        Ok(row)
    }

    fn put_new(&self, row: &Row) -> Result<(), StoreError> {
        let item = codec::row_to_item(row)?;
        self.table.put_item(PutItem {
            table_name: self.table_name().to_string(),
            item,
            condition: Some(Condition::KeyAbsent),
        })?;
        Ok(())
    }
}
