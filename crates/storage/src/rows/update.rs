#![forbid(unsafe_code)]

use super::{LabelScope, RowStore, UpdateChildRequest, require};
use crate::StoreError;
use crate::codec;
use crate::layout::{ATTR_COLUMNS, ATTR_LABEL, ATTR_PARENT_ID};
use crate::table::{
    AttributePath, AttributeValue, Condition, KeyTable, ReturnValues, SetAction, UpdateItem,
};
use schema_core::ids::IdGenerator;
use schema_core::{ColumnValue, Columns, Row};

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    /// Relabels a row in place. The new label is checked in the row's current
    /// scope: its type when it is a root row, its parent otherwise.
    pub fn update_row(&self, row_type: &str, id: &str, new_label: &str) -> Result<Row, StoreError> {
        tracing::debug!(row_type, id, new_label, "update_row");
        require(new_label, "label must not be empty")?;

        let current = self.get_row_by_id(row_type, id)?;
        let scope = match current.parent_id() {
            Some(parent_id) => LabelScope::Parent(parent_id.to_string()),
            None => LabelScope::Type(row_type.to_string()),
        };
        self.ensure_label_free(&scope, new_label, Some(id))?;

        self.update_existing(
            row_type,
            id,
            vec![SetAction {
                path: AttributePath::top(ATTR_LABEL),
                value: AttributeValue::S(new_label.to_string()),
            }],
        )
    }

    /// Moves and/or relabels a child row. Only the new parent is checked; the
    /// old parent is not revisited.
    pub fn update_child(&self, request: UpdateChildRequest) -> Result<Row, StoreError> {
        tracing::debug!(
            row_type = %request.row_type,
            id = %request.id,
            new_label = %request.new_label,
            parent_type = %request.parent_type,
            new_parent_id = %request.new_parent_id,
            "update_child"
        );
        require(&request.row_type, "row type must not be empty")?;
        require(&request.id, "row id must not be empty")?;
        require(&request.new_label, "label must not be empty")?;

        let parent = self.get_row_by_id(&request.parent_type, &request.new_parent_id)?;
        self.ensure_label_free(
            &LabelScope::Parent(parent.id().to_string()),
            &request.new_label,
            Some(request.id.as_str()),
        )?;

        self.update_existing(
            &request.row_type,
            &request.id,
            vec![
                SetAction {
                    path: AttributePath::top(ATTR_LABEL),
                    value: AttributeValue::S(request.new_label.clone()),
                },
                SetAction {
                    path: AttributePath::top(ATTR_PARENT_ID),
                    value: AttributeValue::S(parent.id().to_string()),
                },
            ],
        )
    }

    pub fn update_column(
        &self,
        row_type: &str,
        id: &str,
        column: &str,
        value: &ColumnValue,
    ) -> Result<(), StoreError> {
        tracing::debug!(row_type, id, column, kind = value.kind(), "update_column");
        require(row_type, "row type must not be empty")?;
        require(id, "row id must not be empty")?;
        require(column, "column name must not be empty")?;

        let value = codec::column_to_attribute(column, value)?;
        self.table.update_item(UpdateItem {
            table_name: self.table_name().to_string(),
            key: codec::row_key(row_type, id),
            set: vec![SetAction {
                path: AttributePath::nested(ATTR_COLUMNS, column),
                value,
            }],
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::None,
        })?;
        Ok(())
    }

    pub fn update_columns(
        &self,
        row_type: &str,
        id: &str,
        columns: &Columns,
    ) -> Result<(), StoreError> {
        tracing::debug!(row_type, id, count = columns.len(), "update_columns");
        require(row_type, "row type must not be empty")?;
        require(id, "row id must not be empty")?;

        let value = codec::columns_to_attribute(columns)?;
        self.table.update_item(UpdateItem {
            table_name: self.table_name().to_string(),
            key: codec::row_key(row_type, id),
            set: vec![SetAction {
                path: AttributePath::top(ATTR_COLUMNS),
                value,
            }],
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::None,
        })?;
        Ok(())
    }

    fn update_existing(
        &self,
        row_type: &str,
        id: &str,
        set: Vec<SetAction>,
    ) -> Result<Row, StoreError> {
        let output = self.table.update_item(UpdateItem {
            table_name: self.table_name().to_string(),
            key: codec::row_key(row_type, id),
            set,
            condition: Some(Condition::KeyExists),
            return_values: ReturnValues::AllNew,
        })?;
        let item = output
            .attributes
            .ok_or(StoreError::MalformedResponse("update output has no attributes"))?;
        codec::item_to_row(item)
    }
}
