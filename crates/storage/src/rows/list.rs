#![forbid(unsafe_code)]

use super::{ListRowsRequest, RowStore, require};
use crate::StoreError;
use crate::layout::{ATTR_LABEL, ATTR_PARENT_ID, INDEX_BY_TYPE};
use crate::table::{Filter, KeyCondition, KeyTable, Query};
use schema_core::Row;
use schema_core::ids::IdGenerator;

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    pub fn list_rows(&self, request: ListRowsRequest) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(
            row_type = %request.row_type,
            label_filter = %request.label_filter,
            parent_id_filter = %request.parent_id_filter,
            "list_rows"
        );
        require(&request.row_type, "row type must not be empty")?;

        let mut query = Query::on_index(
            self.table_name(),
            INDEX_BY_TYPE,
            KeyCondition::hash(&request.row_type),
        );
        if !request.label_filter.is_empty() {
            query = query.with_filter(Filter::Contains {
                attribute: ATTR_LABEL.to_string(),
                value: request.label_filter,
            });
        }
        if !request.parent_id_filter.is_empty() {
            query = query.with_filter(Filter::Equals {
                attribute: ATTR_PARENT_ID.to_string(),
                value: request.parent_id_filter,
            });
        }

        self.query_rows(query)
    }
}
