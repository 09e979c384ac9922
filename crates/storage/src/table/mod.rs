#![forbid(unsafe_code)]

mod error;
mod sqlite;
mod types;

pub use error::TableError;
pub use sqlite::{DEFAULT_PAGE_SIZE, SqliteTable};
pub use types::*;

/// Single-item operation surface of a keyed table with secondary indexes.
///
/// Every write touches exactly one item and is atomic for that item only.
/// There is no multi-item transaction and no unindexed scan.
pub trait KeyTable: Send + Sync {
    fn describe_table(&self, table_name: &str) -> Result<TableDescription, TableError>;

    fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription, TableError>;

    fn get_item(&self, request: GetItem) -> Result<GetItemOutput, TableError>;

    fn put_item(&self, request: PutItem) -> Result<(), TableError>;

    fn update_item(&self, request: UpdateItem) -> Result<UpdateItemOutput, TableError>;

    fn delete_item(&self, request: DeleteItem) -> Result<(), TableError>;

    fn query(&self, request: Query) -> Result<QueryOutput, TableError>;
}

impl<T: KeyTable + ?Sized> KeyTable for std::sync::Arc<T> {
    fn describe_table(&self, table_name: &str) -> Result<TableDescription, TableError> {
        (**self).describe_table(table_name)
    }

    fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription, TableError> {
        (**self).create_table(request)
    }

    fn get_item(&self, request: GetItem) -> Result<GetItemOutput, TableError> {
        (**self).get_item(request)
    }

    fn put_item(&self, request: PutItem) -> Result<(), TableError> {
        (**self).put_item(request)
    }

    fn update_item(&self, request: UpdateItem) -> Result<UpdateItemOutput, TableError> {
        (**self).update_item(request)
    }

    fn delete_item(&self, request: DeleteItem) -> Result<(), TableError> {
        (**self).delete_item(request)
    }

    fn query(&self, request: Query) -> Result<QueryOutput, TableError> {
        (**self).query(request)
    }
}
