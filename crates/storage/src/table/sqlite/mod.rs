#![forbid(unsafe_code)]

mod items;
mod schema;

use crate::table::{
    CreateTableRequest, DeleteItem, GetItem, GetItemOutput, Item, KeyTable, PutItem, Query,
    QueryOutput, ReturnValues, TableDescription, TableError, UpdateItem, UpdateItemOutput,
};
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 1000;

const DB_FILE_NAME: &str = "schema_rows.db";

/// A keyed table backend stored in a single SQLite file.
///
/// Secondary indexes are kept as entry rows written in the same SQLite
/// transaction as their item, so every single-item operation is atomic and
/// indexes are never stale. Mutations take the write lock up front, so
/// handles sharing one file queue on the busy timeout instead of failing. Queries return at most `page_size` evaluated
/// items per call.
#[derive(Debug)]
pub struct SqliteTable {
    conn: Mutex<Connection>,
    storage_dir: Option<PathBuf>,
    page_size: usize,
}

impl SqliteTable {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, TableError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE_NAME))?;
        Self::from_connection(conn, Some(storage_dir))
    }

    pub fn open_in_memory() -> Result<Self, TableError> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, storage_dir: Option<PathBuf>) -> Result<Self, TableError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::install_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            storage_dir,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl KeyTable for SqliteTable {
    fn describe_table(&self, table_name: &str) -> Result<TableDescription, TableError> {
        let conn = self.conn.lock();
        schema::load_description(&conn, table_name)?
            .ok_or_else(|| TableError::TableNotFound(table_name.to_string()))
    }

    fn create_table(&self, request: &CreateTableRequest) -> Result<TableDescription, TableError> {
        schema::validate_definition(request)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if schema::load_description(&tx, &request.table_name)?.is_some() {
            return Err(TableError::ResourceInUse(request.table_name.clone()));
        }

        let created_at_ms = now_ms();
        let description = TableDescription {
            table_id: format!("{}-{created_at_ms:x}", request.table_name),
            created_at_ms,
            definition: request.clone(),
        };
        schema::insert_description(&tx, &description)?;

        tx.commit()?;
        Ok(description)
    }

    fn get_item(&self, request: GetItem) -> Result<GetItemOutput, TableError> {
        // Reads go through the one connection, so every read is consistent
        // regardless of `consistent_read`.
        let conn = self.conn.lock();
        let definition = schema::load_definition(&conn, &request.table_name)?;
        items::validate_key(&definition, &request.key)?;

        let item = items::load_item(&conn, &request.table_name, &request.key)?;
        Ok(GetItemOutput { item })
    }

    fn put_item(&self, request: PutItem) -> Result<(), TableError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let definition = schema::load_definition(&tx, &request.table_name)?;
        let key = items::key_of(&definition, &request.item)?;
        items::validate_item(&definition, &request.item)?;

        let exists = items::load_item(&tx, &request.table_name, &key)?.is_some();
        items::check_condition(request.condition, exists, &request.table_name, &key)?;

        items::write_item(&tx, &definition, &key, &request.item)?;
        tx.commit()?;
        Ok(())
    }

    fn update_item(&self, request: UpdateItem) -> Result<UpdateItemOutput, TableError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let definition = schema::load_definition(&tx, &request.table_name)?;
        items::validate_key(&definition, &request.key)?;

        let existing = items::load_item(&tx, &request.table_name, &request.key)?;
        items::check_condition(
            request.condition,
            existing.is_some(),
            &request.table_name,
            &request.key,
        )?;

        let mut item = existing.unwrap_or_else(|| items::key_item(&definition, &request.key));
        for action in request.set {
            items::apply_set(&definition, &mut item, action)?;
        }
        items::validate_item(&definition, &item)?;

        items::write_item(&tx, &definition, &request.key, &item)?;
        tx.commit()?;

        let attributes = match request.return_values {
            ReturnValues::AllNew => Some(item),
            ReturnValues::None => None,
        };
        Ok(UpdateItemOutput { attributes })
    }

    fn delete_item(&self, request: DeleteItem) -> Result<(), TableError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let definition = schema::load_definition(&tx, &request.table_name)?;
        items::validate_key(&definition, &request.key)?;

        let exists = items::load_item(&tx, &request.table_name, &request.key)?.is_some();
        items::check_condition(request.condition, exists, &request.table_name, &request.key)?;

        items::delete_item(&tx, &request.table_name, &request.key)?;
        tx.commit()?;
        Ok(())
    }

    fn query(&self, request: Query) -> Result<QueryOutput, TableError> {
        let conn = self.conn.lock();
        let definition = schema::load_definition(&conn, &request.table_name)?;
        let index = definition
            .index(&request.index_name)
            .ok_or_else(|| TableError::IndexNotFound {
                table: request.table_name.clone(),
                index: request.index_name.clone(),
            })?;

        let condition = &request.key_condition;
        if condition.hash.is_empty() {
            return Err(TableError::Validation(format!(
                "query on {} needs a non-empty {} value",
                index.name, index.key.hash
            )));
        }
        if condition.range.is_some() && index.key.range.is_none() {
            return Err(TableError::Validation(format!(
                "index {} has no range key",
                index.name
            )));
        }
        if condition.range.as_deref() == Some("") {
            return Err(TableError::Validation(format!(
                "query on {} needs a non-empty range value",
                index.name
            )));
        }

        let limit = match request.limit {
            Some(0) => {
                return Err(TableError::Validation(
                    "limit must be at least 1".to_string(),
                ));
            }
            Some(limit) => limit.min(self.page_size),
            None => self.page_size,
        };
        let fetch = i64::try_from(limit.saturating_add(1))
            .map_err(|_| TableError::Validation("limit overflow".to_string()))?;

        let start = request
            .exclusive_start_key
            .as_ref()
            .map(|start| items::continuation_position(&definition, index, start))
            .transpose()?;
        let (start_range, start_hash, start_item_range) = match start {
            Some((range, hash, item_range)) => (Some(range), Some(hash), Some(item_range)),
            None => (None, None, None),
        };

        let mut stmt = conn.prepare(
            "SELECT i.item_json \
             FROM index_entries e \
             JOIN items i \
               ON i.table_name = e.table_name AND i.hash_key = e.item_hash AND i.range_key = e.item_range \
             WHERE e.table_name = ?1 AND e.index_name = ?2 AND e.hash_value = ?3 \
               AND (?4 IS NULL OR e.range_value = ?4) \
               AND (?5 IS NULL OR (e.range_value, e.item_hash, e.item_range) > (?5, ?6, ?7)) \
             ORDER BY e.range_value ASC, e.item_hash ASC, e.item_range ASC \
             LIMIT ?8",
        )?;
        let mut rows = stmt.query(params![
            request.table_name,
            index.name,
            condition.hash,
            condition.range,
            start_range,
            start_hash,
            start_item_range,
            fetch,
        ])?;

        let mut evaluated = Vec::new();
        while let Some(row) = rows.next()? {
            let raw = row.get::<_, String>(0)?;
            evaluated.push(serde_json::from_str::<Item>(&raw)?);
        }

        let has_more = evaluated.len() > limit;
        evaluated.truncate(limit);

        let last_evaluated_key = if has_more {
            evaluated
                .last()
                .map(|item| items::continuation_key(&definition, index, item))
        } else {
            None
        };

        let scanned_count = evaluated.len();
        let page = evaluated
            .into_iter()
            .filter(|item| request.filters.iter().all(|filter| filter.matches(item)))
            .map(|item| items::project(&definition, index, item))
            .collect();

        Ok(QueryOutput {
            items: Some(page),
            scanned_count,
            last_evaluated_key,
        })
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests;
