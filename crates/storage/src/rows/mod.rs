#![forbid(unsafe_code)]

mod create;
mod delete;
mod get;
mod list;
mod reconcile;
mod requests;
mod update;

pub use reconcile::LabelCollision;
pub use requests::*;

use crate::codec;
use crate::config::StoreConfig;
use crate::layout::{ATTR_PARENT_ID, INDEX_BY_PARENT_AND_LABEL, INDEX_BY_TYPE_AND_LABEL};
use crate::lifecycle;
use crate::table::{Filter, Item, KeyCondition, KeyTable, Query, TableDescription};
use crate::{Lookup, StoreError};
use schema_core::Row;
use schema_core::ids::{IdGenerator, RandomSuffix};

/// The scope a label must be unique in: root rows per type, child rows per
/// parent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelScope {
    Type(String),
    Parent(String),
}

/// Row operations over a keyed table.
///
/// Each operation is a short sequence of index queries followed by at most
/// one conditional single-item write. Uniqueness checks and the write that
/// follows them are not atomic: two concurrent creators in one label scope
/// can both pass the check. The key condition still prevents duplicate keys;
/// duplicate labels are found afterwards by [`RowStore::find_label_collisions`].
#[derive(Debug)]
pub struct RowStore<T, G = RandomSuffix> {
    table: T,
    ids: G,
    config: StoreConfig,
    description: TableDescription,
}

impl<T: KeyTable> RowStore<T> {
    pub fn open(table: T, config: StoreConfig) -> Result<Self, StoreError> {
        Self::with_id_generator(table, config, RandomSuffix)
    }
}

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    pub fn with_id_generator(table: T, config: StoreConfig, ids: G) -> Result<Self, StoreError> {
        config.validate()?;
        let description = lifecycle::ensure_table(&table, &config)?;
        Ok(Self {
            table,
            ids,
            config,
            description,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn description(&self) -> &TableDescription {
        &self.description
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    fn table_name(&self) -> &str {
        self.config.table_name()
    }

    fn query_all(&self, mut query: Query) -> Result<Vec<Item>, StoreError> {
        let mut out = Vec::new();
        loop {
            let output = self.table.query(query.clone())?;
            let items = output
                .items
                .ok_or(StoreError::MalformedResponse("query output has no items"))?;
            out.extend(items);
            match output.last_evaluated_key {
                Some(key) => query.exclusive_start_key = Some(key),
                None => return Ok(out),
            }
        }
    }

    fn query_rows(&self, query: Query) -> Result<Vec<Row>, StoreError> {
        self.query_all(query)?
            .into_iter()
            .map(codec::item_to_row)
            .collect()
    }

    fn rows_with_label(&self, scope: &LabelScope, label: &str) -> Result<Vec<Row>, StoreError> {
        let query = match scope {
            LabelScope::Type(row_type) => Query::on_index(
                self.table_name(),
                INDEX_BY_TYPE_AND_LABEL,
                KeyCondition::hash_and_range(row_type, label),
            )
            .with_filter(Filter::AttributeNotExists {
                attribute: ATTR_PARENT_ID.to_string(),
            }),
            LabelScope::Parent(parent_id) => Query::on_index(
                self.table_name(),
                INDEX_BY_PARENT_AND_LABEL,
                KeyCondition::hash_and_range(parent_id, label),
            ),
        };
        self.query_rows(query)
    }

    /// Fails with the scope's collision error when another row already holds
    /// `label`. `except_id` lets a row keep its own label.
    fn ensure_label_free(
        &self,
        scope: &LabelScope,
        label: &str,
        except_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let taken = self
            .rows_with_label(scope, label)?
            .iter()
            .any(|row| Some(row.id()) != except_id);
        if !taken {
            return Ok(());
        }
        Err(match scope {
            LabelScope::Type(row_type) => StoreError::CollisionTypeLabel {
                row_type: row_type.clone(),
                label: label.to_string(),
            },
            LabelScope::Parent(parent_id) => StoreError::CollisionParentLabel {
                parent_id: parent_id.clone(),
                label: label.to_string(),
            },
        })
    }
}

fn exactly_one(mut rows: Vec<Row>, lookup: Lookup) -> Result<Row, StoreError> {
    match rows.len() {
        0 => Err(StoreError::NotFound(lookup)),
        1 => Ok(rows.remove(0)),
        count => Err(StoreError::TooManyFound { lookup, count }),
    }
}

fn require(value: &str, message: &'static str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::InvalidInput(message));
    }
    Ok(())
}
