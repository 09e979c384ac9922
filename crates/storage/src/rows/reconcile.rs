#![forbid(unsafe_code)]

use super::{LabelScope, ListRowsRequest, RowStore};
use crate::StoreError;
use crate::layout::INDEX_BY_PARENT_AND_LABEL;
use crate::table::{KeyCondition, KeyTable, Query};
use schema_core::Row;
use schema_core::ids::IdGenerator;
use std::collections::{BTreeMap, BTreeSet};

/// A label held by more than one row in the same scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelCollision {
    pub scope: LabelScope,
    pub label: String,
    /// Sorted ids of every row holding the label.
    pub ids: Vec<String>,
}

impl<T: KeyTable, G: IdGenerator> RowStore<T, G> {
    /// Reports label scopes touched by rows of `row_type` that hold a label
    /// more than once.
    ///
    /// Root rows are grouped per type. For every parent of a child of this
    /// type, the parent's whole child partition is read, so a clash with a
    /// sibling of another type is reported too. Read-only.
    pub fn find_label_collisions(&self, row_type: &str) -> Result<Vec<LabelCollision>, StoreError> {
        tracing::debug!(row_type, "find_label_collisions");
        let rows = self.list_rows(ListRowsRequest::all(row_type))?;

        let mut out = Vec::new();
        let mut parents = BTreeSet::new();
        let mut roots: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            match row.parent_id() {
                Some(parent_id) => {
                    parents.insert(parent_id.to_string());
                }
                None => roots
                    .entry(row.label().to_string())
                    .or_default()
                    .push(row.id().to_string()),
            }
        }
        push_collisions(&mut out, LabelScope::Type(row_type.to_string()), roots);

        for parent_id in parents {
            let siblings = self.query_rows(Query::on_index(
                self.table_name(),
                INDEX_BY_PARENT_AND_LABEL,
                KeyCondition::hash(&parent_id),
            ))?;
            push_collisions(
                &mut out,
                LabelScope::Parent(parent_id),
                group_by_label(siblings),
            );
        }

        if !out.is_empty() {
            tracing::warn!(row_type, collisions = out.len(), "label collisions found");
        }
        Ok(out)
    }
}

fn group_by_label(rows: Vec<Row>) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.label().to_string())
            .or_default()
            .push(row.id().to_string());
    }
    groups
}

fn push_collisions(
    out: &mut Vec<LabelCollision>,
    scope: LabelScope,
    groups: BTreeMap<String, Vec<String>>,
) {
    for (label, mut ids) in groups {
        if ids.len() < 2 {
            continue;
        }
        ids.sort();
        out.push(LabelCollision {
            scope: scope.clone(),
            label,
            ids,
        });
    }
}
