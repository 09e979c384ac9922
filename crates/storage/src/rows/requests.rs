#![forbid(unsafe_code)]

use schema_core::Columns;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateChildRequest {
    pub row_type: String,
    pub label: String,
    pub parent_type: String,
    pub parent_id: String,
    pub columns: Columns,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateChildRequest {
    pub row_type: String,
    pub id: String,
    pub new_label: String,
    pub parent_type: String,
    pub new_parent_id: String,
}

/// Empty filters place no constraint. `label_filter` is a substring match,
/// `parent_id_filter` an exact match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRowsRequest {
    pub row_type: String,
    pub label_filter: String,
    pub parent_id_filter: String,
}

impl ListRowsRequest {
    pub fn all(row_type: &str) -> Self {
        Self {
            row_type: row_type.to_string(),
            ..Self::default()
        }
    }
}
