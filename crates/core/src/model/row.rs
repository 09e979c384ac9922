#![forbid(unsafe_code)]

use super::Columns;
use serde::{Deserialize, Serialize};

/// A node of the row tree, addressed by `(row_type, id)`.
///
/// A row without a parent is a root row; its label is unique within its type.
/// A child row's label is unique among the children of its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "type")]
    row_type: String,
    id: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default)]
    columns: Columns,
}

impl Row {
    pub fn new(
        row_type: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
        parent_id: Option<String>,
        columns: Columns,
    ) -> Self {
        Self {
            row_type: row_type.into(),
            id: id.into(),
            label: label.into(),
            parent_id: parent_id.filter(|value| !value.is_empty()),
            columns,
        }
    }

    pub fn root(
        row_type: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(row_type, id, label, None, Columns::new())
    }

    pub fn child(
        row_type: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
        parent_id: impl Into<String>,
        columns: Columns,
    ) -> Self {
        Self::new(row_type, id, label, Some(parent_id.into()), columns)
    }

    pub fn row_type(&self) -> &str {
        &self.row_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn into_columns(self) -> Columns {
        self.columns
    }
}
