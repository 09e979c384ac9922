#![forbid(unsafe_code)]

use crate::table::TableError;
use std::fmt;

/// How a row was looked up; carried by lookup errors so they can be
/// diagnosed without logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Id { row_type: String, id: String },
    TypeLabel { row_type: String, label: String },
    ParentLabel { parent_id: String, label: String },
}

impl Lookup {
    pub fn id(row_type: &str, id: &str) -> Self {
        Self::Id {
            row_type: row_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn type_label(row_type: &str, label: &str) -> Self {
        Self::TypeLabel {
            row_type: row_type.to_string(),
            label: label.to_string(),
        }
    }

    pub fn parent_label(parent_id: &str, label: &str) -> Self {
        Self::ParentLabel {
            parent_id: parent_id.to_string(),
            label: label.to_string(),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { row_type, id } => write!(f, "type {row_type:?} and id {id:?}"),
            Self::TypeLabel { row_type, label } => {
                write!(f, "type {row_type:?} and label {label:?}")
            }
            Self::ParentLabel { parent_id, label } => {
                write!(f, "parent id {parent_id:?} and label {label:?}")
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found: {0}")]
    NotFound(Lookup),
    #[error("multiple exist where there must only be one ({count} rows): {lookup}")]
    TooManyFound { lookup: Lookup, count: usize },
    #[error("a row with type {row_type:?} and label {label:?} already exists")]
    CollisionTypeLabel { row_type: String, label: String },
    #[error("a row with parent id {parent_id:?} and label {label:?} already exists")]
    CollisionParentLabel { parent_id: String, label: String },
    #[error("cannot delete row: {row_type} {id} has children of type {child_type:?}")]
    CannotDeleteRow {
        row_type: String,
        id: String,
        child_type: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
    #[error("malformed item: {0}")]
    MalformedItem(String),
    #[error("column {column:?} holds unsupported value kind {kind}")]
    UnsupportedColumnValue { column: String, kind: &'static str },
    #[error("column {column:?} is invalid: {reason}")]
    InvalidColumnValue { column: String, reason: &'static str },
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Table(#[from] TableError),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::TooManyFound { .. } => "TOO_MANY_FOUND",
            Self::CollisionTypeLabel { .. } => "COLLISION_TYPE_LABEL",
            Self::CollisionParentLabel { .. } => "COLLISION_PARENT_LABEL",
            Self::CannotDeleteRow { .. } => "CANNOT_DELETE_ROW",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::MalformedItem(_) => "MALFORMED_ITEM",
            Self::UnsupportedColumnValue { .. } => "UNSUPPORTED_COLUMN_VALUE",
            Self::InvalidColumnValue { .. } => "INVALID_COLUMN_VALUE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Table(_) => "BACKEND",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_collision(&self) -> bool {
        matches!(
            self,
            Self::CollisionTypeLabel { .. } | Self::CollisionParentLabel { .. }
        )
    }

    /// True when a conditional write was rejected by the backend: the key
    /// already existed on create, or was missing on update/delete.
    pub fn is_condition_failed(&self) -> bool {
        matches!(self, Self::Table(err) if err.is_conditional_check_failed())
    }
}
