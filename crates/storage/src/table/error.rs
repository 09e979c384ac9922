#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("table already exists: {0}")]
    ResourceInUse(String),
    #[error("index not found: {table}/{index}")]
    IndexNotFound { table: String, index: String },
    #[error("conditional check failed for {table} ({hash}, {range})")]
    ConditionalCheckFailed {
        table: String,
        hash: String,
        range: String,
    },
    #[error("validation: {0}")]
    Validation(String),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound(_))
    }

    pub fn is_conditional_check_failed(&self) -> bool {
        matches!(self, Self::ConditionalCheckFailed { .. })
    }
}
