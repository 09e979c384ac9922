#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub type Columns = BTreeMap<String, ColumnValue>;

/// The column value kinds that round-trip through storage.
///
/// Anything else is rejected at the boundary instead of being stored as an
/// empty value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    String(String),
    StringSet(BTreeSet<String>),
}

impl ColumnValue {
    pub fn string_set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringSet(values.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::StringSet(_) => "string_set",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            Self::StringSet(_) => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::String(_) => None,
            Self::StringSet(values) => Some(values),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<BTreeSet<String>> for ColumnValue {
    fn from(value: BTreeSet<String>) -> Self {
        Self::StringSet(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColumnValueError {
    #[error("unsupported column value kind: {kind}")]
    UnsupportedKind { kind: &'static str },
    #[error("string set member {index} is a {kind}, expected a string")]
    NonStringMember { index: usize, kind: &'static str },
    #[error("columns must be an object, got {kind}")]
    NotAnObject { kind: &'static str },
    #[error("column {column:?}: {reason}")]
    Column {
        column: String,
        reason: Box<ColumnValueError>,
    },
}

impl TryFrom<Value> for ColumnValue {
    type Error = ColumnValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(value) => Ok(Self::String(value)),
            Value::Array(items) => {
                let mut out = BTreeSet::new();
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::String(member) => {
                            out.insert(member);
                        }
                        other => {
                            return Err(ColumnValueError::NonStringMember {
                                index,
                                kind: json_kind(&other),
                            });
                        }
                    }
                }
                Ok(Self::StringSet(out))
            }
            other => Err(ColumnValueError::UnsupportedKind {
                kind: json_kind(&other),
            }),
        }
    }
}

/// Converts a generic JSON object into columns, failing on the first value
/// that is neither a string nor an array of strings.
pub fn columns_from_json(value: Value) -> Result<Columns, ColumnValueError> {
    let Value::Object(map) = value else {
        return Err(ColumnValueError::NotAnObject {
            kind: json_kind(&value),
        });
    };

    let mut columns = Columns::new();
    for (column, raw) in map {
        match ColumnValue::try_from(raw) {
            Ok(value) => {
                columns.insert(column, value);
            }
            Err(reason) => {
                return Err(ColumnValueError::Column {
                    column,
                    reason: Box::new(reason),
                });
            }
        }
    }
    Ok(columns)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
