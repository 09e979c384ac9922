#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Item = BTreeMap<String, AttributeValue>;

/// Attribute values in their wire shape, e.g. `{"S": "acme"}` or `{"SS": ["a"]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    SS(Vec<String>),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::SS(_) => "SS",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }

    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl KeySchema {
    pub fn hash(attribute: &str) -> Self {
        Self {
            hash: attribute.to_string(),
            range: None,
        }
    }

    pub fn composite(hash: &str, range: &str) -> Self {
        Self {
            hash: hash.to_string(),
            range: Some(range.to_string()),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash.as_str()).chain(self.range.as_deref())
    }
}

/// Global indexes may use any hash key; local indexes share the table's hash key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexScope {
    Global,
    Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    All,
    KeysOnly,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub scope: IndexScope,
    pub key: KeySchema,
    pub projection: Projection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingMode {
    PayPerRequest,
    Provisioned { read_units: u64, write_units: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseSpecification {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableRequest {
    pub table_name: String,
    /// String-typed attributes that appear in any key schema.
    pub attribute_definitions: Vec<String>,
    pub key: KeySchema,
    pub indexes: Vec<IndexDefinition>,
    pub billing_mode: BillingMode,
    pub sse: SseSpecification,
}

impl CreateTableRequest {
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|index| index.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    pub table_id: String,
    pub created_at_ms: i64,
    pub definition: CreateTableRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub hash: String,
    pub range: String,
}

impl Key {
    pub fn new(hash: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            range: range.into(),
        }
    }
}

/// Write guard evaluated against the current item under the target key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    KeyAbsent,
    KeyExists,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributePath(Vec<String>);

impl AttributePath {
    pub fn top(attribute: &str) -> Self {
        Self(vec![attribute.to_string()])
    }

    pub fn nested(attribute: &str, member: &str) -> Self {
        Self(vec![attribute.to_string(), member.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetAction {
    pub path: AttributePath,
    pub value: AttributeValue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReturnValues {
    #[default]
    None,
    AllNew,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetItem {
    pub table_name: String,
    pub key: Key,
    pub consistent_read: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetItemOutput {
    pub item: Option<Item>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutItem {
    pub table_name: String,
    pub item: Item,
    pub condition: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateItem {
    pub table_name: String,
    pub key: Key,
    pub set: Vec<SetAction>,
    pub condition: Option<Condition>,
    pub return_values: ReturnValues,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateItemOutput {
    pub attributes: Option<Item>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteItem {
    pub table_name: String,
    pub key: Key,
    pub condition: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCondition {
    pub hash: String,
    pub range: Option<String>,
}

impl KeyCondition {
    pub fn hash(value: &str) -> Self {
        Self {
            hash: value.to_string(),
            range: None,
        }
    }

    pub fn hash_and_range(hash: &str, range: &str) -> Self {
        Self {
            hash: hash.to_string(),
            range: Some(range.to_string()),
        }
    }
}

/// Post-read predicate; applied after the page is read, so it never widens a
/// page beyond `limit` evaluated items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Substring match on `S`, membership on `SS`.
    Contains { attribute: String, value: String },
    Equals { attribute: String, value: String },
    AttributeNotExists { attribute: String },
}

impl Filter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::Contains { attribute, value } => match item.get(attribute) {
                Some(AttributeValue::S(current)) => current.contains(value.as_str()),
                Some(AttributeValue::SS(members)) => members.iter().any(|member| member == value),
                _ => false,
            },
            Self::Equals { attribute, value } => item
                .get(attribute)
                .and_then(AttributeValue::as_s)
                .is_some_and(|current| current == value),
            Self::AttributeNotExists { attribute } => !item.contains_key(attribute),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub table_name: String,
    pub index_name: String,
    pub key_condition: KeyCondition,
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
    pub exclusive_start_key: Option<Item>,
}

impl Query {
    pub fn on_index(table_name: &str, index_name: &str, key_condition: KeyCondition) -> Self {
        Self {
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
            key_condition,
            filters: Vec::new(),
            limit: None,
            exclusive_start_key: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub items: Option<Vec<Item>>,
    pub scanned_count: usize,
    /// Present when the page stopped early; pass it back as
    /// `exclusive_start_key` to continue.
    pub last_evaluated_key: Option<Item>,
}
