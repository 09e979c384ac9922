#![forbid(unsafe_code)]

//! The fixed key layout every row operation is written against.
//!
//! Changing any of these definitions requires a data migration: existing
//! tables keep the layout they were created with.

use crate::config::StoreConfig;
use crate::table::{
    BillingMode, CreateTableRequest, IndexDefinition, IndexScope, KeySchema, Projection,
    SseSpecification,
};

pub const ATTR_TYPE: &str = "type";
pub const ATTR_ID: &str = "id";
pub const ATTR_LABEL: &str = "label";
pub const ATTR_PARENT_ID: &str = "parent_id";
pub const ATTR_COLUMNS: &str = "columns";

/// `parent_id` HASH, `label` RANGE: labels within a parent.
pub const INDEX_BY_PARENT_AND_LABEL: &str = "ByParentAndLabel";
/// `type` HASH: every row of a type.
pub const INDEX_BY_TYPE: &str = "ByType";
/// `type` HASH, `label` RANGE: labels within a type.
pub const INDEX_BY_TYPE_AND_LABEL: &str = "ByTypeAndLabel";
/// `type` HASH, `parent_id` RANGE: children of one type under a parent.
pub const INDEX_BY_TYPE_AND_PARENT: &str = "ByTypeAndParent";

pub fn table_request(config: &StoreConfig) -> CreateTableRequest {
    CreateTableRequest {
        table_name: config.table_name().to_string(),
        attribute_definitions: vec![
            ATTR_TYPE.to_string(),
            ATTR_ID.to_string(),
            ATTR_PARENT_ID.to_string(),
            ATTR_LABEL.to_string(),
        ],
        key: KeySchema::composite(ATTR_TYPE, ATTR_ID),
        indexes: vec![
            index(
                INDEX_BY_PARENT_AND_LABEL,
                IndexScope::Global,
                KeySchema::composite(ATTR_PARENT_ID, ATTR_LABEL),
            ),
            index(INDEX_BY_TYPE, IndexScope::Global, KeySchema::hash(ATTR_TYPE)),
            index(
                INDEX_BY_TYPE_AND_LABEL,
                IndexScope::Local,
                KeySchema::composite(ATTR_TYPE, ATTR_LABEL),
            ),
            index(
                INDEX_BY_TYPE_AND_PARENT,
                IndexScope::Local,
                KeySchema::composite(ATTR_TYPE, ATTR_PARENT_ID),
            ),
        ],
        billing_mode: BillingMode::PayPerRequest,
        sse: SseSpecification {
            enabled: true,
            key_ref: Some(config.key_ref().to_string()),
        },
    }
}

fn index(name: &str, scope: IndexScope, key: KeySchema) -> IndexDefinition {
    IndexDefinition {
        name: name.to_string(),
        scope,
        key,
        projection: Projection::All,
    }
}
