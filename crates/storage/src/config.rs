#![forbid(unsafe_code)]

use crate::StoreError;
use serde::{Deserialize, Serialize};

pub const TABLE_NAME_ENV: &str = "SCHEMA_TABLE_NAME";
pub const KEY_REF_ENV: &str = "SCHEMA_KMS_KEY_REF";

/// Identity of the backing table, fixed for the lifetime of a store handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    table_name: String,
    key_ref: String,
}

impl StoreConfig {
    pub fn new(table_name: impl Into<String>, key_ref: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key_ref: key_ref.into(),
        }
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from `SCHEMA_TABLE_NAME` and `SCHEMA_KMS_KEY_REF` as
    /// resolved by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let table_name = lookup(TABLE_NAME_ENV)
            .ok_or(StoreError::InvalidInput("SCHEMA_TABLE_NAME is not set"))?;
        let key_ref =
            lookup(KEY_REF_ENV).ok_or(StoreError::InvalidInput("SCHEMA_KMS_KEY_REF is not set"))?;
        let config = Self::new(table_name, key_ref);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.table_name.trim().is_empty() {
            return Err(StoreError::InvalidInput("table name must not be empty"));
        }
        if self.key_ref.trim().is_empty() {
            return Err(StoreError::InvalidInput("key reference must not be empty"));
        }
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Reference to the key that encrypts the table at rest.
    pub fn key_ref(&self) -> &str {
        &self.key_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"table_name":"rows","key_ref":"key/a"}"#)
                .expect("config deserializes");
        assert_eq!(config, StoreConfig::new("rows", "key/a"));
        config.validate().expect("config is valid");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        }
    }

    #[test]
    fn reads_both_variables() {
        let config = StoreConfig::from_lookup(vars(&[
            (TABLE_NAME_ENV, "rows"),
            (KEY_REF_ENV, "key/a"),
        ]))
        .expect("config from variables");
        assert_eq!(config, StoreConfig::new("rows", "key/a"));
    }

    #[test]
    fn missing_or_blank_variables_are_rejected() {
        let err = StoreConfig::from_lookup(vars(&[(KEY_REF_ENV, "key/a")])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput("SCHEMA_TABLE_NAME is not set")));

        let err = StoreConfig::from_lookup(vars(&[(TABLE_NAME_ENV, "rows")])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput("SCHEMA_KMS_KEY_REF is not set")));

        let err = StoreConfig::from_lookup(vars(&[
            (TABLE_NAME_ENV, "  "),
            (KEY_REF_ENV, "key/a"),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn empty_fields_are_invalid() {
        let err = StoreConfig::new(" ", "key/a").validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(StoreConfig::new("rows", "").validate().is_err());
    }
}
