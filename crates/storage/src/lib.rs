#![forbid(unsafe_code)]

mod codec;
mod config;
mod error;
mod rows;

pub mod layout;
pub mod lifecycle;
pub mod table;

pub use config::{KEY_REF_ENV, StoreConfig, TABLE_NAME_ENV};
pub use error::{Lookup, StoreError};
pub use rows::*;
pub use schema_core::{ColumnValue, Columns, Row};
