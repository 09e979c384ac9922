#![forbid(unsafe_code)]

mod columns;
mod row;

pub use columns::*;
pub use row::*;
