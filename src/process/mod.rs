// src/process/mod.rs

use arrow::datatypes::DataType;
use thiserror::Error;

pub mod columns;
pub mod convert;
pub mod date_parser;
pub mod skills;
pub mod utils;
pub mod wage;

pub use skills::normalize_skills;
pub use wage::clean_wage_table;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("required column `{0}` is missing")]
    MissingColumn(String),

    #[error("column `{column}` has type {found:?}, expected Utf8")]
    UnexpectedType { column: String, found: DataType },

    #[error("building record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
