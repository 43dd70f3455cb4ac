// src/extract/mod.rs

use std::path::PathBuf;
use thiserror::Error;

pub mod excel;
pub mod html;
pub mod raw_table;

pub use excel::read_first_sheet;
pub use html::{extract_table, has_target_table, TARGET_HEADER};
pub use raw_table::RawTable;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("target table not found")]
    TableNotFound,

    #[error("no data rows")]
    NoDataRows,

    #[error("reading spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("spreadsheet {0} has no worksheet")]
    NoWorksheet(PathBuf),

    #[error("building record batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
