use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::warn;

use super::ExtractionError;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column labels exactly as the source presents them.
    pub headers: Vec<String>,
    /// One entry per body row; `None` marks a cell the source did not provide.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table, padding short rows with nulls and dropping cells past the header width.
    pub fn from_ragged(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, mut row)| {
                if row.len() < width {
                    warn!(row = idx, cells = row.len(), width, "short row, padding with nulls");
                    row.resize(width, None);
                } else if row.len() > width {
                    warn!(row = idx, cells = row.len(), width, "long row, dropping extra cells");
                    row.truncate(width);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// All-text batch, one nullable Utf8 column per header.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ExtractionError> {
        let fields: Vec<Field> = self
            .headers
            .iter()
            .map(|h| Field::new(h, DataType::Utf8, true))
            .collect();
        let columns: Vec<ArrayRef> = (0..self.headers.len())
            .map(|i| {
                let arr: StringArray = self
                    .rows
                    .iter()
                    .map(|row| row.get(i).and_then(|c| c.as_deref()))
                    .collect();
                Arc::new(arr) as ArrayRef
            })
            .collect();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}
