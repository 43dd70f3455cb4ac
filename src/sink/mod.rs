// src/sink/mod.rs

use arrow::{
    array::{Array, BooleanArray},
    compute::filter_record_batch,
    record_batch::RecordBatch,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::schema::{Column, TableDef};

pub mod cell;
pub mod duck;
pub mod postgres;

pub use cell::Cell;
pub use duck::DuckSink;
pub use postgres::PostgresSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("connecting to {target}: {detail}")]
    Connect { target: String, detail: String },

    #[error("creating table {table}: {detail}")]
    Schema { table: String, detail: String },

    #[error("writing to {table}: {detail}")]
    Write { table: String, detail: String },

    #[error("column `{column}` is not part of table {table}")]
    UnknownColumn { table: String, column: String },
}

/// Relational destination for the cleaned datasets.
///
/// `append` reports the rows written, or an error; a failed write is never `Ok(0)`.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Short label for logs, e.g. `"postgres"`.
    fn kind(&self) -> &'static str;

    /// `CREATE TABLE IF NOT EXISTS`; safe to call before every load.
    async fn ensure_table(&self, table: &TableDef) -> Result<(), SinkError>;

    /// Append every row of `batch` to `table` in one transaction.
    async fn append(&self, table: &TableDef, batch: &RecordBatch) -> Result<u64, SinkError>;
}

/// Pair each batch column with its destination column, in batch order.
pub(crate) fn column_plan<'t>(
    table: &'t TableDef,
    batch: &RecordBatch,
) -> Result<Vec<(usize, &'t Column)>, SinkError> {
    batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            table
                .column(field.name())
                .map(|col| (idx, col))
                .ok_or_else(|| SinkError::UnknownColumn {
                    table: table.name.clone(),
                    column: field.name().clone(),
                })
        })
        .collect()
}

/// Remove rows that would violate a `NOT NULL` column of `table`.
/// Returns the kept rows and how many were dropped.
pub fn drop_null_required(
    table: &TableDef,
    batch: &RecordBatch,
) -> Result<(RecordBatch, usize), arrow::error::ArrowError> {
    let required: Vec<_> = table
        .required_columns()
        .filter_map(|c| batch.column_by_name(&c.name))
        .collect();
    if required.iter().all(|arr| arr.null_count() == 0) {
        return Ok((batch.clone(), 0));
    }

    let mask: BooleanArray = (0..batch.num_rows())
        .map(|row| Some(required.iter().all(|arr| arr.is_valid(row))))
        .collect();
    let kept = filter_record_batch(batch, &mask)?;
    let dropped = batch.num_rows() - kept.num_rows();
    Ok((kept, dropped))
}
