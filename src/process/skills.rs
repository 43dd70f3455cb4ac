// src/process/skills.rs

use arrow::{
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::columns::normalize_skills_header;
use super::convert::{canonicalize_nulls, cast_to_table};
use super::CleanError;
use crate::schema::onet_skills;

pub const DATE_COLUMN: &str = "date";

fn rename_columns(batch: &RecordBatch) -> Result<RecordBatch, CleanError> {
    let fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| {
            Field::new(
                normalize_skills_header(f.name()),
                f.data_type().clone(),
                f.is_nullable(),
            )
        })
        .collect();
    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        batch.columns().to_vec(),
    )?)
}

/// Normalize the O*NET skills sheet: snake_case headers, `MM/YYYY` dates, typed columns.
#[instrument(level = "info", skip(raw), fields(rows = raw.num_rows()))]
pub fn normalize_skills(raw: &RecordBatch) -> Result<RecordBatch, CleanError> {
    let batch = canonicalize_nulls(raw)?;
    let batch = rename_columns(&batch)?;
    if batch.schema().index_of(DATE_COLUMN).is_err() {
        return Err(CleanError::MissingColumn(DATE_COLUMN.to_string()));
    }

    // date parsing rides along with the destination casts (DATE → Date32)
    let batch = cast_to_table(&batch, &onet_skills())?;
    let batch = canonicalize_nulls(&batch)?;

    let missing_dates = batch
        .column_by_name(DATE_COLUMN)
        .map(|c| c.null_count())
        .unwrap_or(0);
    if batch.num_rows() > 0 && missing_dates == batch.num_rows() {
        warn!(rows = batch.num_rows(), "no date parsed as MM/YYYY; every row will be rejected at load");
    }
    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        missing_dates,
        "normalized skills table"
    );
    Ok(batch)
}
