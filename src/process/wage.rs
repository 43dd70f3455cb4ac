// src/process/wage.rs

use arrow::{
    array::{Array, ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::columns::normalize_wage_header;
use super::convert::{canonicalize_nulls, to_float64, to_int64};
use super::utils::normalize_cell;
use super::CleanError;

/// Name the occupation header normalizes to before it is split.
pub const COMPOSITE_COLUMN: &str = "occupation_soc_code";

/// Columns stored as nullable integers; everything else numeric is a decimal.
pub const INTEGER_COLUMNS: [&str; 7] = [
    "employment",
    "annual_mean_wage",
    "annual_10th_percentile_wage",
    "annual_25th_percentile_wage",
    "annual_median_wage",
    "annual_75th_percentile_wage",
    "annual_90th_percentile_wage",
];

/// Split `"Chief Executives (11-1011)"` into `("Chief Executives", "11-1011")`.
pub fn split_occupation(combined: &str) -> (String, Option<String>) {
    let mut parts = combined.split('(');
    let occupation = parts.next().unwrap_or_default().trim().to_string();
    let code = parts.next().map(|p| p.replace(')', "").trim().to_string());
    (occupation, code)
}

/// Turn the raw text table into the typed wage table:
/// `soc_code`, `occupation`, then every other column as Int64 or Float64.
#[instrument(level = "info", skip(raw), fields(rows = raw.num_rows()))]
pub fn clean_wage_table(raw: &RecordBatch) -> Result<RecordBatch, CleanError> {
    let schema = raw.schema();
    let names: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| normalize_wage_header(f.name()))
        .collect();

    let composite_idx = names
        .iter()
        .position(|n| n == COMPOSITE_COLUMN)
        .ok_or_else(|| CleanError::MissingColumn(COMPOSITE_COLUMN.to_string()))?;

    let text_column = |idx: usize| -> Result<&StringArray, CleanError> {
        let arr = raw.column(idx);
        arr.as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| CleanError::UnexpectedType {
                column: names[idx].clone(),
                found: arr.data_type().clone(),
            })
    };

    // 1) split the composite field; rows without both halves cannot be keyed
    let composite = text_column(composite_idx)?;
    let mut soc_codes = Vec::with_capacity(raw.num_rows());
    let mut occupations = Vec::with_capacity(raw.num_rows());
    let mut keep = Vec::with_capacity(raw.num_rows());
    for row in 0..raw.num_rows() {
        let (occupation, code) = if composite.is_null(row) {
            (String::new(), None)
        } else {
            split_occupation(composite.value(row))
        };
        let occupation = normalize_cell(Some(&occupation));
        let code = code.and_then(|c| normalize_cell(Some(&c)));
        match (occupation, code) {
            (Some(o), Some(c)) if !o.is_empty() && !c.is_empty() => {
                occupations.push(o);
                soc_codes.push(c);
                keep.push(row);
            }
            _ => warn!(row, "occupation or SOC code missing, dropping row"),
        }
    }

    let mut fields = vec![
        Field::new("soc_code", DataType::Utf8, false),
        Field::new("occupation", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(soc_codes)),
        Arc::new(StringArray::from(occupations)),
    ];

    // 2) normalize every other cell, then cast by the integer allowlist
    for (idx, name) in names.iter().enumerate() {
        if idx == composite_idx {
            continue;
        }
        let source = text_column(idx)?;
        let normalized: StringArray = keep
            .iter()
            .map(|&row| {
                let cell = (!source.is_null(row)).then(|| source.value(row));
                normalize_cell(cell)
            })
            .collect();
        let normalized: ArrayRef = Arc::new(normalized);

        let typed = if INTEGER_COLUMNS.contains(&name.as_str()) {
            to_int64(name, &normalized)?
        } else {
            to_float64(name, &normalized)?
        };
        fields.push(Field::new(name, typed.data_type().clone(), true));
        columns.push(typed);
    }

    for expected in INTEGER_COLUMNS {
        if !names.iter().any(|n| n == expected) {
            warn!(column = expected, "integer column absent from source table");
        }
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    let batch = canonicalize_nulls(&batch)?;
    info!(
        rows = batch.num_rows(),
        dropped = raw.num_rows() - batch.num_rows(),
        columns = batch.num_columns(),
        "cleaned wage table"
    );
    Ok(batch)
}
