use arrow::{
    array::{Array, ArrayRef, Date32Builder, Float64Array, Float64Builder, Int64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::{date_parser, CleanError};
use crate::schema::{target_type, TableDef};

/// Permissive integer coercion: integral decimals like `"1200.0"` pass, anything
/// fractional or non-numeric is `None`.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = parse_float(s)?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Permissive float coercion; NaN and infinities count as missing.
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn as_strings<'a>(name: &str, arr: &'a ArrayRef) -> Result<&'a StringArray, CleanError> {
    arr.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| CleanError::UnexpectedType {
            column: name.to_string(),
            found: arr.data_type().clone(),
        })
}

/// Utf8 → nullable Int64.
pub fn to_int64(name: &str, arr: &ArrayRef) -> Result<ArrayRef, CleanError> {
    let sarr = as_strings(name, arr)?;
    let mut b = Int64Builder::with_capacity(sarr.len());
    for opt in sarr.iter() {
        let v = opt.and_then(|s| {
            let v = parse_int(s);
            if v.is_none() {
                debug!(column = name, value = s, "not an integer, storing null");
            }
            v
        });
        b.append_option(v);
    }
    Ok(Arc::new(b.finish()))
}

/// Utf8 → nullable Float64.
pub fn to_float64(name: &str, arr: &ArrayRef) -> Result<ArrayRef, CleanError> {
    let sarr = as_strings(name, arr)?;
    let mut b = Float64Builder::with_capacity(sarr.len());
    for opt in sarr.iter() {
        let v = opt.and_then(|s| {
            let v = parse_float(s);
            if v.is_none() {
                debug!(column = name, value = s, "not a number, storing null");
            }
            v
        });
        b.append_option(v);
    }
    Ok(Arc::new(b.finish()))
}

/// Utf8 `MM/YYYY` → nullable Date32.
pub fn to_date32(name: &str, arr: &ArrayRef) -> Result<ArrayRef, CleanError> {
    let sarr = as_strings(name, arr)?;
    let mut b = Date32Builder::with_capacity(sarr.len());
    for opt in sarr.iter() {
        let v = opt.and_then(|s| {
            let v = date_parser::parse_month_year(s);
            if v.is_none() {
                debug!(column = name, value = s, "not a MM/YYYY date, storing null");
            }
            v
        });
        b.append_option(v.map(date_parser::to_date32));
    }
    Ok(Arc::new(b.finish()))
}

/// Replace every NaN/infinite float with null so only one missing-value form survives.
pub fn canonicalize_nulls(batch: &RecordBatch) -> Result<RecordBatch, CleanError> {
    let mut cols = Vec::with_capacity(batch.num_columns());
    for arr in batch.columns() {
        match arr.as_any().downcast_ref::<Float64Array>() {
            Some(farr) if farr.iter().flatten().any(|v| !v.is_finite()) => {
                let cleaned: Float64Array = farr
                    .iter()
                    .map(|opt| opt.filter(|v| v.is_finite()))
                    .collect();
                cols.push(Arc::new(cleaned) as ArrayRef);
            }
            _ => cols.push(arr.clone()),
        }
    }
    Ok(RecordBatch::try_new(batch.schema(), cols)?)
}

/// Cast the Utf8 columns that `table` knows about into its destination types.
/// Columns already typed, or unknown to the table, pass through untouched.
pub fn cast_to_table(batch: &RecordBatch, table: &TableDef) -> Result<RecordBatch, CleanError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut cols = Vec::with_capacity(batch.num_columns());

    for (field, arr) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let target = target_type(table, name);
        let converted = match (arr.data_type(), target) {
            (DataType::Utf8, Some(DataType::Int64)) => to_int64(name, arr)?,
            (DataType::Utf8, Some(DataType::Float64)) => to_float64(name, arr)?,
            (DataType::Utf8, Some(DataType::Date32)) => to_date32(name, arr)?,
            _ => arr.clone(),
        };
        fields.push(Field::new(name, converted.data_type().clone(), true));
        cols.push(converted);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), cols)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::onet_skills;
    use arrow::array::{Date32Array, Int64Array};

    #[test]
    fn integer_coercion_never_truncates() {
        assert_eq!(parse_int("1200"), Some(1200));
        assert_eq!(parse_int("1200.0"), Some(1200));
        assert_eq!(parse_int("1200.5"), None);
        assert_eq!(parse_int("#"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn float_coercion_drops_nan() {
        assert_eq!(parse_float("45.20"), Some(45.2));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("**"), None);
    }

    #[test]
    fn nan_is_canonicalized() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Float64, true)]));
        let arr: ArrayRef = Arc::new(Float64Array::from(vec![Some(1.0), Some(f64::NAN), None]));
        let batch = RecordBatch::try_new(schema, vec![arr]).unwrap();
        let out = canonicalize_nulls(&batch).unwrap();
        let col = out.column(0).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(col.value(0), 1.0);
        assert!(col.is_null(1));
        assert!(col.is_null(2));
    }

    #[test]
    fn casts_follow_destination_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("n", DataType::Utf8, true),
            Field::new("data_value", DataType::Utf8, true),
            Field::new("date", DataType::Utf8, true),
            Field::new("extra", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("8"), Some("x")])),
                Arc::new(StringArray::from(vec![Some("3.5"), None])),
                Arc::new(StringArray::from(vec![Some("05/2024"), Some("N/A")])),
                Arc::new(StringArray::from(vec![Some("a"), Some("b")])),
            ],
        )
        .unwrap();

        let out = cast_to_table(&batch, &onet_skills()).unwrap();
        let n = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(n.value(0), 8);
        assert!(n.is_null(1));
        let date = out.column(2).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(
            date.value_as_date(0),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert!(date.is_null(1));
        assert_eq!(out.schema().field(3).data_type(), &DataType::Utf8);
    }
}
