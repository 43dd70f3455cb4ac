use arrow::{
    array::{Array, Date32Array, Float64Array, Int64Array, StringArray},
    datatypes::DataType,
    util::display::array_value_to_string,
};
use chrono::NaiveDate;

use crate::process::date_parser::from_date32;

/// One batch value on its way into a SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn at(arr: &dyn Array, row: usize) -> Cell {
        if arr.is_null(row) {
            return Cell::Null;
        }
        let any = arr.as_any();
        match arr.data_type() {
            DataType::Utf8 => any
                .downcast_ref::<StringArray>()
                .map(|a| Cell::Text(a.value(row).to_string())),
            DataType::Int64 => any
                .downcast_ref::<Int64Array>()
                .map(|a| Cell::Int(a.value(row))),
            DataType::Float64 => any
                .downcast_ref::<Float64Array>()
                .map(|a| Cell::Float(a.value(row))),
            DataType::Date32 => any
                .downcast_ref::<Date32Array>()
                .and_then(|a| from_date32(a.value(row)))
                .map(Cell::Date),
            _ => array_value_to_string(arr, row).ok().map(Cell::Text),
        }
        .unwrap_or(Cell::Null)
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(v) => Some(v.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}
