// src/schema/arrow.rs

use arrow::datatypes::DataType;

use super::types::{SqlKind, TableDef};

/// Map a destination column type into the Arrow DataType carried in snapshots.
///
/// Covers:
/// - BIGINT, INTEGER, INT          → Int64
/// - NUMERIC*, DECIMAL*, DOUBLE    → Float64
/// - DATE                          → Date32
/// - TEXT and anything else        → Utf8
pub fn map_to_arrow_type(ty: &str) -> DataType {
    match SqlKind::from_sql_type(ty) {
        SqlKind::BigInt => DataType::Int64,
        SqlKind::Numeric => DataType::Float64,
        SqlKind::Date => DataType::Date32,
        SqlKind::Text => DataType::Utf8,
    }
}

/// Arrow type a batch column should have to land in `table.<name>`, if the table knows it.
pub fn target_type(table: &TableDef, name: &str) -> Option<DataType> {
    table.column(name).map(|c| map_to_arrow_type(&c.ty))
}
