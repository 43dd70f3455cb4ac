// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// A single destination column as declared in the table DDL.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    /// SQL type exactly as written in the DDL, e.g. `NUMERIC(10,2)`.
    pub ty: String,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            nullable: true,
        }
    }

    pub fn not_null(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            nullable: false,
        }
    }

    pub fn kind(&self) -> SqlKind {
        SqlKind::from_sql_type(&self.ty)
    }
}

/// Coarse storage class of a column; drives value binding and Arrow casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKind {
    Text,
    BigInt,
    Numeric,
    Date,
}

impl SqlKind {
    pub fn from_sql_type(ty: &str) -> Self {
        let upper = ty.trim().to_ascii_uppercase();
        if upper == "BIGINT" || upper == "INTEGER" || upper == "INT" {
            SqlKind::BigInt
        } else if upper.starts_with("NUMERIC")
            || upper.starts_with("DECIMAL")
            || upper == "DOUBLE"
            || upper == "FLOAT"
        {
            SqlKind::Numeric
        } else if upper == "DATE" {
            SqlKind::Date
        } else {
            SqlKind::Text
        }
    }
}

/// A fixed destination table: name plus ordered column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.nullable)
    }
}
