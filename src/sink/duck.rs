// src/sink/duck.rs

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use duckdb::{params_from_iter, types::Value, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, instrument};

use super::{column_plan, Cell, SinkError, TableSink};
use crate::process::date_parser::to_date32;
use crate::schema::{create_table_sql, ddl::insert_prefix, ddl::quote_ident, SqlKind, TableDef};

/// DuckDB-backed sink, for local runs without a database server.
pub struct DuckSink {
    conn: Mutex<Connection>,
}

fn to_value(cell: &Cell, kind: SqlKind) -> Value {
    let value = match kind {
        SqlKind::Text => cell.as_text().map(Value::Text),
        SqlKind::BigInt => cell.as_i64().map(Value::BigInt),
        SqlKind::Numeric => cell.as_f64().map(Value::Double),
        SqlKind::Date => cell.as_date().map(|d| Value::Date32(to_date32(d))),
    };
    value.unwrap_or(Value::Null)
}

impl DuckSink {
    /// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::Connect {
                target: path.display().to_string(),
                detail: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(|e| SinkError::Connect {
            target: path.display().to_string(),
            detail: e.to_string(),
        })?;
        info!(path = %path.display(), "opened duckdb");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a DuckDB in-memory database
    pub fn in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory().map_err(|e| SinkError::Connect {
            target: ":memory:".to_string(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self, table: &str) -> Result<MutexGuard<'_, Connection>, SinkError> {
        self.conn.lock().map_err(|_| SinkError::Write {
            table: table.to_string(),
            detail: "duckdb connection lock poisoned".to_string(),
        })
    }

    pub fn count_rows(&self, table: &str) -> Result<i64, SinkError> {
        let conn = self.lock(table)?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |r| r.get(0),
        )
        .map_err(|e| SinkError::Write {
            table: table.to_string(),
            detail: e.to_string(),
        })
    }

    fn append_blocking(&self, table: &TableDef, batch: &RecordBatch) -> Result<u64, SinkError> {
        let plan = column_plan(table, batch)?;
        if batch.num_rows() == 0 || plan.is_empty() {
            return Ok(0);
        }
        let write_err = |e: duckdb::Error| SinkError::Write {
            table: table.name.clone(),
            detail: e.to_string(),
        };

        let names: Vec<&str> = plan.iter().map(|(_, c)| c.name.as_str()).collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!("{}VALUES ({})", insert_prefix(table, &names), placeholders);

        let mut conn = self.lock(&table.name)?;
        let tx = conn.transaction().map_err(write_err)?;
        let mut written = 0u64;
        {
            let mut stmt = tx.prepare(&sql).map_err(write_err)?;
            for row in 0..batch.num_rows() {
                let values: Vec<Value> = plan
                    .iter()
                    .map(|(idx, col)| to_value(&Cell::at(batch.column(*idx).as_ref(), row), col.kind()))
                    .collect();
                written += stmt.execute(params_from_iter(values.iter())).map_err(write_err)? as u64;
            }
        }
        tx.commit().map_err(write_err)?;
        Ok(written)
    }
}

#[async_trait]
impl TableSink for DuckSink {
    fn kind(&self) -> &'static str {
        "duckdb"
    }

    #[instrument(level = "info", skip(self, table), fields(table = %table.name))]
    async fn ensure_table(&self, table: &TableDef) -> Result<(), SinkError> {
        let conn = self.lock(&table.name)?;
        conn.execute_batch(&create_table_sql(table))
            .map_err(|e| SinkError::Schema {
                table: table.name.clone(),
                detail: e.to_string(),
            })?;
        info!("table created or already exists");
        Ok(())
    }

    #[instrument(level = "info", skip(self, table, batch), fields(table = %table.name, rows = batch.num_rows()))]
    async fn append(&self, table: &TableDef, batch: &RecordBatch) -> Result<u64, SinkError> {
        let written = self.append_blocking(table, batch)?;
        info!(written, "appended rows");
        Ok(written)
    }
}
