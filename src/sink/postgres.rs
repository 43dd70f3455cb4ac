// src/sink/postgres.rs

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{column_plan, Cell, SinkError, TableSink};
use crate::schema::{create_table_sql, ddl::insert_prefix, SqlKind, TableDef};

/// Bind parameters per statement are capped by the wire protocol.
const MAX_BIND_PARAMS: usize = 65_535;

/// Rows per INSERT: the configured chunk, shrunk so one statement stays under the bind limit.
pub(crate) fn rows_per_statement(chunk_rows: usize, columns: usize) -> usize {
    chunk_rows.min(MAX_BIND_PARAMS / columns.max(1)).max(1)
}

pub struct PostgresSink {
    pool: PgPool,
    chunk_rows: usize,
}

impl PostgresSink {
    /// Connect with a single pooled connection; the load stages never write concurrently.
    pub async fn connect(database_url: &str, chunk_rows: usize) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| SinkError::Connect {
                target: "postgres".to_string(),
                detail: e.to_string(),
            })?;
        info!("connected to postgres");
        Ok(Self {
            pool,
            chunk_rows: chunk_rows.max(1),
        })
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    #[instrument(level = "info", skip(self, table), fields(table = %table.name))]
    async fn ensure_table(&self, table: &TableDef) -> Result<(), SinkError> {
        sqlx::query(&create_table_sql(table))
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::Schema {
                table: table.name.clone(),
                detail: e.to_string(),
            })?;
        info!("table created or already exists");
        Ok(())
    }

    #[instrument(level = "info", skip(self, table, batch), fields(table = %table.name, rows = batch.num_rows()))]
    async fn append(&self, table: &TableDef, batch: &RecordBatch) -> Result<u64, SinkError> {
        let plan = column_plan(table, batch)?;
        if batch.num_rows() == 0 || plan.is_empty() {
            return Ok(0);
        }
        let write_err = |e: sqlx::Error| SinkError::Write {
            table: table.name.clone(),
            detail: e.to_string(),
        };

        let names: Vec<&str> = plan.iter().map(|(_, c)| c.name.as_str()).collect();
        let chunk = rows_per_statement(self.chunk_rows, names.len());
        let prefix = insert_prefix(table, &names);

        let mut tx = self.pool.begin().await.map_err(write_err)?;
        let mut written = 0u64;
        let total = batch.num_rows();
        for start in (0..total).step_by(chunk) {
            let end = (start + chunk).min(total);
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(&prefix);
            qb.push_values(start..end, |mut row_values, row| {
                for (idx, col) in &plan {
                    let cell = Cell::at(batch.column(*idx).as_ref(), row);
                    match col.kind() {
                        SqlKind::Text => {
                            row_values.push_bind(cell.as_text());
                        }
                        SqlKind::BigInt => {
                            row_values.push_bind(cell.as_i64());
                        }
                        SqlKind::Numeric => {
                            row_values.push_bind(cell.as_f64());
                        }
                        SqlKind::Date => {
                            row_values.push_bind(cell.as_date());
                        }
                    }
                }
            });
            let result = qb.build().execute(&mut *tx).await.map_err(write_err)?;
            written += result.rows_affected();
            debug!(start, end, "inserted chunk");
        }
        tx.commit().await.map_err(write_err)?;

        info!(written, "appended rows");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{oews_by_state, onet_skills};
    use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    #[test]
    fn statement_size_respects_bind_limit() {
        let width = oews_by_state().columns.len();
        assert_eq!(width, 19);
        assert_eq!(rows_per_statement(10_000, width), 3_449);
        assert!(rows_per_statement(10_000, width) * width <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(1_000, width), 1_000);
        assert_eq!(rows_per_statement(0, width), 1);
        assert_eq!(rows_per_statement(5, 0), 5);
        assert_eq!(rows_per_statement(100_000, 100_000), 1);
    }

    fn skills_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("onet_soc_code", DataType::Utf8, true),
            Field::new("element_id", DataType::Utf8, true),
            Field::new("scale_id", DataType::Utf8, true),
            Field::new("data_value", DataType::Float64, true),
            Field::new("n", DataType::Int64, true),
            Field::new("date", DataType::Date32, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["11-1011.00", "11-1011.00", "11-1011.00"])) as ArrayRef,
                Arc::new(StringArray::from(vec!["2.A.1.a", "2.A.1.a", "2.A.1.b"])),
                Arc::new(StringArray::from(vec!["IM", "LV", "IM"])),
                Arc::new(Float64Array::from(vec![Some(4.12), None, Some(4.0)])),
                Arc::new(Int64Array::from(vec![Some(8), Some(8), None])),
                Arc::new(Date32Array::from(vec![19844, 19844, 19844])),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_batch_never_touches_the_database() {
        // lazy pool: nothing listens at this address
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let sink = PostgresSink { pool, chunk_rows: 10 };
        let written = sink
            .append(&onet_skills(), &skills_batch().slice(0, 0))
            .await
            .unwrap();
        assert_eq!(written, 0);
    }

    /// Needs a scratch database: `DATABASE_URL=postgres://... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn appends_in_chunks_against_a_live_database() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let mut table = onet_skills();
        table.name = format!("onet_skills_it_{}", std::process::id());

        // two rows per statement forces a second chunk
        let sink = PostgresSink::connect(&url, 2).await.unwrap();
        sink.ensure_table(&table).await.unwrap();
        sink.ensure_table(&table).await.unwrap();

        assert_eq!(sink.append(&table, &skills_batch()).await.unwrap(), 3);
        assert_eq!(sink.append(&table, &skills_batch().slice(0, 0)).await.unwrap(), 0);

        let (rows, null_values, may_first): (i64, i64, i64) = sqlx::query_as(&format!(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE data_value IS NULL), \
             COUNT(*) FILTER (WHERE date = DATE '2024-05-01') FROM \"{}\"",
            table.name
        ))
        .fetch_one(&sink.pool)
        .await
        .unwrap();
        assert_eq!((rows, null_values, may_first), (3, 1, 3));

        sqlx::query(&format!("DROP TABLE \"{}\"", table.name))
            .execute(&sink.pool)
            .await
            .unwrap();
    }
}
