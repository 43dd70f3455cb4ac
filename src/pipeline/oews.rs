// src/pipeline/oews.rs

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::RunContext;
use crate::extract::extract_table;
use crate::fetch::PageSource;
use crate::process::clean_wage_table;
use crate::schema::oews_by_state;
use crate::sink::{drop_null_required, TableSink};
use crate::snapshot::{OEWS_CLEANED, OEWS_RAW};

/// Render the wage page, archive its markup, snapshot the raw occupation table.
#[instrument(level = "info", skip(ctx, source), fields(run_date = %ctx.run_date))]
pub async fn oews_extract(ctx: &RunContext, source: &dyn PageSource, url: &str) -> Result<usize> {
    let html = source
        .fetch(url)
        .await
        .with_context(|| format!("fetching {}", url))?;
    ctx.snapshots.write_html(ctx.run_date, &html)?;

    let raw = extract_table(&html).context("extracting occupation table")?;
    let batch = raw.to_record_batch()?;
    ctx.snapshots.write_batch(OEWS_RAW, ctx.run_date, &batch)?;

    info!(rows = batch.num_rows(), columns = batch.num_columns(), "oews extract done");
    Ok(batch.num_rows())
}

#[instrument(level = "info", skip(ctx), fields(run_date = %ctx.run_date))]
pub fn oews_transform(ctx: &RunContext) -> Result<usize> {
    let raw = ctx
        .snapshots
        .read_batch(OEWS_RAW, ctx.run_date)
        .context("loading raw wage snapshot")?;
    let cleaned = clean_wage_table(&raw).context("cleaning wage table")?;
    ctx.snapshots.write_batch(OEWS_CLEANED, ctx.run_date, &cleaned)?;

    info!(rows_in = raw.num_rows(), rows_out = cleaned.num_rows(), "oews transform done");
    Ok(cleaned.num_rows())
}

#[instrument(level = "info", skip(ctx, sink), fields(run_date = %ctx.run_date, sink = sink.kind()))]
pub async fn oews_load(ctx: &RunContext, sink: &dyn TableSink) -> Result<usize> {
    let table = oews_by_state();
    let cleaned = ctx
        .snapshots
        .read_batch(OEWS_CLEANED, ctx.run_date)
        .context("loading cleaned wage snapshot")?;

    sink.ensure_table(&table).await?;
    let (batch, dropped) = drop_null_required(&table, &cleaned)?;
    if dropped > 0 {
        warn!(dropped, table = %table.name, "dropped rows violating NOT NULL");
    }
    let written = sink.append(&table, &batch).await?;

    info!(written, "oews load done");
    Ok(written as usize)
}
