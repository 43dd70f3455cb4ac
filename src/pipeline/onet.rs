// src/pipeline/onet.rs

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, instrument, warn};

use super::RunContext;
use crate::extract::read_first_sheet;
use crate::process::normalize_skills;
use crate::schema::onet_skills;
use crate::sink::{drop_null_required, TableSink};
use crate::snapshot::{ONET_SKILLS_CLEANED, ONET_SKILLS_RAW};

#[instrument(level = "info", skip(ctx), fields(run_date = %ctx.run_date, path = %skills_path.display()))]
pub fn onet_extract(ctx: &RunContext, skills_path: &Path) -> Result<usize> {
    let raw = read_first_sheet(skills_path)
        .with_context(|| format!("reading skills workbook {:?}", skills_path))?;
    let batch = raw.to_record_batch()?;
    ctx.snapshots
        .write_batch(ONET_SKILLS_RAW, ctx.run_date, &batch)?;

    info!(rows = batch.num_rows(), "onet extract done");
    Ok(batch.num_rows())
}

#[instrument(level = "info", skip(ctx), fields(run_date = %ctx.run_date))]
pub fn onet_transform(ctx: &RunContext) -> Result<usize> {
    let raw = ctx
        .snapshots
        .read_batch(ONET_SKILLS_RAW, ctx.run_date)
        .context("loading raw skills snapshot")?;
    let normalized = normalize_skills(&raw).context("normalizing skills table")?;
    ctx.snapshots
        .write_batch(ONET_SKILLS_CLEANED, ctx.run_date, &normalized)?;

    info!(rows = normalized.num_rows(), "onet transform done");
    Ok(normalized.num_rows())
}

#[instrument(level = "info", skip(ctx, sink), fields(run_date = %ctx.run_date, sink = sink.kind()))]
pub async fn onet_load(ctx: &RunContext, sink: &dyn TableSink) -> Result<usize> {
    let table = onet_skills();
    let normalized = ctx
        .snapshots
        .read_batch(ONET_SKILLS_CLEANED, ctx.run_date)
        .context("loading normalized skills snapshot")?;

    sink.ensure_table(&table).await?;
    let (batch, dropped) = drop_null_required(&table, &normalized)?;
    if dropped > 0 {
        warn!(dropped, table = %table.name, "dropped rows violating NOT NULL");
    }
    let written = sink.append(&table, &batch).await?;

    info!(written, "onet load done");
    Ok(written as usize)
}
