use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use oewsscraper::{
    config::{database_url, PipelineConfig, SinkKind},
    pipeline::{self, RunContext, Stage},
    sink::{DuckSink, PostgresSink, TableSink},
    snapshot::SnapshotStore,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "OEWS wage and O*NET skills ETL stages")]
struct Args {
    /// oews-extract | oews-transform | oews-load | onet-extract | onet-transform | onet-load | all
    stage: String,
    /// Run date (YYYY-MM-DD); defaults to today.
    #[arg(short, long)]
    date: Option<String>,
    /// Optional YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct Runner {
    cfg: PipelineConfig,
    ctx: RunContext,
    sink: Option<Box<dyn TableSink>>,
}

impl Runner {
    async fn sink(&mut self) -> Result<&dyn TableSink> {
        if self.sink.is_none() {
            let sink: Box<dyn TableSink> = match self.cfg.sink.kind {
                SinkKind::Postgres => Box::new(
                    PostgresSink::connect(&database_url()?, self.cfg.insert_chunk_rows).await?,
                ),
                SinkKind::Duckdb => Box::new(DuckSink::open(&self.cfg.duckdb_path())?),
            };
            self.sink = Some(sink);
        }
        self.sink
            .as_deref()
            .context("sink was not initialised")
    }

    async fn run(&mut self, stage: Stage) -> Result<usize> {
        let ctx = self.ctx.clone();
        match stage {
            Stage::OewsExtract => {
                let source = self
                    .cfg
                    .page_source(ctx.snapshots.html_path(ctx.run_date))?;
                pipeline::oews_extract(&ctx, source.as_ref(), &self.cfg.url).await
            }
            Stage::OewsTransform => pipeline::oews_transform(&ctx),
            Stage::OewsLoad => pipeline::oews_load(&ctx, self.sink().await?).await,
            Stage::OnetExtract => pipeline::onet_extract(&ctx, &self.cfg.skills_path()),
            Stage::OnetTransform => pipeline::onet_transform(&ctx),
            Stage::OnetLoad => pipeline::onet_load(&ctx, self.sink().await?).await,
        }
    }

    /// Run a chain in order, stopping at the first failing stage.
    async fn run_chain(&mut self, chain: &[Stage]) -> Result<()> {
        for &stage in chain {
            let rows = self
                .run(stage)
                .await
                .with_context(|| format!("stage {} failed", stage.as_str()))?;
            info!(stage = stage.as_str(), rows, "stage complete");
        }
        Ok(())
    }
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date {:?}, expected YYYY-MM-DD", s)),
        None => Ok(Local::now().date_naive()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) arguments, config, run date ──────────────────────────────
    let args = Args::parse();
    let cfg = PipelineConfig::load(args.config.as_deref())?;
    let run_date = parse_date(args.date.as_deref())?;
    let ctx = RunContext::new(run_date, SnapshotStore::new(&cfg.base_dir));
    info!(stage = %args.stage, %run_date, "startup");

    let mut runner = Runner {
        cfg,
        ctx,
        sink: None,
    };

    // ─── 3) dispatch ─────────────────────────────────────────────────
    if args.stage.trim().eq_ignore_ascii_case("all") {
        let mut failed = Vec::new();
        for (name, chain) in [("oews", Stage::OEWS_CHAIN), ("onet", Stage::ONET_CHAIN)] {
            if let Err(e) = runner.run_chain(&chain).await {
                error!(chain = name, "{:#}", e);
                failed.push(name);
            }
        }
        if !failed.is_empty() {
            bail!("chains failed: {}", failed.join(", "));
        }
    } else {
        let stage = match Stage::from_str(&args.stage) {
            Some(s) => s,
            None => bail!("unknown stage {:?}", args.stage),
        };
        runner.run_chain(&[stage]).await?;
    }

    info!("done");
    Ok(())
}
