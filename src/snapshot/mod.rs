// src/snapshot/mod.rs

use anyhow::{Context, Result};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const OEWS_HTML: &str = "oews_html";
pub const OEWS_RAW: &str = "oews_raw";
pub const OEWS_CLEANED: &str = "oews_cleaned";
pub const ONET_SKILLS_RAW: &str = "onet_skills_raw";
pub const ONET_SKILLS_CLEANED: &str = "onet_skills_cleaned";

/// Date-partitioned snapshots handed from one stage to the next:
/// `<base>/<name>/<YYYY-MM-DD>/<name>.<ext>`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str, date: NaiveDate, ext: &str) -> PathBuf {
        self.base_dir
            .join(name)
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{}.{}", name, ext))
    }

    pub fn parquet_path(&self, name: &str, date: NaiveDate) -> PathBuf {
        self.file_path(name, date, "parquet")
    }

    pub fn html_path(&self, date: NaiveDate) -> PathBuf {
        self.file_path(OEWS_HTML, date, "html")
    }

    /// Write via a temp file + rename so a reader never sees a half-written snapshot.
    fn write_atomic(path: &Path, write: impl FnOnce(File) -> Result<()>) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {:?}", parent))?;
        }
        let tmp = path.with_extension("tmp");
        let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
        write(file)?;
        fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
        Ok(())
    }

    pub fn write_batch(&self, name: &str, date: NaiveDate, batch: &RecordBatch) -> Result<PathBuf> {
        let path = self.parquet_path(name, date);
        Self::write_atomic(&path, |file| {
            let props = WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build();
            let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
                .context("creating Arrow writer for snapshot")?;
            writer.write(batch).context("writing snapshot batch")?;
            writer.close().context("closing snapshot writer")?;
            Ok(())
        })?;
        info!(snapshot = name, rows = batch.num_rows(), path = %path.display(), "wrote snapshot");
        Ok(path)
    }

    pub fn read_batch(&self, name: &str, date: NaiveDate) -> Result<RecordBatch> {
        let path = self.parquet_path(name, date);
        let file = File::open(&path).with_context(|| format!("opening snapshot {:?}", path))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("reading parquet metadata of {:?}", path))?;
        let schema = builder.schema().clone();
        let reader = builder.with_batch_size(8192).build()?;

        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("decoding {:?}", path))?;
        let batch = concat_batches(&schema, &batches)?;
        debug!(snapshot = name, rows = batch.num_rows(), "read snapshot");
        Ok(batch)
    }

    pub fn write_html(&self, date: NaiveDate, html: &str) -> Result<PathBuf> {
        let path = self.html_path(date);
        Self::write_atomic(&path, |mut file| {
            use std::io::Write;
            file.write_all(html.as_bytes())?;
            Ok(())
        })?;
        debug!(path = %path.display(), bytes = html.len(), "archived page markup");
        Ok(path)
    }
}
