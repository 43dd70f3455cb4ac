// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::fetch::{BrowserTarget, ChromiumSource, FileSource, PageSource, ReadyPolicy};

pub const DEFAULT_URL: &str = "https://data.bls.gov/oes/#/area/0100000";
pub const DEFAULT_BASE_DIR: &str = "/opt/airflow/data";
pub const SKILLS_FILE: &str = "Skills.xlsx";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Page holding the occupation wage table.
    pub url: String,
    /// Root of the snapshot tree.
    pub base_dir: PathBuf,
    /// Defaults to `<base_dir>/Skills.xlsx`.
    pub skills_path: Option<PathBuf>,
    pub browser: BrowserConfig,
    pub readiness: ReadinessConfig,
    pub sink: SinkConfig,
    /// Rows per INSERT statement.
    pub insert_chunk_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    Local,
    Remote,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub mode: BrowserMode,
    pub executable: Option<PathBuf>,
    pub remote_url: Option<String>,
    /// Saved page for `mode: file`; defaults to the archived page of the run date.
    pub html_path: Option<PathBuf>,
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub timeout_secs: u64,
    pub initial_poll_ms: u64,
    pub max_poll_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Postgres,
    Duckdb,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Database file for `kind: duckdb`; defaults to `<base_dir>/oews.duckdb`.
    pub duckdb_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            skills_path: None,
            browser: BrowserConfig::default(),
            readiness: ReadinessConfig::default(),
            sink: SinkConfig::default(),
            insert_chunk_rows: 1000,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            mode: BrowserMode::Local,
            executable: None,
            remote_url: None,
            html_path: None,
            headless: true,
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        let policy = ReadyPolicy::default();
        Self {
            timeout_secs: policy.timeout.as_secs(),
            initial_poll_ms: policy.initial_interval.as_millis() as u64,
            max_poll_ms: policy.max_interval.as_millis() as u64,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Postgres,
            duckdb_path: None,
        }
    }
}

impl ReadinessConfig {
    pub fn policy(&self) -> ReadyPolicy {
        ReadyPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            initial_interval: Duration::from_millis(self.initial_poll_ms.max(1)),
            max_interval: Duration::from_millis(self.max_poll_ms.max(self.initial_poll_ms).max(1)),
        }
    }
}

impl PipelineConfig {
    /// Defaults, then the YAML file if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {:?}", p))?;
                serde_yaml::from_str::<PipelineConfig>(&text)
                    .with_context(|| format!("parsing config {:?}", p))?
            }
            None => PipelineConfig::default(),
        };
        cfg.apply_overrides(|k| std::env::var(k).ok());
        cfg.validate()?;
        info!(base_dir = %cfg.base_dir.display(), browser = ?cfg.browser.mode, sink = ?cfg.sink.kind, "configuration loaded");
        Ok(cfg)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("PIPELINE_BASE_DIR").filter(|s| !s.is_empty()) {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(exe) = lookup("CHROMIUM_PATH").filter(|s| !s.is_empty()) {
            self.browser.executable = Some(PathBuf::from(exe));
        }
        if let Some(ws) = lookup("BROWSER_WS_URL").filter(|s| !s.is_empty()) {
            self.browser.remote_url = Some(ws);
            self.browser.mode = BrowserMode::Remote;
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url).with_context(|| format!("invalid page url {:?}", self.url))?;
        if self.insert_chunk_rows == 0 {
            bail!("insert_chunk_rows must be positive");
        }
        if self.browser.mode == BrowserMode::Remote && self.browser.remote_url.is_none() {
            bail!("browser mode `remote` needs remote_url or BROWSER_WS_URL");
        }
        Ok(())
    }

    pub fn skills_path(&self) -> PathBuf {
        self.skills_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(SKILLS_FILE))
    }

    pub fn duckdb_path(&self) -> PathBuf {
        self.sink
            .duckdb_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join("oews.duckdb"))
    }

    /// Build the page source; `archived` is the page saved for this run date,
    /// used by `mode: file` when no explicit path is configured.
    pub fn page_source(&self, archived: PathBuf) -> Result<Box<dyn PageSource>> {
        let ready = self.readiness.policy();
        let source: Box<dyn PageSource> = match self.browser.mode {
            BrowserMode::Local => Box::new(ChromiumSource::new(
                BrowserTarget::Local {
                    executable: self.browser.executable.clone(),
                    headless: self.browser.headless,
                },
                ready,
            )),
            BrowserMode::Remote => {
                let ws_url = self
                    .browser
                    .remote_url
                    .clone()
                    .context("browser mode `remote` needs remote_url")?;
                Box::new(ChromiumSource::new(BrowserTarget::Remote { ws_url }, ready))
            }
            BrowserMode::File => Box::new(FileSource::new(
                self.browser.html_path.clone().unwrap_or(archived),
            )),
        };
        Ok(source)
    }
}

/// Connection string for the PostgreSQL sink; never read from the config file.
pub fn database_url() -> Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL is not set")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployment() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.url, DEFAULT_URL);
        assert_eq!(cfg.skills_path(), PathBuf::from("/opt/airflow/data/Skills.xlsx"));
        assert_eq!(cfg.insert_chunk_rows, 1000);
        assert_eq!(cfg.sink.kind, SinkKind::Postgres);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r#"
base_dir: /tmp/oews
browser:
  mode: file
  html_path: /tmp/page.html
sink:
  kind: duckdb
readiness:
  timeout_secs: 5
"#;
        let cfg: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.base_dir, PathBuf::from("/tmp/oews"));
        assert_eq!(cfg.browser.mode, BrowserMode::File);
        assert!(cfg.browser.headless);
        assert_eq!(cfg.sink.kind, SinkKind::Duckdb);
        assert_eq!(cfg.duckdb_path(), PathBuf::from("/tmp/oews/oews.duckdb"));
        assert_eq!(cfg.readiness.policy().timeout, Duration::from_secs(5));
        assert_eq!(cfg.url, DEFAULT_URL);
    }

    #[test]
    fn environment_overrides_win() {
        let mut cfg = PipelineConfig::default();
        cfg.apply_overrides(|k| match k {
            "PIPELINE_BASE_DIR" => Some("/srv/data".to_string()),
            "BROWSER_WS_URL" => Some("ws://chrome:9222/devtools/browser/abc".to_string()),
            _ => None,
        });
        assert_eq!(cfg.base_dir, PathBuf::from("/srv/data"));
        assert_eq!(cfg.browser.mode, BrowserMode::Remote);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_url_and_zero_chunk() {
        let mut cfg = PipelineConfig::default();
        cfg.url = "not a url".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.insert_chunk_rows = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "insert_chunk_rows: 250\n").unwrap();
        let cfg = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.insert_chunk_rows, 250);
    }
}
