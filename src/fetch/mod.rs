// src/fetch/mod.rs

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

pub mod browser;

pub use browser::{BrowserTarget, ChromiumSource};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("launching browser: {0}")]
    Launch(String),

    #[error("navigating to {url}: {detail}")]
    Navigate { url: String, detail: String },

    #[error("page at {url} did not render the occupation table within {timeout:?}")]
    NotReady { url: String, timeout: Duration },

    #[error("reading saved page {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can hand back the rendered markup of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// How long to wait for client-side rendering, and how often to look.
#[derive(Debug, Clone, Copy)]
pub struct ReadyPolicy {
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for ReadyPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
        }
    }
}

impl ReadyPolicy {
    /// Poll intervals: doubling from `initial_interval`, capped at `max_interval`.
    pub fn intervals(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_interval), move |prev| {
            Some((*prev * 2).min(self.max_interval))
        })
    }
}

/// Replays markup saved by an earlier run; the URL is ignored.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FileSource {
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        info!(bytes = html.len(), "replaying saved page");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_double_then_cap() {
        let policy = ReadyPolicy {
            timeout: Duration::from_secs(5),
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(500),
        };
        let got: Vec<u128> = policy.intervals().take(5).map(|d| d.as_millis()).collect();
        assert_eq!(got, vec![100, 200, 400, 500, 500]);
    }

    #[tokio::test]
    async fn file_source_reads_saved_markup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body>saved</body></html>").unwrap();

        let html = FileSource::new(&path).fetch("https://example.org").await.unwrap();
        assert!(html.contains("saved"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new(dir.path().join("nope.html"))
            .fetch("https://example.org")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
