//! Canonical dataset sources.
//!
//! # Responsibility
//! - Fetch the canonical record array from a file path or an HTTP endpoint.
//! - Provide the built-in minimal dataset used when fetching fails.
//!
//! # Invariants
//! - Malformed entries are skipped with a warning; only an unreadable or
//!   non-array payload fails the fetch.

use crate::model::article::{decode_record_array, ArticleRecord};
use async_trait::async_trait;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

mod fallback;
mod file;
mod http;

pub use fallback::builtin_dataset;
pub use file::FileDatasetSource;
pub use http::HttpDatasetSource;

pub type SourceResult<T> = Result<T, SourceError>;

/// Dataset fetch failure.
#[derive(Debug)]
pub enum SourceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Http(reqwest::Error),
    /// Endpoint answered with a non-success status.
    Status {
        url: String,
        status: u16,
    },
    Decode(serde_json::Error),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read dataset `{}`: {source}", path.display())
            }
            Self::Http(err) => write!(f, "dataset request failed: {err}"),
            Self::Status { url, status } => {
                write!(f, "dataset endpoint `{url}` answered with status {status}")
            }
            Self::Decode(err) => write!(f, "dataset is not a JSON array of records: {err}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Http(err) => Some(err),
            Self::Status { .. } => None,
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Provider of the canonical dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches the canonical record array.
    async fn fetch(&self) -> SourceResult<Vec<ArticleRecord>>;
    /// Human-readable location for logs and messages.
    fn describe(&self) -> String;
}

/// Where the canonical dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    Path(PathBuf),
    Url(String),
}

impl DatasetLocation {
    /// Interprets `http://` and `https://` values as URLs, anything else as a path.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// Builds the matching source; HTTP sources use `user_agent` and `timeout`.
    ///
    /// # Errors
    /// Returns [`SourceError::Http`] when the HTTP client cannot be built.
    pub fn into_source(
        self,
        user_agent: &str,
        timeout: Duration,
    ) -> SourceResult<Box<dyn DatasetSource>> {
        Ok(match self {
            Self::Path(path) => Box::new(FileDatasetSource::new(path)),
            Self::Url(url) => Box::new(HttpDatasetSource::new(url, user_agent, timeout)?),
        })
    }
}

impl Display for DatasetLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Decodes a fetched payload, skipping malformed entries.
pub(crate) fn decode_payload(origin: &str, text: &str) -> SourceResult<Vec<ArticleRecord>> {
    let decoded = decode_record_array(text)?;
    if !decoded.rejected.is_empty() {
        warn!(
            "event=dataset_decode module=source status=partial origin={} skipped={}",
            origin,
            decoded.rejected.len()
        );
    }
    Ok(decoded.records)
}
