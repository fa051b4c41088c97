//! Dataset source backed by a local JSON file.

use super::{decode_payload, DatasetSource, SourceError, SourceResult};
use crate::model::article::ArticleRecord;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads the canonical dataset from a JSON file (the `data.json` next to the app).
#[derive(Debug, Clone)]
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    async fn fetch(&self) -> SourceResult<Vec<ArticleRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        decode_payload(&self.describe(), &text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
