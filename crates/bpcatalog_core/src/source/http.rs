//! Dataset source backed by a REST endpoint.

use super::{decode_payload, DatasetSource, SourceError, SourceResult};
use crate::model::article::ArticleRecord;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// Fetches the canonical dataset with `GET <url>`.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpDatasetSource {
    /// Builds a source with its own HTTP client.
    ///
    /// # Errors
    /// Returns [`SourceError::Http`] when the client cannot be constructed.
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> SourceResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self) -> SourceResult<Vec<ArticleRecord>> {
        debug!("event=dataset_fetch module=source status=start url={}", self.url);
        let response = self
            .http_client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        decode_payload(&self.url, &text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
