//! GitHub v3 REST implementation of [`SourceHost`].

use super::host::{
    FileUpdate, HostError, HostResult, PullRequestDraft, PullRequestRef, RepoFile, SourceHost,
};
use crate::config::GitHubConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

/// GitHub API client scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: reqwest::Client,
    api_base_url: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Builds a client for the repository named in `config`.
    ///
    /// # Errors
    /// Returns [`HostError::Http`] when the HTTP client cannot be constructed.
    pub fn new(config: &GitHubConfig) -> HostResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base_url, self.owner, self.repo, tail
        )
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, GITHUB_ACCEPT)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> HostResult<T> {
        let response = ensure_success(operation, request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| HostError::Decode {
                operation,
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn validate_credential(&self, token: &str) -> HostResult<()> {
        let url = format!("{}/user", self.api_base_url);
        let request = self.authorized(self.http_client.get(url), token);
        ensure_success("GET /user", request.send().await?).await?;
        Ok(())
    }

    async fn get_file(&self, token: &str, path: &str) -> HostResult<RepoFile> {
        let operation = "GET contents";
        debug!("event=host_request module=contribute operation=get_file path={path}");
        let request = self.authorized(
            self.http_client
                .get(self.repo_url(&format!("contents/{path}"))),
            token,
        );
        let body: ContentsResponse = self.send_json(operation, request).await?;
        Ok(RepoFile {
            content: decode_content(operation, &body.content)?,
            sha: body.sha,
        })
    }

    async fn get_branch_sha(&self, token: &str, branch: &str) -> HostResult<String> {
        let request = self.authorized(
            self.http_client
                .get(self.repo_url(&format!("git/refs/heads/{branch}"))),
            token,
        );
        let body: RefResponse = self.send_json("GET branch ref", request).await?;
        Ok(body.object.sha)
    }

    async fn create_branch(&self, token: &str, branch: &str, sha: &str) -> HostResult<()> {
        let request = self
            .authorized(self.http_client.post(self.repo_url("git/refs")), token)
            .json(&json!({
                "ref": format!("refs/heads/{branch}"),
                "sha": sha,
            }));
        ensure_success("POST git/refs", request.send().await?).await?;
        Ok(())
    }

    async fn update_file(&self, token: &str, update: &FileUpdate) -> HostResult<()> {
        let request = self
            .authorized(
                self.http_client
                    .put(self.repo_url(&format!("contents/{}", update.path))),
                token,
            )
            .json(&json!({
                "message": update.message,
                "content": STANDARD.encode(update.content.as_bytes()),
                "sha": update.sha,
                "branch": update.branch,
            }));
        ensure_success("PUT contents", request.send().await?).await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        token: &str,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef> {
        let request = self
            .authorized(self.http_client.post(self.repo_url("pulls")), token)
            .json(&json!({
                "title": draft.title,
                "head": draft.head,
                "base": draft.base,
                "body": draft.body,
            }));
        let body: PullResponse = self.send_json("POST pulls", request).await?;
        Ok(PullRequestRef {
            number: body.number,
            html_url: body.html_url,
        })
    }
}

async fn ensure_success(operation: &'static str, response: Response) -> HostResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HostError::Status {
        operation,
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Extracts GitHub's `message` field, falling back to a truncated body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect())
}

/// Decodes contents API base64, which GitHub wraps at 60 columns.
fn decode_content(operation: &'static str, encoded: &str) -> HostResult<String> {
    let compact = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();
    let bytes = STANDARD.decode(compact).map_err(|err| HostError::Decode {
        operation,
        message: format!("invalid base64 content: {err}"),
    })?;
    String::from_utf8(bytes).map_err(|err| HostError::Decode {
        operation,
        message: format!("content is not UTF-8: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_content, error_message, GitHubClient};
    use crate::config::GitHubConfig;

    #[test]
    fn decode_content_ignores_line_wrapping() {
        let decoded = decode_content("test", "WyB7ICJ0\naXRsZSI6\nICJhIiB9IF0=\n")
            .expect("wrapped base64 should decode");
        assert_eq!(decoded, "[ { \"title\": \"a\" } ]");
    }

    #[test]
    fn decode_content_rejects_garbage() {
        assert!(decode_content("test", "***").is_err());
    }

    #[test]
    fn error_message_prefers_api_message_field() {
        assert_eq!(
            error_message(r#"{"message": "Bad credentials"}"#),
            "Bad credentials"
        );
        assert_eq!(error_message("  plain failure "), "plain failure");
    }

    #[test]
    fn repo_url_joins_base_owner_and_repo() {
        let config = GitHubConfig {
            api_base_url: "https://api.example.test/".to_string(),
            owner: "me".to_string(),
            repo: "catalog".to_string(),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config).expect("client builds");
        assert_eq!(
            client.repo_url("git/refs"),
            "https://api.example.test/repos/me/catalog/git/refs"
        );
    }
}
