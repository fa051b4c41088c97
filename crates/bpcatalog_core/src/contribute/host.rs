//! Hosting API seam.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type HostResult<T> = Result<T, HostError>;

/// Hosting API failure.
#[derive(Debug)]
pub enum HostError {
    /// Transport-level failure (DNS, TLS, timeout, ...).
    Http(reqwest::Error),
    /// The API answered with a non-success status.
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },
    /// The API answered with a body we could not interpret.
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "request failed: {err}"),
            Self::Status {
                operation,
                status,
                message,
            } if message.is_empty() => write!(f, "{operation} answered with status {status}"),
            Self::Status {
                operation,
                status,
                message,
            } => write!(f, "{operation} answered with status {status}: {message}"),
            Self::Decode { operation, message } => {
                write!(f, "unexpected {operation} response: {message}")
            }
        }
    }
}

impl Error for HostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status { .. } | Self::Decode { .. } => None,
        }
    }
}

impl From<reqwest::Error> for HostError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Decoded contents of a file in the upstream repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// UTF-8 text of the file.
    pub content: String,
    /// Blob sha required to update the file.
    pub sha: String,
}

/// Commit of new file contents onto a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub path: String,
    pub message: String,
    /// Plain text; the host encodes it for transport.
    pub content: String,
    /// Sha of the blob being replaced.
    pub sha: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// Reference to a created pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub html_url: String,
}

/// Repository hosting operations used by the contribution flow.
///
/// Every call takes the access token explicitly; implementations hold no
/// credential state.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Succeeds when `token` authenticates against the host.
    async fn validate_credential(&self, token: &str) -> HostResult<()>;

    async fn get_file(&self, token: &str, path: &str) -> HostResult<RepoFile>;

    /// Returns the head commit sha of `branch`.
    async fn get_branch_sha(&self, token: &str, branch: &str) -> HostResult<String>;

    async fn create_branch(&self, token: &str, branch: &str, sha: &str) -> HostResult<()>;

    async fn update_file(&self, token: &str, update: &FileUpdate) -> HostResult<()>;

    async fn create_pull_request(
        &self,
        token: &str,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef>;
}

#[async_trait]
impl<'a, T: SourceHost + ?Sized> SourceHost for &'a T {
    async fn validate_credential(&self, token: &str) -> HostResult<()> {
        (**self).validate_credential(token).await
    }

    async fn get_file(&self, token: &str, path: &str) -> HostResult<RepoFile> {
        (**self).get_file(token, path).await
    }

    async fn get_branch_sha(&self, token: &str, branch: &str) -> HostResult<String> {
        (**self).get_branch_sha(token, branch).await
    }

    async fn create_branch(&self, token: &str, branch: &str, sha: &str) -> HostResult<()> {
        (**self).create_branch(token, branch, sha).await
    }

    async fn update_file(&self, token: &str, update: &FileUpdate) -> HostResult<()> {
        (**self).update_file(token, update).await
    }

    async fn create_pull_request(
        &self,
        token: &str,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef> {
        (**self).create_pull_request(token, draft).await
    }
}
