//! Branch/commit/pull-request chain for one new record.

use super::host::{FileUpdate, HostError, PullRequestDraft, PullRequestRef, SourceHost};
use crate::model::article::ArticleRecord;
use log::{info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DATA_FILE_INDENT: &[u8] = b"    ";

/// Step of the contribution chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStep {
    FetchDataFile,
    ReadBaseBranch,
    CreateBranch,
    CommitFile,
    OpenPullRequest,
}

impl SubmitStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchDataFile => "fetch_data_file",
            Self::ReadBaseBranch => "read_base_branch",
            Self::CreateBranch => "create_branch",
            Self::CommitFile => "commit_file",
            Self::OpenPullRequest => "open_pull_request",
        }
    }
}

impl Display for SubmitStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::FetchDataFile => "fetch current data file",
            Self::ReadBaseBranch => "read base branch",
            Self::CreateBranch => "create branch",
            Self::CommitFile => "commit updated data file",
            Self::OpenPullRequest => "create pull request",
        };
        f.write_str(text)
    }
}

/// Contribution chain failure.
#[derive(Debug)]
pub enum SubmitError {
    MissingCredential,
    Host { step: SubmitStep, source: HostError },
    /// The upstream data file is not a JSON array.
    InvalidDataFile(serde_json::Error),
    Encode(serde_json::Error),
}

impl SubmitError {
    /// The chain step that failed, when a host call was involved.
    pub fn step(&self) -> Option<SubmitStep> {
        match self {
            Self::Host { step, .. } => Some(*step),
            Self::InvalidDataFile(_) => Some(SubmitStep::FetchDataFile),
            Self::MissingCredential | Self::Encode(_) => None,
        }
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(
                f,
                "GitHub token not found. Please connect your GitHub account first."
            ),
            Self::Host { step, source } => write!(f, "Failed to {step}: {source}"),
            Self::InvalidDataFile(err) => write!(f, "current data file is not a JSON array: {err}"),
            Self::Encode(err) => write!(f, "failed to encode updated data file: {err}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingCredential => None,
            Self::Host { source, .. } => Some(source),
            Self::InvalidDataFile(err) | Self::Encode(err) => Some(err),
        }
    }
}

/// Submits new records upstream as pull requests.
pub struct ContributionSubmitter<H> {
    host: H,
    data_file: String,
    base_branch: String,
}

impl<H: SourceHost> ContributionSubmitter<H> {
    pub fn new(host: H, data_file: impl Into<String>, base_branch: impl Into<String>) -> Self {
        Self {
            host,
            data_file: data_file.into(),
            base_branch: base_branch.into(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Opens a pull request adding `record` to the upstream data file.
    ///
    /// # Errors
    /// - [`SubmitError::MissingCredential`] when `token` is absent or blank.
    /// - [`SubmitError::Host`] naming the first failing step.
    pub async fn submit(
        &self,
        token: Option<&str>,
        record: &ArticleRecord,
    ) -> Result<PullRequestRef, SubmitError> {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        self.submit_with_branch(token, record, &branch_name(epoch_ms))
            .await
    }

    /// Same as [`Self::submit`] with an explicit branch name.
    pub async fn submit_with_branch(
        &self,
        token: Option<&str>,
        record: &ArticleRecord,
        branch: &str,
    ) -> Result<PullRequestRef, SubmitError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(SubmitError::MissingCredential)?;
        let started_at = Instant::now();

        let result = self.run_chain(token, record, branch).await;
        match &result {
            Ok(pull_request) => info!(
                "event=contribution_submit module=contribute status=ok branch={} pr_number={} duration_ms={}",
                branch,
                pull_request.number,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=contribution_submit module=contribute status=error branch={} step={} duration_ms={}",
                branch,
                err.step().map_or("none", SubmitStep::as_str),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    async fn run_chain(
        &self,
        token: &str,
        record: &ArticleRecord,
        branch: &str,
    ) -> Result<PullRequestRef, SubmitError> {
        let current = self
            .host
            .get_file(token, &self.data_file)
            .await
            .map_err(host_error(SubmitStep::FetchDataFile))?;
        let updated = append_entry(&current.content, record)?;

        let base_sha = self
            .host
            .get_branch_sha(token, &self.base_branch)
            .await
            .map_err(host_error(SubmitStep::ReadBaseBranch))?;
        self.host
            .create_branch(token, branch, &base_sha)
            .await
            .map_err(host_error(SubmitStep::CreateBranch))?;

        let update = FileUpdate {
            path: self.data_file.clone(),
            message: format!("Add new entry: {}", record.title),
            content: updated,
            sha: current.sha,
            branch: branch.to_string(),
        };
        self.host
            .update_file(token, &update)
            .await
            .map_err(host_error(SubmitStep::CommitFile))?;

        let draft = PullRequestDraft {
            title: format!("Add new behavioral process entry: {}", record.title),
            head: branch.to_string(),
            base: self.base_branch.clone(),
            body: pull_request_body(record),
        };
        self.host
            .create_pull_request(token, &draft)
            .await
            .map_err(host_error(SubmitStep::OpenPullRequest))
    }
}

fn host_error(step: SubmitStep) -> impl FnOnce(HostError) -> SubmitError {
    move |source| SubmitError::Host { step, source }
}

/// Branch name for a submission started at `epoch_ms`.
pub fn branch_name(epoch_ms: u128) -> String {
    format!("add-entry-{epoch_ms}")
}

/// Appends `record` to the JSON array in `current`, re-encoded with a
/// four-space indent. Upstream entries are kept as raw JSON.
fn append_entry(current: &str, record: &ArticleRecord) -> Result<String, SubmitError> {
    let mut entries =
        serde_json::from_str::<Vec<Value>>(current).map_err(SubmitError::InvalidDataFile)?;
    entries.push(serde_json::to_value(record).map_err(SubmitError::Encode)?);

    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buffer,
        PrettyFormatter::with_indent(DATA_FILE_INDENT),
    );
    entries
        .serialize(&mut serializer)
        .map_err(SubmitError::Encode)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Markdown description embedding the record's fields.
pub fn pull_request_body(record: &ArticleRecord) -> String {
    format!(
        "## New Behavioral Process Entry\n\n\
         **Article Title:** {}\n\
         **Authors:** {}\n\
         **Year:** {}\n\
         **Volume:** {}\n\
         **Issue:** {}\n\
         **Behavioral Process:** {}\n\
         **Static Equation:** {}\n\
         **Recursive Equation:** {}\n\
         **URL:** {}\n\n\
         This entry was submitted through the Behavioral Process Catalog.\n\n\
         Please review and merge if appropriate.",
        record.title,
        record.authors_display(),
        record.year,
        record.volume,
        record.issue,
        record.process_display(),
        record.static_equation_display(),
        record.recursive_equation_display(),
        record.url_display(),
    )
}

#[cfg(test)]
mod tests {
    use super::{append_entry, branch_name, pull_request_body, SubmitError};
    use crate::model::article::ArticleRecord;

    #[test]
    fn append_entry_keeps_upstream_entries_and_indents_four_spaces() {
        let current = r#"[{"title": "old", "year": 1970, "volume": 1, "issue": 1, "extra": true}]"#;
        let record = ArticleRecord::new("new", 2001, 75, 3);

        let updated = append_entry(current, &record).expect("append should succeed");
        assert!(updated.starts_with("[\n    {\n        \""));
        assert!(updated.contains("\n        \"title\": \"old\""));
        assert!(updated.contains("\"extra\": true"));
        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&updated).expect("output is valid JSON");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["title"], "new");
    }

    #[test]
    fn append_entry_rejects_non_array_file() {
        let record = ArticleRecord::new("new", 2001, 75, 3);
        assert!(matches!(
            append_entry("{}", &record),
            Err(SubmitError::InvalidDataFile(_))
        ));
    }

    #[test]
    fn branch_name_embeds_timestamp() {
        assert_eq!(branch_name(1_700_000_000_000), "add-entry-1700000000000");
    }

    #[test]
    fn pull_request_body_uses_placeholders_for_absent_fields() {
        let body = pull_request_body(&ArticleRecord::new("Choice", 1961, 4, 3));
        assert!(body.starts_with("## New Behavioral Process Entry"));
        assert!(body.contains("**Article Title:** Choice"));
        assert!(body.contains("**Static Equation:** N/A"));
    }
}
