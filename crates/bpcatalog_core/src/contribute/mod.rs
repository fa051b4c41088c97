//! Upstream contribution of new records.
//!
//! # Responsibility
//! - Abstract the hosting REST API behind [`SourceHost`].
//! - Package a record as a branch + commit + pull request.
//!
//! # Invariants
//! - Every submission requires a previously validated credential.
//! - A failing step aborts the chain; no step is retried.

mod github;
mod host;
mod submitter;

pub use github::GitHubClient;
pub use host::{
    FileUpdate, HostError, HostResult, PullRequestDraft, PullRequestRef, RepoFile, SourceHost,
};
pub use submitter::{
    branch_name, pull_request_body, ContributionSubmitter, SubmitError, SubmitStep,
};
