//! Contribution use-case service.
//!
//! # Responsibility
//! - Connect and disconnect the hosting credential.
//! - Add a new record locally and, when connected, propose it upstream.
//!
//! # Invariants
//! - `contribute` adds the record to the store before any submission, so
//!   only upstream visibility can be deferred. A record the store rejects
//!   is never submitted.
//! - An invalid credential never changes stored state.

use crate::contribute::{ContributionSubmitter, HostError, PullRequestRef, SourceHost};
use crate::model::article::ArticleRecord;
use crate::repo::local_state::LocalStateRepository;
use crate::store::{CatalogStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for credential and contribution use-cases.
#[derive(Debug)]
pub enum ContributionError {
    /// Connect was requested with a blank token.
    EmptyToken,
    /// The host rejected the token, or could not be reached.
    InvalidCredential(HostError),
    /// Local persistence failure.
    Store(StoreError),
}

impl Display for ContributionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "Please enter a GitHub token"),
            Self::InvalidCredential(_) => {
                write!(f, "Invalid GitHub token. Please check and try again.")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContributionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyToken => None,
            Self::InvalidCredential(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ContributionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Successful result of [`ContributionService::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    AlreadyConnected,
}

impl ConnectOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Connected => "Successfully connected to GitHub!",
            Self::AlreadyConnected => "Already connected to GitHub!",
        }
    }
}

/// Result of [`ContributionService::contribute`]; the record is stored in
/// every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributionOutcome {
    /// A pull request was opened upstream.
    Submitted(PullRequestRef),
    /// No credential is connected.
    SavedLocally,
    /// Submission failed and the record was kept locally.
    FallbackSaved { error: String },
}

impl ContributionOutcome {
    /// User-facing notice text.
    pub fn message(&self) -> String {
        match self {
            Self::Submitted(pull_request) => format!(
                "Pull request created successfully! View PR #{}: {}. Your contribution will be reviewed and merged if approved.",
                pull_request.number, pull_request.html_url
            ),
            Self::SavedLocally => {
                "Entry saved locally! Connect GitHub to contribute to the main catalog."
                    .to_string()
            }
            Self::FallbackSaved { error } => {
                format!("Failed to create pull request: {error}. Entry saved locally instead.")
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::FallbackSaved { .. })
    }
}

/// Contribution facade over a hosting API implementation.
pub struct ContributionService<H: SourceHost> {
    submitter: ContributionSubmitter<H>,
}

impl<H: SourceHost> ContributionService<H> {
    pub fn new(submitter: ContributionSubmitter<H>) -> Self {
        Self { submitter }
    }

    /// Validates `token` against the host and caches it on success.
    ///
    /// # Errors
    /// - [`ContributionError::EmptyToken`] for a blank token.
    /// - [`ContributionError::InvalidCredential`] when validation fails for
    ///   any reason, including network errors.
    pub async fn connect<R: LocalStateRepository>(
        &self,
        store: &mut CatalogStore<R>,
        token: &str,
    ) -> Result<ConnectOutcome, ContributionError> {
        if store.credential().is_some() {
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(ContributionError::EmptyToken);
        }

        if let Err(err) = self.submitter.host().validate_credential(token).await {
            warn!(
                "event=credential_connect module=service status=rejected error={}",
                err
            );
            return Err(ContributionError::InvalidCredential(err));
        }

        store.set_credential(token)?;
        info!("event=credential_connect module=service status=ok");
        Ok(ConnectOutcome::Connected)
    }

    /// Forgets the cached credential.
    pub fn disconnect<R: LocalStateRepository>(
        &self,
        store: &mut CatalogStore<R>,
    ) -> Result<(), ContributionError> {
        store.clear_credential()?;
        info!("event=credential_disconnect module=service status=ok");
        Ok(())
    }

    /// Adds `record` to the store, then proposes it upstream when connected.
    ///
    /// # Errors
    /// Only store failures are returned, including
    /// [`StoreError::DuplicateKey`]; submission failures become
    /// [`ContributionOutcome::FallbackSaved`].
    pub async fn contribute<R: LocalStateRepository>(
        &self,
        store: &mut CatalogStore<R>,
        record: ArticleRecord,
    ) -> Result<ContributionOutcome, ContributionError> {
        store.add(record.clone())?;
        let Some(token) = store.credential().map(str::to_string) else {
            info!("event=contribution_outcome module=service status=ok outcome=saved_locally");
            return Ok(ContributionOutcome::SavedLocally);
        };

        let outcome = match self.submitter.submit(Some(&token), &record).await {
            Ok(pull_request) => ContributionOutcome::Submitted(pull_request),
            Err(err) => ContributionOutcome::FallbackSaved {
                error: err.to_string(),
            },
        };

        match &outcome {
            ContributionOutcome::FallbackSaved { .. } => warn!(
                "event=contribution_outcome module=service status=fallback outcome=fallback_saved"
            ),
            _ => info!("event=contribution_outcome module=service status=ok outcome=submitted"),
        }
        Ok(outcome)
    }
}
