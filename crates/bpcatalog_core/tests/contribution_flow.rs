use async_trait::async_trait;
use bpcatalog_core::contribute::{
    ContributionSubmitter, FileUpdate, HostError, HostResult, PullRequestDraft, PullRequestRef,
    RepoFile, SourceHost, SubmitError, SubmitStep,
};
use bpcatalog_core::db::open_db_in_memory;
use bpcatalog_core::repo::local_state::{
    LocalStateRepository, SqliteLocalStateRepository, CREDENTIAL_KEY, RECORDS_KEY,
};
use bpcatalog_core::{
    ArticleRecord, CatalogStore, ConnectOutcome, ContributionError, ContributionOutcome,
    ContributionService, RecordKey, StoreError,
};
use std::sync::Mutex;

const VALID_TOKEN: &str = "ghp_valid";

/// In-process stand-in for the hosting API.
#[derive(Default)]
struct FakeHost {
    fail_at: Option<SubmitStep>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<FileUpdate>>,
    drafts: Mutex<Vec<PullRequestDraft>>,
}

impl FakeHost {
    fn failing_at(step: SubmitStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    fn record(&self, step: SubmitStep, call: String) -> HostResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_at == Some(step) {
            return Err(HostError::Status {
                operation: "fake",
                status: 422,
                message: "Reference already exists".to_string(),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn validate_credential(&self, token: &str) -> HostResult<()> {
        if token == VALID_TOKEN {
            Ok(())
        } else {
            Err(HostError::Status {
                operation: "GET /user",
                status: 401,
                message: "Bad credentials".to_string(),
            })
        }
    }

    async fn get_file(&self, token: &str, path: &str) -> HostResult<RepoFile> {
        self.record(SubmitStep::FetchDataFile, format!("get_file {path} {token}"))?;
        Ok(RepoFile {
            content: r#"[{"title": "Existing", "year": 1970, "volume": 13, "issue": 2}]"#
                .to_string(),
            sha: "blob-sha".to_string(),
        })
    }

    async fn get_branch_sha(&self, _token: &str, branch: &str) -> HostResult<String> {
        self.record(SubmitStep::ReadBaseBranch, format!("get_branch_sha {branch}"))?;
        Ok("base-sha".to_string())
    }

    async fn create_branch(&self, _token: &str, branch: &str, sha: &str) -> HostResult<()> {
        self.record(SubmitStep::CreateBranch, format!("create_branch {branch} {sha}"))
    }

    async fn update_file(&self, _token: &str, update: &FileUpdate) -> HostResult<()> {
        self.record(SubmitStep::CommitFile, format!("update_file {}", update.branch))?;
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn create_pull_request(
        &self,
        _token: &str,
        draft: &PullRequestDraft,
    ) -> HostResult<PullRequestRef> {
        self.record(SubmitStep::OpenPullRequest, format!("create_pull_request {}", draft.head))?;
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(PullRequestRef {
            number: 7,
            html_url: "https://example.test/pull/7".to_string(),
        })
    }
}

fn new_record() -> ArticleRecord {
    ArticleRecord::new("Resurgence as choice", 2017, 107, 1).with_process("Resurgence")
}

#[tokio::test]
async fn submitter_runs_chain_in_order() {
    let host = FakeHost::default();
    let submitter = ContributionSubmitter::new(&host, "data.json", "main");

    let pull_request = submitter
        .submit_with_branch(Some(VALID_TOKEN), &new_record(), "add-entry-1700000000000")
        .await
        .unwrap();

    assert_eq!(pull_request.number, 7);
    assert_eq!(
        host.calls(),
        vec![
            "get_file data.json ghp_valid",
            "get_branch_sha main",
            "create_branch add-entry-1700000000000 base-sha",
            "update_file add-entry-1700000000000",
            "create_pull_request add-entry-1700000000000",
        ]
    );

    let updates = host.updates.lock().unwrap();
    let update = &updates[0];
    assert_eq!(update.message, "Add new entry: Resurgence as choice");
    assert_eq!(update.sha, "blob-sha");
    assert!(update.content.starts_with("[\n    {\n        \""));
    let entries: Vec<serde_json::Value> = serde_json::from_str(&update.content).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["title"], "Resurgence as choice");

    let drafts = host.drafts.lock().unwrap();
    assert_eq!(
        drafts[0].title,
        "Add new behavioral process entry: Resurgence as choice"
    );
    assert_eq!(drafts[0].base, "main");
    assert!(drafts[0].body.contains("**Behavioral Process:** Resurgence"));
}

#[tokio::test]
async fn submitter_requires_credential() {
    let host = FakeHost::default();
    let submitter = ContributionSubmitter::new(&host, "data.json", "main");

    let err = submitter.submit(Some("  "), &new_record()).await.unwrap_err();
    assert!(matches!(err, SubmitError::MissingCredential));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn failing_step_aborts_the_chain() {
    let host = FakeHost::failing_at(SubmitStep::CreateBranch);
    let submitter = ContributionSubmitter::new(&host, "data.json", "main");

    let err = submitter
        .submit(Some(VALID_TOKEN), &new_record())
        .await
        .unwrap_err();
    assert_eq!(err.step(), Some(SubmitStep::CreateBranch));
    assert!(err.to_string().starts_with("Failed to create branch"));
    assert_eq!(host.calls().len(), 3);
}

#[tokio::test]
async fn contribute_without_credential_saves_locally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    let mut store = CatalogStore::open(&repo).unwrap();
    let host = FakeHost::default();
    let service = ContributionService::new(ContributionSubmitter::new(&host, "data.json", "main"));

    let outcome = service.contribute(&mut store, new_record()).await.unwrap();

    assert_eq!(outcome, ContributionOutcome::SavedLocally);
    assert!(store.find(&RecordKey::new("Resurgence as choice", 2017)).is_some());
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn contribute_with_credential_opens_pull_request_and_keeps_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(CREDENTIAL_KEY, VALID_TOKEN).unwrap();
    let mut store = CatalogStore::open(&repo).unwrap();
    let host = FakeHost::default();
    let service = ContributionService::new(ContributionSubmitter::new(&host, "data.json", "main"));

    let outcome = service.contribute(&mut store, new_record()).await.unwrap();

    match outcome {
        ContributionOutcome::Submitted(pull_request) => assert_eq!(pull_request.number, 7),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn failed_submission_falls_back_to_local_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(CREDENTIAL_KEY, VALID_TOKEN).unwrap();
    let mut store = CatalogStore::open(&repo).unwrap();
    let host = FakeHost::failing_at(SubmitStep::OpenPullRequest);
    let service = ContributionService::new(ContributionSubmitter::new(&host, "data.json", "main"));

    let outcome = service.contribute(&mut store, new_record()).await.unwrap();

    assert!(outcome.is_warning());
    let message = outcome.message();
    assert!(message.starts_with("Failed to create pull request: Failed to create pull request:"));
    assert!(message.contains("Reference already exists"));
    assert!(message.ends_with("Entry saved locally instead."));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn record_is_stored_before_submission_and_duplicates_are_not_submitted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(CREDENTIAL_KEY, VALID_TOKEN).unwrap();
    let mut store = CatalogStore::open(&repo).unwrap();
    let host = FakeHost::default();
    let service = ContributionService::new(ContributionSubmitter::new(&host, "data.json", "main"));

    service.contribute(&mut store, new_record()).await.unwrap();
    let persisted: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, vec![new_record()]);
    let calls_after_first = host.calls().len();

    let err = service
        .contribute(&mut store, new_record())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ContributionError::Store(StoreError::DuplicateKey(_))
    ));
    assert_eq!(host.calls().len(), calls_after_first);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn connect_validates_and_stores_token() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    let mut store = CatalogStore::open(&repo).unwrap();
    let host = FakeHost::default();
    let service = ContributionService::new(ContributionSubmitter::new(&host, "data.json", "main"));

    let blank = service.connect(&mut store, "   ").await.unwrap_err();
    assert!(matches!(blank, ContributionError::EmptyToken));
    assert_eq!(blank.to_string(), "Please enter a GitHub token");

    let invalid = service.connect(&mut store, "ghp_wrong").await.unwrap_err();
    assert!(matches!(invalid, ContributionError::InvalidCredential(_)));
    assert_eq!(store.credential(), None);
    assert_eq!(repo.get(CREDENTIAL_KEY).unwrap(), None);

    let connected = service.connect(&mut store, VALID_TOKEN).await.unwrap();
    assert_eq!(connected, ConnectOutcome::Connected);
    assert_eq!(repo.get(CREDENTIAL_KEY).unwrap().as_deref(), Some(VALID_TOKEN));

    let again = service.connect(&mut store, "anything").await.unwrap();
    assert_eq!(again, ConnectOutcome::AlreadyConnected);
    assert_eq!(again.message(), "Already connected to GitHub!");

    service.disconnect(&mut store).unwrap();
    assert_eq!(store.credential(), None);
}
