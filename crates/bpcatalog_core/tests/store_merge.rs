use async_trait::async_trait;
use bpcatalog_core::db::open_db_in_memory;
use bpcatalog_core::repo::local_state::{
    LocalStateRepository, SqliteLocalStateRepository, CREDENTIAL_KEY, QUARANTINE_KEY, RECORDS_KEY,
};
use bpcatalog_core::source::builtin_dataset;
use bpcatalog_core::{
    ArticleRecord, CatalogStore, DatasetSource, RecordKey, SourceError, StoreError,
};

struct StaticSource(Vec<ArticleRecord>);

#[async_trait]
impl DatasetSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<ArticleRecord>, SourceError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

struct UnreachableSource;

#[async_trait]
impl DatasetSource for UnreachableSource {
    async fn fetch(&self) -> Result<Vec<ArticleRecord>, SourceError> {
        Err(SourceError::Status {
            url: "https://example.test/data.json".to_string(),
            status: 503,
        })
    }

    fn describe(&self) -> String {
        "https://example.test/data.json".to_string()
    }
}

fn canonical() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new("Matching law", 1970, 13, 2).with_process("Matching Law"),
        ArticleRecord::new("Resurgence", 1995, 64, 1).with_process("Resurgence"),
    ]
}

fn store_local(repo: &SqliteLocalStateRepository<'_>, records: &[ArticleRecord]) {
    repo.set(RECORDS_KEY, &serde_json::to_string(records).unwrap())
        .unwrap();
}

#[tokio::test]
async fn load_appends_local_only_records_after_canonical() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    store_local(
        &repo,
        &[
            ArticleRecord::new("Local entry", 2004, 81, 3),
            ArticleRecord::new("Second local", 2010, 93, 1),
        ],
    );

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&StaticSource(canonical())).await.unwrap();

    let titles = store
        .records()
        .iter()
        .map(|record| record.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["Matching law", "Resurgence", "Local entry", "Second local"]
    );
    assert_eq!(report.canonical, 2);
    assert_eq!(report.local_only, 2);
    assert_eq!(report.total(), 4);
    assert!(!report.used_fallback());
}

#[tokio::test]
async fn canonical_record_wins_over_local_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    let local_copy = ArticleRecord::new("Resurgence", 1995, 64, 1).with_process("Edited locally");
    store_local(&repo, &[local_copy.clone(), local_copy]);

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&StaticSource(canonical())).await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(report.superseded, 2);
    let kept = store.find(&RecordKey::new("Resurgence", 1995)).unwrap();
    assert_eq!(kept.process_display(), "Resurgence");
}

#[tokio::test]
async fn repeated_local_records_are_merged_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    let local = ArticleRecord::new("Local entry", 2004, 81, 3);
    store_local(&repo, &[local.clone(), local.clone(), local]);

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&StaticSource(canonical())).await.unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(report.local_only, 1);
    assert_eq!(report.superseded, 2);
}

#[tokio::test]
async fn failed_fetch_falls_back_to_builtin_dataset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&UnreachableSource).await.unwrap();

    assert!(report.used_fallback());
    assert!(report.fallback_error.unwrap().contains("503"));
    assert_eq!(store.len(), builtin_dataset().len());
    assert!(!store.is_empty());
}

#[tokio::test]
async fn add_persists_full_working_set_and_survives_reload() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    store.load(&StaticSource(canonical())).await.unwrap();
    store
        .add(ArticleRecord::new("Fresh entry", 2021, 115, 2))
        .unwrap();

    let persisted: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 3);

    let mut reopened = CatalogStore::open(&repo).unwrap();
    let report = reopened.load(&StaticSource(canonical())).await.unwrap();
    assert_eq!(reopened.len(), 3);
    assert_eq!(report.local_only, 1);
    assert_eq!(report.superseded, 2);
    assert!(reopened.find_by_title("fresh ENTRY", Some(2021)).is_some());
}

#[tokio::test]
async fn builtin_records_are_not_persisted_after_a_failed_fetch() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    store.load(&UnreachableSource).await.unwrap();
    store
        .add(ArticleRecord::new("Added offline", 2020, 113, 1))
        .unwrap();
    assert_eq!(store.len(), builtin_dataset().len() + 1);

    let persisted: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, vec![ArticleRecord::new("Added offline", 2020, 113, 1)]);

    let mut reopened = CatalogStore::open(&repo).unwrap();
    let report = reopened.load(&StaticSource(canonical())).await.unwrap();
    assert_eq!(report.local_only, 1);
    assert_eq!(report.total(), 3);
    assert!(reopened.find(&RecordKey::new("Added offline", 2020)).is_some());
}

#[tokio::test]
async fn local_record_hidden_by_builtin_record_stays_persisted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    let builtin = builtin_dataset().remove(0);
    let hidden = ArticleRecord::new(builtin.title.clone(), builtin.year, 99, 9);
    store_local(&repo, &[hidden.clone()]);

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&UnreachableSource).await.unwrap();
    assert_eq!(report.superseded, 1);
    store
        .add(ArticleRecord::new("Added offline", 2020, 113, 1))
        .unwrap();

    let persisted: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 2);
    assert!(persisted.contains(&hidden));

    let mut reopened = CatalogStore::open(&repo).unwrap();
    let report = reopened.load(&StaticSource(canonical())).await.unwrap();
    assert_eq!(report.local_only, 2);
    assert_eq!(
        reopened.find(&hidden.key()).map(|record| record.volume),
        Some(99)
    );
}

#[tokio::test]
async fn add_rejects_a_key_already_in_the_working_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    store.load(&StaticSource(canonical())).await.unwrap();
    store.add(ArticleRecord::new("Mine", 2020, 1, 1)).unwrap();

    let twice = store.add(ArticleRecord::new("Mine", 2020, 2, 2));
    assert!(matches!(
        twice,
        Err(StoreError::DuplicateKey(key)) if key == RecordKey::new("Mine", 2020)
    ));
    let canonical_key = store.add(ArticleRecord::new("Matching law", 1970, 1, 1));
    assert!(matches!(canonical_key, Err(StoreError::DuplicateKey(_))));

    assert_eq!(store.len(), 3);
    let persisted: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 3);
}

#[tokio::test]
async fn malformed_local_entries_are_quarantined() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(
        RECORDS_KEY,
        r#"[
            {"title": "Kept", "year": "1999", "volume": 70, "issue": 1},
            {"title": "Broken", "year": "soon"}
        ]"#,
    )
    .unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&StaticSource(canonical())).await.unwrap();

    assert_eq!(report.quarantined, 1);
    assert!(store.find(&RecordKey::new("Kept", 1999)).is_some());

    let quarantined = store.quarantined_entries().unwrap();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(quarantined[0]["title"], "Broken");

    let cleaned: Vec<ArticleRecord> =
        serde_json::from_str(&repo.get(RECORDS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(cleaned.len(), 1);
}

#[tokio::test]
async fn non_array_local_state_is_quarantined_whole() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(RECORDS_KEY, "{not json").unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    let report = store.load(&StaticSource(canonical())).await.unwrap();

    assert_eq!(report.quarantined, 1);
    assert_eq!(store.len(), 2);
    assert_eq!(repo.get(RECORDS_KEY).unwrap(), None);
    assert!(repo.get(QUARANTINE_KEY).unwrap().unwrap().contains("{not json"));
}

#[test]
fn credential_is_restored_and_cleared() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLocalStateRepository::try_new(&conn).unwrap();
    repo.set(CREDENTIAL_KEY, "ghp_example").unwrap();

    let mut store = CatalogStore::open(&repo).unwrap();
    assert_eq!(store.credential(), Some("ghp_example"));

    store.clear_credential().unwrap();
    assert_eq!(store.credential(), None);
    assert_eq!(repo.get(CREDENTIAL_KEY).unwrap(), None);
}
