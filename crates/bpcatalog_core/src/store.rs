//! In-memory catalog store.
//!
//! # Responsibility
//! - Own the working set of records and the cached hosting credential.
//! - Merge the canonical dataset with locally saved records on load.
//! - Persist the working set on every add.
//!
//! # Invariants
//! - Canonical records always win over local records with the same
//!   `(title, year)` key.
//! - The working set never holds two records with the same key; `add`
//!   rejects a key that is already present.
//! - Built-in fallback records are never persisted. Local records hidden by
//!   a fallback record with the same key stay persisted.
//! - Records are only ever appended; there is no update or delete path.
//! - Loading never fails because of malformed local state; bad entries are
//!   quarantined under [`QUARANTINE_KEY`].

use crate::model::article::{decode_record_array, ArticleRecord, RecordKey};
use crate::repo::local_state::{
    LocalStateRepository, RepoError, CREDENTIAL_KEY, QUARANTINE_KEY, RECORDS_KEY,
};
use crate::source::{builtin_dataset, DatasetSource};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    Encode(serde_json::Error),
    /// A record with the same `(title, year)` is already in the working set.
    DuplicateKey(RecordKey),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to serialize records: {err}"),
            Self::DuplicateKey(key) => write!(f, "entry {key} already exists in the catalog"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::DuplicateKey(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Summary of one [`CatalogStore::load`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Where the canonical set came from.
    pub source: String,
    pub canonical: usize,
    /// Local records appended because the canonical set lacks their key.
    pub local_only: usize,
    /// Local records dropped because the canonical set already has their key.
    pub superseded: usize,
    /// Local entries moved to quarantine during this load.
    pub quarantined: usize,
    /// Set when the canonical fetch failed and the built-in dataset was used.
    pub fallback_error: Option<String>,
}

impl LoadReport {
    pub fn used_fallback(&self) -> bool {
        self.fallback_error.is_some()
    }

    pub fn total(&self) -> usize {
        self.canonical + self.local_only
    }
}

/// Output of [`merge_local`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecords {
    pub records: Vec<ArticleRecord>,
    pub local_only: usize,
    pub superseded: usize,
}

/// Merges locally saved records into the canonical set.
///
/// Canonical records keep their order and come first; local records whose
/// key is not yet present follow in their saved order. A key seen twice in
/// `local` is only appended once.
pub fn merge_local(canonical: Vec<ArticleRecord>, local: Vec<ArticleRecord>) -> MergedRecords {
    let mut seen = canonical
        .iter()
        .map(ArticleRecord::key)
        .collect::<HashSet<RecordKey>>();
    let mut records = canonical;
    let mut local_only = 0;
    let mut superseded = 0;

    for record in local {
        if seen.insert(record.key()) {
            records.push(record);
            local_only += 1;
        } else {
            superseded += 1;
        }
    }

    MergedRecords {
        records,
        local_only,
        superseded,
    }
}

/// Single owner of catalog application state.
pub struct CatalogStore<R: LocalStateRepository> {
    repo: R,
    records: Vec<ArticleRecord>,
    credential: Option<String>,
    /// Keys served from the built-in dataset by the last load.
    fallback_keys: HashSet<RecordKey>,
    /// Local records shadowed by a built-in record during the last load.
    shadowed: Vec<ArticleRecord>,
}

impl<R: LocalStateRepository> CatalogStore<R> {
    /// Creates an empty store and restores the cached credential.
    pub fn open(repo: R) -> StoreResult<Self> {
        let credential = repo
            .get(CREDENTIAL_KEY)?
            .filter(|value| !value.trim().is_empty());
        Ok(Self {
            repo,
            records: Vec::new(),
            credential,
            fallback_keys: HashSet::new(),
            shadowed: Vec::new(),
        })
    }

    /// Loads the canonical dataset and merges local-only records into it.
    ///
    /// A failed fetch falls back to [`builtin_dataset`]. Only local storage
    /// failures are returned as errors.
    pub async fn load(&mut self, source: &dyn DatasetSource) -> StoreResult<LoadReport> {
        let started_at = Instant::now();
        let origin = source.describe();

        let (canonical, fallback_error) = match source.fetch().await {
            Ok(records) => (records, None),
            Err(err) => {
                warn!(
                    "event=catalog_load module=store status=fallback source={} error={}",
                    origin, err
                );
                (builtin_dataset(), Some(err.to_string()))
            }
        };
        let canonical_count = canonical.len();

        let (local, quarantined) = self.read_local_records()?;
        if fallback_error.is_some() {
            self.fallback_keys = canonical.iter().map(ArticleRecord::key).collect();
            self.shadowed = shadowed_by(&self.fallback_keys, &local);
        } else {
            self.fallback_keys.clear();
            self.shadowed.clear();
        }
        let merged = merge_local(canonical, local);
        self.records = merged.records;

        info!(
            "event=catalog_load module=store status=ok source={} canonical={} local_only={} superseded={} quarantined={} fallback={} duration_ms={}",
            origin,
            canonical_count,
            merged.local_only,
            merged.superseded,
            quarantined,
            fallback_error.is_some(),
            started_at.elapsed().as_millis()
        );

        Ok(LoadReport {
            source: origin,
            canonical: canonical_count,
            local_only: merged.local_only,
            superseded: merged.superseded,
            quarantined,
            fallback_error,
        })
    }

    /// Appends one record and persists the working set.
    ///
    /// # Errors
    /// - [`StoreError::DuplicateKey`] when the key is already present.
    pub fn add(&mut self, record: ArticleRecord) -> StoreResult<()> {
        let key = record.key();
        if self.find(&key).is_some() {
            warn!(
                "event=catalog_add module=store status=rejected reason=duplicate_key year={}",
                key.year
            );
            return Err(StoreError::DuplicateKey(key));
        }
        info!(
            "event=catalog_add module=store status=ok year={} total={}",
            record.year,
            self.records.len() + 1
        );
        self.records.push(record);
        self.persist()
    }

    /// Current working set in display order.
    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds a record by identity key.
    pub fn find(&self, key: &RecordKey) -> Option<&ArticleRecord> {
        self.records
            .iter()
            .find(|record| record.has_key(&key.title, key.year))
    }

    /// Finds the first record whose title matches case-insensitively.
    pub fn find_by_title(&self, title: &str, year: Option<i32>) -> Option<&ArticleRecord> {
        let wanted = title.trim().to_lowercase();
        self.records.iter().find(|record| {
            record.title.to_lowercase() == wanted && year.map_or(true, |y| record.year == y)
        })
    }

    /// Cached hosting credential, if connected.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Stores and persists a validated credential.
    pub fn set_credential(&mut self, token: impl Into<String>) -> StoreResult<()> {
        let token = token.into();
        self.repo.set(CREDENTIAL_KEY, &token)?;
        self.credential = Some(token);
        Ok(())
    }

    /// Forgets the credential.
    pub fn clear_credential(&mut self) -> StoreResult<()> {
        self.repo.remove(CREDENTIAL_KEY)?;
        self.credential = None;
        Ok(())
    }

    /// Returns the raw quarantined entries, oldest first.
    pub fn quarantined_entries(&self) -> StoreResult<Vec<Value>> {
        Ok(read_quarantine(&self.repo)?)
    }

    fn persist(&self) -> StoreResult<()> {
        let persisted = self
            .records
            .iter()
            .filter(|record| !self.fallback_keys.contains(&record.key()))
            .chain(&self.shadowed)
            .collect::<Vec<_>>();
        let encoded = serde_json::to_string(&persisted)?;
        self.repo.set(RECORDS_KEY, &encoded)?;
        Ok(())
    }

    fn read_local_records(&self) -> StoreResult<(Vec<ArticleRecord>, usize)> {
        let Some(text) = self.repo.get(RECORDS_KEY)? else {
            return Ok((Vec::new(), 0));
        };

        match decode_record_array(&text) {
            Ok(decoded) if decoded.rejected.is_empty() => Ok((decoded.records, 0)),
            Ok(decoded) => {
                let quarantined = decoded.rejected.len();
                warn!(
                    "event=local_state_quarantine module=store status=partial quarantined={} kept={}",
                    quarantined,
                    decoded.records.len()
                );
                append_quarantine(&self.repo, decoded.rejected)?;
                let cleaned = serde_json::to_string(&decoded.records)?;
                self.repo.set(RECORDS_KEY, &cleaned)?;
                Ok((decoded.records, quarantined))
            }
            Err(err) => {
                warn!(
                    "event=local_state_quarantine module=store status=error reason=not_an_array error={}",
                    err
                );
                append_quarantine(&self.repo, vec![Value::String(text)])?;
                self.repo.remove(RECORDS_KEY)?;
                Ok((Vec::new(), 1))
            }
        }
    }
}

/// Local records whose key is taken by a built-in record, first copy only.
fn shadowed_by(fallback_keys: &HashSet<RecordKey>, local: &[ArticleRecord]) -> Vec<ArticleRecord> {
    let mut seen = HashSet::new();
    local
        .iter()
        .filter(|record| {
            let key = record.key();
            fallback_keys.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

fn read_quarantine<R: LocalStateRepository>(repo: &R) -> Result<Vec<Value>, RepoError> {
    let Some(text) = repo.get(QUARANTINE_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<Value>>(&text) {
        Ok(entries) => Ok(entries),
        Err(_) => Ok(vec![Value::String(text)]),
    }
}

fn append_quarantine<R: LocalStateRepository>(repo: &R, entries: Vec<Value>) -> StoreResult<()> {
    let mut quarantine = read_quarantine(repo)?;
    quarantine.extend(entries);
    let encoded = serde_json::to_string(&quarantine)?;
    repo.set(QUARANTINE_KEY, &encoded)?;
    Ok(())
}
