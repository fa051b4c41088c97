//! Key/value local state repository and SQLite implementation.
//!
//! # Responsibility
//! - Persist the serialized record array and the credential under fixed keys.
//! - Reject connections whose schema is missing the `local_state` table.
//!
//! # Invariants
//! - `set` is an upsert; `remove` of a missing key is not an error.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the serialized in-memory record array.
pub const RECORDS_KEY: &str = "behavioralData";
/// Storage key for entries that failed to decode from [`RECORDS_KEY`].
pub const QUARANTINE_KEY: &str = "behavioralData.quarantine";
/// Storage key for the opaque hosting credential.
pub const CREDENTIAL_KEY: &str = "github_token";

pub type RepoResult<T> = Result<T, RepoError>;

/// Local state persistence error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "local state schema is missing table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value storage contract.
pub trait LocalStateRepository {
    /// Returns the stored value for `key`.
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes `key`; returns whether a value existed.
    fn remove(&self, key: &str) -> RepoResult<bool>;
}

impl<T: LocalStateRepository + ?Sized> LocalStateRepository for &T {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        (**self).remove(key)
    }
}

/// SQLite-backed local state repository.
pub struct SqliteLocalStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLocalStateRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "local_state")? {
            return Err(RepoError::MissingRequiredTable("local_state"));
        }
        Ok(Self { conn })
    }
}

impl LocalStateRepository for SqliteLocalStateRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO local_state (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM local_state WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
