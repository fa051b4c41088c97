//! Core domain logic for the Behavioral Process Catalog.
//! This crate owns record semantics, merging, filtering, persistence and the
//! upstream contribution flow; front ends only render.

pub mod config;
pub mod contribute;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod search;
pub mod service;
pub mod source;
pub mod stats;
pub mod store;
pub mod view;

pub use config::{CatalogConfig, ConfigError, GitHubConfig};
pub use contribute::{ContributionSubmitter, GitHubClient, PullRequestRef, SourceHost};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::{ExportError, ExportFormat};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{ArticleRecord, RecordKey, PLACEHOLDER};
pub use model::field::FieldValue;
pub use normalize::{parse_authors, parse_processes, DraftError, EntryDraft};
pub use repo::local_state::{
    LocalStateRepository, RepoError, RepoResult, SqliteLocalStateRepository,
};
pub use search::facets::Facets;
pub use search::filter::{filter, CriteriaError, FilterCriteria, YearFilter};
pub use service::contribution_service::{
    ConnectOutcome, ContributionError, ContributionOutcome, ContributionService,
};
pub use source::{DatasetLocation, DatasetSource, SourceError};
pub use stats::CatalogStats;
pub use store::{CatalogStore, LoadReport, StoreError};
pub use view::{EquationView, ViewMode, ViewState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
