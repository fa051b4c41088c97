//! Command execution.
//!
//! # Responsibility
//! - Resolve config, start logging and open local storage.
//! - Load the catalog and run one command against it.
//!
//! # Invariants
//! - Every command that can write records loads the catalog first, so a save
//!   never drops previously stored local records.

use crate::browse;
use crate::cli::{Cli, Command};
use crate::render;
use bpcatalog_core::contribute::HostError;
use bpcatalog_core::export::{self, ExportError};
use bpcatalog_core::{
    filter, init_logging, open_db, CatalogConfig, CatalogStats, CatalogStore, ConfigError,
    ContributionError, ContributionService, ContributionSubmitter, CriteriaError, DatasetLocation,
    DbError, DraftError, EntryDraft, Facets, GitHubClient, LoadReport, LocalStateRepository,
    LoggingError, RepoError, SourceError, SqliteLocalStateRepository, StoreError,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type AppResult<T> = Result<T, AppError>;

/// Any failure that ends a command.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Logging(LoggingError),
    Io(std::io::Error),
    Db(DbError),
    Repo(RepoError),
    Store(StoreError),
    Source(SourceError),
    Host(HostError),
    Criteria(CriteriaError),
    Draft(DraftError),
    Export(ExportError),
    Contribution(ContributionError),
    RecordNotFound(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "local storage: {err}"),
            Self::Repo(err) => write!(f, "local storage: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Source(err) => write!(f, "{err}"),
            Self::Host(err) => write!(f, "{err}"),
            Self::Criteria(err) => write!(f, "{err}"),
            Self::Draft(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Contribution(err) => write!(f, "{err}"),
            Self::RecordNotFound(title) => write!(f, "no record titled `{title}`"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Source(err) => Some(err),
            Self::Host(err) => Some(err),
            Self::Criteria(err) => Some(err),
            Self::Draft(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Contribution(err) => Some(err),
            Self::RecordNotFound(_) => None,
        }
    }
}

macro_rules! impl_from_error {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_from_error!(
    ConfigError => Config,
    LoggingError => Logging,
    std::io::Error => Io,
    DbError => Db,
    RepoError => Repo,
    StoreError => Store,
    SourceError => Source,
    HostError => Host,
    CriteriaError => Criteria,
    DraftError => Draft,
    ExportError => Export,
    ContributionError => Contribution,
);

/// Runs one parsed command line to completion.
pub async fn run(cli: Cli) -> AppResult<()> {
    let mut config = CatalogConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let log_dir = std::path::absolute(&config.log_dir)?;
    init_logging(&config.log_level, &log_dir)?;

    let conn = open_db(&config.storage_path)?;
    let repo = SqliteLocalStateRepository::try_new(&conn)?;
    let mut store = CatalogStore::open(repo)?;
    let service = ContributionService::new(ContributionSubmitter::new(
        GitHubClient::new(&config.github)?,
        config.github.data_file.clone(),
        config.github.base_branch.clone(),
    ));

    match cli.command {
        Command::Connect { token } => {
            let outcome = service.connect(&mut store, &token).await?;
            println!("{}", outcome.message());
        }
        Command::Disconnect => {
            service.disconnect(&mut store)?;
            println!("Disconnected from GitHub");
        }
        Command::List { filters, view } => {
            load_catalog(&config, &mut store).await?;
            let criteria = filters.to_criteria()?;
            let visible = filter(store.records(), &criteria);
            let rendered = match view {
                crate::cli::ListView::Table => render::table(&visible),
                crate::cli::ListView::Cards => render::cards(&visible),
            };
            println!("{rendered}");
        }
        Command::Show {
            title,
            year,
            equation,
        } => {
            load_catalog(&config, &mut store).await?;
            let record = store
                .find_by_title(&title, year)
                .ok_or_else(|| AppError::RecordNotFound(title.clone()))?;
            println!("{}", render::detail(record, equation.to_view(), render::SwitchHint::Flag));
        }
        Command::Stats => {
            load_catalog(&config, &mut store).await?;
            println!("{}", render::stats(&CatalogStats::compute(store.records())));
        }
        Command::Facets => {
            load_catalog(&config, &mut store).await?;
            println!("{}", render::facets(&Facets::collect(store.records())));
        }
        Command::Add(args) => {
            load_catalog(&config, &mut store).await?;
            let record = EntryDraft::from(args).into_record()?;
            let outcome = service.contribute(&mut store, record).await?;
            if outcome.is_warning() {
                eprintln!("warning: {}", outcome.message());
            } else {
                println!("{}", outcome.message());
            }
        }
        Command::Export {
            format,
            out,
            filters,
        } => {
            load_catalog(&config, &mut store).await?;
            let criteria = filters.to_criteria()?;
            let visible = filter(store.records(), &criteria);
            let format = format.to_format();
            let contents = export::render(format, &visible, store.records())?;
            let path = out.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
            export::write_export(&path, &contents)?;
            println!("Exported to {}", path.display());
        }
        Command::Browse => {
            load_catalog(&config, &mut store).await?;
            browse::run(&config, &mut store, &service).await?;
        }
    }
    Ok(())
}

/// Loads the catalog, reporting fallback and quarantine on stderr.
pub async fn load_catalog<R: LocalStateRepository>(
    config: &CatalogConfig,
    store: &mut CatalogStore<R>,
) -> AppResult<LoadReport> {
    let source = DatasetLocation::parse(&config.dataset)
        .into_source(&config.github.user_agent, config.github.timeout())?;
    let report = store.load(source.as_ref()).await?;

    if let Some(reason) = &report.fallback_error {
        eprintln!(
            "warning: could not load dataset from {} ({reason}); showing built-in sample data",
            report.source
        );
    }
    if report.quarantined > 0 {
        eprintln!(
            "warning: {} malformed local entr{} moved to quarantine",
            report.quarantined,
            if report.quarantined == 1 { "y" } else { "ies" }
        );
    }
    info!(
        "event=cli_load module=cli status=ok total={} fallback={}",
        report.total(),
        report.used_fallback()
    );
    Ok(report)
}
