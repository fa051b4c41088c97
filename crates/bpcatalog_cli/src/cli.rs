//! Command-line surface.

use bpcatalog_core::{
    CatalogConfig, CriteriaError, EntryDraft, EquationView, ExportFormat, FilterCriteria, YearFilter,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bpcatalog")]
#[command(about = "Browse, search and contribute to the Behavioral Process Catalog")]
#[command(version)]
pub struct Cli {
    /// TOML config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "BPCATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Canonical dataset: JSON file path or http(s) URL
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// SQLite file holding locally saved records and the credential
    #[arg(long = "storage", global = true)]
    pub storage: Option<PathBuf>,

    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of file and environment config.
    pub fn apply_overrides(&self, config: &mut CatalogConfig) {
        if let Some(dataset) = &self.dataset {
            config.dataset = dataset.clone();
        }
        if let Some(storage) = &self.storage {
            config.storage_path = storage.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List records matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = ListView::Table)]
        view: ListView,
    },
    /// Show one record in detail
    Show {
        title: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_enum, default_value_t = EquationArg::Static)]
        equation: EquationArg,
    },
    /// Catalog statistics
    Stats,
    /// Available filter values
    Facets,
    /// Add an entry and propose it upstream when connected
    Add(AddArgs),
    /// Validate and store a GitHub access token
    Connect { token: String },
    /// Forget the stored GitHub access token
    Disconnect,
    /// Export visible records (CSV) or the full catalog (JSON)
    Export {
        #[arg(value_enum)]
        format: FormatArg,
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive browsing session
    Browse,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Decade start, e.g. 1990 or 1990s
    #[arg(long, conflicts_with = "year")]
    pub decade: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub process: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_criteria(&self) -> Result<FilterCriteria, CriteriaError> {
        let mut criteria = FilterCriteria::from_selections(
            self.decade.as_deref().unwrap_or_default(),
            self.process.as_deref().unwrap_or_default(),
            self.author.as_deref().unwrap_or_default(),
            self.search.as_deref().unwrap_or_default(),
        )?;
        if let Some(year) = self.year.as_deref() {
            criteria.year = YearFilter::parse_year(year)?;
        }
        Ok(criteria)
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub year: String,
    #[arg(long)]
    pub volume: String,
    #[arg(long)]
    pub issue: String,
    /// "A & B" or "A, B"
    #[arg(long)]
    pub authors: Option<String>,
    /// Comma-separated process tags
    #[arg(long)]
    pub process: Option<String>,
    #[arg(long = "abstract")]
    pub abstract_text: Option<String>,
    #[arg(long)]
    pub static_equation: Option<String>,
    #[arg(long)]
    pub static_definitions: Option<String>,
    #[arg(long)]
    pub recursive_equation: Option<String>,
    #[arg(long)]
    pub recursive_definitions: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub pages: Option<String>,
    #[arg(long)]
    pub doi: Option<String>,
}

impl From<AddArgs> for EntryDraft {
    fn from(args: AddArgs) -> Self {
        Self {
            title: args.title,
            authors: args.authors.unwrap_or_default(),
            year: args.year,
            volume: args.volume,
            issue: args.issue,
            abstract_text: args.abstract_text.unwrap_or_default(),
            process: args.process.unwrap_or_default(),
            static_equation: args.static_equation.unwrap_or_default(),
            static_definitions: args.static_definitions.unwrap_or_default(),
            recursive_equation: args.recursive_equation.unwrap_or_default(),
            recursive_definitions: args.recursive_definitions.unwrap_or_default(),
            url: args.url.unwrap_or_default(),
            pages: args.pages.unwrap_or_default(),
            doi: args.doi.unwrap_or_default(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    Table,
    Cards,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationArg {
    Static,
    Recursive,
}

impl EquationArg {
    pub fn to_view(self) -> EquationView {
        match self {
            Self::Static => EquationView::Static,
            Self::Recursive => EquationView::Recursive,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Csv,
    Json,
}

impl FormatArg {
    pub fn to_format(self) -> ExportFormat {
        match self {
            Self::Csv => ExportFormat::Csv,
            Self::Json => ExportFormat::Json,
        }
    }
}
