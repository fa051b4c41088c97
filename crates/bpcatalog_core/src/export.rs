//! CSV and JSON export.
//!
//! # Responsibility
//! - Serialize the visible subset to CSV with a fixed column order.
//! - Serialize the full working set to JSON.
//! - Write an export to a file (the CLI's "download").
//!
//! # Invariants
//! - CSV has one header row plus exactly one row per visible record.
//! - Absent optional fields export as empty cells.

use crate::model::article::ArticleRecord;
use crate::model::field::FieldValue;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// CSV header in fixed column order.
pub const CSV_COLUMNS: [&str; 12] = [
    "Title",
    "Authors",
    "Year",
    "Volume",
    "Issue",
    "Abstract",
    "Process",
    "Static Equation",
    "Static Definitions",
    "Recursive Equation",
    "Recursive Definitions",
    "URL",
];

/// Separator used for list values inside one CSV cell.
const CSV_LIST_SEPARATOR: &str = "; ";

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Visible (filtered) records.
    Csv,
    /// Full working set.
    Json,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Csv => "behavioral_process_catalog.csv",
            Self::Json => "behavioral_process_catalog.json",
        }
    }
}

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    Encode(serde_json::Error),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Renders `visible` as CSV.
pub fn to_csv(visible: &[&ArticleRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_COLUMNS.iter().map(|column| column.to_string()));
    for record in visible {
        push_row(&mut out, csv_cells(record).into_iter());
    }
    out
}

/// Renders `records` as an indented JSON array.
pub fn to_json(records: &[ArticleRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Renders one export: CSV of `visible` or JSON of `all`.
pub fn render(
    format: ExportFormat,
    visible: &[&ArticleRecord],
    all: &[ArticleRecord],
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(visible)),
        ExportFormat::Json => to_json(all),
    }
}

/// Writes rendered export contents to `path`.
pub fn write_export(path: impl AsRef<Path>, contents: &str) -> Result<(), ExportError> {
    let path = path.as_ref();
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "event=export_write module=export status=ok path={} bytes={}",
        path.display(),
        contents.len()
    );
    Ok(())
}

fn csv_cells(record: &ArticleRecord) -> Vec<String> {
    vec![
        record.title.clone(),
        list_cell(record.authors.as_ref()),
        record.year.to_string(),
        record.volume.to_string(),
        record.issue.to_string(),
        text_cell(record.abstract_text.as_deref()),
        list_cell(record.process.as_ref()),
        text_cell(record.static_equation.as_deref()),
        text_cell(record.static_definitions.as_deref()),
        text_cell(record.recursive_equation.as_deref()),
        text_cell(record.recursive_definitions.as_deref()),
        text_cell(record.url.as_deref()),
    ]
}

fn list_cell(value: Option<&FieldValue>) -> String {
    value
        .map(|value| value.display_with(CSV_LIST_SEPARATOR))
        .unwrap_or_default()
}

fn text_cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let escaped = cells.map(|cell| escape_cell(&cell)).collect::<Vec<_>>();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
