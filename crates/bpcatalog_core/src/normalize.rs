//! Record normalizer for user-entered text.
//!
//! # Responsibility
//! - Parse free-form author/process input into scalar-or-list values.
//! - Turn a raw entry form into a validated [`ArticleRecord`].
//!
//! # Invariants
//! - Authors split on `" & "` when present, otherwise on `,`.
//! - Processes split on `,`.
//! - Segments are trimmed and empty segments dropped.
//! - One remaining segment collapses to a scalar; empty input yields an empty
//!   scalar, never an empty list.

use crate::model::article::ArticleRecord;
use crate::model::field::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const AUTHOR_AMPERSAND_SEPARATOR: &str = " & ";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Parses an authors input line.
///
/// `"Smith & Jones"` -> `["Smith", "Jones"]`, `"Smith"` -> `"Smith"`.
pub fn parse_authors(input: &str) -> FieldValue {
    if input.contains(AUTHOR_AMPERSAND_SEPARATOR) {
        collapse_segments(input.split(AUTHOR_AMPERSAND_SEPARATOR))
    } else {
        collapse_segments(input.split(','))
    }
}

/// Parses a comma-separated process/principle input line.
pub fn parse_processes(input: &str) -> FieldValue {
    collapse_segments(input.split(','))
}

fn collapse_segments<'a>(segments: impl Iterator<Item = &'a str>) -> FieldValue {
    let mut values = segments
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    match values.len() {
        0 => FieldValue::Scalar(String::new()),
        1 => FieldValue::Scalar(values.remove(0)),
        _ => FieldValue::List(values),
    }
}

/// Collapses internal whitespace runs to one space and trims the ends.
pub fn normalize_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Validation failure for a raw entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    MissingTitle,
    /// A required integer field is blank or not an integer.
    InvalidInteger {
        field: &'static str,
        value: String,
    },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "title is required"),
            Self::InvalidInteger { field, value } => {
                write!(f, "{field} must be an integer, got `{value}`")
            }
        }
    }
}

impl Error for DraftError {}

/// Raw "contribute an entry" form values, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub authors: String,
    pub year: String,
    pub volume: String,
    pub issue: String,
    pub abstract_text: String,
    pub process: String,
    pub static_equation: String,
    pub static_definitions: String,
    pub recursive_equation: String,
    pub recursive_definitions: String,
    pub url: String,
    pub pages: String,
    pub doi: String,
}

impl EntryDraft {
    /// Validates and converts the draft into a record.
    ///
    /// # Errors
    /// - [`DraftError::MissingTitle`] when the title is blank.
    /// - [`DraftError::InvalidInteger`] when year/volume/issue do not parse.
    pub fn into_record(self) -> Result<ArticleRecord, DraftError> {
        let title = normalize_whitespace(&self.title);
        if title.is_empty() {
            return Err(DraftError::MissingTitle);
        }

        let year = parse_required_int("year", &self.year)?;
        let volume = parse_required_int("volume", &self.volume)?;
        let issue = parse_required_int("issue", &self.issue)?;

        let mut record = ArticleRecord::new(title, year, volume, issue);
        record.authors = non_blank(&self.authors).map(parse_authors);
        record.process = non_blank(&self.process).map(parse_processes);
        record.abstract_text = non_blank(&self.abstract_text).map(str::to_string);
        record.static_equation = non_blank(&self.static_equation).map(str::to_string);
        record.static_definitions = non_blank(&self.static_definitions).map(str::to_string);
        record.recursive_equation = non_blank(&self.recursive_equation).map(str::to_string);
        record.recursive_definitions =
            non_blank(&self.recursive_definitions).map(str::to_string);
        record.url = non_blank(&self.url).map(str::to_string);
        record.pages = non_blank(&self.pages).map(str::to_string);
        record.doi = non_blank(&self.doi).map(str::to_string);
        Ok(record)
    }
}

fn parse_required_int(field: &'static str, value: &str) -> Result<i32, DraftError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| DraftError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
