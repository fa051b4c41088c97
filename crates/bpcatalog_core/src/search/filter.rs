//! Multi-category record filter.
//!
//! # Responsibility
//! - Decide which records are visible for the current selections.
//!
//! # Invariants
//! - Output preserves the relative order of the input.
//! - Categories combine with AND; searched fields combine with OR.
//! - An absent author/process field never matches a concrete filter value.
//! - A `None` selection imposes no constraint for its category.

use crate::model::article::ArticleRecord;
use crate::model::field::FieldValue;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selection value meaning "no constraint".
pub const ALL_SENTINEL: &str = "all";

/// Year-based constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    Any,
    /// `year` in `[start, start + 10)`.
    Decade(i32),
    Year(i32),
}

impl YearFilter {
    /// Parses a decade selection such as `1990` or `1990s`.
    pub fn parse_decade(value: &str) -> Result<Self, CriteriaError> {
        let Some(trimmed) = selection(value) else {
            return Ok(Self::Any);
        };
        let digits = trimmed.strip_suffix('s').unwrap_or(trimmed.as_str());
        match digits.parse::<i32>() {
            Ok(start) if start % 10 == 0 => Ok(Self::Decade(start)),
            _ => Err(CriteriaError::InvalidDecade(value.to_string())),
        }
    }

    /// Parses an exact-year selection.
    pub fn parse_year(value: &str) -> Result<Self, CriteriaError> {
        let Some(trimmed) = selection(value) else {
            return Ok(Self::Any);
        };
        trimmed
            .parse::<i32>()
            .map(Self::Year)
            .map_err(|_| CriteriaError::InvalidYear(value.to_string()))
    }

    pub fn matches(self, year: i32) -> bool {
        match self {
            Self::Any => true,
            Self::Decade(start) => year >= start && year < start + 10,
            Self::Year(expected) => year == expected,
        }
    }
}

/// Invalid filter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    InvalidDecade(String),
    InvalidYear(String),
}

impl Display for CriteriaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDecade(value) => {
                write!(f, "invalid decade `{value}`; expected e.g. 1990 or 1990s")
            }
            Self::InvalidYear(value) => write!(f, "invalid year `{value}`"),
        }
    }
}

impl Error for CriteriaError {}

/// Current filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub year: YearFilter,
    /// Exact process/principle tag.
    pub process: Option<String>,
    /// Exact author name.
    pub author: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
}

impl FilterCriteria {
    /// Builds criteria from raw UI selections, mapping `all`/blank to no constraint.
    pub fn from_selections(
        decade: &str,
        process: &str,
        author: &str,
        search: &str,
    ) -> Result<Self, CriteriaError> {
        Ok(Self {
            year: YearFilter::parse_decade(decade)?,
            process: selection(process),
            author: selection(author),
            search: search_term(search),
        })
    }

    /// Replaces the search term; blank clears it.
    pub fn set_search(&mut self, value: &str) {
        self.search = search_term(value);
    }

    pub fn set_process(&mut self, value: &str) {
        self.process = selection(value);
    }

    pub fn set_author(&mut self, value: &str) {
        self.author = selection(value);
    }

    /// Returns `true` when no category constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        self.year == YearFilter::Any
            && self.process.is_none()
            && self.author.is_none()
            && self.search.is_none()
    }

    /// Returns whether one record passes every category.
    pub fn matches(&self, record: &ArticleRecord) -> bool {
        let needle = self.search.as_deref().map(str::to_lowercase);
        self.matches_with(record, needle.as_deref())
    }

    fn matches_with(&self, record: &ArticleRecord, needle_lower: Option<&str>) -> bool {
        if !self.year.matches(record.year) {
            return false;
        }
        if let Some(process) = self.process.as_deref() {
            if !member(record.process.as_ref(), process) {
                return false;
            }
        }
        if let Some(author) = self.author.as_deref() {
            if !member(record.authors.as_ref(), author) {
                return false;
            }
        }
        match needle_lower {
            Some(needle) => search_matches(record, needle),
            None => true,
        }
    }
}

/// Returns the visible subset of `records`, preserving order.
pub fn filter<'a>(records: &'a [ArticleRecord], criteria: &FilterCriteria) -> Vec<&'a ArticleRecord> {
    let needle = criteria.search.as_deref().map(str::to_lowercase);
    records
        .iter()
        .filter(|record| criteria.matches_with(record, needle.as_deref()))
        .collect()
}

fn member(field: Option<&FieldValue>, value: &str) -> bool {
    field.is_some_and(|field| field.contains_exact(value))
}

fn search_matches(record: &ArticleRecord, needle_lower: &str) -> bool {
    let text_fields = [
        Some(record.title.as_str()),
        record.abstract_text.as_deref(),
        record.static_equation.as_deref(),
        record.static_definitions.as_deref(),
        record.recursive_equation.as_deref(),
        record.recursive_definitions.as_deref(),
    ];

    text_fields
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(needle_lower))
        || record
            .authors
            .as_ref()
            .is_some_and(|authors| authors.contains_lowercase(needle_lower))
        || record
            .process
            .as_ref()
            .is_some_and(|process| process.contains_lowercase(needle_lower))
}

fn selection(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn search_term(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
