//! Article record model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its JSON shape.
//! - Provide placeholder-aware display helpers for optional fields.
//!
//! # Invariants
//! - `title`, `year`, `volume` and `issue` are required on decode.
//! - Absent optional fields are omitted (not `null`) on encode.
//! - Identity is the `(title, year)` pair exposed by [`ArticleRecord::key`].

use crate::model::field::FieldValue;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Display value used for every absent optional field.
pub const PLACEHOLDER: &str = "N/A";

/// Identity key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub title: String,
    pub year: i32,
}

impl RecordKey {
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

/// One catalog entry: an article plus its behavioral-science metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    /// One name or an ordered list of names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<FieldValue>,
    #[serde(deserialize_with = "lenient_int")]
    pub year: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub volume: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub issue: i32,
    /// Serialized as `abstract`; the Rust name avoids the reserved keyword.
    #[serde(
        rename = "abstract",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_text: Option<String>,
    /// Behavioral principle/process tag(s).
    #[serde(alias = "principle", default, skip_serializing_if = "Option::is_none")]
    pub process: Option<FieldValue>,
    /// May contain math markup.
    #[serde(alias = "equation", default, skip_serializing_if = "Option::is_none")]
    pub static_equation: Option<String>,
    /// Semicolon-delimited symbol definitions for the static equation.
    #[serde(
        alias = "equationDefinitions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub static_definitions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive_equation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive_definitions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl ArticleRecord {
    /// Creates a record with only the required fields set.
    pub fn new(title: impl Into<String>, year: i32, volume: i32, issue: i32) -> Self {
        Self {
            title: title.into(),
            authors: None,
            year,
            volume,
            issue,
            abstract_text: None,
            process: None,
            static_equation: None,
            static_definitions: None,
            recursive_equation: None,
            recursive_definitions: None,
            url: None,
            pages: None,
            doi: None,
        }
    }

    /// Returns the `(title, year)` identity key.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.title.clone(), self.year)
    }

    /// Returns whether this record has the given identity.
    pub fn has_key(&self, title: &str, year: i32) -> bool {
        self.title == title && self.year == year
    }

    pub fn with_authors(mut self, authors: impl Into<FieldValue>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_process(mut self, process: impl Into<FieldValue>) -> Self {
        self.process = Some(process.into());
        self
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = Some(text.into());
        self
    }

    pub fn with_static_equation(mut self, equation: impl Into<String>) -> Self {
        self.static_equation = Some(equation.into());
        self
    }

    pub fn with_recursive_equation(mut self, equation: impl Into<String>) -> Self {
        self.recursive_equation = Some(equation.into());
        self
    }

    /// Authors for display, or [`PLACEHOLDER`].
    pub fn authors_display(&self) -> String {
        field_display(self.authors.as_ref())
    }

    /// Process tags for display, or [`PLACEHOLDER`].
    pub fn process_display(&self) -> String {
        field_display(self.process.as_ref())
    }

    pub fn abstract_display(&self) -> &str {
        text_display(self.abstract_text.as_deref())
    }

    pub fn static_equation_display(&self) -> &str {
        text_display(self.static_equation.as_deref())
    }

    pub fn recursive_equation_display(&self) -> &str {
        text_display(self.recursive_equation.as_deref())
    }

    pub fn url_display(&self) -> &str {
        text_display(self.url.as_deref())
    }
}

/// Returns the display form of an optional scalar-or-list field.
pub fn field_display(value: Option<&FieldValue>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.display(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Returns `value`, or [`PLACEHOLDER`] when absent or blank.
pub fn text_display(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER,
    }
}

/// Splits semicolon-delimited equation definitions into trimmed entries.
pub fn split_definitions(value: &str) -> Vec<&str> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Result of decoding a JSON array entry by entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedArray {
    /// Entries that decoded into records, in source order.
    pub records: Vec<ArticleRecord>,
    /// Raw entries that failed to decode, in source order.
    pub rejected: Vec<serde_json::Value>,
}

/// Decodes a JSON array of record-shaped objects one entry at a time.
///
/// A malformed entry is moved to `rejected` instead of failing the whole
/// array.
///
/// # Errors
/// Returns an error when `text` is not valid JSON or not an array.
pub fn decode_record_array(text: &str) -> serde_json::Result<DecodedArray> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut decoded = DecodedArray::default();
    for entry in entries {
        match ArticleRecord::deserialize(&entry) {
            Ok(record) => decoded.records.push(record),
            Err(_) => decoded.rejected.push(entry),
        }
    }
    Ok(decoded)
}

/// Accepts a JSON integer or a string holding an integer.
fn lenient_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrText {
        Int(i64),
        Text(String),
    }

    match IntOrText::deserialize(deserializer)? {
        IntOrText::Int(value) => i32::try_from(value)
            .map_err(|_| D::Error::custom(format!("integer `{value}` is out of range"))),
        IntOrText::Text(text) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| D::Error::custom(format!("expected an integer, got `{text}`"))),
    }
}
