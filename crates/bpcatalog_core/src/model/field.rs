//! Scalar-or-list field values.
//!
//! # Responsibility
//! - Represent author/process fields that arrive either as one string or as
//!   an ordered list of strings.
//! - Provide the display, membership and substring predicates used by the
//!   filter engine.
//!
//! # Invariants
//! - Membership against a scalar is exact equality; against a list it is
//!   element containment.
//! - Substring matching is case-insensitive and never matches across list
//!   element boundaries.

use serde::{Deserialize, Serialize};

/// Default separator used when a list value is displayed on one line.
pub const LIST_SEPARATOR: &str = ", ";

/// A field that is either one text value or an ordered list of text values.
///
/// Serialized untagged, so `"Smith"` and `["Smith", "Jones"]` both round-trip
/// to the JSON shape they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Builds a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Builds a list value from any iterator of strings.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Returns the underlying values as a slice (one element for scalars).
    pub fn values(&self) -> &[String] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::List(values) => values.as_slice(),
        }
    }

    /// Returns `true` for an empty scalar or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.trim().is_empty(),
            Self::List(values) => values.iter().all(|value| value.trim().is_empty()),
        }
    }

    /// Display form using [`LIST_SEPARATOR`].
    pub fn display(&self) -> String {
        self.display_with(LIST_SEPARATOR)
    }

    /// Display form joining list elements with `separator`.
    pub fn display_with(&self, separator: &str) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(values) => values.join(separator),
        }
    }

    /// Exact membership test against a filter value.
    pub fn contains_exact(&self, value: &str) -> bool {
        match self {
            Self::Scalar(current) => current == value,
            Self::List(values) => values.iter().any(|current| current == value),
        }
    }

    /// Case-insensitive substring test on the scalar or on any list element.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.contains_lowercase(&needle.to_lowercase())
    }

    /// Same as [`Self::contains_text`] with a needle that is already lowercase.
    ///
    /// Used by the filter engine so one search term is lowercased once per scan.
    pub fn contains_lowercase(&self, needle_lower: &str) -> bool {
        self.values()
            .iter()
            .any(|value| value.to_lowercase().contains(needle_lower))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}
