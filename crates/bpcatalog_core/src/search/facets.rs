//! Filter options derived from the working set.

use crate::model::article::ArticleRecord;
use crate::model::field::FieldValue;
use std::collections::BTreeSet;

/// Options offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Distinct years, newest first.
    pub years: Vec<i32>,
    /// Distinct decade starts, oldest first.
    pub decades: Vec<i32>,
    /// Distinct process tags, sorted.
    pub processes: Vec<String>,
    /// Distinct author names, sorted.
    pub authors: Vec<String>,
}

impl Facets {
    /// Collects facets; list-valued fields contribute each element.
    pub fn collect(records: &[ArticleRecord]) -> Self {
        let mut years = BTreeSet::new();
        let mut decades = BTreeSet::new();
        let mut processes = BTreeSet::new();
        let mut authors = BTreeSet::new();

        for record in records {
            years.insert(record.year);
            decades.insert(decade_of(record.year));
            insert_values(&mut processes, record.process.as_ref());
            insert_values(&mut authors, record.authors.as_ref());
        }

        Self {
            years: years.into_iter().rev().collect(),
            decades: decades.into_iter().collect(),
            processes: processes.into_iter().collect(),
            authors: authors.into_iter().collect(),
        }
    }
}

/// Start year of the decade containing `year`.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

fn insert_values(target: &mut BTreeSet<String>, field: Option<&FieldValue>) {
    if let Some(field) = field {
        for value in field.values() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                target.insert(trimmed.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decade_of, Facets};
    use crate::model::article::ArticleRecord;
    use crate::model::field::FieldValue;

    #[test]
    fn facets_flatten_lists_and_sort() {
        let records = vec![
            ArticleRecord::new("a", 1972, 1, 1)
                .with_process(FieldValue::list(["Extinction", "Resurgence"]))
                .with_authors(FieldValue::list(["Shahan", "Podlesnik"])),
            ArticleRecord::new("b", 2003, 1, 1)
                .with_process("Extinction")
                .with_authors("Nevin"),
        ];

        let facets = Facets::collect(&records);
        assert_eq!(facets.years, vec![2003, 1972]);
        assert_eq!(facets.decades, vec![1970, 2000]);
        assert_eq!(facets.processes, vec!["Extinction", "Resurgence"]);
        assert_eq!(facets.authors, vec!["Nevin", "Podlesnik", "Shahan"]);
    }

    #[test]
    fn decade_of_floors_to_ten() {
        assert_eq!(decade_of(1999), 1990);
        assert_eq!(decade_of(2000), 2000);
    }
}
