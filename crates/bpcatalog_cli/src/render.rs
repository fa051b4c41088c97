//! Plain-text rendering of catalog views.
//!
//! Every function returns a `String`; printing is left to the caller.

use bpcatalog_core::model::article::{split_definitions, text_display};
use bpcatalog_core::search::facets::Facets;
use bpcatalog_core::view::{Notice, NoticeKind};
use bpcatalog_core::{ArticleRecord, CatalogStats, EquationView, PLACEHOLDER};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

const TITLE_WIDTH: usize = 44;
const AUTHORS_WIDTH: usize = 26;
const PROCESS_WIDTH: usize = 26;
const EQUATION_WIDTH: usize = 30;
const CARD_ABSTRACT_CHARS: usize = 160;

/// Inline and display math delimiters: `$$`, `$`, `\(`, `\)`, `\[`, `\]`.
static MATH_DELIMITER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$?|\\[()\[\]]").expect("valid math delimiter regex"));

/// Removes math delimiters so markup reads as plain text.
pub fn strip_math(value: &str) -> String {
    MATH_DELIMITER_RE.replace_all(value, "").trim().to_string()
}

pub fn table(records: &[&ArticleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<tw$} {:<aw$} {:>4} {:>9} {:<pw$} {}",
        "#",
        "Title",
        "Authors",
        "Year",
        "Vol(Iss)",
        "Process",
        "Equation",
        tw = TITLE_WIDTH,
        aw = AUTHORS_WIDTH,
        pw = PROCESS_WIDTH,
    );
    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<tw$} {:<aw$} {:>4} {:>9} {:<pw$} {}",
            index + 1,
            clip(&record.title, TITLE_WIDTH),
            clip(&record.authors_display(), AUTHORS_WIDTH),
            record.year,
            format!("{}({})", record.volume, record.issue),
            clip(&record.process_display(), PROCESS_WIDTH),
            clip(&strip_math(record.static_equation_display()), EQUATION_WIDTH),
            tw = TITLE_WIDTH,
            aw = AUTHORS_WIDTH,
            pw = PROCESS_WIDTH,
        );
    }
    let _ = write!(out, "{} record(s)", records.len());
    out
}

pub fn cards(records: &[&ArticleRecord]) -> String {
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "[{}] {} ({})", index + 1, record.title, record.year);
        let _ = writeln!(out, "    Authors: {}", record.authors_display());
        let _ = writeln!(out, "    Process: {}", record.process_display());
        let _ = writeln!(
            out,
            "    Volume {}, Issue {}",
            record.volume, record.issue
        );
        let _ = writeln!(
            out,
            "    {}",
            clip(record.abstract_display(), CARD_ABSTRACT_CHARS)
        );
        out.push('\n');
    }
    let _ = write!(out, "{} record(s)", records.len());
    out
}

/// How the equation toggle is reached where the detail view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchHint {
    /// One-shot `show` command.
    Flag,
    /// Interactive `browse` session.
    Command,
}

pub fn detail(record: &ArticleRecord, equation: EquationView, hint: SwitchHint) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.title);
    let _ = writeln!(out, "{}", "=".repeat(record.title.chars().count().min(80)));
    let _ = writeln!(out, "Authors:  {}", record.authors_display());
    let _ = writeln!(
        out,
        "Year:     {}   Volume: {}   Issue: {}",
        record.year, record.volume, record.issue
    );
    let _ = writeln!(out, "Process:  {}", record.process_display());
    let _ = writeln!(out, "Pages:    {}", text_display(record.pages.as_deref()));
    let _ = writeln!(out, "DOI:      {}", text_display(record.doi.as_deref()));
    let _ = writeln!(out, "URL:      {}", record.url_display());
    let _ = writeln!(out);
    let _ = writeln!(out, "Abstract:\n  {}", record.abstract_display());
    let _ = writeln!(out);

    let (label, other) = match equation {
        EquationView::Static => ("Static equation", "recursive"),
        EquationView::Recursive => ("Recursive equation", "static"),
    };
    let (formula, definitions) = equation.pick(record);
    let _ = writeln!(
        out,
        "{label}:\n  {}",
        formula.map(strip_math).unwrap_or_else(|| PLACEHOLDER.to_string())
    );
    let definitions = definitions.map(split_definitions).unwrap_or_default();
    if !definitions.is_empty() {
        let _ = writeln!(out, "Where:");
        for definition in definitions {
            let _ = writeln!(out, "  - {}", strip_math(definition));
        }
    }
    match hint {
        SwitchHint::Flag => {
            let _ = write!(out, "(switch with --equation {other})");
        }
        SwitchHint::Command => {
            let _ = write!(out, "(switch with :eq)");
        }
    }
    out
}

pub fn stats(stats: &CatalogStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total articles:     {}", stats.total_articles);
    let _ = writeln!(out, "Unique processes:   {}", stats.unique_processes);
    let _ = writeln!(out, "Year range:         {}", stats.year_range_display());
    let _ = writeln!(
        out,
        "Latest volume:      {}",
        stats
            .latest_volume
            .map_or_else(|| PLACEHOLDER.to_string(), |volume| volume.to_string())
    );
    let _ = write!(out, "Articles by decade:");
    for (decade, count) in &stats.articles_by_decade {
        let _ = write!(out, "\n  {decade}s  {count:>4}  {}", "#".repeat(*count));
    }
    out
}

pub fn facets(facets: &Facets) -> String {
    let join_numbers = |values: &[i32]| {
        values
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut out = String::new();
    let _ = writeln!(out, "Decades:   {}", join_numbers(&facets.decades));
    let _ = writeln!(out, "Years:     {}", join_numbers(&facets.years));
    let _ = writeln!(out, "Processes: {}", facets.processes.join(", "));
    let _ = write!(out, "Authors:   {}", facets.authors.join(", "));
    out
}

pub fn notice(notice: &Notice) -> String {
    let prefix = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "warning",
        NoticeKind::PullRequest => "pull request",
    };
    format!("[{prefix}] {}", notice.message)
}

/// Truncates to `width` characters, marking the cut with `...`.
fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept = value.chars().take(width.saturating_sub(3)).collect::<String>();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::{cards, clip, detail, stats, strip_math, table, SwitchHint};
    use bpcatalog_core::{ArticleRecord, CatalogStats, EquationView, FieldValue};

    fn sample() -> ArticleRecord {
        let mut record = ArticleRecord::new("Hyperbolic Discounting", 1975, 23, 2)
            .with_authors(FieldValue::list(["George Ainslie", "Other"]))
            .with_static_equation(r"\(V = \frac{A}{1 + kD}\)")
            .with_recursive_equation("$V_{t+1} = V_t$");
        record.static_definitions = Some("V: value; A: amount".to_string());
        record
    }

    #[test]
    fn strip_math_removes_delimiters_only() {
        assert_eq!(strip_math(r"\(a + b\)"), "a + b");
        assert_eq!(strip_math("$$x^2$$"), "x^2");
        assert_eq!(strip_math(r"\[\frac{1}{2}\]"), r"\frac{1}{2}");
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghijk", 6), "abc...");
    }

    #[test]
    fn table_and_cards_count_rows() {
        let record = sample();
        let rendered = table(&[&record]);
        assert!(rendered.contains("Hyperbolic Discounting"));
        assert!(rendered.ends_with("1 record(s)"));
        assert!(cards(&[]).ends_with("0 record(s)"));
    }

    #[test]
    fn detail_switches_equation_form() {
        let record = sample();
        let static_view = detail(&record, EquationView::Static, SwitchHint::Flag);
        assert!(static_view.contains(r"V = \frac{A}{1 + kD}"));
        assert!(static_view.contains("  - A: amount"));

        let recursive_view = detail(&record, EquationView::Recursive, SwitchHint::Command);
        assert!(recursive_view.contains("V_{t+1} = V_t"));
        assert!(!recursive_view.contains("Where:"));
        assert!(static_view.ends_with("(switch with --equation recursive)"));
        assert!(recursive_view.ends_with("(switch with :eq)"));
        assert!(!recursive_view.contains("--equation"));
    }

    #[test]
    fn stats_renders_placeholder_for_empty_catalog() {
        let rendered = stats(&CatalogStats::compute(&[]));
        assert!(rendered.contains("Year range:         N/A"));
        assert!(rendered.contains("Latest volume:      N/A"));
    }
}
