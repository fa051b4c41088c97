//! Single-owner presentation state.
//!
//! # Invariants
//! - The visible list is derived from `(records, criteria)` on every request.
//! - At most one submission is in flight.
//! - Detail mode always has a selected record key.

use super::debounce::SearchDebouncer;
use super::notice::{NoticeBoard, NoticeDurations};
use crate::model::article::{ArticleRecord, RecordKey};
use crate::search::filter::{filter, FilterCriteria};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
    Detail,
    Stats,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Some(Self::Table),
            "cards" | "card" => Some(Self::Cards),
            "detail" => Some(Self::Detail),
            "stats" | "statistics" => Some(Self::Stats),
            _ => None,
        }
    }
}

/// Which equation form the detail view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EquationView {
    #[default]
    Static,
    Recursive,
}

impl EquationView {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "recursive" => Some(Self::Recursive),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Static => Self::Recursive,
            Self::Recursive => Self::Static,
        }
    }

    /// Equation text and definitions of `record` for this form.
    pub fn pick(self, record: &ArticleRecord) -> (Option<&str>, Option<&str>) {
        match self {
            Self::Static => (
                record.static_equation.as_deref(),
                record.static_definitions.as_deref(),
            ),
            Self::Recursive => (
                record.recursive_equation.as_deref(),
                record.recursive_definitions.as_deref(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    AlreadyInFlight,
}

impl Display for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInFlight => write!(f, "a submission is already in progress"),
        }
    }
}

impl Error for SubmissionError {}

/// Presentation state owned by one front end session.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    mode: ViewMode,
    list_mode: ViewMode,
    criteria: FilterCriteria,
    selected: Option<RecordKey>,
    equation: EquationView,
    debouncer: SearchDebouncer,
    notices: NoticeBoard,
    submitting: bool,
}

impl ViewState {
    pub fn new(search_debounce: Duration, notice_durations: NoticeDurations) -> Self {
        Self {
            debouncer: SearchDebouncer::new(search_debounce),
            notices: NoticeBoard::new(notice_durations),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switches to a list or stats mode; detail is entered via [`Self::select`].
    pub fn set_mode(&mut self, mode: ViewMode) {
        match mode {
            ViewMode::Detail if self.selected.is_none() => {}
            ViewMode::Detail => self.mode = ViewMode::Detail,
            ViewMode::Table | ViewMode::Cards => {
                self.mode = mode;
                self.list_mode = mode;
            }
            ViewMode::Stats => self.mode = ViewMode::Stats,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.debouncer.flush();
    }

    /// Records currently visible, in store order.
    pub fn visible<'a>(&self, records: &'a [ArticleRecord]) -> Vec<&'a ArticleRecord> {
        filter(records, &self.criteria)
    }

    /// Opens the detail view for `key`, showing the static equation first.
    pub fn select(&mut self, key: RecordKey) {
        self.selected = Some(key);
        self.equation = EquationView::Static;
        self.mode = ViewMode::Detail;
    }

    /// Leaves the detail view, returning to the last list mode.
    pub fn close_detail(&mut self) {
        self.selected = None;
        if self.mode == ViewMode::Detail {
            self.mode = self.list_mode;
        }
    }

    pub fn selected(&self) -> Option<&RecordKey> {
        self.selected.as_ref()
    }

    pub fn selected_record<'a>(&self, records: &'a [ArticleRecord]) -> Option<&'a ArticleRecord> {
        let key = self.selected.as_ref()?;
        records
            .iter()
            .find(|record| record.has_key(&key.title, key.year))
    }

    pub fn equation(&self) -> EquationView {
        self.equation
    }

    pub fn set_equation(&mut self, equation: EquationView) {
        self.equation = equation;
    }

    pub fn toggle_equation(&mut self) {
        self.equation = self.equation.toggled();
    }

    /// Feeds typed search text through the debouncer.
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.input(text, now);
    }

    /// Applies pending search text immediately. Returns whether the search
    /// term was updated.
    pub fn submit_search(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(text) => {
                self.criteria.set_search(&text);
                true
            }
            None => false,
        }
    }

    /// Advances time: applies due search text and dismisses expired
    /// notices. Returns whether the search term was updated.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.notices.prune(now);
        match self.debouncer.poll(now) {
            Some(text) => {
                self.criteria.set_search(&text);
                true
            }
            None => false,
        }
    }

    pub fn debouncer(&self) -> &SearchDebouncer {
        &self.debouncer
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    /// Marks a submission as in flight.
    ///
    /// # Errors
    /// Returns [`SubmissionError::AlreadyInFlight`] while another submission
    /// has not been finished.
    pub fn begin_submission(&mut self) -> Result<(), SubmissionError> {
        if self.submitting {
            return Err(SubmissionError::AlreadyInFlight);
        }
        self.submitting = true;
        Ok(())
    }

    pub fn finish_submission(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}
