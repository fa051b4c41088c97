//! Presentation state shared by every front end.
//!
//! Nothing here renders; front ends read [`ViewState`] and the store and
//! draw whatever they derive.

pub mod debounce;
pub mod notice;
pub mod state;

pub use debounce::{SearchDebouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use notice::{Notice, NoticeBoard, NoticeDurations, NoticeKind};
pub use state::{EquationView, SubmissionError, ViewMode, ViewState};
