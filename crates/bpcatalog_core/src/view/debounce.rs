//! Search input debouncing.
//!
//! # Invariants
//! - At most one pending text; newer input replaces it and restarts the delay.
//! - Pending text is released exactly once, by `poll` or `flush`.

use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest search text until typing pauses.
///
/// Time is supplied by the caller so behavior is deterministic.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a keystroke-level change of the search text at `now`.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.delay));
    }

    /// Releases the pending text once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// Releases the pending text immediately (explicit submit).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending text becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::SearchDebouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn releases_latest_text_after_pause() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));

        debouncer.input("res", start);
        debouncer.input("resurg", start + Duration::from_millis(100));
        assert_eq!(debouncer.poll(start + Duration::from_millis(350)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(400)),
            Some("resurg".to_string())
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn flush_releases_immediately_once() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("matching", Instant::now());
        assert_eq!(debouncer.flush(), Some("matching".to_string()));
        assert_eq!(debouncer.flush(), None);
        assert!(!debouncer.is_pending());
    }
}
