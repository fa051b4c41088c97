//! Transient user notices.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    /// Errors and non-fatal warnings.
    Error,
    PullRequest,
}

/// Display lifetime per notice kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeDurations {
    pub success: Duration,
    pub error: Duration,
    pub pull_request: Duration,
}

impl Default for NoticeDurations {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(3),
            error: Duration::from_secs(5),
            pull_request: Duration::from_secs(5),
        }
    }
}

impl NoticeDurations {
    fn for_kind(&self, kind: NoticeKind) -> Duration {
        match kind {
            NoticeKind::Success => self.success,
            NoticeKind::Error => self.error,
            NoticeKind::PullRequest => self.pull_request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of auto-dismissing notices, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    durations: NoticeDurations,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(durations: NoticeDurations) -> Self {
        Self {
            durations,
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.notices.push(Notice {
            kind,
            message: message.into(),
            expires_at: now + self.durations.for_kind(kind),
        });
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NoticeKind::Success, message, now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.push(NoticeKind::Error, message, now);
    }

    /// Notices still on screen at `now`.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(move |notice| notice.expires_at > now)
    }

    /// Drops expired notices and returns how many were dismissed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.expires_at > now);
        before - self.notices.len()
    }

    /// Removes every notice and returns the ones still active at `now`.
    ///
    /// Line-oriented surfaces print each notice once through this.
    pub fn take_active(&mut self, now: Instant) -> Vec<Notice> {
        let mut taken = std::mem::take(&mut self.notices);
        taken.retain(|notice| notice.expires_at > now);
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
