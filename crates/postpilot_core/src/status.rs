use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of timestamps for status entries.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    pub fn system() -> Self {
        Self(Arc::new(Utc::now))
    }

    /// A clock that always reports `at`; used by tests and replays.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self(Arc::new(move || at))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

// Clocks carry no observable state of their own.
impl PartialEq for Clock {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Clock {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Position in the log, starting at 1.
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub level: StatusLevel,
    pub text: String,
}

/// Append-only record of workflow events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLog {
    entries: Vec<StatusEntry>,
}

impl StatusLog {
    pub fn push(&mut self, at: DateTime<Utc>, level: StatusLevel, text: impl Into<String>) {
        let seq = self.entries.len() as u64 + 1;
        self.entries.push(StatusEntry {
            seq,
            at,
            level,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Entries appended after `seq`, for front ends that print incrementally.
    pub fn since(&self, seq: u64) -> &[StatusEntry] {
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
