//! User-visible audit log.
//!
//! Each record is `[<RFC 3339 UTC timestamp>] <message>`, kept newest first
//! for the whole session. Every record is mirrored to tracing under the
//! `tview::audit` target so the operator log carries the same history.

use std::collections::VecDeque;

use chrono::{DateTime, SecondsFormat, Utc};

/// Append-only, most-recent-first event log.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: VecDeque<String>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` with the current time. Never fails.
    pub fn record(&mut self, message: impl AsRef<str>) {
        self.record_at(Utc::now(), message);
    }

    pub fn record_at(&mut self, at: DateTime<Utc>, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(target: "tview::audit", "{message}");
        self.entries.push_front(format_entry(at, message));
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn format_entry(at: DateTime<Utc>, message: &str) -> String {
    format!("[{}] {message}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
