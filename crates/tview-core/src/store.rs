//! Thread snapshot store and session state.
//!
//! The server owns every thread. The client keeps the last fetched list (the
//! snapshot) and one piece of local state: which thread, if any, is expanded.

use crate::model::Thread;
use crate::view::{self, ThreadListView};

/// Identifier handed out for each thread-list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchId(pub u64);

/// Monotonic source of [`FetchId`]s.
#[derive(Debug, Default)]
pub struct FetchSeq {
    next: u64,
}

impl FetchSeq {
    pub fn next_id(&mut self) -> FetchId {
        let id = FetchId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Result of toggling a thread open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Expanded,
    Collapsed,
}

/// Client-only UI state: at most one expanded thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    active_thread_id: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active(id: impl Into<String>) -> Self {
        Self {
            active_thread_id: Some(id.into()),
        }
    }

    pub fn active_thread_id(&self) -> Option<&str> {
        self.active_thread_id.as_deref()
    }

    pub fn is_expanded(&self, thread_id: &str) -> bool {
        self.active_thread_id.as_deref() == Some(thread_id)
    }

    /// Replaces the active thread. Any previous one is implicitly collapsed.
    pub fn set_active(&mut self, id: Option<String>) {
        self.active_thread_id = id;
    }

    /// `open(id)`: expands a collapsed thread, collapses an expanded one.
    pub fn open(&mut self, thread_id: &str) -> Expansion {
        if self.is_expanded(thread_id) {
            self.active_thread_id = None;
            Expansion::Collapsed
        } else {
            self.active_thread_id = Some(thread_id.to_string());
            Expansion::Expanded
        }
    }

    /// Clears the active id unless it names one of `threads`.
    pub fn retain_present(&mut self, threads: &[Thread]) {
        if let Some(active) = self.active_thread_id.as_deref()
            && !threads.iter().any(|t| t.id == active)
        {
            self.active_thread_id = None;
        }
    }
}

/// Outcome of [`SnapshotStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Installed,
    /// A newer fetch was already applied; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    threads: Vec<Thread>,
    session: SessionState,
    last_applied: Option<FetchId>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == thread_id)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn active_thread_id(&self) -> Option<&str> {
        self.session.active_thread_id()
    }

    /// Installs a new snapshot, clearing a dangling active id.
    pub fn replace(&mut self, threads: Vec<Thread>) {
        self.threads = threads;
        self.session.retain_present(&self.threads);
    }

    /// Installs the response of fetch `id` unless a newer one was applied.
    pub fn apply(&mut self, id: FetchId, threads: Vec<Thread>) -> Applied {
        if self.last_applied.is_some_and(|last| id < last) {
            tracing::debug!(fetch = id.0, "dropping stale thread list");
            return Applied::Stale;
        }
        self.last_applied = Some(id);
        self.replace(threads);
        Applied::Installed
    }

    /// Sets the active thread. Ids missing from the snapshot clear it instead.
    pub fn set_active(&mut self, id: Option<String>) {
        let id = id.filter(|id| self.threads.iter().any(|t| &t.id == id));
        self.session.set_active(id);
    }

    /// Toggles a thread open or closed. Unknown ids are ignored.
    pub fn open(&mut self, thread_id: &str) -> Option<Expansion> {
        self.thread(thread_id)?;
        Some(self.session.open(thread_id))
    }

    /// Rebuilds the view model and adopts the reconciled session.
    pub fn reconcile(&mut self) -> ThreadListView {
        let reconciled = view::reconcile(&self.threads, self.session.clone());
        self.session = reconciled.session;
        reconciled.view
    }
}
