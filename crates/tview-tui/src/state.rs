//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── store: SnapshotStore   (threads + active thread id)
//! │   ├── view: ThreadListView   (rebuilt from the store on every change)
//! │   ├── bindings: Bindings     (rebuilt together with the view)
//! │   ├── audit: AuditLog
//! │   └── search: SearchPane
//! └── overlay: Option<Overlay>   (forms and the reply composer)
//! ```
//!
//! The split lets overlay handlers borrow `&mut self` and `&TuiState` at once.

use tview_core::audit::AuditLog;
use tview_core::config::Config;
use tview_core::store::{FetchId, FetchSeq, SnapshotStore};
use tview_core::view::{Bindings, ThreadListView, ThreadNode};
use url::Url;

use crate::effects::UiEffect;
use crate::overlays::Overlay;

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: &Config, server: &Url) -> Self {
        Self {
            tui: TuiState::new(config, server),
            overlay: None,
        }
    }
}

/// Values from the config that the reducer needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: String,
    pub client_slug: String,
    pub source_slug: String,
    pub open_print_view: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPane {
    pub query: Option<String>,
    pub searching: bool,
    pub lines: Vec<String>,
}

pub struct TuiState {
    pub settings: Settings,
    pub store: SnapshotStore,
    pub view: ThreadListView,
    pub bindings: Bindings,
    /// Index into `view.threads`.
    pub cursor: usize,
    pub fetch_seq: FetchSeq,
    /// Newest thread-list fetch still in flight.
    pub pending_fetch: Option<FetchId>,
    pub audit: AuditLog,
    pub source_label: String,
    pub search: SearchPane,
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(config: &Config, server: &Url) -> Self {
        let mut state = Self {
            settings: Settings {
                server: server.to_string(),
                client_slug: config.client_slug.clone(),
                source_slug: config.source_slug.clone(),
                open_print_view: config.open_print_view,
            },
            store: SnapshotStore::new(),
            view: ThreadListView::default(),
            bindings: Bindings::default(),
            cursor: 0,
            fetch_seq: FetchSeq::default(),
            pending_fetch: None,
            audit: AuditLog::new(),
            source_label: "Source: …".to_string(),
            search: SearchPane::default(),
            should_quit: false,
        };
        state.rebuild_view();
        state
    }

    /// Re-runs reconciliation and re-binds keys. The cursor follows the
    /// thread it was on when that thread survives the rebuild.
    pub fn rebuild_view(&mut self) {
        let selected = self.selected().map(|node| node.id.clone());

        self.view = self.store.reconcile();
        self.bindings = self.view.bindings();

        self.cursor = selected
            .and_then(|id| self.view.position(&id))
            .unwrap_or(self.cursor)
            .min(self.view.threads.len().saturating_sub(1));
    }

    pub fn selected(&self) -> Option<&ThreadNode> {
        self.view.threads.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.view.threads.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Starts a new thread-list fetch.
    pub fn fetch_threads(&mut self) -> UiEffect {
        let fetch = self.fetch_seq.next_id();
        self.pending_fetch = Some(fetch);
        UiEffect::FetchThreads { fetch }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }
}
