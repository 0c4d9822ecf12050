//! Reducer.
//!
//! `update` is the only place state changes. It never performs I/O; anything
//! that touches the network or the browser is returned as a [`UiEffect`].
//!
//! Mutations follow one pattern: the effect runs the call, the result comes
//! back as an event, the outcome is audited and, on success, the snapshot is
//! fetched again. Thread data is never patched locally.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tview_core::api::ApiResult;
use tview_core::export::ExportReport;
use tview_core::model::Thread;
use tview_core::report;
use tview_core::store::{Applied, FetchId};
use tview_core::view::{ControlKey, Intent};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::{ComposerState, FormKind, FormState, Overlay, OverlayTransition};
use crate::state::{AppState, SearchPane, TuiState};

/// Effects to run once at startup.
pub fn init(state: &mut AppState) -> Vec<UiEffect> {
    vec![UiEffect::FetchSource, state.tui.fetch_threads()]
}

pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let tui = &mut state.tui;
    match event {
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(state, key)
        }
        UiEvent::Terminal(_) | UiEvent::Tick => Vec::new(),

        UiEvent::ThreadsLoaded { fetch, result } => on_threads_loaded(tui, fetch, result),
        UiEvent::SourceLoaded(result) => {
            let (label, audit) = report::source_refreshed(&result);
            tui.source_label = label;
            tui.audit.record(audit);
            Vec::new()
        }

        UiEvent::ThreadCreated(result) => {
            tui.audit.record(report::thread_created(&result));
            refetch_on_success(tui, result.is_ok())
        }
        UiEvent::ThreadArchived {
            thread_id,
            archive,
            result,
        } => {
            tui.audit
                .record(report::thread_archived(&thread_id, archive, &result));
            refetch_on_success(tui, result.is_ok())
        }
        UiEvent::MessageSent { thread_id, result } => {
            tui.audit.record(report::message_sent(&thread_id, &result));
            refetch_on_success(tui, result.is_ok())
        }
        UiEvent::SearchCompleted(result) => {
            tui.search.searching = false;
            tui.search.lines = report::search_results(&result);
            if let Some(line) = report::search(&result) {
                tui.audit.record(line);
            }
            Vec::new()
        }
        UiEvent::ExportFinished(export) => on_export_finished(tui, &export),

        UiEvent::SourceSet(result) => {
            tui.audit.record(report::source_set(&result));
            if result.is_ok() {
                vec![UiEffect::FetchSource]
            } else {
                Vec::new()
            }
        }
        UiEvent::IngestQueued(result) => {
            tui.audit.record(report::ingest_queued(&result));
            refetch_on_success(tui, result.is_ok())
        }
        UiEvent::Hotswapped(result) => {
            tui.audit.record(report::hotswapped(&result));
            if result.is_ok() {
                vec![UiEffect::FetchSource, tui.fetch_threads()]
            } else {
                Vec::new()
            }
        }
        UiEvent::PresetApplied(result) => {
            tui.audit.record(report::preset_applied(&result));
            Vec::new()
        }

        UiEvent::Notice(line) => {
            tui.audit.record(line);
            Vec::new()
        }
    }
}

fn refetch_on_success(tui: &mut TuiState, ok: bool) -> Vec<UiEffect> {
    if ok {
        vec![tui.fetch_threads()]
    } else {
        Vec::new()
    }
}

fn on_threads_loaded(
    tui: &mut TuiState,
    fetch: FetchId,
    result: ApiResult<Vec<Thread>>,
) -> Vec<UiEffect> {
    if tui.pending_fetch == Some(fetch) {
        tui.pending_fetch = None;
    }
    match result {
        Ok(threads) => {
            if tui.store.apply(fetch, threads) == Applied::Installed {
                tui.rebuild_view();
            }
        }
        Err(e) => tui.audit.record(report::threads_refresh_failed(&e)),
    }
    Vec::new()
}

fn on_export_finished(tui: &mut TuiState, export: &ExportReport) -> Vec<UiEffect> {
    tui.audit.record(&export.audit);
    match export.print_url() {
        Some(url) if tui.settings.open_print_view => vec![UiEffect::OpenBrowser {
            url: url.to_string(),
        }],
        _ => Vec::new(),
    }
}

// ============================================================================
// Keys
// ============================================================================

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(overlay) = state.overlay.as_mut() {
        let update = overlay.handle_key(key);
        if update.transition == OverlayTransition::Close {
            state.overlay = None;
        }
        for effect in &update.effects {
            if let UiEffect::Search { query } = effect {
                state.tui.search = SearchPane {
                    query: Some(query.clone()),
                    searching: true,
                    lines: vec!["Searching…".to_string()],
                };
            }
        }
        return update.effects;
    }

    let tui = &mut state.tui;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let form = |kind| Some(Overlay::Form(FormState::open(kind, &tui.settings)));

    match key.code {
        KeyCode::Char('q') => quit(tui),
        KeyCode::Char('c') if ctrl => quit(tui),
        KeyCode::Char('j') | KeyCode::Down => {
            tui.move_cursor(1);
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            tui.move_cursor(-1);
            Vec::new()
        }
        KeyCode::Char('R') => vec![UiEffect::FetchSource, tui.fetch_threads()],
        KeyCode::Char(c @ ('n' | '/' | 's' | 'i' | 'h' | 'P')) => {
            let kind = match c {
                'n' => FormKind::CreateThread,
                '/' => FormKind::Search,
                's' => FormKind::SetSource,
                'i' => FormKind::Ingest,
                'h' => FormKind::Hotswap,
                _ => FormKind::Preset,
            };
            state.overlay = form(kind);
            Vec::new()
        }
        KeyCode::Enter => handle_thread_key(state, ControlKey::Enter),
        KeyCode::Char(c) if !ctrl => handle_thread_key(state, ControlKey::Char(c)),
        _ => Vec::new(),
    }
}

fn quit(tui: &mut TuiState) -> Vec<UiEffect> {
    tui.should_quit = true;
    vec![UiEffect::Quit]
}

/// Resolves a key against the bindings of the selected thread.
fn handle_thread_key(state: &mut AppState, key: ControlKey) -> Vec<UiEffect> {
    let tui = &mut state.tui;
    let Some(node) = tui.selected() else {
        return Vec::new();
    };
    let thread_id = node.id.clone();
    let title = node.title.clone();
    let Some(intent) = tui.bindings.resolve(&thread_id, key).cloned() else {
        return Vec::new();
    };

    match intent {
        Intent::Toggle => {
            tui.store.open(&thread_id);
            tui.rebuild_view();
            Vec::new()
        }
        Intent::Archive { archive } => vec![UiEffect::ArchiveThread { thread_id, archive }],
        Intent::Print => {
            tui.audit
                .record(format!("Opening print view for {thread_id}"));
            vec![UiEffect::OpenPrintView { thread_id }]
        }
        Intent::Export { title } => vec![UiEffect::Export { thread_id, title }],
        Intent::Reply => {
            state.overlay = Some(Overlay::Composer(ComposerState::open(thread_id, title)));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use tview_core::api::ApiError;
    use tview_core::config::Config;
    use tview_core::export::ExportOutcome;
    use tview_core::model::Message;
    use url::Url;

    use super::*;
    use crate::overlays::composer::EMPTY_PROMPT_HINT;

    fn app() -> AppState {
        AppState::new(
            &Config::default(),
            &Url::parse("http://127.0.0.1:5000").unwrap(),
        )
    }

    fn thread(id: &str, title: &str) -> Thread {
        Thread {
            id: id.to_string(),
            title: title.to_string(),
            ..Thread::default()
        }
    }

    fn press(app: &mut AppState, code: KeyCode) -> Vec<UiEffect> {
        update(
            app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))),
        )
    }

    fn load(app: &mut AppState, threads: Vec<Thread>) {
        let UiEffect::FetchThreads { fetch } = app.tui.fetch_threads() else {
            unreachable!();
        };
        update(
            app,
            UiEvent::ThreadsLoaded {
                fetch,
                result: Ok(threads),
            },
        );
    }

    fn latest_audit(app: &AppState) -> String {
        let entry = app.tui.audit.latest().unwrap_or_default();
        entry.split_once("] ").map(|(_, m)| m).unwrap_or("").to_string()
    }

    #[test]
    fn test_init_fetches_source_and_threads() {
        let mut app = app();
        let effects = init(&mut app);
        assert_eq!(effects.len(), 2);
        assert!(app.tui.is_loading());
    }

    #[test]
    fn test_enter_toggles_single_expansion() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A"), thread("b", "B")]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tui.store.active_thread_id(), Some("a"));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.tui.store.active_thread_id(), Some("b"));
        assert_eq!(app.tui.view.threads.iter().filter(|n| n.expanded).count(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tui.store.active_thread_id(), None);
        assert!(app.tui.view.expanded().is_none());
    }

    #[test]
    fn test_reply_only_bound_when_expanded() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A")]);

        press(&mut app, KeyCode::Char('r'));
        assert!(app.overlay.is_none());

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        assert!(matches!(app.overlay, Some(Overlay::Composer(_))));
    }

    #[test]
    fn test_blank_prompt_issues_no_effect() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A")]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));

        press(&mut app, KeyCode::Char(' '));
        let effects = press(&mut app, KeyCode::Enter);

        assert!(effects.is_empty());
        let Some(Overlay::Composer(composer)) = &app.overlay else {
            panic!("composer should keep focus");
        };
        assert_eq!(composer.hint, Some(EMPTY_PROMPT_HINT));
    }

    #[test]
    fn test_send_message_then_refetch() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A")]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('i'));

        let effects = press(&mut app, KeyCode::Enter);
        assert_eq!(
            effects,
            vec![UiEffect::SendMessage {
                thread_id: "a".to_string(),
                prompt: "hi".to_string()
            }]
        );
        assert!(app.overlay.is_none());

        let effects = update(
            &mut app,
            UiEvent::MessageSent {
                thread_id: "a".to_string(),
                result: Ok(()),
            },
        );
        assert_eq!(latest_audit(&app), "Message appended to a");
        assert!(matches!(effects[..], [UiEffect::FetchThreads { .. }]));
    }

    #[test]
    fn test_expansion_survives_refetch() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A"), thread("b", "B")]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        let mut updated = thread("b", "B");
        updated.messages.push(Message {
            role: "user".to_string(),
            text: "hi".to_string(),
            ts: None,
            citations: Vec::new(),
        });
        load(&mut app, vec![thread("a", "A"), updated]);

        assert_eq!(app.tui.view.expanded().map(|n| n.id.as_str()), Some("b"));
        assert_eq!(app.tui.selected().map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn test_archive_failure_does_not_refetch() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A")]);

        let effects = press(&mut app, KeyCode::Char('a'));
        assert_eq!(
            effects,
            vec![UiEffect::ArchiveThread {
                thread_id: "a".to_string(),
                archive: true
            }]
        );

        let effects = update(
            &mut app,
            UiEvent::ThreadArchived {
                thread_id: "a".to_string(),
                archive: true,
                result: Err(ApiError::request_failed(404, "Thread not found")),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(latest_audit(&app), "Archive failed: Thread not found");
    }

    #[test]
    fn test_stale_thread_list_is_ignored() {
        let mut app = app();
        let UiEffect::FetchThreads { fetch: older } = app.tui.fetch_threads() else {
            unreachable!();
        };
        load(&mut app, vec![thread("new", "New")]);

        update(
            &mut app,
            UiEvent::ThreadsLoaded {
                fetch: older,
                result: Ok(vec![thread("old", "Old")]),
            },
        );
        assert_eq!(app.tui.view.threads[0].id, "new");
    }

    #[test]
    fn test_refresh_failure_keeps_last_snapshot() {
        let mut app = app();
        load(&mut app, vec![thread("a", "A")]);
        let UiEffect::FetchThreads { fetch } = app.tui.fetch_threads() else {
            unreachable!();
        };

        update(
            &mut app,
            UiEvent::ThreadsLoaded {
                fetch,
                result: Err(ApiError::transport("Connection failed: refused")),
            },
        );
        assert_eq!(app.tui.view.threads.len(), 1);
        assert!(!app.tui.is_loading());
        assert_eq!(
            latest_audit(&app),
            "Thread refresh failed: Connection failed: refused"
        );
    }

    #[test]
    fn test_export_fallback_opens_browser() {
        let mut app = app();
        let url = Url::parse("http://127.0.0.1:5000/_print/a").unwrap();
        let effects = update(
            &mut app,
            UiEvent::ExportFinished(ExportReport {
                outcome: ExportOutcome::PrintFallback {
                    url: url.clone(),
                    error: None,
                },
                audit: "PDF export fallback (engine missing)".to_string(),
            }),
        );

        assert_eq!(
            effects,
            vec![UiEffect::OpenBrowser {
                url: url.to_string()
            }]
        );
        assert_eq!(latest_audit(&app), "PDF export fallback (engine missing)");
    }

    #[test]
    fn test_export_failure_opens_nothing() {
        let mut app = app();
        let effects = update(
            &mut app,
            UiEvent::ExportFinished(ExportReport {
                outcome: ExportOutcome::Failed {
                    error: "Internal Server Error".to_string(),
                },
                audit: "Export failed: Internal Server Error".to_string(),
            }),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_search_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        for c in "q3".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let effects = press(&mut app, KeyCode::Enter);
        assert_eq!(
            effects,
            vec![UiEffect::Search {
                query: "q3".to_string()
            }]
        );
        assert!(app.tui.search.searching);

        update(
            &mut app,
            UiEvent::SearchCompleted(Err(ApiError::transport("Connection failed"))),
        );
        assert_eq!(app.tui.search.lines, vec!["Search failed."]);
        assert!(!app.tui.search.searching);
    }

    #[test]
    fn test_hotswap_refreshes_source_and_threads() {
        let mut app = app();
        let effects = update(&mut app, UiEvent::Hotswapped(Ok(Default::default())));
        assert!(matches!(
            effects[..],
            [UiEffect::FetchSource, UiEffect::FetchThreads { .. }]
        ));
        assert_eq!(latest_audit(&app), "Hotswap completed.");
    }

    #[test]
    fn test_source_failure_label() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::SourceLoaded(Err(ApiError::request_failed(500, "down"))),
        );
        assert_eq!(app.tui.source_label, "Source lookup failed.");
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), vec![UiEffect::Quit]);
        assert!(app.tui.should_quit);
    }
}
