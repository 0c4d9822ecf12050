//! Reconciliation of a thread snapshot into a view model.
//!
//! Every refresh rebuilds the whole list from the snapshot. Nothing from the
//! previous view survives: expansion is re-derived from [`SessionState`] and
//! key bindings are rebuilt from the controls on the new nodes.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local, TimeZone};

use crate::model::{Citation, Message, Thread};
use crate::store::SessionState;

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_CLIENT_LABEL: &str = "default";
pub const DEFAULT_SOURCE_LABEL: &str = "n/a";
pub const NO_MESSAGES: &str = "No messages yet.";
pub const NO_THREADS: &str = "No threads yet.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// What a control does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Expand or collapse the thread.
    Toggle,
    Archive { archive: bool },
    Print,
    /// Carries the raw thread title so a blank one still gets the default file name.
    Export { title: String },
    /// Open the reply composer. Only offered on the expanded thread.
    Reply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub keys: &'static [ControlKey],
    pub label: &'static str,
    pub intent: Intent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    /// Uppercased role.
    pub role_label: String,
    /// Local time, or empty when the message has no timestamp.
    pub timestamp: String,
    /// Verbatim body. Never interpreted as markup.
    pub text: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadBody {
    /// Placeholder line shown instead of a message list.
    Empty(&'static str),
    Messages(Vec<MessageNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode {
    pub id: String,
    pub title: String,
    pub client_label: String,
    pub source_label: String,
    pub archived: bool,
    pub expanded: bool,
    pub body: ThreadBody,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadListView {
    /// Set when the snapshot has no threads; `threads` is then empty.
    pub empty_state: Option<&'static str>,
    pub threads: Vec<ThreadNode>,
}

impl ThreadListView {
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn expanded(&self) -> Option<&ThreadNode> {
        self.threads.iter().find(|node| node.expanded)
    }

    pub fn position(&self, thread_id: &str) -> Option<usize> {
        self.threads.iter().position(|node| node.id == thread_id)
    }

    /// Builds the key table for this view. Call again after every rebuild.
    pub fn bindings(&self) -> Bindings {
        let mut table = HashMap::new();
        for node in &self.threads {
            for control in &node.controls {
                for key in control.keys {
                    table.insert((node.id.clone(), *key), control.intent.clone());
                }
            }
        }
        Bindings { table }
    }
}

/// Key → intent table for one rendered view.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    table: HashMap<(String, ControlKey), Intent>,
}

impl Bindings {
    pub fn resolve(&self, thread_id: &str, key: ControlKey) -> Option<&Intent> {
        self.table.get(&(thread_id.to_string(), key))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub view: ThreadListView,
    pub session: SessionState,
}

/// Derives the view from a snapshot, carrying `session` across the rebuild.
pub fn reconcile(threads: &[Thread], mut session: SessionState) -> Reconciled {
    if threads.is_empty() {
        session.set_active(None);
        return Reconciled {
            view: ThreadListView {
                empty_state: Some(NO_THREADS),
                threads: Vec::new(),
            },
            session,
        };
    }

    let mut nodes: Vec<ThreadNode> = threads.iter().map(thread_node).collect();

    let active = session
        .active_thread_id()
        .and_then(|id| nodes.iter().position(|node| node.id == id));
    match active {
        Some(idx) => {
            let node = &mut nodes[idx];
            node.expanded = true;
            node.controls = controls(node.archived, true, &threads[idx].title);
        }
        None => session.set_active(None),
    }

    Reconciled {
        view: ThreadListView {
            empty_state: None,
            threads: nodes,
        },
        session,
    }
}

fn thread_node(thread: &Thread) -> ThreadNode {
    let title = non_blank(&thread.title).unwrap_or(UNTITLED).to_string();
    let body = if thread.messages.is_empty() {
        ThreadBody::Empty(NO_MESSAGES)
    } else {
        ThreadBody::Messages(thread.messages.iter().map(message_node).collect())
    };

    ThreadNode {
        id: thread.id.clone(),
        client_label: label_or(thread.client_slug.as_deref(), DEFAULT_CLIENT_LABEL),
        source_label: label_or(thread.source_slug.as_deref(), DEFAULT_SOURCE_LABEL),
        archived: thread.archived,
        expanded: false,
        body,
        controls: controls(thread.archived, false, &thread.title),
        title,
    }
}

fn controls(archived: bool, expanded: bool, title: &str) -> Vec<Control> {
    let mut controls = vec![
        Control {
            keys: &[ControlKey::Enter, ControlKey::Char('o')],
            label: if expanded { "Close" } else { "Open" },
            intent: Intent::Toggle,
        },
        Control {
            keys: &[ControlKey::Char('a')],
            label: if archived { "Restore" } else { "Archive" },
            intent: Intent::Archive { archive: !archived },
        },
        Control {
            keys: &[ControlKey::Char('p')],
            label: "Print",
            intent: Intent::Print,
        },
        Control {
            keys: &[ControlKey::Char('e')],
            label: "Export PDF",
            intent: Intent::Export {
                title: title.to_string(),
            },
        },
    ];
    if expanded {
        controls.push(Control {
            keys: &[ControlKey::Char('r')],
            label: "Reply",
            intent: Intent::Reply,
        });
    }
    controls
}

fn message_node(message: &Message) -> MessageNode {
    MessageNode {
        role_label: message.role.to_uppercase(),
        timestamp: format_timestamp(message.ts),
        text: message.text.clone(),
        citations: format_citations(&message.citations),
    }
}

/// Formats epoch seconds as local `YYYY-MM-DD HH:MM`; absent or out of range is blank.
pub fn format_timestamp(ts: Option<f64>) -> String {
    format_timestamp_in(ts, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(ts: Option<f64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(ts) = ts.filter(|ts| ts.is_finite()) else {
        return String::new();
    };
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|utc| utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// `"<file> — <date>"` per citation, de-duplicated, blanks dropped.
pub fn format_citations(citations: &[Citation]) -> Vec<String> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter(|c| !(c.file.trim().is_empty() && c.date.trim().is_empty()))
        .filter(|c| seen.insert((c.file.as_str(), c.date.as_str())))
        .map(|c| format!("{} — {}", c.file, c.date))
        .collect()
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

fn label_or(value: Option<&str>, fallback: &str) -> String {
    value.and_then(non_blank).unwrap_or(fallback).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::export::sanitize_filename;

    fn thread(id: &str) -> Thread {
        Thread {
            id: id.to_string(),
            ..Thread::default()
        }
    }

    fn message(role: &str, text: &str) -> Message {
        Message {
            role: role.to_string(),
            text: text.to_string(),
            ts: None,
            citations: Vec::new(),
        }
    }

    #[test]
    fn test_empty_snapshot_shows_indicator_and_clears_active() {
        let out = reconcile(&[], SessionState::with_active("gone"));

        assert_eq!(out.view.empty_state, Some(NO_THREADS));
        assert!(out.view.threads.is_empty());
        assert_eq!(out.session.active_thread_id(), None);
        assert!(out.view.bindings().is_empty());
    }

    #[test]
    fn test_thread_without_messages_renders_placeholder_only() {
        let out = reconcile(&[thread("a")], SessionState::new());

        assert_eq!(out.view.empty_state, None);
        assert_eq!(out.view.threads[0].body, ThreadBody::Empty("No messages yet."));
    }

    #[test]
    fn test_display_fallbacks() {
        let mut t = thread("a");
        t.title = "   ".to_string();
        t.client_slug = Some(String::new());
        let node = &reconcile(&[t], SessionState::new()).view.threads[0];

        assert_eq!(node.title, "Untitled");
        assert_eq!(node.client_label, "default");
        assert_eq!(node.source_label, "n/a");
    }

    #[test]
    fn test_message_node_uppercases_role_and_keeps_text_verbatim() {
        let mut t = thread("a");
        t.messages = vec![message("plan", "<b>not bold</b>")];
        let out = reconcile(&[t], SessionState::new());

        let ThreadBody::Messages(messages) = &out.view.threads[0].body else {
            panic!("expected messages");
        };
        assert_eq!(messages[0].role_label, "PLAN");
        assert_eq!(messages[0].text, "<b>not bold</b>");
        assert_eq!(messages[0].timestamp, "");
    }

    #[test]
    fn test_citations_are_formatted_and_deduplicated() {
        let cite = |file: &str, date: &str| Citation {
            file: file.to_string(),
            date: date.to_string(),
        };
        let lines = format_citations(&[
            cite("q3.xlsx", "2024-04-01"),
            cite("q3.xlsx", "2024-04-01"),
            cite("", ""),
            cite("memo.pdf", "2024-03-11"),
        ]);

        assert_eq!(lines, vec!["q3.xlsx — 2024-04-01", "memo.pdf — 2024-03-11"]);
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(
            format_timestamp_in(Some(1_714_555_800.0), &Utc),
            "2024-05-01 09:30"
        );
        assert_eq!(format_timestamp_in(None, &Utc), "");
        assert_eq!(format_timestamp_in(Some(f64::NAN), &Utc), "");
    }

    #[test]
    fn test_active_thread_is_expanded_with_reply() {
        let out = reconcile(
            &[thread("a"), thread("b")],
            SessionState::with_active("b"),
        );

        assert_eq!(out.view.expanded().map(|n| n.id.as_str()), Some("b"));
        assert_eq!(out.session.active_thread_id(), Some("b"));

        let bindings = out.view.bindings();
        assert_eq!(
            bindings.resolve("b", ControlKey::Char('r')),
            Some(&Intent::Reply)
        );
        assert_eq!(bindings.resolve("a", ControlKey::Char('r')), None);
    }

    #[test]
    fn test_dangling_active_is_cleared() {
        let out = reconcile(&[thread("a")], SessionState::with_active("x"));

        assert!(out.view.expanded().is_none());
        assert_eq!(out.session.active_thread_id(), None);
    }

    #[test]
    fn test_archive_control_follows_flag() {
        let mut archived = thread("b");
        archived.archived = true;
        let view = reconcile(&[thread("a"), archived], SessionState::new()).view;
        let bindings = view.bindings();

        assert_eq!(
            bindings.resolve("a", ControlKey::Char('a')),
            Some(&Intent::Archive { archive: true })
        );
        assert_eq!(
            bindings.resolve("b", ControlKey::Char('a')),
            Some(&Intent::Archive { archive: false })
        );
        assert!(view.threads[1].controls.iter().any(|c| c.label == "Restore"));
    }

    #[test]
    fn test_bindings_track_rebuilt_nodes() {
        let first = reconcile(&[thread("a")], SessionState::new()).view;
        assert!(first.bindings().resolve("a", ControlKey::Enter).is_some());

        let second = reconcile(&[thread("b")], SessionState::new()).view;
        let bindings = second.bindings();
        assert!(bindings.resolve("a", ControlKey::Enter).is_none());
        assert_eq!(bindings.resolve("b", ControlKey::Enter), Some(&Intent::Toggle));
        assert_eq!(
            bindings.resolve("b", ControlKey::Char('e')),
            Some(&Intent::Export {
                title: String::new()
            })
        );
    }

    #[test]
    fn test_export_intent_carries_raw_title() {
        let view = reconcile(&[thread("a")], SessionState::with_active("a")).view;
        assert_eq!(view.threads[0].title, UNTITLED);

        let bindings = view.bindings();
        let Some(Intent::Export { title }) = bindings.resolve("a", ControlKey::Char('e')) else {
            panic!("export not bound");
        };
        assert_eq!(sanitize_filename(title), "thread");
    }
}
