//! Pure render functions.
//!
//! Everything here takes `&AppState`, draws to a ratatui `Frame` and never
//! mutates state or returns effects. The thread pane paints the reconciled
//! view model as-is; no display rule is decided here.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tview_core::view::{ControlKey, MessageNode, ThreadBody, ThreadListView, ThreadNode};
use unicode_width::UnicodeWidthStr;

use crate::common::{clean_for_terminal, truncate_with_ellipsis};
use crate::overlays::render_utils::{InputHint, hint_line};
use crate::state::{AppState, TuiState};

const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;
const INDENT: &str = "    ";

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(columns[1]);

    render_header(state, frame, rows[0]);
    render_threads(state, frame, columns[0]);
    render_search(state, frame, side[0]);
    render_audit(state, frame, side[1]);
    render_footer(state, frame, rows[2]);

    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area);
    }
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "tview",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  ", state.settings.server),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(state.source_label.clone()),
    ];
    if state.is_loading() {
        spans.push(Span::styled(
            "  loading…",
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_threads(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Threads ({}) ", state.view.threads.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(empty) = state.view.empty_state {
        frame.render_widget(
            Paragraph::new(empty)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let (lines, selected_line) = thread_lines(&state.view, state.cursor, inner.width as usize);
    // Keep the selected header visible.
    let height = inner.height as usize;
    let scroll = selected_line.saturating_sub(height.saturating_sub(1) / 3);
    frame.render_widget(
        Paragraph::new(lines).scroll((scroll as u16, 0)),
        inner,
    );
}

/// Lines for the thread pane and the index of the selected thread's header.
pub fn thread_lines(
    view: &ThreadListView,
    cursor: usize,
    width: usize,
) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut selected_line = 0;

    for (idx, node) in view.threads.iter().enumerate() {
        if idx == cursor {
            selected_line = lines.len();
        }
        lines.push(header_line(node, idx == cursor, width));
        if node.expanded {
            push_body(&mut lines, node, width);
        }
    }
    (lines, selected_line)
}

fn header_line(node: &ThreadNode, selected: bool, width: usize) -> Line<'static> {
    let marker = if node.expanded { "▾ " } else { "▸ " };
    let meta = format!("  {} · {}", node.client_label, node.source_label);
    let badge = if node.archived { " [archived]" } else { "" };
    let room = width.saturating_sub(marker.width() + meta.width() + badge.width());

    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if selected {
        title_style = title_style.add_modifier(Modifier::REVERSED);
    }
    if node.archived {
        title_style = title_style.fg(Color::DarkGray);
    }

    Line::from(vec![
        Span::raw(marker),
        Span::styled(truncate_with_ellipsis(&node.title, room.max(8)), title_style),
        Span::styled(badge, Style::default().fg(Color::Yellow)),
        Span::styled(meta, Style::default().fg(Color::DarkGray)),
    ])
}

fn push_body(lines: &mut Vec<Line<'static>>, node: &ThreadNode, width: usize) {
    match &node.body {
        ThreadBody::Empty(placeholder) => lines.push(Line::from(Span::styled(
            format!("{INDENT}{placeholder}"),
            Style::default().fg(Color::DarkGray),
        ))),
        ThreadBody::Messages(messages) => push_messages(lines, messages, width),
    }
    lines.push(Line::from(Span::styled(
        format!("{INDENT}r reply"),
        Style::default().fg(Color::DarkGray),
    )));
}

fn push_messages(lines: &mut Vec<Line<'static>>, messages: &[MessageNode], width: usize) {
    let text_width = width.saturating_sub(INDENT.len()).max(10);
    for message in messages {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{INDENT}{}", message.role_label),
                Style::default().fg(role_color(&message.role_label)),
            ),
            Span::styled(
                format!("  {}", message.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for raw in clean_for_terminal(&message.text).split('\n') {
            for chunk in wrap_plain(raw, text_width) {
                lines.push(Line::from(format!("{INDENT}{chunk}")));
            }
        }
        for citation in &message.citations {
            lines.push(Line::from(Span::styled(
                format!("{INDENT}  ↳ {citation}"),
                Style::default().fg(Color::Blue),
            )));
        }
    }
}

fn role_color(role: &str) -> Color {
    match role {
        "USER" => Color::Green,
        "ASSISTANT" => Color::Cyan,
        "PLAN" => Color::Magenta,
        _ => Color::Gray,
    }
}

/// Splits `text` into chunks of at most `width` chars. Message bodies are
/// pre-wrapped so the selected-line offset stays exact.
fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

fn render_search(state: &TuiState, frame: &mut Frame, area: Rect) {
    let title = match &state.search.query {
        Some(q) => format!(" Search: {q} "),
        None => " Search ".to_string(),
    };
    let lines: Vec<Line> = if state.search.lines.is_empty() {
        vec![Line::from(Span::styled(
            "Press / to search threads.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state
            .search
            .lines
            .iter()
            .map(|l| Line::from(l.clone()))
            .collect()
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

fn render_audit(state: &TuiState, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = state
        .audit
        .entries()
        .map(|entry| Line::from(entry.to_string()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title(" Audit ")),
        area,
    );
}

fn render_footer(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut keys: Vec<(String, &str)> = state
        .selected()
        .map(|node| {
            node.controls
                .iter()
                .map(|c| (control_key_label(c.keys), c.label))
                .collect()
        })
        .unwrap_or_default();
    keys.extend(
        [
            ("n", "new"),
            ("/", "search"),
            ("R", "refresh"),
            ("s", "source"),
            ("i", "ingest"),
            ("h", "hotswap"),
            ("P", "preset"),
            ("q", "quit"),
        ]
        .map(|(k, a)| (k.to_string(), a)),
    );

    let hints: Vec<InputHint> = keys
        .iter()
        .map(|(k, a)| InputHint::new(k.as_str(), a))
        .collect();
    frame.render_widget(Paragraph::new(hint_line(&hints, Color::Cyan)), area);
}

fn control_key_label(keys: &[ControlKey]) -> String {
    keys.iter()
        .map(|k| match k {
            ControlKey::Enter => "Enter".to_string(),
            ControlKey::Char(c) => c.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tview_core::model::{Citation, Message, Thread};
    use tview_core::store::SessionState;
    use tview_core::view::reconcile;

    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn sample() -> Vec<Thread> {
        vec![
            Thread {
                id: "a".to_string(),
                title: "Budget".to_string(),
                ..Thread::default()
            },
            Thread {
                id: "b".to_string(),
                title: String::new(),
                archived: true,
                messages: vec![Message {
                    role: "user".to_string(),
                    text: "line one\nline two".to_string(),
                    ts: None,
                    citations: vec![Citation {
                        file: "q3.xlsx".to_string(),
                        date: "2024-04-01".to_string(),
                    }],
                }],
                ..Thread::default()
            },
        ]
    }

    #[test]
    fn test_collapsed_threads_render_one_line_each() {
        let view = reconcile(&sample(), SessionState::new()).view;
        let (lines, selected) = thread_lines(&view, 1, 80);

        assert_eq!(lines.len(), 2);
        assert_eq!(selected, 1);
        assert!(text(&lines[0]).contains("Budget"));
        assert!(text(&lines[1]).contains("Untitled"));
        assert!(text(&lines[1]).contains("[archived]"));
    }

    #[test]
    fn test_expanded_thread_renders_messages_and_citations() {
        let view = reconcile(&sample(), SessionState::with_active("b")).view;
        let (lines, _) = thread_lines(&view, 0, 80);
        let rendered: Vec<String> = lines.iter().map(text).collect();

        assert!(rendered.iter().any(|l| l.trim_start().starts_with("USER")));
        assert!(rendered.iter().any(|l| l.trim() == "line one"));
        assert!(rendered.iter().any(|l| l.trim() == "line two"));
        assert!(rendered.iter().any(|l| l.contains("↳ q3.xlsx — 2024-04-01")));
    }

    #[test]
    fn test_expanded_empty_thread_shows_placeholder() {
        let view = reconcile(&sample(), SessionState::with_active("a")).view;
        let (lines, _) = thread_lines(&view, 0, 80);
        assert_eq!(text(&lines[1]).trim(), "No messages yet.");
        assert_eq!(text(&lines[2]).trim(), "r reply");
    }

    #[test]
    fn test_header_budgets_by_columns_not_bytes() {
        let threads = vec![Thread {
            id: "a".to_string(),
            title: "Quarterly budget".to_string(),
            ..Thread::default()
        }];
        let view = reconcile(&threads, SessionState::new()).view;
        // "▸ " + title + "  default · n/a" is exactly 33 columns.
        let (lines, _) = thread_lines(&view, 0, 33);
        let header = text(&lines[0]);
        assert!(header.contains("Quarterly budget"), "{header}");
        assert!(!header.contains('…'));
    }

    #[test]
    fn test_wrap_plain() {
        assert_eq!(wrap_plain("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_plain("", 4), vec![""]);
    }
}
