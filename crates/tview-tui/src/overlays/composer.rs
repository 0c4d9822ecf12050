//! Reply composer for the expanded thread.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::OverlayUpdate;
use super::render_utils::{InputHint, OverlayConfig, render_overlay, status_line};
use crate::effects::UiEffect;

pub const EMPTY_PROMPT_HINT: &str = "Type a message before sending.";

#[derive(Debug, Clone)]
pub struct ComposerState {
    pub thread_id: String,
    pub thread_title: String,
    pub input: String,
    /// Shown after a blank submit; cleared on the next keystroke.
    pub hint: Option<&'static str>,
}

impl ComposerState {
    pub fn open(thread_id: String, thread_title: String) -> Self {
        Self {
            thread_id,
            thread_title,
            input: String::new(),
            hint: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code != KeyCode::Enter {
            self.hint = None;
        }

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            // Ctrl+J inserts a newline; plain Enter submits.
            KeyCode::Char('j') if ctrl => {
                self.input.push('\n');
                OverlayUpdate::stay()
            }
            KeyCode::Enter => {
                let prompt = self.input.trim();
                if prompt.is_empty() {
                    self.hint = Some(EMPTY_PROMPT_HINT);
                    return OverlayUpdate::stay();
                }
                OverlayUpdate::close().with_effect(UiEffect::SendMessage {
                    thread_id: self.thread_id.clone(),
                    prompt: prompt.to_string(),
                })
            }
            KeyCode::Backspace => {
                self.input.pop();
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let hints = [
            InputHint::new("Enter", "send"),
            InputHint::new("Ctrl+J", "newline"),
            InputHint::new("Esc", "cancel"),
        ];
        let title = format!("Reply · {}", self.thread_title);
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: &title,
                border_color: Color::Green,
                width: 70,
                height: 12,
                hints: &hints,
            },
        );

        let mut lines: Vec<Line> = self
            .input
            .split('\n')
            .map(|l| Line::from(Span::raw(l.to_string())))
            .collect();
        if let Some(last) = lines.last_mut() {
            last.spans
                .push(Span::styled("█", Style::default().fg(Color::Green)));
        }
        lines.push(Line::default());
        lines.push(status_line(self.hint, "Message is sent to the server as-is"));

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }),
            layout.body,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::OverlayTransition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_blank_prompt_keeps_focus_and_hints() {
        let mut composer = ComposerState::open("t1".into(), "Budget".into());
        composer.handle_key(key(KeyCode::Char(' ')));

        let update = composer.handle_key(key(KeyCode::Enter));
        assert_eq!(update.transition, OverlayTransition::Stay);
        assert!(update.effects.is_empty());
        assert_eq!(composer.hint, Some(EMPTY_PROMPT_HINT));

        composer.handle_key(key(KeyCode::Char('x')));
        assert_eq!(composer.hint, None);
    }

    #[test]
    fn test_submit_trims_and_closes() {
        let mut composer = ComposerState::open("t1".into(), "Budget".into());
        for c in " hi there ".chars() {
            composer.handle_key(key(KeyCode::Char(c)));
        }

        let update = composer.handle_key(key(KeyCode::Enter));
        assert_eq!(update.transition, OverlayTransition::Close);
        assert_eq!(
            update.effects,
            vec![UiEffect::SendMessage {
                thread_id: "t1".to_string(),
                prompt: "hi there".to_string(),
            }]
        );
    }

    #[test]
    fn test_ctrl_j_inserts_newline() {
        let mut composer = ComposerState::open("t1".into(), "Budget".into());
        composer.handle_key(key(KeyCode::Char('a')));
        composer.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL));
        composer.handle_key(key(KeyCode::Char('b')));
        assert_eq!(composer.input, "a\nb");
    }
}
